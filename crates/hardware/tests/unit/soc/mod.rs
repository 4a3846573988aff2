/// UART and cycle counter.
pub mod devices;



/// Memory system construction and program placement.
pub mod system;

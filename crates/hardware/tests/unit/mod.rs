
/// Configuration defaults and JSON parsing.
pub mod config;



/// Loader, simulator driver and reference interpreter.
pub mod sim;

/// Memory ports, bus and devices.
pub mod soc;

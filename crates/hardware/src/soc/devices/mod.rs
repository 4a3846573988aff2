//! Memory-Mapped IO Devices.
//!
//! Devices reachable through the data port: a transmit-only UART used by
//! programs for console output, and a free-running cycle counter used by the
//! benchmark harness to time regions of code.

/// Free-running cycle counter.
pub mod timer;

/// Transmit-only debug UART.
pub mod uart;

pub use timer::CycleCounter;
pub use uart::Uart;

pub use crate::soc::traits::Device;

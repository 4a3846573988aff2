//! Simulation driver and program loading.
//!
//! Provides the program loader, the cycle-level simulator loop and a
//! one-instruction-at-a-time reference interpreter.

/// Program file formats (PQR5 container, hex text, raw, ELF).
pub mod loader;

/// Unpipelined interpreter used for equivalence checks.
pub mod reference;

/// Cycle-level driver around the pipeline.
pub mod simulator;

pub use simulator::{RunOutcome, Simulator};

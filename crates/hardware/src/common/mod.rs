//! Common utilities and types used throughout the simulator.
//!
//! This module provides fundamental building blocks shared across components:
//! 1. **Constants:** Instruction, memory-map and image-format constants.
//! 2. **Error Handling:** Decode faults, loader and assembler errors.

/// Common constants used throughout the simulator.
pub mod constants;

/// Error types and fault definitions.
pub mod error;

pub use error::{AsmError, AsmErrorKind, DecodeFault, LoadError, SimError};

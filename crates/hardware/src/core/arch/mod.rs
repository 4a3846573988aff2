//! RV32I architectural state.
//!
//! The only architectural state outside memory is the integer register file.

/// General-Purpose Register file implementation.
pub mod gpr;

//! Execution units.
//!
//! The integer ALU used by execute, and the branch unit: outcome evaluation plus
//! the predictors consulted in decode and trained from execute.

/// Integer ALU.
pub mod alu;

/// Branch evaluation and prediction.
pub mod bru;

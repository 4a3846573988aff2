//! Core processor implementation.
//!
//! This module contains the five-stage pipeline, the execution units it drives
//! and the architectural register file it owns.

/// Architectural state (integer register file).
pub mod arch;

/// Instruction pipeline implementation (stages, latches, hazards, engine).
pub mod pipeline;

/// Execution units (ALU, branch predictor).
pub mod units;

pub use self::pipeline::engine::{Pipeline, TickReport};

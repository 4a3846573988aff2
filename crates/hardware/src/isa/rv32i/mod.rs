//! RV32I Base Integer Instruction Set.
//!
//! Encoding constants for the 37 base instructions implemented by the core.

/// Major opcodes (bits 6-0).
pub mod opcodes;

/// Function codes distinguishing instructions within an opcode (bits 14-12).
pub mod funct3;

/// Upper function codes (bits 31-25).
pub mod funct7;

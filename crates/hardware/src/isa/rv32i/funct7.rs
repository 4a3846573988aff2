//! RISC-V Base Integer (I) Function Codes (funct7).

/// Default funct7 (ADD, SRL, SLL, ...).
pub const DEFAULT: u32 = 0b0000000;
/// SUB and SRA/SRAI select the alternate operation.
pub const ALT: u32 = 0b0100000;

//! RISC-V Application Binary Interface (ABI) register names.
//!
//! Maps between register indices and the `x`/ABI spellings accepted by the
//! assembler and printed by the disassembler.

/// Register x0 (zero register, always zero).
pub const REG_ZERO: usize = 0;
/// Register x1 (return address, ra).
pub const REG_RA: usize = 1;
/// Register x2 (stack pointer, sp).
pub const REG_SP: usize = 2;
/// Register x10 (first argument/return value, a0).
pub const REG_A0: usize = 10;

/// ABI register names for x0–x31.
pub const REG_NAMES: [&str; 32] = [
    "zero", "ra", "sp", "gp", "tp", "t0", "t1", "t2", "s0", "s1", "a0", "a1", "a2", "a3", "a4",
    "a5", "a6", "a7", "s2", "s3", "s4", "s5", "s6", "s7", "s8", "s9", "s10", "s11", "t3", "t4",
    "t5", "t6",
];

/// Returns the ABI name for a register index.
#[inline]
pub fn reg_name(idx: usize) -> &'static str {
    REG_NAMES.get(idx).copied().unwrap_or("x??")
}

/// Parses `x0`..`x31`, an ABI name or `fp`, ignoring case.
pub fn parse_register(text: &str) -> Option<usize> {
    let lower = text.to_ascii_lowercase();
    if let Some(num) = lower.strip_prefix('x') {
        if !num.is_empty() && num.chars().all(|c| c.is_ascii_digit()) {
            return num.parse::<usize>().ok().filter(|&n| n < 32);
        }
    }
    if lower == "fp" {
        return Some(8);
    }
    REG_NAMES.iter().position(|&name| name == lower)
}

//! RV32I General-Purpose Register File.
//!
//! This module implements the register file read by decode and written by
//! writeback. It performs the following:
//! 1. **Storage:** Maintains 32 word-wide integer registers (`x0`-`x31`).
//! 2. **Invariant Enforcement:** Register `x0` reads as zero and ignores writes.
//! 3. **Debugging:** Formats the complete register state for dumps.

use std::fmt;

use crate::common::constants::REG_COUNT;

/// General-Purpose Register file.
///
/// Register `x0` is hardwired to zero and cannot be modified. Indices are masked
/// to five bits, matching the width of the encoded register fields.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Gpr {
    regs: [u32; REG_COUNT],
}

impl Gpr {
    /// Creates a new register file with all registers initialized to zero.
    pub const fn new() -> Self {
        Self {
            regs: [0; REG_COUNT],
        }
    }

    /// Reads a general-purpose register value.
    ///
    /// # Arguments
    ///
    /// * `idx` - Register index (0-31).
    ///
    /// # Returns
    ///
    /// The 32-bit value stored in the register. Register `x0` always returns 0.
    #[inline]
    pub const fn read(&self, idx: usize) -> u32 {
        let idx = idx & (REG_COUNT - 1);
        if idx == 0 { 0 } else { self.regs[idx] }
    }

    /// Writes a value to a general-purpose register. Writes to `x0` are dropped.
    ///
    /// # Arguments
    ///
    /// * `idx` - Register index (0-31).
    /// * `val` - The 32-bit value to write.
    #[inline]
    pub const fn write(&mut self, idx: usize, val: u32) {
        let idx = idx & (REG_COUNT - 1);
        if idx != 0 {
            self.regs[idx] = val;
        }
    }

    /// Returns a copy of all 32 registers, `x0` included.
    pub const fn snapshot(&self) -> [u32; REG_COUNT] {
        self.regs
    }

    /// Dumps the contents of all general-purpose registers to stdout.
    pub fn dump(&self) {
        print!("{self}");
    }
}

impl fmt::Display for Gpr {
    /// Registers in pairs with hexadecimal formatting.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for i in (0..REG_COUNT).step_by(2) {
            writeln!(
                f,
                "x{:<2}={:#010x} x{:<2}={:#010x}",
                i,
                self.regs[i],
                i + 1,
                self.regs[i + 1]
            )?;
        }
        Ok(())
    }
}

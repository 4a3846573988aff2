//! Integer ALU.
//!
//! One combinational unit serves both the register and immediate forms of every
//! RV32I computational instruction. The operation arrives as the 4-bit
//! [`AluOp`] code produced by decode (`{funct7[5], funct3}`), so the same code
//! selects the same function whichever form the instruction had.

use crate::core::pipeline::signals::AluOp;

/// Shift amounts come from the low five bits of the second operand.
const SHAMT_MASK: u32 = 0x1F;

/// The execute-stage ALU.
#[derive(Debug)]
pub struct Alu;

impl Alu {
    /// Computes `a op b`.
    ///
    /// Addition and subtraction wrap. Comparisons yield 0 or 1. Shifts use
    /// `b & 0x1F`.
    ///
    /// ```
    /// use pqr5_core::core::units::alu::Alu;
    /// use pqr5_core::core::pipeline::signals::AluOp;
    ///
    /// assert_eq!(Alu::execute(AluOp::Add, 42, 8), 50);
    /// assert_eq!(Alu::execute(AluOp::Add, 0xFFFF_FFFF, 1), 0);
    /// assert_eq!(Alu::execute(AluOp::Sll, 0x1, 4), 0x10);
    /// assert_eq!(Alu::execute(AluOp::Slt, -5_i32 as u32, 10), 1);
    /// assert_eq!(Alu::execute(AluOp::Sra, 0x8000_0000, 31), 0xFFFF_FFFF);
    /// ```
    pub const fn execute(op: AluOp, a: u32, b: u32) -> u32 {
        let shamt = b & SHAMT_MASK;
        match op {
            AluOp::Add => a.wrapping_add(b),
            AluOp::Sub => a.wrapping_sub(b),
            AluOp::Xor => a ^ b,
            AluOp::Or => a | b,
            AluOp::And => a & b,
            AluOp::Slt => Self::less_than(a, b, true) as u32,
            AluOp::Sltu => Self::less_than(a, b, false) as u32,
            AluOp::Sll => a << shamt,
            AluOp::Srl => a >> shamt,
            AluOp::Sra => ((a as i32) >> shamt) as u32,
        }
    }

    const fn less_than(a: u32, b: u32, signed: bool) -> bool {
        if signed {
            (a as i32) < (b as i32)
        } else {
            a < b
        }
    }
}

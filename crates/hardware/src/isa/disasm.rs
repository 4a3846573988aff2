//! Instruction Disassembler for RV32I.
//!
//! Converts a 32-bit instruction encoding into a human-readable mnemonic
//! string for debug tracing, commit logs, and test diagnostics. Registers are
//! printed with their ABI names; branch and jump offsets are PC-relative.
//!
//! # Usage
//!
//! ```
//! use pqr5_core::isa::disasm::disassemble;
//! let text = disassemble(0x00A00513); // ADDI x10, x0, 10
//! assert_eq!(text, "addi a0, zero, 10");
//! ```

use std::fmt;

use crate::core::pipeline::signals::{AluOp, MemWidth};
use crate::isa::abi::reg_name;
use crate::isa::decode::{Instruction, decode};

/// Disassembles a 32-bit RV32I instruction into a human-readable string.
///
/// Returns a mnemonic like `"add a0, a1, a2"` or `"unknown"` for
/// encodings the core does not implement.
///
/// # Arguments
///
/// * `inst` - The raw 32-bit instruction encoding.
pub fn disassemble(inst: u32) -> String {
    match decode(inst) {
        Ok(decoded) => decoded.to_string(),
        Err(_) => "unknown".to_string(),
    }
}

const fn load_mnemonic(width: MemWidth, signed: bool) -> &'static str {
    match (width, signed) {
        (MemWidth::Byte, true) => "lb",
        (MemWidth::Half, true) => "lh",
        (MemWidth::Word, _) => "lw",
        (MemWidth::Byte, false) => "lbu",
        (MemWidth::Half, false) => "lhu",
    }
}

const fn store_mnemonic(width: MemWidth) -> &'static str {
    match width {
        MemWidth::Byte => "sb",
        MemWidth::Half => "sh",
        MemWidth::Word => "sw",
    }
}

/// Immediate-form mnemonic (`addi`, `srai`, ...). There is no `subi`.
const fn imm_mnemonic(op: AluOp) -> &'static str {
    match op {
        AluOp::Add | AluOp::Sub => "addi",
        AluOp::Sll => "slli",
        AluOp::Slt => "slti",
        AluOp::Sltu => "sltiu",
        AluOp::Xor => "xori",
        AluOp::Srl => "srli",
        AluOp::Or => "ori",
        AluOp::And => "andi",
        AluOp::Sra => "srai",
    }
}

impl fmt::Display for Instruction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            Self::Lui { rd, imm } => write!(f, "lui {}, {:#x}", reg_name(rd), imm >> 12),
            Self::Auipc { rd, imm } => write!(f, "auipc {}, {:#x}", reg_name(rd), imm >> 12),
            Self::Jal { rd, offset } => write!(f, "jal {}, {offset}", reg_name(rd)),
            Self::Jalr { rd, rs1, offset } => {
                write!(f, "jalr {}, {offset}({})", reg_name(rd), reg_name(rs1))
            }
            Self::Branch {
                cond,
                rs1,
                rs2,
                offset,
            } => write!(
                f,
                "{} {}, {}, {offset}",
                cond.mnemonic(),
                reg_name(rs1),
                reg_name(rs2)
            ),
            Self::Load {
                width,
                signed,
                rd,
                rs1,
                offset,
            } => write!(
                f,
                "{} {}, {offset}({})",
                load_mnemonic(width, signed),
                reg_name(rd),
                reg_name(rs1)
            ),
            Self::Store {
                width,
                rs1,
                rs2,
                offset,
            } => write!(
                f,
                "{} {}, {offset}({})",
                store_mnemonic(width),
                reg_name(rs2),
                reg_name(rs1)
            ),
            Self::OpImm { op, rd, rs1, imm } => write!(
                f,
                "{} {}, {}, {imm}",
                imm_mnemonic(op),
                reg_name(rd),
                reg_name(rs1)
            ),
            Self::Op { op, rd, rs1, rs2 } => write!(
                f,
                "{} {}, {}, {}",
                op.mnemonic(),
                reg_name(rd),
                reg_name(rs1),
                reg_name(rs2)
            ),
        }
    }
}

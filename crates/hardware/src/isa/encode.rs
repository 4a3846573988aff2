//! RV32I Instruction Encoder.
//!
//! The inverse of [`crate::isa::decode`]: packs an [`Instruction`] back into its
//! 32-bit encoding. Used by the assembler and by tests that build programs from
//! typed instructions.

use crate::core::pipeline::signals::{BranchCond, MemWidth};
use crate::isa::decode::Instruction;
use crate::isa::instruction::Field;
use crate::isa::rv32i::{funct3, funct7, opcodes};

impl Instruction {
    /// Packs the instruction into its 32-bit RV32I encoding.
    ///
    /// Offsets and immediates are truncated to their field width; callers that
    /// need range checks (the assembler) perform them beforehand.
    ///
    /// # Examples
    ///
    /// ```
    /// use pqr5_core::isa::decode::{decode, Instruction};
    ///
    /// let jal = Instruction::Jal { rd: 0, offset: 8 };
    /// assert_eq!(decode(jal.encode()), Ok(jal));
    /// ```
    pub fn encode(&self) -> u32 {
        match *self {
            Self::Lui { rd, imm } => u_type(opcodes::OP_LUI, rd, imm),
            Self::Auipc { rd, imm } => u_type(opcodes::OP_AUIPC, rd, imm),
            Self::Jal { rd, offset } => j_type(rd, offset),
            Self::Jalr { rd, rs1, offset } => {
                i_type(opcodes::OP_JALR, funct3::JALR, rd, rs1, offset)
            }
            Self::Branch {
                cond,
                rs1,
                rs2,
                offset,
            } => b_type(branch_funct3(cond), rs1, rs2, offset),
            Self::Load {
                width,
                signed,
                rd,
                rs1,
                offset,
            } => i_type(opcodes::OP_LOAD, load_funct3(width, signed), rd, rs1, offset),
            Self::Store {
                width,
                rs1,
                rs2,
                offset,
            } => s_type(store_funct3(width), rs1, rs2, offset),
            Self::OpImm { op, rd, rs1, imm } => {
                let bits = u32::from(op.bits());
                let f3 = bits & 0x7;
                let imm = if f3 == funct3::SLL || f3 == funct3::SRL_SRA {
                    let upper = if bits & 0x8 != 0 { funct7::ALT } else { funct7::DEFAULT };
                    ((upper << 5) | (imm as u32 & 0x1F)) as i32
                } else {
                    imm
                };
                i_type(opcodes::OP_IMM, f3, rd, rs1, imm)
            }
            Self::Op { op, rd, rs1, rs2 } => {
                let bits = u32::from(op.bits());
                let f7 = if bits & 0x8 != 0 { funct7::ALT } else { funct7::DEFAULT };
                Field::Funct7.put(f7)
                    | Field::Rs2.put_reg(rs2)
                    | Field::Rs1.put_reg(rs1)
                    | Field::Funct3.put(bits)
                    | Field::Rd.put_reg(rd)
                    | opcodes::OP_REG
            }
        }
    }
}

const fn branch_funct3(cond: BranchCond) -> u32 {
    match cond {
        BranchCond::Eq => funct3::BEQ,
        BranchCond::Ne => funct3::BNE,
        BranchCond::Lt => funct3::BLT,
        BranchCond::Ge => funct3::BGE,
        BranchCond::Ltu => funct3::BLTU,
        BranchCond::Geu => funct3::BGEU,
    }
}

const fn load_funct3(width: MemWidth, signed: bool) -> u32 {
    match (width, signed) {
        (MemWidth::Byte, true) => funct3::LB,
        (MemWidth::Half, true) => funct3::LH,
        (MemWidth::Word, _) => funct3::LW,
        (MemWidth::Byte, false) => funct3::LBU,
        (MemWidth::Half, false) => funct3::LHU,
    }
}

const fn store_funct3(width: MemWidth) -> u32 {
    match width {
        MemWidth::Byte => funct3::SB,
        MemWidth::Half => funct3::SH,
        MemWidth::Word => funct3::SW,
    }
}

const fn i_type(opcode: u32, f3: u32, rd: usize, rs1: usize, imm: i32) -> u32 {
    ((imm as u32 & 0xFFF) << 20)
        | Field::Rs1.put_reg(rs1)
        | Field::Funct3.put(f3)
        | Field::Rd.put_reg(rd)
        | opcode
}

const fn s_type(f3: u32, rs1: usize, rs2: usize, imm: i32) -> u32 {
    let imm = imm as u32;
    (((imm >> 5) & 0x7F) << 25)
        | Field::Rs2.put_reg(rs2)
        | Field::Rs1.put_reg(rs1)
        | Field::Funct3.put(f3)
        | ((imm & 0x1F) << 7)
        | opcodes::OP_STORE
}

const fn b_type(f3: u32, rs1: usize, rs2: usize, offset: i32) -> u32 {
    let imm = offset as u32;
    (((imm >> 12) & 0x1) << 31)
        | (((imm >> 5) & 0x3F) << 25)
        | Field::Rs2.put_reg(rs2)
        | Field::Rs1.put_reg(rs1)
        | Field::Funct3.put(f3)
        | (((imm >> 1) & 0xF) << 8)
        | (((imm >> 11) & 0x1) << 7)
        | opcodes::OP_BRANCH
}

const fn u_type(opcode: u32, rd: usize, imm: u32) -> u32 {
    (imm & 0xFFFF_F000) | Field::Rd.put_reg(rd) | opcode
}

const fn j_type(rd: usize, offset: i32) -> u32 {
    let imm = offset as u32;
    (((imm >> 20) & 0x1) << 31)
        | (((imm >> 1) & 0x3FF) << 21)
        | (((imm >> 11) & 0x1) << 20)
        | (((imm >> 12) & 0xFF) << 12)
        | Field::Rd.put_reg(rd)
        | opcodes::OP_JAL
}

//! RV32I Instruction Decoder.
//!
//! This module turns a 32-bit encoding into the tagged [`Instruction`] sum type.
//! Decoding happens once, in the decode stage; later stages carry the variant as
//! data. It performs:
//! 1. **Classification:** Opcode family selection and funct3/funct7 validation.
//! 2. **Immediate Extraction:** I/S/B/U/J immediates, sign-extended per RV32I.
//! 3. **Fault Detection:** Any encoding outside the 37 base instructions yields a
//!    [`DecodeFault`] carrying the raw word.

use crate::common::error::DecodeFault;
use crate::core::pipeline::signals::{AluOp, BranchCond, InstClass, InstFormat, InstTags, MemWidth};
use crate::core::units::bru::BranchClass;
use crate::isa::instruction::Fields;
use crate::isa::rv32i::{funct3, funct7, opcodes};

/// Upper 20 bits kept by U-type instructions.
const U_IMM_MASK: u32 = 0xFFFF_F000;

/// funct7 bit that selects SUB/SRA (and SRAI).
const ALT_BIT: u32 = 1 << 5;

/// A decoded RV32I instruction.
///
/// Register fields are indices 0-31. Branch and jump offsets are byte offsets
/// relative to the instruction's own PC.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Instruction {
    /// Load upper immediate: `rd = imm`.
    Lui {
        /// Destination register.
        rd: usize,
        /// Immediate with the low 12 bits clear.
        imm: u32,
    },
    /// Add upper immediate to PC: `rd = pc + imm`.
    Auipc {
        /// Destination register.
        rd: usize,
        /// Immediate with the low 12 bits clear.
        imm: u32,
    },
    /// Jump and link: `rd = pc + 4; pc += offset`.
    Jal {
        /// Link register.
        rd: usize,
        /// Signed byte offset.
        offset: i32,
    },
    /// Jump and link register: `rd = pc + 4; pc = (rs1 + offset) & !1`.
    Jalr {
        /// Link register.
        rd: usize,
        /// Base register.
        rs1: usize,
        /// Signed byte offset.
        offset: i32,
    },
    /// Conditional branch.
    Branch {
        /// Comparison.
        cond: BranchCond,
        /// First compared register.
        rs1: usize,
        /// Second compared register.
        rs2: usize,
        /// Signed byte offset.
        offset: i32,
    },
    /// Load from data memory.
    Load {
        /// Access width.
        width: MemWidth,
        /// Sign-extend the loaded value.
        signed: bool,
        /// Destination register.
        rd: usize,
        /// Base register.
        rs1: usize,
        /// Signed byte offset.
        offset: i32,
    },
    /// Store to data memory.
    Store {
        /// Access width.
        width: MemWidth,
        /// Base register.
        rs1: usize,
        /// Data register.
        rs2: usize,
        /// Signed byte offset.
        offset: i32,
    },
    /// Register-immediate ALU operation.
    OpImm {
        /// ALU operation.
        op: AluOp,
        /// Destination register.
        rd: usize,
        /// Source register.
        rs1: usize,
        /// Sign-extended immediate (shift amount for shifts).
        imm: i32,
    },
    /// Register-register ALU operation.
    Op {
        /// ALU operation.
        op: AluOp,
        /// Destination register.
        rd: usize,
        /// First source register.
        rs1: usize,
        /// Second source register.
        rs2: usize,
    },
}

impl Default for Instruction {
    /// The canonical NOP, `addi x0, x0, 0`.
    fn default() -> Self {
        Self::OpImm {
            op: AluOp::Add,
            rd: 0,
            rs1: 0,
            imm: 0,
        }
    }
}

impl Instruction {
    /// Encoding format of the instruction.
    pub const fn format(&self) -> InstFormat {
        match self {
            Self::Lui { .. } | Self::Auipc { .. } => InstFormat::U,
            Self::Jal { .. } => InstFormat::J,
            Self::Branch { .. } => InstFormat::B,
            Self::Store { .. } => InstFormat::S,
            Self::Op { .. } => InstFormat::R,
            Self::Jalr { .. } | Self::Load { .. } | Self::OpImm { .. } => InstFormat::I,
        }
    }

    /// Instruction-mix category.
    pub const fn class(&self) -> InstClass {
        match self {
            Self::Load { .. } => InstClass::Load,
            Self::Store { .. } => InstClass::Store,
            Self::Branch { .. } => InstClass::Branch,
            Self::Jal { .. } | Self::Jalr { .. } => InstClass::Jump,
            Self::Lui { .. } | Self::Auipc { .. } | Self::OpImm { .. } | Self::Op { .. } => {
                InstClass::Alu
            }
        }
    }

    /// Hazard tags derived from the format.
    pub const fn tags(&self) -> InstTags {
        InstTags::from_format(self.format())
    }

    /// Returns `true` if the instruction reads both `rs1` and `rs2`.
    pub const fn reads_two_sources(&self) -> bool {
        self.tags().two_sources
    }

    /// Returns `true` if the instruction produces a value for `rd`.
    pub const fn writes_destination(&self) -> bool {
        self.tags().writes_rd
    }

    /// First source register, or 0 when the instruction has none.
    pub const fn rs1(&self) -> usize {
        match *self {
            Self::Jalr { rs1, .. }
            | Self::Branch { rs1, .. }
            | Self::Load { rs1, .. }
            | Self::Store { rs1, .. }
            | Self::OpImm { rs1, .. }
            | Self::Op { rs1, .. } => rs1,
            Self::Lui { .. } | Self::Auipc { .. } | Self::Jal { .. } => 0,
        }
    }

    /// Second source register, or 0 when the instruction has none.
    pub const fn rs2(&self) -> usize {
        match *self {
            Self::Branch { rs2, .. } | Self::Store { rs2, .. } | Self::Op { rs2, .. } => rs2,
            _ => 0,
        }
    }

    /// Destination register, or 0 when the instruction writes none.
    pub const fn rd(&self) -> usize {
        match *self {
            Self::Lui { rd, .. }
            | Self::Auipc { rd, .. }
            | Self::Jal { rd, .. }
            | Self::Jalr { rd, .. }
            | Self::Load { rd, .. }
            | Self::OpImm { rd, .. }
            | Self::Op { rd, .. } => rd,
            Self::Branch { .. } | Self::Store { .. } => 0,
        }
    }

    /// The decoded immediate (0 for R-type).
    pub const fn immediate(&self) -> i32 {
        match *self {
            Self::Lui { imm, .. } | Self::Auipc { imm, .. } => imm as i32,
            Self::Jal { offset, .. }
            | Self::Jalr { offset, .. }
            | Self::Branch { offset, .. }
            | Self::Load { offset, .. }
            | Self::Store { offset, .. } => offset,
            Self::OpImm { imm, .. } => imm,
            Self::Op { .. } => 0,
        }
    }

    /// Returns `true` for LB/LH/LW/LBU/LHU.
    pub const fn is_load(&self) -> bool {
        matches!(self, Self::Load { .. })
    }

    /// Returns `true` for SB/SH/SW.
    pub const fn is_store(&self) -> bool {
        matches!(self, Self::Store { .. })
    }

    /// Control-flow class, or `None` for straight-line instructions.
    pub const fn branch_class(&self) -> Option<BranchClass> {
        match *self {
            Self::Branch { offset, .. } => Some(BranchClass::Conditional {
                backward: offset < 0,
            }),
            Self::Jal { .. } => Some(BranchClass::Direct),
            Self::Jalr { .. } => Some(BranchClass::Indirect),
            _ => None,
        }
    }

    /// Target of a PC-relative branch or jump located at `pc`.
    ///
    /// Returns `None` for JALR and non-control-flow instructions.
    pub const fn static_target(&self, pc: u32) -> Option<u32> {
        match *self {
            Self::Jal { offset, .. } | Self::Branch { offset, .. } => {
                Some(pc.wrapping_add(offset as u32))
            }
            _ => None,
        }
    }
}

/// Decodes a 32-bit word into an [`Instruction`].
///
/// # Arguments
///
/// * `inst` - The 32-bit instruction encoding to decode
///
/// # Returns
///
/// The decoded instruction, or a [`DecodeFault`] if the word is not one of the
/// 37 base RV32I instructions. FENCE, ECALL, EBREAK and CSR accesses fault.
///
/// # Examples
///
/// ```
/// use pqr5_core::isa::decode::{decode, Instruction};
/// use pqr5_core::core::pipeline::signals::AluOp;
///
/// // addi a0, zero, 10
/// let inst = decode(0x00A0_0513).unwrap();
/// assert_eq!(inst, Instruction::OpImm { op: AluOp::Add, rd: 10, rs1: 0, imm: 10 });
/// assert!(decode(0x0000_0000).is_err());
/// ```
pub fn decode(inst: u32) -> Result<Instruction, DecodeFault> {
    let Fields {
        opcode,
        rd,
        funct3: f3,
        rs1,
        rs2,
        funct7: f7,
    } = Fields::split(inst);

    let bad_funct3 = DecodeFault::UnknownFunct3 {
        word: inst,
        opcode,
        funct3: f3,
    };
    let bad_funct7 = DecodeFault::UnknownFunct7 {
        word: inst,
        funct7: f7,
    };

    let decoded = match opcode {
        opcodes::OP_LUI => Instruction::Lui {
            rd,
            imm: decode_u_type_imm(inst),
        },
        opcodes::OP_AUIPC => Instruction::Auipc {
            rd,
            imm: decode_u_type_imm(inst),
        },
        opcodes::OP_JAL => Instruction::Jal {
            rd,
            offset: decode_j_type_imm(inst),
        },
        opcodes::OP_JALR => {
            if f3 != funct3::JALR {
                return Err(bad_funct3);
            }
            Instruction::Jalr {
                rd,
                rs1,
                offset: decode_i_type_imm(inst),
            }
        }
        opcodes::OP_BRANCH => {
            let cond = match f3 {
                funct3::BEQ => BranchCond::Eq,
                funct3::BNE => BranchCond::Ne,
                funct3::BLT => BranchCond::Lt,
                funct3::BGE => BranchCond::Ge,
                funct3::BLTU => BranchCond::Ltu,
                funct3::BGEU => BranchCond::Geu,
                _ => return Err(bad_funct3),
            };
            Instruction::Branch {
                cond,
                rs1,
                rs2,
                offset: decode_b_type_imm(inst),
            }
        }
        opcodes::OP_LOAD => {
            let (width, signed) = match f3 {
                funct3::LB => (MemWidth::Byte, true),
                funct3::LH => (MemWidth::Half, true),
                funct3::LW => (MemWidth::Word, true),
                funct3::LBU => (MemWidth::Byte, false),
                funct3::LHU => (MemWidth::Half, false),
                _ => return Err(bad_funct3),
            };
            Instruction::Load {
                width,
                signed,
                rd,
                rs1,
                offset: decode_i_type_imm(inst),
            }
        }
        opcodes::OP_STORE => {
            let width = match f3 {
                funct3::SB => MemWidth::Byte,
                funct3::SH => MemWidth::Half,
                funct3::SW => MemWidth::Word,
                _ => return Err(bad_funct3),
            };
            Instruction::Store {
                width,
                rs1,
                rs2,
                offset: decode_s_type_imm(inst),
            }
        }
        opcodes::OP_IMM => {
            let imm = decode_i_type_imm(inst);
            let op = match f3 {
                funct3::SLL if f7 == funct7::DEFAULT => AluOp::Sll,
                funct3::SRL_SRA if f7 == funct7::DEFAULT => AluOp::Srl,
                funct3::SRL_SRA if f7 == funct7::ALT => AluOp::Sra,
                funct3::SLL | funct3::SRL_SRA => return Err(bad_funct7),
                _ => alu_op(f3, 0),
            };
            let imm = if matches!(op, AluOp::Sll | AluOp::Srl | AluOp::Sra) {
                imm & 0x1F
            } else {
                imm
            };
            Instruction::OpImm { op, rd, rs1, imm }
        }
        opcodes::OP_REG => {
            let op = match f7 {
                funct7::DEFAULT => alu_op(f3, 0),
                funct7::ALT if f3 == funct3::ADD_SUB || f3 == funct3::SRL_SRA => {
                    alu_op(f3, ALT_BIT)
                }
                _ => return Err(bad_funct7),
            };
            Instruction::Op { op, rd, rs1, rs2 }
        }
        _ => return Err(DecodeFault::UnknownOpcode { word: inst, opcode }),
    };

    Ok(decoded)
}

/// Builds the 4-bit ALU code `{funct7[5], funct3}`.
fn alu_op(f3: u32, alt: u32) -> AluOp {
    let bits = (((alt & ALT_BIT) >> 2) | f3) as u8;
    AluOp::from_bits(bits).unwrap_or_default()
}

/// Decodes the immediate value for I-Type instructions.
///
/// I-Type format: `imm[11:0] | rs1 | funct3 | rd | opcode`
pub(crate) const fn decode_i_type_imm(inst: u32) -> i32 {
    (inst as i32) >> 20
}

/// Decodes the immediate value for S-Type instructions.
///
/// S-Type format: `imm[11:5] | rs2 | rs1 | funct3 | imm[4:0] | opcode`
pub(crate) const fn decode_s_type_imm(inst: u32) -> i32 {
    let low = (inst >> 7) & 0x1F;
    let high = (inst >> 25) & 0x7F;
    sign_extend((high << 5) | low, 12)
}

/// Decodes the immediate value for B-Type instructions.
///
/// B-Type format: `imm[12] | imm[10:5] | rs2 | rs1 | funct3 | imm[4:1] | imm[11] | opcode`
pub(crate) const fn decode_b_type_imm(inst: u32) -> i32 {
    let bit_11 = (inst >> 7) & 0x1;
    let bits_4_1 = (inst >> 8) & 0xF;
    let bits_10_5 = (inst >> 25) & 0x3F;
    let bit_12 = (inst >> 31) & 0x1;
    sign_extend(
        (bit_12 << 12) | (bit_11 << 11) | (bits_10_5 << 5) | (bits_4_1 << 1),
        13,
    )
}

/// Decodes the immediate value for U-Type instructions (no sign extension).
pub(crate) const fn decode_u_type_imm(inst: u32) -> u32 {
    inst & U_IMM_MASK
}

/// Decodes the immediate value for J-Type instructions.
///
/// J-Type format: `imm[20] | imm[10:1] | imm[11] | imm[19:12] | rd | opcode`
pub(crate) const fn decode_j_type_imm(inst: u32) -> i32 {
    let bits_19_12 = (inst >> 12) & 0xFF;
    let bit_11 = (inst >> 20) & 0x1;
    let bits_10_1 = (inst >> 21) & 0x3FF;
    let bit_20 = (inst >> 31) & 0x1;
    sign_extend(
        (bit_20 << 20) | (bits_19_12 << 12) | (bit_11 << 11) | (bits_10_1 << 1),
        21,
    )
}

/// Sign extends a value of `bits` width to a 32-bit signed integer.
const fn sign_extend(val: u32, bits: u32) -> i32 {
    let shift = 32 - bits;
    ((val << shift) as i32) >> shift
}

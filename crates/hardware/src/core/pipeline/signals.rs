//! Pipeline control signals and operation types.
//!
//! This module defines the signals that control instruction execution. It performs:
//! 1. **Operation Classification:** The 4-bit internal ALU opcode and branch conditions.
//! 2. **Memory Control:** Access widths and sign-extension of loaded values.
//! 3. **Hazard Tags:** Instruction format and the composite "two source reads" and
//!    "destination write" tags consumed by the forwarding logic.

/// 4-bit internal ALU operation.
///
/// The discriminant is `{funct7[5], funct3}` of the RV32I encoding, so register and
/// immediate forms map onto the same code.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum AluOp {
    /// Integer addition.
    #[default]
    Add = 0b0000,

    /// Shift left logical.
    Sll = 0b0001,

    /// Set less than (signed).
    Slt = 0b0010,

    /// Set less than unsigned.
    Sltu = 0b0011,

    /// Bitwise XOR.
    Xor = 0b0100,

    /// Shift right logical.
    Srl = 0b0101,

    /// Bitwise OR.
    Or = 0b0110,

    /// Bitwise AND.
    And = 0b0111,

    /// Integer subtraction.
    Sub = 0b1000,

    /// Shift right arithmetic.
    Sra = 0b1101,
}

impl AluOp {
    /// Builds the operation from its 4-bit code, if the code is assigned.
    pub const fn from_bits(bits: u8) -> Option<Self> {
        Some(match bits & 0xF {
            0b0000 => Self::Add,
            0b0001 => Self::Sll,
            0b0010 => Self::Slt,
            0b0011 => Self::Sltu,
            0b0100 => Self::Xor,
            0b0101 => Self::Srl,
            0b0110 => Self::Or,
            0b0111 => Self::And,
            0b1000 => Self::Sub,
            0b1101 => Self::Sra,
            _ => return None,
        })
    }

    /// Returns the 4-bit code.
    pub const fn bits(self) -> u8 {
        self as u8
    }

    /// Lower-case mnemonic of the register form (`add`, `sra`, ...).
    pub const fn mnemonic(self) -> &'static str {
        match self {
            Self::Add => "add",
            Self::Sll => "sll",
            Self::Slt => "slt",
            Self::Sltu => "sltu",
            Self::Xor => "xor",
            Self::Srl => "srl",
            Self::Or => "or",
            Self::And => "and",
            Self::Sub => "sub",
            Self::Sra => "sra",
        }
    }
}

/// Condition evaluated by a conditional branch.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum BranchCond {
    /// Taken when `rs1 == rs2`.
    Eq,
    /// Taken when `rs1 != rs2`.
    Ne,
    /// Taken when `rs1 < rs2` (signed).
    Lt,
    /// Taken when `rs1 >= rs2` (signed).
    Ge,
    /// Taken when `rs1 < rs2` (unsigned).
    Ltu,
    /// Taken when `rs1 >= rs2` (unsigned).
    Geu,
}

impl BranchCond {
    /// Evaluates the condition on two operand values.
    pub const fn evaluate(self, a: u32, b: u32) -> bool {
        match self {
            Self::Eq => a == b,
            Self::Ne => a != b,
            Self::Lt => (a as i32) < (b as i32),
            Self::Ge => (a as i32) >= (b as i32),
            Self::Ltu => a < b,
            Self::Geu => a >= b,
        }
    }

    /// Lower-case mnemonic (`beq`, `bgeu`, ...).
    pub const fn mnemonic(self) -> &'static str {
        match self {
            Self::Eq => "beq",
            Self::Ne => "bne",
            Self::Lt => "blt",
            Self::Ge => "bge",
            Self::Ltu => "bltu",
            Self::Geu => "bgeu",
        }
    }
}

/// Memory access width.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum MemWidth {
    /// 8-bit access.
    Byte,
    /// 16-bit access.
    Half,
    /// 32-bit access.
    #[default]
    Word,
}

impl MemWidth {
    /// Size of the access in bytes.
    pub const fn bytes(self) -> u32 {
        match self {
            Self::Byte => 1,
            Self::Half => 2,
            Self::Word => 4,
        }
    }

    /// Extends the low `bytes()` of `raw` to 32 bits, signed or zero-filled.
    pub const fn extend(self, raw: u32, signed: bool) -> u32 {
        match (self, signed) {
            (Self::Byte, true) => raw as u8 as i8 as i32 as u32,
            (Self::Byte, false) => raw & 0xFF,
            (Self::Half, true) => raw as u16 as i16 as i32 as u32,
            (Self::Half, false) => raw & 0xFFFF,
            (Self::Word, _) => raw,
        }
    }
}

/// RV32I encoding format.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum InstFormat {
    /// Register-register.
    R,
    /// Register-immediate, loads and JALR.
    #[default]
    I,
    /// Stores.
    S,
    /// Conditional branches.
    B,
    /// LUI and AUIPC.
    U,
    /// JAL.
    J,
}

/// Instruction-mix category reported with every commit.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum InstClass {
    /// Computational, including LUI and AUIPC.
    #[default]
    Alu,
    /// LB/LH/LW/LBU/LHU.
    Load,
    /// SB/SH/SW.
    Store,
    /// Conditional branches.
    Branch,
    /// JAL and JALR.
    Jump,
}

/// Hazard-relevant classification computed once in decode.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct InstTags {
    /// Encoding format.
    pub format: InstFormat,
    /// The instruction reads `rs1` and `rs2` (R, S and B formats).
    pub two_sources: bool,
    /// The instruction produces a value for `rd` (R, I, U and J formats).
    pub writes_rd: bool,
}

impl InstTags {
    /// Derives the composite tags from a format.
    pub const fn from_format(format: InstFormat) -> Self {
        Self {
            format,
            two_sources: matches!(format, InstFormat::R | InstFormat::S | InstFormat::B),
            writes_rd: matches!(
                format,
                InstFormat::R | InstFormat::I | InstFormat::U | InstFormat::J
            ),
        }
    }

    /// The instruction reads `rs1` (everything except U and J formats).
    pub const fn reads_rs1(&self) -> bool {
        !matches!(self.format, InstFormat::U | InstFormat::J)
    }
}

//! Fixed-position fields of a 32-bit RV32I word.
//!
//! Every format shares the same opcode, register and function slots; only the
//! immediate bits move around, and those are handled by [`crate::isa::decode`]
//! and [`crate::isa::encode`]. [`Field`] describes one slot and can both pull a
//! value out of a word and place a value into one.

/// One fixed slot of the encoding.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Field {
    /// Bits 6:0.
    Opcode,
    /// Bits 11:7.
    Rd,
    /// Bits 14:12.
    Funct3,
    /// Bits 19:15.
    Rs1,
    /// Bits 24:20.
    Rs2,
    /// Bits 31:25.
    Funct7,
}

impl Field {
    /// Position of the least significant bit.
    pub const fn lsb(self) -> u32 {
        match self {
            Self::Opcode => 0,
            Self::Rd => 7,
            Self::Funct3 => 12,
            Self::Rs1 => 15,
            Self::Rs2 => 20,
            Self::Funct7 => 25,
        }
    }

    /// Field width in bits.
    pub const fn width(self) -> u32 {
        match self {
            Self::Opcode | Self::Funct7 => 7,
            Self::Rd | Self::Rs1 | Self::Rs2 => 5,
            Self::Funct3 => 3,
        }
    }

    const fn mask(self) -> u32 {
        (1 << self.width()) - 1
    }

    /// Reads the field out of `word`.
    #[inline]
    pub const fn get(self, word: u32) -> u32 {
        (word >> self.lsb()) & self.mask()
    }

    /// Returns `value` shifted into place; bits past the width are dropped.
    #[inline]
    pub const fn put(self, value: u32) -> u32 {
        (value & self.mask()) << self.lsb()
    }

    /// Places a register index.
    #[inline]
    pub const fn put_reg(self, idx: usize) -> u32 {
        self.put(idx as u32)
    }
}

/// All fixed fields of a word, split out in one go.
///
/// Register indices are `usize` because they go straight into the register
/// file; the remaining fields stay `u32` for matching against the constants in
/// [`crate::isa::rv32i`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Fields {
    /// Major opcode.
    pub opcode: u32,
    /// Destination register.
    pub rd: usize,
    /// Minor opcode.
    pub funct3: u32,
    /// First source register.
    pub rs1: usize,
    /// Second source register.
    pub rs2: usize,
    /// ALT/DEFAULT selector for R-type and shifts.
    pub funct7: u32,
}

impl Fields {
    /// Splits `word` into its fixed fields.
    pub const fn split(word: u32) -> Self {
        Self {
            opcode: Field::Opcode.get(word),
            rd: Field::Rd.get(word) as usize,
            funct3: Field::Funct3.get(word),
            rs1: Field::Rs1.get(word) as usize,
            rs2: Field::Rs2.get(word) as usize,
            funct7: Field::Funct7.get(word),
        }
    }
}

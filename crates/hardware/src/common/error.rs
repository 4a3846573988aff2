//! Error and fault definitions.
//!
//! This module defines the error handling for the simulator. It provides:
//! 1. **Decode Faults:** Distinguishable conditions for encodings outside RV32I.
//! 2. **Load Errors:** Malformed or out-of-range program images.
//! 3. **Assembler Errors:** Source-level diagnostics with line numbers.
//! 4. **Simulator Errors:** The umbrella type returned by fallible entry points.

use std::path::PathBuf;

use thiserror::Error;

/// An instruction word that is not one of the 37 supported RV32I instructions.
///
/// The pipeline never executes a faulting word. Decode turns it into a bubble and
/// reports the fault alongside the cycle's commit.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Error)]
pub enum DecodeFault {
    /// The major opcode (bits 6-0) is not implemented.
    #[error("unknown opcode {opcode:#09b} in {word:#010x}")]
    UnknownOpcode {
        /// Raw instruction word.
        word: u32,
        /// Offending opcode field.
        opcode: u32,
    },

    /// The opcode is known but funct3 selects no instruction.
    #[error("unknown funct3 {funct3:#05b} for opcode {opcode:#09b} in {word:#010x}")]
    UnknownFunct3 {
        /// Raw instruction word.
        word: u32,
        /// Opcode field.
        opcode: u32,
        /// Offending funct3 field.
        funct3: u32,
    },

    /// funct7 (or the shift-immediate upper bits) is not a legal value.
    #[error("unknown funct7 {funct7:#09b} in {word:#010x}")]
    UnknownFunct7 {
        /// Raw instruction word.
        word: u32,
        /// Offending funct7 field.
        funct7: u32,
    },
}

impl DecodeFault {
    /// Returns the raw instruction word that failed to decode.
    pub const fn word(&self) -> u32 {
        match *self {
            Self::UnknownOpcode { word, .. }
            | Self::UnknownFunct3 { word, .. }
            | Self::UnknownFunct7 { word, .. } => word,
        }
    }
}

/// Errors raised while parsing or placing a program image.
#[derive(Debug, Error)]
pub enum LoadError {
    /// The first word is neither of the PQR5 preambles.
    #[error("bad preamble {0:#010x}")]
    BadPreamble(u32),

    /// The word after the program body is not the PQR5 postamble.
    #[error("bad postamble {0:#010x}")]
    BadPostamble(u32),

    /// The image ended before the advertised number of bytes.
    #[error("truncated image: expected {expected} bytes, found {actual}")]
    Truncated {
        /// Bytes required by the header.
        expected: usize,
        /// Bytes actually present.
        actual: usize,
    },

    /// The advertised program size is not a whole number of instructions.
    #[error("program size {0} is not a multiple of 4")]
    Unaligned(u32),

    /// A line of a hex text image could not be parsed.
    #[error("line {line}: invalid hex word `{text}`")]
    HexParse {
        /// 1-based line number.
        line: usize,
        /// Offending text.
        text: String,
    },

    /// The ELF file could not be parsed.
    #[error("invalid ELF: {0}")]
    Elf(String),

    /// The ELF file is not a 32-bit little-endian RISC-V executable.
    #[error("not a 32-bit little-endian RISC-V executable")]
    WrongArchitecture,

    /// A segment does not fit in the target memory.
    #[error("segment at {addr:#010x} ({len} bytes) lies outside memory")]
    OutOfRange {
        /// Segment start address.
        addr: u32,
        /// Segment length in bytes.
        len: usize,
    },
}

/// Kinds of assembler diagnostics.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum AsmErrorKind {
    /// The mnemonic is not an RV32I instruction or supported pseudo instruction.
    #[error("invalid or unsupported opcode `{0}`")]
    UnknownMnemonic(String),

    /// A register operand is not `x0`..`x31` or an ABI name.
    #[error("invalid register `{0}`")]
    BadRegister(String),

    /// An immediate could not be parsed or does not fit its field.
    #[error("invalid immediate `{0}`")]
    BadImmediate(String),

    /// The instruction has the wrong number of operands.
    #[error("expected {expected} operands, found {found}")]
    OperandCount {
        /// Operands required by the mnemonic.
        expected: usize,
        /// Operands supplied.
        found: usize,
    },

    /// A branch or jump names a label that is never defined.
    #[error("undefined label `{0}`")]
    UndefinedLabel(String),

    /// A label is defined twice.
    #[error("duplicate label `{0}`")]
    DuplicateLabel(String),

    /// A branch or jump target is out of reach or misaligned.
    #[error("branch offset {0} out of range")]
    OffsetRange(i64),

    /// A malformed directive.
    #[error("invalid directive `{0}`")]
    BadDirective(String),
}

/// An assembler diagnostic tied to a source line.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
#[error("line {line}: {kind}")]
pub struct AsmError {
    /// 1-based source line number.
    pub line: usize,
    /// What went wrong.
    pub kind: AsmErrorKind,
}

/// Top-level error type for simulator entry points.
#[derive(Debug, Error)]
pub enum SimError {
    /// A file could not be read or written.
    #[error("i/o error on `{path}`: {source}")]
    Io {
        /// File involved.
        path: PathBuf,
        /// Underlying error.
        #[source]
        source: std::io::Error,
    },

    /// A program image was malformed.
    #[error(transparent)]
    Load(#[from] LoadError),

    /// Assembly source was rejected.
    #[error(transparent)]
    Asm(#[from] AsmError),

    /// A configuration file could not be parsed.
    #[error("invalid configuration: {0}")]
    Config(#[from] serde_json::Error),
}

impl SimError {
    /// Wraps an I/O error with the path that caused it.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

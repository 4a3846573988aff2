//! Instruction Set Architecture (ISA) Definitions.
//!
//! Contains the RV32I encoding tables, the decoder that produces the tagged
//! [`decode::Instruction`] type, its encoder, a disassembler and a small
//! assembler for test programs and the command-line tool.

/// Application Binary Interface (ABI) register name mappings.
pub mod abi;

/// Two-pass assembler for RV32I source with the PQR5 pseudo instructions.
pub mod asm;

/// Instruction decoding into the tagged `Instruction` type.
pub mod decode;

/// Instruction disassembler for debug tracing and diagnostics.
pub mod disasm;

/// Packing of decoded instructions back into machine words.
pub mod encode;

/// Fixed-position fields: opcode, registers, funct3, funct7.
pub mod instruction;

/// Base integer instruction set (32-bit RISC-V core instructions).
pub mod rv32i;

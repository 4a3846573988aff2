//! Pipeline latch structures for inter-stage communication.
//!
//! This module defines the records held between the five stages:
//! Fetch → Decode → Execute → Memory → Writeback.
//!
//! 1. **Instruction Flow:** One record per stage boundary; `valid == false` is a bubble.
//! 2. **Computed Results:** Decoded fields after decode, the ALU result or effective
//!    address after execute.
//! 3. **Writeback Output:** The previous cycle's commit, kept as the last forwarding tap.
//!
//! Every latch is `Copy`; `Default` is the bubble.

use crate::isa::decode::Instruction;

/// Entry in the IF/ID latch (Fetch to Decode).
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct IfId {
    /// Holds a fetched instruction.
    pub valid: bool,
    /// Program counter of the instruction.
    pub pc: u32,
    /// Raw 32-bit encoding.
    pub inst: u32,
}

/// Entry in the ID/EX latch (Decode to Execute).
///
/// `rv1`/`rv2` start as the register-file values read in decode. While the entry
/// is held in execute they are refreshed with every operand the forward mux could
/// resolve, so a producer that retires during the wait is not lost.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct IdEx {
    /// Holds a decoded instruction.
    pub valid: bool,
    /// Program counter of the instruction.
    pub pc: u32,
    /// Raw 32-bit encoding.
    pub inst: u32,
    /// Decoded instruction.
    pub op: Instruction,
    /// Value of rs1 as last seen.
    pub rv1: u32,
    /// Value of rs2 as last seen.
    pub rv2: u32,
    /// Decode redirected fetch to the branch target.
    pub pred_taken: bool,
}

/// Entry in the EX/MEM latch (Execute to Memory).
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ExMem {
    /// Holds an executed instruction.
    pub valid: bool,
    /// Program counter of the instruction.
    pub pc: u32,
    /// Raw 32-bit encoding.
    pub inst: u32,
    /// Decoded instruction.
    pub op: Instruction,
    /// Destination value, or the effective address for loads and stores.
    pub result: u32,
    /// Store data (rs2) for stores.
    pub store_data: u32,
}

/// Entry in the MEM/WB latch (Memory to Writeback).
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct MemWb {
    /// Holds an instruction past the memory stage.
    pub valid: bool,
    /// Program counter of the instruction.
    pub pc: u32,
    /// Raw 32-bit encoding.
    pub inst: u32,
    /// Decoded instruction.
    pub op: Instruction,
    /// Destination value, or the load address for loads.
    pub result: u32,
}

/// The register write performed by writeback in the previous cycle.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct WbOut {
    /// A register was written.
    pub valid: bool,
    /// Register written (never 0 when `valid`).
    pub rd: usize,
    /// Value written.
    pub value: u32,
}

/// Returns `true` if a producer with these fields supplies `src`.
#[inline]
pub(crate) const fn produces(valid: bool, op: &Instruction, src: usize) -> bool {
    valid && op.writes_destination() && src != 0 && op.rd() == src
}

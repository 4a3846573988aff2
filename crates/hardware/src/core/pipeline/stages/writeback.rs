//! Writeback (WB) Stage.
//!
//! This module implements the final stage of the instruction pipeline. It produces
//! the commit record for the instruction in MEM/WB: the computed value for
//! ordinary instructions, or the data-port response for loads. The register-file
//! write itself is performed by the engine when the cycle commits.

use crate::core::pipeline::latches::MemWb;
use crate::core::pipeline::signals::InstClass;
use crate::isa::decode::Instruction;
use crate::soc::traits::MemResponse;

/// The architectural effect of one retired instruction.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Commit {
    /// An instruction retired this cycle.
    pub valid: bool,
    /// Program counter of the retired instruction.
    pub pc: u32,
    /// Raw encoding of the retired instruction.
    pub inst: u32,
    /// Register written (0 when none).
    pub rd: usize,
    /// Value written to `rd`.
    pub value: u32,
    /// Mix category, carried from decode.
    pub class: InstClass,
}

/// State of the load in MEM/WB with respect to the data port.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LoadAck {
    /// Not a load, or a bubble.
    None,
    /// Waiting for the response.
    Waiting,
    /// A response arrived but faulted or answers a different address.
    Malformed(MemResponse),
    /// Extended load data.
    Data(u32),
}

/// Output of the writeback stage for one cycle.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct WritebackOutput {
    /// Commit record (invalid while waiting).
    pub commit: Commit,
    /// Load status; `Data` means the response must be consumed on commit.
    pub ack: LoadAck,
}

impl WritebackOutput {
    /// Returns `true` if writeback cannot retire its instruction this cycle.
    pub const fn waiting(&self) -> bool {
        matches!(self.ack, LoadAck::Waiting | LoadAck::Malformed(_))
    }

    /// Load data usable by the forward mux.
    pub const fn load_data(&self) -> Option<u32> {
        match self.ack {
            LoadAck::Data(v) => Some(v),
            _ => None,
        }
    }
}

/// Matches the data-port response against the load in MEM/WB.
///
/// A faulting response or one for another address is never accepted as the
/// acknowledgement, so the load waits indefinitely.
pub fn load_ack(mem_wb: &MemWb, response: Option<MemResponse>) -> LoadAck {
    let Instruction::Load { width, signed, .. } = mem_wb.op else {
        return LoadAck::None;
    };
    if !mem_wb.valid {
        return LoadAck::None;
    }
    match response {
        None => LoadAck::Waiting,
        Some(resp) if resp.fault || resp.addr != mem_wb.result => LoadAck::Malformed(resp),
        Some(resp) => LoadAck::Data(width.extend(resp.data, signed)),
    }
}

/// Executes the writeback stage.
///
/// # Arguments
///
/// * `mem_wb` - Record produced by the memory stage in the previous cycle.
/// * `response` - Oldest completed data-port response, if any.
///
/// # Behavior
///
/// - A bubble produces an invalid commit
/// - A load without a valid acknowledgement produces an invalid commit and waits
/// - Every other instruction retires; `rd` is reported only if it is written
pub fn wb_stage(mem_wb: &MemWb, response: Option<MemResponse>) -> WritebackOutput {
    let ack = load_ack(mem_wb, response);
    if !mem_wb.valid || matches!(ack, LoadAck::Waiting | LoadAck::Malformed(_)) {
        return WritebackOutput {
            commit: Commit::default(),
            ack,
        };
    }

    let value = match ack {
        LoadAck::Data(v) => v,
        _ => mem_wb.result,
    };
    let writes = mem_wb.op.writes_destination() && mem_wb.op.rd() != 0;

    WritebackOutput {
        commit: Commit {
            valid: true,
            pc: mem_wb.pc,
            inst: mem_wb.inst,
            rd: if writes { mem_wb.op.rd() } else { 0 },
            value: if writes { value } else { 0 },
            class: mem_wb.op.class(),
        },
        ack,
    }
}

//! Memory Access (MEM) Stage.
//!
//! This module implements the fourth stage of the instruction pipeline. It turns
//! loads and stores into data-port requests and passes the access descriptor on
//! to writeback. The request is issued by the engine when the stage advances, and
//! the stage stalls while the port is not ready.

use crate::core::pipeline::latches::{ExMem, MemWb};
use crate::isa::decode::Instruction;
use crate::soc::traits::MemRequest;

/// Output of the memory stage for one cycle.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct MemoryOutput {
    /// Record for the MEM/WB latch.
    pub entry: MemWb,
    /// Data-port access to issue if the stage advances.
    pub request: Option<MemRequest>,
}

/// Executes the memory access stage.
///
/// # Arguments
///
/// * `ex_mem` - Record produced by execute in the previous cycle.
///
/// # Behavior
///
/// - Loads and stores produce a request using the effective address in `result`
/// - All other instructions pass through unchanged
pub fn mem_stage(ex_mem: &ExMem) -> MemoryOutput {
    if !ex_mem.valid {
        return MemoryOutput::default();
    }

    let request = match ex_mem.op {
        Instruction::Load { width, .. } => Some(MemRequest::load(ex_mem.result, width)),
        Instruction::Store { width, .. } => Some(MemRequest::store(
            ex_mem.result,
            width,
            ex_mem.store_data,
        )),
        _ => None,
    };

    MemoryOutput {
        entry: MemWb {
            valid: true,
            pc: ex_mem.pc,
            inst: ex_mem.inst,
            op: ex_mem.op,
            result: ex_mem.result,
        },
        request,
    }
}

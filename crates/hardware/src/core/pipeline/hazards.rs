//! Data Hazard Detection and Forwarding.
//!
//! This module implements the operand forward multiplexer used by the execute stage.
//! It provides:
//! 1. **Operand Forwarding:** Resolves read-after-write hazards from the three
//!    youngest producers ahead of execute, nearest first.
//! 2. **Load Substitution:** A load in MEM/WB forwards the data returned by the data
//!    port rather than its address.
//! 3. **Hazard Detection:** A load still in EX/MEM cannot forward; the consumer
//!    interlocks until it reaches MEM/WB.

use crate::core::pipeline::latches::{ExMem, MemWb, WbOut, produces};

/// Result of resolving one source operand.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Operand {
    /// The value is available this cycle.
    Ready(u32),
    /// The producer has not computed it yet; the consumer must wait.
    Pending,
}

impl Operand {
    /// Returns the value, or `fallback` if it is still pending.
    pub const fn or(self, fallback: u32) -> u32 {
        match self {
            Self::Ready(v) => v,
            Self::Pending => fallback,
        }
    }

    /// Returns `true` if the operand is not yet available.
    pub const fn is_pending(self) -> bool {
        matches!(self, Self::Pending)
    }
}

/// Snapshot of the forwarding taps at the start of a cycle.
#[derive(Clone, Copy, Debug)]
pub struct ForwardTaps<'a> {
    /// Producer one instruction ahead of execute.
    pub ex_mem: &'a ExMem,
    /// Producer two instructions ahead of execute.
    pub mem_wb: &'a MemWb,
    /// Extended load data for a load in MEM/WB, if the data port has acknowledged it.
    pub mem_wb_load: Option<u32>,
    /// Register written by writeback in the previous cycle.
    pub wb_out: &'a WbOut,
}

/// Resolves source register `src` for the instruction in execute.
///
/// # Arguments
///
/// * `src` - Source register index.
/// * `fallback` - Value held in ID/EX for `src` (register file or an earlier refresh).
/// * `taps` - Forwarding taps from the previous cycle.
///
/// # Returns
///
/// The nearest producer's value, `fallback` when no tap matches, or
/// [`Operand::Pending`] when the nearest producer is a load whose data is not back.
///
/// # Examples
///
/// ```ignore
/// // EX/MEM:  lw   x7, 0(x0)     <- load result not known yet
/// // ID/EX:   add  x3, x7, x0    <- needs x7
/// //
/// // resolve_operand(7, ..) == Operand::Pending: execute interlocks for one cycle,
/// // after which the load sits in MEM/WB and forwards the acknowledged data.
/// ```
pub fn resolve_operand(src: usize, fallback: u32, taps: &ForwardTaps<'_>) -> Operand {
    let ex_mem = taps.ex_mem;
    if produces(ex_mem.valid, &ex_mem.op, src) {
        return if ex_mem.op.is_load() {
            Operand::Pending
        } else {
            Operand::Ready(ex_mem.result)
        };
    }

    let mem_wb = taps.mem_wb;
    if produces(mem_wb.valid, &mem_wb.op, src) {
        return if mem_wb.op.is_load() {
            taps.mem_wb_load.map_or(Operand::Pending, Operand::Ready)
        } else {
            Operand::Ready(mem_wb.result)
        };
    }

    let wb_out = taps.wb_out;
    if wb_out.valid && src != 0 && wb_out.rd == src {
        return Operand::Ready(wb_out.value);
    }

    Operand::Ready(fallback)
}

/// Returns `true` if either operand forces execute to wait this cycle.
pub const fn need_interlock(op1: Operand, op2: Operand) -> bool {
    op1.is_pending() || op2.is_pending()
}

//! Five-stage pipeline engine.
//!
//! This module owns the architectural and latch state and advances it one clock
//! at a time. A tick runs in two phases:
//! 1. **Evaluate:** Every stage and every control signal is computed from the
//!    latches, PC and register file as they stood at the end of the previous cycle.
//! 2. **Commit:** Latches, PC, register file, predictor and memory ports are updated
//!    together, so the outcome never depends on the order stages are evaluated in.
//!
//! Stall chain: `hold` or a load waiting in writeback stalls writeback; that or a
//! busy data port stalls memory; that or an operand interlock stalls execute and
//! decode; that or an outstanding fetch stalls fetch. Each latch takes, in order of
//! priority, a bubble on flush, its old value on a downstream stall, a bubble on
//! its own stall, and the upstream stage output otherwise.

use tracing::{debug, trace, warn};

use crate::common::constants::INSTRUCTION_SIZE;
use crate::common::error::DecodeFault;
use crate::config::Config;
use crate::core::arch::gpr::Gpr;
use crate::core::pipeline::hazards::ForwardTaps;
use crate::core::pipeline::latches::{ExMem, IdEx, IfId, MemWb, WbOut};
use crate::core::pipeline::stages::writeback::LoadAck;
use crate::core::pipeline::stages::{
    Commit, decode_stage, execute_stage, fetch_stage, mem_stage, wb_stage,
};
use crate::core::units::bru::{BranchOutcome, BranchPredictor, BranchPredictorWrapper};
use crate::isa::disasm::disassemble;
use crate::soc::traits::{DataPort, InstructionPort};

/// Stall signals asserted during one cycle.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct StallSignals {
    /// External hold input.
    pub hold: bool,
    /// Writeback could not retire (hold, or load data not acknowledged).
    pub wb: bool,
    /// Memory stage could not advance.
    pub mem: bool,
    /// Execute could not advance.
    pub ex: bool,
    /// Execute waited for a load result (load-use interlock).
    pub interlock: bool,
    /// Fetch could not advance.
    pub fetch: bool,
    /// The instruction port had not answered for the current PC.
    pub imem_wait: bool,
}

/// Fetch redirects performed at the end of a cycle.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Flushes {
    /// Decode redirected to a direct target (BP-flush).
    pub bp: Option<u32>,
    /// Execute corrected the path (BU-flush).
    pub bu: Option<u32>,
}

/// Everything observable about one clock cycle.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct TickReport {
    /// Instruction retired by writeback, if any.
    pub commit: Commit,
    /// Stall signals.
    pub stalls: StallSignals,
    /// Redirects.
    pub flushes: Flushes,
    /// An illegal word left decode as a bubble.
    pub decode_fault: Option<DecodeFault>,
    /// Control-flow instruction resolved in execute.
    pub branch: Option<BranchOutcome>,
}

/// The in-order five-stage RV32I pipeline.
///
/// # Examples
///
/// ```
/// use pqr5_core::config::Config;
/// use pqr5_core::core::pipeline::engine::Pipeline;
/// use pqr5_core::isa::asm::assemble;
/// use pqr5_core::soc::System;
///
/// let config = Config::default();
/// let mut system = System::new(&config);
/// let program = assemble("mvi x1, 5\naddi x2, x1, 1\nend: j end\n").unwrap();
/// system.load_program(&program).unwrap();
///
/// let mut pipeline = Pipeline::new(&config);
/// for _ in 0..16 {
///     let _ = pipeline.tick(&mut system.imem, &mut system.dmem, false);
/// }
/// assert_eq!(pipeline.regs.read(2), 6);
/// ```
#[derive(Debug)]
pub struct Pipeline {
    /// Fetch program counter.
    pub pc: u32,
    /// IF/ID latch.
    pub if_id: IfId,
    /// ID/EX latch.
    pub id_ex: IdEx,
    /// EX/MEM latch.
    pub ex_mem: ExMem,
    /// MEM/WB latch.
    pub mem_wb: MemWb,
    /// Register written in the previous cycle.
    pub wb_out: WbOut,
    /// Architectural register file.
    pub regs: Gpr,
    /// Direction predictor.
    pub predictor: BranchPredictorWrapper,
    /// Emit a `trace!` event per stage each cycle.
    pub trace: bool,
    ack_fault_logged: bool,
}

impl Pipeline {
    /// Creates an empty pipeline fetching from address 0.
    pub fn new(config: &Config) -> Self {
        Self {
            pc: 0,
            if_id: IfId::default(),
            id_ex: IdEx::default(),
            ex_mem: ExMem::default(),
            mem_wb: MemWb::default(),
            wb_out: WbOut::default(),
            regs: Gpr::new(),
            predictor: BranchPredictorWrapper::new(config),
            trace: config.general.trace_instructions || cfg!(feature = "always-trace"),
            ack_fault_logged: false,
        }
    }

    /// Empties every latch, clears the registers and predictor and restarts at `entry`.
    pub fn reset(&mut self, entry: u32) {
        self.pc = entry;
        self.if_id = IfId::default();
        self.id_ex = IdEx::default();
        self.ex_mem = ExMem::default();
        self.mem_wb = MemWb::default();
        self.wb_out = WbOut::default();
        self.regs = Gpr::new();
        self.predictor.reset();
        self.ack_fault_logged = false;
    }

    /// Returns `true` if no instruction is in flight.
    pub const fn is_empty(&self) -> bool {
        !self.if_id.valid && !self.id_ex.valid && !self.ex_mem.valid && !self.mem_wb.valid
    }

    /// Advances the pipeline by one clock cycle.
    ///
    /// # Arguments
    ///
    /// * `imem` - Instruction port; sampled, then ticked with the next fetch address.
    /// * `dmem` - Data port; sampled, then given this cycle's request and ticked.
    /// * `hold` - External hold; freezes writeback and everything behind it.
    ///
    /// # Returns
    ///
    /// The cycle's commit, stall and flush signals.
    pub fn tick<I, D>(&mut self, imem: &mut I, dmem: &mut D, hold: bool) -> TickReport
    where
        I: InstructionPort + ?Sized,
        D: DataPort + ?Sized,
    {
        // Evaluate: every value below reads only end-of-previous-cycle state.
        let wb = wb_stage(&self.mem_wb, dmem.response());
        let mem = mem_stage(&self.ex_mem);
        let taps = ForwardTaps {
            ex_mem: &self.ex_mem,
            mem_wb: &self.mem_wb,
            mem_wb_load: wb.load_data(),
            wb_out: &self.wb_out,
        };
        let ex = execute_stage(&self.id_ex, &taps);
        let id = decode_stage(&self.if_id, &self.regs, &self.predictor);
        let fetched = fetch_stage(self.pc, &*imem);

        let stall_wb = hold || wb.waiting();
        let stall_mem = stall_wb || (mem.request.is_some() && !dmem.ready());
        let stall_ex = stall_mem || ex.interlock;
        let stall_id = stall_ex;
        let stall_if = stall_id || fetched.is_none();

        let bu = if stall_ex { None } else { ex.redirect };
        let bp = if stall_id || bu.is_some() {
            None
        } else {
            id.redirect
        };
        let decode_fault = if stall_id || bu.is_some() {
            None
        } else {
            id.fault
        };
        let branch = if stall_ex { None } else { ex.outcome };

        if self.trace {
            self.trace_cycle(stall_if, stall_ex, stall_wb);
        }
        if let LoadAck::Malformed(resp) = wb.ack {
            if !self.ack_fault_logged {
                warn!(
                    pc = format_args!("{:#010x}", self.mem_wb.pc),
                    addr = format_args!("{:#010x}", self.mem_wb.result),
                    resp_addr = format_args!("{:#010x}", resp.addr),
                    fault = resp.fault,
                    "load acknowledgement rejected; writeback stalls"
                );
                self.ack_fault_logged = true;
            }
        } else {
            self.ack_fault_logged = false;
        }
        if ex.interlock && !stall_mem {
            debug!(pc = format_args!("{:#010x}", self.id_ex.pc), "load-use interlock");
        }
        if let Some(fault) = decode_fault {
            warn!(pc = format_args!("{:#010x}", self.if_id.pc), %fault, "decode fault, bubble inserted");
        }

        // Commit.
        self.mem_wb = if stall_wb {
            self.mem_wb
        } else if stall_mem {
            MemWb::default()
        } else {
            mem.entry
        };
        self.ex_mem = if stall_mem {
            self.ex_mem
        } else if stall_ex {
            ExMem::default()
        } else {
            ex.entry
        };
        self.id_ex = if bu.is_some() {
            IdEx::default()
        } else if stall_ex {
            ex.held
        } else {
            id.entry
        };
        self.if_id = match (bu.or(bp), stall_id, fetched) {
            (Some(_), _, _) => IfId::default(),
            (None, true, _) => self.if_id,
            (None, false, Some(entry)) => entry,
            (None, false, None) => IfId::default(),
        };
        self.pc = match bu.or(bp) {
            Some(target) => target,
            None if stall_if => self.pc,
            None => self.pc.wrapping_add(INSTRUCTION_SIZE),
        };

        let commit = if stall_wb { Commit::default() } else { wb.commit };
        if commit.valid && commit.rd != 0 {
            self.regs.write(commit.rd, commit.value);
        }
        self.wb_out = WbOut {
            valid: commit.valid && commit.rd != 0,
            rd: commit.rd,
            value: commit.value,
        };

        if let Some(outcome) = &branch {
            self.predictor.update(outcome);
        }

        if let Some(target) = bu {
            debug!(target = format_args!("{target:#010x}"), "BU-flush");
        } else if let Some(target) = bp {
            debug!(target = format_args!("{target:#010x}"), "BP-flush");
        }
        if bu.is_some() || bp.is_some() {
            imem.cancel();
        }
        imem.tick(Some(self.pc));

        if !stall_wb && matches!(wb.ack, LoadAck::Data(_)) {
            dmem.consume();
        }
        if let (false, Some(req)) = (stall_mem, mem.request) {
            dmem.request(req);
        }
        dmem.tick();

        TickReport {
            commit,
            stalls: StallSignals {
                hold,
                wb: stall_wb,
                mem: stall_mem,
                ex: stall_ex,
                interlock: ex.interlock,
                fetch: stall_if,
                imem_wait: fetched.is_none(),
            },
            flushes: Flushes { bp, bu },
            decode_fault,
            branch,
        }
    }

    fn trace_cycle(&self, stall_if: bool, stall_ex: bool, stall_wb: bool) {
        trace!(pc = format_args!("{:#010x}", self.pc), stall = stall_if, "IF");
        if self.if_id.valid {
            trace!(
                pc = format_args!("{:#010x}", self.if_id.pc),
                inst = %disassemble(self.if_id.inst),
                "ID"
            );
        }
        if self.id_ex.valid {
            trace!(
                pc = format_args!("{:#010x}", self.id_ex.pc),
                inst = %self.id_ex.op,
                stall = stall_ex,
                "EX"
            );
        }
        if self.ex_mem.valid {
            trace!(
                pc = format_args!("{:#010x}", self.ex_mem.pc),
                result = format_args!("{:#010x}", self.ex_mem.result),
                "MEM"
            );
        }
        if self.mem_wb.valid {
            trace!(
                pc = format_args!("{:#010x}", self.mem_wb.pc),
                inst = %self.mem_wb.op,
                stall = stall_wb,
                "WB"
            );
        }
    }
}

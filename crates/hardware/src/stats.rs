//! Simulation statistics collection and reporting.
//!
//! This module tracks performance metrics for the pipeline. It provides:
//! 1. **Cycle and IPC:** Total cycles, retired instructions, and derived metrics (CPI, MIPS).
//! 2. **Instruction mix:** Counts by category (ALU, load, store, branch, jump).
//! 3. **Branch prediction:** Lookups, mispredictions, and accuracy.
//! 4. **Stalls and flushes:** Interlock, memory, hold and fetch stall cycles, and
//!    decode (BP) and execute (BU) redirects.
//!
//! Statistics are accumulated from [`TickReport`]s and serialize to JSON.

use std::time::Instant;

use serde::Serialize;

use crate::core::pipeline::engine::TickReport;
use crate::core::pipeline::signals::InstClass;
use crate::core::units::bru::BranchClass;

/// Simulation statistics structure tracking all performance metrics.
#[derive(Clone, Debug, Serialize)]
pub struct SimStats {
    #[serde(skip)]
    start_time: Instant,
    /// Total simulator cycles elapsed.
    pub cycles: u64,
    /// Number of instructions committed (retired).
    pub instructions_retired: u64,

    /// Count of ALU, LUI and AUIPC instructions retired.
    pub inst_alu: u64,
    /// Count of load instructions retired.
    pub inst_load: u64,
    /// Count of store instructions retired.
    pub inst_store: u64,
    /// Count of conditional branches retired.
    pub inst_branch: u64,
    /// Count of JAL and JALR instructions retired.
    pub inst_jump: u64,

    /// Conditional branches resolved in execute.
    pub branch_lookups: u64,
    /// Conditional branches whose predicted direction was wrong.
    pub branch_mispredictions: u64,

    /// Redirects performed by decode (direct jumps and predicted-taken branches).
    pub bp_flushes: u64,
    /// Redirects performed by execute (mispredicts and every JALR).
    pub bu_flushes: u64,

    /// Cycles execute waited on a load result.
    pub stalls_data: u64,
    /// Cycles the memory stage or writeback waited on the data port.
    pub stalls_mem: u64,
    /// Cycles frozen by the external hold.
    pub stalls_hold: u64,
    /// Cycles fetch waited on the instruction port.
    pub stalls_fetch: u64,

    /// Illegal instruction words dropped by decode.
    pub decode_faults: u64,
}

impl Default for SimStats {
    fn default() -> Self {
        Self {
            start_time: Instant::now(),
            cycles: 0,
            instructions_retired: 0,
            inst_alu: 0,
            inst_load: 0,
            inst_store: 0,
            inst_branch: 0,
            inst_jump: 0,
            branch_lookups: 0,
            branch_mispredictions: 0,
            bp_flushes: 0,
            bu_flushes: 0,
            stalls_data: 0,
            stalls_mem: 0,
            stalls_hold: 0,
            stalls_fetch: 0,
            decode_faults: 0,
        }
    }
}

/// Section names for selective stats output.
///
/// Valid section identifiers: `"summary"`, `"core"`, `"instruction_mix"`, `"branch"`.
/// Pass an empty slice to `print_sections` to print all sections.
pub const STATS_SECTIONS: &[&str] = &["summary", "core", "instruction_mix", "branch"];

impl SimStats {
    /// Accumulates one cycle.
    pub fn record(&mut self, report: &TickReport) {
        self.cycles += 1;

        let stalls = &report.stalls;
        if stalls.hold {
            self.stalls_hold += 1;
        } else if stalls.mem {
            self.stalls_mem += 1;
        } else if stalls.interlock {
            self.stalls_data += 1;
        } else if stalls.imem_wait {
            self.stalls_fetch += 1;
        }

        if report.flushes.bu.is_some() {
            self.bu_flushes += 1;
        }
        if report.flushes.bp.is_some() {
            self.bp_flushes += 1;
        }
        if report.decode_fault.is_some() {
            self.decode_faults += 1;
        }
        if let Some(outcome) = &report.branch {
            if matches!(outcome.class, BranchClass::Conditional { .. }) {
                self.branch_lookups += 1;
                if outcome.mispredicted() {
                    self.branch_mispredictions += 1;
                }
            }
        }

        if report.commit.valid {
            self.instructions_retired += 1;
            match report.commit.class {
                InstClass::Alu => self.inst_alu += 1,
                InstClass::Load => self.inst_load += 1,
                InstClass::Store => self.inst_store += 1,
                InstClass::Branch => self.inst_branch += 1,
                InstClass::Jump => self.inst_jump += 1,
            }
        }
    }

    /// Cycles per retired instruction (0 before the first retirement).
    pub fn cpi(&self) -> f64 {
        if self.instructions_retired == 0 {
            0.0
        } else {
            self.cycles as f64 / self.instructions_retired as f64
        }
    }

    /// Prints only the requested statistics sections to stdout.
    ///
    /// Each element of `sections` should be one of `"summary"`, `"core"`,
    /// `"instruction_mix"` or `"branch"`. Pass an empty slice to print all sections
    /// (same as `print()`).
    ///
    /// # Arguments
    ///
    /// * `sections` - Slice of section names to print, or empty for all.
    pub fn print_sections(&self, sections: &[String]) {
        let want = |s: &str| sections.is_empty() || sections.iter().any(|x| x == s);
        let seconds = self.start_time.elapsed().as_secs_f64();
        let cyc = self.cycles.max(1) as f64;
        let instr = self.instructions_retired.max(1) as f64;
        let pct = |n: u64, of: f64| (n as f64 / of) * 100.0;

        if want("summary") {
            let ipc = self.instructions_retired as f64 / cyc;
            let cpi = cyc / instr;
            let mips = (self.instructions_retired as f64 / seconds) / 1_000_000.0;
            let khz = (self.cycles as f64 / seconds) / 1000.0;
            println!("\n==========================================================");
            println!("PQR5 PIPELINE SIMULATION STATISTICS");
            println!("==========================================================");
            println!("host_seconds             {seconds:.4} s");
            println!("sim_cycles               {}", self.cycles);
            println!("sim_freq                 {khz:.2} kHz");
            println!("sim_insts                {}", self.instructions_retired);
            println!("sim_ipc                  {ipc:.4}");
            println!("sim_cpi                  {cpi:.4}");
            println!("sim_mips                 {mips:.2}");
            println!("----------------------------------------------------------");
        }
        if want("core") {
            println!("CORE BREAKDOWN");
            for (name, n) in [
                ("stalls.data", self.stalls_data),
                ("stalls.memory", self.stalls_mem),
                ("stalls.hold", self.stalls_hold),
                ("stalls.fetch", self.stalls_fetch),
                ("flush.bp", self.bp_flushes),
                ("flush.bu", self.bu_flushes),
            ] {
                println!("  {name:<22} {n} ({:.2}%)", pct(n, cyc));
            }
            println!("  decode_faults          {}", self.decode_faults);
            println!("----------------------------------------------------------");
        }
        if want("instruction_mix") {
            println!("INSTRUCTION MIX");
            for (name, n) in [
                ("op.alu", self.inst_alu),
                ("op.load", self.inst_load),
                ("op.store", self.inst_store),
                ("op.branch", self.inst_branch),
                ("op.jump", self.inst_jump),
            ] {
                println!("  {name:<22} {n} ({:.2}%)", pct(n, instr));
            }
            println!("----------------------------------------------------------");
        }
        if want("branch") {
            let lookups = self.branch_lookups;
            let miss = self.branch_mispredictions;
            let acc = if lookups > 0 {
                100.0 * ((lookups - miss) as f64 / lookups as f64)
            } else {
                0.0
            };
            println!("BRANCH PREDICTION");
            println!("  bp.lookups             {lookups}");
            println!("  bp.mispredicts         {miss}");
            println!("  bp.accuracy            {acc:.2}%");
        }
        println!("==========================================================");
    }

    /// Prints all statistics sections to stdout.
    ///
    /// Equivalent to `print_sections(&[])`.
    pub fn print(&self) {
        self.print_sections(&[]);
    }
}

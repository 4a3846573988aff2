//! Simulator: owns the pipeline and the memory system side-by-side.
//!
//! The driver ticks the pipeline against both memory ports, accumulates
//! statistics, optionally records every commit, and stops on the halt
//! instruction, the cycle budget, or a pipeline that has stopped retiring.

use tracing::{info, warn};

use crate::common::error::SimError;
use crate::config::Config;
use crate::core::arch::gpr::Gpr;
use crate::core::pipeline::engine::{Pipeline, TickReport};
use crate::core::pipeline::stages::Commit;
use crate::sim::loader::Program;
use crate::soc::System;
use crate::stats::SimStats;

/// Why [`Simulator::run`] returned.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RunOutcome {
    /// The halt instruction retired.
    Halted {
        /// Cycle count at the halt.
        cycles: u64,
    },
    /// `general.max_cycles` elapsed first.
    CycleLimit,
    /// Nothing retired for `general.deadlock_cycles` consecutive cycles.
    Deadlock {
        /// Fetch PC when the run was abandoned.
        pc: u32,
    },
}

/// Top-level simulator: pipeline + memories + statistics.
#[derive(Debug)]
pub struct Simulator {
    /// The pipeline (registers, latches, predictor).
    pub pipeline: Pipeline,
    /// Instruction and data memories.
    pub system: System,
    /// Statistics since the last `load`.
    pub stats: SimStats,
    hold: bool,
    halt_instruction: u32,
    max_cycles: u64,
    deadlock_cycles: u64,
    idle_cycles: u64,
    commit_log: Option<Vec<Commit>>,
}

impl Simulator {
    /// Creates a simulator with empty memories.
    pub fn new(config: &Config) -> Self {
        Self {
            pipeline: Pipeline::new(config),
            system: System::new(config),
            stats: SimStats::default(),
            hold: false,
            halt_instruction: config.general.halt_instruction,
            max_cycles: config.general.max_cycles,
            deadlock_cycles: config.general.deadlock_cycles,
            idle_cycles: 0,
            commit_log: config.general.commit_log.then(Vec::new),
        }
    }

    /// Loads a program and resets the pipeline to its entry point.
    pub fn load(&mut self, program: &Program) -> Result<(), SimError> {
        self.system.load_program(program)?;
        self.system.imem.reset();
        self.system.dmem.reset();
        self.pipeline.reset(program.entry);
        self.stats = SimStats::default();
        self.idle_cycles = 0;
        if let Some(log) = &mut self.commit_log {
            log.clear();
        }
        info!(
            entry = format_args!("{:#010x}", program.entry),
            bytes = program.size_bytes(),
            "program loaded"
        );
        Ok(())
    }

    /// Drives the external hold input for subsequent cycles.
    pub const fn set_hold(&mut self, hold: bool) {
        self.hold = hold;
    }

    /// Advances one clock cycle.
    pub fn tick(&mut self) -> TickReport {
        let report = self
            .pipeline
            .tick(&mut self.system.imem, &mut self.system.dmem, self.hold);
        self.stats.record(&report);

        if report.commit.valid {
            self.idle_cycles = 0;
            if let Some(log) = &mut self.commit_log {
                log.push(report.commit);
            }
        } else if !report.stalls.hold {
            self.idle_cycles += 1;
        }
        report
    }

    /// Runs until the halt instruction retires, the cycle budget is spent, or the
    /// pipeline deadlocks.
    pub fn run(&mut self) -> RunOutcome {
        while self.stats.cycles < self.max_cycles {
            let report = self.tick();
            if report.commit.valid && report.commit.inst == self.halt_instruction {
                info!(cycles = self.stats.cycles, pc = format_args!("{:#010x}", report.commit.pc), "halted");
                return RunOutcome::Halted {
                    cycles: self.stats.cycles,
                };
            }
            if self.idle_cycles >= self.deadlock_cycles {
                warn!(
                    pc = format_args!("{:#010x}", self.pipeline.pc),
                    cycles = self.idle_cycles,
                    "no instruction retired, giving up"
                );
                return RunOutcome::Deadlock {
                    pc: self.pipeline.pc,
                };
            }
        }
        warn!(max_cycles = self.max_cycles, "cycle limit reached");
        RunOutcome::CycleLimit
    }

    /// Architectural registers.
    pub const fn regs(&self) -> &Gpr {
        &self.pipeline.regs
    }

    /// Commits recorded since `load` (empty unless `general.commit_log` is set).
    pub fn commits(&self) -> &[Commit] {
        self.commit_log.as_deref().unwrap_or_default()
    }

    /// Bytes written to the UART so far.
    pub fn uart_output(&self) -> String {
        self.system
            .dmem
            .bus()
            .uart()
            .map(|u| u.output_string())
            .unwrap_or_default()
    }
}

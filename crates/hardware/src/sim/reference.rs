//! Reference interpreter.
//!
//! Executes one instruction at a time with no pipeline, using the same decoder,
//! ALU and memory system as the pipeline. The pipeline must retire the same
//! sequence of commits and leave identical registers and data memory; the
//! property tests hold it to that.

use tracing::debug;

use crate::common::constants::{INSTRUCTION_SIZE, JALR_TARGET_MASK};
use crate::common::error::{DecodeFault, LoadError};
use crate::config::Config;
use crate::core::arch::gpr::Gpr;
use crate::core::pipeline::stages::Commit;
use crate::core::units::alu::Alu;
use crate::isa::decode::{Instruction, decode};
use crate::sim::loader::Program;
use crate::soc::System;

/// Result of executing one instruction.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Step {
    /// The instruction retired.
    Retired(Commit),
    /// The word was illegal and skipped.
    Fault(DecodeFault),
    /// A load hit an unmapped address; the pipeline would wait forever.
    Stuck,
}

/// Naive single-cycle RV32I interpreter.
#[derive(Debug)]
pub struct Reference {
    /// Program counter.
    pub pc: u32,
    /// Register file.
    pub regs: Gpr,
    /// Instruction and data memories.
    pub system: System,
    halt_instruction: u32,
}

impl Reference {
    /// Builds an interpreter with its own memories, configured like the simulator.
    pub fn new(config: &Config) -> Self {
        Self {
            pc: 0,
            regs: Gpr::new(),
            system: System::new(config),
            halt_instruction: config.general.halt_instruction,
        }
    }

    /// Loads `program` and starts at its entry point.
    pub fn load(&mut self, program: &Program) -> Result<(), LoadError> {
        self.system.load_program(program)?;
        self.pc = program.entry;
        Ok(())
    }

    /// Executes the instruction at `pc`.
    pub fn step(&mut self) -> Step {
        let pc = self.pc;
        let word = self.system.imem.peek(pc);
        let op = match decode(word) {
            Ok(op) => op,
            Err(fault) => {
                self.pc = pc.wrapping_add(INSTRUCTION_SIZE);
                return Step::Fault(fault);
            }
        };

        let a = self.regs.read(op.rs1());
        let b = self.regs.read(op.rs2());
        let link = pc.wrapping_add(INSTRUCTION_SIZE);
        let mut next = link;

        let value = match op {
            Instruction::Lui { imm, .. } => imm,
            Instruction::Auipc { imm, .. } => pc.wrapping_add(imm),
            Instruction::Jal { offset, .. } => {
                next = pc.wrapping_add(offset as u32);
                link
            }
            Instruction::Jalr { offset, .. } => {
                next = a.wrapping_add(offset as u32) & JALR_TARGET_MASK;
                link
            }
            Instruction::Branch { cond, offset, .. } => {
                if cond.evaluate(a, b) {
                    next = pc.wrapping_add(offset as u32);
                }
                0
            }
            Instruction::Load {
                width,
                signed,
                offset,
                ..
            } => {
                let addr = a.wrapping_add(offset as u32);
                match self.system.dmem.bus_mut().read(addr, width) {
                    Some(raw) => width.extend(raw, signed),
                    None => {
                        debug!(pc = format_args!("{pc:#010x}"), addr = format_args!("{addr:#010x}"), "unmapped load");
                        return Step::Stuck;
                    }
                }
            }
            Instruction::Store { width, offset, .. } => {
                let addr = a.wrapping_add(offset as u32);
                let _ = self.system.dmem.bus_mut().write(addr, width, b);
                0
            }
            Instruction::OpImm { op, imm, .. } => Alu::execute(op, a, imm as u32),
            Instruction::Op { op, .. } => Alu::execute(op, a, b),
        };

        let rd = if op.writes_destination() { op.rd() } else { 0 };
        self.regs.write(rd, value);
        self.pc = next;

        Step::Retired(Commit {
            valid: true,
            pc,
            inst: word,
            rd,
            value: if rd == 0 { 0 } else { value },
            class: op.class(),
        })
    }

    /// Runs until the halt instruction retires, a load gets stuck or `max_steps` pass.
    ///
    /// # Returns
    ///
    /// Every commit in program order, and whether the halt instruction was reached.
    pub fn run(&mut self, max_steps: u64) -> (Vec<Commit>, bool) {
        let mut commits = Vec::new();
        for _ in 0..max_steps {
            match self.step() {
                Step::Retired(commit) => {
                    commits.push(commit);
                    if commit.inst == self.halt_instruction {
                        return (commits, true);
                    }
                }
                Step::Fault(_) => {}
                Step::Stuck => break,
            }
        }
        (commits, false)
    }
}

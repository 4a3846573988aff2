//! Execute (EX) Stage.
//!
//! This module implements the third stage of the instruction pipeline. It performs:
//! 1. **Operand Selection:** Both sources go through the forward multiplexer.
//! 2. **ALU Operations:** Register and immediate arithmetic, LUI/AUIPC, link values
//!    and effective addresses.
//! 3. **Branch Resolution:** Evaluates conditional branches and JALR targets and
//!    requests a redirect when decode's assumption was wrong.
//! 4. **Interlock:** Requests a stall when an operand is a load result not yet back.

use crate::common::constants::{INSTRUCTION_SIZE, JALR_TARGET_MASK};
use crate::core::pipeline::hazards::{ForwardTaps, Operand, need_interlock, resolve_operand};
use crate::core::pipeline::latches::{ExMem, IdEx};
use crate::core::units::alu::Alu;
use crate::core::units::bru::{BranchClass, BranchOutcome};
use crate::isa::decode::Instruction;

/// Output of the execute stage for one cycle.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ExecuteOutput {
    /// Record for the EX/MEM latch.
    pub entry: ExMem,
    /// The ID/EX record with every resolvable operand refreshed, kept if execute stalls.
    pub held: IdEx,
    /// Corrected fetch address after a misprediction or any JALR.
    pub redirect: Option<u32>,
    /// Resolution of a control-flow instruction, for the predictor.
    pub outcome: Option<BranchOutcome>,
    /// An operand is not available; execute must hold this cycle.
    pub interlock: bool,
}

/// Executes the execute stage.
///
/// # Arguments
///
/// * `id_ex` - Record produced by decode in the previous cycle.
/// * `taps` - Forwarding taps from the previous cycle.
///
/// # Behavior
///
/// - A bubble passes through with no side effects
/// - On interlock nothing is computed; only `held` and `interlock` are meaningful
/// - Conditional branches redirect when the outcome differs from the prediction,
///   JALR always redirects to `(rs1 + imm) & !1`
pub fn execute_stage(id_ex: &IdEx, taps: &ForwardTaps<'_>) -> ExecuteOutput {
    if !id_ex.valid {
        return ExecuteOutput::default();
    }

    let op1 = resolve_operand(id_ex.op.rs1(), id_ex.rv1, taps);
    let op2 = resolve_operand(id_ex.op.rs2(), id_ex.rv2, taps);
    let held = IdEx {
        rv1: op1.or(id_ex.rv1),
        rv2: op2.or(id_ex.rv2),
        ..*id_ex
    };

    let (Operand::Ready(a), Operand::Ready(b)) = (op1, op2) else {
        return ExecuteOutput {
            held,
            interlock: need_interlock(op1, op2),
            ..ExecuteOutput::default()
        };
    };
    let pc = id_ex.pc;
    let link = pc.wrapping_add(INSTRUCTION_SIZE);

    let mut store_data = 0;
    let mut redirect = None;
    let mut outcome = None;

    let result = match id_ex.op {
        Instruction::Lui { imm, .. } => imm,
        Instruction::Auipc { imm, .. } => pc.wrapping_add(imm),
        Instruction::Jal { offset, .. } => {
            let target = pc.wrapping_add(offset as u32);
            let resolved = BranchOutcome {
                pc,
                class: BranchClass::Direct,
                predicted: id_ex.pred_taken,
                taken: true,
                target,
            };
            if resolved.mispredicted() {
                redirect = Some(target);
            }
            outcome = Some(resolved);
            link
        }
        Instruction::Jalr { offset, .. } => {
            let target = a.wrapping_add(offset as u32) & JALR_TARGET_MASK;
            redirect = Some(target);
            outcome = Some(BranchOutcome {
                pc,
                class: BranchClass::Indirect,
                predicted: false,
                taken: true,
                target,
            });
            link
        }
        Instruction::Branch { cond, offset, .. } => {
            let taken = cond.evaluate(a, b);
            let target = pc.wrapping_add(offset as u32);
            let resolved = BranchOutcome {
                pc,
                class: BranchClass::Conditional {
                    backward: offset < 0,
                },
                predicted: id_ex.pred_taken,
                taken,
                target,
            };
            if resolved.mispredicted() {
                redirect = Some(if taken { target } else { link });
            }
            outcome = Some(resolved);
            0
        }
        Instruction::Load { offset, .. } => a.wrapping_add(offset as u32),
        Instruction::Store { offset, .. } => {
            store_data = b;
            a.wrapping_add(offset as u32)
        }
        Instruction::OpImm { op, imm, .. } => Alu::execute(op, a, imm as u32),
        Instruction::Op { op, .. } => Alu::execute(op, a, b),
    };

    ExecuteOutput {
        entry: ExMem {
            valid: true,
            pc,
            inst: id_ex.inst,
            op: id_ex.op,
            result,
            store_data,
        },
        held,
        redirect,
        outcome,
        interlock: false,
    }
}

//! Instruction Decode (ID) Stage.
//!
//! This module implements the second stage of the instruction pipeline. It performs:
//! 1. **Decoding:** Turns the raw word into a tagged [`Instruction`] once.
//! 2. **Register Read:** Reads both source registers from the register file.
//! 3. **Early Redirect:** Sends fetch to the target of a JAL, or of a conditional
//!    branch the predictor marks taken, without waiting for execute.
//!
//! Illegal encodings leave the stage as a bubble together with the fault.

use crate::common::constants::INSTRUCTION_SIZE;
use crate::common::error::DecodeFault;
use crate::core::arch::gpr::Gpr;
use crate::core::pipeline::latches::{IdEx, IfId};
use crate::core::units::bru::{BranchClass, BranchPredictor};
use crate::isa::decode::{Instruction, decode};

/// Output of the decode stage for one cycle.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct DecodeOutput {
    /// Record for the ID/EX latch (a bubble for faults and empty input).
    pub entry: IdEx,
    /// Target of a predicted-taken direct branch or jump.
    pub redirect: Option<u32>,
    /// The word in IF/ID is not a legal RV32I instruction.
    pub fault: Option<DecodeFault>,
}

/// Executes the instruction decode stage.
///
/// # Arguments
///
/// * `if_id` - Record produced by fetch in the previous cycle.
/// * `regs` - Register file as of the end of the previous cycle.
/// * `predictor` - Direction predictor, consulted for conditional branches.
///
/// # Behavior
///
/// - JAL always redirects; a conditional branch redirects if predicted taken
/// - JALR never redirects here; its target is only known in execute
/// - Register-file reads see no same-cycle writes; forwarding covers those
pub fn decode_stage<P: BranchPredictor + ?Sized>(
    if_id: &IfId,
    regs: &Gpr,
    predictor: &P,
) -> DecodeOutput {
    if !if_id.valid {
        return DecodeOutput::default();
    }

    let op: Instruction = match decode(if_id.inst) {
        Ok(op) => op,
        Err(fault) => {
            return DecodeOutput {
                fault: Some(fault),
                ..DecodeOutput::default()
            };
        }
    };

    let pred_taken = match op.branch_class() {
        Some(BranchClass::Direct) => true,
        Some(class @ BranchClass::Conditional { .. }) => predictor.predict(if_id.pc, class),
        Some(BranchClass::Indirect) | None => false,
    };
    // A taken target equal to the fall-through is already being fetched.
    let fall_through = if_id.pc.wrapping_add(INSTRUCTION_SIZE);
    let redirect = if pred_taken {
        op.static_target(if_id.pc).filter(|&target| target != fall_through)
    } else {
        None
    };

    DecodeOutput {
        entry: IdEx {
            valid: true,
            pc: if_id.pc,
            inst: if_id.inst,
            op,
            rv1: regs.read(op.rs1()),
            rv2: regs.read(op.rs2()),
            pred_taken,
        },
        redirect,
        fault: None,
    }
}

//! Stage Function Tests.
//!
//! Each stage is a pure function of the previous cycle's latches, so it is
//! exercised here without the engine.

use pretty_assertions::assert_eq;
use rstest::rstest;

use pqr5_core::common::error::DecodeFault;
use pqr5_core::core::arch::gpr::Gpr;
use pqr5_core::core::pipeline::hazards::ForwardTaps;
use pqr5_core::core::pipeline::latches::{ExMem, IdEx, IfId, MemWb, WbOut};
use pqr5_core::core::pipeline::signals::{AluOp, InstClass, MemWidth};
use pqr5_core::core::pipeline::stages::writeback::{LoadAck, load_ack};
use pqr5_core::core::pipeline::stages::{
    decode_stage, execute_stage, fetch_stage, mem_stage, wb_stage,
};
use pqr5_core::core::units::bru::static_bp::{NotTakenPredictor, StaticPredictor};
use pqr5_core::core::units::bru::BranchClass;
use pqr5_core::isa::decode::{Instruction, decode};
use pqr5_core::soc::traits::{MemRequest, MemResponse};

use crate::common::builder::instruction::InstructionBuilder;
use crate::common::mocks::memory::WordRom;

fn if_id(pc: u32, inst: u32) -> IfId {
    IfId {
        valid: true,
        pc,
        inst,
    }
}

fn id_ex(pc: u32, inst: u32, rv1: u32, rv2: u32) -> IdEx {
    let op = match decode(inst) {
        Ok(op) => op,
        Err(f) => panic!("{f}"),
    };
    IdEx {
        valid: true,
        pc,
        inst,
        op,
        rv1,
        rv2,
        pred_taken: false,
    }
}

fn no_taps<R>(f: impl FnOnce(&ForwardTaps<'_>) -> R) -> R {
    let (ex, mw, wb) = (ExMem::default(), MemWb::default(), WbOut::default());
    f(&ForwardTaps {
        ex_mem: &ex,
        mem_wb: &mw,
        mem_wb_load: None,
        wb_out: &wb,
    })
}

// ══════════════════════════════════════════════════════════
// 1. Fetch
// ══════════════════════════════════════════════════════════

#[test]
fn fetch_tags_word_with_pc() {
    let rom = WordRom::new(&[0x0000_0013, 0x0010_0093]);
    assert_eq!(fetch_stage(4, &rom), Some(if_id(4, 0x0010_0093)));
}

// ══════════════════════════════════════════════════════════
// 2. Decode
// ══════════════════════════════════════════════════════════

#[test]
fn decode_reads_both_sources() {
    let mut regs = Gpr::new();
    regs.write(2, 20);
    regs.write(3, 30);
    let inst = InstructionBuilder::new().add(1, 2, 3).build();
    let out = decode_stage(&if_id(0x10, inst), &regs, &StaticPredictor::new());
    assert_eq!(out.entry.rv1, 20);
    assert_eq!(out.entry.rv2, 30);
    assert_eq!(out.redirect, None);
    assert!(out.entry.valid);
}

#[test]
fn decode_redirects_jal_to_its_target() {
    let inst = InstructionBuilder::new().jal(1, 0x20).build();
    let out = decode_stage(&if_id(0x10, inst), &Gpr::new(), &NotTakenPredictor::new());
    assert_eq!(out.redirect, Some(0x30));
    assert!(out.entry.pred_taken);
}

#[test]
fn decode_skips_redirect_to_the_fall_through() {
    let inst = InstructionBuilder::new().jal(0, 4).build();
    let out = decode_stage(&if_id(0x10, inst), &Gpr::new(), &NotTakenPredictor::new());
    assert_eq!(out.redirect, None);
    assert!(out.entry.pred_taken, "execute still sees the jump as predicted");
}

#[rstest]
#[case::backward(-8, true, Some(0x08))]
#[case::forward(8, false, None)]
fn decode_follows_predictor_for_branches(
    #[case] offset: i32,
    #[case] taken: bool,
    #[case] redirect: Option<u32>,
) {
    let inst = InstructionBuilder::new().beq(1, 2, offset).build();
    let out = decode_stage(&if_id(0x10, inst), &Gpr::new(), &StaticPredictor::new());
    assert_eq!(out.entry.pred_taken, taken);
    assert_eq!(out.redirect, redirect);
}

#[test]
fn decode_never_redirects_jalr() {
    let inst = InstructionBuilder::new().jalr(1, 5, 0).build();
    let out = decode_stage(&if_id(0x10, inst), &Gpr::new(), &StaticPredictor::new());
    assert_eq!(out.redirect, None);
    assert!(!out.entry.pred_taken);
}

#[test]
fn decode_fault_becomes_bubble() {
    let out = decode_stage(&if_id(0x10, 0x0000_0073), &Gpr::new(), &StaticPredictor::new());
    assert!(!out.entry.valid);
    assert_eq!(out.redirect, None);
    assert_eq!(
        out.fault,
        Some(DecodeFault::UnknownOpcode {
            word: 0x73,
            opcode: 0x73
        })
    );
}

#[test]
fn decode_of_bubble_is_bubble() {
    let out = decode_stage(&IfId::default(), &Gpr::new(), &StaticPredictor::new());
    assert_eq!(out.entry, IdEx::default());
    assert_eq!(out.fault, None);
}

// ══════════════════════════════════════════════════════════
// 3. Execute
// ══════════════════════════════════════════════════════════

#[rstest]
#[case::add(InstructionBuilder::new().add(1, 2, 3), 7, 5, 12)]
#[case::sub(InstructionBuilder::new().sub(1, 2, 3), 7, 5, 2)]
#[case::addi(InstructionBuilder::new().addi(1, 2, -1), 7, 0, 6)]
#[case::lui(InstructionBuilder::new().lui(1, 0x12345), 0, 0, 0x1234_5000)]
#[case::auipc(InstructionBuilder::new().auipc(1, 1), 0, 0, 0x1100)]
#[case::load_address(InstructionBuilder::new().lw(1, 2, -4), 0x40, 0, 0x3C)]
#[case::jal_link(InstructionBuilder::new().jal(1, 0x40), 0, 0, 0x104)]
fn execute_results(
    #[case] builder: InstructionBuilder,
    #[case] rv1: u32,
    #[case] rv2: u32,
    #[case] expected: u32,
) {
    let entry = id_ex(0x100, builder.build(), rv1, rv2);
    let out = no_taps(|taps| execute_stage(&entry, taps));
    assert!(!out.interlock);
    assert_eq!(out.entry.result, expected);
}

#[test]
fn execute_store_carries_data_and_address() {
    let entry = id_ex(0, InstructionBuilder::new().sw(5, 6, 8).build(), 0x200, 0xAB);
    let out = no_taps(|taps| execute_stage(&entry, taps));
    assert_eq!(out.entry.result, 0x208);
    assert_eq!(out.entry.store_data, 0xAB);
}

#[test]
fn execute_jalr_always_redirects_and_clears_bit_zero() {
    let entry = id_ex(0x100, InstructionBuilder::new().jalr(1, 5, 3).build(), 0x200, 0);
    let out = no_taps(|taps| execute_stage(&entry, taps));
    assert_eq!(out.redirect, Some(0x202));
    assert_eq!(out.entry.result, 0x104);
    let Some(outcome) = out.outcome else {
        panic!("JALR must report an outcome");
    };
    assert_eq!(outcome.class, BranchClass::Indirect);
    assert!(outcome.mispredicted());
}

#[rstest]
#[case::taken_predicted_not(true, false, Some(0x120))]
#[case::not_taken_predicted_taken(false, true, Some(0x104))]
#[case::taken_predicted_taken(true, true, None)]
#[case::not_taken_predicted_not(false, false, None)]
fn execute_branch_redirects_only_on_mispredict(
    #[case] taken: bool,
    #[case] predicted: bool,
    #[case] redirect: Option<u32>,
) {
    let inst = InstructionBuilder::new().beq(1, 2, 0x20).build();
    let rv2 = if taken { 9 } else { 8 };
    let entry = IdEx {
        pred_taken: predicted,
        ..id_ex(0x100, inst, 9, rv2)
    };
    let out = no_taps(|taps| execute_stage(&entry, taps));
    assert_eq!(out.redirect, redirect);
    let Some(outcome) = out.outcome else {
        panic!("branch must report an outcome");
    };
    assert_eq!(outcome.taken, taken);
    assert_eq!(outcome.target, 0x120);
    assert_eq!(out.entry.result, 0, "branches write no register");
}

#[test]
fn execute_interlocks_on_load_in_ex_mem() {
    let load = ExMem {
        valid: true,
        op: Instruction::Load {
            width: MemWidth::Word,
            signed: true,
            rd: 7,
            rs1: 0,
            offset: 0,
        },
        result: 0x40,
        ..ExMem::default()
    };
    let (mw, wb) = (MemWb::default(), WbOut::default());
    let taps = ForwardTaps {
        ex_mem: &load,
        mem_wb: &mw,
        mem_wb_load: None,
        wb_out: &wb,
    };
    let entry = id_ex(0x104, InstructionBuilder::new().add(3, 7, 0).build(), 0, 0);
    let out = execute_stage(&entry, &taps);
    assert!(out.interlock);
    assert!(!out.entry.valid, "nothing is computed while waiting");
    assert_eq!(out.redirect, None);
    assert_eq!(out.held.pc, 0x104);
}

#[test]
fn execute_refreshes_held_operands() {
    // rs2 = x5 resolves from EX/MEM while rs1 = x7 waits on a load in MEM/WB.
    let producer = ExMem {
        valid: true,
        op: Instruction::OpImm {
            op: AluOp::Add,
            rd: 5,
            rs1: 0,
            imm: 5,
        },
        result: 55,
        ..ExMem::default()
    };
    let load = MemWb {
        valid: true,
        op: Instruction::Load {
            width: MemWidth::Word,
            signed: true,
            rd: 7,
            rs1: 0,
            offset: 0,
        },
        result: 0x40,
        ..MemWb::default()
    };
    let wb = WbOut::default();
    let taps = ForwardTaps {
        ex_mem: &producer,
        mem_wb: &load,
        mem_wb_load: None,
        wb_out: &wb,
    };
    let entry = id_ex(0x104, InstructionBuilder::new().add(3, 7, 5).build(), 1, 2);
    let out = execute_stage(&entry, &taps);
    assert!(out.interlock);
    assert_eq!(out.held.rv1, 1, "pending operand keeps its old value");
    assert_eq!(out.held.rv2, 55, "resolved operand is captured");
}

#[test]
fn execute_passes_bubbles() {
    let out = no_taps(|taps| execute_stage(&IdEx::default(), taps));
    assert!(!out.entry.valid);
    assert!(!out.interlock);
    assert_eq!(out.outcome, None);
}

// ══════════════════════════════════════════════════════════
// 4. Memory
// ══════════════════════════════════════════════════════════

#[test]
fn memory_issues_requests_for_loads_and_stores() {
    let load = ExMem {
        valid: true,
        op: Instruction::Load {
            width: MemWidth::Half,
            signed: false,
            rd: 1,
            rs1: 0,
            offset: 0,
        },
        result: 0x22,
        ..ExMem::default()
    };
    assert_eq!(
        mem_stage(&load).request,
        Some(MemRequest::load(0x22, MemWidth::Half))
    );

    let store = ExMem {
        valid: true,
        op: Instruction::Store {
            width: MemWidth::Byte,
            rs1: 0,
            rs2: 1,
            offset: 0,
        },
        result: 0x23,
        store_data: 0x1FF,
        ..ExMem::default()
    };
    assert_eq!(
        mem_stage(&store).request,
        Some(MemRequest::store(0x23, MemWidth::Byte, 0x1FF))
    );
}

#[test]
fn memory_passes_alu_results_without_request() {
    let alu = ExMem {
        valid: true,
        pc: 0x8,
        op: Instruction::default(),
        result: 3,
        ..ExMem::default()
    };
    let out = mem_stage(&alu);
    assert_eq!(out.request, None);
    assert_eq!(out.entry.result, 3);
    assert_eq!(out.entry.pc, 0x8);
    assert_eq!(mem_stage(&ExMem::default()).entry, MemWb::default());
}

// ══════════════════════════════════════════════════════════
// 5. Writeback
// ══════════════════════════════════════════════════════════

fn load_entry(width: MemWidth, signed: bool) -> MemWb {
    MemWb {
        valid: true,
        pc: 0x20,
        inst: 0,
        op: Instruction::Load {
            width,
            signed,
            rd: 9,
            rs1: 0,
            offset: 0,
        },
        result: 0x80,
    }
}

fn response(addr: u32, data: u32) -> Option<MemResponse> {
    Some(MemResponse {
        addr,
        data,
        fault: false,
    })
}

#[rstest]
#[case(MemWidth::Byte, true, 0x80, 0xFFFF_FF80)]
#[case(MemWidth::Byte, false, 0x80, 0x80)]
#[case(MemWidth::Half, true, 0x8001, 0xFFFF_8001)]
#[case(MemWidth::Half, false, 0x8001, 0x8001)]
#[case(MemWidth::Word, true, 0x8000_0000, 0x8000_0000)]
fn load_data_is_extended(
    #[case] width: MemWidth,
    #[case] signed: bool,
    #[case] raw: u32,
    #[case] expected: u32,
) {
    let out = wb_stage(&load_entry(width, signed), response(0x80, raw));
    assert_eq!(out.ack, LoadAck::Data(expected));
    assert_eq!(out.commit.rd, 9);
    assert_eq!(out.commit.value, expected);
    assert_eq!(out.commit.class, InstClass::Load);
    assert!(out.commit.valid);
}

#[test]
fn load_without_response_waits() {
    let out = wb_stage(&load_entry(MemWidth::Word, true), None);
    assert!(out.waiting());
    assert!(!out.commit.valid);
    assert_eq!(out.load_data(), None);
}

#[test]
fn mismatched_or_faulting_response_is_rejected() {
    let entry = load_entry(MemWidth::Word, true);
    assert!(matches!(
        load_ack(&entry, response(0x84, 1)),
        LoadAck::Malformed(_)
    ));

    let faulted = Some(MemResponse {
        addr: 0x80,
        data: 0,
        fault: true,
    });
    let out = wb_stage(&entry, faulted);
    assert!(out.waiting());
    assert!(!out.commit.valid);
}

#[test]
fn non_writers_commit_with_rd_zero() {
    let store = MemWb {
        valid: true,
        pc: 0x30,
        inst: 0x1234,
        op: Instruction::Store {
            width: MemWidth::Word,
            rs1: 0,
            rs2: 1,
            offset: 0,
        },
        result: 0x100,
    };
    let out = wb_stage(&store, None);
    assert_eq!(out.ack, LoadAck::None);
    assert!(out.commit.valid);
    assert_eq!((out.commit.rd, out.commit.value), (0, 0));
    assert_eq!(out.commit.inst, 0x1234);
}

#[test]
fn bubble_commits_nothing() {
    let out = wb_stage(&MemWb::default(), response(0, 0));
    assert!(!out.commit.valid);
    assert!(!out.waiting());
}

//! Memory Stall Tests.
//!
//! Load-use interlocks, data-port latency and occupancy, acknowledgements that
//! never arrive or do not match, the external hold and instruction-port latency.

use mockall::predicate;
use pretty_assertions::assert_eq;
use rstest::rstest;

use pqr5_core::config::Config;
use pqr5_core::core::pipeline::engine::Pipeline;
use pqr5_core::core::pipeline::signals::MemWidth;
use pqr5_core::sim::RunOutcome;
use pqr5_core::soc::traits::{MemRequest, MemResponse};

use crate::common::builder::instruction::InstructionBuilder;
use crate::common::harness::{TestContext, test_config};
use crate::common::mocks::memory::{MockDataMem, SilentDataPort, WordRom};

fn cycles_to_halt(config: Config, source: &str) -> (u64, TestContext) {
    let mut ctx = TestContext::with_config(config).load_asm(source);
    let cycles = ctx.run_to_halt();
    (cycles, ctx)
}

fn dmem_latency(latency: u64) -> Config {
    let mut config = test_config();
    config.memory.dmem_latency = latency;
    config
}

fn load_rom() -> WordRom {
    WordRom::new(&[
        InstructionBuilder::new().lw(7, 0, 0x40).build(),
        InstructionBuilder::new().addi(1, 0, 1).build(),
    ])
}

// ══════════════════════════════════════════════════════════
// 1. Load-use interlock
// ══════════════════════════════════════════════════════════

#[test]
fn load_use_costs_exactly_one_cycle() {
    let (independent, _) = cycles_to_halt(test_config(), "
        lw  x7, 0(x0)
        add x3, x0, x0
        end: j end
    ");
    let (dependent, ctx) = cycles_to_halt(test_config(), "
        lw  x7, 0(x0)
        add x3, x7, x0
        end: j end
    ");

    assert_eq!(dependent, independent + 1);
    assert_eq!(ctx.sim.stats.stalls_data, 1);
    assert_eq!(ctx.get_reg(3), ctx.mem_word(0), "x3 holds the loaded word");
    assert_eq!(ctx.get_reg(7), ctx.get_reg(3));
}

#[test]
fn interlocked_consumer_is_not_duplicated() {
    let mut ctx = TestContext::new().load_asm("
        lw  x7, 0(x0)
        add x3, x7, x0
        end: j end
    ");
    let _ = ctx.run_to_halt();
    let pcs: Vec<u32> = ctx.sim.commits().iter().map(|c| c.pc).collect();
    assert_eq!(pcs, vec![0, 4, 8]);
}

// ══════════════════════════════════════════════════════════
// 2. Data-port latency
// ══════════════════════════════════════════════════════════

#[rstest]
#[case(1)]
#[case(2)]
#[case(5)]
fn load_latency_adds_one_cycle_per_wait(#[case] latency: u64) {
    let src = "
        lw  x7, 0x200(x0)
        add x3, x7, x0
        end: j end
    ";
    let (base, _) = cycles_to_halt(dmem_latency(0), src);
    let (slow, ctx) = cycles_to_halt(dmem_latency(latency), src);

    assert_eq!(slow, base + latency);
    assert_eq!(ctx.sim.stats.stalls_mem, latency);
    assert_eq!(ctx.sim.stats.stalls_data, 1);
}

#[rstest]
#[case(1)]
#[case(3)]
fn store_occupies_the_port(#[case] latency: u64) {
    let (_, ctx) = cycles_to_halt(dmem_latency(latency), "
        mvi x1, 9
        sw  x1, 0x200(x0)
        sw  x1, 0x204(x0)
        end: j end
    ");
    assert_eq!(ctx.sim.stats.stalls_mem, latency);
    assert_eq!(ctx.mem_word(0x200), 9);
    assert_eq!(ctx.mem_word(0x204), 9);
}

#[test]
fn store_at_zero_latency_never_stalls() {
    let (_, ctx) = cycles_to_halt(test_config(), "
        sw x0, 0x200(x0)
        sw x0, 0x204(x0)
        sw x0, 0x208(x0)
        end: j end
    ");
    assert_eq!(ctx.sim.stats.stalls_mem, 0);
}

#[test]
fn never_ready_port_holds_memory_stage() {
    let mut dmem = MockDataMem::new();
    let _ = dmem.expect_ready().return_const(false);
    let _ = dmem.expect_response().return_const(None);
    let _ = dmem.expect_request().never();
    let _ = dmem.expect_consume().never();
    let _ = dmem.expect_tick().return_const(());

    let mut rom = load_rom();
    let mut pipeline = Pipeline::new(&Config::default());
    let reports: Vec<_> = (0..12)
        .map(|_| pipeline.tick(&mut rom, &mut dmem, false))
        .collect();

    // The load reaches MEM in cycle 3 and never leaves.
    assert!(reports[3..].iter().all(|r| r.stalls.mem && !r.stalls.wb));
    assert!(reports.iter().all(|r| !r.commit.valid));
    assert!(pipeline.ex_mem.valid && pipeline.ex_mem.op.is_load());
    assert!(!pipeline.mem_wb.valid, "a bubble enters writeback");
    assert_eq!(pipeline.pc, 12, "fetch froze behind the stall");
}

#[test]
fn request_is_issued_once_when_port_accepts() {
    let mut dmem = MockDataMem::new();
    let _ = dmem.expect_ready().return_const(true);
    let _ = dmem
        .expect_request()
        .with(predicate::eq(MemRequest::load(0x40, MemWidth::Word)))
        .times(1)
        .return_const(());
    let _ = dmem.expect_response().return_const(Some(MemResponse {
        addr: 0x40,
        data: 0xCAFE,
        fault: false,
    }));
    let _ = dmem.expect_consume().times(1).return_const(());
    let _ = dmem.expect_tick().return_const(());

    let mut rom = load_rom();
    let mut pipeline = Pipeline::new(&Config::default());
    let committed: Vec<_> = (0..6)
        .map(|_| pipeline.tick(&mut rom, &mut dmem, false).commit)
        .filter(|c| c.valid)
        .collect();

    assert_eq!(committed[0].rd, 7);
    assert_eq!(committed[0].value, 0xCAFE);
    assert_eq!(pipeline.regs.read(7), 0xCAFE);
}

// ══════════════════════════════════════════════════════════
// 3. Acknowledgements
// ══════════════════════════════════════════════════════════

#[test]
fn missing_response_keeps_load_in_writeback() {
    let mut rom = load_rom();
    let mut dmem = SilentDataPort::default();
    let mut pipeline = Pipeline::new(&Config::default());
    let reports: Vec<_> = (0..10)
        .map(|_| pipeline.tick(&mut rom, &mut dmem, false))
        .collect();

    assert_eq!(dmem.requests, vec![MemRequest::load(0x40, MemWidth::Word)]);
    assert!(reports.iter().all(|r| !r.commit.valid));
    assert!(reports[4..].iter().all(|r| r.stalls.wb));
    assert!(pipeline.mem_wb.valid && pipeline.mem_wb.op.is_load());
    assert_eq!(pipeline.regs.read(7), 0);
}

#[rstest]
#[case::wrong_address(MemResponse { addr: 0x44, data: 1, fault: false })]
#[case::fault(MemResponse { addr: 0x40, data: 1, fault: true })]
fn malformed_response_is_never_accepted(#[case] response: MemResponse) {
    let mut dmem = MockDataMem::new();
    let _ = dmem.expect_ready().return_const(true);
    let _ = dmem.expect_request().times(1).return_const(());
    let _ = dmem.expect_response().return_const(Some(response));
    let _ = dmem.expect_consume().never();
    let _ = dmem.expect_tick().return_const(());

    let mut rom = load_rom();
    let mut pipeline = Pipeline::new(&Config::default());
    for _ in 0..20 {
        let report = pipeline.tick(&mut rom, &mut dmem, false);
        assert!(!report.commit.valid || report.commit.rd != 7);
    }
    assert_eq!(pipeline.regs.read(7), 0);
    assert!(pipeline.mem_wb.op.is_load(), "the load is still waiting");
}

#[test]
fn unmapped_load_deadlocks_the_simulator() {
    let mut ctx = TestContext::new().load_asm("
        li  x1, 0x80000000
        lw  x2, 0(x1)
        end: j end
    ");
    let outcome = ctx.sim.run();
    assert!(matches!(outcome, RunOutcome::Deadlock { .. }), "got {outcome:?}");
    assert_eq!(ctx.sim.stats.instructions_retired, 2, "only the li pair retires");
}

// ══════════════════════════════════════════════════════════
// 4. Hold
// ══════════════════════════════════════════════════════════

#[test]
fn hold_freezes_everything_and_resumes_cleanly() {
    const SRC: &str = "
        mvi x1, 1
        addi x2, x1, 1
        lw  x3, 0(x0)
        add x4, x3, x2
        end: j end
    ";
    let mut free = TestContext::new().load_asm(SRC);
    let _ = free.run_to_halt();

    let mut held = TestContext::new().load_asm(SRC);
    let _ = held.run(4);
    let snapshot = (held.sim.pipeline.pc, held.sim.pipeline.mem_wb);
    held.sim.set_hold(true);
    let frozen = held.run(7);
    assert!(frozen.iter().all(|r| !r.commit.valid && r.stalls.hold));
    assert_eq!((held.sim.pipeline.pc, held.sim.pipeline.mem_wb), snapshot);

    held.sim.set_hold(false);
    let _ = held.run_to_halt();
    assert_eq!(held.sim.stats.stalls_hold, 7);
    assert_eq!(held.sim.commits(), free.sim.commits());
    assert_eq!(held.sim.stats.cycles, free.sim.stats.cycles + 7);
}

// ══════════════════════════════════════════════════════════
// 5. Instruction-port latency
// ══════════════════════════════════════════════════════════

#[rstest]
#[case(1)]
#[case(3)]
fn fetch_latency_slows_but_does_not_change_results(#[case] latency: u64) {
    const SRC: &str = "
        mvi  x1, 3
    loop:
        addi x1, x1, -1
        bne  x1, x0, loop
        j    out
        mvi  x5, 1
    out:
        mvi  x6, 6
        end: j end
    ";
    let (fast, reference) = cycles_to_halt(test_config(), SRC);
    let mut config = test_config();
    config.memory.imem_latency = latency;
    let (slow, ctx) = cycles_to_halt(config, SRC);

    assert!(slow > fast);
    assert!(ctx.sim.stats.stalls_fetch > 0);
    assert_eq!(ctx.sim.commits(), reference.sim.commits());
    assert_eq!(ctx.get_reg(5), 0);
    assert_eq!(ctx.get_reg(6), 6);
}

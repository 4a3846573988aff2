//! Memory System Construction Tests.

use pretty_assertions::assert_eq;

use pqr5_core::config::Config;
use pqr5_core::core::pipeline::signals::MemWidth;
use pqr5_core::sim::loader::{Program, Segment};
use pqr5_core::soc::System;

#[test]
fn default_system_maps_uart_and_counter() {
    let mut system = System::new(&Config::default());
    let bus = system.dmem.bus_mut();
    assert!(bus.uart().is_some());
    assert_eq!(bus.read(0x1_0004, MemWidth::Word), Some(1));
    assert_eq!(bus.read(0x1_000C, MemWidth::Word), Some(0));
    assert_eq!(bus.ram().len(), 64 * 1024);
}

#[test]
fn program_is_copied_into_both_memories() {
    let mut system = System::new(&Config::default());
    let program = Program::from_words(0x40, &[0x0000_0013, 0x0000_006F]);
    assert!(system.load_program(&program).is_ok());
    assert_eq!(system.imem.peek(0x44), 0x6F);
    assert_eq!(system.dmem.peek(0x40, MemWidth::Word), Some(0x13));
}

#[test]
fn segment_fitting_only_one_memory_goes_there() {
    let mut config = Config::default();
    config.memory.dmem_base = 0x8000;
    config.memory.dmem_size = 0x100;
    let mut system = System::new(&config);

    let program = Program {
        entry: 0,
        segments: vec![
            Segment {
                addr: 0,
                data: vec![0x13, 0, 0, 0],
            },
            Segment {
                addr: 0x8010,
                data: vec![1, 2, 3, 4],
            },
        ],
    };
    assert!(system.load_program(&program).is_ok());
    assert_eq!(system.imem.peek(0), 0x13);
    assert_eq!(system.dmem.peek(0x8010, MemWidth::Word), Some(0x0403_0201));
}

#[test]
fn segment_outside_both_memories_is_rejected() {
    let mut system = System::new(&Config::default());
    let program = Program::from_words(0x0100_0000, &[0x13]);
    let Err(e) = system.load_program(&program) else {
        panic!("segment at 16 MiB must not load");
    };
    assert_eq!(e.to_string(), "segment at 0x01000000 (4 bytes) lies outside memory");
}

//! MMIO Device Tests.

use pretty_assertions::assert_eq;

use pqr5_core::core::pipeline::signals::MemWidth;
use pqr5_core::soc::devices::{CycleCounter, Device, Uart};

// ══════════════════════════════════════════════════════════
// 1. UART
// ══════════════════════════════════════════════════════════

#[test]
fn uart_captures_low_byte_of_each_store() {
    let mut uart = Uart::new(0x1_0000, false);
    for byte in b"hi\n" {
        uart.write(0, MemWidth::Word, 0xFFFF_FF00 | u32::from(*byte));
    }
    assert_eq!(uart.output(), b"hi\n");
    assert_eq!(uart.output_string(), "hi\n");
}

#[test]
fn uart_status_is_always_ready() {
    let mut uart = Uart::new(0x1_0000, false);
    assert_eq!(uart.read(4, MemWidth::Word), 1);
    assert_eq!(uart.read(0, MemWidth::Word), 0, "TX reads as zero");
}

#[test]
fn uart_ignores_writes_to_status() {
    let mut uart = Uart::new(0x1_0000, false);
    uart.write(4, MemWidth::Byte, u32::from(b'x'));
    assert!(uart.output().is_empty());
}

#[test]
fn uart_window_and_identity() {
    let uart = Uart::new(0x1_0000, false);
    assert_eq!(uart.address_range(), (0x1_0000, 8));
    assert_eq!(uart.name(), "UART0");
    assert!(uart.as_uart().is_some());
    assert!(uart.contains(0x1_0004));
    assert!(!uart.contains(0x1_0008));
}

// ══════════════════════════════════════════════════════════
// 2. Cycle counter
// ══════════════════════════════════════════════════════════

#[test]
fn counter_advances_once_per_tick() {
    let mut counter = CycleCounter::new(0x1_000C);
    assert_eq!(counter.count(), 0);
    for _ in 0..300 {
        counter.tick();
    }
    assert_eq!(counter.count(), 300);
    assert_eq!(counter.read(0, MemWidth::Word), 300);
    assert_eq!(counter.read(0, MemWidth::Byte), 300 & 0xFF);
    assert_eq!(counter.read(1, MemWidth::Byte), 300 >> 8);
}

#[test]
fn counter_is_read_only() {
    let mut counter = CycleCounter::new(0x1_000C);
    counter.tick();
    counter.write(0, MemWidth::Word, 1234);
    assert_eq!(counter.count(), 1);
    assert!(counter.as_uart().is_none());
    assert_eq!(counter.address_range(), (0x1_000C, 4));
}

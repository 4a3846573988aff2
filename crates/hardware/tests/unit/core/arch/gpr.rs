//! Register File Tests.

use proptest::prelude::*;

use pqr5_core::core::arch::gpr::Gpr;

#[test]
fn starts_zeroed() {
    let regs = Gpr::new();
    assert_eq!(regs.snapshot(), [0; 32]);
}

#[test]
fn write_then_read() {
    let mut regs = Gpr::new();
    regs.write(5, 0xDEAD_BEEF);
    regs.write(31, 7);
    assert_eq!(regs.read(5), 0xDEAD_BEEF);
    assert_eq!(regs.read(31), 7);
    assert_eq!(regs.read(6), 0);
}

#[test]
fn display_lists_register_pairs() {
    let mut regs = Gpr::new();
    regs.write(1, 0x10);
    let text = regs.to_string();
    assert_eq!(text.lines().count(), 16);
    assert_eq!(
        text.lines().next(),
        Some("x0 =0x00000000 x1 =0x00000010")
    );
}

proptest! {
    #[test]
    fn x0_ignores_every_write(val in any::<u32>()) {
        let mut regs = Gpr::new();
        regs.write(0, val);
        prop_assert_eq!(regs.read(0), 0);
        prop_assert_eq!(regs.snapshot()[0], 0);
    }

    #[test]
    fn index_is_masked_to_five_bits(idx in 32usize..64, val in 1u32..) {
        let mut regs = Gpr::new();
        regs.write(idx, val);
        let alias = idx & 31;
        let expected = if alias == 0 { 0 } else { val };
        prop_assert_eq!(regs.read(alias), expected);
    }
}

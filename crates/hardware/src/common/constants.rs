//! Global System Constants.
//!
//! This module defines system-wide constants used across the simulator. It includes:
//! 1. **Instruction Constants:** Instruction width, canonical NOP and the end-of-program word.
//! 2. **Memory Map Constants:** Addresses of the memory-mapped devices on the data bus.
//! 3. **Image Constants:** Framing words of the PQR5 program container.

/// Size of an RV32I instruction in bytes.
pub const INSTRUCTION_SIZE: u32 = 4;

/// Number of architectural integer registers.
pub const REG_COUNT: usize = 32;

/// Canonical NOP encoding (`addi x0, x0, 0`).
pub const NOP: u32 = 0x0000_0013;

/// Default program-end sentinel: `jal x0, 0`, a jump to itself.
///
/// Bare-metal programs conventionally end in a self loop; the driver stops as
/// soon as this word commits.
pub const HALT_SENTINEL: u32 = 0x0000_006F;

/// Mask clearing bit 0 of a JALR target.
pub const JALR_TARGET_MASK: u32 = !1;

/// UART transmit data register (byte writes are sent to the console).
pub const UART_TX_ADDR: u32 = 0x0001_0000;

/// UART status register (bit 0 reads as "transmitter ready").
pub const UART_STATUS_ADDR: u32 = 0x0001_0004;

/// Free-running 32-bit hardware cycle counter.
pub const CYCLE_COUNTER_ADDR: u32 = 0x0001_000C;

/// Preamble written by the PQR5 assembler.
pub const PQR5_ASM_PREAMBLE: u32 = 0xF0F0_F0F0;

/// Preamble written by the raw-binary converter.
pub const PQR5_BIN_PREAMBLE: u32 = 0xC0C0_C0C0;

/// Postamble terminating every PQR5 container.
pub const PQR5_POSTAMBLE: u32 = 0xE0E0_E0E0;

/// Size of the PQR5 container header (preamble, size, base) in bytes.
pub const PQR5_HEADER_BYTES: usize = 12;

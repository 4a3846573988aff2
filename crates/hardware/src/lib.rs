//! PQR5 pipeline simulator library.
//!
//! This crate implements a cycle-accurate model of a five-stage in-order RV32I
//! core with the following:
//! 1. **Core:** Fetch, decode, execute, memory and writeback stages with operand
//!    forwarding, a load-use interlock and two redirect paths (decode and execute).
//! 2. **Memory:** Harvard instruction and data ports with configurable latency, and
//!    a data bus carrying a UART and a cycle counter.
//! 3. **ISA:** Decoder, disassembler and a two-pass assembler for RV32I.
//! 4. **Simulation:** Program loader, driver loop, reference interpreter,
//!    configuration, and statistics collection.

/// Common types and constants (memory map, container framing, errors).
pub mod common;
/// Simulator configuration (defaults, enums, hierarchical config structures).
pub mod config;
/// CPU core (pipeline, register file, execution units).
pub mod core;
/// Instruction set (decode, encode, disassembly, assembler, ABI).
pub mod isa;
/// Program loading, simulator driver and reference interpreter.
pub mod sim;
/// Memory system (ports, bus, devices, traits).
pub mod soc;
/// Simulation statistics collection and reporting.
pub mod stats;

/// Root configuration type; use `Config::default()` or deserialize from JSON.
pub use crate::config::Config;
/// The pipeline; owns latches, register file and predictor.
pub use crate::core::Pipeline;
/// Pipeline plus memories and statistics; construct with `Simulator::new`.
pub use crate::sim::Simulator;
/// Instruction and data memories; construct with `System::new`.
pub use crate::soc::System;

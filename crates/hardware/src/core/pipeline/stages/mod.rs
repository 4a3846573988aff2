//! The five stage functions.
//!
//! A stage reads only the latch it sits behind (plus the forwarding taps for
//! execute) and returns its outputs; nothing here mutates pipeline state. The
//! engine calls all five on the previous cycle's snapshot and then commits.
//!
//! | Stage | Reads    | Produces                                  |
//! |-------|----------|-------------------------------------------|
//! | IF    | PC       | fetched word, or nothing while IMEM waits |
//! | ID    | IF/ID    | ID/EX record, BP redirect, decode fault   |
//! | EX    | ID/EX    | EX/MEM record, BU redirect, branch outcome|
//! | MEM   | EX/MEM   | MEM/WB record, data-port request          |
//! | WB    | MEM/WB   | commit record, or a wait on load data     |

/// Instruction decode and register read.
pub mod decode;

/// ALU, branch resolution and operand forwarding.
pub mod execute;

/// Instruction fetch.
pub mod fetch;

/// Data-port request construction.
pub mod memory;

/// Load completion and the commit record.
pub mod writeback;

pub use decode::decode_stage;
pub use execute::execute_stage;
pub use fetch::fetch_stage;
pub use memory::mem_stage;
pub use writeback::{Commit, wb_stage};

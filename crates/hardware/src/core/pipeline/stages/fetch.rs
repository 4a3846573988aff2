//! Instruction Fetch (IF) Stage.
//!
//! This module implements the first stage of the instruction pipeline. It presents
//! the current program counter to the instruction port and, once the word is
//! available, produces the IF/ID record. Next-PC selection (sequential, decode
//! redirect or execute redirect) happens when the engine commits the cycle.

use crate::core::pipeline::latches::IfId;
use crate::soc::traits::InstructionPort;

/// Executes the instruction fetch stage.
///
/// # Arguments
///
/// * `pc` - Current program counter.
/// * `imem` - Instruction port.
///
/// # Returns
///
/// The IF/ID record, or `None` while the fetch of `pc` is still outstanding.
///
/// # Behavior
///
/// - Samples the port combinationally; it never starts a request itself
/// - A `None` result stalls fetch and keeps `pc` for the next cycle
pub fn fetch_stage<I: InstructionPort + ?Sized>(pc: u32, imem: &I) -> Option<IfId> {
    imem.respond(pc).map(|inst| IfId {
        valid: true,
        pc,
        inst,
    })
}

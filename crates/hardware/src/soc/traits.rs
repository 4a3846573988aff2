//! Memory interface contracts.
//!
//! This module defines the traits the pipeline and the bus are written against. It provides:
//! 1. **Instruction Port:** Fetch request/response with latency and cancellation.
//! 2. **Data Port:** Load/store requests with a ready signal and acknowledged responses.
//! 3. **Devices:** Width-aware read/write at device-relative offsets for bus routing.
//!
//! The pipeline samples responses while computing a cycle and issues requests when it
//! commits; `tick` is called once per cycle after the commit.

use std::fmt;

use crate::core::pipeline::signals::MemWidth;
use crate::soc::devices::Uart;

/// A data-memory access issued by the memory stage.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct MemRequest {
    /// Store when `true`, load otherwise.
    pub write: bool,
    /// Byte address.
    pub addr: u32,
    /// Access size.
    pub width: MemWidth,
    /// Store data (low `width` bytes are used).
    pub data: u32,
}

impl MemRequest {
    /// Builds a load request.
    pub const fn load(addr: u32, width: MemWidth) -> Self {
        Self {
            write: false,
            addr,
            width,
            data: 0,
        }
    }

    /// Builds a store request.
    pub const fn store(addr: u32, width: MemWidth, data: u32) -> Self {
        Self {
            write: true,
            addr,
            width,
            data,
        }
    }
}

/// Completion of a load on the data port.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct MemResponse {
    /// Address of the load this response answers.
    pub addr: u32,
    /// Raw data, zero-extended from the access width.
    pub data: u32,
    /// The access could not be serviced (no device mapped at `addr`).
    pub fault: bool,
}

/// Instruction-memory interface consumed by the fetch stage.
///
/// `respond` is combinational; `tick` latches the request for the next cycle.
pub trait InstructionPort {
    /// Returns the instruction word for `pc` if the fetch of `pc` has completed.
    fn respond(&self, pc: u32) -> Option<u32>;

    /// Advances one cycle, continuing or starting a fetch of `request`.
    fn tick(&mut self, request: Option<u32>);

    /// Abandons the fetch in progress (fetch was redirected).
    fn cancel(&mut self);
}

/// Data-memory interface consumed by the memory and writeback stages.
pub trait DataPort {
    /// Returns `true` if a new request would be accepted this cycle.
    fn ready(&self) -> bool;

    /// Issues a request. Only called when `ready()` held during the cycle.
    fn request(&mut self, req: MemRequest);

    /// Oldest completed load, if its latency has elapsed.
    fn response(&self) -> Option<MemResponse>;

    /// Retires the response returned by `response()`.
    fn consume(&mut self);

    /// Advances one cycle.
    fn tick(&mut self);
}

/// Trait for memory-mapped devices attached to the data bus.
///
/// Offsets are relative to the start of `address_range()`. Reads return data
/// zero-extended from the access width.
pub trait Device: fmt::Debug {
    /// Returns a short name for this device (e.g., `"UART0"`, `"DMEM"`).
    fn name(&self) -> &str;

    /// Returns (base_address, size_in_bytes) for this device's region.
    fn address_range(&self) -> (u32, u32);

    /// Reads `width` bytes (little-endian) at the given offset.
    fn read(&mut self, offset: u32, width: MemWidth) -> u32;

    /// Writes the low `width` bytes of `val` at the given offset.
    fn write(&mut self, offset: u32, width: MemWidth, val: u32);

    /// Advances device state by one cycle.
    fn tick(&mut self) {}

    /// Returns a reference as `Uart` if this device is a UART; otherwise `None`.
    fn as_uart(&self) -> Option<&Uart> {
        None
    }

    /// Returns `true` if `addr` falls inside this device's region.
    fn contains(&self, addr: u32) -> bool {
        let (base, size) = self.address_range();
        addr.wrapping_sub(base) < size && addr >= base
    }
}

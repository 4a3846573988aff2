//! Latency-modeling memory ports.
//!
//! This module provides:
//! 1. **InstructionMemory:** Fixed-latency fetch port over an instruction RAM.
//! 2. **DataMemory:** Data port over the bus with load latency, a bounded number
//!    of outstanding loads and stores that occupy the port.
//!
//! Both ports perform the access when the request is issued and model latency by
//! delaying the response, which keeps stores and loads in program order.

use std::collections::VecDeque;

use tracing::{debug, warn};

use crate::core::pipeline::signals::MemWidth;
use crate::soc::interconnect::Bus;
use crate::soc::memory::Ram;
use crate::soc::traits::{DataPort, InstructionPort, MemRequest, MemResponse};

/// Fixed-latency instruction memory.
///
/// Fetches outside the RAM return the all-zero word, which does not decode and is
/// therefore inert in the pipeline.
#[derive(Debug)]
pub struct InstructionMemory {
    ram: Ram,
    latency: u64,
    /// Fetch in progress: (pc, cycles until the word is available).
    pending: Option<(u32, u64)>,
}

impl InstructionMemory {
    /// Creates an instruction memory.
    ///
    /// # Arguments
    ///
    /// * `base` - Address of the first instruction byte.
    /// * `size` - Size in bytes.
    /// * `latency` - Extra cycles per fetch; 0 responds in the cycle the PC is presented.
    pub fn new(base: u32, size: usize, latency: u64) -> Self {
        Self {
            ram: Ram::new("IMEM", base, size),
            latency,
            pending: None,
        }
    }

    /// Backing RAM.
    pub const fn ram(&self) -> &Ram {
        &self.ram
    }

    /// Mutable backing RAM, for program loading.
    pub const fn ram_mut(&mut self) -> &mut Ram {
        &mut self.ram
    }

    /// Reads the word at `pc` without timing.
    pub fn peek(&self, pc: u32) -> u32 {
        self.ram.load(pc, MemWidth::Word).unwrap_or(0)
    }

    /// Drops any fetch in progress.
    pub const fn reset(&mut self) {
        self.pending = None;
    }
}

impl InstructionPort for InstructionMemory {
    fn respond(&self, pc: u32) -> Option<u32> {
        if self.latency == 0 {
            return Some(self.peek(pc));
        }
        match self.pending {
            Some((p, 0)) if p == pc => Some(self.peek(pc)),
            _ => None,
        }
    }

    fn tick(&mut self, request: Option<u32>) {
        if self.latency == 0 {
            return;
        }
        self.pending = match (request, self.pending) {
            (Some(pc), Some((p, remaining))) if p == pc => Some((p, remaining.saturating_sub(1))),
            (Some(pc), _) => Some((pc, self.latency)),
            (None, _) => None,
        };
    }

    fn cancel(&mut self) {
        self.pending = None;
    }
}

/// Data memory port in front of the data bus.
#[derive(Debug)]
pub struct DataMemory {
    bus: Bus,
    latency: u64,
    max_outstanding: usize,
    /// Loads in flight, oldest first, with the cycle their response becomes visible.
    pending: VecDeque<(MemResponse, u64)>,
    /// Cycles the port stays busy after a store.
    busy: u64,
    now: u64,
}

impl DataMemory {
    /// Creates a data memory port.
    ///
    /// # Arguments
    ///
    /// * `bus` - Data bus with RAM and devices attached.
    /// * `latency` - Extra cycles per access; with 0 a load issued in the memory
    ///   stage is acknowledged when it reaches writeback.
    /// * `max_outstanding` - Loads accepted before `ready()` drops (at least 1).
    pub fn new(bus: Bus, latency: u64, max_outstanding: usize) -> Self {
        Self {
            bus,
            latency,
            max_outstanding: max_outstanding.max(1),
            pending: VecDeque::new(),
            busy: 0,
            now: 0,
        }
    }

    /// The data bus.
    pub const fn bus(&self) -> &Bus {
        &self.bus
    }

    /// Mutable data bus.
    pub const fn bus_mut(&mut self) -> &mut Bus {
        &mut self.bus
    }

    /// Reads memory without timing or side effects on the port.
    pub fn peek(&self, addr: u32, width: MemWidth) -> Option<u32> {
        self.bus.ram().load(addr, width)
    }

    /// Number of loads in flight.
    pub fn outstanding(&self) -> usize {
        self.pending.len()
    }

    /// Drops all in-flight loads and port occupancy.
    pub fn reset(&mut self) {
        self.pending.clear();
        self.busy = 0;
    }
}

impl DataPort for DataMemory {
    fn ready(&self) -> bool {
        self.busy == 0 && self.pending.len() < self.max_outstanding
    }

    fn request(&mut self, req: MemRequest) {
        if req.write {
            if !self.bus.write(req.addr, req.width, req.data) {
                warn!(
                    addr = format_args!("{:#010x}", req.addr),
                    "store to unmapped address dropped"
                );
            }
            self.busy = self.latency + 1;
            return;
        }

        let response = match self.bus.read(req.addr, req.width) {
            Some(data) => MemResponse {
                addr: req.addr,
                data,
                fault: false,
            },
            None => {
                debug!(addr = format_args!("{:#010x}", req.addr), "load from unmapped address");
                MemResponse {
                    addr: req.addr,
                    data: 0,
                    fault: true,
                }
            }
        };
        self.pending.push_back((response, self.now + 1 + self.latency));
    }

    fn response(&self) -> Option<MemResponse> {
        self.pending
            .front()
            .filter(|(_, ready_at)| *ready_at <= self.now)
            .map(|(resp, _)| *resp)
    }

    fn consume(&mut self) {
        let _ = self.pending.pop_front();
    }

    fn tick(&mut self) {
        self.now += 1;
        self.busy = self.busy.saturating_sub(1);
        self.bus.tick();
    }
}

//! Memory system construction.
//!
//! This module builds the instruction and data sides from configuration. It performs:
//! 1. **Instruction side:** Instruction RAM with its fetch latency.
//! 2. **Data side:** Data RAM on a bus with the UART and cycle counter attached.
//! 3. **Program loading:** Places program segments into the memory that covers them.

use tracing::debug;

use crate::common::error::LoadError;
use crate::config::Config;
use crate::sim::loader::Program;
use crate::soc::devices::{CycleCounter, Uart};
use crate::soc::interconnect::Bus;
use crate::soc::memory::Ram;
use crate::soc::memory::controller::{DataMemory, InstructionMemory};

/// Instruction and data memories of one simulated system.
#[derive(Debug)]
pub struct System {
    /// Instruction memory (fetch port).
    pub imem: InstructionMemory,
    /// Data memory (load/store port and MMIO).
    pub dmem: DataMemory,
}

impl System {
    /// Builds both memories and attaches the devices named in `config.system`.
    pub fn new(config: &Config) -> Self {
        let mem = &config.memory;
        let imem = InstructionMemory::new(mem.imem_base, mem.imem_size, mem.imem_latency);

        let mut bus = Bus::new(Ram::new("DMEM", mem.dmem_base, mem.dmem_size));
        bus.add_device(Box::new(Uart::new(
            config.system.uart_base,
            config.system.uart_echo,
        )));
        bus.add_device(Box::new(CycleCounter::new(config.system.cycle_counter_addr)));
        let dmem = DataMemory::new(bus, mem.dmem_latency, mem.max_outstanding_loads);

        Self { imem, dmem }
    }

    /// Loads every segment of `program`.
    ///
    /// A segment goes to instruction memory when it fits there, and is also copied
    /// into data memory when it fits there, so read-only data linked next to the
    /// code stays reachable by loads.
    pub fn load_program(&mut self, program: &Program) -> Result<(), LoadError> {
        for seg in &program.segments {
            let in_imem = self.imem.ram().covers(seg.addr, seg.data.len());
            let in_dmem = self.dmem.bus().ram().covers(seg.addr, seg.data.len());
            if !in_imem && !in_dmem {
                return Err(LoadError::OutOfRange {
                    addr: seg.addr,
                    len: seg.data.len(),
                });
            }
            if in_imem {
                self.imem.ram_mut().write_bytes(seg.addr, &seg.data)?;
            }
            if in_dmem {
                self.dmem.bus_mut().ram_mut().write_bytes(seg.addr, &seg.data)?;
            }
            debug!(
                addr = format_args!("{:#010x}", seg.addr),
                len = seg.data.len(),
                in_imem,
                in_dmem,
                "segment loaded"
            );
        }
        Ok(())
    }
}

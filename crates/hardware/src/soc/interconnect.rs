//! Data bus interconnect.
//!
//! This module implements the bus behind the data port. It provides:
//! 1. **Device registration:** MMIO devices are added by address range.
//! 2. **Access routing:** Reads and writes go to the device claiming the address,
//!    then to data RAM. Unmapped accesses are reported to the caller.
//! 3. **Tick:** Every device is advanced once per cycle.

use crate::core::pipeline::signals::MemWidth;
use crate::soc::devices::Uart;
use crate::soc::memory::Ram;
use crate::soc::traits::Device;

/// Data bus connecting the data port to RAM and MMIO devices.
#[derive(Debug)]
pub struct Bus {
    /// Data RAM.
    ram: Ram,
    /// Memory-mapped devices, checked before RAM.
    devices: Vec<Box<dyn Device>>,
}

impl Bus {
    /// Creates a bus with the given data RAM and no devices.
    pub fn new(ram: Ram) -> Self {
        Self {
            ram,
            devices: Vec::new(),
        }
    }

    /// Registers a device on the bus; devices are kept sorted by base address.
    pub fn add_device(&mut self, dev: Box<dyn Device>) {
        self.devices.push(dev);
        self.devices.sort_by_key(|d| d.address_range().0);
    }

    /// Data RAM.
    pub const fn ram(&self) -> &Ram {
        &self.ram
    }

    /// Mutable data RAM, for program loading.
    pub const fn ram_mut(&mut self) -> &mut Ram {
        &mut self.ram
    }

    /// The first UART on the bus, if any.
    pub fn uart(&self) -> Option<&Uart> {
        self.devices.iter().find_map(|d| d.as_uart())
    }

    /// Returns whether an access of `width` at `addr` is backed by a device or RAM.
    pub fn is_valid_address(&self, addr: u32, width: MemWidth) -> bool {
        self.devices.iter().any(|d| d.contains(addr))
            || self.ram.covers(addr, width.bytes() as usize)
    }

    /// Reads `width` bytes at `addr`; `None` if nothing is mapped there.
    pub fn read(&mut self, addr: u32, width: MemWidth) -> Option<u32> {
        let (dev, offset) = self.find_device(addr, width)?;
        Some(dev.read(offset, width))
    }

    /// Writes `width` bytes at `addr`; returns `false` if nothing is mapped there.
    pub fn write(&mut self, addr: u32, width: MemWidth, val: u32) -> bool {
        match self.find_device(addr, width) {
            Some((dev, offset)) => {
                dev.write(offset, width, val);
                true
            }
            None => false,
        }
    }

    /// Advances all devices by one cycle.
    pub fn tick(&mut self) {
        for dev in &mut self.devices {
            dev.tick();
        }
    }

    fn find_device(
        &mut self,
        addr: u32,
        width: MemWidth,
    ) -> Option<(&mut (dyn Device + 'static), u32)> {
        if let Some(dev) = self.devices.iter_mut().find(|d| d.contains(addr)) {
            let offset = addr - dev.address_range().0;
            return Some((dev.as_mut(), offset));
        }
        if self.ram.covers(addr, width.bytes() as usize) {
            let offset = addr - self.ram.base();
            return Some((&mut self.ram, offset));
        }
        None
    }
}

//! Instruction and data memories.
//!
//! This module implements the Harvard memories the pipeline talks to. It provides:
//! 1. **Ram:** Byte-addressed little-endian storage mapped at a base address.
//! 2. **Controller:** Latency modeling for the instruction and data ports.

/// Latency-modeling instruction and data ports.
pub mod controller;

use crate::common::error::LoadError;
use crate::core::pipeline::signals::MemWidth;
use crate::soc::traits::Device;

/// Byte-addressed RAM mapped at `base`.
#[derive(Clone, PartialEq, Eq)]
pub struct Ram {
    name: &'static str,
    base: u32,
    bytes: Vec<u8>,
}

impl std::fmt::Debug for Ram {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Ram")
            .field("name", &self.name)
            .field("base", &format_args!("{:#010x}", self.base))
            .field("size", &self.bytes.len())
            .finish()
    }
}

impl Ram {
    /// Creates a zero-filled RAM.
    ///
    /// # Arguments
    ///
    /// * `name` - Device name reported on the bus.
    /// * `base` - Address of the first byte.
    /// * `size` - Size in bytes.
    pub fn new(name: &'static str, base: u32, size: usize) -> Self {
        Self {
            name,
            base,
            bytes: vec![0; size],
        }
    }

    /// Base address.
    pub const fn base(&self) -> u32 {
        self.base
    }

    /// Size in bytes.
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    /// Returns `true` if the RAM has no storage.
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// Raw contents.
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Byte offset of `addr`, if an access of `len` bytes there fits.
    fn offset_of(&self, addr: u32, len: usize) -> Option<usize> {
        let offset = addr.checked_sub(self.base)? as usize;
        (offset.checked_add(len)? <= self.bytes.len()).then_some(offset)
    }

    /// Returns `true` if every byte of an access of `len` bytes at `addr` is mapped.
    pub fn covers(&self, addr: u32, len: usize) -> bool {
        self.offset_of(addr, len).is_some()
    }

    /// Reads a little-endian value of `width` at an absolute address.
    pub fn load(&self, addr: u32, width: MemWidth) -> Option<u32> {
        let len = width.bytes() as usize;
        let offset = self.offset_of(addr, len)?;
        let mut buf = [0u8; 4];
        buf[..len].copy_from_slice(&self.bytes[offset..offset + len]);
        Some(u32::from_le_bytes(buf))
    }

    /// Writes the low bytes of `val` at an absolute address. Returns `false` if unmapped.
    pub fn store(&mut self, addr: u32, width: MemWidth, val: u32) -> bool {
        let len = width.bytes() as usize;
        match self.offset_of(addr, len) {
            Some(offset) => {
                self.bytes[offset..offset + len].copy_from_slice(&val.to_le_bytes()[..len]);
                true
            }
            None => false,
        }
    }

    /// Copies `data` into memory starting at the absolute address `addr`.
    ///
    /// Used for loading program segments during setup.
    pub fn write_bytes(&mut self, addr: u32, data: &[u8]) -> Result<(), LoadError> {
        let offset = self.offset_of(addr, data.len()).ok_or(LoadError::OutOfRange {
            addr,
            len: data.len(),
        })?;
        self.bytes[offset..offset + data.len()].copy_from_slice(data);
        Ok(())
    }

    /// Zeroes the whole memory.
    pub fn clear(&mut self) {
        self.bytes.fill(0);
    }
}

impl Device for Ram {
    fn name(&self) -> &str {
        self.name
    }

    fn address_range(&self) -> (u32, u32) {
        (self.base, self.bytes.len() as u32)
    }

    fn read(&mut self, offset: u32, width: MemWidth) -> u32 {
        self.load(self.base.wrapping_add(offset), width).unwrap_or(0)
    }

    fn write(&mut self, offset: u32, width: MemWidth, val: u32) {
        let _ = self.store(self.base.wrapping_add(offset), width, val);
    }
}

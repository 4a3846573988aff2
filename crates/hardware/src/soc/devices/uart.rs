//! Transmit-only debug UART.
//!
//! Programs print by storing a byte to the TX register. The status register
//! always reports the transmitter ready; the model has no baud-rate timing.
//! Output is captured for inspection and may be echoed to stdout.

use std::io::{self, Write};

use crate::core::pipeline::signals::MemWidth;
use crate::soc::traits::Device;

/// Transmitter Holding Register (write).
const REG_TX: u32 = 0;
/// Line status register (read).
const REG_STATUS: u32 = 4;
/// Size of the register window in bytes.
const WINDOW: u32 = 8;

/// Status bit: transmitter ready for another byte.
const STATUS_TX_READY: u32 = 0x1;

/// Threshold for flushing the echo buffer to stdout.
const TX_BUFFER_FLUSH_THRESHOLD: usize = 256;

/// UART device structure.
#[derive(Debug)]
pub struct Uart {
    /// Base address of the register window.
    base_addr: u32,
    /// Every byte ever transmitted.
    output: Vec<u8>,
    /// Bytes waiting to be echoed.
    tx_buffer: Vec<u8>,
    /// Echo transmitted bytes to stdout.
    echo: bool,
}

impl Uart {
    /// Creates a new UART device.
    ///
    /// # Arguments
    ///
    /// * `base_addr` - Address of the TX register.
    /// * `echo` - When true, transmitted bytes are also written to stdout.
    pub const fn new(base_addr: u32, echo: bool) -> Self {
        Self {
            base_addr,
            output: Vec::new(),
            tx_buffer: Vec::new(),
            echo,
        }
    }

    /// Bytes transmitted so far.
    pub fn output(&self) -> &[u8] {
        &self.output
    }

    /// Transmitted bytes as (lossy) UTF-8.
    pub fn output_string(&self) -> String {
        String::from_utf8_lossy(&self.output).into_owned()
    }

    /// Writes pending echo bytes to stdout.
    pub fn flush(&mut self) {
        if !self.tx_buffer.is_empty() {
            let mut out = io::stdout().lock();
            let _ = out.write_all(&self.tx_buffer);
            let _ = out.flush();
            self.tx_buffer.clear();
        }
    }

    fn transmit(&mut self, byte: u8) {
        self.output.push(byte);
        if self.echo {
            self.tx_buffer.push(byte);
            if byte == b'\n' || self.tx_buffer.len() >= TX_BUFFER_FLUSH_THRESHOLD {
                self.flush();
            }
        }
    }
}

impl Drop for Uart {
    fn drop(&mut self) {
        self.flush();
    }
}

impl Device for Uart {
    fn name(&self) -> &str {
        "UART0"
    }

    fn address_range(&self) -> (u32, u32) {
        (self.base_addr, WINDOW)
    }

    fn read(&mut self, offset: u32, _width: MemWidth) -> u32 {
        match offset {
            REG_STATUS => STATUS_TX_READY,
            _ => 0,
        }
    }

    fn write(&mut self, offset: u32, _width: MemWidth, val: u32) {
        if offset == REG_TX {
            self.transmit(val as u8);
        }
    }

    fn as_uart(&self) -> Option<&Uart> {
        Some(self)
    }
}

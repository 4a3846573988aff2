//! Configuration system for the PQR5 simulator.
//!
//! This module defines all configuration structures and enums used to parameterize
//! the simulator. It provides:
//! 1. **Defaults:** Baseline constants for the memory map, latencies and predictor.
//! 2. **Structures:** Hierarchical config for general, system, memory, and pipeline.
//! 3. **Enums:** Branch predictor selection.
//!
//! Configuration is read from JSON (`Config::from_json_file`) or built with
//! `Config::default()`; every field is optional in JSON.

use std::fs;
use std::path::Path;

use serde::Deserialize;

use crate::common::constants::{CYCLE_COUNTER_ADDR, HALT_SENTINEL, UART_TX_ADDR};
use crate::common::error::SimError;

/// Default configuration constants for the simulator.
///
/// These values define the baseline hardware configuration when not
/// explicitly overridden in a JSON configuration file.
mod defaults {
    /// Upper bound on simulated cycles before `run` gives up.
    pub const MAX_CYCLES: u64 = 10_000_000;

    /// Consecutive commit-free cycles after which the pipeline is declared deadlocked.
    ///
    /// A faulting data-memory response stalls writeback forever; this is how the
    /// driver notices.
    pub const DEADLOCK_CYCLES: u64 = 10_000;

    /// Base address of the instruction memory.
    pub const IMEM_BASE: u32 = 0x0000_0000;

    /// Size of the instruction memory (64 KiB).
    pub const IMEM_SIZE: usize = 64 * 1024;

    /// Base address of the data memory.
    ///
    /// Instruction and data memories are separate (Harvard) address spaces, so
    /// both may start at zero.
    pub const DMEM_BASE: u32 = 0x0000_0000;

    /// Size of the data memory (64 KiB). MMIO devices sit directly above it.
    pub const DMEM_SIZE: usize = 64 * 1024;

    /// Extra cycles before an instruction fetch responds (0 = same cycle).
    pub const IMEM_LATENCY: u64 = 0;

    /// Extra cycles before a load is acknowledged (0 = next cycle, in writeback).
    pub const DMEM_LATENCY: u64 = 0;

    /// Loads the data port will accept before it stops being ready.
    pub const MAX_OUTSTANDING_LOADS: usize = 2;

    /// Global history length of the gshare predictor, in bits.
    pub const GHR_BITS: u32 = 8;
}

/// Branch prediction algorithm types.
///
/// Selects the direction predictor consulted in decode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub enum BranchPredictorKind {
    /// Always predict conditional branches as not taken.
    NotTaken,
    /// Backward-taken / forward-not-taken.
    #[default]
    Static,
    /// Global history XOR PC indexing 2-bit counters.
    #[serde(alias = "Gshare", alias = "GSHARE")]
    GShare,
}

/// Root configuration structure containing all simulator settings.
///
/// # Examples
///
/// Creating a default configuration:
///
/// ```
/// use pqr5_core::config::Config;
///
/// let config = Config::default();
/// assert_eq!(config.general.trace_instructions, false);
/// assert_eq!(config.general.halt_instruction, 0x0000_006F);
/// ```
///
/// Deserializing from JSON:
///
/// ```
/// use pqr5_core::config::{BranchPredictorKind, Config};
///
/// let json = r#"{
///     "general": { "max_cycles": 5000 },
///     "memory": { "dmem_latency": 2 },
///     "pipeline": { "branch_predictor": "GShare", "ghr_bits": 10 }
/// }"#;
///
/// let config = Config::from_json_str(json).unwrap();
/// assert_eq!(config.general.max_cycles, 5000);
/// assert_eq!(config.memory.dmem_latency, 2);
/// assert_eq!(config.memory.imem_latency, 0);
/// assert_eq!(config.pipeline.branch_predictor, BranchPredictorKind::GShare);
/// ```
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    /// General simulation settings
    #[serde(default)]
    pub general: GeneralConfig,
    /// Memory-mapped device addresses
    #[serde(default)]
    pub system: SystemConfig,
    /// Instruction and data memory geometry and timing
    #[serde(default)]
    pub memory: MemoryConfig,
    /// Branch predictor configuration
    #[serde(default)]
    pub pipeline: PipelineConfig,
}

impl Config {
    /// Parses a configuration from a JSON string.
    pub fn from_json_str(json: &str) -> Result<Self, SimError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Reads and parses a JSON configuration file.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, SimError> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|e| SimError::io(path, e))?;
        Self::from_json_str(&text)
    }
}

/// General simulation settings and options.
#[derive(Debug, Clone, Deserialize)]
pub struct GeneralConfig {
    /// Emit a `trace!` event per stage per cycle.
    #[serde(default)]
    pub trace_instructions: bool,

    /// Cycle budget for `Simulator::run`.
    #[serde(default = "GeneralConfig::default_max_cycles")]
    pub max_cycles: u64,

    /// Instruction word whose commit ends the run.
    #[serde(default = "GeneralConfig::default_halt_instruction")]
    pub halt_instruction: u32,

    /// Commit-free cycles tolerated before declaring deadlock.
    #[serde(default = "GeneralConfig::default_deadlock_cycles")]
    pub deadlock_cycles: u64,

    /// Record every valid commit for later inspection.
    #[serde(default)]
    pub commit_log: bool,
}

impl GeneralConfig {
    fn default_max_cycles() -> u64 {
        defaults::MAX_CYCLES
    }

    fn default_halt_instruction() -> u32 {
        HALT_SENTINEL
    }

    fn default_deadlock_cycles() -> u64 {
        defaults::DEADLOCK_CYCLES
    }
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            trace_instructions: false,
            max_cycles: defaults::MAX_CYCLES,
            halt_instruction: HALT_SENTINEL,
            deadlock_cycles: defaults::DEADLOCK_CYCLES,
            commit_log: false,
        }
    }
}

/// Memory-mapped device configuration on the data bus.
#[derive(Debug, Clone, Deserialize)]
pub struct SystemConfig {
    /// UART base address (TX register; status register at +4).
    #[serde(default = "SystemConfig::default_uart_base")]
    pub uart_base: u32,

    /// Address of the free-running cycle counter.
    #[serde(default = "SystemConfig::default_cycle_counter")]
    pub cycle_counter_addr: u32,

    /// Copy UART output to stdout as it is written.
    #[serde(default)]
    pub uart_echo: bool,
}

impl SystemConfig {
    fn default_uart_base() -> u32 {
        UART_TX_ADDR
    }

    fn default_cycle_counter() -> u32 {
        CYCLE_COUNTER_ADDR
    }
}

impl Default for SystemConfig {
    fn default() -> Self {
        Self {
            uart_base: UART_TX_ADDR,
            cycle_counter_addr: CYCLE_COUNTER_ADDR,
            uart_echo: false,
        }
    }
}

/// Instruction and data memory configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct MemoryConfig {
    /// Instruction memory base address
    #[serde(default = "MemoryConfig::default_imem_base")]
    pub imem_base: u32,

    /// Instruction memory size in bytes
    #[serde(default = "MemoryConfig::default_imem_size")]
    pub imem_size: usize,

    /// Extra fetch latency in cycles
    #[serde(default = "MemoryConfig::default_imem_latency")]
    pub imem_latency: u64,

    /// Data memory base address
    #[serde(default = "MemoryConfig::default_dmem_base")]
    pub dmem_base: u32,

    /// Data memory size in bytes
    #[serde(default = "MemoryConfig::default_dmem_size")]
    pub dmem_size: usize,

    /// Extra load/store latency in cycles
    #[serde(default = "MemoryConfig::default_dmem_latency")]
    pub dmem_latency: u64,

    /// Maximum loads in flight on the data port
    #[serde(default = "MemoryConfig::default_max_outstanding")]
    pub max_outstanding_loads: usize,
}

impl MemoryConfig {
    fn default_imem_base() -> u32 {
        defaults::IMEM_BASE
    }

    fn default_imem_size() -> usize {
        defaults::IMEM_SIZE
    }

    fn default_imem_latency() -> u64 {
        defaults::IMEM_LATENCY
    }

    fn default_dmem_base() -> u32 {
        defaults::DMEM_BASE
    }

    fn default_dmem_size() -> usize {
        defaults::DMEM_SIZE
    }

    fn default_dmem_latency() -> u64 {
        defaults::DMEM_LATENCY
    }

    fn default_max_outstanding() -> usize {
        defaults::MAX_OUTSTANDING_LOADS
    }
}

impl Default for MemoryConfig {
    fn default() -> Self {
        Self {
            imem_base: defaults::IMEM_BASE,
            imem_size: defaults::IMEM_SIZE,
            imem_latency: defaults::IMEM_LATENCY,
            dmem_base: defaults::DMEM_BASE,
            dmem_size: defaults::DMEM_SIZE,
            dmem_latency: defaults::DMEM_LATENCY,
            max_outstanding_loads: defaults::MAX_OUTSTANDING_LOADS,
        }
    }
}

/// Pipeline and branch predictor configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct PipelineConfig {
    /// Direction predictor
    #[serde(default)]
    pub branch_predictor: BranchPredictorKind,

    /// gshare history length in bits (1-16)
    #[serde(default = "PipelineConfig::default_ghr_bits")]
    pub ghr_bits: u32,
}

impl PipelineConfig {
    fn default_ghr_bits() -> u32 {
        defaults::GHR_BITS
    }
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            branch_predictor: BranchPredictorKind::default(),
            ghr_bits: defaults::GHR_BITS,
        }
    }
}

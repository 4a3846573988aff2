//! System-on-Chip (SoC) Components.
//!
//! This module organizes the collaborators the pipeline talks to: the
//! instruction and data memories, the data bus, and the memory-mapped devices,
//! together with the builder that assembles them from configuration.

/// Memory system builder.
pub mod builder;

/// Memory-mapped I/O device implementations.
pub mod devices;

/// Data bus interconnect and routing.
pub mod interconnect;

/// Instruction and data memories.
pub mod memory;

/// Memory port and device trait definitions.
pub mod traits;

pub use builder::System;

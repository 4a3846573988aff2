//! Instruction pipeline implementation.
//!
//! This module contains the implementation of the five-stage instruction pipeline.
//! It includes the following components:
//! 1. **Engine:** Owns the pipeline state and commits one clock per tick.
//! 2. **Hazards:** Operand forwarding and the load-use interlock.
//! 3. **Latches:** Inter-stage records between Fetch, Decode, Execute, Memory and Writeback.
//! 4. **Signals:** ALU, branch-condition and access-width encodings.
//! 5. **Stages:** Implementation of Fetch, Decode, Execute, Memory, and Writeback stages.

/// Pipeline state and the per-cycle evaluate/commit loop.
pub mod engine;

/// Pipeline hazard detection and forwarding logic.
pub mod hazards;

/// Inter-stage pipeline latches (IF/ID, ID/EX, EX/MEM, MEM/WB, WB output).
pub mod latches;

/// Control signals produced by decode.
pub mod signals;

/// Pipeline stage implementations (fetch, decode, execute, memory, writeback).
pub mod stages;

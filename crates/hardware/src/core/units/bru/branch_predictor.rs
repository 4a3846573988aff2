//! Branch Predictor Interface.
//!
//! This module defines the `BranchPredictor` trait that all direction predictors
//! implement, together with the instruction class handed to the predictor and the
//! resolved outcome it is trained with. Targets of PC-relative control flow are
//! encoded in the immediate, so the interface is direction-only.

/// Control-flow class of the instruction being predicted.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum BranchClass {
    /// Conditional branch (B-type).
    Conditional {
        /// The target lies at or before the branch (negative offset).
        backward: bool,
    },
    /// Unconditional PC-relative jump (JAL).
    Direct,
    /// Register-relative jump (JALR); never predictable at fetch.
    Indirect,
}

/// A control-flow instruction as resolved by the execute stage.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BranchOutcome {
    /// Program counter of the branch or jump.
    pub pc: u32,
    /// Instruction class.
    pub class: BranchClass,
    /// Direction assumed by fetch when it issued the following instructions.
    pub predicted: bool,
    /// Actual direction.
    pub taken: bool,
    /// Actual target address (valid when `taken`).
    pub target: u32,
}

impl BranchOutcome {
    /// Returns `true` if fetch followed the wrong path.
    pub const fn mispredicted(&self) -> bool {
        self.predicted != self.taken
    }
}

/// Trait for branch direction prediction algorithms.
///
/// Predictors are consulted combinationally when a fetched word is recognised as
/// control flow, and updated once per control-flow instruction resolved in
/// execute. State is owned by the pipeline and reset with it.
pub trait BranchPredictor {
    /// Predicts whether the instruction at `pc` will redirect fetch.
    ///
    /// # Arguments
    ///
    /// * `pc` - Program counter of the instruction
    /// * `class` - Control-flow class of the instruction
    ///
    /// # Returns
    ///
    /// `true` if fetch should follow the encoded target.
    fn predict(&self, pc: u32, class: BranchClass) -> bool;

    /// Trains the predictor with a resolved outcome.
    ///
    /// # Arguments
    ///
    /// * `outcome` - The branch or jump as resolved in execute
    fn update(&mut self, outcome: &BranchOutcome);

    /// Returns the predictor to its power-on state.
    fn reset(&mut self);
}

//! Static Branch Predictors.
//!
//! Stateless direction heuristics. `StaticPredictor` implements
//! backward-taken/forward-not-taken (BTFN), which predicts loop-closing branches
//! as taken. `NotTakenPredictor` always falls through.

use super::{BranchClass, BranchOutcome, BranchPredictor};

/// Backward-taken / forward-not-taken predictor.
#[derive(Clone, Copy, Debug, Default)]
pub struct StaticPredictor;

impl StaticPredictor {
    /// Creates a new BTFN predictor.
    pub const fn new() -> Self {
        Self
    }
}

impl BranchPredictor for StaticPredictor {
    fn predict(&self, _pc: u32, class: BranchClass) -> bool {
        match class {
            BranchClass::Conditional { backward } => backward,
            BranchClass::Direct => true,
            BranchClass::Indirect => false,
        }
    }

    fn update(&mut self, _outcome: &BranchOutcome) {}

    fn reset(&mut self) {}
}

/// Predicts every conditional branch as not taken.
#[derive(Clone, Copy, Debug, Default)]
pub struct NotTakenPredictor;

impl NotTakenPredictor {
    /// Creates a new always-not-taken predictor.
    pub const fn new() -> Self {
        Self
    }
}

impl BranchPredictor for NotTakenPredictor {
    fn predict(&self, _pc: u32, class: BranchClass) -> bool {
        matches!(class, BranchClass::Direct)
    }

    fn update(&mut self, _outcome: &BranchOutcome) {}

    fn reset(&mut self) {}
}

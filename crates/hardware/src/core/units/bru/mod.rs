//! Branch prediction unit (BRU) implementations.
//!
//! This module contains the direction predictors selectable from
//! configuration: static backward-taken/forward-not-taken, always not-taken,
//! and a global-history gshare predictor.

pub use self::branch_predictor::{BranchClass, BranchOutcome, BranchPredictor};

/// Branch predictor trait and common types.
pub mod branch_predictor;

/// Global history branch predictor (gshare algorithm).
pub mod gshare;

/// Static branch predictors (BTFN and always not-taken).
pub mod static_bp;

use self::{
    gshare::GSharePredictor,
    static_bp::{NotTakenPredictor, StaticPredictor},
};
use crate::config::{BranchPredictorKind, Config};

/// Enum wrapper for static dispatch of Branch Predictors.
/// This avoids vtable lookups in the per-cycle decode path.
#[derive(Clone, Debug)]
pub enum BranchPredictorWrapper {
    /// Always not-taken.
    NotTaken(NotTakenPredictor),
    /// Backward-taken / forward-not-taken.
    Static(StaticPredictor),
    /// Global history XOR PC, 2-bit counters.
    GShare(GSharePredictor),
}

impl BranchPredictorWrapper {
    /// Creates a new branch predictor wrapper based on configuration.
    pub fn new(config: &Config) -> Self {
        match config.pipeline.branch_predictor {
            BranchPredictorKind::NotTaken => Self::NotTaken(NotTakenPredictor::new()),
            BranchPredictorKind::Static => Self::Static(StaticPredictor::new()),
            BranchPredictorKind::GShare => {
                Self::GShare(GSharePredictor::new(config.pipeline.ghr_bits))
            }
        }
    }
}

impl BranchPredictor for BranchPredictorWrapper {
    #[inline(always)]
    fn predict(&self, pc: u32, class: BranchClass) -> bool {
        match self {
            Self::NotTaken(bp) => bp.predict(pc, class),
            Self::Static(bp) => bp.predict(pc, class),
            Self::GShare(bp) => bp.predict(pc, class),
        }
    }

    #[inline(always)]
    fn update(&mut self, outcome: &BranchOutcome) {
        match self {
            Self::NotTaken(bp) => bp.update(outcome),
            Self::Static(bp) => bp.update(outcome),
            Self::GShare(bp) => bp.update(outcome),
        }
    }

    fn reset(&mut self) {
        match self {
            Self::NotTaken(bp) => bp.reset(),
            Self::Static(bp) => bp.reset(),
            Self::GShare(bp) => bp.reset(),
        }
    }
}

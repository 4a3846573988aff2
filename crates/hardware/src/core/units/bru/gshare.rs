//! GShare Branch Predictor.
//!
//! GShare correlates global branch history with the program counter using an XOR
//! hash. A single Global History Register (GHR) is shared by every branch; the
//! hashed index selects a 2-bit saturating counter (the direction FSM).
//!
//! # Performance
//!
//! - **Time Complexity:** `predict()` and `update()` are O(1)
//! - **Space Complexity:** O(2^N) counters where N is the history length
//! - **Best Case:** Correlated branches where outcome depends on recent history
//! - **Worst Case:** Uncorrelated branches aliasing in the table

use super::{BranchClass, BranchOutcome, BranchPredictor};

/// Counter value at and above which a branch is predicted taken.
const TAKEN_THRESHOLD: u8 = 2;
/// Saturation limit of the 2-bit counters.
const COUNTER_MAX: u8 = 3;
/// Power-on counter value (weakly not-taken).
const COUNTER_INIT: u8 = 1;

/// GShare Predictor structure.
#[derive(Clone, Debug)]
pub struct GSharePredictor {
    /// Global History Register storing recent conditional-branch outcomes.
    ghr: u32,
    /// Pattern History Table containing 2-bit saturating counters.
    pht: Vec<u8>,
    /// Mask selecting `history_bits` of history and table index.
    mask: u32,
}

impl GSharePredictor {
    /// Creates a new GShare predictor with `2^history_bits` counters.
    ///
    /// `history_bits` is clamped to 1..=16.
    pub fn new(history_bits: u32) -> Self {
        let bits = history_bits.clamp(1, 16);
        let size = 1usize << bits;
        Self {
            ghr: 0,
            pht: vec![COUNTER_INIT; size],
            mask: (size as u32) - 1,
        }
    }

    /// Current value of the global history register.
    pub const fn history(&self) -> u32 {
        self.ghr
    }

    /// Calculates the index into the Pattern History Table.
    ///
    /// Computes the XOR of the word-aligned PC and the Global History Register.
    const fn index(&self, pc: u32) -> usize {
        (((pc >> 2) ^ self.ghr) & self.mask) as usize
    }
}

impl BranchPredictor for GSharePredictor {
    /// Returns true if the 2-bit counter at the hashed index is 2 or 3 (Taken).
    fn predict(&self, pc: u32, class: BranchClass) -> bool {
        match class {
            BranchClass::Conditional { .. } => self.pht[self.index(pc)] >= TAKEN_THRESHOLD,
            BranchClass::Direct => true,
            BranchClass::Indirect => false,
        }
    }

    /// Updates the 2-bit saturating counter in the PHT and shifts the new
    /// outcome into the Global History Register.
    fn update(&mut self, outcome: &BranchOutcome) {
        if !matches!(outcome.class, BranchClass::Conditional { .. }) {
            return;
        }
        let idx = self.index(outcome.pc);
        let counter = &mut self.pht[idx];
        if outcome.taken && *counter < COUNTER_MAX {
            *counter += 1;
        } else if !outcome.taken && *counter > 0 {
            *counter -= 1;
        }
        self.ghr = ((self.ghr << 1) | u32::from(outcome.taken)) & self.mask;
    }

    fn reset(&mut self) {
        self.ghr = 0;
        self.pht.fill(COUNTER_INIT);
    }
}

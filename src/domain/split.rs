// ============================================================
// Layer 3 — Dataset Splits
// ============================================================
// Split names one half of a provider's data. EvalSplit says
// where the evaluation samples for a training run come from.
//
// No default holdout ratio exists: a run either uses the
// provider's own test half or states the fraction it wants
// carved out of the training half.

use serde::{Deserialize, Serialize};

/// Which half of a dataset to fetch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Split {
    Train,
    Test,
}

/// Source of the evaluation samples for a training run.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum EvalSplit {
    /// Evaluate on the provider's test split
    TestSplit,

    /// Hold out this fraction of the training split for evaluation
    /// and train on the rest. Must lie strictly between 0 and 1.
    Holdout(f64),
}

impl EvalSplit {
    /// Held-out fraction, if this is a holdout split
    pub fn holdout_fraction(&self) -> Option<f64> {
        match self {
            EvalSplit::TestSplit   => None,
            EvalSplit::Holdout(f)  => Some(*f),
        }
    }
}

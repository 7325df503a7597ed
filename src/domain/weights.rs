// ============================================================
// Layer 3 — Weight Snapshot
// ============================================================
// A mapping from parameter name to a plain numeric array.
//
// This is the hand-off format between a trained model and the
// outside world: the ML layer produces it from Burn parameters,
// the infra layer writes it to disk as JSON, and a later
// process reads it back and loads it into a fresh model.
//
// Parameter names are dotted paths such as "fc1.weight" or
// "conv2.bias". A BTreeMap keeps them sorted so two snapshots
// of the same model always serialise identically.

use std::collections::BTreeMap;

use anyhow::{bail, Result};
use serde::{Deserialize, Serialize};

/// One parameter's values together with its shape.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeightArray {
    /// Dimensions, outermost first
    pub shape: Vec<usize>,

    /// Row-major values; length equals the product of `shape`
    pub values: Vec<f32>,
}

impl WeightArray {
    /// Build an array, rejecting a shape that does not match the value count.
    pub fn new(shape: Vec<usize>, values: Vec<f32>) -> Result<Self> {
        let expected: usize = shape.iter().product();
        if expected != values.len() {
            bail!(
                "shape {:?} holds {} values but {} were given",
                shape,
                expected,
                values.len()
            );
        }
        Ok(Self { shape, values })
    }

    /// Number of scalar values
    pub fn num_values(&self) -> usize {
        self.values.len()
    }
}

/// Every learnable parameter of a model, keyed by name.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WeightSnapshot {
    params: BTreeMap<String, WeightArray>,
}

impl WeightSnapshot {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace one named parameter
    pub fn insert(&mut self, name: impl Into<String>, array: WeightArray) {
        self.params.insert(name.into(), array);
    }

    pub fn get(&self, name: &str) -> Option<&WeightArray> {
        self.params.get(name)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.params.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.params.len()
    }

    pub fn is_empty(&self) -> bool {
        self.params.is_empty()
    }

    /// Total number of scalar parameters across all arrays
    pub fn num_values(&self) -> usize {
        self.params.values().map(WeightArray::num_values).sum()
    }
}

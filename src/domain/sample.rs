// ============================================================
// Layer 3 — LabelledImage Domain Type
// ============================================================
// A single (input, label) pair from a dataset split.
// Pixels are stored row-major as f32 so that any normalisation
// has already happened by the time a sample reaches the batcher.

use anyhow::{bail, Result};
use serde::{Deserialize, Serialize};

/// One image with its class index.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LabelledImage {
    /// Row-major pixel values, `height * width` entries
    pub pixels: Vec<f32>,

    /// Number of pixel rows
    pub height: usize,

    /// Number of pixel columns
    pub width: usize,

    /// Class index in `[0, num_classes)`
    pub label: usize,
}

impl LabelledImage {
    pub fn new(pixels: Vec<f32>, height: usize, width: usize, label: usize) -> Self {
        Self { pixels, height, width, label }
    }

    /// `(height, width)` of this sample
    pub fn dims(&self) -> (usize, usize) {
        (self.height, self.width)
    }

    /// Reject a sample whose pixel count disagrees with its dims or
    /// whose label falls outside `[0, num_classes)`.
    pub fn check(&self, num_classes: usize) -> Result<()> {
        if self.pixels.len() != self.height * self.width {
            bail!(
                "sample has {} pixels but claims {}x{}",
                self.pixels.len(), self.height, self.width
            );
        }
        if self.label >= num_classes {
            bail!("label {} out of range for {} classes", self.label, num_classes);
        }
        Ok(())
    }
}

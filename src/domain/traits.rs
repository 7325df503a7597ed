// ============================================================
// Layer 3 — Core Traits (Abstractions)
// ============================================================
// The application layer asks for data through DatasetSource,
// never through a concrete downloader. That lets the training
// runner work the same way against MNIST and against the small
// in-memory datasets used in tests.
//
// Reference: Rust Book §10 (Traits: Defining Shared Behaviour)

use anyhow::Result;

use crate::domain::sample::LabelledImage;
use crate::domain::split::Split;

// ─── DatasetSource ────────────────────────────────────────────────────────────
/// Any component that can provide labelled images.
///
/// Implementations:
///   - MnistSource    → downloads the MNIST digit images
///   - InMemorySource → serves a fixed list of samples
pub trait DatasetSource {
    /// Human readable class names, indexed by label.
    fn class_names(&self) -> Vec<String>;

    /// Load every sample of one split, in the provider's order.
    fn load_split(&self, split: Split) -> Result<Vec<LabelledImage>>;

    /// Number of output classes a classifier for this data needs
    fn num_classes(&self) -> usize {
        self.class_names().len()
    }
}

// ============================================================
// Layer 3 — Domain Layer
// ============================================================
// Plain Rust structs and traits that describe what the system
// works with, independent of the tensor engine:
//
//   sample.rs   — one labelled image as raw pixels
//   split.rs    — train/test split selectors
//   weights.rs  — a named-array snapshot of model parameters
//   traits.rs   — the dataset provider abstraction
//
// Rules for this layer:
//   - NO Burn framework types allowed here
//   - NO file I/O or network calls
//
// Keeping it pure means snapshots and samples can be built,
// compared and serialised in tests without any backend.
//
// Reference: Rust Book §5 (Structs), §10 (Traits)

// One labelled image sample
pub mod sample;

// Split selectors
pub mod split;

// Parameter name → numeric array mapping
pub mod weights;

// Core abstractions (traits) that other layers implement
pub mod traits;

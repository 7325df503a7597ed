// ============================================================
// Layer 6 — Infrastructure Layer
// ============================================================
// File-system concerns shared by the use cases:
//
//   checkpoint.rs — weight snapshots and train_config.json
//   metrics.rs    — per-epoch metrics CSV
//
// Reference: Rust Book §9 (Error Handling with anyhow)

/// Weight file and config persistence
pub mod checkpoint;

/// Training metrics CSV logger
pub mod metrics;

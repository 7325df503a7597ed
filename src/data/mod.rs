// ============================================================
// Layer 4 — Data Pipeline
// ============================================================
// Everything between a dataset provider and tensor batches:
//
//   DatasetSource     → MnistSource / InMemorySource
//       │
//       ▼
//   split_train_val   → optional seeded holdout
//       │
//       ▼
//   ImageDataset      → implements Burn's Dataset trait
//       │
//       ▼
//   ImageBatcher      → stacks samples into tensor batches
//       │
//       ▼
//   DataLoader        → feeds batches to the epoch loop
//
// Reference: Burn Book §4 (Datasets and Dataloaders)

/// Burn's MNIST download wrapped as a DatasetSource
pub mod mnist;

/// Fixed in-memory samples
pub mod memory;

/// Implements Burn's Dataset trait for labelled images
pub mod dataset;

/// Implements Burn's Batcher trait to create tensor batches
pub mod batcher;

/// Seeded shuffle-and-split
pub mod splitter;

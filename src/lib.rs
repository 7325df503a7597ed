// ============================================================
// digit-classifier
// ============================================================
// Layered the same way top to bottom:
//
//   cli          Layer 1 — argument parsing, printing
//   application  Layer 2 — train / evaluate workflows
//   domain       Layer 3 — samples, splits, weight snapshots
//   data         Layer 4 — dataset sources, Burn Dataset/Batcher
//   ml           Layer 5 — ClassifiableModel, models, training
//   infra        Layer 6 — weight files, metrics CSV

pub mod cli;
pub mod application;
pub mod domain;
pub mod data;
pub mod ml;
pub mod infra;

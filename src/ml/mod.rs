// ============================================================
// Layer 5 — ML / Model Layer (Burn)
// ============================================================
// All model, loss and optimisation code lives here. Burn does
// the tensor math, autodiff and parameter updates; this layer
// only decides what to call and in which order.
//
//   classifier.rs — ClassifiableModel trait and the generic
//                   train / evaluate / snapshot loop
//   model.rs      — NonConvClassifier and ConvClassifier
//   params.rs     — Param ↔ WeightSnapshot conversion
//   loss.rs       — NLL and cross-entropy behind one trait
//   trainer.rs    — backends, SGD and the epoch runner
//   variants.rs   — variant names, build / train / score glue
//
// Reference: Burn Book §3 (Building Blocks), §5 (Training)

pub mod classifier;
pub mod model;
pub mod params;
pub mod loss;
pub mod trainer;
pub mod variants;

// ============================================================
// Layer 5 — Epoch Runner
// ============================================================
// Drives the generic ClassifiableModel loop for one model:
//
//   for epoch in 1..=epochs:
//       model = model.train_epoch(train batches)   (Autodiff backend)
//       acc   = model.evaluate(test batches)       (inner backend)
//       report acc
//
// Key Burn insight:
//   - Training batches live on the Autodiff backend
//   - model.valid() returns the model on the inner backend, so
//     the test batcher is built for B::InnerBackend
//   - Both share one device type, so one device value serves both
//
// The optimizer is SGD with classic momentum. Burn's default
// dampening is 0.1; it is set to 0 here so the update is
// v = m*v + g, θ = θ - lr*v.
//
// Reference: Burn Book §5 (Training)

use anyhow::Result;
use burn::{
    data::dataloader::DataLoaderBuilder,
    module::AutodiffModule,
    optim::{momentum::MomentumConfig, SgdConfig},
    prelude::*,
    tensor::backend::AutodiffBackend,
};

use crate::data::{batcher::ImageBatcher, dataset::ImageDataset};
use crate::infra::metrics::EpochMetrics;
use crate::ml::classifier::{ClassifiableModel, InferenceBackend};
use crate::ml::loss::ClassificationLoss;

#[cfg(not(feature = "wgpu"))]
pub type InferBackend = burn::backend::NdArray;
#[cfg(feature = "wgpu")]
pub type InferBackend = burn::backend::Wgpu;

pub type TrainBackend = burn::backend::Autodiff<InferBackend>;

/// Optimisation settings for one model.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Hyperparameters {
    pub learning_rate: f64,
    pub momentum:      f64,
    pub epochs:        usize,
    pub batch_size:    usize,
    /// Shuffle seed for the training loader
    pub seed:          u64,
}

/// A trained model and what happened along the way.
pub struct TrainingOutcome<M> {
    pub model:   M,
    pub history: Vec<EpochMetrics>,
}

/// Train `model` for `hp.epochs` epochs, evaluating after each one.
pub fn run_training<B, M, L>(
    name:          &str,
    model:         M,
    loss_fn:       &L,
    hp:            &Hyperparameters,
    train_dataset: ImageDataset,
    test_dataset:  ImageDataset,
    device:        &B::Device,
) -> Result<TrainingOutcome<M>>
where
    B: AutodiffBackend,
    B::InnerBackend: InferenceBackend,
    M: ClassifiableModel<B> + AutodiffModule<B>,
    M::InnerModule: ClassifiableModel<B::InnerBackend>,
    L: ClassificationLoss<B>,
{
    if test_dataset.sample_count() == 0 {
        tracing::warn!("[{}] evaluation split is empty; accuracy will read 0", name);
    }

    // ── SGD with momentum ─────────────────────────────────────────────────────
    let mut optim = SgdConfig::new()
        .with_momentum(Some(
            MomentumConfig::new()
                .with_momentum(hp.momentum)
                .with_dampening(0.0),
        ))
        .init::<B, M>();

    // ── Training data loader (AutodiffBackend, shuffled) ──────────────────────
    let train_loader = DataLoaderBuilder::new(ImageBatcher::<B>::new(device.clone()))
        .batch_size(hp.batch_size)
        .shuffle(hp.seed)
        .num_workers(1)
        .build(train_dataset);

    // ── Test data loader (InnerBackend — no autodiff overhead) ────────────────
    let test_loader = DataLoaderBuilder::new(ImageBatcher::<B::InnerBackend>::new(device.clone()))
        .batch_size(hp.batch_size)
        .num_workers(1)
        .build(test_dataset);

    let mut model   = model;
    let mut history = Vec::with_capacity(hp.epochs);
    let mut best    = f64::NEG_INFINITY;

    for epoch in 1..=hp.epochs {
        let (trained, train_loss) =
            model.train_epoch(train_loader.iter(), loss_fn, &mut optim, hp.learning_rate);
        model = trained;

        let accuracy = model.evaluate(test_loader.iter());

        println!("[{}] Epoch {:>3}/{} | train_loss={:.4} | accuracy={:.4}",
            name, epoch, hp.epochs, train_loss, accuracy);
        let metrics = EpochMetrics::new(name, epoch, train_loss, accuracy);
        if metrics.is_improvement(best) {
            best = accuracy;
            tracing::debug!("[{}] best accuracy so far at epoch {}", name, epoch);
        }
        history.push(metrics);
    }

    Ok(TrainingOutcome { model, history })
}

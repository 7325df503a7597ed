// ============================================================
// Layer 5 — Model Variants
// ============================================================
// The two concrete architectures the runner knows about, and
// the glue that builds, trains and scores each of them.
//
// The application layer picks variants by name and hands over
// plain datasets and snapshots; all Burn types stay in here.

use std::{fmt, str::FromStr};

use anyhow::{bail, Result};
use burn::{data::dataloader::DataLoaderBuilder, prelude::*};
use serde::{Deserialize, Serialize};

use crate::data::{batcher::ImageBatcher, dataset::ImageDataset};
use crate::domain::weights::WeightSnapshot;
use crate::infra::metrics::EpochMetrics;
use crate::ml::classifier::ClassifiableModel;
use crate::ml::loss::NllLoss;
use crate::ml::model::{ConvClassifierConfig, NonConvClassifierConfig, MIN_CONV_SIDE};
use crate::ml::trainer::{run_training, Hyperparameters, InferBackend, TrainBackend};

/// Which classifier architecture to build.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ModelVariant {
    NonConv,
    Conv,
}

impl ModelVariant {
    pub const ALL: [ModelVariant; 2] = [ModelVariant::NonConv, ModelVariant::Conv];

    pub fn name(&self) -> &'static str {
        match self {
            ModelVariant::NonConv => "nonconv",
            ModelVariant::Conv    => "conv",
        }
    }

    /// Weight file name, e.g. "mnist_digit_conv.model"
    pub fn file_name(&self, run_name: &str) -> String {
        format!("{run_name}_{}.model", self.name())
    }
}

impl fmt::Display for ModelVariant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for ModelVariant {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "nonconv" | "non-conv" | "mlp" => Ok(ModelVariant::NonConv),
            "conv" | "cnn"                 => Ok(ModelVariant::Conv),
            other => Err(format!("unknown model variant '{other}' (expected 'nonconv' or 'conv')")),
        }
    }
}

/// Everything needed to rebuild a variant's architecture.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VariantSpec {
    pub image_height: usize,
    pub image_width:  usize,
    pub num_classes:  usize,
    pub hidden_size:  usize,
}

impl VariantSpec {
    /// Reject image sizes the variant cannot process.
    pub fn check(&self, variant: ModelVariant) -> Result<()> {
        if self.num_classes < 2 {
            bail!("a classifier needs at least 2 classes, got {}", self.num_classes);
        }
        if variant == ModelVariant::Conv
            && (self.image_height < MIN_CONV_SIDE || self.image_width < MIN_CONV_SIDE)
        {
            bail!(
                "the conv variant needs images of at least {0}x{0}, got {1}x{2}",
                MIN_CONV_SIDE, self.image_height, self.image_width
            );
        }
        Ok(())
    }

    fn nonconv(&self) -> NonConvClassifierConfig {
        NonConvClassifierConfig::new(self.image_height * self.image_width, self.num_classes)
            .with_hidden_size(self.hidden_size)
    }

    fn conv(&self) -> ConvClassifierConfig {
        ConvClassifierConfig::new(self.num_classes)
            .with_image_height(self.image_height)
            .with_image_width(self.image_width)
    }
}

/// Weights and per-epoch history of one trained variant.
pub struct TrainedVariant {
    pub snapshot: WeightSnapshot,
    pub history:  Vec<EpochMetrics>,
}

impl TrainedVariant {
    /// Accuracy after the last epoch, 0 if no epoch ran
    pub fn final_accuracy(&self) -> f64 {
        self.history.last().map_or(0.0, |m| m.accuracy)
    }
}

/// Seed the backend, build `variant` and train it.
pub fn train_variant(
    variant: ModelVariant,
    spec:    &VariantSpec,
    hp:      &Hyperparameters,
    train:   ImageDataset,
    test:    ImageDataset,
) -> Result<TrainedVariant> {
    spec.check(variant)?;
    let device: <TrainBackend as Backend>::Device = Default::default();

    // Seed before any parameter is initialised
    TrainBackend::seed(hp.seed);

    tracing::info!("Training {} classifier...", variant);
    match variant {
        ModelVariant::NonConv => {
            let model = spec.nonconv().init::<TrainBackend>(&device);
            let outcome = run_training::<TrainBackend, _, _>(variant.name(), model, &NllLoss, hp, train, test, &device)?;
            Ok(TrainedVariant { snapshot: outcome.model.save_weights()?, history: outcome.history })
        }
        ModelVariant::Conv => {
            let model = spec.conv().init::<TrainBackend>(&device);
            let outcome = run_training::<TrainBackend, _, _>(variant.name(), model, &NllLoss, hp, train, test, &device)?;
            Ok(TrainedVariant { snapshot: outcome.model.save_weights()?, history: outcome.history })
        }
    }
}

/// Rebuild `variant`, load `snapshot` into it and score it on `test`.
pub fn evaluate_variant(
    variant:    ModelVariant,
    spec:       &VariantSpec,
    snapshot:   &WeightSnapshot,
    test:       ImageDataset,
    batch_size: usize,
) -> Result<f64> {
    spec.check(variant)?;
    let device: <InferBackend as Backend>::Device = Default::default();

    let loader = DataLoaderBuilder::new(ImageBatcher::<InferBackend>::new(device.clone()))
        .batch_size(batch_size)
        .num_workers(1)
        .build(test);

    let accuracy = match variant {
        ModelVariant::NonConv => spec
            .nonconv()
            .init::<InferBackend>(&device)
            .load_weights(snapshot)?
            .accuracy(loader.iter()),
        ModelVariant::Conv => spec
            .conv()
            .init::<InferBackend>(&device)
            .load_weights(snapshot)?
            .accuracy(loader.iter()),
    };
    Ok(accuracy)
}

// ============================================================
// Layer 2 — TrainUseCase
// ============================================================
// Orchestrates a full training run:
//
//   Step 1: Validate the configuration
//   Step 2: Load train + evaluation splits   (Layer 4 - data)
//   Step 3: Save config for later evaluation (Layer 6 - infra)
//   Step 4: For every selected variant:
//             seed, build, train, evaluate   (Layer 5 - ml)
//             append metrics                 (Layer 6 - infra)
//             persist the weight snapshot    (Layer 6 - infra)
//
// Any failure aborts the whole run. Weights already written for
// an earlier variant stay on disk; nothing is resumed.

use anyhow::{bail, Result};
use serde::{Deserialize, Serialize};

use crate::data::{dataset::ImageDataset, splitter::prepare_splits};
use crate::domain::split::EvalSplit;
use crate::domain::traits::DatasetSource;
use crate::infra::{checkpoint::CheckpointManager, metrics::MetricsLogger};
use crate::ml::trainer::Hyperparameters;
use crate::ml::variants::{train_variant, ModelVariant, VariantSpec};

// ─── Training Configuration ──────────────────────────────────────────────────
// All settings for a training run. Serialisable so the evaluate
// command can rebuild the same architectures later.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrainConfig {
    pub output_dir:    String,
    /// Prefix of the weight file names
    pub run_name:      String,
    pub seed:          u64,
    pub epochs:        usize,
    pub learning_rate: f64,
    pub momentum:      f64,
    pub batch_size:    usize,
    pub hidden_size:   usize,
    pub eval_split:    EvalSplit,
    pub models:        Vec<ModelVariant>,
}

impl Default for TrainConfig {
    fn default() -> Self {
        Self {
            output_dir:    "models/pre_trained_models".to_string(),
            run_name:      "mnist_digit".to_string(),
            seed:          2,
            epochs:        5,
            learning_rate: 0.01,
            momentum:      0.5,
            batch_size:    64,
            hidden_size:   128,
            eval_split:    EvalSplit::TestSplit,
            models:        ModelVariant::ALL.to_vec(),
        }
    }
}

impl TrainConfig {
    /// Reject settings that cannot produce a meaningful run.
    pub fn validate(&self) -> Result<()> {
        if self.epochs == 0 {
            bail!("epochs must be at least 1");
        }
        if self.batch_size == 0 {
            bail!("batch size must be at least 1");
        }
        if self.hidden_size == 0 {
            bail!("hidden size must be at least 1");
        }
        if !(self.learning_rate > 0.0) {
            bail!("learning rate must be positive, got {}", self.learning_rate);
        }
        if !(0.0..1.0).contains(&self.momentum) {
            bail!("momentum must be in [0, 1), got {}", self.momentum);
        }
        if let Some(f) = self.eval_split.holdout_fraction() {
            if !(f > 0.0 && f < 1.0) {
                bail!("holdout fraction must be in (0, 1), got {f}");
            }
        }
        if self.models.is_empty() {
            bail!("no model variants selected");
        }
        Ok(())
    }

    pub fn hyperparameters(&self) -> Hyperparameters {
        Hyperparameters {
            learning_rate: self.learning_rate,
            momentum:      self.momentum,
            epochs:        self.epochs,
            batch_size:    self.batch_size,
            seed:          self.seed,
        }
    }
}

/// Result of one trained variant.
#[derive(Debug, Clone, PartialEq)]
pub struct VariantReport {
    pub variant:        ModelVariant,
    pub final_accuracy: f64,
    pub weights_path:   std::path::PathBuf,
}

// ─── TrainUseCase ─────────────────────────────────────────────────────────────
pub struct TrainUseCase<S: DatasetSource> {
    config: TrainConfig,
    source: S,
}

impl<S: DatasetSource> TrainUseCase<S> {
    pub fn new(config: TrainConfig, source: S) -> Self {
        Self { config, source }
    }

    /// Execute the full training pipeline end to end
    pub fn execute(&self) -> Result<Vec<VariantReport>> {
        let cfg = &self.config;

        // ── Step 1: Validate ──────────────────────────────────────────────────
        cfg.validate()?;

        // ── Step 2: Train / evaluation samples ────────────────────────────────
        let (train_samples, test_samples) = prepare_splits(&self.source, cfg.eval_split, cfg.seed)?;
        tracing::info!(
            "Split: {} train, {} evaluation",
            train_samples.len(),
            test_samples.len()
        );

        let train_dataset = ImageDataset::new(train_samples);
        let test_dataset  = ImageDataset::new(test_samples);

        let Some((image_height, image_width)) = train_dataset.image_dims() else {
            bail!("the training split is empty");
        };
        let spec = VariantSpec {
            image_height,
            image_width,
            num_classes: self.source.num_classes(),
            hidden_size: cfg.hidden_size,
        };

        // ── Step 3: Save config for evaluation ────────────────────────────────
        let ckpt    = CheckpointManager::new(&cfg.output_dir)?;
        let metrics = MetricsLogger::new(&cfg.output_dir)?;
        ckpt.save_config(cfg)?;

        // ── Step 4: Train each variant ────────────────────────────────────────
        let hp = cfg.hyperparameters();
        let mut reports = Vec::with_capacity(cfg.models.len());

        for &variant in &cfg.models {
            let trained = train_variant(
                variant, &spec, &hp, train_dataset.clone(), test_dataset.clone(),
            )?;
            metrics.log_all(&trained.history)?;

            let weights_path = ckpt.save_snapshot(&variant.file_name(&cfg.run_name), &trained.snapshot)?;
            let final_accuracy = trained.final_accuracy();

            tracing::info!("{} classifier done: accuracy {:.4}", variant, final_accuracy);
            reports.push(VariantReport { variant, final_accuracy, weights_path });
        }

        Ok(reports)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::evaluate_use_case::EvaluateUseCase;
    use crate::data::memory::InMemorySource;
    use crate::domain::sample::LabelledImage;
    use crate::domain::split::Split;

    // 16x16 images: class 0 is dark on the left half, class 1 on the right
    fn toy_image(label: usize, jitter: f32) -> LabelledImage {
        let side = 16;
        let pixels = (0..side * side)
            .map(|i| {
                let left = (i % side) < side / 2;
                if left == (label == 0) { 1.0 + jitter } else { -1.0 }
            })
            .collect();
        LabelledImage::new(pixels, side, side, label)
    }

    fn toy_source() -> InMemorySource {
        let train = (0..8).map(|i| toy_image(i % 2, i as f32 * 0.01)).collect();
        let test  = (0..4).map(|i| toy_image(i % 2, 0.5)).collect();
        InMemorySource::new(vec!["left".into(), "right".into()], train, test)
    }

    fn toy_config(tag: &str) -> TrainConfig {
        let dir = std::env::temp_dir()
            .join(format!("digit-classifier-run-{tag}-{}", std::process::id()));
        let _ = std::fs::remove_dir_all(&dir);
        TrainConfig {
            output_dir:    dir.to_string_lossy().into_owned(),
            run_name:      "toy".to_string(),
            epochs:        2,
            learning_rate: 0.05,
            batch_size:    4,
            hidden_size:   8,
            ..TrainConfig::default()
        }
    }

    #[test]
    fn test_default_config_is_valid() {
        assert!(TrainConfig::default().validate().is_ok());
    }

    #[test]
    fn test_validation_rejects_bad_values() {
        let bad = [
            TrainConfig { epochs: 0, ..TrainConfig::default() },
            TrainConfig { batch_size: 0, ..TrainConfig::default() },
            TrainConfig { momentum: 1.0, ..TrainConfig::default() },
            TrainConfig { learning_rate: 0.0, ..TrainConfig::default() },
            TrainConfig { eval_split: EvalSplit::Holdout(1.5), ..TrainConfig::default() },
            TrainConfig { models: Vec::new(), ..TrainConfig::default() },
        ];
        for cfg in bad {
            assert!(cfg.validate().is_err(), "{cfg:?} should be rejected");
        }
    }

    #[test]
    fn test_run_writes_weights_and_evaluates_consistently() {
        let cfg = toy_config("both");
        let reports = TrainUseCase::new(cfg.clone(), toy_source()).execute().unwrap();

        assert_eq!(reports.len(), 2);
        for report in &reports {
            assert!(report.weights_path.exists());
            assert!((0.0..=1.0).contains(&report.final_accuracy));

            let evaluated = EvaluateUseCase::new(&cfg.output_dir, toy_source())
                .evaluate(report.variant)
                .unwrap();
            assert!((evaluated - report.final_accuracy).abs() < 1e-9);
        }

        let csv = std::fs::read_to_string(
            std::path::Path::new(&cfg.output_dir).join("metrics.csv"),
        ).unwrap();
        // header + 2 variants x 2 epochs
        assert_eq!(csv.lines().count(), 5);

        std::fs::remove_dir_all(&cfg.output_dir).unwrap();
    }

    // Serves only the test half; asking for training data is an error
    struct TestHalfOnly(InMemorySource);

    impl DatasetSource for TestHalfOnly {
        fn class_names(&self) -> Vec<String> {
            self.0.class_names()
        }

        fn load_split(&self, split: Split) -> Result<Vec<LabelledImage>> {
            match split {
                Split::Train => anyhow::bail!("training split requested"),
                Split::Test  => self.0.load_split(Split::Test),
            }
        }
    }

    #[test]
    fn test_evaluate_reads_only_the_test_half() {
        let cfg = TrainConfig { models: vec![ModelVariant::NonConv], ..toy_config("testhalf") };
        let reports = TrainUseCase::new(cfg.clone(), toy_source()).execute().unwrap();

        let evaluated = EvaluateUseCase::new(&cfg.output_dir, TestHalfOnly(toy_source()))
            .evaluate(ModelVariant::NonConv)
            .unwrap();
        assert!((evaluated - reports[0].final_accuracy).abs() < 1e-9);

        std::fs::remove_dir_all(&cfg.output_dir).unwrap();
    }

    #[test]
    fn test_empty_training_split_is_an_error() {
        let cfg = toy_config("empty");
        let source = InMemorySource::new(vec!["a".into(), "b".into()], Vec::new(), Vec::new());
        assert!(TrainUseCase::new(cfg.clone(), source).execute().is_err());
        let _ = std::fs::remove_dir_all(&cfg.output_dir);
    }
}

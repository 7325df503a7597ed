// ============================================================
// Layer 2 — EvaluateUseCase
// ============================================================
// Scores a previously trained variant:
//   1. Read train_config.json to recover the architecture and split
//   2. Rebuild the evaluation split the run used
//   3. Load the variant's weight file into a fresh model
//   4. Report accuracy on the evaluation split

use anyhow::Result;

use crate::data::{dataset::ImageDataset, splitter::prepare_eval_split};
use crate::domain::traits::DatasetSource;
use crate::infra::checkpoint::CheckpointManager;
use crate::ml::variants::{evaluate_variant, ModelVariant, VariantSpec};

pub struct EvaluateUseCase<S: DatasetSource> {
    output_dir: String,
    source:     S,
}

impl<S: DatasetSource> EvaluateUseCase<S> {
    pub fn new(output_dir: impl Into<String>, source: S) -> Self {
        Self { output_dir: output_dir.into(), source }
    }

    pub fn evaluate(&self, variant: ModelVariant) -> Result<f64> {
        let ckpt = CheckpointManager::new(&self.output_dir)?;
        let cfg  = ckpt.load_config()?;

        let snapshot = ckpt.load_snapshot(&variant.file_name(&cfg.run_name))?;
        tracing::info!("Loaded {} weights ({} parameters)", variant, snapshot.len());

        // A holdout split is reproduced exactly from the saved seed
        let test_samples = prepare_eval_split(&self.source, cfg.eval_split, cfg.seed)?;
        let Some((image_height, image_width)) = test_samples.first().map(|s| s.dims()) else {
            tracing::warn!("Evaluation split is empty; accuracy will read 0");
            return Ok(0.0);
        };

        let spec = VariantSpec {
            image_height,
            image_width,
            num_classes: self.source.num_classes(),
            hidden_size: cfg.hidden_size,
        };

        evaluate_variant(variant, &spec, &snapshot, ImageDataset::new(test_samples), cfg.batch_size)
    }
}

// ============================================================
// Layer 6 — Checkpoint Manager
// ============================================================
// Persists weight snapshots and the run configuration.
//
// What gets saved:
//   1. One weight file per model variant — a WeightSnapshot
//      serialised as JSON (parameter name → shape + values)
//   2. train_config.json — the run's TrainConfig
//
// Why save the config separately?
//   A weight file alone does not say which architecture it
//   belongs to (hidden width, image size, class count). The
//   evaluate command reads the config first, rebuilds the same
//   model, then loads the weights into it.
//
// File layout:
//   models/pre_trained_models/
//     mnist_digit_nonconv.model
//     mnist_digit_conv.model
//     train_config.json
//     metrics.csv              ← written by MetricsLogger
//
// Reference: Rust Book §9 (Error Handling)

use anyhow::{bail, Context, Result};
use std::{fs, path::{Path, PathBuf}};

use crate::application::train_use_case::TrainConfig;
use crate::domain::weights::WeightSnapshot;

const CONFIG_FILE: &str = "train_config.json";

/// Reads and writes weight files inside one directory.
pub struct CheckpointManager {
    dir: PathBuf,
}

impl CheckpointManager {
    /// Create a new CheckpointManager, creating the directory if needed.
    pub fn new(dir: impl AsRef<Path>) -> Result<Self> {
        let dir = dir.as_ref().to_path_buf();
        fs::create_dir_all(&dir)
            .with_context(|| format!("Cannot create checkpoint directory '{}'", dir.display()))?;
        Ok(Self { dir })
    }

    /// Write `snapshot` to `{dir}/{file_name}`.
    pub fn save_snapshot(&self, file_name: &str, snapshot: &WeightSnapshot) -> Result<PathBuf> {
        let path = self.dir.join(file_name);
        let json = serde_json::to_vec(snapshot)?;

        fs::write(&path, json)
            .with_context(|| format!("Failed to save weights to '{}'", path.display()))?;

        tracing::info!(
            "Saved {} parameters ({} values) to '{}'",
            snapshot.len(),
            snapshot.num_values(),
            path.display()
        );
        Ok(path)
    }

    /// Read the snapshot stored at `{dir}/{file_name}`.
    pub fn load_snapshot(&self, file_name: &str) -> Result<WeightSnapshot> {
        let path = self.dir.join(file_name);

        let bytes = fs::read(&path)
            .with_context(|| {
                format!("Cannot read weights '{}'. Have you trained the model first?",
                    path.display())
            })?;

        let snapshot: WeightSnapshot = serde_json::from_slice(&bytes)
            .with_context(|| format!("'{}' is not a valid weight file", path.display()))?;

        if snapshot.is_empty() {
            bail!("'{}' holds no parameters", path.display());
        }
        Ok(snapshot)
    }

    /// Save the training configuration to JSON.
    pub fn save_config(&self, cfg: &TrainConfig) -> Result<()> {
        let path = self.dir.join(CONFIG_FILE);
        let json = serde_json::to_string_pretty(cfg)?;

        fs::write(&path, json)
            .with_context(|| {
                format!("Cannot write config to '{}'", path.display())
            })?;

        tracing::debug!("Saved training config to '{}'", path.display());
        Ok(())
    }

    /// Load the training configuration from JSON.
    pub fn load_config(&self) -> Result<TrainConfig> {
        let path = self.dir.join(CONFIG_FILE);

        let json = fs::read_to_string(&path)
            .with_context(|| {
                format!(
                    "Cannot read config from '{}'. \
                     Make sure you have run 'train' before 'evaluate'.",
                    path.display()
                )
            })?;

        Ok(serde_json::from_str(&json)?)
    }
}

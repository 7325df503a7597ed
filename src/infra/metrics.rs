// ============================================================
// Layer 6 — Metrics Logger
// ============================================================
// Records per-epoch results to a CSV file.
//
// Metrics recorded per epoch:
//   - model:      which variant produced the row ("nonconv", "conv")
//   - epoch:      the epoch number (1, 2, 3, ...)
//   - train_loss: mean loss over the epoch's training batches
//   - accuracy:   fraction of evaluation samples labelled correctly
//
// Output file: <output_dir>/metrics.csv
//
// Example CSV output:
//   model,epoch,train_loss,accuracy
//   nonconv,1,0.412300,0.934100
//   nonconv,2,0.221700,0.951800
//
// Rows are appended, so several runs into the same directory
// build up one history.

use anyhow::{Context, Result};
use std::{
    fs::{self, OpenOptions},
    io::Write,
    path::{Path, PathBuf},
};

/// One row of metrics data for a single training epoch
#[derive(Debug, Clone, PartialEq)]
pub struct EpochMetrics {
    /// Name of the model variant
    pub model: String,

    /// The epoch number (starts at 1)
    pub epoch: usize,

    /// Mean loss over the epoch's training batches
    pub train_loss: f64,

    /// Fraction of evaluation samples predicted correctly, in [0.0, 1.0]
    pub accuracy: f64,
}

impl EpochMetrics {
    pub fn new(model: impl Into<String>, epoch: usize, train_loss: f64, accuracy: f64) -> Self {
        Self { model: model.into(), epoch, train_loss, accuracy }
    }

    /// Returns true if this epoch beat the previous best accuracy
    pub fn is_improvement(&self, best_accuracy: f64) -> bool {
        self.accuracy > best_accuracy
    }
}

/// Logs epoch metrics to a CSV file for later analysis.
pub struct MetricsLogger {
    csv_path: PathBuf,
}

impl MetricsLogger {
    /// Create a new MetricsLogger.
    /// Writes the CSV header if the file doesn't exist yet.
    pub fn new(dir: impl AsRef<Path>) -> Result<Self> {
        let dir = dir.as_ref();
        fs::create_dir_all(dir)
            .with_context(|| format!("Cannot create metrics directory '{}'", dir.display()))?;

        let csv_path = dir.join("metrics.csv");

        if !csv_path.exists() {
            let mut f = fs::File::create(&csv_path)?;
            writeln!(f, "model,epoch,train_loss,accuracy")?;
            tracing::debug!("Created metrics CSV: '{}'", csv_path.display());
        }

        Ok(Self { csv_path })
    }

    /// Append one epoch's metrics as a new row in the CSV.
    pub fn log(&self, m: &EpochMetrics) -> Result<()> {
        let mut f = OpenOptions::new()
            .append(true)
            .open(&self.csv_path)
            .with_context(|| format!("Cannot open '{}'", self.csv_path.display()))?;

        writeln!(
            f,
            "{},{},{:.6},{:.6}",
            m.model,
            m.epoch,
            m.train_loss,
            m.accuracy,
        )?;

        tracing::debug!(
            "Logged {} epoch {} metrics: train_loss={:.4}, accuracy={:.4}",
            m.model,
            m.epoch,
            m.train_loss,
            m.accuracy,
        );

        Ok(())
    }

    /// Append every row of a training history
    pub fn log_all(&self, history: &[EpochMetrics]) -> Result<()> {
        history.iter().try_for_each(|m| self.log(m))
    }

    /// Return the path to the metrics CSV file
    pub fn csv_path(&self) -> &PathBuf {
        &self.csv_path
    }
}

// ============================================================
// Layer 1 — CLI Commands and Arguments
// ============================================================
// Defines the two subcommands: `train` and `evaluate`
// and all their configurable flags.
//
// Defaults reproduce the classic MNIST recipe: 5 epochs of SGD
// at lr 0.01 with momentum 0.5, batches of 64, seed 2.

use clap::{Args, Subcommand};

use crate::application::train_use_case::TrainConfig;
use crate::domain::split::EvalSplit;
use crate::ml::variants::ModelVariant;

/// The two top-level subcommands available to the user
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Train the selected classifiers on MNIST and save their weights
    Train(TrainArgs),

    /// Score a saved weight file on the evaluation split
    Evaluate(EvaluateArgs),
}

/// All arguments for the `train` command.
#[derive(Args, Debug)]
pub struct TrainArgs {
    /// Directory for weight files, config and metrics
    #[arg(long, default_value = "models/pre_trained_models")]
    pub output_dir: String,

    /// Prefix for weight file names
    #[arg(long, default_value = "mnist_digit")]
    pub run_name: String,

    /// Seed for parameter initialisation, shuffling and holdout splits
    #[arg(long, default_value_t = 2)]
    pub seed: u64,

    /// Number of full passes through the training data
    #[arg(long, default_value_t = 5)]
    pub epochs: usize,

    /// SGD step size
    #[arg(long, default_value_t = 0.01)]
    pub lr: f64,

    /// SGD momentum coefficient
    #[arg(long, default_value_t = 0.5)]
    pub momentum: f64,

    /// Number of samples per optimizer step
    #[arg(long, default_value_t = 64)]
    pub batch_size: usize,

    /// Width of the non-convolutional model's hidden layer
    #[arg(long, default_value_t = 128)]
    pub hidden_size: usize,

    /// Evaluate on a held-out part of the training split instead of
    /// the test split; the value is the fraction held out
    #[arg(long)]
    pub holdout: Option<f64>,

    /// Comma separated list of variants to train
    #[arg(long, value_delimiter = ',', default_value = "nonconv,conv")]
    pub models: Vec<ModelVariant>,
}

/// Convert CLI TrainArgs into the application-layer TrainConfig.
impl From<TrainArgs> for TrainConfig {
    fn from(a: TrainArgs) -> Self {
        TrainConfig {
            output_dir:    a.output_dir,
            run_name:      a.run_name,
            seed:          a.seed,
            epochs:        a.epochs,
            learning_rate: a.lr,
            momentum:      a.momentum,
            batch_size:    a.batch_size,
            hidden_size:   a.hidden_size,
            eval_split:    a.holdout.map_or(EvalSplit::TestSplit, EvalSplit::Holdout),
            models:        a.models,
        }
    }
}

/// All arguments for the `evaluate` command
#[derive(Args, Debug)]
pub struct EvaluateArgs {
    /// Which variant's weights to score
    #[arg(long)]
    pub model: ModelVariant,

    /// Directory the `train` command wrote to
    #[arg(long, default_value = "models/pre_trained_models")]
    pub output_dir: String,
}

// ============================================================
// Layer 1 — CLI / Presentation Layer
// ============================================================
// Parses command line arguments with clap and routes to the
// application layer. The only place that prints results.
//
// Two commands are supported:
//   1. `train`    — trains the selected variants, saves weights
//   2. `evaluate` — loads saved weights and reports accuracy

pub mod commands;

use anyhow::Result;
use clap::Parser;
use commands::{Commands, EvaluateArgs, TrainArgs};

use crate::data::mnist::MnistSource;

#[derive(Parser, Debug)]
#[command(
    name = "digit-classifier",
    version = "0.1.0",
    about = "Train non-convolutional and convolutional MNIST digit classifiers."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

impl Cli {
    pub fn run(self) -> Result<()> {
        match self.command {
            Commands::Train(args)    => run_train(args),
            Commands::Evaluate(args) => run_evaluate(args),
        }
    }
}

fn run_train(args: TrainArgs) -> Result<()> {
    use crate::application::train_use_case::TrainUseCase;

    let use_case = TrainUseCase::new(args.into(), MnistSource::new());
    let reports  = use_case.execute()?;

    for r in reports {
        println!(
            "{:<8} accuracy {:.4} → {}",
            r.variant.to_string(),
            r.final_accuracy,
            r.weights_path.display()
        );
    }
    Ok(())
}

fn run_evaluate(args: EvaluateArgs) -> Result<()> {
    use crate::application::evaluate_use_case::EvaluateUseCase;

    let use_case = EvaluateUseCase::new(args.output_dir, MnistSource::new());
    let accuracy = use_case.evaluate(args.model)?;

    println!("{} accuracy: {:.4}", args.model, accuracy);
    Ok(())
}

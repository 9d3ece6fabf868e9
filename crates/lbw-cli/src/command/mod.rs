use std::io;

use clap::{Parser, Subcommand};
use clap_verbosity_flag::{InfoLevel, Verbosity};
use tracing_subscriber::EnvFilter;

use self::{evaluate::EvaluateArg, predict::PredictArg, train::TrainArg};

mod evaluate;
mod predict;
mod train;

/// Crates whose log output follows the verbosity flag. Everything else logs
/// warnings only.
const LOG_TARGETS: &[&str] = &[
    "lbw",
    "lbw_data",
    "lbw_evaluation",
    "lbw_model",
    "lbw_training",
];

#[derive(Debug, Clone, Parser)]
#[command(author, version, about, long_about = None)]
pub struct CommandArgs {
    #[command(flatten)]
    verbose: Verbosity<InfoLevel>,

    /// What mode to run the program in
    #[command(subcommand)]
    mode: Mode,
}

#[derive(Debug, Clone, Subcommand)]
enum Mode {
    /// Train a model and write the scaler and checkpoints
    Train(#[clap(flatten)] TrainArg),
    /// Score a labeled dataset with a trained model
    Evaluate(#[clap(flatten)] EvaluateArg),
    /// Predict a single delivery from its 13 feature values
    Predict(#[clap(flatten)] PredictArg),
}

fn init_logging(verbose: &Verbosity<InfoLevel>) {
    let level = verbose.tracing_level_filter();
    let targets = LOG_TARGETS
        .iter()
        .map(|target| format!("{target}={level}"))
        .collect::<Vec<_>>()
        .join(",");
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(format!("warn,{targets}")))
        .with_writer(io::stderr)
        .init();
}

pub fn run() -> anyhow::Result<()> {
    let args = CommandArgs::parse();
    init_logging(&args.verbose);
    match args.mode {
        Mode::Train(arg) => train::run(&arg)?,
        Mode::Evaluate(arg) => evaluate::run(&arg)?,
        Mode::Predict(arg) => predict::run(&arg)?,
    }
    Ok(())
}

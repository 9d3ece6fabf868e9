use std::path::PathBuf;

use anyhow::Context;
use lbw_data::feature::FEATURE_COUNT;
use lbw_model::{
    checkpoint::{BEST_CHECKPOINT_FILE, FINAL_CHECKPOINT_FILE},
    network::Network,
    scaler::SCALER_FILE,
};
use lbw_training::{
    seed::TrainingSeed,
    summary::TrainingSummary,
    trainer::{self, ArtifactPaths, TrainingOutcome, TrainingParams},
};
use rand::Rng as _;

use crate::util::{self, Output};

#[derive(Debug, Clone, clap::Args)]
pub(crate) struct TrainArg {
    /// Labeled training data (CSV or JSON)
    #[arg(long, default_value = "LBWTrainingData.csv")]
    data: PathBuf,
    /// Scaler output path
    #[arg(long, default_value = SCALER_FILE)]
    scaler: PathBuf,
    /// Best checkpoint output path
    #[arg(long, default_value = BEST_CHECKPOINT_FILE)]
    best: PathBuf,
    /// Final checkpoint output path
    #[arg(long = "final", default_value = FINAL_CHECKPOINT_FILE)]
    final_checkpoint: PathBuf,
    /// Number of epochs
    #[arg(long, default_value_t = TrainingParams::default().epochs)]
    epochs: usize,
    /// Adam learning rate
    #[arg(long, default_value_t = TrainingParams::default().learning_rate)]
    learning_rate: f32,
    /// Samples per batch
    #[arg(long, default_value_t = TrainingParams::default().batch_size)]
    batch_size: usize,
    /// Fraction of samples used for training; the rest validates
    #[arg(long, default_value_t = TrainingParams::default().train_fraction)]
    train_fraction: f64,
    /// Epochs between progress log lines
    #[arg(long, default_value_t = TrainingParams::default().log_interval)]
    log_interval: usize,
    /// Seed as 32 hex digits; random if omitted
    #[arg(long)]
    seed: Option<TrainingSeed>,
    /// Write the training summary (history curves, importance) as JSON
    #[arg(long)]
    summary: Option<PathBuf>,
}

pub(crate) fn run(arg: &TrainArg) -> anyhow::Result<()> {
    let TrainArg {
        data,
        scaler,
        best,
        final_checkpoint,
        epochs,
        learning_rate,
        batch_size,
        train_fraction,
        log_interval,
        seed,
        summary,
    } = arg;

    util::print_heading("LBW HIT PREDICTOR - TRAINING");
    let dataset = util::load_dataset("training", data)?;

    let params = TrainingParams {
        epochs: *epochs,
        learning_rate: *learning_rate,
        batch_size: *batch_size,
        train_fraction: *train_fraction,
        log_interval: *log_interval,
    };
    let seed = seed.unwrap_or_else(|| rand::rng().random());
    tracing::info!(%seed, "training seed");

    let mut artifacts = ArtifactPaths {
        scaler: scaler.clone(),
        best: best.clone(),
        final_checkpoint: final_checkpoint.clone(),
    };

    util::print_heading("TRAINING");
    println!("Epochs: {epochs}");
    println!("Learning rate: {learning_rate}");
    println!("Batch size: {batch_size}");
    println!("Train fraction: {train_fraction}");
    println!("Seed: {seed}");
    let outcome =
        trainer::train(&dataset, &params, seed, &mut artifacts).context("Training failed")?;

    print_model_summary(&outcome.network);
    print_results(&outcome);

    util::print_heading("FEATURE IMPORTANCE");
    for (rank, item) in outcome.feature_importance().iter().enumerate() {
        println!(
            "{:2}. {:<18} {:.4}",
            rank + 1,
            item.feature.name(),
            item.importance
        );
    }

    if let Some(path) = summary {
        let record = TrainingSummary::new(&outcome, dataset.class_balance());
        Output::save_json(&record, Some(path.clone()))?;
    }

    println!();
    println!("Artifacts saved:");
    println!("  Scaler: {}", artifacts.scaler.display());
    println!("  Best model: {}", artifacts.best.display());
    println!("  Final model: {}", artifacts.final_checkpoint.display());
    if let Some(path) = summary {
        println!("  Summary: {}", path.display());
    }

    Ok(())
}

fn print_model_summary(network: &Network) {
    util::print_heading("MODEL ARCHITECTURE");
    println!("Input features: {FEATURE_COUNT}");
    let dropout = network.dropout();
    for (i, layer) in network.layers().iter().enumerate() {
        let activation = match dropout.get(i) {
            Some(&rate) if rate > 0.0 => format!("ReLU, Dropout({rate})"),
            Some(_) => "ReLU".to_owned(),
            None => "Sigmoid".to_owned(),
        };
        println!(
            "  Linear {:>3} -> {:<3} {activation}",
            layer.in_features(),
            layer.out_features()
        );
    }
    println!("Total trainable parameters: {}", network.parameter_count());
}

fn print_results(outcome: &TrainingOutcome) {
    util::print_heading("TRAINING RESULTS");
    println!("Training samples: {}", outcome.train_samples);
    println!("Validation samples: {}", outcome.validation_samples);
    if let Some(last) = outcome.history.last() {
        println!("Final epoch: {}", last.epoch);
        println!(
            "  Train Loss: {:.4}, Train Acc: {:.2}%",
            last.train_loss,
            last.train_accuracy * 100.0
        );
        println!(
            "  Val Loss: {:.4}, Val Acc: {:.2}%",
            last.validation_loss,
            last.validation_accuracy * 100.0
        );
    }
    println!(
        "Best epoch: {} (validation loss {:.4})",
        outcome.best_epoch, outcome.best_validation_loss
    );
    for warning in &outcome.degenerate_features {
        println!("Note: {warning}");
    }
}

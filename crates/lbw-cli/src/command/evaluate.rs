use std::path::PathBuf;

use anyhow::Context;
use lbw_evaluation::{
    charts::EvaluationCharts,
    report::{EvaluationReport, SweepReport},
    scoring::{self, PredictionRecord},
    threshold::{ThresholdSweep, default_thresholds},
};
use lbw_model::{
    checkpoint::{BEST_CHECKPOINT_FILE, Checkpoint},
    scaler::{SCALER_FILE, Scaler},
};

use crate::util::{self, Output};

#[derive(Debug, Clone, clap::Args)]
pub(crate) struct EvaluateArg {
    /// Labeled test data (CSV or JSON)
    #[arg(long, default_value = "LBWTestData.csv")]
    data: PathBuf,
    /// Model checkpoint (best or final)
    #[arg(long, default_value = BEST_CHECKPOINT_FILE)]
    model: PathBuf,
    /// Scaler saved by the training run that produced the model
    #[arg(long, default_value = SCALER_FILE)]
    scaler: PathBuf,
    /// Decision threshold; a hit is predicted when the probability reaches it
    #[arg(long, default_value_t = 0.5)]
    threshold: f32,
    /// Skip the threshold sensitivity search
    #[arg(long)]
    no_sweep: bool,
    /// Write chart input arrays as JSON
    #[arg(long)]
    charts: Option<PathBuf>,
}

pub(crate) fn run(arg: &EvaluateArg) -> anyhow::Result<()> {
    let EvaluateArg {
        data,
        model,
        scaler,
        threshold,
        no_sweep,
        charts,
    } = arg;

    util::print_heading("LBW HIT PREDICTOR - EVALUATION");
    let checkpoint = Checkpoint::load(model)
        .with_context(|| format!("Failed to load model: {}", model.display()))?;
    let scaler = Scaler::load(scaler)
        .with_context(|| format!("Failed to load scaler: {}", scaler.display()))?;
    println!(
        "Model: {} ({} checkpoint, epoch {})",
        model.display(),
        checkpoint.kind,
        checkpoint.epoch
    );
    if let Some(loss) = checkpoint.validation_loss {
        println!("  Validation loss at save: {loss:.4}");
    }
    println!("  Trained at: {}", checkpoint.trained_at);
    println!();

    let dataset = util::load_dataset("test", data)?;
    let records = scoring::score_dataset(&checkpoint.network, &scaler, &dataset, *threshold);
    print_report(&records, *threshold);

    let sweep = if *no_sweep {
        None
    } else {
        ThresholdSweep::run(&records, &default_thresholds())
    };
    let (records, threshold) = match &sweep {
        Some(sweep) => {
            util::print_heading("THRESHOLD ANALYSIS");
            println!("{}", SweepReport(sweep));

            let best = sweep.best().threshold;
            #[expect(clippy::float_cmp)]
            let unchanged = best == *threshold;
            if unchanged {
                (records, *threshold)
            } else {
                let rescored = scoring::rethreshold(&records, best);
                print_report(&rescored, best);
                (rescored, best)
            }
        }
        None => (records, *threshold),
    };

    if let Some(path) = charts {
        let chart_data = EvaluationCharts::new(&records, threshold, sweep.as_ref());
        Output::save_json(&chart_data, Some(path.clone()))?;
        println!();
        println!("Chart data saved: {}", path.display());
    }

    Ok(())
}

fn print_report(records: &[PredictionRecord], threshold: f32) {
    util::print_heading(&format!("EVALUATION RESULTS (threshold {threshold})"));
    print!("{}", EvaluationReport::new(records, threshold));
}

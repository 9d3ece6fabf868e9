use std::path::PathBuf;

use anyhow::Context;
use lbw_data::feature::{FEATURE_COUNT, FeatureVector, feature_names};
use lbw_model::{
    checkpoint::{BEST_CHECKPOINT_FILE, Checkpoint},
    predictor::Predictor,
    scaler::{SCALER_FILE, Scaler},
};

use crate::util::Output;

#[derive(Debug, Clone, clap::Args)]
pub(crate) struct PredictArg {
    /// Model checkpoint (best or final)
    #[arg(long, default_value = BEST_CHECKPOINT_FILE)]
    model: PathBuf,
    /// Scaler saved by the training run that produced the model
    #[arg(long, default_value = SCALER_FILE)]
    scaler: PathBuf,
    /// Decision threshold; a hit is predicted when the probability reaches it
    #[arg(long, default_value_t = 0.5)]
    threshold: f32,
    /// Output file path
    #[arg(long)]
    output: Option<PathBuf>,
    /// Raw feature values in column order: spinType speed spinAmount
    /// timeSinceRelease ballPosX ballPosY ballVelX ballVelY ballAngularVel
    /// distanceToStumps distanceToPad hitPad reachedPad
    #[arg(
        required = true,
        num_args = FEATURE_COUNT,
        allow_negative_numbers = true,
        value_name = "FEATURE"
    )]
    features: Vec<f32>,
}

pub(crate) fn run(arg: &PredictArg) -> anyhow::Result<()> {
    let PredictArg {
        model,
        scaler,
        threshold,
        output,
        features,
    } = arg;

    let features: FeatureVector = features.as_slice().try_into().with_context(|| {
        format!(
            "Expected {FEATURE_COUNT} feature values ({}), got {}",
            feature_names().join(", "),
            features.len()
        )
    })?;

    let checkpoint = Checkpoint::load(model)
        .with_context(|| format!("Failed to load model: {}", model.display()))?;
    let scaler = Scaler::load(scaler)
        .with_context(|| format!("Failed to load scaler: {}", scaler.display()))?;
    tracing::debug!(
        kind = %checkpoint.kind,
        epoch = checkpoint.epoch,
        "loaded checkpoint"
    );

    let predictor = Predictor::new(checkpoint.network, scaler, *threshold);
    let decision = predictor
        .predict(&features)
        .context("Failed to predict sample")?;
    tracing::info!(
        probability = decision.probability,
        threshold = predictor.threshold(),
        "prediction"
    );
    Output::save_json(&decision, output.clone())?;

    Ok(())
}

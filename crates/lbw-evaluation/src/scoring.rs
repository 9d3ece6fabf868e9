//! Scoring a dataset with a trained network.

use lbw_data::sample::{Dataset, Sample};
use lbw_model::{network::Network, scaler::Scaler};

/// Samples scored per inference call.
const SCORING_BATCH_SIZE: usize = 32;

/// One scored sample.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PredictionRecord {
    /// Raw (unscaled) input sample, including its true label.
    pub sample: Sample,
    pub probability: f32,
    pub predicted: bool,
}

impl PredictionRecord {
    #[must_use]
    pub fn actual(&self) -> bool {
        self.sample.will_hit_stumps
    }

    #[must_use]
    pub fn is_correct(&self) -> bool {
        self.predicted == self.actual()
    }
}

/// Scores every sample of `dataset` in input order.
///
/// Features are standardized with `scaler` (never refitted), the network runs
/// with dropout disabled, and a sample is predicted to hit when its probability
/// is at least `threshold`.
#[must_use]
pub fn score_dataset(
    network: &Network,
    scaler: &Scaler,
    dataset: &Dataset,
    threshold: f32,
) -> Vec<PredictionRecord> {
    let mut records = Vec::with_capacity(dataset.len());
    for chunk in dataset.samples().chunks(SCORING_BATCH_SIZE) {
        let scaled = chunk
            .iter()
            .map(|s| scaler.transform(&s.features))
            .collect::<Vec<_>>();
        let probabilities = network.infer(&scaled);
        records.extend(
            chunk
                .iter()
                .zip(probabilities)
                .map(|(&sample, probability)| PredictionRecord {
                    sample,
                    probability,
                    predicted: probability >= threshold,
                }),
        );
    }
    tracing::debug!(samples = records.len(), threshold, "scored dataset");
    records
}

/// Re-applies a different threshold to already scored records.
#[must_use]
pub fn rethreshold(records: &[PredictionRecord], threshold: f32) -> Vec<PredictionRecord> {
    records
        .iter()
        .map(|r| PredictionRecord {
            predicted: r.probability >= threshold,
            ..*r
        })
        .collect()
}

//! Accuracy grouped by predicted probability.

use serde::Serialize;

use crate::scoring::PredictionRecord;

/// Number of equal-width probability buckets.
pub const CONFIDENCE_BUCKET_COUNT: usize = 10;

/// Records whose probability falls in `[low, high)`.
///
/// The last bucket also includes `1.0`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ConfidenceBucket {
    pub low: f32,
    pub high: f32,
    pub count: usize,
    /// Share of correct predictions, or `None` for an empty bucket.
    pub accuracy: Option<f32>,
}

impl ConfidenceBucket {
    #[must_use]
    pub fn center(&self) -> f32 {
        f32::midpoint(self.low, self.high)
    }
}

/// Splits `[0, 1]` into [`CONFIDENCE_BUCKET_COUNT`] buckets and measures
/// accuracy in each.
#[expect(
    clippy::cast_precision_loss,
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss
)]
#[must_use]
pub fn accuracy_by_confidence(records: &[PredictionRecord]) -> Vec<ConfidenceBucket> {
    let n = CONFIDENCE_BUCKET_COUNT;
    let mut counts = vec![(0usize, 0usize); n];
    for record in records {
        let p = record.probability;
        if !(0.0..=1.0).contains(&p) {
            continue;
        }
        let index = ((p * n as f32) as usize).min(n - 1);
        counts[index].0 += 1;
        if record.is_correct() {
            counts[index].1 += 1;
        }
    }

    counts
        .into_iter()
        .enumerate()
        .map(|(i, (count, correct))| ConfidenceBucket {
            low: i as f32 / n as f32,
            high: (i + 1) as f32 / n as f32,
            count,
            accuracy: (count > 0).then(|| correct as f32 / count as f32),
        })
        .collect()
}

//! Decision threshold sensitivity search.
//!
//! The sweep scores the same probabilities at each candidate threshold and
//! recommends the one with the highest accuracy. The recommendation is not
//! applied automatically; callers re-score with it to obtain the final
//! operating point.

use serde::Serialize;

use crate::{metrics::ConfusionMatrix, scoring::PredictionRecord};

/// Number of candidate thresholds in [`default_thresholds`].
pub const DEFAULT_THRESHOLD_COUNT: usize = 18;

/// Thresholds `0.10, 0.15, …, 0.95`.
#[expect(clippy::cast_precision_loss)]
#[must_use]
pub fn default_thresholds() -> Vec<f32> {
    (0..DEFAULT_THRESHOLD_COUNT)
        .map(|i| (10 + 5 * i) as f32 / 100.0)
        .collect()
}

/// Metrics at one candidate threshold.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ThresholdPoint {
    pub threshold: f32,
    pub accuracy: f32,
    pub recall: Option<f32>,
    pub precision: Option<f32>,
    pub confusion: ConfusionMatrix,
}

/// Metrics at every candidate threshold, in sweep order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ThresholdSweep {
    pub points: Vec<ThresholdPoint>,
    /// Index into `points` of the recommended threshold.
    pub best_index: usize,
}

impl ThresholdSweep {
    /// Evaluates `records` at each threshold, classifying with
    /// `probability >= threshold`.
    ///
    /// The recommendation is the first threshold reaching the maximum accuracy.
    /// Returns `None` if `records` or `thresholds` is empty.
    #[must_use]
    pub fn run(records: &[PredictionRecord], thresholds: &[f32]) -> Option<Self> {
        if records.is_empty() {
            return None;
        }
        let points = thresholds
            .iter()
            .map(|&threshold| {
                let confusion = ConfusionMatrix::at_threshold(records, threshold);
                ThresholdPoint {
                    threshold,
                    accuracy: confusion.accuracy().unwrap_or(0.0),
                    recall: confusion.recall(),
                    precision: confusion.precision(),
                    confusion,
                }
            })
            .collect::<Vec<_>>();

        let mut best_index = None;
        for (i, point) in points.iter().enumerate() {
            if best_index.is_none_or(|b: usize| point.accuracy > points[b].accuracy) {
                best_index = Some(i);
            }
        }

        Some(Self {
            best_index: best_index?,
            points,
        })
    }

    #[must_use]
    pub fn best(&self) -> &ThresholdPoint {
        &self.points[self.best_index]
    }
}

#[cfg(test)]
mod tests {
    use lbw_data::sample::Sample;
    use proptest::prelude::*;

    use super::*;

    fn records(probabilities: &[f32], labels: &[bool]) -> Vec<PredictionRecord> {
        probabilities
            .iter()
            .zip(labels)
            .map(|(&probability, &label)| PredictionRecord {
                sample: Sample::new([0.0; 13], label),
                probability,
                predicted: probability >= 0.5,
            })
            .collect()
    }

    #[test]
    fn test_default_thresholds() {
        let thresholds = default_thresholds();
        assert_eq!(thresholds.len(), 18);
        assert_eq!(thresholds[0], 0.1);
        assert_eq!(thresholds[8], 0.5);
        assert_eq!(thresholds[17], 0.95);
    }

    #[test]
    fn test_boundary_is_inclusive() {
        let records = records(&[0.2, 0.4, 0.6, 0.8], &[false, false, true, true]);
        let sweep = ThresholdSweep::run(&records, &[0.3, 0.5, 0.7]).unwrap();
        let accuracies = sweep.points.iter().map(|p| p.accuracy).collect::<Vec<_>>();
        // 0.4 is a false positive at 0.3 and 0.6 a false negative at 0.7
        assert_eq!(accuracies, [0.75, 1.0, 0.75]);
        assert_eq!(sweep.points[0].confusion.false_positive, 1);
        assert_eq!(sweep.points[2].confusion.false_negative, 1);
        assert_eq!(sweep.best().threshold, 0.5);

        // A probability equal to the threshold counts as a hit
        let sweep = ThresholdSweep::run(&records, &[0.6]).unwrap();
        assert_eq!(sweep.best().confusion.true_positive, 2);
    }

    #[test]
    fn test_first_maximum_wins() {
        let records = records(&[0.1, 0.45, 0.55, 0.9], &[false, false, true, true]);
        let sweep = ThresholdSweep::run(&records, &default_thresholds()).unwrap();
        // 0.50 and 0.55 both separate perfectly; the lower one is kept
        assert_eq!(sweep.best().accuracy, 1.0);
        assert_eq!(sweep.best().threshold, 0.5);
        assert_eq!(sweep.best_index, 8);
    }

    #[test]
    fn test_undefined_metrics() {
        let records = records(&[0.2, 0.3], &[false, false]);
        let sweep = ThresholdSweep::run(&records, &[0.1, 0.9]).unwrap();
        assert_eq!(sweep.points[0].recall, None);
        assert_eq!(sweep.points[0].precision, Some(0.0));
        assert_eq!(sweep.points[1].precision, None);
        assert_eq!(sweep.best().threshold, 0.9);

        let json = serde_json::to_value(&sweep).unwrap();
        assert!(json["points"][1]["precision"].is_null());
    }

    #[test]
    fn test_empty_inputs() {
        assert!(ThresholdSweep::run(&[], &[0.5]).is_none());
        let records = records(&[0.5], &[true]);
        assert!(ThresholdSweep::run(&records, &[]).is_none());
    }

    proptest! {
        #[test]
        fn test_raising_threshold_is_monotonic(
            scored in prop::collection::vec((0.0f32..=1.0, any::<bool>()), 1..100),
            a in 0.0f32..=1.0,
            b in 0.0f32..=1.0,
        ) {
            let (low, high) = if a <= b { (a, b) } else { (b, a) };
            let (probabilities, labels): (Vec<_>, Vec<_>) = scored.into_iter().unzip();
            let records = records(&probabilities, &labels);

            let at_low = ConfusionMatrix::at_threshold(&records, low);
            let at_high = ConfusionMatrix::at_threshold(&records, high);
            prop_assert!(at_high.true_positive <= at_low.true_positive);
            prop_assert!(at_high.true_negative >= at_low.true_negative);
        }
    }
}

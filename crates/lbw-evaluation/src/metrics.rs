//! Confusion counts and derived classification metrics.
//!
//! The positive class is "hit stumps". Metrics whose denominator is zero are
//! undefined and returned as `None`, except in [`ClassificationReport`], which
//! reports them as `0.0` the way conventional classification reports do.

use serde::Serialize;

use crate::scoring::PredictionRecord;

/// Display names of the two classes, negative first.
pub const CLASS_NAMES: [&str; 2] = ["Miss Stumps", "Hit Stumps"];

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ConfusionMatrix {
    pub true_negative: usize,
    pub false_positive: usize,
    pub false_negative: usize,
    pub true_positive: usize,
}

impl ConfusionMatrix {
    /// Counts `(predicted, actual)` pairs.
    pub fn from_pairs<I>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (bool, bool)>,
    {
        let mut matrix = Self::default();
        for (predicted, actual) in pairs {
            match (predicted, actual) {
                (false, false) => matrix.true_negative += 1,
                (true, false) => matrix.false_positive += 1,
                (false, true) => matrix.false_negative += 1,
                (true, true) => matrix.true_positive += 1,
            }
        }
        matrix
    }

    #[must_use]
    pub fn from_records(records: &[PredictionRecord]) -> Self {
        Self::from_pairs(records.iter().map(|r| (r.predicted, r.actual())))
    }

    /// Counts for `records` classified at `threshold` (`probability >= threshold`).
    #[must_use]
    pub fn at_threshold(records: &[PredictionRecord], threshold: f32) -> Self {
        Self::from_pairs(
            records
                .iter()
                .map(|r| (r.probability >= threshold, r.actual())),
        )
    }

    #[must_use]
    pub fn total(&self) -> usize {
        self.true_negative + self.false_positive + self.false_negative + self.true_positive
    }

    #[must_use]
    pub fn correct(&self) -> usize {
        self.true_negative + self.true_positive
    }

    /// Rows are actual classes, columns predicted classes, negative first.
    #[must_use]
    pub fn as_table(&self) -> [[usize; 2]; 2] {
        [
            [self.true_negative, self.false_positive],
            [self.false_negative, self.true_positive],
        ]
    }

    /// `(TP + TN) / total`, or `None` without samples.
    #[must_use]
    pub fn accuracy(&self) -> Option<f32> {
        ratio(self.correct(), self.total())
    }

    /// `TP / (TP + FN)`: share of actual hits that were caught.
    #[must_use]
    pub fn recall(&self) -> Option<f32> {
        ratio(
            self.true_positive,
            self.true_positive + self.false_negative,
        )
    }

    /// `TP / (TP + FP)`: share of predicted hits that were right.
    #[must_use]
    pub fn precision(&self) -> Option<f32> {
        ratio(
            self.true_positive,
            self.true_positive + self.false_positive,
        )
    }
}

#[expect(clippy::cast_precision_loss)]
fn ratio(numerator: usize, denominator: usize) -> Option<f32> {
    (denominator > 0).then(|| numerator as f32 / denominator as f32)
}

/// Precision, recall and F1 for one class.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ClassMetrics {
    pub precision: f32,
    pub recall: f32,
    pub f1: f32,
    pub support: usize,
}

impl ClassMetrics {
    fn new(true_pos: usize, false_pos: usize, false_neg: usize) -> Self {
        let precision = ratio(true_pos, true_pos + false_pos).unwrap_or(0.0);
        let recall = ratio(true_pos, true_pos + false_neg).unwrap_or(0.0);
        let f1 = if precision + recall > 0.0 {
            2.0 * precision * recall / (precision + recall)
        } else {
            0.0
        };
        Self {
            precision,
            recall,
            f1,
            support: true_pos + false_neg,
        }
    }
}

/// Per-class metrics plus macro and support-weighted averages.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ClassificationReport {
    /// Negative ("Miss Stumps") then positive ("Hit Stumps").
    pub classes: [ClassMetrics; 2],
    pub accuracy: f32,
    pub macro_avg: ClassMetrics,
    pub weighted_avg: ClassMetrics,
}

impl ClassificationReport {
    #[expect(clippy::cast_precision_loss)]
    #[must_use]
    pub fn new(matrix: &ConfusionMatrix) -> Self {
        let negative = ClassMetrics::new(
            matrix.true_negative,
            matrix.false_negative,
            matrix.false_positive,
        );
        let positive = ClassMetrics::new(
            matrix.true_positive,
            matrix.false_positive,
            matrix.false_negative,
        );
        let classes = [negative, positive];
        let total = matrix.total();

        let average = |weight: &dyn Fn(&ClassMetrics) -> f32| {
            let field = |f: fn(&ClassMetrics) -> f32| {
                classes.iter().map(|c| f(c) * weight(c)).sum::<f32>()
            };
            ClassMetrics {
                precision: field(|c| c.precision),
                recall: field(|c| c.recall),
                f1: field(|c| c.f1),
                support: total,
            }
        };
        let macro_avg = average(&|_| 0.5);
        let weighted_avg = average(&|c| {
            if total == 0 {
                0.0
            } else {
                c.support as f32 / total as f32
            }
        });

        Self {
            classes,
            accuracy: matrix.accuracy().unwrap_or(0.0),
            macro_avg,
            weighted_avg,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn matrix() -> ConfusionMatrix {
        // 5 TN, 1 FP, 2 FN, 4 TP
        ConfusionMatrix {
            true_negative: 5,
            false_positive: 1,
            false_negative: 2,
            true_positive: 4,
        }
    }

    #[test]
    fn test_from_pairs() {
        let pairs = [(false, false), (true, false), (false, true), (true, true), (true, true)];
        let matrix = ConfusionMatrix::from_pairs(pairs);
        assert_eq!(
            matrix,
            ConfusionMatrix {
                true_negative: 1,
                false_positive: 1,
                false_negative: 1,
                true_positive: 2,
            }
        );
        assert_eq!(matrix.as_table(), [[1, 1], [1, 2]]);
    }

    #[test]
    fn test_rates() {
        let matrix = matrix();
        assert_eq!(matrix.total(), 12);
        assert_eq!(matrix.accuracy(), Some(0.75));
        assert!((matrix.recall().unwrap() - 4.0 / 6.0).abs() < 1e-6);
        assert_eq!(matrix.precision(), Some(0.8));
    }

    #[test]
    fn test_undefined_rates() {
        let empty = ConfusionMatrix::default();
        assert_eq!(empty.accuracy(), None);
        assert_eq!(empty.recall(), None);
        assert_eq!(empty.precision(), None);

        // No actual hits and no predicted hits
        let negatives = ConfusionMatrix::from_pairs([(false, false); 3]);
        assert_eq!(negatives.accuracy(), Some(1.0));
        assert_eq!(negatives.recall(), None);
        assert_eq!(negatives.precision(), None);
    }

    #[test]
    fn test_classification_report() {
        let report = ClassificationReport::new(&matrix());
        let [miss, hit] = report.classes;

        // Miss: precision 5/7, recall 5/6
        assert!((miss.precision - 5.0 / 7.0).abs() < 1e-6);
        assert!((miss.recall - 5.0 / 6.0).abs() < 1e-6);
        assert_eq!(miss.support, 6);
        // Hit: precision 4/5, recall 4/6
        assert!((hit.precision - 0.8).abs() < 1e-6);
        assert!((hit.recall - 4.0 / 6.0).abs() < 1e-6);
        let expected_f1 = 2.0 * 0.8 * (4.0 / 6.0) / (0.8 + 4.0 / 6.0);
        assert!((hit.f1 - expected_f1).abs() < 1e-6);

        assert_eq!(report.accuracy, 0.75);
        assert!((report.macro_avg.precision - (5.0 / 7.0 + 0.8) / 2.0).abs() < 1e-6);
        // Equal supports make weighted and macro averages coincide
        assert!((report.weighted_avg.recall - report.macro_avg.recall).abs() < 1e-6);
        assert_eq!(report.weighted_avg.support, 12);
    }

    #[test]
    fn test_report_with_single_class() {
        let report = ClassificationReport::new(&ConfusionMatrix::from_pairs([(false, false); 4]));
        let [miss, hit] = report.classes;
        assert_eq!(miss.f1, 1.0);
        assert_eq!(hit.support, 0);
        assert_eq!(hit.precision, 0.0);
        assert_eq!(report.weighted_avg.f1, 1.0);
    }
}

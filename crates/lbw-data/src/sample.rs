//! Labelled samples and datasets.

use std::fmt;

use lbw_stats::descriptive::DescriptiveStats;

use crate::feature::{FeatureId, FeatureVector};

/// Positive-rate bounds outside which a dataset is considered imbalanced.
pub const BALANCED_POSITIVE_RATE: (f32, f32) = (0.10, 0.90);

/// A single labelled observation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Sample {
    /// Features in [`FeatureId::ALL`] order.
    pub features: FeatureVector,
    /// `true` if the ball went on to hit the stumps.
    pub will_hit_stumps: bool,
}

impl Sample {
    #[must_use]
    pub fn new(features: FeatureVector, will_hit_stumps: bool) -> Self {
        Self {
            features,
            will_hit_stumps,
        }
    }

    /// Returns the value of a single feature.
    #[must_use]
    pub fn feature(&self, id: FeatureId) -> f32 {
        self.features[id.index()]
    }

    /// The label as the `0.0` / `1.0` target used by the loss function.
    #[must_use]
    pub fn target(&self) -> f32 {
        if self.will_hit_stumps { 1.0 } else { 0.0 }
    }
}

/// An ordered collection of samples.
///
/// The order is the input order; evaluation reports refer to samples by their
/// position in the dataset.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Dataset {
    samples: Vec<Sample>,
}

impl Dataset {
    #[must_use]
    pub fn new(samples: Vec<Sample>) -> Self {
        Self { samples }
    }

    #[must_use]
    pub fn samples(&self) -> &[Sample] {
        &self.samples
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.samples.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Returns the samples at the given positions, in the given order.
    ///
    /// # Panics
    ///
    /// Panics if an index is out of bounds.
    #[must_use]
    pub fn select(&self, indices: &[usize]) -> Self {
        Self {
            samples: indices.iter().map(|&i| self.samples[i]).collect(),
        }
    }

    /// Returns a dataset with the features of every sample mapped by `f`.
    ///
    /// Labels and order are preserved.
    #[must_use]
    pub fn map_features<F>(&self, mut f: F) -> Self
    where
        F: FnMut(&FeatureVector) -> FeatureVector,
    {
        Self {
            samples: self
                .samples
                .iter()
                .map(|s| Sample::new(f(&s.features), s.will_hit_stumps))
                .collect(),
        }
    }

    /// Computes per-feature descriptive statistics, in [`FeatureId::ALL`] order.
    ///
    /// Returns `None` for an empty dataset.
    #[must_use]
    pub fn feature_stats(&self) -> Option<Vec<(FeatureId, DescriptiveStats)>> {
        FeatureId::ALL
            .into_iter()
            .map(|id| {
                let stats = DescriptiveStats::new(self.samples.iter().map(|s| s.feature(id)))?;
                Some((id, stats))
            })
            .collect()
    }

    /// Counts positive and negative labels.
    #[must_use]
    pub fn class_balance(&self) -> ClassBalance {
        let positives = self.samples.iter().filter(|s| s.will_hit_stumps).count();
        ClassBalance {
            positives,
            negatives: self.samples.len() - positives,
        }
    }

    /// Counts samples by whether the ball touched the pad.
    #[must_use]
    pub fn pad_contact(&self) -> PadContact {
        let hit_pad = self
            .samples
            .iter()
            .filter(|s| s.feature(FeatureId::HitPad) >= 0.5)
            .count();
        PadContact {
            hit_pad,
            missed_pad: self.samples.len() - hit_pad,
        }
    }

    /// Returns an advisory if the positive rate is outside
    /// [`BALANCED_POSITIVE_RATE`].
    #[must_use]
    pub fn class_imbalance(&self) -> Option<ClassImbalanceWarning> {
        let positive_rate = self.class_balance().positive_rate()?;
        let (low, high) = BALANCED_POSITIVE_RATE;
        (positive_rate < low || positive_rate > high)
            .then_some(ClassImbalanceWarning { positive_rate })
    }
}

impl FromIterator<Sample> for Dataset {
    fn from_iter<T: IntoIterator<Item = Sample>>(iter: T) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

/// Label counts of a dataset.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClassBalance {
    pub positives: usize,
    pub negatives: usize,
}

impl ClassBalance {
    #[must_use]
    pub fn total(&self) -> usize {
        self.positives + self.negatives
    }

    /// Fraction of positive labels, or `None` for an empty dataset.
    #[expect(clippy::cast_precision_loss)]
    #[must_use]
    pub fn positive_rate(&self) -> Option<f32> {
        let total = self.total();
        (total > 0).then(|| self.positives as f32 / total as f32)
    }
}

/// Pad contact counts of a dataset.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PadContact {
    pub hit_pad: usize,
    pub missed_pad: usize,
}

/// Advisory raised when one class dominates the dataset.
///
/// Training proceeds unchanged; the warning only suggests collecting more
/// balanced data.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ClassImbalanceWarning {
    pub positive_rate: f32,
}

impl fmt::Display for ClassImbalanceWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "severe class imbalance: {:.1}% of samples hit the stumps; consider collecting more balanced data",
            self.positive_rate * 100.0
        )
    }
}

//! Machine-readable record of a training run.

use lbw_data::{feature::FeatureId, sample::ClassBalance};
use lbw_model::importance::FeatureImportance;
use serde::Serialize;

use crate::{
    seed::TrainingSeed,
    trainer::{EpochRecord, TrainingOutcome, TrainingParams},
};

/// Run metadata, history curves and feature importance.
///
/// Written as JSON next to the checkpoints so that loss/accuracy curves can be
/// plotted without re-running training.
#[derive(Debug, Clone, Serialize)]
pub struct TrainingSummary {
    pub seed: TrainingSeed,
    pub params: TrainingParams,
    pub samples: usize,
    pub positives: usize,
    pub negatives: usize,
    pub train_samples: usize,
    pub validation_samples: usize,
    pub parameter_count: usize,
    pub degenerate_features: Vec<FeatureId>,
    pub best_epoch: usize,
    pub best_validation_loss: f32,
    pub history: HistoryCurves,
    pub feature_importance: Vec<FeatureImportance>,
}

/// Per-epoch metrics as parallel arrays, one entry per epoch.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct HistoryCurves {
    pub epoch: Vec<usize>,
    pub train_loss: Vec<f32>,
    pub validation_loss: Vec<f32>,
    pub train_accuracy: Vec<f32>,
    pub validation_accuracy: Vec<f32>,
}

impl FromIterator<EpochRecord> for HistoryCurves {
    fn from_iter<T: IntoIterator<Item = EpochRecord>>(iter: T) -> Self {
        let mut curves = Self::default();
        for record in iter {
            curves.epoch.push(record.epoch);
            curves.train_loss.push(record.train_loss);
            curves.validation_loss.push(record.validation_loss);
            curves.train_accuracy.push(record.train_accuracy);
            curves.validation_accuracy.push(record.validation_accuracy);
        }
        curves
    }
}

impl TrainingSummary {
    #[must_use]
    pub fn new(outcome: &TrainingOutcome, balance: ClassBalance) -> Self {
        Self {
            seed: outcome.seed,
            params: outcome.params,
            samples: balance.total(),
            positives: balance.positives,
            negatives: balance.negatives,
            train_samples: outcome.train_samples,
            validation_samples: outcome.validation_samples,
            parameter_count: outcome.network.parameter_count(),
            degenerate_features: outcome
                .degenerate_features
                .iter()
                .map(|w| w.feature)
                .collect(),
            best_epoch: outcome.best_epoch,
            best_validation_loss: outcome.best_validation_loss,
            history: outcome.history.iter().copied().collect(),
            feature_importance: outcome.feature_importance(),
        }
    }
}

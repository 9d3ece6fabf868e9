//! Single-sample prediction from loaded artifacts.

use lbw_data::feature::{FeatureId, FeatureVector};
use serde::Serialize;

use crate::{network::Network, scaler::Scaler};

/// A raw or standardized feature that is not a finite number.
#[derive(Debug, derive_more::Display, derive_more::Error)]
pub enum PredictError {
    #[display("{stage} feature '{feature}' is not finite ({value})")]
    NonFiniteFeature {
        feature: FeatureId,
        stage: &'static str,
        value: f32,
    },
}

/// Outcome for one delivery.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Decision {
    pub will_hit_stumps: bool,
    pub probability: f32,
}

/// A trained network paired with the scaler it was trained behind.
#[derive(Debug, Clone)]
pub struct Predictor {
    network: Network,
    scaler: Scaler,
    threshold: f32,
}

impl Predictor {
    #[must_use]
    pub fn new(network: Network, scaler: Scaler, threshold: f32) -> Self {
        Self {
            network,
            scaler,
            threshold,
        }
    }

    #[must_use]
    pub fn threshold(&self) -> f32 {
        self.threshold
    }

    /// Hit probability for raw (unscaled) features.
    pub fn probability(&self, features: &FeatureVector) -> Result<f32, PredictError> {
        check_finite(features, "raw")?;
        let scaled = self.scaler.transform(features);
        check_finite(&scaled, "normalized")?;
        Ok(self.network.infer(&[scaled])[0])
    }

    /// Classifies raw features; a hit is predicted when the probability
    /// reaches the threshold.
    pub fn predict(&self, features: &FeatureVector) -> Result<Decision, PredictError> {
        let probability = self.probability(features)?;
        Ok(Decision {
            will_hit_stumps: probability >= self.threshold,
            probability,
        })
    }
}

fn check_finite(features: &FeatureVector, stage: &'static str) -> Result<(), PredictError> {
    match FeatureId::ALL
        .into_iter()
        .zip(features)
        .find(|(_, v)| !v.is_finite())
    {
        Some((feature, &value)) => Err(PredictError::NonFiniteFeature {
            feature,
            stage,
            value,
        }),
        None => Ok(()),
    }
}

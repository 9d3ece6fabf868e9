//! Per-feature standardization.
//!
//! [`Scaler::fit`] learns a mean and a scale for every feature from the
//! training partition; [`Scaler::transform`] maps raw features to
//! `(x - mean) / scale`. The fitted parameters are persisted as a
//! [`ScalerArtifact`] and reused unchanged at evaluation and prediction time.
//!
//! # Degenerate Features
//!
//! A feature that is constant over the fitting set has no spread to divide by.
//! Such a feature is stored with mean `0` and scale `1`, so the transform passes
//! it through unchanged, and a [`DegenerateFeatureWarning`] is returned with the
//! fit. Fitting still succeeds.

use std::{fmt, path::Path};

use lbw_data::{
    feature::{FEATURE_COUNT, FeatureId, FeatureVector, feature_names},
    sample::Dataset,
};
use serde::{Deserialize, Serialize};

use crate::artifact::{self, ArtifactError};

/// Format version written to and required from scaler files.
pub const SCALER_FORMAT_VERSION: u32 = 1;

/// Default file name of the scaler artifact.
pub const SCALER_FILE: &str = "lbw_scaler.json";

const KIND: &str = "scaler";

#[derive(Debug, derive_more::Display, derive_more::Error)]
pub enum ScalerError {
    #[display("cannot fit a scaler on an empty dataset")]
    EmptyFitSet,
}

/// A feature that was constant over the fitting set.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DegenerateFeatureWarning {
    pub feature: FeatureId,
    /// The constant value observed.
    pub value: f32,
}

impl fmt::Display for DegenerateFeatureWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "feature '{}' is constant ({}) in the training set and is left unscaled",
            self.feature, self.value
        )
    }
}

/// Result of [`Scaler::fit`].
#[derive(Debug, Clone, PartialEq)]
pub struct ScalerFit {
    pub scaler: Scaler,
    pub degenerate: Vec<DegenerateFeatureWarning>,
}

/// Fitted standardization parameters, in [`FeatureId::ALL`] order.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Scaler {
    mean: FeatureVector,
    scale: FeatureVector,
}

impl Scaler {
    /// Fits per-feature mean and population standard deviation.
    ///
    /// # Errors
    ///
    /// Returns [`ScalerError::EmptyFitSet`] if `dataset` has no samples.
    pub fn fit(dataset: &Dataset) -> Result<ScalerFit, ScalerError> {
        let stats = dataset.feature_stats().ok_or(ScalerError::EmptyFitSet)?;

        let mut mean = [0.0; FEATURE_COUNT];
        let mut scale = [1.0; FEATURE_COUNT];
        let mut degenerate = vec![];
        for (id, stats) in stats {
            if stats.is_constant() {
                degenerate.push(DegenerateFeatureWarning {
                    feature: id,
                    value: stats.min,
                });
            } else {
                mean[id.index()] = stats.mean;
                scale[id.index()] = stats.std_dev;
            }
        }

        Ok(ScalerFit {
            scaler: Self { mean, scale },
            degenerate,
        })
    }

    #[must_use]
    pub fn mean(&self) -> &FeatureVector {
        &self.mean
    }

    #[must_use]
    pub fn scale(&self) -> &FeatureVector {
        &self.scale
    }

    /// Standardizes one feature vector.
    #[must_use]
    pub fn transform(&self, features: &FeatureVector) -> FeatureVector {
        std::array::from_fn(|i| (features[i] - self.mean[i]) / self.scale[i])
    }

    /// Standardizes every sample of `dataset`, keeping labels and order.
    #[must_use]
    pub fn transform_dataset(&self, dataset: &Dataset) -> Dataset {
        dataset.map_features(|f| self.transform(f))
    }

    #[must_use]
    pub fn to_artifact(&self) -> ScalerArtifact {
        ScalerArtifact {
            format_version: SCALER_FORMAT_VERSION,
            feature_names: feature_names().into_iter().map(String::from).collect(),
            mean: self.mean.to_vec(),
            scale: self.scale.to_vec(),
        }
    }

    /// Writes the scaler artifact, replacing any existing file at `path`.
    pub fn save<P>(&self, path: P) -> Result<(), ArtifactError>
    where
        P: AsRef<Path>,
    {
        artifact::write_json(KIND, path.as_ref(), &self.to_artifact())
    }

    /// Reads and validates a scaler artifact.
    pub fn load<P>(path: P) -> Result<Self, ArtifactError>
    where
        P: AsRef<Path>,
    {
        let path = path.as_ref();
        let artifact: ScalerArtifact = artifact::read_json(KIND, path)?;
        artifact::check_version(KIND, path, SCALER_FORMAT_VERSION, artifact.format_version)?;
        artifact
            .into_scaler()
            .map_err(|reason| ArtifactError::Invalid {
                kind: KIND,
                path: path.to_owned(),
                reason,
            })
    }
}

/// On-disk form of a [`Scaler`].
///
/// Field names match what the simulator-side predictor reads (`mean`,
/// `scale`, `feature_names`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScalerArtifact {
    pub format_version: u32,
    pub feature_names: Vec<String>,
    pub mean: Vec<f32>,
    pub scale: Vec<f32>,
}

impl ScalerArtifact {
    fn into_scaler(self) -> Result<Scaler, String> {
        let expected = feature_names();
        if self.feature_names != expected {
            return Err(format!(
                "feature names {:?} do not match expected order {expected:?}",
                self.feature_names
            ));
        }
        let to_vector = |name: &str, values: Vec<f32>| -> Result<FeatureVector, String> {
            let len = values.len();
            let vector = FeatureVector::try_from(values)
                .map_err(|_| format!("'{name}' has {len} values, expected {FEATURE_COUNT}"))?;
            if vector.iter().all(|v| v.is_finite()) {
                Ok(vector)
            } else {
                Err(format!("'{name}' contains a non-finite value"))
            }
        };
        let mean = to_vector("mean", self.mean)?;
        let scale = to_vector("scale", self.scale)?;
        if let Some(i) = scale.iter().position(|&s| s <= 0.0) {
            return Err(format!(
                "scale for '{}' is {}, expected a positive value",
                expected[i], scale[i]
            ));
        }
        Ok(Scaler { mean, scale })
    }
}

//! Persisted network parameters.
//!
//! A training run produces two checkpoints: the parameters with the lowest
//! validation loss seen so far ([`CheckpointKind::Best`]) and the parameters
//! after the last epoch ([`CheckpointKind::Final`]). Both share one format.

use std::path::Path;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{
    artifact::{self, ArtifactError},
    network::Network,
};

/// Format version written to and required from checkpoint files.
pub const CHECKPOINT_FORMAT_VERSION: u32 = 1;

/// Default file name of the best-validation-loss checkpoint.
pub const BEST_CHECKPOINT_FILE: &str = "lbw_model_best.json";

/// Default file name of the last-epoch checkpoint.
pub const FINAL_CHECKPOINT_FILE: &str = "lbw_model_final.json";

const KIND: &str = "checkpoint";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, derive_more::Display)]
#[serde(rename_all = "snake_case")]
pub enum CheckpointKind {
    #[display("best")]
    Best,
    #[display("final")]
    Final,
}

impl CheckpointKind {
    /// The conventional file name for this kind.
    #[must_use]
    pub fn file_name(self) -> &'static str {
        match self {
            Self::Best => BEST_CHECKPOINT_FILE,
            Self::Final => FINAL_CHECKPOINT_FILE,
        }
    }
}

/// A snapshot of the network parameters and the epoch they come from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Checkpoint {
    pub format_version: u32,
    pub kind: CheckpointKind,
    /// 1-based epoch after which the snapshot was taken.
    pub epoch: usize,
    /// Validation loss at `epoch`, if one was computed.
    pub validation_loss: Option<f32>,
    pub trained_at: DateTime<Utc>,
    pub network: Network,
}

impl Checkpoint {
    #[must_use]
    pub fn new(
        kind: CheckpointKind,
        epoch: usize,
        validation_loss: Option<f32>,
        network: Network,
    ) -> Self {
        Self {
            format_version: CHECKPOINT_FORMAT_VERSION,
            kind,
            epoch,
            validation_loss,
            trained_at: Utc::now(),
            network,
        }
    }

    /// Writes the checkpoint, replacing any existing file at `path`.
    pub fn save<P>(&self, path: P) -> Result<(), ArtifactError>
    where
        P: AsRef<Path>,
    {
        artifact::write_json(KIND, path.as_ref(), self)
    }

    /// Reads a checkpoint and checks it against the model topology.
    pub fn load<P>(path: P) -> Result<Self, ArtifactError>
    where
        P: AsRef<Path>,
    {
        let path = path.as_ref();
        let checkpoint: Self = artifact::read_json(KIND, path)?;
        artifact::check_version(
            KIND,
            path,
            CHECKPOINT_FORMAT_VERSION,
            checkpoint.format_version,
        )?;
        checkpoint
            .network
            .validate()
            .map_err(|source| ArtifactError::Shape {
                kind: KIND,
                path: path.to_owned(),
                source,
            })?;
        Ok(checkpoint)
    }
}

//! The hit-probability model and its persisted artifacts.
//!
//! This crate defines what a trained predictor *is*: the feature
//! [`Scaler`](scaler::Scaler), the fixed-topology [`Network`](network::Network),
//! the loss it is trained against, and the versioned JSON artifacts that carry
//! both between training and evaluation.
//!
//! # Architecture
//!
//! ```text
//! 13 raw features
//!     ↓ Scaler: (x - mean) / scale
//! 13 standardized features
//!     ↓ Linear 13→128, ReLU, Dropout
//!     ↓ Linear 128→64, ReLU, Dropout
//!     ↓ Linear 64→32,  ReLU, Dropout
//!     ↓ Linear 32→16,  ReLU, Dropout
//!     ↓ Linear 16→1,   Sigmoid
//! P(ball hits stumps) ∈ [0, 1]
//! ```
//!
//! The layer widths are part of the artifact contract and cannot be changed at
//! runtime. Dropout is controlled by the explicit [`Mode`](network::Mode)
//! passed to every forward computation; there is no hidden train/eval flag.
//!
//! # Artifacts
//!
//! - [`ScalerArtifact`](scaler::ScalerArtifact): feature names, means and
//!   scales. Written once after fitting.
//! - [`Checkpoint`](checkpoint::Checkpoint): network parameters plus metadata.
//!   A training run writes a "best" and a "final" checkpoint; either can be
//!   evaluated.
//!
//! Both artifacts carry a `format_version` and are rejected on load if the
//! version or the tensor shapes do not match this build.
//!
//! # Example
//!
//! ```no_run
//! use lbw_model::{checkpoint::Checkpoint, predictor::Predictor, scaler::Scaler};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let checkpoint = Checkpoint::load("lbw_model_best.json")?;
//! let scaler = Scaler::load("lbw_scaler.json")?;
//! let predictor = Predictor::new(checkpoint.network, scaler, 0.5);
//!
//! let features = [0.0, 0.83, 10.0, 0.85, 5.11, -0.77, 13.58, 3.86, 99.55, 3.64, 2.11, 0.0, 0.0];
//! let decision = predictor.predict(&features)?;
//! println!("P(hit) = {:.2}%", decision.probability * 100.0);
//! # Ok(())
//! # }
//! ```

pub mod artifact;
pub mod checkpoint;
pub mod importance;
pub mod loss;
pub mod network;
pub mod predictor;
pub mod scaler;

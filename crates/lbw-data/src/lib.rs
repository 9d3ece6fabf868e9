//! Dataset contract and ingestion for the LBW hit predictor.
//!
//! This crate owns everything about the data before it reaches the model:
//! the fixed feature order, the [`Sample`](sample::Sample) /
//! [`Dataset`](sample::Dataset) types, and the CSV/JSON loaders that turn
//! simulator exports into datasets.
//!
//! # Feature Contract
//!
//! Every sample carries exactly [`FEATURE_COUNT`](feature::FEATURE_COUNT)
//! features in the order given by [`FeatureId::ALL`](feature::FeatureId::ALL).
//! The same order is used by the scaler, the network input layer and every
//! serialized artifact. Reordering silently corrupts predictions, so the order
//! is never inferred from input files: loaders look columns up by name.
//!
//! # Loading
//!
//! ```no_run
//! use lbw_data::load;
//!
//! # fn main() -> Result<(), lbw_data::error::LoadError> {
//! let dataset = load::load_dataset("LBWTrainingData.csv")?;
//! println!("{} samples", dataset.len());
//! # Ok(())
//! # }
//! ```
//!
//! Loading fails fast: a missing file, a missing column or an unparsable value
//! is reported before any computation starts. Dataset-level advisories (such
//! as class imbalance) are non-fatal and reported separately via
//! [`Dataset::class_imbalance`](sample::Dataset::class_imbalance).

pub mod error;
pub mod feature;
pub mod load;
pub mod sample;

//! Training loop for the LBW hit predictor.
//!
//! This crate turns a raw [`Dataset`](lbw_data::sample::Dataset) into a trained
//! network and its artifacts. It owns partitioning, batching, the optimizer and
//! the epoch loop; the network, scaler and checkpoint formats themselves live
//! in `lbw-model`.
//!
//! # How Training Works
//!
//! 1. **Seed** - A [`TrainingSeed`](seed::TrainingSeed) creates the single RNG
//!    used for the whole run
//! 2. **Initialize** - Random network weights
//! 3. **Partition** - Shuffle and split into training and validation subsets
//! 4. **Scale** - Fit the scaler on the training subset only, save it, and
//!    standardize both subsets
//! 5. **Epochs** - Train on shuffled batches, validate on ordered batches,
//!    checkpoint on every new best validation loss
//! 6. **Finish** - Save the final checkpoint
//!
//! # Architecture
//!
//! ```text
//! TrainingSeed
//!     ↓ seeds
//! Pcg32 ── init ──→ Network
//!     ├── split ──→ Partition (train / validation)
//!     │                 ↓ fit on train
//!     │              Scaler ──→ ArtifactSink::save_scaler
//!     └── shuffle, dropout
//!                       ↓
//! TrainingState ──run_epoch──→ TrainingState ──→ … (N epochs)
//!     ↓ new best                    ↓ done
//! best checkpoint            final checkpoint
//! ```
//!
//! # Hyper-parameters
//!
//! - **Epochs** - Passes over the training subset (default 100)
//! - **Learning rate** - Adam step size (default 0.001)
//! - **Batch size** - Samples per update (default 32)
//! - **Train fraction** - Share of samples used for training (default 0.8)
//!
//! See [`TrainingParams`](trainer::TrainingParams).
//!
//! # Example
//!
//! ```no_run
//! use lbw_data::load;
//! use lbw_training::{
//!     seed::TrainingSeed,
//!     trainer::{self, ArtifactPaths, TrainingParams},
//! };
//! use rand::Rng as _;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let dataset = load::load_dataset("LBWTrainingData.csv")?;
//! let seed: TrainingSeed = rand::rng().random();
//! let mut artifacts = ArtifactPaths::in_dir(".".as_ref());
//!
//! let outcome = trainer::train(&dataset, &TrainingParams::default(), seed, &mut artifacts)?;
//! println!("best epoch: {}", outcome.best_epoch);
//! # Ok(())
//! # }
//! ```

pub mod optimizer;
pub mod partition;
pub mod seed;
pub mod summary;
pub mod trainer;

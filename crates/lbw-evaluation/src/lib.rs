//! Evaluation of a trained LBW hit predictor.
//!
//! Evaluation never trains: it loads a [`Checkpoint`](lbw_model::checkpoint::Checkpoint)
//! and the [`Scaler`](lbw_model::scaler::Scaler) fitted at training time,
//! scores a test dataset, and summarizes the results.
//!
//! # Pipeline
//!
//! ```text
//! test Dataset ──scaler.transform──→ Network (inference)
//!                                          ↓
//!                                  PredictionRecord (per sample)
//!        ┌───────────────┬─────────────────┼───────────────────┐
//!        ↓               ↓                 ↓                   ↓
//! ConfusionMatrix  ThresholdSweep  accuracy_by_confidence  EvaluationCharts
//!        ↓               ↓
//! EvaluationReport  SweepReport
//! ```
//!
//! A sample is predicted to hit the stumps when its probability is at least
//! the decision threshold. The [`ThresholdSweep`](threshold::ThresholdSweep)
//! only recommends a threshold; re-score with
//! [`rethreshold`](scoring::rethreshold) to report at it.
//!
//! # Modules
//!
//! - [`scoring`]: batched inference over a dataset
//! - [`metrics`]: confusion counts, recall/precision and the per-class report
//! - [`threshold`]: threshold sensitivity search
//! - [`calibration`]: accuracy per predicted-probability bucket
//! - [`charts`]: serializable chart inputs
//! - [`report`]: text rendering

pub mod calibration;
pub mod charts;
pub mod metrics;
pub mod report;
pub mod scoring;
pub mod threshold;

//! Epoch loop with best/final checkpointing.
//!
//! A run moves through `Epoch 1 → … → Epoch N → Done`. Everything that changes
//! between epochs (network parameters, optimizer moments, the RNG, the history
//! and the best-loss tracker) lives in one [`TrainingState`] value, which
//! [`run_epoch`] takes by value and returns updated.
//!
//! # Epoch
//!
//! 1. **Train** - shuffled batches; forward with dropout, binary cross-entropy,
//!    back-propagation and one Adam step per batch.
//! 2. **Validate** - ordered batches, dropout disabled, no parameter update.
//! 3. **Record** - mean batch loss and `correct / total` accuracy for both
//!    phases are appended to the history.
//! 4. **Checkpoint** - when the validation loss is strictly lower than every
//!    previous epoch's, the parameters are saved as the best checkpoint.
//!
//! Accuracy bookkeeping always classifies with `probability > 0.5`. This is
//! unrelated to the evaluation threshold, which is tuned separately.
//!
//! After the last epoch the current parameters are saved as the final
//! checkpoint, whether or not they are the best ones.
//!
//! # Failure
//!
//! A failed artifact write aborts the run. Nothing is retried.

use std::path::{Path, PathBuf};

use lbw_data::sample::Dataset;
use lbw_model::{
    artifact::ArtifactError,
    checkpoint::{Checkpoint, CheckpointKind},
    importance::{FeatureImportance, feature_importance},
    loss,
    network::{Mode, Network},
    scaler::{DegenerateFeatureWarning, SCALER_FILE, Scaler, ScalerError, ScalerFit},
};
use rand_pcg::Pcg32;
use serde::Serialize;

use crate::{
    optimizer::Adam,
    partition::{self, DEFAULT_BATCH_SIZE, DEFAULT_TRAIN_FRACTION, InvalidFractionError, Partition},
    seed::TrainingSeed,
};

/// Decision threshold used for training and validation accuracy.
pub const BOOKKEEPING_THRESHOLD: f32 = 0.5;

/// Hyper-parameters of a training run.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct TrainingParams {
    /// Number of passes over the training subset.
    pub epochs: usize,
    /// Adam learning rate.
    pub learning_rate: f32,
    /// Samples per batch.
    pub batch_size: usize,
    /// Fraction of samples assigned to the training subset.
    pub train_fraction: f64,
    /// Epoch interval between progress log lines.
    pub log_interval: usize,
}

impl Default for TrainingParams {
    fn default() -> Self {
        Self {
            epochs: 100,
            learning_rate: 0.001,
            batch_size: DEFAULT_BATCH_SIZE,
            train_fraction: DEFAULT_TRAIN_FRACTION,
            log_interval: 10,
        }
    }
}

impl TrainingParams {
    fn validate(&self) -> Result<(), TrainingError> {
        let reason = if self.epochs == 0 {
            "epochs must be positive"
        } else if self.batch_size == 0 {
            "batch size must be positive"
        } else if !(self.learning_rate.is_finite() && self.learning_rate > 0.0) {
            "learning rate must be a positive number"
        } else if self.log_interval == 0 {
            "log interval must be positive"
        } else {
            return Ok(());
        };
        Err(TrainingError::InvalidParams { reason })
    }
}

#[derive(Debug, derive_more::Display, derive_more::Error)]
pub enum TrainingError {
    #[display("invalid training parameters: {reason}")]
    InvalidParams { reason: &'static str },
    #[display("invalid partition")]
    Partition(InvalidFractionError),
    #[display(
        "{subset} subset is empty ({total} samples with train fraction {train_fraction})"
    )]
    EmptySubset {
        subset: &'static str,
        total: usize,
        train_fraction: f64,
    },
    #[display("failed to fit scaler")]
    Scaler(ScalerError),
    #[display("failed to save scaler")]
    SaveScaler(ArtifactError),
    #[display("failed to save {kind} checkpoint")]
    SaveCheckpoint {
        kind: CheckpointKind,
        source: ArtifactError,
    },
}

/// Destination of the artifacts a run produces.
pub trait ArtifactSink {
    /// Persists the fitted scaler. Called once, before the first epoch.
    fn save_scaler(&mut self, scaler: &Scaler) -> Result<(), ArtifactError>;

    /// Persists a checkpoint, replacing any earlier one of the same kind.
    fn save_checkpoint(&mut self, checkpoint: &Checkpoint) -> Result<(), ArtifactError>;
}

/// Writes artifacts to fixed file paths.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArtifactPaths {
    pub scaler: PathBuf,
    pub best: PathBuf,
    pub final_checkpoint: PathBuf,
}

impl ArtifactPaths {
    /// Uses the conventional file names inside `dir`.
    #[must_use]
    pub fn in_dir(dir: &Path) -> Self {
        Self {
            scaler: dir.join(SCALER_FILE),
            best: dir.join(CheckpointKind::Best.file_name()),
            final_checkpoint: dir.join(CheckpointKind::Final.file_name()),
        }
    }

    #[must_use]
    pub fn checkpoint(&self, kind: CheckpointKind) -> &Path {
        match kind {
            CheckpointKind::Best => &self.best,
            CheckpointKind::Final => &self.final_checkpoint,
        }
    }
}

impl ArtifactSink for ArtifactPaths {
    fn save_scaler(&mut self, scaler: &Scaler) -> Result<(), ArtifactError> {
        scaler.save(&self.scaler)
    }

    fn save_checkpoint(&mut self, checkpoint: &Checkpoint) -> Result<(), ArtifactError> {
        checkpoint.save(self.checkpoint(checkpoint.kind))
    }
}

/// Metrics of one epoch.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct EpochRecord {
    /// 1-based epoch number.
    pub epoch: usize,
    pub train_loss: f32,
    pub train_accuracy: f32,
    pub validation_loss: f32,
    pub validation_accuracy: f32,
}

impl EpochRecord {
    /// One-line progress summary with accuracies as percentages.
    #[must_use]
    pub fn progress_line(&self, total_epochs: usize) -> String {
        format!(
            "Epoch [{}/{total_epochs}], Train Loss: {:.4}, Train Acc: {:.2}%, Val Loss: {:.4}, Val Acc: {:.2}%",
            self.epoch,
            self.train_loss,
            self.train_accuracy * 100.0,
            self.validation_loss,
            self.validation_accuracy * 100.0,
        )
    }
}

/// Tracks the lowest validation loss seen so far.
///
/// Only a strictly lower loss replaces the current best, so among equal losses
/// the earliest epoch wins. A non-finite best is replaced by any finite loss.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct BestTracker {
    best: Option<(usize, f32)>,
}

impl BestTracker {
    /// Records `loss` for `epoch` and returns `true` if it is a new best.
    pub fn observe(&mut self, epoch: usize, loss: f32) -> bool {
        let improved = self
            .best
            .is_none_or(|(_, best)| loss < best || (!best.is_finite() && loss.is_finite()));
        if improved {
            self.best = Some((epoch, loss));
        }
        improved
    }

    #[must_use]
    pub fn best_epoch(&self) -> Option<usize> {
        self.best.map(|(epoch, _)| epoch)
    }

    #[must_use]
    pub fn best_loss(&self) -> Option<f32> {
        self.best.map(|(_, loss)| loss)
    }
}

/// Everything that evolves from one epoch to the next.
#[derive(Debug, Clone)]
pub struct TrainingState {
    /// Number of completed epochs.
    pub epoch: usize,
    pub network: Network,
    pub history: Vec<EpochRecord>,
    pub best: BestTracker,
    optimizer: Adam,
    rng: Pcg32,
}

impl TrainingState {
    #[must_use]
    pub fn new(mut network: Network, learning_rate: f32, rng: Pcg32) -> Self {
        let optimizer = Adam::new(&mut network, learning_rate);
        Self {
            epoch: 0,
            network,
            history: vec![],
            best: BestTracker::default(),
            optimizer,
            rng,
        }
    }
}

/// Standardized training and validation subsets.
#[derive(Debug, Clone)]
pub struct EpochData {
    pub train: Dataset,
    pub validation: Dataset,
}

struct PhaseMetrics {
    loss: f32,
    accuracy: f32,
}

/// Result of a completed run.
#[derive(Debug, Clone)]
pub struct TrainingOutcome {
    pub seed: TrainingSeed,
    pub params: TrainingParams,
    pub scaler: Scaler,
    pub degenerate_features: Vec<DegenerateFeatureWarning>,
    pub train_samples: usize,
    pub validation_samples: usize,
    /// Parameters after the last epoch.
    pub network: Network,
    pub history: Vec<EpochRecord>,
    /// 1-based epoch of the best checkpoint.
    pub best_epoch: usize,
    pub best_validation_loss: f32,
}

impl TrainingOutcome {
    /// Input features ranked by first-layer weight magnitude of the final
    /// network.
    #[must_use]
    pub fn feature_importance(&self) -> Vec<FeatureImportance> {
        feature_importance(&self.network)
    }
}

/// Trains a network on `dataset` and writes its artifacts to `sink`.
///
/// # Arguments
///
/// * `dataset` - Raw (unscaled) samples; split into training and validation
///   subsets by `params.train_fraction`
/// * `params` - Hyper-parameters
/// * `seed` - Seed for initialization, partitioning, shuffling and dropout
/// * `sink` - Receives the scaler, every new best checkpoint and the final
///   checkpoint
///
/// # Errors
///
/// Returns an error if the parameters are invalid, either subset is empty, or
/// an artifact cannot be written.
pub fn train<S>(
    dataset: &Dataset,
    params: &TrainingParams,
    seed: TrainingSeed,
    sink: &mut S,
) -> Result<TrainingOutcome, TrainingError>
where
    S: ArtifactSink + ?Sized,
{
    params.validate()?;

    let mut rng = seed.rng();
    let network = Network::random(&mut rng);
    let partition = Partition::random_split(dataset.len(), params.train_fraction, &mut rng)
        .map_err(TrainingError::Partition)?;
    for (subset, indices) in [
        ("training", &partition.train),
        ("validation", &partition.validation),
    ] {
        if indices.is_empty() {
            return Err(TrainingError::EmptySubset {
                subset,
                total: dataset.len(),
                train_fraction: params.train_fraction,
            });
        }
    }
    tracing::info!(
        train = partition.train.len(),
        validation = partition.validation.len(),
        "partitioned dataset"
    );

    let train_raw = dataset.select(&partition.train);
    let ScalerFit { scaler, degenerate } = Scaler::fit(&train_raw).map_err(TrainingError::Scaler)?;
    for warning in &degenerate {
        tracing::warn!("{warning}");
    }
    sink.save_scaler(&scaler).map_err(TrainingError::SaveScaler)?;

    let data = EpochData {
        train: scaler.transform_dataset(&train_raw),
        validation: scaler.transform_dataset(&dataset.select(&partition.validation)),
    };

    let mut state = TrainingState::new(network, params.learning_rate, rng);
    for _ in 0..params.epochs {
        state = run_epoch(state, &data, params, sink)?;
    }

    let last = *state
        .history
        .last()
        .expect("at least one epoch has completed");
    let checkpoint = Checkpoint::new(
        CheckpointKind::Final,
        state.epoch,
        Some(last.validation_loss),
        state.network.clone(),
    );
    save_checkpoint(sink, &checkpoint)?;

    let (best_epoch, best_validation_loss) = state
        .best
        .best
        .expect("the first epoch always sets a best loss");
    tracing::info!(
        best_epoch,
        best_validation_loss,
        final_validation_loss = last.validation_loss,
        "training complete"
    );

    Ok(TrainingOutcome {
        seed,
        params: *params,
        scaler,
        degenerate_features: degenerate,
        train_samples: partition.train.len(),
        validation_samples: partition.validation.len(),
        network: state.network,
        history: state.history,
        best_epoch,
        best_validation_loss,
    })
}

/// Advances `state` by one epoch.
///
/// # Errors
///
/// Returns an error if a new best checkpoint cannot be written.
pub fn run_epoch<S>(
    mut state: TrainingState,
    data: &EpochData,
    params: &TrainingParams,
    sink: &mut S,
) -> Result<TrainingState, TrainingError>
where
    S: ArtifactSink + ?Sized,
{
    let epoch = state.epoch + 1;
    let train = train_phase(&mut state, &data.train, params.batch_size);
    let validation = validation_phase(&state.network, &data.validation, params.batch_size);

    let record = EpochRecord {
        epoch,
        train_loss: train.loss,
        train_accuracy: train.accuracy,
        validation_loss: validation.loss,
        validation_accuracy: validation.accuracy,
    };
    state.history.push(record);
    state.epoch = epoch;

    if state.best.observe(epoch, validation.loss) {
        let checkpoint = Checkpoint::new(
            CheckpointKind::Best,
            epoch,
            Some(validation.loss),
            state.network.clone(),
        );
        save_checkpoint(sink, &checkpoint)?;
        tracing::debug!(epoch, validation_loss = validation.loss, "new best checkpoint");
    }

    if epoch % params.log_interval == 0 {
        tracing::info!("{}", record.progress_line(params.epochs));
    }

    Ok(state)
}

fn save_checkpoint<S>(sink: &mut S, checkpoint: &Checkpoint) -> Result<(), TrainingError>
where
    S: ArtifactSink + ?Sized,
{
    sink.save_checkpoint(checkpoint)
        .map_err(|source| TrainingError::SaveCheckpoint {
            kind: checkpoint.kind,
            source,
        })
}

fn train_phase(state: &mut TrainingState, dataset: &Dataset, batch_size: usize) -> PhaseMetrics {
    let indices = (0..dataset.len()).collect::<Vec<_>>();
    let batches = partition::batches(dataset, &indices, batch_size, Some(&mut state.rng));

    let mut tally = Tally::default();
    for batch in &batches {
        let pass = state.network.forward(
            &batch.features,
            Mode::Training {
                rng: &mut state.rng,
            },
        );
        tally.add(pass.probabilities(), &batch.targets);
        let gradients = state.network.backward(&pass, &batch.targets);
        state.optimizer.step(&mut state.network, &gradients);
    }
    tally.finish()
}

fn validation_phase(network: &Network, dataset: &Dataset, batch_size: usize) -> PhaseMetrics {
    let indices = (0..dataset.len()).collect::<Vec<_>>();
    let mut tally = Tally::default();
    for batch in partition::batches::<Pcg32>(dataset, &indices, batch_size, None) {
        tally.add(&network.infer(&batch.features), &batch.targets);
    }
    tally.finish()
}

#[derive(Default)]
struct Tally {
    loss_sum: f32,
    batches: usize,
    correct: usize,
    total: usize,
}

impl Tally {
    fn add(&mut self, probabilities: &[f32], targets: &[f32]) {
        self.loss_sum += loss::binary_cross_entropy(probabilities, targets);
        self.batches += 1;
        self.correct += probabilities
            .iter()
            .zip(targets)
            .filter(|&(&p, &y)| (p > BOOKKEEPING_THRESHOLD) == (y >= 0.5))
            .count();
        self.total += targets.len();
    }

    #[expect(clippy::cast_precision_loss)]
    fn finish(self) -> PhaseMetrics {
        PhaseMetrics {
            loss: self.loss_sum / self.batches.max(1) as f32,
            accuracy: self.correct as f32 / self.total.max(1) as f32,
        }
    }
}

#[cfg(test)]
mod tests {
    use lbw_data::sample::Sample;
    use rand::{Rng as _, SeedableRng as _};

    use super::*;

    /// Collects artifacts in memory.
    #[derive(Default)]
    struct MemorySink {
        scaler: Option<Scaler>,
        checkpoints: Vec<Checkpoint>,
    }

    impl ArtifactSink for MemorySink {
        fn save_scaler(&mut self, scaler: &Scaler) -> Result<(), ArtifactError> {
            self.scaler = Some(*scaler);
            Ok(())
        }

        fn save_checkpoint(&mut self, checkpoint: &Checkpoint) -> Result<(), ArtifactError> {
            self.checkpoints.push(checkpoint.clone());
            Ok(())
        }
    }

    struct FailingSink;

    impl ArtifactSink for FailingSink {
        fn save_scaler(&mut self, _scaler: &Scaler) -> Result<(), ArtifactError> {
            Ok(())
        }

        fn save_checkpoint(&mut self, checkpoint: &Checkpoint) -> Result<(), ArtifactError> {
            Err(ArtifactError::Write {
                kind: "checkpoint",
                path: checkpoint.kind.file_name().into(),
                source: std::io::Error::other("disk full"),
            })
        }
    }

    fn noisy_dataset(len: usize, seed: u64) -> Dataset {
        let mut rng = Pcg32::seed_from_u64(seed);
        (0..len)
            .map(|i| {
                let features = std::array::from_fn(|_| rng.random_range(-1.0..1.0));
                Sample::new(features, i % 2 == 0)
            })
            .collect()
    }

    fn params(epochs: usize) -> TrainingParams {
        TrainingParams {
            epochs,
            ..TrainingParams::default()
        }
    }

    #[test]
    fn test_best_tracker_picks_first_minimum() {
        let mut tracker = BestTracker::default();
        let improved = [0.9, 0.7, 0.75, 0.6, 0.65]
            .into_iter()
            .enumerate()
            .map(|(i, loss)| tracker.observe(i, loss))
            .collect::<Vec<_>>();
        assert_eq!(improved, [true, true, false, true, false]);
        assert_eq!(tracker.best_epoch(), Some(3));
        assert_eq!(tracker.best_loss(), Some(0.6));
    }

    #[test]
    fn test_best_tracker_ignores_ties() {
        let mut tracker = BestTracker::default();
        assert!(tracker.observe(0, 0.5));
        assert!(!tracker.observe(1, 0.5));
        assert_eq!(tracker.best_epoch(), Some(0));
    }

    #[test]
    fn test_progress_line_uses_percentages() {
        let record = EpochRecord {
            epoch: 10,
            train_loss: 0.25,
            train_accuracy: 0.95,
            validation_loss: 0.3125,
            validation_accuracy: 0.875,
        };
        assert_eq!(
            record.progress_line(100),
            "Epoch [10/100], Train Loss: 0.2500, Train Acc: 95.00%, Val Loss: 0.3125, Val Acc: 87.50%"
        );
    }

    #[test]
    fn test_best_tracker_replaces_non_finite_loss() {
        let mut tracker = BestTracker::default();
        assert!(tracker.observe(0, f32::NAN));
        assert!(!tracker.observe(1, f32::NAN));
        assert!(tracker.observe(2, 0.8));
        assert!(tracker.observe(3, 0.7));
        assert!(!tracker.observe(4, f32::NAN));
        assert_eq!(tracker.best_epoch(), Some(3));
        assert_eq!(tracker.best_loss(), Some(0.7));
    }

    #[test]
    fn test_run_writes_best_and_final() {
        let dataset = noisy_dataset(60, 1);
        let mut sink = MemorySink::default();
        let outcome = train(&dataset, &params(12), TrainingSeed::from(3), &mut sink).unwrap();

        assert_eq!(outcome.history.len(), 12);
        assert_eq!(outcome.train_samples, 48);
        assert_eq!(outcome.validation_samples, 12);
        assert!(sink.scaler.is_some());

        let (last, bests) = sink.checkpoints.split_last().unwrap();
        assert_eq!(last.kind, CheckpointKind::Final);
        assert_eq!(last.epoch, 12);
        assert_eq!(last.network, outcome.network);
        assert!(bests.iter().all(|c| c.kind == CheckpointKind::Best));

        // Every saved best strictly improves on the previous one and the last
        // saved best is the run's best epoch
        let losses = bests
            .iter()
            .map(|c| c.validation_loss.unwrap())
            .collect::<Vec<_>>();
        assert!(losses.windows(2).all(|w| w[1] < w[0]));
        assert_eq!(bests.last().unwrap().epoch, outcome.best_epoch);

        let history_min = outcome
            .history
            .iter()
            .map(|r| r.validation_loss)
            .fold(f32::INFINITY, f32::min);
        assert_eq!(outcome.best_validation_loss, history_min);
    }

    #[test]
    fn test_same_seed_is_reproducible() {
        let dataset = noisy_dataset(40, 2);
        let a = train(&dataset, &params(3), TrainingSeed::from(5), &mut MemorySink::default())
            .unwrap();
        let b = train(&dataset, &params(3), TrainingSeed::from(5), &mut MemorySink::default())
            .unwrap();
        assert_eq!(a.network, b.network);
        assert_eq!(a.history, b.history);
    }

    #[test]
    fn test_history_metrics_are_bounded() {
        let dataset = noisy_dataset(50, 4);
        let outcome = train(
            &dataset,
            &params(5),
            TrainingSeed::from(6),
            &mut MemorySink::default(),
        )
        .unwrap();
        for (i, record) in outcome.history.iter().enumerate() {
            assert_eq!(record.epoch, i + 1);
            assert!(record.train_loss.is_finite() && record.train_loss >= 0.0);
            assert!((0.0..=1.0).contains(&record.train_accuracy));
            assert!((0.0..=1.0).contains(&record.validation_accuracy));
        }
    }

    #[test]
    fn test_empty_validation_subset() {
        let dataset = noisy_dataset(4, 5);
        let params = TrainingParams {
            train_fraction: 1.0,
            ..params(1)
        };
        let err = train(&dataset, &params, TrainingSeed::from(0), &mut MemorySink::default())
            .unwrap_err();
        assert!(matches!(
            err,
            TrainingError::EmptySubset {
                subset: "validation",
                ..
            }
        ));
    }

    #[test]
    fn test_invalid_params() {
        let dataset = noisy_dataset(10, 6);
        for params in [
            params(0),
            TrainingParams {
                batch_size: 0,
                ..params(1)
            },
            TrainingParams {
                learning_rate: f32::NAN,
                ..params(1)
            },
        ] {
            let err = train(&dataset, &params, TrainingSeed::from(0), &mut MemorySink::default())
                .unwrap_err();
            assert!(matches!(err, TrainingError::InvalidParams { .. }));
        }
    }

    #[test]
    fn test_checkpoint_write_failure_is_fatal() {
        let dataset = noisy_dataset(20, 7);
        let err = train(&dataset, &params(5), TrainingSeed::from(1), &mut FailingSink).unwrap_err();
        assert!(matches!(
            err,
            TrainingError::SaveCheckpoint {
                kind: CheckpointKind::Best,
                ..
            }
        ));
    }

    #[test]
    fn test_artifact_paths_write_files() {
        let dir = tempfile::tempdir().unwrap();
        let mut paths = ArtifactPaths::in_dir(dir.path());
        let dataset = noisy_dataset(30, 8);
        train(&dataset, &params(2), TrainingSeed::from(2), &mut paths).unwrap();

        let scaler = Scaler::load(&paths.scaler).unwrap();
        let best = Checkpoint::load(&paths.best).unwrap();
        let last = Checkpoint::load(&paths.final_checkpoint).unwrap();
        assert_eq!(best.kind, CheckpointKind::Best);
        assert_eq!(last.kind, CheckpointKind::Final);
        assert_eq!(last.epoch, 2);
        assert_eq!(scaler.scale().len(), 13);
    }
}

use lbw_data::{
    feature::{FeatureId, FeatureVector},
    sample::{Dataset, Sample},
};
use lbw_model::{checkpoint::Checkpoint, predictor::Predictor, scaler::Scaler};
use lbw_training::{
    seed::TrainingSeed,
    summary::TrainingSummary,
    trainer::{self, ArtifactPaths, TrainingParams},
};
use rand::{Rng, SeedableRng as _};
use rand_pcg::Pcg32;

/// 50 positives with `distanceToStumps` below 1.0 and 50 negatives at or above
/// it; every other feature is label-independent noise.
fn synthetic_dataset(rng: &mut impl Rng) -> Dataset {
    (0..100)
        .map(|i| {
            let hit = i % 2 == 0;
            let mut features: FeatureVector = [0.0; 13];
            features[FeatureId::SpinType.index()] = f32::from(rng.random_bool(0.5));
            features[FeatureId::Speed.index()] = rng.random_range(20.0..40.0);
            features[FeatureId::SpinAmount.index()] = rng.random_range(0.0..10.0);
            features[FeatureId::TimeSinceRelease.index()] = rng.random_range(0.5..1.5);
            features[FeatureId::BallPosX.index()] = rng.random_range(-1.0..1.0);
            features[FeatureId::BallPosY.index()] = rng.random_range(0.0..1.0);
            features[FeatureId::BallVelX.index()] = rng.random_range(-2.0..2.0);
            features[FeatureId::BallVelY.index()] = rng.random_range(-5.0..0.0);
            features[FeatureId::BallAngularVel.index()] = rng.random_range(0.0..100.0);
            features[FeatureId::DistanceToStumps.index()] = if hit {
                rng.random_range(0.0..1.0)
            } else {
                rng.random_range(1.0..2.0)
            };
            features[FeatureId::DistanceToPad.index()] = rng.random_range(0.0..3.0);
            features[FeatureId::HitPad.index()] = f32::from(rng.random_bool(0.5));
            features[FeatureId::ReachedPad.index()] = f32::from(rng.random_bool(0.5));
            Sample::new(features, hit)
        })
        .collect()
}

#[expect(clippy::cast_precision_loss)]
fn accuracy(predictor: &Predictor, dataset: &Dataset) -> f32 {
    let correct = dataset
        .samples()
        .iter()
        .filter(|s| predictor.predict(&s.features).unwrap().will_hit_stumps == s.will_hit_stumps)
        .count();
    correct as f32 / dataset.len() as f32
}

#[test]
fn separable_distance_is_learned() {
    let mut rng = Pcg32::seed_from_u64(2024);
    let dataset = synthetic_dataset(&mut rng);
    assert_eq!(dataset.class_balance().positives, 50);

    let dir = tempfile::tempdir().unwrap();
    let mut artifacts = ArtifactPaths::in_dir(dir.path());
    let params = TrainingParams::default();
    let outcome = trainer::train(&dataset, &params, TrainingSeed::from(7), &mut artifacts).unwrap();

    let scaler = Scaler::load(&artifacts.scaler).unwrap();
    assert_eq!(scaler, outcome.scaler);
    let best = Checkpoint::load(&artifacts.best).unwrap();
    assert_eq!(best.epoch, outcome.best_epoch);

    let last = Checkpoint::load(&artifacts.final_checkpoint).unwrap();
    assert_eq!(last.network, outcome.network);

    let predictor = Predictor::new(last.network, scaler, 0.5);
    let accuracy = accuracy(&predictor, &dataset);
    assert!(accuracy > 0.9, "accuracy at threshold 0.5: {accuracy}");

    let summary = TrainingSummary::new(&outcome, dataset.class_balance());
    assert_eq!(summary.parameter_count, 12_673);
    assert_eq!(summary.history.epoch.len(), params.epochs);
    assert_eq!(summary.feature_importance.len(), 13);
}

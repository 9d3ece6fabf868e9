use lbw_data::{
    feature::{FeatureId, FeatureVector},
    sample::{Dataset, Sample},
};
use lbw_evaluation::{
    calibration,
    charts::EvaluationCharts,
    metrics::ConfusionMatrix,
    report::{EvaluationReport, SweepReport},
    scoring::{self, PredictionRecord},
    threshold::{ThresholdSweep, default_thresholds},
};
use lbw_model::{checkpoint::Checkpoint, scaler::Scaler};
use lbw_training::{
    seed::TrainingSeed,
    trainer::{self, ArtifactPaths, TrainingParams},
};
use rand::{Rng, SeedableRng as _};
use rand_pcg::Pcg32;

/// Hits have `distanceToStumps` in `[0, 1)`, misses in `[1, 2)`.
fn synthetic_dataset(rng: &mut impl Rng, len: usize) -> Dataset {
    (0..len)
        .map(|i| {
            let hit = i % 2 == 0;
            let mut features: FeatureVector = [0.0; 13];
            for feature in FeatureId::ALL {
                features[feature.index()] = rng.random_range(-1.0..1.0);
            }
            features[FeatureId::SpinType.index()] = f32::from(rng.random_bool(0.5));
            features[FeatureId::HitPad.index()] = f32::from(rng.random_bool(0.5));
            features[FeatureId::ReachedPad.index()] = f32::from(rng.random_bool(0.5));
            features[FeatureId::DistanceToStumps.index()] = if hit {
                rng.random_range(0.0..1.0)
            } else {
                rng.random_range(1.0..2.0)
            };
            Sample::new(features, hit)
        })
        .collect()
}

fn accuracy(records: &[PredictionRecord]) -> f32 {
    ConfusionMatrix::from_records(records).accuracy().unwrap()
}

#[test]
fn trained_model_is_evaluated_from_artifacts() {
    let mut rng = Pcg32::seed_from_u64(99);
    let train_set = synthetic_dataset(&mut rng, 100);
    let test_set = synthetic_dataset(&mut rng, 60);

    let dir = tempfile::tempdir().unwrap();
    let mut artifacts = ArtifactPaths::in_dir(dir.path());
    trainer::train(
        &train_set,
        &TrainingParams::default(),
        TrainingSeed::from(11),
        &mut artifacts,
    )
    .unwrap();

    let network = Checkpoint::load(&artifacts.final_checkpoint).unwrap().network;
    let scaler = Scaler::load(&artifacts.scaler).unwrap();

    let records = scoring::score_dataset(&network, &scaler, &test_set, 0.5);
    assert_eq!(records.len(), 60);
    assert!(records.iter().all(|r| (0.0..=1.0).contains(&r.probability)));
    assert!(accuracy(&records) > 0.75, "test accuracy {}", accuracy(&records));

    // Scoring is deterministic
    assert_eq!(scoring::score_dataset(&network, &scaler, &test_set, 0.5), records);

    let sweep = ThresholdSweep::run(&records, &default_thresholds()).unwrap();
    assert_eq!(sweep.points.len(), 18);
    let at_default = sweep.points.iter().find(|p| p.threshold == 0.5).unwrap();
    assert_eq!(at_default.confusion, ConfusionMatrix::from_records(&records));
    assert!(sweep.best().accuracy >= at_default.accuracy);

    let best_threshold = sweep.best().threshold;
    let rescored = scoring::rethreshold(&records, best_threshold);
    assert_eq!(ConfusionMatrix::from_records(&rescored), sweep.best().confusion);
    assert_eq!(
        scoring::score_dataset(&network, &scaler, &test_set, best_threshold),
        rescored
    );

    let buckets = calibration::accuracy_by_confidence(&rescored);
    assert_eq!(buckets.iter().map(|b| b.count).sum::<usize>(), 60);

    let charts = EvaluationCharts::new(&rescored, best_threshold, Some(&sweep));
    let table = charts.confusion_matrix;
    assert_eq!(table.iter().flatten().sum::<usize>(), 60);
    assert_eq!(table[1][0] + table[1][1], 30);
    let json = serde_json::to_string(&charts).unwrap();
    assert!(json.contains("\"accuracy_by_confidence\""));

    let report = EvaluationReport::new(&rescored, best_threshold).to_string();
    assert!(report.contains("Detailed Classification Report:"));
    assert!(report.contains("Sample 10:"));
    let sweep_text = SweepReport(&sweep).to_string();
    assert!(sweep_text.contains(&format!("Best threshold: {best_threshold:.2}")));
}

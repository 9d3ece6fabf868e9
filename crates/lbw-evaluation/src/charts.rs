//! Chart input arrays for an external renderer.
//!
//! Nothing here draws anything. [`EvaluationCharts`] collects the arrays behind
//! each evaluation chart so that a plotting tool can render them from JSON.

use lbw_stats::histogram::Histogram;
use serde::Serialize;

use crate::{
    calibration::{self, ConfidenceBucket},
    metrics::ConfusionMatrix,
    scoring::PredictionRecord,
    threshold::ThresholdSweep,
};

/// Number of bins in the probability histograms.
pub const PROBABILITY_HISTOGRAM_BINS: usize = 20;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HistogramBinData {
    pub low: f32,
    pub high: f32,
    pub count: u64,
}

/// Predicted probability distributions split by true class.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProbabilityHistograms {
    pub actually_missed: Vec<HistogramBinData>,
    pub actually_hit: Vec<HistogramBinData>,
}

/// One point of the per-sample confidence scatter.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ScatterPoint {
    pub index: usize,
    pub probability: f32,
    pub correct: bool,
}

/// Accuracy, recall and precision against the decision threshold.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ThresholdCurve {
    pub thresholds: Vec<f32>,
    pub accuracy: Vec<f32>,
    pub recall: Vec<Option<f32>>,
    pub precision: Vec<Option<f32>>,
    pub best_threshold: f32,
}

impl From<&ThresholdSweep> for ThresholdCurve {
    fn from(sweep: &ThresholdSweep) -> Self {
        Self {
            thresholds: sweep.points.iter().map(|p| p.threshold).collect(),
            accuracy: sweep.points.iter().map(|p| p.accuracy).collect(),
            recall: sweep.points.iter().map(|p| p.recall).collect(),
            precision: sweep.points.iter().map(|p| p.precision).collect(),
            best_threshold: sweep.best().threshold,
        }
    }
}

/// Everything needed to draw the evaluation charts.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EvaluationCharts {
    pub threshold: f32,
    /// Rows are actual classes, columns predicted classes, "miss" first.
    pub confusion_matrix: [[usize; 2]; 2],
    pub probability_histograms: ProbabilityHistograms,
    pub confidence_scatter: Vec<ScatterPoint>,
    pub accuracy_by_confidence: Vec<ConfidenceBucket>,
    pub threshold_curve: Option<ThresholdCurve>,
}

impl EvaluationCharts {
    /// Builds chart data for `records` scored at `threshold`.
    #[must_use]
    pub fn new(
        records: &[PredictionRecord],
        threshold: f32,
        sweep: Option<&ThresholdSweep>,
    ) -> Self {
        let histogram = |actual: bool| {
            let values = records
                .iter()
                .filter(|r| r.actual() == actual)
                .map(|r| r.probability);
            Histogram::with_range(values, PROBABILITY_HISTOGRAM_BINS, 0.0..1.0)
                .bins
                .into_iter()
                .map(|bin| HistogramBinData {
                    low: bin.range.start,
                    high: bin.range.end,
                    count: bin.count,
                })
                .collect::<Vec<_>>()
        };

        Self {
            threshold,
            confusion_matrix: ConfusionMatrix::from_records(records).as_table(),
            probability_histograms: ProbabilityHistograms {
                actually_missed: histogram(false),
                actually_hit: histogram(true),
            },
            confidence_scatter: records
                .iter()
                .enumerate()
                .map(|(index, r)| ScatterPoint {
                    index,
                    probability: r.probability,
                    correct: r.is_correct(),
                })
                .collect(),
            accuracy_by_confidence: calibration::accuracy_by_confidence(records),
            threshold_curve: sweep.map(ThresholdCurve::from),
        }
    }
}

//! Human-readable reports.
//!
//! Each report is a plain value with a [`fmt::Display`] implementation, so the
//! binary decides where the text goes.

use std::fmt;

use lbw_data::{
    feature::{FEATURE_COUNT, FeatureId},
    sample::Dataset,
};

use crate::{
    metrics::{CLASS_NAMES, ClassMetrics, ClassificationReport, ConfusionMatrix},
    scoring::PredictionRecord,
    threshold::ThresholdSweep,
};

/// Number of records shown in the example predictions section.
pub const PREVIEW_LEN: usize = 10;

/// Size, class balance and pad contact of a dataset.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DatasetOverview {
    pub samples: usize,
    pub positives: usize,
    pub negatives: usize,
    pub hit_pad: usize,
    pub missed_pad: usize,
}

impl DatasetOverview {
    #[must_use]
    pub fn new(dataset: &Dataset) -> Self {
        let balance = dataset.class_balance();
        let pad = dataset.pad_contact();
        Self {
            samples: dataset.len(),
            positives: balance.positives,
            negatives: balance.negatives,
            hit_pad: pad.hit_pad,
            missed_pad: pad.missed_pad,
        }
    }
}

#[expect(clippy::cast_precision_loss)]
fn percent(part: usize, total: usize) -> f32 {
    if total == 0 {
        0.0
    } else {
        100.0 * part as f32 / total as f32
    }
}

impl fmt::Display for DatasetOverview {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let n = self.samples;
        writeln!(f, "Dataset Statistics:")?;
        writeln!(f, "  Total samples: {n}")?;
        writeln!(f, "  Features: {FEATURE_COUNT}")?;
        writeln!(
            f,
            "  Hit stumps: {} ({:.1}%)",
            self.positives,
            percent(self.positives, n)
        )?;
        writeln!(
            f,
            "  Missed stumps: {} ({:.1}%)",
            self.negatives,
            percent(self.negatives, n)
        )?;
        writeln!(f, "  Hit pad: {}", self.hit_pad)?;
        write!(f, "  Missed pad: {}", self.missed_pad)
    }
}

/// Results of scoring a dataset at one threshold.
#[derive(Debug, Clone, PartialEq)]
pub struct EvaluationReport {
    pub threshold: f32,
    pub confusion: ConfusionMatrix,
    pub classification: ClassificationReport,
    /// The first [`PREVIEW_LEN`] records.
    pub preview: Vec<PredictionRecord>,
}

impl EvaluationReport {
    #[must_use]
    pub fn new(records: &[PredictionRecord], threshold: f32) -> Self {
        let confusion = ConfusionMatrix::from_records(records);
        Self {
            threshold,
            confusion,
            classification: ClassificationReport::new(&confusion),
            preview: records.iter().take(PREVIEW_LEN).copied().collect(),
        }
    }
}

fn outcome(hit: bool) -> &'static str {
    if hit { "HIT STUMPS" } else { "MISS STUMPS" }
}

fn yes_no(flag: f32) -> &'static str {
    if flag >= 0.5 { "Yes" } else { "No" }
}

impl fmt::Display for EvaluationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let c = &self.confusion;
        match c.accuracy() {
            Some(accuracy) => writeln!(f, "Accuracy: {:.2}%", accuracy * 100.0)?,
            None => writeln!(f, "Accuracy: n/a")?,
        }
        writeln!(f, "Threshold: {}", self.threshold)?;
        writeln!(f)?;

        writeln!(f, "Confusion Matrix:")?;
        writeln!(f, "  True Negatives (Correct MISS):  {}", c.true_negative)?;
        writeln!(f, "  False Positives (Wrong OUT):    {}", c.false_positive)?;
        writeln!(f, "  False Negatives (Wrong MISS):   {}", c.false_negative)?;
        writeln!(f, "  True Positives (Correct OUT):   {}", c.true_positive)?;
        writeln!(f)?;

        match c.recall() {
            Some(recall) => writeln!(f, "Recall (catches actual hits): {:.2}%", recall * 100.0)?,
            None => writeln!(f, "Recall (catches actual hits): n/a")?,
        }
        match c.precision() {
            Some(precision) => writeln!(
                f,
                "Precision (correct when predicting hit): {:.2}%",
                precision * 100.0
            )?,
            None => writeln!(f, "Precision (correct when predicting hit): n/a")?,
        }
        writeln!(f)?;

        writeln!(f, "Detailed Classification Report:")?;
        write!(f, "{}", ClassificationTable(&self.classification))?;

        if !self.preview.is_empty() {
            writeln!(f)?;
            writeln!(f, "Example Predictions:")?;
        }
        for (i, record) in self.preview.iter().enumerate() {
            let s = &record.sample;
            let spin = if s.feature(FeatureId::SpinType) >= 0.5 {
                "TopSpin"
            } else {
                "BackSpin"
            };
            writeln!(f)?;
            writeln!(f, "Sample {}:", i + 1)?;
            writeln!(f, "  Spin: {spin}")?;
            writeln!(f, "  Speed: {:.2}x", s.feature(FeatureId::Speed))?;
            writeln!(
                f,
                "  Ball Position: ({:.2}, {:.2})",
                s.feature(FeatureId::BallPosX),
                s.feature(FeatureId::BallPosY)
            )?;
            writeln!(f, "  Hit Pad: {}", yes_no(s.feature(FeatureId::HitPad)))?;
            writeln!(f, "  Reached Pad: {}", yes_no(s.feature(FeatureId::ReachedPad)))?;
            writeln!(
                f,
                "  Predicted Probability: {:.2}%",
                record.probability * 100.0
            )?;
            writeln!(f, "  Prediction: {}", outcome(record.predicted))?;
            writeln!(f, "  Actual: {}", outcome(record.actual()))?;
            writeln!(
                f,
                "  {}",
                if record.is_correct() {
                    "✓ CORRECT"
                } else {
                    "✗ WRONG"
                }
            )?;
        }
        Ok(())
    }
}

struct ClassificationTable<'a>(&'a ClassificationReport);

impl fmt::Display for ClassificationTable<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let report = self.0;
        let row = |f: &mut fmt::Formatter<'_>, name: &str, m: &ClassMetrics| {
            writeln!(
                f,
                "{name:>12} {:>9.2} {:>9.2} {:>9.2} {:>9}",
                m.precision, m.recall, m.f1, m.support
            )
        };

        writeln!(
            f,
            "{:>12} {:>9} {:>9} {:>9} {:>9}",
            "", "precision", "recall", "f1-score", "support"
        )?;
        for (&name, metrics) in CLASS_NAMES.iter().zip(&report.classes) {
            row(f, name, metrics)?;
        }
        writeln!(f)?;
        writeln!(
            f,
            "{:>12} {:>9} {:>9} {:>9.2} {:>9}",
            "accuracy", "", "", report.accuracy, report.macro_avg.support
        )?;
        row(f, "macro avg", &report.macro_avg)?;
        row(f, "weighted avg", &report.weighted_avg)
    }
}

/// Metrics per candidate threshold and the recommendation.
#[derive(Debug, Clone, Copy)]
pub struct SweepReport<'a>(pub &'a ThresholdSweep);

impl fmt::Display for SweepReport<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let fmt_opt = |v: Option<f32>| v.map_or_else(|| "n/a".to_owned(), |v| format!("{v:.4}"));

        writeln!(
            f,
            "{:>9} {:>9} {:>9} {:>9}",
            "threshold", "accuracy", "recall", "precision"
        )?;
        for point in &self.0.points {
            writeln!(
                f,
                "{:>9.2} {:>9.4} {:>9} {:>9}",
                point.threshold,
                point.accuracy,
                fmt_opt(point.recall),
                fmt_opt(point.precision)
            )?;
        }
        let best = self.0.best();
        writeln!(f)?;
        writeln!(f, "Best threshold: {:.2}", best.threshold)?;
        write!(f, "Best accuracy: {:.2}%", best.accuracy * 100.0)
    }
}

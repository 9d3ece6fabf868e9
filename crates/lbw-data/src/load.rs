//! CSV and JSON dataset loaders.
//!
//! Both loaders resolve features by name, never by position, and fail before
//! returning any sample if a required column or key is missing.
//!
//! # CSV
//!
//! A header row naming at least the 13 feature columns and
//! [`LABEL_COLUMN`]. Header names are trimmed, so `" reachedPad"` matches
//! `reachedPad`. Extra columns are ignored and column order is free.
//!
//! # JSON
//!
//! ```json
//! { "examples": [ { "spinType": 0, "speed": 1.2, ..., "willHitStumps": 1 } ] }
//! ```
//!
//! Boolean values are accepted for the flag features and the label.

use std::{
    fs::File,
    io::BufReader,
    path::{Path, PathBuf},
};

use serde_json::Value;

use crate::{
    error::{LoadError, SchemaError},
    feature::{FEATURE_COUNT, FeatureId, LABEL_COLUMN},
    sample::{Dataset, Sample},
};

/// Input file format.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputFormat {
    Csv,
    Json,
}

impl InputFormat {
    /// Guesses the format from the file extension; anything but `.json` is CSV.
    #[must_use]
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|e| e.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("json") => Self::Json,
            _ => Self::Csv,
        }
    }
}

/// Loads a dataset, choosing the parser from the file extension.
pub fn load_dataset<P>(path: P) -> Result<Dataset, LoadError>
where
    P: AsRef<Path>,
{
    let path = path.as_ref();
    match InputFormat::from_path(path) {
        InputFormat::Csv => load_csv(path),
        InputFormat::Json => load_json(path),
    }
}

/// Loads a dataset from a CSV export.
pub fn load_csv<P>(path: P) -> Result<Dataset, LoadError>
where
    P: AsRef<Path>,
{
    let path = path.as_ref();
    let file = open(path)?;
    let csv_error = |source| LoadError::Csv {
        path: path.to_owned(),
        source,
    };

    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::All)
        .from_reader(BufReader::new(file));
    let headers = reader.headers().map_err(csv_error)?.clone();
    let columns = CsvColumns::resolve(&headers).map_err(|source| LoadError::Schema {
        path: path.to_owned(),
        source,
    })?;

    let mut samples = vec![];
    for (i, record) in reader.records().enumerate() {
        let record = record.map_err(csv_error)?;
        let record_no = i + 1;
        let field = |column: usize| record.get(column).unwrap_or_default();

        let mut features = [0.0; FEATURE_COUNT];
        for (feature, &column) in FeatureId::ALL.iter().zip(&columns.features) {
            let raw = field(column);
            features[feature.index()] = parse_number(raw)
                .ok_or_else(|| invalid_value(path, record_no, feature.name(), raw))?;
        }
        let raw_label = field(columns.label);
        let will_hit_stumps = parse_label(raw_label)
            .ok_or_else(|| invalid_value(path, record_no, LABEL_COLUMN, raw_label))?;

        samples.push(Sample::new(features, will_hit_stumps));
    }

    finish(path, samples)
}

/// Loads a dataset from a JSON export with a top-level `examples` list.
pub fn load_json<P>(path: P) -> Result<Dataset, LoadError>
where
    P: AsRef<Path>,
{
    let path = path.as_ref();
    let file = open(path)?;
    let document: Value =
        serde_json::from_reader(BufReader::new(file)).map_err(|source| LoadError::Json {
            path: path.to_owned(),
            source,
        })?;
    let schema_error = |source| LoadError::Schema {
        path: path.to_owned(),
        source,
    };

    let examples = document
        .get("examples")
        .and_then(Value::as_array)
        .ok_or_else(|| schema_error(SchemaError::MissingExamples))?;

    let mut samples = Vec::with_capacity(examples.len());
    for (index, example) in examples.iter().enumerate() {
        let lookup = |key: &'static str, alias: Option<&'static str>| {
            example
                .get(key)
                .or_else(|| alias.and_then(|alias| example.get(alias)))
                .ok_or_else(|| schema_error(SchemaError::MissingKey { index, key }))
        };

        let mut features = [0.0; FEATURE_COUNT];
        for feature in FeatureId::ALL {
            let value = lookup(feature.name(), feature.json_alias())?;
            features[feature.index()] = json_number(value)
                .ok_or_else(|| invalid_value(path, index + 1, feature.name(), &value.to_string()))?;
        }
        let value = lookup(LABEL_COLUMN, None)?;
        let will_hit_stumps = json_number(value)
            .and_then(label_from_number)
            .ok_or_else(|| invalid_value(path, index + 1, LABEL_COLUMN, &value.to_string()))?;

        samples.push(Sample::new(features, will_hit_stumps));
    }

    finish(path, samples)
}

fn open(path: &Path) -> Result<File, LoadError> {
    if !path.exists() {
        return Err(LoadError::MissingInput {
            path: path.to_owned(),
        });
    }
    File::open(path).map_err(|source| LoadError::Io {
        path: path.to_owned(),
        source,
    })
}

fn finish(path: &Path, samples: Vec<Sample>) -> Result<Dataset, LoadError> {
    if samples.is_empty() {
        return Err(LoadError::Empty {
            path: path.to_owned(),
        });
    }
    tracing::debug!(path = %path.display(), samples = samples.len(), "dataset loaded");
    Ok(Dataset::new(samples))
}

fn invalid_value(path: &Path, record: usize, column: &'static str, value: &str) -> LoadError {
    LoadError::InvalidValue {
        path: PathBuf::from(path),
        record,
        column,
        value: value.to_owned(),
    }
}

/// Column positions of the required fields in a CSV header.
#[derive(Debug)]
struct CsvColumns {
    features: [usize; FEATURE_COUNT],
    label: usize,
}

impl CsvColumns {
    fn resolve(headers: &csv::StringRecord) -> Result<Self, SchemaError> {
        let find = |column: &'static str| {
            headers
                .iter()
                .position(|h| h.trim() == column)
                .ok_or_else(|| SchemaError::MissingColumn {
                    column,
                    available: headers.iter().map(|h| h.trim().to_owned()).collect(),
                })
        };

        let mut features = [0; FEATURE_COUNT];
        for feature in FeatureId::ALL {
            features[feature.index()] = find(feature.name())?;
        }
        let label = find(LABEL_COLUMN)?;
        Ok(Self { features, label })
    }
}

fn parse_number(raw: &str) -> Option<f32> {
    match raw.to_ascii_lowercase().as_str() {
        "true" => Some(1.0),
        "false" => Some(0.0),
        s => s.parse::<f32>().ok().filter(|v| v.is_finite()),
    }
}

fn parse_label(raw: &str) -> Option<bool> {
    parse_number(raw).and_then(label_from_number)
}

fn label_from_number(value: f32) -> Option<bool> {
    if value == 0.0 {
        Some(false)
    } else if value == 1.0 {
        Some(true)
    } else {
        None
    }
}

#[expect(clippy::cast_possible_truncation)]
fn json_number(value: &Value) -> Option<f32> {
    match value {
        Value::Bool(b) => Some(if *b { 1.0 } else { 0.0 }),
        Value::Number(n) => n.as_f64().map(|v| v as f32).filter(|v| v.is_finite()),
        _ => None,
    }
}

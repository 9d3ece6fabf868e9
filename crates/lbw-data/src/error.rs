use std::{io, path::PathBuf};

/// A required feature or label is absent from the input.
#[derive(Debug, derive_more::Display, derive_more::Error)]
pub enum SchemaError {
    #[display("required column '{column}' not found (available: {})", available.join(", "))]
    MissingColumn {
        column: &'static str,
        available: Vec<String>,
    },
    #[display("example #{index} has no key '{key}'")]
    MissingKey { index: usize, key: &'static str },
    #[display("top-level 'examples' list not found")]
    MissingExamples,
}

/// Errors raised while loading a dataset.
///
/// Every variant carries the path of the file being read so that the message
/// is actionable on its own.
#[derive(Debug, derive_more::Display, derive_more::Error)]
pub enum LoadError {
    #[display("input file not found: {}", path.display())]
    MissingInput { path: PathBuf },
    #[display("failed to read {}", path.display())]
    Io { path: PathBuf, source: io::Error },
    #[display("failed to parse CSV file {}", path.display())]
    Csv { path: PathBuf, source: csv::Error },
    #[display("failed to parse JSON file {}", path.display())]
    Json {
        path: PathBuf,
        source: serde_json::Error,
    },
    #[display("schema mismatch in {}", path.display())]
    Schema { path: PathBuf, source: SchemaError },
    #[display("invalid value {value:?} for '{column}' in record #{record} of {}", path.display())]
    InvalidValue {
        path: PathBuf,
        record: usize,
        column: &'static str,
        value: String,
    },
    #[display("{} contains no samples", path.display())]
    Empty { path: PathBuf },
}

impl LoadError {
    /// Returns `true` if the error was caused by a missing column or key.
    #[must_use]
    pub fn is_schema_error(&self) -> bool {
        matches!(self, Self::Schema { .. })
    }
}

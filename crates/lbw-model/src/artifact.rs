//! JSON persistence shared by the scaler and checkpoint artifacts.
//!
//! Writes go to a sibling temporary file which is renamed over the target once
//! fully flushed, so an interrupted write never leaves a truncated artifact
//! behind.

use std::{
    fs::{self, File},
    io::{self, BufReader, BufWriter, Write as _},
    path::{Path, PathBuf},
};

use serde::{Serialize, de::DeserializeOwned};

use crate::network::ShapeError;

/// Failure to persist or restore an artifact.
#[derive(Debug, derive_more::Display, derive_more::Error)]
pub enum ArtifactError {
    #[display("failed to write {kind} to {}", path.display())]
    Write {
        kind: &'static str,
        path: PathBuf,
        source: io::Error,
    },
    #[display("failed to serialize {kind} to {}", path.display())]
    Serialize {
        kind: &'static str,
        path: PathBuf,
        source: serde_json::Error,
    },
    #[display("failed to open {kind} file: {}", path.display())]
    Read {
        kind: &'static str,
        path: PathBuf,
        source: io::Error,
    },
    #[display("failed to parse {kind} JSON file: {}", path.display())]
    Parse {
        kind: &'static str,
        path: PathBuf,
        source: serde_json::Error,
    },
    #[display("{kind} file {} has format version {found}, expected {expected}", path.display())]
    Version {
        kind: &'static str,
        path: PathBuf,
        expected: u32,
        found: u32,
    },
    #[display("{kind} file {} does not match the model topology", path.display())]
    Shape {
        kind: &'static str,
        path: PathBuf,
        source: ShapeError,
    },
    #[display("{kind} file {} is inconsistent: {reason}", path.display())]
    Invalid {
        kind: &'static str,
        path: PathBuf,
        reason: String,
    },
}

/// Serializes `value` as pretty JSON to `path`, replacing any existing file.
pub fn write_json<T>(kind: &'static str, path: &Path, value: &T) -> Result<(), ArtifactError>
where
    T: Serialize,
{
    let write_err = |source| ArtifactError::Write {
        kind,
        path: path.to_owned(),
        source,
    };

    let mut tmp_name = path.file_name().unwrap_or_default().to_owned();
    tmp_name.push(".tmp");
    let tmp_path = path.with_file_name(tmp_name);

    let file = File::create(&tmp_path).map_err(write_err)?;
    let mut writer = BufWriter::new(file);
    serde_json::to_writer_pretty(&mut writer, value).map_err(|source| {
        ArtifactError::Serialize {
            kind,
            path: path.to_owned(),
            source,
        }
    })?;
    writeln!(writer).map_err(write_err)?;
    writer.flush().map_err(write_err)?;
    drop(writer);

    fs::rename(&tmp_path, path).map_err(write_err)?;
    tracing::debug!(kind, path = %path.display(), "wrote artifact");
    Ok(())
}

/// Reads a JSON artifact from `path`.
pub fn read_json<T>(kind: &'static str, path: &Path) -> Result<T, ArtifactError>
where
    T: DeserializeOwned,
{
    let file = File::open(path).map_err(|source| ArtifactError::Read {
        kind,
        path: path.to_owned(),
        source,
    })?;
    serde_json::from_reader(BufReader::new(file)).map_err(|source| ArtifactError::Parse {
        kind,
        path: path.to_owned(),
        source,
    })
}

/// Rejects an artifact whose `format_version` differs from `expected`.
pub(crate) fn check_version(
    kind: &'static str,
    path: &Path,
    expected: u32,
    found: u32,
) -> Result<(), ArtifactError> {
    if expected == found {
        Ok(())
    } else {
        Err(ArtifactError::Version {
            kind,
            path: path.to_owned(),
            expected,
            found,
        })
    }
}

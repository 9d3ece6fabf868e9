use std::{
    fs::File,
    io::{self, BufWriter, StdoutLock, Write as _},
    path::{Path, PathBuf},
};

use anyhow::Context;
use lbw_data::{load, sample::Dataset};
use lbw_evaluation::report::DatasetOverview;

const RULE_WIDTH: usize = 60;

/// Destination of a JSON document: a file when a path is given, stdout
/// otherwise.
#[derive(Debug)]
pub enum Output {
    Stdout(StdoutLock<'static>),
    File { writer: BufWriter<File>, path: PathBuf },
}

impl Output {
    /// Serializes `value` as pretty JSON to `path`, or to stdout if `None`.
    pub fn save_json<T>(value: &T, path: Option<PathBuf>) -> anyhow::Result<()>
    where
        T: serde::Serialize,
    {
        let mut output = match path {
            Some(path) => {
                let file = File::create(&path).with_context(|| {
                    format!("Failed to create output file: {}", path.display())
                })?;
                Output::File {
                    writer: BufWriter::new(file),
                    path,
                }
            }
            None => Output::Stdout(io::stdout().lock()),
        };

        serde_json::to_writer_pretty(&mut output, value)
            .with_context(|| format!("Failed to write JSON to {}", output.name()))?;
        writeln!(output)
            .and_then(|()| output.flush())
            .with_context(|| format!("Failed to finish writing {}", output.name()))?;
        if let Output::File { path, .. } = &output {
            tracing::debug!(path = %path.display(), "wrote JSON output");
        }
        Ok(())
    }

    fn name(&self) -> String {
        match self {
            Output::Stdout(_) => "stdout".to_owned(),
            Output::File { path, .. } => path.display().to_string(),
        }
    }
}

impl io::Write for Output {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        match self {
            Output::Stdout(writer) => writer.write(buf),
            Output::File { writer, .. } => writer.write(buf),
        }
    }

    fn flush(&mut self) -> io::Result<()> {
        match self {
            Output::Stdout(writer) => writer.flush(),
            Output::File { writer, .. } => writer.flush(),
        }
    }
}

/// Loads a labeled dataset and prints its statistics.
///
/// # Arguments
///
/// * `data_kind` - Human-readable name of the dataset, used in messages
/// * `path` - CSV or JSON file
///
/// # Errors
///
/// Returns error if the file cannot be read or does not match the feature
/// contract, or if it contains no samples
pub fn load_dataset<P>(data_kind: &str, path: P) -> anyhow::Result<Dataset>
where
    P: AsRef<Path>,
{
    let path = path.as_ref();
    let dataset = load::load_dataset(path)
        .with_context(|| format!("Failed to load {data_kind} data: {}", path.display()))?;
    anyhow::ensure!(
        !dataset.is_empty(),
        "{data_kind} data contains no samples: {}",
        path.display()
    );

    println!("{}", DatasetOverview::new(&dataset));
    if let Some(warning) = dataset.class_imbalance() {
        tracing::warn!("{warning}");
    }
    Ok(dataset)
}

/// Prints a section title framed by horizontal rules.
pub fn print_heading(title: &str) {
    let rule = "=".repeat(RULE_WIDTH);
    println!();
    println!("{rule}");
    println!("{title}");
    println!("{rule}");
}

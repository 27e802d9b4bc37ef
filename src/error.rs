use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Terminal failures of the load and validate stages.
///
/// Any of these stops the current command before aggregation runs.
#[derive(Debug, Error)]
pub enum ReportError {
    #[error("source file '{}' was not found", path.display())]
    SourceNotFound { path: PathBuf },
    #[error("source file '{}' is not tabular: no header row", path.display())]
    NotTabular { path: PathBuf },
    #[error(
        "required columns not found: {}; available columns: {}",
        missing.join(", "),
        available.join(", ")
    )]
    MissingColumns {
        missing: Vec<String>,
        available: Vec<String>,
    },
    #[error("malformed CSV: {0}")]
    Csv(#[from] csv::Error),
    #[error(transparent)]
    Io(#[from] io::Error),
}

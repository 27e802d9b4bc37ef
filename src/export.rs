//! Destinations for the export batch.

use std::path::PathBuf;

use anyhow::Result;
use async_trait::async_trait;

use crate::output::append_rows;

/// Somewhere justified rows can be appended to.
#[async_trait]
pub trait RowSink: Send + Sync {
    /// Human-readable target, used in log lines and notices.
    fn describe(&self) -> String;

    /// Appends `rows` (already in `header` order) and returns how many
    /// rows the destination reports as written.
    async fn append_rows(&self, header: &[&str], rows: &[Vec<String>]) -> Result<usize>;
}

/// Appends to a local CSV file, writing the header only for a new file.
pub struct CsvSink {
    path: PathBuf,
}

impl CsvSink {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait]
impl RowSink for CsvSink {
    fn describe(&self) -> String {
        format!("CSV file '{}'", self.path.display())
    }

    async fn append_rows(&self, header: &[&str], rows: &[Vec<String>]) -> Result<usize> {
        append_rows(&self.path, header, rows)
    }
}

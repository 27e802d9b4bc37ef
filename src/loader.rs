//! CSV loading and structural validation of the shipment export.

use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};

use csv::{ReaderBuilder, StringRecord};
use tracing::debug;

use crate::error::ReportError;
use crate::record::{REQUIRED_COLUMNS, RawShipment};

/// Default export file name, looked up in the working directory.
pub const DEFAULT_SOURCE: &str = "Data_Suit_RegionalCONO_CSV.csv";

/// The source file as read from disk: a header row plus untyped records.
#[derive(Debug, Clone)]
pub struct SourceTable {
    pub path: PathBuf,
    pub headers: StringRecord,
    pub rows: Vec<StringRecord>,
}

impl SourceTable {
    /// Reads every record from `reader`. `path` is only used in messages.
    pub fn from_reader<R: Read>(path: impl Into<PathBuf>, reader: R) -> Result<Self, ReportError> {
        let mut rdr = ReaderBuilder::new().from_reader(reader);
        let headers = rdr.headers()?.clone();
        let rows = rdr.records().collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            path: path.into(),
            headers,
            rows,
        })
    }

    pub fn column_names(&self) -> Vec<String> {
        self.headers.iter().map(str::to_string).collect()
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.headers.iter().any(|h| h == name)
    }

    /// Fails when the table has no header row or lacks a required column.
    pub fn validate(&self) -> Result<(), ReportError> {
        if self.headers.iter().all(|h| h.trim().is_empty()) {
            return Err(ReportError::NotTabular {
                path: self.path.clone(),
            });
        }

        let missing: Vec<String> = REQUIRED_COLUMNS
            .iter()
            .map(|c| c.header())
            .filter(|h| !self.has_column(h))
            .map(str::to_string)
            .collect();

        if !missing.is_empty() {
            return Err(ReportError::MissingColumns {
                missing,
                available: self.column_names(),
            });
        }

        Ok(())
    }

    /// Deserializes every row into a [`RawShipment`]. Call after [`validate`](Self::validate).
    pub fn to_raw_shipments(&self) -> Result<Vec<RawShipment>, ReportError> {
        self.rows
            .iter()
            .map(|row| row.deserialize(Some(&self.headers)).map_err(ReportError::from))
            .collect()
    }
}

/// Opens the CSV at `path`.
///
/// # Errors
///
/// [`ReportError::SourceNotFound`] when the file does not exist, or
/// [`ReportError::Csv`] when a row cannot be read.
#[tracing::instrument(skip_all, fields(path = %path.display()))]
pub fn load_csv(path: &Path) -> Result<SourceTable, ReportError> {
    if !path.is_file() {
        return Err(ReportError::SourceNotFound {
            path: path.to_path_buf(),
        });
    }

    let table = SourceTable::from_reader(path, File::open(path)?)?;
    debug!(
        columns = table.headers.len(),
        rows = table.rows.len(),
        "Source CSV loaded"
    );
    Ok(table)
}

/// Load and validate in one step, returning typed rows.
pub fn load_shipments(path: &Path) -> Result<Vec<RawShipment>, ReportError> {
    let table = load_csv(path)?;
    table.validate()?;
    table.to_raw_shipments()
}

//! In-memory state for one reporting session and the actions that change it.
//!
//! A [`Session`] is opened from the source CSV (load, validate, clean), then
//! driven by [`Action`]s: choosing stations rebuilds the editable view,
//! applying edits validates them against the column policies. [`Session::save`]
//! merges the justified rows and hands them to a [`RowSink`].

use std::collections::BTreeSet;
use std::fmt;
use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use tracing::{error, info, warn};

use crate::annotate::{
    EditableGrid, MergeOutcome, StationSelection, export_rows, filter_shipments, merge_for_save,
    sanitize_annotations, validate_edits,
};
use crate::cleaner::clean;
use crate::error::ReportError;
use crate::export::RowSink;
use crate::loader::{SourceTable, load_csv};
use crate::pivot::{AgeingPivot, GRAND_TOTAL};
use crate::record::{Column, Shipment, export_headers};
use crate::vocabulary::Vocabulary;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Level {
    Success,
    Info,
    Warning,
    Error,
}

/// A message for the operator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub level: Level,
    pub message: String,
}

impl Notice {
    pub fn success(message: impl Into<String>) -> Self {
        Self::new(Level::Success, message)
    }

    pub fn info(message: impl Into<String>) -> Self {
        Self::new(Level::Info, message)
    }

    pub fn warning(message: impl Into<String>) -> Self {
        Self::new(Level::Warning, message)
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self::new(Level::Error, message)
    }

    fn new(level: Level, message: impl Into<String>) -> Self {
        Self {
            level,
            message: message.into(),
        }
    }

    pub fn is_error(&self) -> bool {
        self.level == Level::Error
    }

    /// Writes the notice to the log at the matching level.
    pub fn emit(&self) {
        match self.level {
            Level::Success | Level::Info => info!(level = ?self.level, "{}", self.message),
            Level::Warning => warn!("{}", self.message),
            Level::Error => error!("{}", self.message),
        }
    }
}

impl fmt::Display for Notice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{:?}] {}", self.level, self.message)
    }
}

/// Operator actions that change the session.
#[derive(Debug, Clone)]
pub enum Action {
    /// Rebuilds the editable view for these stations. Pending edits are discarded.
    SelectStations(StationSelection),
    /// Validates an edited copy of the view and keeps the rows that pass.
    ApplyEdits(EditableGrid),
}

pub struct Session {
    source: PathBuf,
    shipments: Vec<Shipment>,
    removed: usize,
    vocabulary: Vocabulary,
    selection: StationSelection,
    view: EditableGrid,
}

impl Session {
    /// Loads, validates, and cleans the CSV at `path`.
    ///
    /// The returned notices report the load and any rows dropped while
    /// cleaning.
    pub fn open(path: &Path, today: NaiveDate) -> Result<(Self, Vec<Notice>), ReportError> {
        let table = load_csv(path)?;
        Self::from_table(&table, today)
    }

    pub fn from_table(
        table: &SourceTable,
        today: NaiveDate,
    ) -> Result<(Self, Vec<Notice>), ReportError> {
        table.validate()?;
        let raw = table.to_raw_shipments()?;
        let cleaned = clean(&raw);

        let mut notices = vec![Notice::success(format!(
            "File '{}' loaded successfully ({} rows)",
            table.path.display(),
            raw.len()
        ))];
        if cleaned.removed > 0 {
            notices.push(Notice::warning(format!(
                "{} row{} removed: non-numeric values in '{}'",
                cleaned.removed,
                if cleaned.removed == 1 { "" } else { "s" },
                Column::AgeingLastStatus.header()
            )));
        }

        let vocabulary = Vocabulary::for_date(today);
        let mut shipments = cleaned.shipments;
        notices.extend(
            sanitize_annotations(&mut shipments, &vocabulary)
                .iter()
                .map(|v| Notice::warning(format!("Source value cleared: {v}"))),
        );

        if shipments.iter().any(|s| s.station_name == GRAND_TOTAL) {
            notices.push(Notice::warning(format!(
                "A station is named '{GRAND_TOTAL}'; the overview's totals row is the last row"
            )));
        }

        let view = EditableGrid::from_shipments(&shipments);
        let session = Session {
            source: table.path.clone(),
            shipments,
            removed: cleaned.removed,
            vocabulary,
            selection: StationSelection::All,
            view,
        };

        Ok((session, notices))
    }

    pub fn source(&self) -> &Path {
        &self.source
    }

    pub fn shipments(&self) -> &[Shipment] {
        &self.shipments
    }

    /// Rows dropped by the cleaner.
    pub fn removed(&self) -> usize {
        self.removed
    }

    pub fn vocabulary(&self) -> &Vocabulary {
        &self.vocabulary
    }

    pub fn selection(&self) -> &StationSelection {
        &self.selection
    }

    pub fn view(&self) -> &EditableGrid {
        &self.view
    }

    pub fn pivot(&self) -> AgeingPivot {
        AgeingPivot::from_shipments(&self.shipments)
    }

    /// The first `n` cleaned shipments.
    pub fn head(&self, n: usize) -> &[Shipment] {
        &self.shipments[..n.min(self.shipments.len())]
    }

    /// Distinct station names, sorted, as offered by the station picker.
    pub fn stations(&self) -> Vec<String> {
        self.shipments
            .iter()
            .map(|s| s.station_name.clone())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }

    pub fn dispatch(&mut self, action: Action) -> Vec<Notice> {
        match action {
            Action::SelectStations(selection) => {
                let filtered = filter_shipments(&self.shipments, &selection);
                self.view = EditableGrid::from_shipments(&filtered);
                self.selection = selection;
                vec![Notice::info(format!(
                    "{} shipment{} in view",
                    self.view.len(),
                    if self.view.len() == 1 { "" } else { "s" }
                ))]
            }
            Action::ApplyEdits(mut edited) => {
                edited.ensure_annotation_columns();
                let review = validate_edits(&self.view, &edited, &self.vocabulary);

                let mut notices: Vec<Notice> = review
                    .violations
                    .iter()
                    .map(|v| Notice::warning(format!("Edit rejected: {v}")))
                    .collect();

                let applied = review
                    .accepted
                    .iter()
                    .filter(|(index, row)| self.view.apply_annotations(*index, row))
                    .count();
                notices.push(Notice::info(format!("{applied} edited rows accepted")));
                notices
            }
        }
    }

    /// Merges the justified rows of the current view onto their source records.
    pub fn export_batch(&self) -> MergeOutcome {
        let in_view = filter_shipments(&self.shipments, &self.selection);
        merge_for_save(&self.view, &in_view)
    }

    /// Appends the export batch to `sink`.
    ///
    /// An empty batch makes no call to the sink. Sink failures are turned
    /// into an error notice; nothing is retried.
    pub async fn save<S: RowSink + ?Sized>(&self, sink: &S) -> Vec<Notice> {
        let batch = self.export_batch();
        let mut notices = merge_notices(&batch);

        if batch.is_empty() {
            notices.push(Notice::info(
                "No rows with a justification to save; nothing was sent",
            ));
            return notices;
        }

        let header = export_headers();
        let rows = export_rows(&batch.shipments);
        match sink.append_rows(&header, &rows).await {
            Ok(appended) => notices.push(Notice::success(format!(
                "{appended} rows saved to {}",
                sink.describe()
            ))),
            Err(e) => notices.push(Notice::error(format!(
                "Failed to save to {}: {e:#}",
                sink.describe()
            ))),
        }
        notices
    }
}

/// Warnings for the rows a merge left out.
pub fn merge_notices(batch: &MergeOutcome) -> Vec<Notice> {
    batch
        .unmatched
        .iter()
        .map(|id| {
            Notice::warning(format!(
                "Shipment '{id}' has no matching source record and was left out"
            ))
        })
        .collect()
}

//! Station filtering, the editable grid, edit policy and merge-for-save.
//!
//! The flow is: filter the cleaned shipments by station, project them into an
//! [`EditableGrid`], let the operator edit it, validate the edits against
//! [`policy`], and finally merge justified rows back onto their full
//! source records for export.

pub mod grid;
pub mod merge;
pub mod policy;
pub mod selection;

pub use grid::{EditableGrid, GridRow, VIEW_COLUMNS};
pub use merge::{MergeOutcome, export_rows, merge_for_save};
pub use policy::{
    ColumnPolicy, EditReview, PolicyViolation, ViolationKind, sanitize_annotations, validate_edits,
};
pub use selection::{ALL_STATIONS, StationSelection, filter_shipments};

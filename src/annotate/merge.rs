use std::collections::HashMap;

use tracing::debug;

use crate::annotate::grid::EditableGrid;
use crate::record::{Annotation, Column, Shipment, parse_check};

/// Export-ready shipments plus the rows that could not be merged.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MergeOutcome {
    pub shipments: Vec<Shipment>,
    /// Justified rows with no source record to pair with.
    pub unmatched: Vec<String>,
}

impl MergeOutcome {
    pub fn is_empty(&self) -> bool {
        self.shipments.is_empty()
    }
}

/// Builds the export batch from an edited grid.
///
/// Only rows with a non-blank justification are taken. The n-th grid row
/// carrying a shipment id is paired with the n-th source record carrying
/// that id, so `originals` must be the records the grid was built from, in
/// the same order. The four annotation values are copied onto a clone of
/// the paired record; every other field keeps its source value.
pub fn merge_for_save(edited: &EditableGrid, originals: &[Shipment]) -> MergeOutcome {
    let mut outcome = MergeOutcome::default();

    let mut by_id: HashMap<&str, Vec<&Shipment>> = HashMap::new();
    for shipment in originals {
        by_id.entry(shipment.shipment_id()).or_default().push(shipment);
    }

    for (row, occurrence) in edited.rows().iter().zip(edited.occurrences()) {
        if row.get(Column::Justification).trim().is_empty() {
            continue;
        }

        let id = row.shipment_id();
        let Some(source) = by_id.get(id).and_then(|records| records.get(occurrence)) else {
            outcome.unmatched.push(id.to_string());
            continue;
        };

        let mut merged = (*source).clone();
        merged.annotation = Annotation {
            check: parse_check(row.get(Column::Check)).unwrap_or(false),
            justification: row.get(Column::Justification).to_string(),
            loss_reason: row.get(Column::LossReason).to_string(),
            notes: row.get(Column::Notes).to_string(),
        };
        outcome.shipments.push(merged);
    }

    debug!(
        merged = outcome.shipments.len(),
        unmatched = outcome.unmatched.len(),
        "Export batch merged"
    );

    outcome
}

/// Lays merged shipments out in the sheet's column order.
pub fn export_rows(shipments: &[Shipment]) -> Vec<Vec<String>> {
    shipments.iter().map(Shipment::to_export_row).collect()
}

use std::collections::{BTreeMap, HashMap};
use std::io::{Read, Write};

use anyhow::{Context, Result};
use csv::{ReaderBuilder, WriterBuilder};
use tracing::debug;

use crate::record::{ANNOTATION_COLUMNS, Column, Shipment};

/// Source columns shown next to the annotation columns.
pub const VIEW_COLUMNS: [Column; 7] = [
    Column::StationName,
    Column::ShipmentId,
    Column::DriverName,
    Column::TrackingStatus,
    Column::BuyerCity,
    Column::AgeingLastStatus,
    Column::Cogs,
];

/// One row of the editable grid.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GridRow {
    cells: BTreeMap<Column, String>,
}

impl GridRow {
    /// Cell text; a column the row does not carry reads as empty.
    pub fn get(&self, column: Column) -> &str {
        self.cells.get(&column).map(String::as_str).unwrap_or("")
    }

    pub fn set(&mut self, column: Column, value: impl Into<String>) {
        self.cells.insert(column, value.into());
    }

    pub fn shipment_id(&self) -> &str {
        self.get(Column::ShipmentId)
    }
}

/// The filtered view an operator edits: typed columns plus text cells.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EditableGrid {
    columns: Vec<Column>,
    rows: Vec<GridRow>,
}

impl EditableGrid {
    /// Projects shipments onto [`VIEW_COLUMNS`] followed by the annotation columns.
    pub fn from_shipments(shipments: &[Shipment]) -> Self {
        let columns: Vec<Column> = VIEW_COLUMNS
            .iter()
            .chain(ANNOTATION_COLUMNS.iter())
            .copied()
            .collect();

        let rows = shipments
            .iter()
            .map(|s| GridRow {
                cells: columns.iter().map(|c| (*c, s.value(*c))).collect(),
            })
            .collect();

        Self { columns, rows }
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn rows(&self) -> &[GridRow] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn has_column(&self, column: Column) -> bool {
        self.columns.contains(&column)
    }

    /// First row carrying `shipment_id`.
    pub fn find(&self, shipment_id: &str) -> Option<&GridRow> {
        self.rows.iter().find(|r| r.shipment_id() == shipment_id)
    }

    /// Appends every missing annotation column, with empty cells.
    ///
    /// Safe to call repeatedly; returns how many columns were added.
    pub fn ensure_annotation_columns(&mut self) -> usize {
        let mut added = 0;
        for column in ANNOTATION_COLUMNS {
            if self.has_column(column) {
                continue;
            }
            self.columns.push(column);
            for row in &mut self.rows {
                row.cells.entry(column).or_default();
            }
            added += 1;
        }
        added
    }

    /// Index of the `occurrence`-th row (counting from zero) carrying
    /// `shipment_id`.
    pub fn position(&self, shipment_id: &str, occurrence: usize) -> Option<usize> {
        self.rows
            .iter()
            .enumerate()
            .filter(|(_, r)| r.shipment_id() == shipment_id)
            .nth(occurrence)
            .map(|(idx, _)| idx)
    }

    /// For every row, how many earlier rows share its shipment id.
    ///
    /// Together with the id this identifies a row even when the source
    /// repeats ids or has no `shipment_id` column at all.
    pub fn occurrences(&self) -> Vec<usize> {
        let mut seen: HashMap<&str, usize> = HashMap::new();
        self.rows
            .iter()
            .map(|r| {
                let count = seen.entry(r.shipment_id()).or_insert(0);
                *count += 1;
                *count - 1
            })
            .collect()
    }

    /// Sets one cell on the first row with `shipment_id`, the way an
    /// operator edits the grid. Returns `false` when no such row exists.
    pub fn set_cell(
        &mut self,
        shipment_id: &str,
        column: Column,
        value: impl Into<String>,
    ) -> bool {
        match self.position(shipment_id, 0) {
            Some(index) => self.set_cell_at(index, column, value),
            None => false,
        }
    }

    /// Sets one cell on the row at `index`.
    pub fn set_cell_at(&mut self, index: usize, column: Column, value: impl Into<String>) -> bool {
        match self.rows.get_mut(index) {
            Some(row) => {
                row.set(column, value);
                true
            }
            None => false,
        }
    }

    /// Copies the annotation cells of `edited` onto the row at `index`.
    /// Returns `false` when there is no such row.
    pub fn apply_annotations(&mut self, index: usize, edited: &GridRow) -> bool {
        match self.rows.get_mut(index) {
            Some(row) => {
                for column in ANNOTATION_COLUMNS {
                    row.set(column, edited.get(column));
                }
                true
            }
            None => false,
        }
    }

    pub fn write_csv<W: Write>(&self, writer: W) -> Result<()> {
        let mut wtr = WriterBuilder::new().from_writer(writer);
        wtr.write_record(self.columns.iter().map(|c| c.header()))?;
        for row in &self.rows {
            wtr.write_record(self.columns.iter().map(|c| row.get(*c)))?;
        }
        wtr.flush()?;
        Ok(())
    }

    /// Reads a grid previously written by [`write_csv`](Self::write_csv) and
    /// edited by hand. Unknown headers are ignored; a repeated header keeps
    /// its first occurrence.
    pub fn read_csv<R: Read>(reader: R) -> Result<Self> {
        let mut rdr = ReaderBuilder::new().from_reader(reader);
        let headers = rdr.headers().context("Failed to read grid headers")?.clone();

        let mut columns = Vec::new();
        let mut positions = Vec::new();
        for (idx, header) in headers.iter().enumerate() {
            match Column::from_header(header) {
                Some(column) if !columns.contains(&column) => {
                    columns.push(column);
                    positions.push((idx, column));
                }
                _ => debug!(header, "Ignoring grid column"),
            }
        }

        let mut rows = Vec::new();
        for (line, record) in rdr.records().enumerate() {
            let record = record.with_context(|| format!("Failed to parse grid row {}", line + 1))?;
            let cells = positions
                .iter()
                .map(|(idx, column)| (*column, record.get(*idx).unwrap_or("").to_string()))
                .collect();
            rows.push(GridRow { cells });
        }

        Ok(Self { columns, rows })
    }
}

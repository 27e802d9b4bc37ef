//! Station × ageing-bucket cross tabulation.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::record::{Column, Shipment};

/// Label of the synthesized totals row and column.
pub const GRAND_TOTAL: &str = "Grand Total";

/// Count of shipments per station and ageing bucket, with margins.
///
/// Stations and buckets are kept in ascending order; the totals row and
/// column always come last when the table is laid out.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AgeingPivot {
    counts: BTreeMap<String, BTreeMap<i64, u64>>,
    bucket_totals: BTreeMap<i64, u64>,
    grand_total: u64,
}

/// One laid-out row of the pivot, used for JSON output.
#[derive(Debug, Serialize)]
pub struct PivotRow {
    pub station: String,
    pub counts: Vec<u64>,
    pub total: u64,
}

/// JSON shape of the whole pivot.
#[derive(Debug, Serialize)]
pub struct PivotReport {
    pub buckets: Vec<i64>,
    pub rows: Vec<PivotRow>,
    pub totals: PivotRow,
}

impl AgeingPivot {
    pub fn from_shipments(shipments: &[Shipment]) -> Self {
        let mut pivot = AgeingPivot::default();

        for s in shipments {
            *pivot
                .counts
                .entry(s.station_name.clone())
                .or_default()
                .entry(s.ageing_last_status)
                .or_default() += 1;
            *pivot.bucket_totals.entry(s.ageing_last_status).or_default() += 1;
            pivot.grand_total += 1;
        }

        pivot
    }

    pub fn stations(&self) -> impl Iterator<Item = &str> {
        self.counts.keys().map(String::as_str)
    }

    pub fn buckets(&self) -> Vec<i64> {
        self.bucket_totals.keys().copied().collect()
    }

    pub fn count(&self, station: &str, bucket: i64) -> u64 {
        self.counts
            .get(station)
            .and_then(|row| row.get(&bucket))
            .copied()
            .unwrap_or(0)
    }

    pub fn station_total(&self, station: &str) -> u64 {
        self.counts
            .get(station)
            .map(|row| row.values().sum())
            .unwrap_or(0)
    }

    pub fn bucket_total(&self, bucket: i64) -> u64 {
        self.bucket_totals.get(&bucket).copied().unwrap_or(0)
    }

    pub fn grand_total(&self) -> u64 {
        self.grand_total
    }

    pub fn is_empty(&self) -> bool {
        self.grand_total == 0
    }

    /// Header row: the index column, each bucket, then the totals column.
    pub fn header(&self) -> Vec<String> {
        std::iter::once(Column::StationName.header().to_string())
            .chain(self.buckets().into_iter().map(|b| b.to_string()))
            .chain(std::iter::once(GRAND_TOTAL.to_string()))
            .collect()
    }

    /// Body rows as text cells, totals row last.
    pub fn rows(&self) -> Vec<Vec<String>> {
        let report = self.report();
        report
            .rows
            .iter()
            .chain(std::iter::once(&report.totals))
            .map(|row| {
                std::iter::once(row.station.clone())
                    .chain(row.counts.iter().map(u64::to_string))
                    .chain(std::iter::once(row.total.to_string()))
                    .collect()
            })
            .collect()
    }

    pub fn report(&self) -> PivotReport {
        let buckets = self.buckets();

        let rows = self
            .stations()
            .map(|station| PivotRow {
                station: station.to_string(),
                counts: buckets.iter().map(|b| self.count(station, *b)).collect(),
                total: self.station_total(station),
            })
            .collect();

        let totals = PivotRow {
            station: GRAND_TOTAL.to_string(),
            counts: buckets.iter().map(|b| self.bucket_total(*b)).collect(),
            total: self.grand_total,
        };

        PivotReport {
            buckets,
            rows,
            totals,
        }
    }
}

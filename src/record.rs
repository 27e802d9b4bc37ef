//! Shipment record types and the fixed column set of the stuck-shipment export.

use serde::{Deserialize, Serialize};

/// Every column the tool knows about, declared in export order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Column {
    StationName,
    StateName,
    BuyerCity,
    ShipmentId,
    ToNumber,
    TrackingStatus,
    AgeingRange,
    AgeingLastStatus,
    Otp,
    DriverName,
    XptReceivedTime,
    AppConfirmationDate,
    Cogs,
    Check,
    Justification,
    LossReason,
    Notes,
}

/// Column order expected by the `Registro` sheet.
pub const EXPORT_SCHEMA: [Column; 17] = [
    Column::StationName,
    Column::StateName,
    Column::BuyerCity,
    Column::ShipmentId,
    Column::ToNumber,
    Column::TrackingStatus,
    Column::AgeingRange,
    Column::AgeingLastStatus,
    Column::Otp,
    Column::DriverName,
    Column::XptReceivedTime,
    Column::AppConfirmationDate,
    Column::Cogs,
    Column::Check,
    Column::Justification,
    Column::LossReason,
    Column::Notes,
];

/// Columns the source CSV must carry.
pub const REQUIRED_COLUMNS: [Column; 2] = [Column::StationName, Column::AgeingLastStatus];

/// The operator-editable columns that are not part of the raw export.
pub const ANNOTATION_COLUMNS: [Column; 4] = [
    Column::Check,
    Column::Justification,
    Column::LossReason,
    Column::Notes,
];

impl Column {
    /// Header text as it appears in the CSV and in the remote sheet.
    pub fn header(self) -> &'static str {
        match self {
            Column::StationName => "Station Name",
            Column::StateName => "State Name",
            Column::BuyerCity => "buyer_city",
            Column::ShipmentId => "shipment_id",
            Column::ToNumber => "to_number",
            Column::TrackingStatus => "tracking_status",
            Column::AgeingRange => "ageing_range",
            Column::AgeingLastStatus => "ageing_last_status",
            Column::Otp => "otp",
            Column::DriverName => "driver_name",
            Column::XptReceivedTime => "xpt_received_time",
            Column::AppConfirmationDate => "app_confirmation_date",
            Column::Cogs => "cogs(SUM)",
            Column::Check => "Check",
            Column::Justification => "Justificativa",
            Column::LossReason => "Motivo Lost",
            Column::Notes => "Observações",
        }
    }

    /// Resolves a header to its column. Matching is exact; headers are
    /// case and whitespace sensitive just like the sheet.
    pub fn from_header(header: &str) -> Option<Self> {
        EXPORT_SCHEMA.into_iter().find(|c| c.header() == header)
    }

    pub fn is_annotation(self) -> bool {
        ANNOTATION_COLUMNS.contains(&self)
    }
}

/// Headers of [`EXPORT_SCHEMA`], in order.
pub fn export_headers() -> Vec<&'static str> {
    EXPORT_SCHEMA.iter().map(|c| c.header()).collect()
}

/// One row of the source CSV before the ageing column is coerced.
///
/// Only `Station Name` and `ageing_last_status` are mandatory; every other
/// column defaults to an empty string when the file does not carry it.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawShipment {
    #[serde(rename = "Station Name")]
    pub station_name: String,
    #[serde(rename = "State Name", default)]
    pub state_name: String,
    #[serde(default)]
    pub buyer_city: String,
    #[serde(default)]
    pub shipment_id: String,
    #[serde(default)]
    pub to_number: String,
    #[serde(default)]
    pub tracking_status: String,
    #[serde(default)]
    pub ageing_range: String,
    pub ageing_last_status: String,
    #[serde(default)]
    pub otp: String,
    #[serde(default)]
    pub driver_name: String,
    #[serde(default)]
    pub xpt_received_time: String,
    #[serde(default)]
    pub app_confirmation_date: String,
    #[serde(rename = "cogs(SUM)", default)]
    pub cogs: String,
    #[serde(rename = "Check", default)]
    pub check: String,
    #[serde(rename = "Justificativa", default)]
    pub justification: String,
    #[serde(rename = "Motivo Lost", default)]
    pub loss_reason: String,
    #[serde(rename = "Observações", default)]
    pub notes: String,
}

/// Source fields carried through unchanged from load to export.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ShipmentDetails {
    pub state_name: String,
    pub buyer_city: String,
    pub shipment_id: String,
    pub to_number: String,
    pub tracking_status: String,
    pub ageing_range: String,
    pub otp: String,
    pub driver_name: String,
    pub xpt_received_time: String,
    pub app_confirmation_date: String,
    pub cogs: String,
}

/// The four operator-maintained fields.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Annotation {
    pub check: bool,
    pub justification: String,
    pub loss_reason: String,
    pub notes: String,
}

impl Annotation {
    /// Text value of an annotation column, `None` for any other column.
    pub fn value(&self, column: Column) -> Option<String> {
        match column {
            Column::Check => Some(format_check(self.check).to_string()),
            Column::Justification => Some(self.justification.clone()),
            Column::LossReason => Some(self.loss_reason.clone()),
            Column::Notes => Some(self.notes.clone()),
            _ => None,
        }
    }

    /// Resets one annotation column to its blank value.
    pub fn clear(&mut self, column: Column) {
        match column {
            Column::Check => self.check = false,
            Column::Justification => self.justification.clear(),
            Column::LossReason => self.loss_reason.clear(),
            Column::Notes => self.notes.clear(),
            _ => {}
        }
    }

    pub fn is_justified(&self) -> bool {
        !self.justification.trim().is_empty()
    }
}

/// A cleaned shipment: the ageing status is a whole number.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Shipment {
    pub station_name: String,
    pub ageing_last_status: i64,
    pub details: ShipmentDetails,
    pub annotation: Annotation,
}

impl Shipment {
    pub fn shipment_id(&self) -> &str {
        &self.details.shipment_id
    }

    /// Text value of any column, formatted as it is exported.
    pub fn value(&self, column: Column) -> String {
        let d = &self.details;
        match column {
            Column::StationName => self.station_name.clone(),
            Column::StateName => d.state_name.clone(),
            Column::BuyerCity => d.buyer_city.clone(),
            Column::ShipmentId => d.shipment_id.clone(),
            Column::ToNumber => d.to_number.clone(),
            Column::TrackingStatus => d.tracking_status.clone(),
            Column::AgeingRange => d.ageing_range.clone(),
            Column::AgeingLastStatus => self.ageing_last_status.to_string(),
            Column::Otp => d.otp.clone(),
            Column::DriverName => d.driver_name.clone(),
            Column::XptReceivedTime => d.xpt_received_time.clone(),
            Column::AppConfirmationDate => d.app_confirmation_date.clone(),
            Column::Cogs => d.cogs.clone(),
            Column::Check | Column::Justification | Column::LossReason | Column::Notes => {
                self.annotation.value(column).unwrap_or_default()
            }
        }
    }

    /// The record as one export row, in [`EXPORT_SCHEMA`] order.
    pub fn to_export_row(&self) -> Vec<String> {
        EXPORT_SCHEMA.iter().map(|c| self.value(*c)).collect()
    }
}

impl From<&Shipment> for RawShipment {
    fn from(s: &Shipment) -> Self {
        let d = s.details.clone();
        RawShipment {
            station_name: s.station_name.clone(),
            state_name: d.state_name,
            buyer_city: d.buyer_city,
            shipment_id: d.shipment_id,
            to_number: d.to_number,
            tracking_status: d.tracking_status,
            ageing_range: d.ageing_range,
            ageing_last_status: s.ageing_last_status.to_string(),
            otp: d.otp,
            driver_name: d.driver_name,
            xpt_received_time: d.xpt_received_time,
            app_confirmation_date: d.app_confirmation_date,
            cogs: d.cogs,
            check: format_check(s.annotation.check).to_string(),
            justification: s.annotation.justification.clone(),
            loss_reason: s.annotation.loss_reason.clone(),
            notes: s.annotation.notes.clone(),
        }
    }
}

/// Sheet-style boolean literal.
pub fn format_check(check: bool) -> &'static str {
    if check { "TRUE" } else { "FALSE" }
}

/// Parses a check cell. Empty means unchecked; unknown text is `None`.
pub fn parse_check(value: &str) -> Option<bool> {
    match value.trim().to_lowercase().as_str() {
        "" | "false" | "0" | "no" | "não" | "nao" | "n" => Some(false),
        "true" | "1" | "yes" | "sim" | "s" | "y" | "x" => Some(true),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_export_schema_headers_in_sheet_order() {
        assert_eq!(
            export_headers(),
            vec![
                "Station Name",
                "State Name",
                "buyer_city",
                "shipment_id",
                "to_number",
                "tracking_status",
                "ageing_range",
                "ageing_last_status",
                "otp",
                "driver_name",
                "xpt_received_time",
                "app_confirmation_date",
                "cogs(SUM)",
                "Check",
                "Justificativa",
                "Motivo Lost",
                "Observações",
            ]
        );
    }

    #[test]
    fn test_from_header_round_trips_every_column() {
        for column in EXPORT_SCHEMA {
            assert_eq!(Column::from_header(column.header()), Some(column));
        }
        assert_eq!(Column::from_header("station name"), None);
    }

    #[test]
    fn test_parse_check_values() {
        assert_eq!(parse_check(""), Some(false));
        assert_eq!(parse_check("TRUE"), Some(true));
        assert_eq!(parse_check(" Sim "), Some(true));
        assert_eq!(parse_check("False"), Some(false));
        assert_eq!(parse_check("maybe"), None);
    }

    #[test]
    fn test_to_export_row_places_annotation_last() {
        let shipment = Shipment {
            station_name: "SP-01".to_string(),
            ageing_last_status: 7,
            details: ShipmentDetails {
                shipment_id: "BR123".to_string(),
                ..Default::default()
            },
            annotation: Annotation {
                check: true,
                justification: "Entregue".to_string(),
                ..Default::default()
            },
        };

        let row = shipment.to_export_row();
        assert_eq!(row.len(), EXPORT_SCHEMA.len());
        assert_eq!(row[0], "SP-01");
        assert_eq!(row[3], "BR123");
        assert_eq!(row[7], "7");
        assert_eq!(row[13], "TRUE");
        assert_eq!(row[14], "Entregue");
    }
}

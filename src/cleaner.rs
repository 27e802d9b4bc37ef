use tracing::debug;

use crate::record::{Annotation, RawShipment, Shipment, ShipmentDetails, parse_check};

/// Result of coercing the ageing column.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Cleaned {
    pub shipments: Vec<Shipment>,
    /// Rows dropped because `ageing_last_status` was not numeric.
    pub removed: usize,
}

/// Coerces `ageing_last_status` to an integer and drops the rows where it
/// cannot be. Never fails; the result may be empty.
pub fn clean(rows: &[RawShipment]) -> Cleaned {
    let shipments: Vec<Shipment> = rows.iter().filter_map(to_shipment).collect();
    let removed = rows.len() - shipments.len();

    debug!(kept = shipments.len(), removed, "Ageing column coerced");

    Cleaned { shipments, removed }
}

fn to_shipment(raw: &RawShipment) -> Option<Shipment> {
    let ageing_last_status = parse_ageing(&raw.ageing_last_status)?;

    Some(Shipment {
        station_name: raw.station_name.clone(),
        ageing_last_status,
        details: ShipmentDetails {
            state_name: raw.state_name.clone(),
            buyer_city: raw.buyer_city.clone(),
            shipment_id: raw.shipment_id.clone(),
            to_number: raw.to_number.clone(),
            tracking_status: raw.tracking_status.clone(),
            ageing_range: raw.ageing_range.clone(),
            otp: raw.otp.clone(),
            driver_name: raw.driver_name.clone(),
            xpt_received_time: raw.xpt_received_time.clone(),
            app_confirmation_date: raw.app_confirmation_date.clone(),
            cogs: raw.cogs.clone(),
        },
        annotation: Annotation {
            // an unreadable flag in the source is treated as unchecked
            check: parse_check(&raw.check).unwrap_or(false),
            justification: raw.justification.clone(),
            loss_reason: raw.loss_reason.clone(),
            notes: raw.notes.clone(),
        },
    })
}

/// Parses an ageing cell. Decimal text is truncated toward zero, so `"5.0"`
/// and `"5.9"` both become `5`. Returns `None` for anything non-numeric,
/// non-finite, or outside the `i64` range.
pub fn parse_ageing(value: &str) -> Option<i64> {
    let value = value.trim();
    if let Ok(n) = value.parse::<i64>() {
        return Some(n);
    }

    let f = value.parse::<f64>().ok()?;
    if !f.is_finite() || f >= i64::MAX as f64 || f < i64::MIN as f64 {
        return None;
    }
    Some(f.trunc() as i64)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raw(station: &str, ageing: &str) -> RawShipment {
        RawShipment {
            station_name: station.to_string(),
            ageing_last_status: ageing.to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn test_parse_ageing() {
        assert_eq!(parse_ageing("5"), Some(5));
        assert_eq!(parse_ageing(" 12 "), Some(12));
        assert_eq!(parse_ageing("5.0"), Some(5));
        assert_eq!(parse_ageing("-3.7"), Some(-3));
        assert_eq!(parse_ageing("x"), None);
        assert_eq!(parse_ageing(""), None);
        assert_eq!(parse_ageing("NaN"), None);
        assert_eq!(parse_ageing("inf"), None);
        assert_eq!(parse_ageing("1e30"), None);
    }

    #[test]
    fn test_clean_drops_non_numeric_rows() {
        let rows = vec![raw("A", "5"), raw("A", "x"), raw("B", "3")];
        let cleaned = clean(&rows);

        assert_eq!(cleaned.removed, 1);
        assert_eq!(cleaned.shipments.len(), 2);
        assert_eq!(cleaned.shipments[0].station_name, "A");
        assert_eq!(cleaned.shipments[0].ageing_last_status, 5);
        assert_eq!(cleaned.shipments[1].station_name, "B");
        assert_eq!(cleaned.shipments[1].ageing_last_status, 3);
    }

    #[test]
    fn test_clean_can_remove_everything() {
        let cleaned = clean(&[raw("A", "?"), raw("B", "")]);
        assert_eq!(cleaned.removed, 2);
        assert!(cleaned.shipments.is_empty());
    }

    #[test]
    fn test_clean_is_idempotent() {
        let rows = vec![raw("A", "5.0"), raw("A", "n/a"), raw("C", "9")];
        let first = clean(&rows);

        let again: Vec<RawShipment> = first.shipments.iter().map(RawShipment::from).collect();
        let second = clean(&again);

        assert_eq!(second.removed, 0);
        assert_eq!(second.shipments, first.shipments);
    }
}

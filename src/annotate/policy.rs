use std::fmt;

use crate::annotate::grid::{EditableGrid, GridRow};
use crate::record::{ANNOTATION_COLUMNS, Column, Shipment, parse_check};
use crate::vocabulary::Vocabulary;

/// Longest accepted free-text note, in characters.
pub const NOTES_MAX_CHARS: usize = 120;

/// What an operator may do with a column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnPolicy {
    ReadOnly,
    Checkbox,
    /// Closed dropdown backed by the justification vocabulary.
    JustificationChoice,
    /// Closed dropdown backed by the loss-reason vocabulary.
    LossReasonChoice,
    Text { max_chars: usize },
}

impl Column {
    pub fn policy(self) -> ColumnPolicy {
        match self {
            Column::Check => ColumnPolicy::Checkbox,
            Column::Justification => ColumnPolicy::JustificationChoice,
            Column::LossReason => ColumnPolicy::LossReasonChoice,
            Column::Notes => ColumnPolicy::Text {
                max_chars: NOTES_MAX_CHARS,
            },
            _ => ColumnPolicy::ReadOnly,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ViolationKind {
    ReadOnlyChanged { original: String, edited: String },
    NotInVocabulary { value: String },
    TooLong { chars: usize, max_chars: usize },
    InvalidCheck { value: String },
    UnknownShipment,
}

/// An edit that was refused, tied to the row and column it touched.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PolicyViolation {
    pub shipment_id: String,
    pub column: Option<Column>,
    pub kind: ViolationKind,
}

impl fmt::Display for PolicyViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let column = self.column.map(Column::header).unwrap_or("row");
        write!(f, "shipment '{}', {}: ", self.shipment_id, column)?;
        match &self.kind {
            ViolationKind::ReadOnlyChanged { original, edited } => {
                write!(f, "read-only value changed from '{original}' to '{edited}'")
            }
            ViolationKind::NotInVocabulary { value } => {
                write!(f, "'{value}' is not one of the allowed options")
            }
            ViolationKind::TooLong { chars, max_chars } => {
                write!(f, "{chars} characters exceeds the limit of {max_chars}")
            }
            ViolationKind::InvalidCheck { value } => {
                write!(f, "'{value}' is not a checkbox value")
            }
            ViolationKind::UnknownShipment => write!(f, "not part of the current view"),
        }
    }
}

/// Checks a single cell edit against the column policy.
pub fn check_cell(
    column: Column,
    original: &str,
    edited: &str,
    vocabulary: &Vocabulary,
) -> Result<(), ViolationKind> {
    match column.policy() {
        ColumnPolicy::ReadOnly if original != edited => Err(ViolationKind::ReadOnlyChanged {
            original: original.to_string(),
            edited: edited.to_string(),
        }),
        ColumnPolicy::ReadOnly => Ok(()),
        ColumnPolicy::Checkbox => parse_check(edited).map(|_| ()).ok_or_else(|| {
            ViolationKind::InvalidCheck {
                value: edited.to_string(),
            }
        }),
        ColumnPolicy::JustificationChoice => {
            if edited.trim().is_empty() || vocabulary.parse_justification(edited).is_some() {
                Ok(())
            } else {
                Err(ViolationKind::NotInVocabulary {
                    value: edited.to_string(),
                })
            }
        }
        ColumnPolicy::LossReasonChoice => {
            if edited.trim().is_empty() || vocabulary.parse_loss_reason(edited).is_some() {
                Ok(())
            } else {
                Err(ViolationKind::NotInVocabulary {
                    value: edited.to_string(),
                })
            }
        }
        ColumnPolicy::Text { max_chars } => {
            let chars = edited.chars().count();
            if chars > max_chars {
                Err(ViolationKind::TooLong { chars, max_chars })
            } else {
                Ok(())
            }
        }
    }
}

/// Edited rows split into those that respect every column policy and the
/// violations found in the rest.
#[derive(Debug, Clone, Default)]
pub struct EditReview {
    /// Accepted rows, each with the index of the view row it edits.
    pub accepted: Vec<(usize, GridRow)>,
    pub violations: Vec<PolicyViolation>,
}

/// Re-validates an edited grid against the view it was produced from.
///
/// The n-th edited row carrying an id is paired with the n-th view row
/// carrying the same id, so repeated or blank ids still line up with their
/// own row. A row with any violation is rejected as a whole so a
/// half-applied edit never reaches the export.
pub fn validate_edits(
    original: &EditableGrid,
    edited: &EditableGrid,
    vocabulary: &Vocabulary,
) -> EditReview {
    let mut review = EditReview::default();

    for (row, occurrence) in edited.rows().iter().zip(edited.occurrences()) {
        let id = row.shipment_id();
        let Some(index) = original.position(id, occurrence) else {
            review.violations.push(PolicyViolation {
                shipment_id: id.to_string(),
                column: None,
                kind: ViolationKind::UnknownShipment,
            });
            continue;
        };
        let source = &original.rows()[index];

        let before = review.violations.len();
        for column in edited.columns() {
            let checked = check_cell(*column, source.get(*column), row.get(*column), vocabulary);
            if let Err(kind) = checked {
                review.violations.push(PolicyViolation {
                    shipment_id: id.to_string(),
                    column: Some(*column),
                    kind,
                });
            }
        }

        if review.violations.len() == before {
            review.accepted.push((index, row.clone()));
        }
    }

    review
}

/// Clears annotation values read from the source file that the column
/// policies refuse, returning one violation per cleared value.
pub fn sanitize_annotations(
    shipments: &mut [Shipment],
    vocabulary: &Vocabulary,
) -> Vec<PolicyViolation> {
    let mut cleared = Vec::new();
    for shipment in shipments.iter_mut() {
        for column in ANNOTATION_COLUMNS {
            let value = shipment.value(column);
            if let Err(kind) = check_cell(column, &value, &value, vocabulary) {
                shipment.annotation.clear(column);
                cleared.push(PolicyViolation {
                    shipment_id: shipment.shipment_id().to_string(),
                    column: Some(column),
                    kind,
                });
            }
        }
    }
    cleared
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::ShipmentDetails;
    use chrono::NaiveDate;

    fn vocab() -> Vocabulary {
        Vocabulary::for_date(NaiveDate::from_ymd_opt(2026, 10, 18).unwrap())
    }

    fn view() -> EditableGrid {
        let shipments: Vec<Shipment> = ["S1", "S2"]
            .iter()
            .map(|id| Shipment {
                station_name: "A".to_string(),
                ageing_last_status: 3,
                details: ShipmentDetails {
                    shipment_id: id.to_string(),
                    ..Default::default()
                },
                ..Default::default()
            })
            .collect();
        EditableGrid::from_shipments(&shipments)
    }

    fn edited(edits: &[(&str, Column, &str)]) -> EditableGrid {
        let mut grid = view();
        for (id, column, value) in edits {
            assert!(grid.set_cell(id, *column, *value));
        }
        grid
    }

    #[test]
    fn test_policy_tags() {
        assert_eq!(Column::StationName.policy(), ColumnPolicy::ReadOnly);
        assert_eq!(Column::Cogs.policy(), ColumnPolicy::ReadOnly);
        assert_eq!(Column::Check.policy(), ColumnPolicy::Checkbox);
        assert_eq!(Column::Notes.policy(), ColumnPolicy::Text { max_chars: 120 });
    }

    #[test]
    fn test_valid_edit_is_accepted() {
        let review = validate_edits(
            &view(),
            &edited(&[("S1", Column::Justification, "Entregue")]),
            &vocab(),
        );
        assert!(review.violations.is_empty());
        assert_eq!(review.accepted.len(), 2);
    }

    #[test]
    fn test_read_only_change_is_rejected() {
        let review = validate_edits(
            &view(),
            &edited(&[("S1", Column::StationName, "B")]),
            &vocab(),
        );
        assert_eq!(review.accepted.len(), 1);
        assert_eq!(review.violations.len(), 1);
        assert_eq!(review.violations[0].column, Some(Column::StationName));
    }

    #[test]
    fn test_out_of_vocabulary_values_are_rejected() {
        let review = validate_edits(
            &view(),
            &edited(&[
                ("S1", Column::Justification, "Porque sim"),
                ("S2", Column::LossReason, "Perdido"),
            ]),
            &vocab(),
        );
        assert!(review.accepted.is_empty());
        assert!(review.violations.iter().all(|v| matches!(
            v.kind,
            ViolationKind::NotInVocabulary { .. }
        )));
    }

    #[test]
    fn test_notes_length_limit() {
        let long = "x".repeat(NOTES_MAX_CHARS + 1);
        let exact = "é".repeat(NOTES_MAX_CHARS);

        assert!(check_cell(Column::Notes, "", &exact, &vocab()).is_ok());
        assert_eq!(
            check_cell(Column::Notes, "", &long, &vocab()),
            Err(ViolationKind::TooLong {
                chars: 121,
                max_chars: 120
            })
        );
    }

    #[test]
    fn test_unknown_shipment_is_rejected() {
        let csv = "shipment_id,Justificativa\nS404,Entregue\n";
        let grid = EditableGrid::read_csv(csv.as_bytes()).unwrap();

        let review = validate_edits(&view(), &grid, &vocab());
        assert!(review.accepted.is_empty());
        assert_eq!(review.violations[0].kind, ViolationKind::UnknownShipment);
        assert!(review.violations[0].to_string().contains("S404"));
    }

    #[test]
    fn test_invalid_check_is_rejected() {
        assert!(check_cell(Column::Check, "FALSE", "TRUE", &vocab()).is_ok());
        assert!(matches!(
            check_cell(Column::Check, "FALSE", "perhaps", &vocab()),
            Err(ViolationKind::InvalidCheck { .. })
        ));
    }

    fn duplicate_view() -> EditableGrid {
        let shipments: Vec<Shipment> = [("A", "Ana"), ("B", "Bia")]
            .iter()
            .map(|(station, driver)| Shipment {
                station_name: station.to_string(),
                ageing_last_status: 3,
                details: ShipmentDetails {
                    shipment_id: "S1".to_string(),
                    driver_name: driver.to_string(),
                    ..Default::default()
                },
                ..Default::default()
            })
            .collect();
        EditableGrid::from_shipments(&shipments)
    }

    #[test]
    fn test_repeated_ids_pair_with_their_own_row() {
        let view = duplicate_view();
        let mut edited = view.clone();
        assert!(edited.set_cell_at(1, Column::Justification, "Entregue"));

        let review = validate_edits(&view, &edited, &vocab());

        assert!(review.violations.is_empty());
        assert_eq!(review.accepted.len(), 2);
        assert_eq!(review.accepted[1].0, 1);
        assert_eq!(review.accepted[1].1.get(Column::Justification), "Entregue");
    }

    #[test]
    fn test_grid_without_ids_pairs_by_position() {
        let csv = "Station Name,ageing_last_status\nA,5\nB,3\n";
        let view = EditableGrid::read_csv(csv.as_bytes()).unwrap();
        let edited = view.clone();

        let review = validate_edits(&view, &edited, &vocab());

        assert!(review.violations.is_empty());
        assert_eq!(review.accepted.len(), 2);
    }

    #[test]
    fn test_extra_repeated_row_is_unknown() {
        let view = duplicate_view();
        let csv = "shipment_id,Justificativa\nS1,\nS1,\nS1,Entregue\n";
        let edited = EditableGrid::read_csv(csv.as_bytes()).unwrap();

        let review = validate_edits(&view, &edited, &vocab());

        assert_eq!(review.accepted.len(), 2);
        assert_eq!(review.violations.len(), 1);
        assert_eq!(review.violations[0].kind, ViolationKind::UnknownShipment);
    }

    #[test]
    fn test_blank_choice_is_accepted() {
        assert!(check_cell(Column::Justification, "", "   ", &vocab()).is_ok());
        assert!(check_cell(Column::LossReason, "", " ", &vocab()).is_ok());
    }

    #[test]
    fn test_sanitize_clears_out_of_policy_source_values() {
        let mut shipments = vec![Shipment {
            station_name: "A".to_string(),
            details: ShipmentDetails {
                shipment_id: "S1".to_string(),
                ..Default::default()
            },
            annotation: crate::record::Annotation {
                check: true,
                justification: "Porque sim".to_string(),
                loss_reason: "Extravio".to_string(),
                notes: "x".repeat(NOTES_MAX_CHARS + 5),
            },
            ..Default::default()
        }];

        let cleared = sanitize_annotations(&mut shipments, &vocab());

        assert_eq!(cleared.len(), 2);
        assert_eq!(cleared[0].column, Some(Column::Justification));
        assert_eq!(cleared[1].column, Some(Column::Notes));
        let annotation = &shipments[0].annotation;
        assert!(annotation.check);
        assert_eq!(annotation.justification, "");
        assert_eq!(annotation.loss_reason, "Extravio");
        assert_eq!(annotation.notes, "");
    }
}

use std::collections::BTreeSet;

use crate::record::Shipment;

/// Multi-select entry meaning "every station".
pub const ALL_STATIONS: &str = "Todas";

/// Which stations the operator is looking at.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum StationSelection {
    #[default]
    All,
    Only(BTreeSet<String>),
}

impl StationSelection {
    /// Builds a selection from multi-select values. Picking [`ALL_STATIONS`]
    /// anywhere in the list selects everything.
    pub fn from_names<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let names: BTreeSet<String> = names.into_iter().map(Into::into).collect();
        if names.contains(ALL_STATIONS) {
            StationSelection::All
        } else {
            StationSelection::Only(names)
        }
    }

    pub fn contains(&self, station: &str) -> bool {
        match self {
            StationSelection::All => true,
            StationSelection::Only(names) => names.contains(station),
        }
    }
}

/// Shipments whose station is part of `selection`, in source order.
pub fn filter_shipments(shipments: &[Shipment], selection: &StationSelection) -> Vec<Shipment> {
    match selection {
        StationSelection::All => shipments.to_vec(),
        StationSelection::Only(names) => shipments
            .iter()
            .filter(|s| names.contains(&s.station_name))
            .cloned()
            .collect(),
    }
}

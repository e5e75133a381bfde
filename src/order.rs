use itertools::Itertools;
use std::cmp::Ordering;
use std::str::FromStr;

use crate::geo::LatLon;
use crate::station::Station;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum SortMode {
    /// By distance from the QTH when one is set, by callsign otherwise.
    #[default]
    Default,
    Time,
    Callsign,
}

impl FromStr for SortMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "time" | "t" => Ok(SortMode::Time),
            "callsign" | "c" => Ok(SortMode::Callsign),
            other => Err(format!("unknown sort key <{}>", other)),
        }
    }
}

fn by_callsign(a: &Station, b: &Station) -> Ordering {
    a.callsign.cmp(&b.callsign)
}

/// Orders stations for the report and the waypoint files. Equal time or distance keys
/// fall back to callsign order.
pub fn sort_stations<I>(stations: I, mode: SortMode, qth: Option<LatLon>) -> Vec<Station>
where
    I: IntoIterator<Item = Station>,
{
    let stations = stations.into_iter();
    match (mode, qth) {
        (SortMode::Time, _) => stations
            .sorted_by(|a, b| {
                a.reported_at
                    .cmp(&b.reported_at)
                    .then_with(|| by_callsign(a, b))
            })
            .collect(),
        (SortMode::Callsign, _) | (SortMode::Default, None) => {
            stations.sorted_by(by_callsign).collect()
        }
        (SortMode::Default, Some(home)) => stations
            .map(|s| (home.distance_and_bearing(s.latlon).0, s))
            .sorted_by(|(da, a), (db, b)| da.total_cmp(db).then_with(|| by_callsign(a, b)))
            .map(|(_, s)| s)
            .collect(),
    }
}

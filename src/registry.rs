use std::collections::hash_map::Entry;
use std::collections::HashMap;

use crate::station::Station;

/// What [`StationRegistry::upsert`] did with a station.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Upsert {
    Inserted,
    Replaced,
    Kept,
}

/// Latest known position per callsign.
#[derive(Debug, Default)]
pub struct StationRegistry {
    stations: HashMap<String, Station>,
}

impl StationRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores `station` unless a report for the same callsign at the same or a later time is
    /// already held. On equal timestamps the first one seen stays.
    pub fn upsert(&mut self, station: Station) -> Upsert {
        match self.stations.entry(station.callsign.clone()) {
            Entry::Vacant(slot) => {
                slot.insert(station);
                Upsert::Inserted
            }
            Entry::Occupied(mut slot) => {
                if station.reported_at > slot.get().reported_at {
                    slot.insert(station);
                    Upsert::Replaced
                } else {
                    Upsert::Kept
                }
            }
        }
    }

    pub fn get(&self, callsign: &str) -> Option<&Station> {
        self.stations.get(callsign)
    }

    /// Resolved stations in no particular order.
    pub fn values(&self) -> impl Iterator<Item = &Station> {
        self.stations.values()
    }

    pub fn count(&self) -> usize {
        self.stations.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn station(call: &str, lat: f64, when: &str) -> Station {
        Station::new(call, &lat.to_string(), "0.0", when).unwrap()
    }

    #[test]
    fn keeps_latest_report() {
        let mut reg = StationRegistry::new();
        assert_eq!(reg.upsert(station("VE3ABC", 1.0, "2024-01-10 08:00:00")), Upsert::Inserted);
        assert_eq!(reg.upsert(station("VE3ABC", 2.0, "2024-01-11 08:00:00")), Upsert::Replaced);
        assert_eq!(reg.upsert(station("VE3ABC", 3.0, "2024-01-09 08:00:00")), Upsert::Kept);
        assert_eq!(reg.upsert(station("VA3XYZ", 4.0, "2024-01-01 00:00:00")), Upsert::Inserted);

        assert_eq!(reg.count(), 2);
        assert_eq!(reg.get("VE3ABC").unwrap().latitude(), 2.0);
        assert_eq!(reg.values().count(), 2);
    }

    #[test]
    fn equal_timestamps_keep_first_seen() {
        let mut reg = StationRegistry::new();
        reg.upsert(station("VE3ABC", 1.0, "2024-01-10 08:00:00"));
        assert_eq!(reg.upsert(station("VE3ABC", 2.0, "2024-01-10 08:00:00")), Upsert::Kept);
        assert_eq!(reg.get("VE3ABC").unwrap().latitude(), 1.0);
    }

    #[test]
    fn callsigns_are_case_sensitive() {
        let mut reg = StationRegistry::new();
        reg.upsert(station("ve3abc", 1.0, "2024-01-10 08:00:00"));
        reg.upsert(station("VE3ABC", 1.0, "2024-01-10 08:00:00"));
        assert_eq!(reg.count(), 2);
    }

    #[test]
    fn callsigns_match_exactly() {
        let mut reg = StationRegistry::new();
        reg.upsert(station("VE3ABC", 1.0, "2024-01-10 08:00:00"));
        assert_eq!(reg.upsert(station("VE3ABC ", 2.0, "2024-01-11 08:00:00")), Upsert::Inserted);
        assert_eq!(reg.count(), 2);
        assert_eq!(reg.get("VE3ABC").unwrap().latitude(), 1.0);
    }

    proptest! {
        #[test]
        fn latest_wins_in_any_order(
            reports in prop::collection::vec((0u8..4, 0u32..1000), 1..40),
            seed in any::<u64>(),
        ) {
            // Distinct minutes per callsign so no ties.
            let stations: Vec<Station> = reports
                .iter()
                .enumerate()
                .map(|(i, &(call, minute))| {
                    let minutes = minute * 100 + i as u32;
                    let when = chrono::NaiveDate::from_ymd_opt(2024, 1, 1)
                        .unwrap()
                        .and_hms_opt(0, 0, 0)
                        .unwrap()
                        + chrono::Duration::minutes(i64::from(minutes));
                    Station::new(
                        &format!("K{}AA", call),
                        "10.0",
                        "20.0",
                        &when.format("%Y-%m-%d %H:%M:%S").to_string(),
                    )
                    .unwrap()
                })
                .collect();

            let mut forward = StationRegistry::new();
            stations.iter().cloned().for_each(|s| { forward.upsert(s); });

            let mut shuffled = stations.clone();
            let len = shuffled.len();
            for i in 0..len {
                let j = (seed.wrapping_mul(i as u64 + 1) % len as u64) as usize;
                shuffled.swap(i, j);
            }
            let mut other = StationRegistry::new();
            shuffled.into_iter().for_each(|s| { other.upsert(s); });

            prop_assert_eq!(forward.count(), other.count());
            for s in forward.values() {
                let latest = stations
                    .iter()
                    .filter(|x| x.callsign == s.callsign)
                    .map(|x| x.reported_at)
                    .max()
                    .unwrap();
                prop_assert_eq!(s.reported_at, latest);
                prop_assert_eq!(Some(s), other.get(&s.callsign));
            }
        }
    }
}

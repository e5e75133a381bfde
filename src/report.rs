use std::fmt;

use crate::geo::LatLon;
use crate::mailbox::ScanStats;
use crate::station::Station;

const SECTOR_BOUNDS: [f64; 16] = [
    11.25, 33.75, 56.25, 78.75, 101.25, 123.75, 146.25, 168.75, 191.25, 213.75, 236.25, 258.75,
    281.25, 303.75, 326.25, 348.75,
];

const SECTOR_NAMES: [&str; 16] = [
    "N", "N-NE", "NE", "E-NE", "E", "E-SE", "SE", "S-SE", "S", "S-SW", "SW", "W-SW", "W", "W-NW",
    "NW", "N-NW",
];

static HEADER: &str = " Callsign      Date / Time     Latitude  Longitude   M.Grid  \n\
                       ------------ ---------------- ---------- ---------- -------- \n";

static HEADER_QTH: &str =
    " Callsign      Date / Time     Latitude  Longitude   M.Grid  Dist(km)  Azimuth \n\
     ------------ ---------------- ---------- ---------- -------- -------- ---------\n";

fn normalize_bearing(bearing: f64) -> f64 {
    if bearing < 0.0 {
        bearing + 360.0
    } else {
        bearing
    }
}

/// 16-point compass label for a bearing in degrees.
pub fn compass_sector(bearing: f64) -> &'static str {
    let bearing = normalize_bearing(bearing);
    SECTOR_BOUNDS
        .iter()
        .zip(SECTOR_NAMES.iter())
        .find(|(bound, _)| bearing < **bound)
        .map(|(_, name)| *name)
        .unwrap_or("N")
}

/// One fixed-width line per station, preceded by the column headers.
pub fn render_table(stations: &[Station], qth: Option<LatLon>) -> String {
    let mut out = String::from(if qth.is_some() { HEADER_QTH } else { HEADER });

    for s in stations {
        out += &format!(
            "{:<12} {} {:>10.5} {:>10.5} {:<8}",
            s.callsign,
            s.reported_at.format("%Y/%m/%d %H:%M"),
            s.latitude(),
            s.longitude(),
            s.latlon.to_grid_square()
        );
        if let Some(home) = qth {
            let (distance, bearing) = home.distance_and_bearing(s.latlon);
            let degrees = normalize_bearing(bearing).round() as i64 % 360;
            out += &format!(
                " {:>8.1} {:>4} {:<4}",
                distance / 1000.0,
                degrees,
                compass_sector(bearing)
            );
        }
        out += "\n";
    }

    out
}

/// Totals printed after a scan.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub scan: ScanStats,
    pub forms_found: usize,
    pub forms_rejected: usize,
    pub positions: usize,
}

impl fmt::Display for RunSummary {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        writeln!(f, "          Total emails processed: {}", self.scan.total_files)?;
        writeln!(f, "Emails scanned for position info: {}", self.scan.scanned_files)?;
        if self.scan.unreadable_files > 0 {
            writeln!(f, "       Unreadable emails skipped: {}", self.scan.unreadable_files)?;
        }
        writeln!(f, "                     Forms found: {}", self.forms_found)?;
        writeln!(f, "                  Forms rejected: {}", self.forms_rejected)?;
        write!(f, "      Position entries extracted: {}", self.positions)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sector_boundaries() {
        assert_eq!(compass_sector(0.0), "N");
        assert_eq!(compass_sector(11.24), "N");
        assert_eq!(compass_sector(11.25), "N-NE");
        assert_eq!(compass_sector(90.0), "E");
        assert_eq!(compass_sector(180.0), "S");
        assert_eq!(compass_sector(348.75), "N");
        assert_eq!(compass_sector(359.9), "N");
        assert_eq!(compass_sector(360.0), "N");
    }

    #[test]
    fn negative_bearings_wrap() {
        assert_eq!(compass_sector(-90.0), "W");
        assert_eq!(compass_sector(-0.1), "N");
        assert_eq!(compass_sector(-45.0), "NW");
    }

    #[test]
    fn renders_row_without_qth() {
        let s = Station::new("VE3NKL", "45.30000", "-75.70000", "2024-01-10 08:05:00").unwrap();
        let table = render_table(&[s.clone()], None);
        let lines: Vec<_> = table.lines().collect();
        assert_eq!(lines.len(), 3);
        assert!(lines[0].contains("M.Grid") && !lines[0].contains("Dist(km)"));
        assert_eq!(
            lines[2],
            format!(
                "VE3NKL       2024/01/10 08:05   45.30000  -75.70000 {}",
                s.latlon.to_grid_square()
            )
        );
    }

    #[test]
    fn renders_distance_and_azimuth_with_qth() {
        let s = Station::new("K1ABC", "0.0", "1.0", "2024-01-10 08:05:00").unwrap();
        let table = render_table(&[s], Some(LatLon::new(0.0, 0.0)));
        let lines: Vec<_> = table.lines().collect();
        assert!(lines[0].contains("Azimuth"));
        assert!(lines[2].ends_with("   111.2   90 E   "), "{:?}", lines[2]);
    }

    #[test]
    fn summary_lists_counters() {
        let summary = RunSummary {
            scan: ScanStats {
                total_files: 10,
                scanned_files: 4,
                unreadable_files: 0,
            },
            forms_found: 3,
            forms_rejected: 1,
            positions: 2,
        };
        let text = summary.to_string();
        assert!(text.contains("Total emails processed: 10"));
        assert!(text.contains("Emails scanned for position info: 4"));
        assert!(text.contains("Position entries extracted: 2"));
        assert!(!text.contains("Unreadable"));
    }
}

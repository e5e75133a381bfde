use lazy_static::lazy_static;
use regex::Regex;
use std::f64::consts::PI;

const EARTH_RADIUS_M: f64 = 6_371_000.0;

// Locator resolution in extended-square steps: 2/240 deg of longitude, 1/240 deg of latitude.
const STEPS_PER_DEGREE_LON: f64 = 120.0;
const STEPS_PER_DEGREE_LAT: f64 = 240.0;
const MAX_STEP: i64 = 43_199;

lazy_static! {
    static ref GRID_REGEX: Regex =
        Regex::new(r"^[A-Ra-r]{2}[0-9]{2}[A-Xa-x]{2}([0-9]{2})?$").unwrap();
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LatLon(f64, f64);

impl LatLon {
    pub fn new(lat: f64, lon: f64) -> Self {
        LatLon(lat, lon)
    }

    pub fn lat(self) -> f64 {
        self.0
    }

    pub fn lon(self) -> f64 {
        self.1
    }

    /// Great-circle distance in meters and initial bearing in degrees, (-180, 180], toward `other`.
    pub fn distance_and_bearing(self, other: LatLon) -> (f64, f64) {
        let (lat1, lat2) = (self.0.to_radians(), other.0.to_radians());
        let dlat = lat2 - lat1;
        let dlon = (other.1 - self.1).to_radians();

        let a = (dlat / 2.0).sin().powi(2) + lat1.cos() * lat2.cos() * (dlon / 2.0).sin().powi(2);
        let distance = EARTH_RADIUS_M * 2.0 * a.sqrt().atan2((1.0 - a).sqrt());

        let x = dlon.sin() * lat2.cos();
        let y = lat1.cos() * lat2.sin() - lat1.sin() * lat2.cos() * dlon.cos();
        let bearing = x.atan2(y) * 180.0 / PI;

        (distance, bearing)
    }

    /// Centre of a 6 or 8 character Maidenhead cell, e.g. `FN25dh` or `FN25dh62`.
    pub fn from_grid_square(code: &str) -> Option<Self> {
        if !GRID_REGEX.is_match(code) {
            return None;
        }
        let c = code.to_ascii_uppercase().into_bytes();

        let mut lon = f64::from(c[0] - b'A') * 20.0 + f64::from(c[2] - b'0') * 2.0
            + f64::from(c[4] - b'A') * 2.0 / 24.0;
        let mut lat = f64::from(c[1] - b'A') * 10.0 + f64::from(c[3] - b'0')
            + f64::from(c[5] - b'A') / 24.0;

        if c.len() == 8 {
            lon += f64::from(c[6] - b'0') * 2.0 / 240.0 + 1.0 / 240.0;
            lat += f64::from(c[7] - b'0') / 240.0 + 1.0 / 480.0;
        } else {
            lon += 1.0 / 24.0;
            lat += 1.0 / 48.0;
        }

        Some(LatLon(lat - 90.0, lon - 180.0))
    }

    /// 8 character Maidenhead locator of the cell containing this point.
    pub fn to_grid_square(self) -> String {
        fn steps(value: f64, per_degree: f64) -> i64 {
            ((value * per_degree).floor() as i64).clamp(0, MAX_STEP)
        }

        let lon = steps(self.1 + 180.0, STEPS_PER_DEGREE_LON);
        let lat = steps(self.0 + 90.0, STEPS_PER_DEGREE_LAT);

        let letter = |n: i64, base: u8| char::from(base + n as u8);
        let digit = |n: i64| char::from(b'0' + n as u8);

        [
            letter(lon / 2400, b'A'),
            letter(lat / 2400, b'A'),
            digit(lon / 240 % 10),
            digit(lat / 240 % 10),
            letter(lon / 10 % 24, b'a'),
            letter(lat / 10 % 24, b'a'),
            digit(lon % 10),
            digit(lat % 10),
        ]
        .iter()
        .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn grid_square_of_ottawa() {
        let grid = LatLon::new(45.3, -75.7).to_grid_square();
        assert_eq!(grid.len(), 8);
        assert!(grid.starts_with("FN25dh"), "{}", grid);
    }

    #[test]
    fn grid_square_center() {
        let p = LatLon::from_grid_square("FN25dh").unwrap();
        assert!((p.lat() - 45.3125).abs() < 1e-9);
        assert!((p.lon() - (-75.708_333_333)).abs() < 1e-6);

        let lower = LatLon::from_grid_square("fn25DH").unwrap();
        assert_eq!(p, lower);
    }

    #[test]
    fn extended_grid_square_round_trips() {
        let p = LatLon::from_grid_square("FN25dh62").unwrap();
        assert_eq!(p.to_grid_square(), "FN25dh62");
    }

    #[test]
    fn bad_grid_squares() {
        assert!(LatLon::from_grid_square("FN25").is_none());
        assert!(LatLon::from_grid_square("SN25dh").is_none());
        assert!(LatLon::from_grid_square("FN25dy").is_none());
        assert!(LatLon::from_grid_square("FN25dh6").is_none());
    }

    #[test]
    fn edges_clamp_into_last_cell() {
        assert_eq!(LatLon::new(90.0, 180.0).to_grid_square(), "RR99xx99");
        assert_eq!(LatLon::new(-90.0, -180.0).to_grid_square(), "AA00aa00");
    }

    #[test]
    fn distance_and_bearing_due_east_on_equator() {
        let (d, b) = LatLon::new(0.0, 0.0).distance_and_bearing(LatLon::new(0.0, 1.0));
        assert!((d - 111_194.9).abs() < 1.0, "{}", d);
        assert!((b - 90.0).abs() < 1e-9);
    }

    #[test]
    fn bearing_west_is_negative() {
        let (_, b) = LatLon::new(45.0, -75.0).distance_and_bearing(LatLon::new(45.0, -80.0));
        assert!(b < 0.0 && b > -90.0, "{}", b);
    }
}

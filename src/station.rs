use chrono::NaiveDateTime;

use crate::error::ValidationError;
use crate::geo::LatLon;

pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// A position report that passed validation. Timestamps carry no offset and are taken as UTC.
#[derive(Clone, Debug, PartialEq)]
pub struct Station {
    pub callsign: String,
    pub latlon: LatLon,
    pub reported_at: NaiveDateTime,
}

impl Station {
    /// Builds a station from the raw form values. Checks run in order callsign, latitude,
    /// longitude, timestamp and the first failure is returned.
    pub fn new(
        callsign: &str,
        lat: &str,
        lon: &str,
        when: &str,
    ) -> Result<Station, ValidationError> {
        if callsign.trim().is_empty() {
            return Err(ValidationError::EmptyCallsign);
        }
        let lat = parse_latitude(lat)?;
        let lon = parse_longitude(lon)?;
        let reported_at = parse_timestamp(when)?;

        Ok(Station {
            callsign: callsign.to_string(),
            latlon: LatLon::new(lat, lon),
            reported_at,
        })
    }

    pub fn latitude(&self) -> f64 {
        self.latlon.lat()
    }

    pub fn longitude(&self) -> f64 {
        self.latlon.lon()
    }
}

fn parse_bounded(raw: &str, limit: f64) -> Option<f64> {
    raw.parse::<f64>()
        .ok()
        .filter(|v| (-limit..=limit).contains(v))
}

pub fn parse_latitude(raw: &str) -> Result<f64, ValidationError> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Err(ValidationError::EmptyLatitude);
    }
    parse_bounded(raw, 90.0).ok_or_else(|| ValidationError::InvalidLatitude {
        value: raw.to_string(),
    })
}

pub fn parse_longitude(raw: &str) -> Result<f64, ValidationError> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Err(ValidationError::EmptyLongitude);
    }
    parse_bounded(raw, 180.0).ok_or_else(|| ValidationError::InvalidLongitude {
        value: raw.to_string(),
    })
}

pub fn parse_timestamp(raw: &str) -> Result<NaiveDateTime, ValidationError> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Err(ValidationError::EmptyTimestamp);
    }
    NaiveDateTime::parse_from_str(raw, TIMESTAMP_FORMAT).map_err(|_| {
        ValidationError::InvalidTimestamp {
            value: raw.to_string(),
        }
    })
}

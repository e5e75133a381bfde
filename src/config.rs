use chrono::{Duration, NaiveDate};
use lazy_static::lazy_static;
use regex::Regex;
use std::path::PathBuf;

use crate::error::ConfigError;
use crate::geo::LatLon;
use crate::order::SortMode;
use crate::station::{parse_latitude, parse_longitude};

lazy_static! {
    static ref DECIMAL_REGEX: Regex = Regex::new(r"^-?[0-9]+\.[0-9]+$").unwrap();
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DateFilter {
    After(NaiveDate),
    LastDays(u32),
}

impl DateFilter {
    /// First accepted message date. Comparison is by date only. A window reaching past the
    /// earliest representable date accepts everything.
    pub fn cutoff(self, today: NaiveDate) -> NaiveDate {
        match self {
            DateFilter::After(date) => date,
            DateFilter::LastDays(days) => today
                .checked_sub_signed(Duration::days(i64::from(days)))
                .unwrap_or(NaiveDate::MIN),
        }
    }
}

/// Everything a run needs, already validated.
#[derive(Clone, Debug, PartialEq)]
pub struct RunConfig {
    pub maildir: PathBuf,
    pub gpx_output: Option<PathBuf>,
    pub kml_output: Option<PathBuf>,
    pub date_filter: Option<DateFilter>,
    pub verbosity: u8,
    pub qth: Option<LatLon>,
    pub sort_mode: SortMode,
}

/// `--qth` is either a 6/8 character grid square or `lat,lon` in signed decimal degrees.
pub fn parse_qth(value: &str) -> Result<LatLon, ConfigError> {
    let invalid = || ConfigError::Qth {
        value: value.to_string(),
    };
    let parts: Vec<&str> = value.split(',').map(str::trim).collect();

    match parts.as_slice() {
        [grid] => LatLon::from_grid_square(grid).ok_or_else(invalid),
        [lat, lon] if DECIMAL_REGEX.is_match(lat) && DECIMAL_REGEX.is_match(lon) => {
            let lat = parse_latitude(lat)?;
            let lon = parse_longitude(lon)?;
            Ok(LatLon::new(lat, lon))
        }
        _ => Err(invalid()),
    }
}

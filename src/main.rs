#![deny(clippy::all)]
#![forbid(unsafe_code)]

use chrono::{NaiveDate, Utc};
use std::path::{Path, PathBuf};
use std::process;
use structopt::StructOpt;
use tracing::{debug, info, warn, Level};

mod config;
mod error;
mod form;
mod geo;
mod mailbox;
mod order;
mod registry;
mod report;
mod station;
mod waypoint;

use config::{parse_qth, DateFilter, RunConfig};
use error::{ConfigError, Error, ExportError, Result};
use geo::LatLon;
use mailbox::MailScanner;
use order::{sort_stations, SortMode};
use registry::{StationRegistry, Upsert};
use report::{render_table, RunSummary};
use station::Station;

/// WInlink Position Extractor: collects the latest reported position of every station
/// found in Winlink form messages.
#[derive(StructOpt)]
#[structopt(name = "wipe")]
struct Args {
    /// Directory holding the Winlink messages, one per file
    #[structopt(name = "maildir", parse(from_os_str))]
    maildir: PathBuf,
    /// Write the positions as GPX waypoints to this file
    #[structopt(short = "o", long = "output", parse(from_os_str))]
    output: Option<PathBuf>,
    /// Write the positions as KML placemarks to this file
    #[structopt(long = "output-kml", parse(from_os_str))]
    output_kml: Option<PathBuf>,
    /// Only process messages dated on or after YYYY/MM/DD
    #[structopt(
        short = "a",
        long = "after",
        parse(try_from_str = parse_after),
        conflicts_with = "last-days"
    )]
    after: Option<NaiveDate>,
    /// Only process messages from the last N days
    #[structopt(short = "d", long = "last-days")]
    last_days: Option<u32>,
    /// Report rejected forms (-v) and parser details (-vv)
    #[structopt(short = "v", long = "verbose", parse(from_occurrences))]
    verbose: u8,
    /// Your location: a 6 or 8 character grid square or 'latitude,longitude'
    #[structopt(short = "q", long = "qth", allow_hyphen_values = true)]
    qth: Option<String>,
    /// Sort stations by time or callsign instead of distance
    #[structopt(short = "s", long = "sort-by", possible_values = &["time", "t", "callsign", "c"])]
    sort_by: Option<SortMode>,
}

fn parse_after(s: &str) -> std::result::Result<NaiveDate, chrono::ParseError> {
    NaiveDate::parse_from_str(s, "%Y/%m/%d")
}

impl Args {
    fn into_config(self) -> std::result::Result<RunConfig, ConfigError> {
        let qth = self.qth.as_deref().map(parse_qth).transpose()?;
        let date_filter = match (self.after, self.last_days) {
            (Some(date), _) => Some(DateFilter::After(date)),
            (None, Some(days)) => Some(DateFilter::LastDays(days)),
            (None, None) => None,
        };

        Ok(RunConfig {
            maildir: self.maildir,
            gpx_output: self.output,
            kml_output: self.output_kml,
            date_filter,
            verbosity: self.verbose,
            qth,
            sort_mode: self.sort_by.unwrap_or_default(),
        })
    }
}

fn init_logging(verbosity: u8) {
    let level = match verbosity {
        0 => Level::WARN,
        1 => Level::INFO,
        _ => Level::DEBUG,
    };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

/// Runs every accepted message through form extraction and validation into a registry.
fn collect_positions(maildir: &Path, scanner: MailScanner) -> Result<(StationRegistry, RunSummary)> {
    let mut registry = StationRegistry::new();
    let mut forms_found = 0;
    let mut forms_rejected = 0;

    let scan = scanner.scan(maildir, |path, text| {
        for form in form::extract_forms(text) {
            forms_found += 1;

            let fields = match form {
                Ok(fields) => fields,
                Err(e) => {
                    forms_rejected += 1;
                    debug!("{}: discarding form: {}", path.display(), e);
                    continue;
                }
            };

            match Station::new(
                &fields.sender,
                &fields.latitude,
                &fields.longitude,
                &fields.timestamp,
            ) {
                Ok(station) => {
                    let callsign = station.callsign.clone();
                    let reported_at = station.reported_at;
                    if registry.upsert(station) == Upsert::Kept {
                        debug!(
                            "{}: report for {} at {} ignored, keeping {:?}",
                            path.display(),
                            callsign,
                            reported_at,
                            registry.get(&callsign).map(|s| s.reported_at)
                        );
                    } else {
                        debug!("{}: position of {} at {}", path.display(), callsign, reported_at);
                    }
                }
                Err(e) => {
                    forms_rejected += 1;
                    info!("{}: error in station data: {}", path.display(), e);
                }
            }
        }
    })?;

    let summary = RunSummary {
        scan,
        forms_found,
        forms_rejected,
        positions: registry.count(),
    };
    Ok((registry, summary))
}

type Exporter = fn(&Path, &[Station], Option<LatLon>) -> std::result::Result<(), ExportError>;

fn export_positions(config: &RunConfig, stations: &[Station]) -> Result<()> {
    let targets: [(Option<&PathBuf>, Exporter); 2] = [
        (config.gpx_output.as_ref(), waypoint::export_gpx),
        (config.kml_output.as_ref(), waypoint::export_kml),
    ];

    for (path, export) in targets.iter() {
        if let Some(path) = path {
            match export(path, stations, config.qth) {
                Err(ExportError::NoStations) => {
                    warn!("No positions found, {} not written", path.display())
                }
                result => result?,
            }
        }
    }
    Ok(())
}

fn run(config: &RunConfig) -> Result<()> {
    if let Some(qth) = config.qth {
        println!("Specified QTH coordinates are:");
        println!("   Latitude: {:.5}", qth.lat());
        println!("  Longitude: {:.5}", qth.lon());
    }

    let cutoff = config
        .date_filter
        .map(|filter| filter.cutoff(Utc::now().date_naive()));
    match cutoff {
        Some(date) => println!(
            "Scanning emails sent on or later than {} (UTC) ...",
            date.format("%Y/%m/%d")
        ),
        None => println!("Scanning all emails ..."),
    }

    let (registry, summary) = collect_positions(&config.maildir, MailScanner::new(cutoff))?;
    println!("{}", summary);

    let stations = sort_stations(registry.values().cloned(), config.sort_mode, config.qth);
    print!("{}", render_table(&stations, config.qth));

    export_positions(config, &stations)
}

fn main() {
    let result = Args::from_args()
        .into_config()
        .map_err(Error::from)
        .and_then(|config| {
            init_logging(config.verbosity);
            run(&config)
        });

    if let Err(e) = result {
        eprintln!("{}", e);
        process::exit(1);
    }
}

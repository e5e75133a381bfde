use chrono::NaiveDate;
use lazy_static::lazy_static;
use regex::Regex;
use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::path::Path;
use tracing::{debug, warn};
use walkdir::WalkDir;

use crate::error::{Error, Result};

/// How far into a message the `Date:` header is looked for.
pub const HEADER_SCAN_LINES: usize = 500;

lazy_static! {
    static ref DATE_HEADER: Regex =
        Regex::new(r"^Date: ([0-9]{4}/[0-9]{2}/[0-9]{2}) [0-9]{2}:[0-9]{2}").unwrap();
}

/// Counters for one pass over a mail directory.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ScanStats {
    /// Regular files seen in the directory.
    pub total_files: usize,
    /// Files that passed the date filter and were read in full.
    pub scanned_files: usize,
    /// Entries skipped because they could not be read.
    pub unreadable_files: usize,
}

/// Messages are stored one per file; bytes are taken as Latin-1 so any content decodes.
fn decode_latin1(bytes: &[u8]) -> String {
    bytes.iter().map(|&b| char::from(b)).collect()
}

/// Date of the first `Date: YYYY/MM/DD HH:MM` header within the first
/// [`HEADER_SCAN_LINES`] lines.
pub fn header_date<R: BufRead>(reader: R) -> io::Result<Option<NaiveDate>> {
    for line in reader.split(b'\n').take(HEADER_SCAN_LINES) {
        let line = decode_latin1(&line?);
        if let Some(cap) = DATE_HEADER.captures(&line) {
            if let Ok(date) = NaiveDate::parse_from_str(&cap[1], "%Y/%m/%d") {
                return Ok(Some(date));
            }
        }
    }
    Ok(None)
}

#[derive(Clone, Copy, Debug, Default)]
pub struct MailScanner {
    cutoff: Option<NaiveDate>,
}

impl MailScanner {
    /// With a cutoff only messages dated on or after it are read.
    pub fn new(cutoff: Option<NaiveDate>) -> Self {
        MailScanner { cutoff }
    }

    /// Reads every accepted message in `dir`, in file name order, and hands its text to `visit`.
    pub fn scan<P, F>(&self, dir: P, mut visit: F) -> Result<ScanStats>
    where
        P: AsRef<Path>,
        F: FnMut(&Path, &str),
    {
        let dir = dir.as_ref();
        if !dir.is_dir() {
            return Err(Error::MailDir {
                path: dir.display().to_string(),
            });
        }

        let mut stats = ScanStats::default();
        let entries = WalkDir::new(dir)
            .min_depth(1)
            .max_depth(1)
            .sort_by_file_name();

        for entry in entries {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) => {
                    warn!("Skipping unreadable directory entry: {}", e);
                    stats.unreadable_files += 1;
                    continue;
                }
            };
            if !entry.file_type().is_file() {
                continue;
            }
            stats.total_files += 1;

            match self.read_mail(entry.path()) {
                Ok(Some(text)) => {
                    stats.scanned_files += 1;
                    visit(entry.path(), &text);
                }
                Ok(None) => debug!("{}: outside the date range", entry.path().display()),
                Err(e) => {
                    warn!("Skipping {}: {}", entry.path().display(), e);
                    stats.unreadable_files += 1;
                }
            }
        }

        Ok(stats)
    }

    fn read_mail(&self, path: &Path) -> io::Result<Option<String>> {
        if let Some(cutoff) = self.cutoff {
            match header_date(BufReader::new(File::open(path)?))? {
                Some(date) if date >= cutoff => (),
                _ => return Ok(None),
            }
        }
        Ok(Some(decode_latin1(&std::fs::read(path)?)))
    }
}

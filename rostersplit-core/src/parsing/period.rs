use crate::error::ExtractionError;
use chrono::{Datelike, NaiveDate};
use regex::{Captures, Regex};
use std::sync::LazyLock;

/// German month names as printed by the roster system
const MONTHS: [(&str, u32); 12] = [
    ("Januar", 1),
    ("Februar", 2),
    ("März", 3),
    ("April", 4),
    ("Mai", 5),
    ("Juni", 6),
    ("Juli", 7),
    ("August", 8),
    ("September", 9),
    ("Oktober", 10),
    ("November", 11),
    ("Dezember", 12),
];

const MIN_YEAR: i32 = 1900;
const MAX_YEAR: i32 = 2100;

static DATE_TOKEN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"([0-9]{2})\.([0-9]{2})\.([0-9]{4})").unwrap());

static MONTH_YEAR: LazyLock<Regex> = LazyLock::new(|| {
    let names: Vec<&str> = MONTHS.iter().map(|(name, _)| *name).collect();
    Regex::new(&format!(r"({})\s+([0-9]{{4}})", names.join("|"))).unwrap()
});

/// Reporting period a page is filed under
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportingPeriod {
    /// Taken from the month name in the period descriptor
    Month { year: i32, month: u32 },
    /// Taken from the trailing date
    Day(NaiveDate),
}

impl ReportingPeriod {
    /// `YYYY_MM` or `YYYY_MM_DD`
    pub fn key(&self) -> String {
        match self {
            ReportingPeriod::Month { year, month } => format!("{year:04}_{month:02}"),
            ReportingPeriod::Day(date) => {
                format!("{:04}_{:02}_{:02}", date.year(), date.month(), date.day())
            }
        }
    }
}

pub struct PeriodExtractor {
    marker: String,
}

impl Default for PeriodExtractor {
    fn default() -> Self {
        Self::new("Zeitraum:")
    }
}

impl PeriodExtractor {
    pub fn new(marker: impl Into<String>) -> Self {
        Self {
            marker: marker.into(),
        }
    }

    /// Derive the reporting period from a full page of text.
    ///
    /// The descriptor (text between the marker and the first date) may name a
    /// month. If that month/year disagrees with the last date on the page the
    /// period spans a month boundary and the coarse month key wins; otherwise
    /// the exact trailing date is used.
    pub fn extract(&self, text: &str) -> Result<ReportingPeriod, ExtractionError> {
        let marker_at = text
            .find(&self.marker)
            .ok_or(ExtractionError::MissingPeriodMarker)?;
        let after_marker = marker_at + self.marker.len();

        let descriptor = period_descriptor(&text[after_marker..]);
        let date = trailing_date(text, after_marker)?;

        if let Some((year, month)) = month_in_descriptor(descriptor) {
            if year != date.year() || month != date.month() {
                return Ok(ReportingPeriod::Month { year, month });
            }
        }

        Ok(ReportingPeriod::Day(date))
    }
}

/// Date tokens not embedded in longer digit runs
fn date_tokens(text: &str) -> impl Iterator<Item = Captures<'_>> {
    DATE_TOKEN.captures_iter(text).filter(move |caps| {
        let Some(whole) = caps.get(0) else {
            return false;
        };
        let before = text[..whole.start()].chars().next_back();
        let after = text[whole.end()..].chars().next();
        !before.is_some_and(|c| c.is_ascii_digit()) && !after.is_some_and(|c| c.is_ascii_digit())
    })
}

fn period_descriptor(after_marker: &str) -> &str {
    let end = date_tokens(after_marker)
        .next()
        .and_then(|caps| caps.get(0))
        .map(|m| m.start())
        .unwrap_or(after_marker.len());
    after_marker[..end].trim()
}

/// Last date after the marker, or the last date anywhere if none follows it
fn trailing_date(text: &str, after_marker: usize) -> Result<NaiveDate, ExtractionError> {
    let caps = date_tokens(&text[after_marker..])
        .last()
        .or_else(|| date_tokens(text).last())
        .ok_or(ExtractionError::MissingTrailingDate)?;
    parse_date(&caps)
}

fn parse_date(caps: &Captures<'_>) -> Result<NaiveDate, ExtractionError> {
    let token = caps.get(0).map(|m| m.as_str()).unwrap_or_default();
    let invalid = || ExtractionError::DateParseError(token.to_string());

    let day: u32 = caps[1].parse().map_err(|_| invalid())?;
    let month: u32 = caps[2].parse().map_err(|_| invalid())?;
    let year: i32 = caps[3].parse().map_err(|_| invalid())?;

    if !(MIN_YEAR..=MAX_YEAR).contains(&year) {
        return Err(invalid());
    }
    NaiveDate::from_ymd_opt(year, month, day).ok_or_else(invalid)
}

fn month_in_descriptor(descriptor: &str) -> Option<(i32, u32)> {
    let caps = MONTH_YEAR.captures(descriptor)?;
    let month = MONTHS
        .iter()
        .find(|(name, _)| *name == &caps[1])
        .map(|(_, number)| *number)?;
    let year = caps[2].parse().ok()?;
    Some((year, month))
}

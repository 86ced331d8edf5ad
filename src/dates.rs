//! Date resolution for cell values and named date-range presets.
//!
//! [`try_parse_date`] tries four strategies in a fixed order: native dates,
//! spreadsheet serial numbers, day-first `D/M/YYYY` strings, and finally the
//! generic ISO/RFC/month-name formats. All results are local wall-clock times.

use std::sync::OnceLock;

use chrono::{DateTime, Duration, Local, NaiveDate, NaiveDateTime, NaiveTime};
use regex::Regex;

use crate::data::CellValue;

/// Largest serial a spreadsheet can hold (9999-12-31).
const MAX_SERIAL: f64 = 2_958_465.0;
/// Serial 60 is the fictitious 1900-02-29.
const PHANTOM_LEAP_DAY: i64 = 60;

const GENERIC_DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M",
    "%Y/%m/%d %H:%M:%S",
];

const GENERIC_DATE_FORMATS: &[&str] = &[
    "%Y-%m-%d",
    "%Y/%m/%d",
    "%d %b %Y",
    "%d %B %Y",
    "%b %d, %Y",
    "%B %d, %Y",
    "%b %d %Y",
];

fn day_first_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"^([0-3]?\d)[/\-.]([0-1]?\d)[/\-.](\d{4})$").expect("valid day-first regex")
    })
}

pub fn start_of_day(date: NaiveDate) -> NaiveDateTime {
    date.and_time(NaiveTime::MIN)
}

pub fn end_of_day(date: NaiveDate) -> NaiveDateTime {
    let last = NaiveTime::from_hms_milli_opt(23, 59, 59, 999).unwrap_or(NaiveTime::MIN);
    date.and_time(last)
}

pub fn try_parse_date(value: &CellValue) -> Option<NaiveDateTime> {
    match value {
        CellValue::Date(dt) => Some(*dt),
        CellValue::Number(n) if n.is_finite() => serial_to_date(*n).map(start_of_day),
        CellValue::Text(s) => parse_date_text(s),
        CellValue::Number(_) | CellValue::Empty => None,
    }
}

/// Decodes a 1900-system spreadsheet serial into a calendar date.
pub fn serial_to_date(serial: f64) -> Option<NaiveDate> {
    if !(0.0..=MAX_SERIAL).contains(&serial) {
        return None;
    }
    let days = serial.floor() as i64;
    match days {
        0 => None,
        PHANTOM_LEAP_DAY => NaiveDate::from_ymd_opt(1900, 3, 1),
        d if d < PHANTOM_LEAP_DAY => {
            NaiveDate::from_ymd_opt(1899, 12, 31)?.checked_add_signed(Duration::days(d))
        }
        d => NaiveDate::from_ymd_opt(1899, 12, 30)?.checked_add_signed(Duration::days(d)),
    }
}

fn parse_date_text(raw: &str) -> Option<NaiveDateTime> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }
    if let Some(caps) = day_first_pattern().captures(trimmed) {
        let day = caps[1].parse::<u32>().ok()?;
        let month = caps[2].parse::<u32>().ok()?;
        let year = caps[3].parse::<i32>().ok()?;
        return NaiveDate::from_ymd_opt(year, month, day).map(start_of_day);
    }
    parse_generic(trimmed)
}

fn parse_generic(value: &str) -> Option<NaiveDateTime> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return Some(dt.with_timezone(&Local).naive_local());
    }
    if let Ok(dt) = DateTime::parse_from_rfc2822(value) {
        return Some(dt.with_timezone(&Local).naive_local());
    }
    GENERIC_DATETIME_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(value, fmt).ok())
        .or_else(|| {
            GENERIC_DATE_FORMATS
                .iter()
                .find_map(|fmt| NaiveDate::parse_from_str(value, fmt).ok())
                .map(start_of_day)
        })
}

/// Inclusive range check; an absent bound leaves that side open.
pub fn within_range(
    date: NaiveDateTime,
    start: Option<NaiveDateTime>,
    end: Option<NaiveDateTime>,
) -> bool {
    if start.is_some_and(|s| date < s) {
        return false;
    }
    if end.is_some_and(|e| date > e) {
        return false;
    }
    true
}

pub type Bounds = (Option<NaiveDateTime>, Option<NaiveDateTime>);

/// Resolves a preset name relative to `now`. Unknown names, `all` included,
/// are unbounded.
pub fn preset_range(preset: &str, now: NaiveDateTime) -> Bounds {
    let lookback = match preset {
        "today" => 0,
        "last7" => 6,
        "last30" => 29,
        _ => return (None, None),
    };
    let today = now.date();
    let start = today - Duration::days(lookback);
    (Some(start_of_day(start)), Some(end_of_day(today)))
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum DateRange {
    #[default]
    All,
    Today,
    Last7,
    Last30,
    Custom {
        start: Option<NaiveDateTime>,
        end: Option<NaiveDateTime>,
    },
}

impl DateRange {
    /// Maps a preset name to a range; unknown names mean [`DateRange::All`].
    pub fn from_preset_name(name: &str) -> Self {
        match name {
            "today" => DateRange::Today,
            "last7" => DateRange::Last7,
            "last30" => DateRange::Last30,
            _ => DateRange::All,
        }
    }

    /// A custom range covering whole calendar days.
    pub fn custom_days(from: Option<NaiveDate>, to: Option<NaiveDate>) -> Self {
        DateRange::Custom {
            start: from.map(start_of_day),
            end: to.map(end_of_day),
        }
    }

    pub fn preset_name(&self) -> &'static str {
        match self {
            DateRange::All => "all",
            DateRange::Today => "today",
            DateRange::Last7 => "last7",
            DateRange::Last30 => "last30",
            DateRange::Custom { .. } => "custom",
        }
    }

    pub fn is_all(&self) -> bool {
        matches!(self, DateRange::All)
    }

    pub fn bounds(&self, now: NaiveDateTime) -> Bounds {
        match self {
            DateRange::Custom { start, end } => (*start, *end),
            other => preset_range(other.preset_name(), now),
        }
    }

    pub fn label(&self) -> String {
        match self {
            DateRange::All => "Select date range".to_string(),
            DateRange::Today => "Today".to_string(),
            DateRange::Last7 => "Last 7 days".to_string(),
            DateRange::Last30 => "Last 30 days".to_string(),
            DateRange::Custom { start, end } => {
                format!("{} → {}", short_label(*start), short_label(*end))
            }
        }
    }
}

fn short_label(value: Option<NaiveDateTime>) -> String {
    value
        .map(|dt| dt.format("%d %b %Y").to_string())
        .unwrap_or_else(|| "—".to_string())
}

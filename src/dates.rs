use chrono::{DateTime, Datelike, FixedOffset, LocalResult, NaiveDate, NaiveDateTime, NaiveTime, TimeZone, Utc};
use chrono_tz::Tz;
use once_cell::sync::Lazy;
use regex::Regex;

use crate::locale::Locale;

/// Fixed UTC-3. The IANA `Etc/GMT+3` name has the inverted sign.
pub const DEFAULT_ZONE: Tz = chrono_tz::Etc::GMTPlus3;

const PLACEHOLDER: &str = "--";

static ISO_DATE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(\d{4})-(\d{2})-(\d{2})$").expect("valid iso date regex"));
static DAY_FIRST_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(\d{2})[/\-.](\d{2})[/\-.](\d{4})(?:[ T](\d{2}):(\d{2}))?$")
        .expect("valid day-first regex")
});

/// Whatever a date cell may hold before normalization.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DateInput<'a> {
    Instant(DateTime<FixedOffset>),
    Text(&'a str),
    Missing,
}

impl<'a> From<&'a str> for DateInput<'a> {
    fn from(text: &'a str) -> Self {
        DateInput::Text(text)
    }
}

impl<'a> From<Option<&'a str>> for DateInput<'a> {
    fn from(text: Option<&'a str>) -> Self {
        text.map_or(DateInput::Missing, DateInput::Text)
    }
}

impl<'a, Z: TimeZone> From<DateTime<Z>> for DateInput<'a> {
    fn from(instant: DateTime<Z>) -> Self {
        DateInput::Instant(instant.fixed_offset())
    }
}

/// Normalizes a date cell into an instant, or `None` when it cannot be read.
///
/// Text is tried as a generic ISO 8601 / RFC 2822 timestamp first, then as a
/// bare `YYYY-MM-DD`, then as `DD/MM/YYYY[ HH:MM]` (with `/`, `-` or `.`).
/// Wall-clock values without an offset are placed in `zone`. Day and month
/// order is only ever taken from those shapes, never guessed.
pub fn parse_date<'a>(input: impl Into<DateInput<'a>>, zone: Tz) -> Option<DateTime<FixedOffset>> {
    let text = match input.into() {
        DateInput::Instant(instant) => return Some(instant),
        DateInput::Missing => return None,
        DateInput::Text(text) => text.trim(),
    };
    if text.is_empty() {
        return None;
    }

    parse_generic(text, zone)
        .or_else(|| parse_iso_date(text, zone))
        .or_else(|| parse_day_first(text, zone))
}

/// ISO shapes that carry their own offset (`+03:00` or `+0300`).
const OFFSET_FORMATS: [&str; 6] = [
    "%Y-%m-%dT%H:%M:%S%.f%z",
    "%Y-%m-%d %H:%M:%S%.f%z",
    "%Y-%m-%dT%H:%M%:z",
    "%Y-%m-%d %H:%M%:z",
    "%Y-%m-%dT%H:%M%z",
    "%Y-%m-%d %H:%M%z",
];
/// Minute precision with a `Z` suffix, which RFC 3339 does not allow.
const UTC_FORMATS: [&str; 2] = ["%Y-%m-%dT%H:%MZ", "%Y-%m-%d %H:%MZ"];
/// Wall clocks without an offset.
const WALL_CLOCK_FORMATS: [&str; 4] = [
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
];

fn parse_generic(text: &str, zone: Tz) -> Option<DateTime<FixedOffset>> {
    if let Ok(instant) = DateTime::parse_from_rfc3339(text) {
        return Some(instant);
    }
    for fmt in OFFSET_FORMATS {
        if let Ok(instant) = DateTime::parse_from_str(text, fmt) {
            return Some(instant);
        }
    }
    for fmt in UTC_FORMATS {
        if let Ok(naive) = NaiveDateTime::parse_from_str(text, fmt) {
            return Some(Utc.from_utc_datetime(&naive).fixed_offset());
        }
    }
    if let Ok(instant) = DateTime::parse_from_rfc2822(text) {
        return Some(instant);
    }
    for fmt in WALL_CLOCK_FORMATS {
        if let Ok(naive) = NaiveDateTime::parse_from_str(text, fmt) {
            return in_zone(naive, zone);
        }
    }
    None
}

fn parse_iso_date(text: &str, zone: Tz) -> Option<DateTime<FixedOffset>> {
    let caps = ISO_DATE_RE.captures(text)?;
    let date = NaiveDate::from_ymd_opt(
        caps[1].parse().ok()?,
        caps[2].parse().ok()?,
        caps[3].parse().ok()?,
    )?;
    in_zone(date.and_time(NaiveTime::from_hms_opt(0, 0, 0)?), zone)
}

fn parse_day_first(text: &str, zone: Tz) -> Option<DateTime<FixedOffset>> {
    let caps = DAY_FIRST_RE.captures(text)?;
    let date = NaiveDate::from_ymd_opt(
        caps[3].parse().ok()?,
        caps[2].parse().ok()?,
        caps[1].parse().ok()?,
    )?;
    let hour = caps.get(4).map_or(Some(0), |m| m.as_str().parse().ok())?;
    let minute = caps.get(5).map_or(Some(0), |m| m.as_str().parse().ok())?;
    let time = NaiveTime::from_hms_opt(hour, minute, 0)?;
    in_zone(date.and_time(time), zone)
}

fn in_zone(naive: NaiveDateTime, zone: Tz) -> Option<DateTime<FixedOffset>> {
    match zone.from_local_datetime(&naive) {
        LocalResult::Single(dt) => Some(dt.fixed_offset()),
        LocalResult::Ambiguous(dt, _) => Some(dt.fixed_offset()),
        LocalResult::None => None,
    }
}

/// Calendar day of `instant` as seen in `zone`.
pub fn local_day(instant: &DateTime<FixedOffset>, zone: Tz) -> NaiveDate {
    instant.with_timezone(&zone).date_naive()
}

pub fn today_in(zone: Tz) -> NaiveDate {
    Utc::now().with_timezone(&zone).date_naive()
}

/// Month and day shown in the date block of a card.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CardDate {
    pub month: &'static str,
    pub day: String,
}

impl CardDate {
    pub fn from_input<'a>(input: impl Into<DateInput<'a>>, zone: Tz, locale: Locale) -> Self {
        match parse_date(input, zone) {
            Some(instant) => {
                let local = instant.with_timezone(&zone);
                Self {
                    month: locale.month_abbrev(local.month0()),
                    day: format!("{:02}", local.day()),
                }
            }
            None => Self {
                month: PLACEHOLDER,
                day: PLACEHOLDER.to_string(),
            },
        }
    }
}

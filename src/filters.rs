use chrono::NaiveDate;
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};

use crate::dates::{self, parse_date};
use crate::models::EventRecord;

/// Current values of the three filter controls.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Filters {
    /// Exact, case-insensitive match against the record `type`.
    #[serde(rename = "type")]
    pub kind: String,
    /// Substring of the record venue.
    pub venue: String,
    /// Substring of title, artists and venue together.
    pub search: String,
}

/// One of the three inputs a host page binds to value-change events.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Control {
    Type,
    Venue,
    Search,
}

impl Control {
    pub const ALL: [Control; 3] = [Control::Type, Control::Venue, Control::Search];

    /// `id` of the matching input element on the page.
    pub fn element_id(self) -> &'static str {
        match self {
            Control::Type => "filter-type",
            Control::Venue => "filter-venue",
            Control::Search => "search",
        }
    }

    pub fn from_element_id(id: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|control| control.element_id() == id)
    }
}

impl Filters {
    pub fn value(&self, control: Control) -> &str {
        match control {
            Control::Type => &self.kind,
            Control::Venue => &self.venue,
            Control::Search => &self.search,
        }
    }

    pub fn set(&mut self, control: Control, value: impl Into<String>) {
        let slot = match control {
            Control::Type => &mut self.kind,
            Control::Venue => &mut self.venue,
            Control::Search => &mut self.search,
        };
        *slot = value.into();
    }

    pub fn is_empty(&self) -> bool {
        needle(&self.kind).is_none()
            && needle(&self.venue).is_none()
            && needle(&self.search).is_none()
    }
}

/// Narrows `records` to events on or after `today` that pass every set
/// filter, sorted by date. Records sharing an instant keep their input order.
///
/// `today` and every record date are compared as calendar days in `zone`.
pub fn apply_filters<'a>(
    records: &'a [EventRecord],
    filters: &Filters,
    today: NaiveDate,
    zone: Tz,
) -> Vec<&'a EventRecord> {
    let kind = needle(&filters.kind);
    let venue = needle(&filters.venue);
    let search = needle(&filters.search);

    let mut upcoming: Vec<_> = records
        .iter()
        .filter_map(|record| {
            let start = parse_date(record.date.as_deref(), zone)?;
            (dates::local_day(&start, zone) >= today).then_some((start, record))
        })
        .filter(|(_, record)| match &kind {
            Some(kind) => lowered(record.kind.as_deref()) == *kind,
            None => true,
        })
        .filter(|(_, record)| match &venue {
            Some(venue) => record.venue_or_default().to_lowercase().contains(venue.as_str()),
            None => true,
        })
        .filter(|(_, record)| match &search {
            Some(search) => haystack(record).contains(search.as_str()),
            None => true,
        })
        .collect();

    upcoming.sort_by_key(|(start, _)| *start);
    upcoming.into_iter().map(|(_, record)| record).collect()
}

/// Lowercased control value; whitespace-only counts as unset.
fn needle(value: &str) -> Option<String> {
    if value.trim().is_empty() {
        None
    } else {
        Some(value.to_lowercase())
    }
}

fn lowered(value: Option<&str>) -> String {
    value.unwrap_or("").to_lowercase()
}

fn haystack(record: &EventRecord) -> String {
    format!(
        "{} {} {}",
        record.title_or_default(),
        record.artists.as_deref().unwrap_or(""),
        record.venue_or_default()
    )
    .to_lowercase()
}

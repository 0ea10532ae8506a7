//! Footfall record model and the dataset handed to every analytics call.
//!
//! A [`Dataset`] is the validated, immutable input of the engine. It is built
//! once per upload (see [`validate`]) and passed explicitly into each
//! computation; nothing in the engine retains it between calls.

use serde::Serialize;
use time::format_description::BorrowedFormatItem;
use time::format_description::well_known::Rfc3339;
use time::macros::format_description;
use time::{Date, OffsetDateTime, PrimitiveDateTime, Time};

pub mod sample;
pub mod validate;

pub const TIMESTAMP_COLUMN: &str = "timestamp";
pub const FOOTFALL_COLUMN: &str = "footfall";
pub const LATITUDE_COLUMN: &str = "latitude";
pub const LONGITUDE_COLUMN: &str = "longitude";
pub const REQUIRED_COLUMNS: [&str; 2] = [TIMESTAMP_COLUMN, FOOTFALL_COLUMN];
/// Largest footfall a single row may carry. Keeps `u64` totals exact.
pub const MAX_FOOTFALL: u64 = u32::MAX as u64;

// Naive timestamps carry no offset and are read as UTC wall-clock time.
const NAIVE_DATETIME_FORMATS: &[&[BorrowedFormatItem<'static>]] = &[
    format_description!("[year]-[month]-[day] [hour]:[minute]:[second].[subsecond]"),
    format_description!("[year]-[month]-[day] [hour]:[minute]:[second]"),
    format_description!("[year]-[month]-[day] [hour]:[minute]"),
    format_description!("[year]-[month]-[day]T[hour]:[minute]:[second].[subsecond]"),
    format_description!("[year]-[month]-[day]T[hour]:[minute]:[second]"),
    format_description!("[year]-[month]-[day]T[hour]:[minute]"),
];
const DATE_FORMAT: &[BorrowedFormatItem<'static>] = format_description!("[year]-[month]-[day]");

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FootfallRecord {
    #[serde(with = "time::serde::rfc3339")]
    pub timestamp: OffsetDateTime,
    pub footfall: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub latitude: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub longitude: Option<f64>,
}

impl FootfallRecord {
    pub fn new(timestamp: OffsetDateTime, footfall: u64) -> Self {
        Self {
            timestamp,
            footfall,
            latitude: None,
            longitude: None,
        }
    }

    pub fn with_location(mut self, latitude: f64, longitude: f64) -> Self {
        self.latitude = Some(latitude);
        self.longitude = Some(longitude);
        self
    }

    /// Hour of day in the timestamp's own offset.
    pub fn hour(&self) -> u8 {
        self.timestamp.hour()
    }

    /// Calendar date in the timestamp's own offset.
    pub fn date(&self) -> Date {
        self.timestamp.date()
    }

    /// Both coordinates, or `None` when either is missing.
    pub fn coordinates(&self) -> Option<(f64, f64)> {
        Some((self.latitude?, self.longitude?))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct DataPeriod {
    #[serde(with = "time::serde::rfc3339")]
    pub start: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub end: OffsetDateTime,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct Dataset {
    /// Records in upload order, not necessarily chronological.
    pub records: Vec<FootfallRecord>,
    /// Whether the upload advertised both coordinate columns.
    pub has_location_data: bool,
}

impl Dataset {
    pub fn new(records: Vec<FootfallRecord>, has_location_data: bool) -> Self {
        Self {
            records,
            has_location_data,
        }
    }

    pub fn records(&self) -> &[FootfallRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn period(&self) -> Option<DataPeriod> {
        let start = self.records.iter().map(|r| r.timestamp).min()?;
        let end = self.records.iter().map(|r| r.timestamp).max()?;
        Some(DataPeriod { start, end })
    }
}

/// Records ordered by timestamp. Equal timestamps keep their upload order.
pub fn chronological(records: &[FootfallRecord]) -> Vec<&FootfallRecord> {
    let mut ordered: Vec<&FootfallRecord> = records.iter().collect();
    ordered.sort_by_key(|record| record.timestamp);
    ordered
}

/// Parses RFC 3339 timestamps and the naive `YYYY-MM-DD HH:MM[:SS]` forms.
pub fn parse_timestamp(value: &str) -> Option<OffsetDateTime> {
    let value = value.trim();
    if let Ok(parsed) = OffsetDateTime::parse(value, &Rfc3339) {
        return Some(parsed);
    }
    for format in NAIVE_DATETIME_FORMATS {
        if let Ok(parsed) = PrimitiveDateTime::parse(value, *format) {
            return Some(parsed.assume_utc());
        }
    }
    Date::parse(value, DATE_FORMAT)
        .ok()
        .map(|date| PrimitiveDateTime::new(date, Time::MIDNIGHT).assume_utc())
}

/// `YYYY-MM-DD` key used for daily buckets.
pub fn date_key(date: Date) -> String {
    format!(
        "{:04}-{:02}-{:02}",
        date.year(),
        u8::from(date.month()),
        date.day()
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::datetime;

    #[test]
    fn parses_rfc3339_with_offset_and_keeps_local_hour() {
        let parsed = parse_timestamp("2024-01-01T10:30:00+05:30").expect("rfc3339 timestamp");

        assert_eq!(parsed.hour(), 10);
        assert_eq!(parsed, datetime!(2024-01-01 05:00 UTC));
    }

    #[test]
    fn parses_template_format_as_utc() {
        let parsed = parse_timestamp("2024-01-01 10:00").expect("template timestamp");

        assert_eq!(parsed, datetime!(2024-01-01 10:00 UTC));
    }

    #[test]
    fn parses_javascript_iso_strings() {
        let parsed = parse_timestamp("2024-01-05T23:00:00.000Z").expect("iso timestamp");

        assert_eq!(parsed.hour(), 23);
        assert_eq!(date_key(parsed.date()), "2024-01-05");
    }

    #[test]
    fn parses_bare_date_as_midnight() {
        let parsed = parse_timestamp("2024-02-29").expect("date only");

        assert_eq!(parsed, datetime!(2024-02-29 00:00 UTC));
    }

    #[test]
    fn rejects_unparseable_timestamp() {
        assert!(parse_timestamp("yesterday at noon").is_none());
        assert!(parse_timestamp("").is_none());
    }

    #[test]
    fn coordinates_require_both_values() {
        let mut record = FootfallRecord::new(datetime!(2024-01-01 00:00 UTC), 3);
        record.latitude = Some(19.0);

        assert_eq!(record.coordinates(), None);
        assert_eq!(
            record.with_location(19.0, 72.8).coordinates(),
            Some((19.0, 72.8))
        );
    }

    #[test]
    fn period_uses_chronological_bounds_not_upload_order() {
        let dataset = Dataset::new(
            vec![
                FootfallRecord::new(datetime!(2024-01-03 08:00 UTC), 1),
                FootfallRecord::new(datetime!(2024-01-01 09:00 UTC), 1),
                FootfallRecord::new(datetime!(2024-01-02 10:00 UTC), 1),
            ],
            false,
        );

        let period = dataset.period().expect("non-empty period");

        assert_eq!(period.start, datetime!(2024-01-01 09:00 UTC));
        assert_eq!(period.end, datetime!(2024-01-03 08:00 UTC));
        assert!(Dataset::default().period().is_none());
    }

    #[test]
    fn chronological_is_stable_for_equal_timestamps() {
        let at = datetime!(2024-01-01 12:00 UTC);
        let records = vec![
            FootfallRecord::new(datetime!(2024-01-01 13:00 UTC), 9),
            FootfallRecord::new(at, 1),
            FootfallRecord::new(at, 2),
        ];

        let ordered: Vec<u64> = chronological(&records).iter().map(|r| r.footfall).collect();

        assert_eq!(ordered, vec![1, 2, 9]);
    }
}

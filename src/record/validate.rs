//! Turns a raw parsed table into a [`Dataset`].
//!
//! Column detection is header-level: required and location columns are
//! looked up in the first row only. Individual rows may still lack
//! coordinate values even when the header advertised them; those rows stay
//! in the dataset and are only excluded from location analysis.

use crate::error::SchemaError;
use crate::record::{
    Dataset, FOOTFALL_COLUMN, FootfallRecord, LATITUDE_COLUMN, LONGITUDE_COLUMN, MAX_FOOTFALL,
    REQUIRED_COLUMNS, TIMESTAMP_COLUMN, parse_timestamp,
};
use serde::Serialize;
use serde_json::{Map, Value};
use tracing::{debug, warn};

/// One row of an uploaded table, keyed by column name.
pub type RawRow = Map<String, Value>;

pub const NO_LOCATION_NOTICE: &str =
    "Heatmap features will be disabled due to missing geolocation data";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValidationReport {
    pub record_count: usize,
    pub has_location_data: bool,
    /// Rows whose header advertised coordinates but which lack a value.
    pub rows_missing_coordinates: usize,
    pub notices: Vec<String>,
}

pub fn validate(rows: &[RawRow]) -> Result<(Dataset, ValidationReport), SchemaError> {
    let first = rows.first().ok_or(SchemaError::EmptyTable)?;

    let missing: Vec<String> = REQUIRED_COLUMNS
        .iter()
        .filter(|column| !first.contains_key(**column))
        .map(|column| column.to_string())
        .collect();
    if !missing.is_empty() {
        return Err(SchemaError::MissingColumns(missing));
    }

    let has_location_data = detect_location_columns(first);
    let mut records = Vec::with_capacity(rows.len());
    for (index, row) in rows.iter().enumerate() {
        records.push(parse_row(index + 1, row, has_location_data)?);
    }

    let rows_missing_coordinates = if has_location_data {
        records
            .iter()
            .filter(|record| record.coordinates().is_none())
            .count()
    } else {
        0
    };

    let mut notices = Vec::new();
    if !has_location_data {
        warn!("Uploaded table has no latitude/longitude columns");
        notices.push(NO_LOCATION_NOTICE.to_string());
    } else if rows_missing_coordinates > 0 {
        warn!(
            rows = rows_missing_coordinates,
            "Rows lack coordinate values despite location columns"
        );
        notices.push(format!(
            "{rows_missing_coordinates} rows lack coordinate values \
             and are excluded from location analysis"
        ));
    }

    debug!(
        records = records.len(),
        has_location_data, "Validated uploaded table"
    );

    let report = ValidationReport {
        record_count: records.len(),
        has_location_data,
        rows_missing_coordinates,
        notices,
    };
    Ok((Dataset::new(records, has_location_data), report))
}

/// True only when both coordinate columns appear in the given header row.
pub fn detect_location_columns(first_row: &RawRow) -> bool {
    first_row.contains_key(LATITUDE_COLUMN) && first_row.contains_key(LONGITUDE_COLUMN)
}

fn parse_row(
    row_number: usize,
    row: &RawRow,
    has_location_data: bool,
) -> Result<FootfallRecord, SchemaError> {
    let timestamp = match row.get(TIMESTAMP_COLUMN) {
        Some(Value::String(raw)) => parse_timestamp(raw).ok_or_else(|| {
            SchemaError::invalid(row_number, TIMESTAMP_COLUMN, format!("unrecognised '{raw}'"))
        })?,
        Some(Value::Null) | None => {
            return Err(SchemaError::invalid(
                row_number,
                TIMESTAMP_COLUMN,
                "missing value",
            ));
        }
        Some(other) => {
            return Err(SchemaError::invalid(
                row_number,
                TIMESTAMP_COLUMN,
                format!("expected a string, got {other}"),
            ));
        }
    };

    let footfall = parse_footfall(row.get(FOOTFALL_COLUMN))
        .map_err(|reason| SchemaError::invalid(row_number, FOOTFALL_COLUMN, reason))?;

    let mut record = FootfallRecord::new(timestamp, footfall);
    if has_location_data {
        record.latitude = parse_coordinate(row.get(LATITUDE_COLUMN))
            .map_err(|reason| SchemaError::invalid(row_number, LATITUDE_COLUMN, reason))?;
        record.longitude = parse_coordinate(row.get(LONGITUDE_COLUMN))
            .map_err(|reason| SchemaError::invalid(row_number, LONGITUDE_COLUMN, reason))?;
    }
    Ok(record)
}

fn parse_footfall(value: Option<&Value>) -> Result<u64, String> {
    let count = parse_count(value)?;
    if count > MAX_FOOTFALL {
        return Err(format!("must be at most {MAX_FOOTFALL}, got {count}"));
    }
    Ok(count)
}

fn parse_count(value: Option<&Value>) -> Result<u64, String> {
    match value {
        Some(Value::Number(number)) => {
            if let Some(count) = number.as_u64() {
                return Ok(count);
            }
            number
                .as_f64()
                .ok_or_else(|| format!("unsupported number {number}"))
                .and_then(whole_count)
        }
        Some(Value::String(raw)) => {
            let raw = raw.trim();
            if let Ok(count) = raw.parse::<u64>() {
                return Ok(count);
            }
            raw.parse::<f64>()
                .map_err(|_| format!("'{raw}' is not a number"))
                .and_then(whole_count)
        }
        Some(Value::Null) | None => Err("missing value".to_string()),
        Some(other) => Err(format!("expected a number, got {other}")),
    }
}

fn whole_count(value: f64) -> Result<u64, String> {
    if !value.is_finite() {
        Err("must be finite".to_string())
    } else if value < 0.0 {
        Err(format!("must be non-negative, got {value}"))
    } else if value.fract() != 0.0 {
        Err(format!("must be a whole number, got {value}"))
    } else if value > MAX_FOOTFALL as f64 {
        Err(format!("must be at most {MAX_FOOTFALL}, got {value}"))
    } else {
        Ok(value as u64)
    }
}

fn parse_coordinate(value: Option<&Value>) -> Result<Option<f64>, String> {
    let parsed = match value {
        Some(Value::Null) | None => return Ok(None),
        Some(Value::Number(number)) => number
            .as_f64()
            .ok_or_else(|| format!("unsupported number {number}"))?,
        Some(Value::String(raw)) if raw.trim().is_empty() => return Ok(None),
        Some(Value::String(raw)) => raw
            .trim()
            .parse::<f64>()
            .map_err(|_| format!("'{raw}' is not a number"))?,
        Some(other) => return Err(format!("expected a number, got {other}")),
    };
    if parsed.is_finite() {
        Ok(Some(parsed))
    } else {
        Err("must be finite".to_string())
    }
}

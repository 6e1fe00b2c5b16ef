//! Raw key-value equipment records.
//!
//! Database rows, remote lookups and vendor exports all arrive as flat
//! string-keyed maps. The accessors here pull typed values out of them and
//! report which schema and field were at fault.

use serde_json::{Map, Value};

use crate::error::{PlantError, PlantResult};

/// A raw equipment record: field name to JSON value.
pub type RawRecord = Map<String, Value>;

/// Numeric value of `field`, accepting numbers and numeric strings.
pub fn number(record: &RawRecord, schema: &str, field: &str) -> PlantResult<f64> {
    optional_number(record, schema, field)?.ok_or_else(|| PlantError::missing_field(schema, field))
}

/// Like [`number`], but a missing value is a unit conversion failure.
///
/// Used for fields that feed a derived quantity (reference currents and
/// voltages behind relative temperature coefficients, kW ratings, ...).
pub fn conversion_input(record: &RawRecord, schema: &str, field: &str) -> PlantResult<f64> {
    optional_number(record, schema, field)?.ok_or_else(|| {
        PlantError::UnitConversion(format!(
            "{schema} record is missing '{field}' needed for unit conversion"
        ))
    })
}

/// Numeric value of `field` if present and not null.
pub fn optional_number(record: &RawRecord, schema: &str, field: &str) -> PlantResult<Option<f64>> {
    match record.get(field) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::Number(n)) => Ok(n.as_f64()),
        Some(Value::String(s)) if s.trim().is_empty() => Ok(None),
        Some(Value::String(s)) => s.trim().parse::<f64>().map(Some).map_err(|_| {
            PlantError::Configuration(format!(
                "{schema} field '{field}' is not numeric: '{s}'"
            ))
        }),
        Some(other) => Err(PlantError::Configuration(format!(
            "{schema} field '{field}' is not numeric: {other}"
        ))),
    }
}

/// Text value of `field`; numbers are rendered as text.
pub fn text(record: &RawRecord, schema: &str, field: &str) -> PlantResult<String> {
    match record.get(field) {
        None | Some(Value::Null) => Err(PlantError::missing_field(schema, field)),
        Some(Value::String(s)) => Ok(s.clone()),
        Some(other) => Ok(other.to_string()),
    }
}

/// Text value of `field`, with a missing or blank cell read as `""`.
pub fn optional_text(record: &RawRecord, field: &str) -> String {
    match record.get(field) {
        None | Some(Value::Null) => String::new(),
        Some(Value::String(s)) => s.clone(),
        Some(other) => other.to_string(),
    }
}

/// Whole, non-negative count stored as a number (cells in series, ...).
pub fn count(record: &RawRecord, schema: &str, field: &str) -> PlantResult<u32> {
    let value = number(record, schema, field)?;
    whole_count(value).ok_or_else(|| {
        PlantError::Configuration(format!(
            "{schema} field '{field}' must be a whole non-negative number, got {value}"
        ))
    })
}

pub(crate) fn whole_count(value: f64) -> Option<u32> {
    if value.is_finite() && value >= 0.0 && value.fract() == 0.0 && value <= u32::MAX as f64 {
        Some(value as u32)
    } else {
        None
    }
}

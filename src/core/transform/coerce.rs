//! Column coercion rules
//!
//! Each function takes the raw value of one source field (`None` when the
//! field is missing or null) and produces the output column value.

use crate::domain::order::UNKNOWN;
use crate::domain::{TimestampField, TransformError};
use bson::Bson;

/// Floor a numeric field to an integer
///
/// Missing, null and NaN become 0. Integers pass through unchanged.
///
/// # Errors
///
/// Infinite values, values outside the `i64` range, and values that are not
/// numbers at all fail the whole batch.
pub fn floor_integer(
    value: Option<&Bson>,
    index: usize,
    field: &'static str,
) -> Result<i64, TransformError> {
    match value {
        None => Ok(0),
        Some(Bson::Int32(v)) => Ok(i64::from(*v)),
        Some(Bson::Int64(v)) => Ok(*v),
        Some(Bson::Double(v)) => floor_double(*v, index, field),
        Some(other) => Err(TransformError::NotNumeric {
            index,
            field,
            found: type_name(other),
        }),
    }
}

fn floor_double(value: f64, index: usize, field: &'static str) -> Result<i64, TransformError> {
    if value.is_nan() {
        return Ok(0);
    }
    if value.is_infinite() {
        return Err(TransformError::NotFinite {
            index,
            field,
            value,
        });
    }

    let floored = value.floor();
    // i64::MAX as f64 rounds up to 2^63, which is itself out of range
    if floored < i64::MIN as f64 || floored >= i64::MAX as f64 {
        return Err(TransformError::OutOfRange {
            index,
            field,
            value,
        });
    }

    Ok(floored as i64)
}

/// Render a field as text, empty when missing
pub fn text(value: Option<&Bson>) -> String {
    value.map(render).unwrap_or_default()
}

/// Render a field as text, `unknown` when missing
pub fn text_or_unknown(value: Option<&Bson>) -> String {
    value.map(render).unwrap_or_else(|| UNKNOWN.to_string())
}

/// Interpret a field as a timestamp
///
/// Datetimes keep their instant; anything else the source stored is
/// carried through as text.
pub fn timestamp(value: Option<&Bson>) -> Option<TimestampField> {
    value.map(|v| match v {
        Bson::DateTime(at) => TimestampField::At(at.to_chrono()),
        other => TimestampField::Text(render(other)),
    })
}

/// Interpret a field as a timestamp, `unknown` when missing
pub fn timestamp_or_unknown(value: Option<&Bson>) -> TimestampField {
    timestamp(value).unwrap_or_else(TimestampField::unknown)
}

fn render(value: &Bson) -> String {
    match value {
        Bson::String(s) => s.clone(),
        Bson::DateTime(at) => TimestampField::At(at.to_chrono()).to_string(),
        Bson::Int32(v) => v.to_string(),
        Bson::Int64(v) => v.to_string(),
        Bson::Double(v) => v.to_string(),
        Bson::Boolean(b) => b.to_string(),
        Bson::ObjectId(id) => id.to_hex(),
        Bson::Symbol(s) => s.clone(),
        other => other.clone().into_relaxed_extjson().to_string(),
    }
}

fn type_name(value: &Bson) -> String {
    format!("{:?}", value.element_type())
}

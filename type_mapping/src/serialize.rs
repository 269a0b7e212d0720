//! Serialization utilities
//!
//! This module bridges dynamic arrays and JSON, for diagnostics and for
//! callers that receive array values from JSON payloads.

use crate::array::{element_to_text, parse_text_element};
use crate::types::{DynamicArray, PostgresValue};
use array_codec::{CodecError, CodecResult, ElementType};
use serde_json::{Number, Value};

/// Convert one element to JSON
pub fn element_to_json(value: &PostgresValue) -> Value {
    match value {
        PostgresValue::Boolean(b) => Value::Bool(*b),
        PostgresValue::SmallInt(i) => Value::from(*i),
        PostgresValue::Integer(i) => Value::from(*i),
        PostgresValue::BigInt(i) => Value::from(*i),
        PostgresValue::Real(f) => float_to_json(f64::from(*f), value),
        PostgresValue::Double(f) => float_to_json(*f, value),
        PostgresValue::Text(s) => Value::String(s.clone()),
        PostgresValue::TimestampTz(dt) => Value::String(dt.to_rfc3339()),
        other => Value::String(element_to_text(other)),
    }
}

// JSON has no NaN or infinities, those keep their PostgreSQL spelling
fn float_to_json(f: f64, value: &PostgresValue) -> Value {
    Number::from_f64(f)
        .map(Value::Number)
        .unwrap_or_else(|| Value::String(element_to_text(value)))
}

/// Convert an array column value to JSON; a null array becomes `null`
pub fn array_to_json(values: Option<&[Option<PostgresValue>]>) -> Value {
    match values {
        None => Value::Null,
        Some(values) => Value::Array(
            values
                .iter()
                .map(|value| value.as_ref().map_or(Value::Null, element_to_json))
                .collect(),
        ),
    }
}

fn element_from_json(value: &Value, ty: ElementType) -> Result<PostgresValue, String> {
    match (value, ty) {
        (Value::String(s), _) => parse_text_element(ty, s),
        (Value::Bool(b), ElementType::Boolean) => Ok(PostgresValue::Boolean(*b)),
        (Value::Number(n), ElementType::SmallInt) => n
            .as_i64()
            .and_then(|i| i16::try_from(i).ok())
            .map(PostgresValue::SmallInt)
            .ok_or_else(|| format!("{} is not a valid smallint", n)),
        (Value::Number(n), ElementType::Integer) => n
            .as_i64()
            .and_then(|i| i32::try_from(i).ok())
            .map(PostgresValue::Integer)
            .ok_or_else(|| format!("{} is not a valid integer", n)),
        (Value::Number(n), ElementType::BigInt) => n
            .as_i64()
            .map(PostgresValue::BigInt)
            .ok_or_else(|| format!("{} is not a valid bigint", n)),
        (Value::Number(n), ElementType::Real) => n
            .as_f64()
            .map(|f| PostgresValue::Real(f as f32))
            .ok_or_else(|| format!("{} is not a valid real", n)),
        (Value::Number(n), ElementType::DoublePrecision) => n
            .as_f64()
            .map(PostgresValue::Double)
            .ok_or_else(|| format!("{} is not a valid double precision", n)),
        (other, ty) => Err(format!("cannot convert JSON {} to {}", other, ty)),
    }
}

/// Convert a JSON array (or `null`) into a dynamic array of the declared type.
///
/// Failures carry the offending element's index as position.
pub fn array_from_json(value: &Value, ty: ElementType) -> CodecResult<Option<DynamicArray>> {
    match value {
        Value::Null => Ok(None),
        Value::Array(items) => items
            .iter()
            .enumerate()
            .map(|(index, item)| match item {
                Value::Null => Ok(None),
                item => element_from_json(item, ty)
                    .map(Some)
                    .map_err(|reason| CodecError::malformed(index, reason)),
            })
            .collect::<CodecResult<DynamicArray>>()
            .map(Some),
        other => Err(CodecError::malformed(
            0,
            format!("expected a JSON array or null, found {}", other),
        )),
    }
}

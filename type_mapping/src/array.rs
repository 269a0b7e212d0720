//! Arrays with a runtime-declared element type
//!
//! The typed codec in `array_codec` picks the element type at compile time.
//! These functions take it as a value instead, which is what a column
//! mapping loaded from configuration or a type registry needs.

use crate::types::{DynamicArray, PostgresValue};
use array_codec::{
    check_element_oid, split_binary, split_literal, write_binary_with, write_element,
    ArrayElement, CodecError, CodecOptions, CodecResult, ElementType,
};
use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use uuid::Uuid;

macro_rules! dispatch_parse {
    ($ty:expr, $parse:ident, $input:expr) => {
        match $ty {
            ElementType::Boolean => bool::$parse($input).map(PostgresValue::Boolean),
            ElementType::SmallInt => i16::$parse($input).map(PostgresValue::SmallInt),
            ElementType::Integer => i32::$parse($input).map(PostgresValue::Integer),
            ElementType::BigInt => i64::$parse($input).map(PostgresValue::BigInt),
            ElementType::Real => f32::$parse($input).map(PostgresValue::Real),
            ElementType::DoublePrecision => f64::$parse($input).map(PostgresValue::Double),
            ElementType::Text => String::$parse($input).map(PostgresValue::Text),
            ElementType::Uuid => Uuid::$parse($input).map(PostgresValue::Uuid),
            ElementType::Date => NaiveDate::$parse($input).map(PostgresValue::Date),
            ElementType::Timestamp => NaiveDateTime::$parse($input).map(PostgresValue::Timestamp),
            ElementType::TimestampTz => {
                DateTime::<Utc>::$parse($input).map(PostgresValue::TimestampTz)
            }
        }
    };
}

macro_rules! dispatch_write {
    ($value:expr, $write:ident, $out:expr) => {
        match $value {
            PostgresValue::Boolean(v) => v.$write($out),
            PostgresValue::SmallInt(v) => v.$write($out),
            PostgresValue::Integer(v) => v.$write($out),
            PostgresValue::BigInt(v) => v.$write($out),
            PostgresValue::Real(v) => v.$write($out),
            PostgresValue::Double(v) => v.$write($out),
            PostgresValue::Text(v) => v.$write($out),
            PostgresValue::Uuid(v) => v.$write($out),
            PostgresValue::Date(v) => v.$write($out),
            PostgresValue::Timestamp(v) => v.$write($out),
            PostgresValue::TimestampTz(v) => v.$write($out),
        }
    };
}

/// Coerce one text token to the declared element type
pub fn parse_text_element(ty: ElementType, token: &str) -> Result<PostgresValue, String> {
    dispatch_parse!(ty, parse_text, token)
}

/// Coerce one binary element to the declared element type
pub fn parse_binary_element(ty: ElementType, bytes: &[u8]) -> Result<PostgresValue, String> {
    dispatch_parse!(ty, parse_binary, bytes)
}

/// Unquoted text form of one element
pub fn element_to_text(value: &PostgresValue) -> String {
    let mut out = String::new();
    dispatch_write!(value, write_text, &mut out);
    out
}

fn check_variant(value: &PostgresValue, ty: ElementType, index: usize) -> CodecResult<()> {
    if value.element_type() == ty {
        return Ok(());
    }
    Err(CodecError::malformed(
        index,
        format!(
            "element {} is {} but the array is declared as {}[]",
            index,
            value.element_type(),
            ty
        ),
    ))
}

/// Decode a text literal using a runtime element type
pub fn decode_text_array(
    input: Option<&str>,
    ty: ElementType,
    options: &CodecOptions,
) -> CodecResult<Option<DynamicArray>> {
    let Some(literal) = input else {
        return Ok(None);
    };
    split_literal(literal, options)?
        .into_iter()
        .map(|raw| match raw.value {
            None => Ok(None),
            Some(token) => parse_text_element(ty, &token)
                .map(Some)
                .map_err(|reason| CodecError::malformed(raw.position, reason)),
        })
        .collect::<CodecResult<DynamicArray>>()
        .map(Some)
}

/// Decode binary array data using a runtime element type
pub fn decode_binary_array(
    input: Option<&[u8]>,
    ty: ElementType,
    options: &CodecOptions,
) -> CodecResult<Option<DynamicArray>> {
    let Some(bytes) = input else {
        return Ok(None);
    };
    let array = split_binary(bytes, options)?;
    check_element_oid(&array, ty)?;
    array
        .elements
        .into_iter()
        .map(|element| match element.bytes {
            None => Ok(None),
            Some(data) => parse_binary_element(ty, data)
                .map(Some)
                .map_err(|reason| CodecError::malformed(element.offset, reason)),
        })
        .collect::<CodecResult<DynamicArray>>()
        .map(Some)
}

/// Encode a dynamic array as a text literal.
///
/// Every element must match the declared type; a mismatch is reported with
/// the element's index as position.
pub fn encode_text_array(
    values: Option<&[Option<PostgresValue>]>,
    ty: ElementType,
    options: &CodecOptions,
) -> CodecResult<Option<String>> {
    let Some(values) = values else {
        return Ok(None);
    };
    let mut out = String::from("{");
    for (index, value) in values.iter().enumerate() {
        if index > 0 {
            out.push(options.delimiter);
        }
        match value {
            None => out.push_str("NULL"),
            Some(value) => {
                check_variant(value, ty, index)?;
                write_element(&mut out, &element_to_text(value), options.delimiter);
            }
        }
    }
    out.push('}');
    Ok(Some(out))
}

/// Append the binary form of a dynamic array to `buf`
pub fn encode_binary_array(
    values: &[Option<PostgresValue>],
    ty: ElementType,
    buf: &mut Vec<u8>,
) -> CodecResult<()> {
    write_binary_with(ty, values.iter().enumerate(), buf, |(index, value), buf| {
        match value {
            None => Ok(false),
            Some(value) => {
                check_variant(value, ty, index)?;
                dispatch_write!(value, write_binary, buf);
                Ok(true)
            }
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::to_dynamic_array;

    #[test]
    fn test_decode_text_by_declared_type() {
        let options = CodecOptions::default();
        let decoded = decode_text_array(Some("{1,NULL,3}"), ElementType::BigInt, &options)
            .unwrap()
            .unwrap();
        assert_eq!(
            decoded,
            vec![Some(PostgresValue::BigInt(1)), None, Some(PostgresValue::BigInt(3))]
        );

        let as_text = decode_text_array(Some("{1,NULL,3}"), ElementType::Text, &options)
            .unwrap()
            .unwrap();
        assert_eq!(as_text[0], Some(PostgresValue::Text("1".to_string())));

        assert_eq!(decode_text_array(None, ElementType::Integer, &options).unwrap(), None);
        assert!(decode_text_array(Some("{a}"), ElementType::Integer, &options).is_err());
    }

    #[test]
    fn test_encode_text_rejects_mixed_elements() {
        let options = CodecOptions::default();
        let values = vec![Some(PostgresValue::Integer(1)), Some(PostgresValue::Text("x".into()))];
        let err = encode_text_array(Some(values.as_slice()), ElementType::Integer, &options).unwrap_err();
        assert_eq!(err.position(), Some(1));
    }

    #[test]
    fn test_encode_text_quotes_text_elements() {
        let options = CodecOptions::default();
        let values = to_dynamic_array(vec![Some("a b"), None, Some("c")]);
        assert_eq!(
            encode_text_array(Some(values.as_slice()), ElementType::Text, &options).unwrap(),
            Some(r#"{"a b",NULL,c}"#.to_string())
        );
        assert_eq!(encode_text_array(None, ElementType::Text, &options).unwrap(), None);
    }

    #[test]
    fn test_binary_round_trip_matches_typed_codec() {
        let options = CodecOptions::default();
        let values = to_dynamic_array(vec![Some(10i32), None, Some(-4)]);

        let mut dynamic = Vec::new();
        encode_binary_array(&values, ElementType::Integer, &mut dynamic).unwrap();
        let typed = array_codec::encode_binary(&[Some(10i32), None, Some(-4)]).unwrap();
        assert_eq!(dynamic, typed);

        let decoded = decode_binary_array(Some(dynamic.as_slice()), ElementType::Integer, &options)
            .unwrap()
            .unwrap();
        assert_eq!(decoded, values);
        assert!(decode_binary_array(Some(dynamic.as_slice()), ElementType::BigInt, &options).is_err());
    }

    #[test]
    fn test_element_to_text_uses_postgres_spellings() {
        assert_eq!(element_to_text(&PostgresValue::Boolean(true)), "t");
        assert_eq!(element_to_text(&PostgresValue::Double(f64::INFINITY)), "Infinity");
        assert_eq!(parse_text_element(ElementType::Boolean, "off").unwrap(), PostgresValue::Boolean(false));
    }
}

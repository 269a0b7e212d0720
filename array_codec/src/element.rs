//! Element coercion table
//!
//! This module describes the scalar types that can live inside a PostgreSQL
//! array and how each one is written to and read from the text and binary
//! representations.

use chrono::{DateTime, Datelike, NaiveDate, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt::{self, Write};
use uuid::Uuid;

/// Days between 0001-01-01 (day 1 of the common era) and 2000-01-01
const PG_EPOCH_DAYS_FROM_CE: i32 = 730_120;

/// Microseconds between the Unix epoch and 2000-01-01 00:00:00 UTC
const PG_EPOCH_UNIX_MICROS: i64 = 946_684_800_000_000;

/// Declared element type of an array column
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ElementType {
    Boolean,
    SmallInt,
    Integer,
    BigInt,
    Real,
    DoublePrecision,
    Text,
    Uuid,
    Date,
    Timestamp,
    TimestampTz,
}

impl ElementType {
    pub const ALL: [ElementType; 11] = [
        ElementType::Boolean,
        ElementType::SmallInt,
        ElementType::Integer,
        ElementType::BigInt,
        ElementType::Real,
        ElementType::DoublePrecision,
        ElementType::Text,
        ElementType::Uuid,
        ElementType::Date,
        ElementType::Timestamp,
        ElementType::TimestampTz,
    ];

    /// OID of the element type in `pg_type`
    pub fn oid(self) -> u32 {
        match self {
            ElementType::Boolean => 16,
            ElementType::SmallInt => 21,
            ElementType::Integer => 23,
            ElementType::BigInt => 20,
            ElementType::Real => 700,
            ElementType::DoublePrecision => 701,
            ElementType::Text => 25,
            ElementType::Uuid => 2950,
            ElementType::Date => 1082,
            ElementType::Timestamp => 1114,
            ElementType::TimestampTz => 1184,
        }
    }

    /// OID of the one-dimensional array type built on this element
    pub fn array_oid(self) -> u32 {
        match self {
            ElementType::Boolean => 1000,
            ElementType::SmallInt => 1005,
            ElementType::Integer => 1007,
            ElementType::BigInt => 1016,
            ElementType::Real => 1021,
            ElementType::DoublePrecision => 1022,
            ElementType::Text => 1009,
            ElementType::Uuid => 2951,
            ElementType::Date => 1182,
            ElementType::Timestamp => 1115,
            ElementType::TimestampTz => 1185,
        }
    }

    /// Internal type name, as stored in `pg_type.typname`
    pub fn type_name(self) -> &'static str {
        match self {
            ElementType::Boolean => "bool",
            ElementType::SmallInt => "int2",
            ElementType::Integer => "int4",
            ElementType::BigInt => "int8",
            ElementType::Real => "float4",
            ElementType::DoublePrecision => "float8",
            ElementType::Text => "text",
            ElementType::Uuid => "uuid",
            ElementType::Date => "date",
            ElementType::Timestamp => "timestamp",
            ElementType::TimestampTz => "timestamptz",
        }
    }

    /// Internal name of the array type (`_int4` for `integer[]`)
    pub fn array_type_name(self) -> &'static str {
        match self {
            ElementType::Boolean => "_bool",
            ElementType::SmallInt => "_int2",
            ElementType::Integer => "_int4",
            ElementType::BigInt => "_int8",
            ElementType::Real => "_float4",
            ElementType::DoublePrecision => "_float8",
            ElementType::Text => "_text",
            ElementType::Uuid => "_uuid",
            ElementType::Date => "_date",
            ElementType::Timestamp => "_timestamp",
            ElementType::TimestampTz => "_timestamptz",
        }
    }

    /// SQL spelling of the element type, used for DDL and casts
    pub fn sql_name(self) -> &'static str {
        match self {
            ElementType::Boolean => "boolean",
            ElementType::SmallInt => "smallint",
            ElementType::Integer => "integer",
            ElementType::BigInt => "bigint",
            ElementType::Real => "real",
            ElementType::DoublePrecision => "double precision",
            ElementType::Text => "text",
            ElementType::Uuid => "uuid",
            ElementType::Date => "date",
            ElementType::Timestamp => "timestamp",
            ElementType::TimestampTz => "timestamp with time zone",
        }
    }

    /// Encoded size of one element in the binary format, `None` for variable size
    pub fn fixed_size(self) -> Option<usize> {
        match self {
            ElementType::Boolean => Some(1),
            ElementType::SmallInt => Some(2),
            ElementType::Integer | ElementType::Real | ElementType::Date => Some(4),
            ElementType::BigInt
            | ElementType::DoublePrecision
            | ElementType::Timestamp
            | ElementType::TimestampTz => Some(8),
            ElementType::Uuid => Some(16),
            ElementType::Text => None,
        }
    }

    /// Whether binary data tagged with `oid` can be read as this element type
    pub fn accepts_oid(self, oid: u32) -> bool {
        match self {
            // varchar, bpchar and name share the text wire format
            ElementType::Text => matches!(oid, 25 | 1043 | 1042 | 19),
            other => other.oid() == oid,
        }
    }

    /// Whether a column of array type `oid` can be read as an array of this type
    pub fn accepts_array_oid(self, oid: u32) -> bool {
        match self {
            // _varchar, _bpchar, _name
            ElementType::Text => matches!(oid, 1009 | 1015 | 1014 | 1003),
            other => other.array_oid() == oid,
        }
    }

    pub fn from_oid(oid: u32) -> Option<Self> {
        Self::ALL.into_iter().find(|ty| ty.accepts_oid(oid))
    }

    pub fn from_array_oid(oid: u32) -> Option<Self> {
        Self::ALL.into_iter().find(|ty| ty.accepts_array_oid(oid))
    }

    /// Resolve a SQL or internal type name, case-insensitively
    pub fn from_name(name: &str) -> Option<Self> {
        let normalized = name.trim().to_ascii_lowercase();
        let ty = match normalized.as_str() {
            "bool" | "boolean" => ElementType::Boolean,
            "int2" | "smallint" => ElementType::SmallInt,
            "int4" | "int" | "integer" => ElementType::Integer,
            "int8" | "bigint" => ElementType::BigInt,
            "float4" | "real" => ElementType::Real,
            "float8" | "double precision" => ElementType::DoublePrecision,
            "text" | "varchar" | "character varying" | "bpchar" | "name" => ElementType::Text,
            "uuid" => ElementType::Uuid,
            "date" => ElementType::Date,
            "timestamp" | "timestamp without time zone" => ElementType::Timestamp,
            "timestamptz" | "timestamp with time zone" => ElementType::TimestampTz,
            _ => return None,
        };
        Some(ty)
    }
}

impl fmt::Display for ElementType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.sql_name())
    }
}

/// A scalar that can be stored as a PostgreSQL array element.
///
/// Text output is written unquoted; the literal writer decides whether the
/// element needs quoting. Parse errors are returned as a plain reason and
/// positioned by the caller.
pub trait ArrayElement: Sized {
    const ELEMENT_TYPE: ElementType;

    fn write_text(&self, out: &mut String);

    fn parse_text(token: &str) -> Result<Self, String>;

    fn write_binary(&self, buf: &mut Vec<u8>);

    fn parse_binary(bytes: &[u8]) -> Result<Self, String>;
}

fn fixed<const N: usize>(bytes: &[u8], ty: ElementType) -> Result<[u8; N], String> {
    <[u8; N]>::try_from(bytes).map_err(|_| {
        format!(
            "expected {} bytes for {} element, found {}",
            N,
            ty.sql_name(),
            bytes.len()
        )
    })
}

impl ArrayElement for bool {
    const ELEMENT_TYPE: ElementType = ElementType::Boolean;

    fn write_text(&self, out: &mut String) {
        out.push(if *self { 't' } else { 'f' });
    }

    fn parse_text(token: &str) -> Result<Self, String> {
        match token.to_ascii_lowercase().as_str() {
            "t" | "true" | "y" | "yes" | "on" | "1" => Ok(true),
            "f" | "false" | "n" | "no" | "off" | "0" => Ok(false),
            _ => Err(format!("invalid boolean value '{}'", token)),
        }
    }

    fn write_binary(&self, buf: &mut Vec<u8>) {
        buf.push(u8::from(*self));
    }

    fn parse_binary(bytes: &[u8]) -> Result<Self, String> {
        let [b] = fixed::<1>(bytes, Self::ELEMENT_TYPE)?;
        Ok(b != 0)
    }
}

macro_rules! impl_integer_element {
    ($ty:ty, $element:expr, $size:literal) => {
        impl ArrayElement for $ty {
            const ELEMENT_TYPE: ElementType = $element;

            fn write_text(&self, out: &mut String) {
                let _ = write!(out, "{}", self);
            }

            fn parse_text(token: &str) -> Result<Self, String> {
                token.parse::<$ty>().map_err(|e| {
                    format!(
                        "invalid {} value '{}': {}",
                        Self::ELEMENT_TYPE.sql_name(),
                        token,
                        e
                    )
                })
            }

            fn write_binary(&self, buf: &mut Vec<u8>) {
                buf.extend_from_slice(&self.to_be_bytes());
            }

            fn parse_binary(bytes: &[u8]) -> Result<Self, String> {
                Ok(<$ty>::from_be_bytes(fixed::<$size>(bytes, Self::ELEMENT_TYPE)?))
            }
        }
    };
}

impl_integer_element!(i16, ElementType::SmallInt, 2);
impl_integer_element!(i32, ElementType::Integer, 4);
impl_integer_element!(i64, ElementType::BigInt, 8);

macro_rules! impl_float_element {
    ($ty:ty, $element:expr, $size:literal) => {
        impl ArrayElement for $ty {
            const ELEMENT_TYPE: ElementType = $element;

            fn write_text(&self, out: &mut String) {
                if self.is_nan() {
                    out.push_str("NaN");
                } else if self.is_infinite() {
                    out.push_str(if *self > 0.0 { "Infinity" } else { "-Infinity" });
                } else {
                    let _ = write!(out, "{}", self);
                }
            }

            fn parse_text(token: &str) -> Result<Self, String> {
                match token.to_ascii_lowercase().as_str() {
                    "nan" => Ok(<$ty>::NAN),
                    "infinity" | "+infinity" | "inf" | "+inf" => Ok(<$ty>::INFINITY),
                    "-infinity" | "-inf" => Ok(<$ty>::NEG_INFINITY),
                    _ => token.parse::<$ty>().map_err(|e| {
                        format!(
                            "invalid {} value '{}': {}",
                            Self::ELEMENT_TYPE.sql_name(),
                            token,
                            e
                        )
                    }),
                }
            }

            fn write_binary(&self, buf: &mut Vec<u8>) {
                buf.extend_from_slice(&self.to_be_bytes());
            }

            fn parse_binary(bytes: &[u8]) -> Result<Self, String> {
                Ok(<$ty>::from_be_bytes(fixed::<$size>(bytes, Self::ELEMENT_TYPE)?))
            }
        }
    };
}

impl_float_element!(f32, ElementType::Real, 4);
impl_float_element!(f64, ElementType::DoublePrecision, 8);

impl ArrayElement for String {
    const ELEMENT_TYPE: ElementType = ElementType::Text;

    fn write_text(&self, out: &mut String) {
        out.push_str(self);
    }

    fn parse_text(token: &str) -> Result<Self, String> {
        Ok(token.to_string())
    }

    fn write_binary(&self, buf: &mut Vec<u8>) {
        buf.extend_from_slice(self.as_bytes());
    }

    fn parse_binary(bytes: &[u8]) -> Result<Self, String> {
        String::from_utf8(bytes.to_vec()).map_err(|e| format!("invalid UTF-8 in text element: {}", e))
    }
}

impl ArrayElement for Uuid {
    const ELEMENT_TYPE: ElementType = ElementType::Uuid;

    fn write_text(&self, out: &mut String) {
        let _ = write!(out, "{}", self.hyphenated());
    }

    fn parse_text(token: &str) -> Result<Self, String> {
        Uuid::parse_str(token).map_err(|e| format!("invalid uuid value '{}': {}", token, e))
    }

    fn write_binary(&self, buf: &mut Vec<u8>) {
        buf.extend_from_slice(self.as_bytes());
    }

    fn parse_binary(bytes: &[u8]) -> Result<Self, String> {
        Ok(Uuid::from_bytes(fixed::<16>(bytes, Self::ELEMENT_TYPE)?))
    }
}

impl ArrayElement for NaiveDate {
    const ELEMENT_TYPE: ElementType = ElementType::Date;

    fn write_text(&self, out: &mut String) {
        let _ = write!(out, "{}", self.format("%Y-%m-%d"));
    }

    fn parse_text(token: &str) -> Result<Self, String> {
        NaiveDate::parse_from_str(token, "%Y-%m-%d")
            .map_err(|e| format!("invalid date value '{}': {}", token, e))
    }

    fn write_binary(&self, buf: &mut Vec<u8>) {
        let days = self.num_days_from_ce() - PG_EPOCH_DAYS_FROM_CE;
        buf.extend_from_slice(&days.to_be_bytes());
    }

    fn parse_binary(bytes: &[u8]) -> Result<Self, String> {
        let days = i32::from_be_bytes(fixed::<4>(bytes, Self::ELEMENT_TYPE)?);
        days.checked_add(PG_EPOCH_DAYS_FROM_CE)
            .and_then(NaiveDate::from_num_days_from_ce_opt)
            .ok_or_else(|| format!("date out of range: {} days from 2000-01-01", days))
    }
}

fn micros_to_utc(micros: i64) -> Result<DateTime<Utc>, String> {
    micros
        .checked_add(PG_EPOCH_UNIX_MICROS)
        .and_then(DateTime::from_timestamp_micros)
        .ok_or_else(|| format!("timestamp out of range: {} microseconds from 2000-01-01", micros))
}

impl ArrayElement for NaiveDateTime {
    const ELEMENT_TYPE: ElementType = ElementType::Timestamp;

    fn write_text(&self, out: &mut String) {
        let _ = write!(out, "{}", self.format("%Y-%m-%d %H:%M:%S%.f"));
    }

    fn parse_text(token: &str) -> Result<Self, String> {
        NaiveDateTime::parse_from_str(token, "%Y-%m-%d %H:%M:%S%.f")
            .or_else(|_| NaiveDateTime::parse_from_str(token, "%Y-%m-%dT%H:%M:%S%.f"))
            .map_err(|e| format!("invalid timestamp value '{}': {}", token, e))
    }

    fn write_binary(&self, buf: &mut Vec<u8>) {
        let micros = self.and_utc().timestamp_micros() - PG_EPOCH_UNIX_MICROS;
        buf.extend_from_slice(&micros.to_be_bytes());
    }

    fn parse_binary(bytes: &[u8]) -> Result<Self, String> {
        let micros = i64::from_be_bytes(fixed::<8>(bytes, Self::ELEMENT_TYPE)?);
        Ok(micros_to_utc(micros)?.naive_utc())
    }
}

impl ArrayElement for DateTime<Utc> {
    const ELEMENT_TYPE: ElementType = ElementType::TimestampTz;

    fn write_text(&self, out: &mut String) {
        let _ = write!(out, "{}+00", self.format("%Y-%m-%d %H:%M:%S%.f"));
    }

    fn parse_text(token: &str) -> Result<Self, String> {
        DateTime::parse_from_str(token, "%Y-%m-%d %H:%M:%S%.f%#z")
            .or_else(|_| DateTime::parse_from_rfc3339(token))
            .map(|dt| dt.with_timezone(&Utc))
            .or_else(|_| NaiveDateTime::parse_text(token).map(|naive| naive.and_utc()))
            .map_err(|_| format!("invalid timestamp with time zone value '{}'", token))
    }

    fn write_binary(&self, buf: &mut Vec<u8>) {
        let micros = self.timestamp_micros() - PG_EPOCH_UNIX_MICROS;
        buf.extend_from_slice(&micros.to_be_bytes());
    }

    fn parse_binary(bytes: &[u8]) -> Result<Self, String> {
        micros_to_utc(i64::from_be_bytes(fixed::<8>(bytes, Self::ELEMENT_TYPE)?))
    }
}

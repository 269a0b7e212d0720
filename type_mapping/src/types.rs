//! Type mapping definitions
//!
//! This module provides the dynamically typed scalar used when an array's
//! element type is only known at runtime.

use array_codec::ElementType;
use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A single non-null array element of any supported element type
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum PostgresValue {
    Boolean(bool),
    SmallInt(i16),
    Integer(i32),
    BigInt(i64),
    Real(f32),
    Double(f64),
    Text(String),
    Uuid(Uuid),
    Date(NaiveDate),
    Timestamp(NaiveDateTime),
    TimestampTz(DateTime<Utc>),
}

/// Array of dynamically typed elements; `None` entries are NULL elements
pub type DynamicArray = Vec<Option<PostgresValue>>;

impl PostgresValue {
    pub fn element_type(&self) -> ElementType {
        match self {
            PostgresValue::Boolean(_) => ElementType::Boolean,
            PostgresValue::SmallInt(_) => ElementType::SmallInt,
            PostgresValue::Integer(_) => ElementType::Integer,
            PostgresValue::BigInt(_) => ElementType::BigInt,
            PostgresValue::Real(_) => ElementType::Real,
            PostgresValue::Double(_) => ElementType::DoublePrecision,
            PostgresValue::Text(_) => ElementType::Text,
            PostgresValue::Uuid(_) => ElementType::Uuid,
            PostgresValue::Date(_) => ElementType::Date,
            PostgresValue::Timestamp(_) => ElementType::Timestamp,
            PostgresValue::TimestampTz(_) => ElementType::TimestampTz,
        }
    }
}

/// Convert basic Rust types to PostgresValue
impl From<String> for PostgresValue {
    fn from(val: String) -> Self {
        PostgresValue::Text(val)
    }
}

impl From<&str> for PostgresValue {
    fn from(val: &str) -> Self {
        PostgresValue::Text(val.to_string())
    }
}

impl From<bool> for PostgresValue {
    fn from(val: bool) -> Self {
        PostgresValue::Boolean(val)
    }
}

impl From<i16> for PostgresValue {
    fn from(val: i16) -> Self {
        PostgresValue::SmallInt(val)
    }
}

impl From<i32> for PostgresValue {
    fn from(val: i32) -> Self {
        PostgresValue::Integer(val)
    }
}

impl From<i64> for PostgresValue {
    fn from(val: i64) -> Self {
        PostgresValue::BigInt(val)
    }
}

impl From<f32> for PostgresValue {
    fn from(val: f32) -> Self {
        PostgresValue::Real(val)
    }
}

impl From<f64> for PostgresValue {
    fn from(val: f64) -> Self {
        PostgresValue::Double(val)
    }
}

impl From<Uuid> for PostgresValue {
    fn from(val: Uuid) -> Self {
        PostgresValue::Uuid(val)
    }
}

impl From<NaiveDate> for PostgresValue {
    fn from(val: NaiveDate) -> Self {
        PostgresValue::Date(val)
    }
}

impl From<NaiveDateTime> for PostgresValue {
    fn from(val: NaiveDateTime) -> Self {
        PostgresValue::Timestamp(val)
    }
}

impl From<DateTime<Utc>> for PostgresValue {
    fn from(val: DateTime<Utc>) -> Self {
        PostgresValue::TimestampTz(val)
    }
}

/// Build a dynamic array from any sequence of optional convertible values
pub fn to_dynamic_array<T, I>(values: I) -> DynamicArray
where
    T: Into<PostgresValue>,
    I: IntoIterator<Item = Option<T>>,
{
    values.into_iter().map(|value| value.map(Into::into)).collect()
}

//! SQL type conversion utilities
//!
//! This module maps Rust field types to PostgreSQL array column types for DDL
//! generation and casts.

use array_codec::ElementType;

/// Map a Rust element type name to its PostgreSQL element type
pub fn element_type_for_rust_type(rust_type: &str) -> Option<ElementType> {
    // Normalize type string by removing all whitespace for consistent matching
    let normalized = rust_type.replace(' ', "");
    let ty = match normalized.as_str() {
        "bool" => ElementType::Boolean,
        "i16" => ElementType::SmallInt,
        "i32" => ElementType::Integer,
        "i64" => ElementType::BigInt,
        "f32" => ElementType::Real,
        "f64" => ElementType::DoublePrecision,
        "String" | "&str" | "str" => ElementType::Text,
        "Uuid" | "uuid::Uuid" => ElementType::Uuid,
        "NaiveDate" | "chrono::NaiveDate" => ElementType::Date,
        "NaiveDateTime" | "chrono::NaiveDateTime" => ElementType::Timestamp,
        "DateTime<Utc>"
        | "DateTime<chrono::Utc>"
        | "chrono::DateTime<Utc>"
        | "chrono::DateTime<chrono::Utc>" => ElementType::TimestampTz,
        _ => return None,
    };
    Some(ty)
}

fn strip_wrapper<'a>(ty: &'a str, wrapper: &str) -> Option<&'a str> {
    ty.strip_prefix(wrapper)?.strip_prefix('<')?.strip_suffix('>')
}

/// Element type of a Rust array field type.
///
/// Accepts `Vec<T>`, `Vec<Option<T>>`, `Option<Vec<..>>` and `PgArray<T>`.
pub fn array_element_type(rust_type: &str) -> Option<ElementType> {
    let normalized = rust_type.replace(' ', "");
    let ty = strip_wrapper(&normalized, "Option").unwrap_or(&normalized);
    let inner = strip_wrapper(ty, "Vec").or_else(|| strip_wrapper(ty, "PgArray"))?;
    let element = strip_wrapper(inner, "Option").unwrap_or(inner);
    element_type_for_rust_type(element)
}

/// Map Rust array field types to PostgreSQL column types for DDL generation
pub fn rust_type_to_pg_array_type(rust_type: &str) -> Option<String> {
    array_element_type(rust_type).map(|ty| format!("{}[]", ty.sql_name().to_uppercase()))
}

/// Cast suffix for an array parameter, e.g. `integer[]`
pub fn array_cast(ty: ElementType) -> String {
    format!("{}[]", ty.sql_name())
}

/// Check if a Rust type is Optional (nullable in SQL)
pub fn is_optional_type(rust_type: &str) -> bool {
    strip_wrapper(&rust_type.replace(' ', ""), "Option").is_some()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_vec_types_map_to_array_columns() {
        assert_eq!(rust_type_to_pg_array_type("Vec<i32>").as_deref(), Some("INTEGER[]"));
        assert_eq!(rust_type_to_pg_array_type("Vec<i64>").as_deref(), Some("BIGINT[]"));
        assert_eq!(rust_type_to_pg_array_type("Vec<String>").as_deref(), Some("TEXT[]"));
        assert_eq!(
            rust_type_to_pg_array_type("Option<Vec<Option<chrono::DateTime<chrono::Utc>>>>").as_deref(),
            Some("TIMESTAMP WITH TIME ZONE[]")
        );
        assert_eq!(
            rust_type_to_pg_array_type("Vec < Option < uuid::Uuid > >").as_deref(),
            Some("UUID[]")
        );
        assert_eq!(rust_type_to_pg_array_type("PgArray<f64>").as_deref(), Some("DOUBLE PRECISION[]"));
    }

    #[test]
    fn test_non_array_types_are_rejected() {
        assert_eq!(rust_type_to_pg_array_type("i32"), None);
        assert_eq!(rust_type_to_pg_array_type("Vec<Vec<i32>>"), None);
        assert_eq!(rust_type_to_pg_array_type("Vec<serde_json::Value>"), None);
        assert_eq!(rust_type_to_pg_array_type("Option<i32>"), None);
    }

    #[test]
    fn test_optional_detection_and_casts() {
        assert!(is_optional_type("Option<Vec<i32>>"));
        assert!(!is_optional_type("Vec<Option<i32>>"));
        assert!(is_optional_type(" Option < String > "));
        assert!(!is_optional_type("OptionSet<i32>"));
        assert_eq!(array_cast(ElementType::BigInt), "bigint[]");
    }
}

//! Validation utilities for type mapping
//!
//! This module provides validation functions
//! for type mapping operations.

use crate::sql::{array_element_type, element_type_for_rust_type};

/// Check if a Rust type can be stored as an array element
pub fn supports_element_type(rust_type: &str) -> bool {
    element_type_for_rust_type(rust_type).is_some()
}

/// Check if a Rust field type maps onto a one-dimensional array column
pub fn supports_array_mapping(rust_type: &str) -> bool {
    array_element_type(rust_type).is_some()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_supported_types() {
        assert!(supports_element_type("i32"));
        assert!(supports_element_type("chrono::DateTime<chrono::Utc>"));
        assert!(!supports_element_type("u64"));

        assert!(supports_array_mapping("Vec<Option<Uuid>>"));
        assert!(supports_array_mapping("Option<PgArray<f64>>"));
        assert!(!supports_array_mapping("Vec<Vec<i32>>"));
        assert!(!supports_array_mapping("i32"));
    }
}

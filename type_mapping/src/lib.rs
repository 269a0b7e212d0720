//! Runtime type mapping between Rust values and PostgreSQL arrays
//! This crate provides the dynamically typed layer on top of `array_codec`

pub mod array;
pub mod serialize;
pub mod sql;
pub mod types;
pub mod validate;

// Re-export commonly used items
pub use array::{
    decode_binary_array, decode_text_array, element_to_text, encode_binary_array,
    encode_text_array, parse_binary_element, parse_text_element,
};
pub use array_codec::ElementType;
pub use serialize::{array_from_json, array_to_json, element_to_json};
pub use sql::{
    array_cast, array_element_type, element_type_for_rust_type, is_optional_type,
    rust_type_to_pg_array_type,
};
pub use types::{to_dynamic_array, DynamicArray, PostgresValue};
pub use validate::{supports_array_mapping, supports_element_type};

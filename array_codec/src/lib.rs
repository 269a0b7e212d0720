//! Array Codec - PostgreSQL array representation for Rust sequences
//!
//! This crate converts between ordered sequences of scalars and the two
//! forms PostgreSQL uses for array values: the text literal (`{1,2,3}`) and
//! the binary wire format of the extended query protocol.
//!
//! ```rust
//! use array_codec::{decode_literal, encode_literal, CodecOptions};
//!
//! let options = CodecOptions::default();
//! let values = vec![Some(1i32), None, Some(3)];
//!
//! let literal = encode_literal(Some(values.as_slice()), &options);
//! assert_eq!(literal.as_deref(), Some("{1,NULL,3}"));
//!
//! let decoded = decode_literal::<i32>(literal.as_deref(), &options).unwrap();
//! assert_eq!(decoded, Some(values));
//!
//! // A SQL NULL column is not the same thing as an empty array
//! assert_eq!(encode_literal::<i32>(None, &options), None);
//! assert_eq!(encode_literal::<i32>(Some(&[][..]), &options).as_deref(), Some("{}"));
//! ```

pub mod binary;
pub mod element;
pub mod errors;
pub mod literal;
pub mod options;


pub use binary::{
    check_element_oid, encode_binary, encode_binary_values, parse_binary, parse_binary_values,
    split_binary, write_binary_elements, write_binary_with, BinaryArray, BinaryElement,
};
pub use element::{ArrayElement, ElementType};
pub use errors::{CodecError, CodecResult};
pub use literal::{
    decode_literal, encode_literal, format_elements, format_literal, format_literal_values,
    parse_literal, parse_literal_values, split_literal, write_element, RawElement,
};
pub use options::{is_array_space, CodecOptions};

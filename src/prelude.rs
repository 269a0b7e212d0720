//! Convenience re-exports for common pgarray usage
//!
//! # Example
//!
//! ```rust
//! use pgarray::prelude::*;
//!
//! let ids = PgArray::from_values(vec![1i32, 2, 3]);
//! assert_eq!(ids.to_literal(&CodecOptions::default()), "{1,2,3}");
//! ```

// Core pgarray components
pub use crate::binding::{PgArray, TypedArray};
pub use crate::core::{connect, health_check, ArrayTypeDef, ArrayTypeRegistry};
pub use crate::errors::PgArrayError;
pub use crate::migration::{
    array_column_sql, array_contains_function_sql, install_array_contains_function,
};

// Re-export centralized config
pub use config::{AppConfig, CodecConfig, DatabaseConfig};

// Codec and runtime mapping types
pub use array_codec::{ArrayElement, CodecError, CodecOptions, ElementType};
pub use type_mapping::{DynamicArray, PostgresValue};

// Common external dependencies
pub use anyhow;
pub use sqlx;
pub use tokio;

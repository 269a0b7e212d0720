//! # pgarray
//!
//! PostgreSQL array columns for Rust: a text and binary array codec, a
//! runtime element-type mapping and sqlx bindings for both.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use pgarray::prelude::*;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = DatabaseConfig::new(
//!         "localhost".to_string(), 5432, "pgarray".to_string(),
//!         "postgres".to_string(), "password".to_string(),
//!         1, 5, 30, 600, 3600,
//!     );
//!     let pool = connect(&config).await?;
//!
//!     sqlx::query(&format!(
//!         "CREATE TABLE IF NOT EXISTS event (id bigint PRIMARY KEY, {})",
//!         array_column_sql("sensor_ids", ElementType::Integer)?
//!     ))
//!     .execute(&pool)
//!     .await?;
//!
//!     sqlx::query("INSERT INTO event (id, sensor_ids) VALUES ($1, $2)")
//!         .bind(1i64)
//!         .bind(PgArray::new(vec![Some(1i32), None, Some(3)]))
//!         .execute(&pool)
//!         .await?;
//!
//!     let (ids,): (Option<PgArray<i32>>,) =
//!         sqlx::query_as("SELECT sensor_ids FROM event WHERE id = $1")
//!             .bind(1i64)
//!             .fetch_one(&pool)
//!             .await?;
//!     println!("sensor ids: {:?}", ids);
//!
//!     Ok(())
//! }
//! ```

/// Conditional debug logging macros
/// These macros only compile in code when the `debug-logging` feature is enabled
#[cfg(feature = "debug-logging")]
#[macro_export]
macro_rules! debug_log {
    ($($arg:tt)*) => {
        tracing::debug!($($arg)*)
    };
}

#[cfg(not(feature = "debug-logging"))]
#[macro_export]
macro_rules! debug_log {
    ($($arg:tt)*) => {};
}

#[cfg(feature = "debug-logging")]
#[macro_export]
macro_rules! trace_log {
    ($($arg:tt)*) => {
        tracing::trace!($($arg)*)
    };
}

#[cfg(not(feature = "debug-logging"))]
#[macro_export]
macro_rules! trace_log {
    ($($arg:tt)*) => {};
}

pub mod binding;
pub mod core;
pub mod errors;
pub mod migration;
pub mod prelude;

// Re-export the main public types for convenience
pub use crate::binding::{PgArray, TypedArray};
pub use crate::core::{connect, health_check, ArrayTypeDef, ArrayTypeRegistry};
pub use crate::errors::PgArrayError;
pub use crate::migration::{
    array_column_sql, array_contains_function_sql, install_array_contains_function,
};

// Re-export centralized config
pub use config::{AppConfig, CodecConfig, DatabaseConfig};

// Re-export internal crates that are part of the public API
pub use array_codec;
pub use type_mapping;

// Re-export external dependencies used in public API
pub use sqlx;

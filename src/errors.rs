//! Error types for the pgarray crate
//!
//! This module contains all error types that can be returned by pgarray operations.

use array_codec::CodecError;
use config::ConfigError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum PgArrayError {
    #[error("Array codec error: {0}")]
    Codec(#[from] CodecError),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Unknown array type: {0}")]
    UnknownArrayType(String),

    #[error("Array type already registered: {0}")]
    TypeAlreadyRegistered(String),

    #[error("Invalid SQL identifier: {0}")]
    InvalidIdentifier(String),
}

//! Error types for geoquery.
//!
//! Uses `thiserror` for ergonomic error handling with automatic `Display`
//! and `Error` trait implementations.
//!
//! Note that a view declining to render is *not* an error anywhere in this
//! crate: inapplicability is expressed as `Option::None` so the assembly
//! layout can simply omit the fragment.

use thiserror::Error;

/// The primary error type for geoquery operations.
#[derive(Error, Debug)]
pub enum GeoQueryError {
    /// Configuration-related errors (malformed config file, invalid values, etc.)
    #[error("Configuration error: {0}")]
    Config(String),

    /// A request referenced an admin field that is not configured.
    #[error("Unknown admin field: {0}")]
    UnknownAdminField(String),

    /// Standard I/O errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// A specialized `Result` type for geoquery operations.
pub type Result<T> = std::result::Result<T, GeoQueryError>;

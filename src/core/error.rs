/// MapSQL Error Module
///
/// This module defines the error taxonomy for the mapsql crate. It provides
/// structured error handling with proper error propagation instead of the
/// sentinel failure values a caller would otherwise have to inspect.
use thiserror::Error;

/// Error type covering every failure class in the crate:
/// - Credential sources that cannot be read or understood
/// - Operation specs that are malformed (missing table, payload, where)
/// - Failures reported by the MySQL driver (connection or statement)
#[derive(Error, Debug)]
pub enum MapSqlError {
    /// Credential source errors (unreadable file, unsupported extension,
    /// missing required keys) and misuse such as executing without a
    /// connection.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Malformed operation specs: missing `#table`, missing required
    /// payload or `#where`, unrecognized directive values or input types.
    #[error("Malformed spec: {0}")]
    Spec(String),

    /// Connection and statement errors reported by the MySQL driver.
    #[error("Driver error: {0}")]
    Driver(#[from] mysql::Error),

    /// File system errors while reading credential files.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Type alias for Result to use MapSqlError as the error type.
///
/// This provides a consistent error type across the entire crate
/// instead of using `Result<T, String>` or mixed error types.
pub type Result<T> = std::result::Result<T, MapSqlError>;

/// Core Module for MapSQL
///
/// This module contains the fundamental components that form the backbone
/// of the crate: the error taxonomy shared by every layer and the database
/// layer (connection resolution, execution, value conversion).

pub mod db;
pub mod error;

// Re-export commonly used types for convenience
pub use error::{MapSqlError, Result};

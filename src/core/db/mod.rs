/// Database Module
///
/// This module provides the driver-facing half of the crate, organized into
/// focused submodules for better separation of concerns:
/// - **Connection Resolution** (`connection.rs`): turns credentials into a live handle
/// - **Statement Execution** (`executor.rs`): binds parameters, runs statements, fetches rows
/// - **Value Conversion** (`value.rs`): maps JSON values to driver values and back
///
/// All database operations use the standardized `MapSqlError` type for
/// consistent error propagation.
pub mod connection;
pub mod executor;
pub mod value;

pub use connection::*;
pub use executor::*;

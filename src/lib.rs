// Core infrastructure modules
pub mod core;

// Compiler pipeline modules
pub mod builder;
pub mod client;
pub mod credentials;
pub mod spec;
pub mod where_clause;

// Re-export the public surface at the crate root
pub use crate::core::db::{Fetched, Row};
pub use crate::core::{MapSqlError, Result};
pub use builder::{compile_delete, compile_insert, compile_select, compile_update, Statement};
pub use client::MapSql;
pub use credentials::{CredentialFormat, Credentials};
pub use spec::{ReadMode, RowShape, Spec};

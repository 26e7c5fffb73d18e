/// MapSql Facade
///
/// The execute-mode surface of the crate. A `MapSql` instance owns at most
/// one connection handle, exclusively; operations run one at a time and
/// block until the database round-trip completes. Compile-only callers use
/// the `builder::compile_*` entry points instead; those never touch a
/// connection.
///
/// Batch entry points process their elements strictly in order, one full
/// compile-execute cycle per element, and return one result per input
/// element. A malformed or failing element never aborts the rest of the
/// batch.
use crate::builder::{self, Statement};
use crate::core::db::{connection, executor, Fetched};
use crate::core::{MapSqlError, Result};
use crate::credentials::Credentials;
use crate::spec::{self, NormalizedSpec, Spec};
use mysql::Conn;
use serde_json::Value;
use std::path::Path;
use tracing::warn;

/// Compiles operation specs into SQL and executes them over a single
/// owned MySQL connection.
#[derive(Default)]
pub struct MapSql {
    conn: Option<Conn>,
}

impl std::fmt::Debug for MapSql {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MapSql")
            .field("connected", &self.conn.is_some())
            .finish()
    }
}

impl MapSql {
    /// Creates an instance with no connection. Execute entry points fail
    /// with a configuration error until one of the connect methods (or
    /// `adopt`) succeeds.
    pub fn new() -> Self {
        MapSql { conn: None }
    }

    /// Opens a connection with the given credentials. Any previously held
    /// handle is replaced and dropped.
    pub fn connect(&mut self, credentials: &Credentials) -> Result<()> {
        self.conn = Some(connection::open(credentials)?);
        Ok(())
    }

    /// Loads credentials from a YAML or JSON file and connects.
    pub fn connect_file<P: AsRef<Path>>(&mut self, path: P) -> Result<()> {
        self.connect(&Credentials::from_file(path)?)
    }

    /// Adopts an already-open connection, replacing any held handle.
    pub fn adopt(&mut self, conn: Conn) {
        self.conn = Some(conn);
    }

    /// Drops the held connection, if any.
    pub fn disconnect(&mut self) {
        self.conn = None;
    }

    pub fn is_connected(&self) -> bool {
        self.conn.is_some()
    }

    /// Compiles and runs a SELECT, fetching per the spec's `#read_mode`
    /// and shaping rows per `#named`.
    pub fn select(&mut self, spec: &Spec) -> Result<Fetched> {
        let normalized = spec::normalize(spec)?;
        let statement = builder::select(&normalized);
        let conn = self.conn()?;
        executor::select(conn, &statement, normalized.read_mode, normalized.shape)
    }

    /// Compiles and runs an INSERT. A successful return means the
    /// statement committed; duplicate keys resolve silently via `IGNORE`.
    pub fn insert(&mut self, spec: &Spec) -> Result<()> {
        self.run(spec, builder::insert)
    }

    /// Compiles and runs an UPDATE.
    pub fn update(&mut self, spec: &Spec) -> Result<()> {
        self.run(spec, builder::update)
    }

    /// Compiles and runs a DELETE.
    pub fn delete(&mut self, spec: &Spec) -> Result<()> {
        self.run(spec, builder::delete)
    }

    /// Runs a SELECT per element, one result per input element.
    pub fn select_batch(&mut self, specs: &[Value]) -> Vec<Result<Fetched>> {
        spec::normalize_batch(specs)
            .into_iter()
            .map(|normalized| {
                let normalized = normalized?;
                let statement = builder::select(&normalized);
                let conn = self.conn()?;
                executor::select(conn, &statement, normalized.read_mode, normalized.shape)
            })
            .map(log_batch_failure)
            .collect()
    }

    /// Runs an INSERT per element, one result per input element.
    pub fn insert_batch(&mut self, specs: &[Value]) -> Vec<Result<()>> {
        self.run_batch(specs, builder::insert)
    }

    /// Runs an UPDATE per element, one result per input element.
    pub fn update_batch(&mut self, specs: &[Value]) -> Vec<Result<()>> {
        self.run_batch(specs, builder::update)
    }

    /// Runs a DELETE per element, one result per input element.
    pub fn delete_batch(&mut self, specs: &[Value]) -> Vec<Result<()>> {
        self.run_batch(specs, builder::delete)
    }

    fn run(
        &mut self,
        spec: &Spec,
        build: impl Fn(&NormalizedSpec) -> Result<Statement>,
    ) -> Result<()> {
        let statement = build(&spec::normalize(spec)?)?;
        executor::execute(self.conn()?, &statement)
    }

    fn run_batch(
        &mut self,
        specs: &[Value],
        build: impl Fn(&NormalizedSpec) -> Result<Statement>,
    ) -> Vec<Result<()>> {
        spec::normalize_batch(specs)
            .into_iter()
            .map(|normalized| {
                let statement = build(&normalized?)?;
                executor::execute(self.conn()?, &statement)
            })
            .map(log_batch_failure)
            .collect()
    }

    fn conn(&mut self) -> Result<&mut Conn> {
        self.conn.as_mut().ok_or_else(|| {
            MapSqlError::Config("no open connection; call connect first".to_string())
        })
    }
}

fn log_batch_failure<T>(outcome: Result<T>) -> Result<T> {
    if let Err(e) = &outcome {
        warn!("batch element failed: {}", e);
    }
    outcome
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn spec_of(value: Value) -> Spec {
        value.as_object().unwrap().clone()
    }

    #[test]
    fn test_execute_without_connection_is_config_error() {
        let mut client = MapSql::new();
        assert!(!client.is_connected());

        let spec = spec_of(json!({
            "#table": "users",
            "#where": { "id": ["=", 7] }
        }));

        match client.select(&spec).unwrap_err() {
            MapSqlError::Config(msg) => assert!(msg.contains("connection")),
            other => panic!("Expected Config error, got {:?}", other),
        }
    }

    #[test]
    fn test_malformed_spec_beats_missing_connection() {
        // Spec validation happens before the connection is touched.
        let mut client = MapSql::new();
        let spec = spec_of(json!({ "name": "Ann" }));

        match client.insert(&spec).unwrap_err() {
            MapSqlError::Spec(_) => {}
            other => panic!("Expected Spec error, got {:?}", other),
        }
    }

    #[test]
    fn test_batch_returns_one_result_per_element() {
        let mut client = MapSql::new();
        let batch = vec![
            json!({ "#table": "users", "name": "Ann" }),
            json!({ "name": "Bob" }),
            json!(42),
        ];

        let results = client.insert_batch(&batch);
        assert_eq!(results.len(), 3);

        // First element compiles but has no connection to run on.
        match results[0].as_ref().unwrap_err() {
            MapSqlError::Config(_) => {}
            other => panic!("Expected Config error, got {:?}", other),
        }
        // The other two fail on their own terms.
        assert!(matches!(
            results[1].as_ref().unwrap_err(),
            MapSqlError::Spec(_)
        ));
        assert!(matches!(
            results[2].as_ref().unwrap_err(),
            MapSqlError::Spec(_)
        ));
    }
}

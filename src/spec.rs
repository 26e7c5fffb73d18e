/// Spec Normalizer
///
/// Partitions an incoming operation mapping into reserved directives
/// (`#table`, `#where`, `#columns`, `#order_by`, `#read_mode`, `#named`)
/// versus plain column/value payload pairs. The split is decided here
/// once, at the boundary, and never re-inferred downstream.
///
/// Payload pairs are kept as two parallel vectors preserving insertion
/// order: INSERT and UPDATE bind values positionally against exactly this
/// order.
use crate::core::{MapSqlError, Result};
use crate::where_clause::{self, CompiledWhere};
use serde_json::Value;
use tracing::debug;

/// An operation spec as supplied by the caller: one flat JSON mapping.
pub type Spec = serde_json::Map<String, Value>;

/// Reserved directive keys.
pub const TABLE: &str = "#table";
pub const WHERE: &str = "#where";
pub const COLUMNS: &str = "#columns";
pub const ORDER_BY: &str = "#order_by";
pub const READ_MODE: &str = "#read_mode";
pub const NAMED: &str = "#named";

/// How many rows a SELECT should fetch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ReadMode {
    /// A single row (the default).
    #[default]
    One,
    /// At most the given number of rows.
    Many(u64),
    /// All matching rows.
    All,
}

/// How returned rows are represented.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RowShape {
    /// Positional sequences of column values (the default).
    #[default]
    Positional,
    /// Column-name to value mappings.
    Named,
}

/// The outcome of normalizing one operation spec: every directive routed
/// into its own slot, everything else collected as ordered payload.
#[derive(Debug, Clone, Default)]
pub struct NormalizedSpec {
    pub table: String,
    pub where_clause: Option<CompiledWhere>,
    pub columns: Option<String>,
    pub order_by: Option<String>,
    pub read_mode: ReadMode,
    pub shape: RowShape,
    pub payload_columns: Vec<String>,
    pub payload_values: Vec<Value>,
}

impl NormalizedSpec {
    pub fn has_payload(&self) -> bool {
        !self.payload_columns.is_empty()
    }
}

/// Normalizes a single operation spec.
///
/// Walks the key/value pairs once: recognized directives are routed into
/// dedicated slots (`#where` is compiled eagerly), every other pair is
/// accumulated as payload in insertion order. Directive values that are
/// empty strings, and an empty `#where` object, are treated as absent,
/// matching how callers blank out a directive instead of removing it.
///
/// # Errors
///
/// Returns `MapSqlError::Spec` if no usable `#table` directive is present
/// or a directive value has an unrecognized type.
pub fn normalize(spec: &Spec) -> Result<NormalizedSpec> {
    let mut out = NormalizedSpec::default();
    let mut table = None;

    for (key, value) in spec {
        match key.as_str() {
            TABLE => table = string_directive(TABLE, value)?,
            WHERE => {
                if !is_blank(value) {
                    out.where_clause = where_clause::compile_directive(value)?;
                }
            }
            COLUMNS => out.columns = string_directive(COLUMNS, value)?,
            ORDER_BY => out.order_by = string_directive(ORDER_BY, value)?,
            READ_MODE => {
                if !is_blank(value) {
                    out.read_mode = parse_read_mode(value)?;
                }
            }
            // Presence selects column-named rows; the value is ignored.
            NAMED => out.shape = RowShape::Named,
            _ => {
                out.payload_columns.push(key.clone());
                out.payload_values.push(value.clone());
            }
        }
    }

    match table {
        Some(table) => {
            out.table = table;
            debug!(
                "normalized spec for table '{}' ({} payload columns)",
                out.table,
                out.payload_columns.len()
            );
            Ok(out)
        }
        None => Err(MapSqlError::Spec("no #table directive in spec".to_string())),
    }
}

/// Normalizes an ordered sequence of specs, one result per element.
///
/// A malformed element (including a non-mapping element) fails on its own
/// without aborting the rest of the batch.
pub fn normalize_batch(specs: &[Value]) -> Vec<Result<NormalizedSpec>> {
    specs
        .iter()
        .enumerate()
        .map(|(index, element)| match element.as_object() {
            Some(spec) => normalize(spec),
            None => Err(MapSqlError::Spec(format!(
                "batch element {} is not a mapping",
                index
            ))),
        })
        .collect()
}

fn is_blank(value: &Value) -> bool {
    matches!(value, Value::String(s) if s.is_empty())
}

fn string_directive(key: &str, value: &Value) -> Result<Option<String>> {
    match value {
        Value::String(s) if s.is_empty() => Ok(None),
        Value::String(s) => Ok(Some(s.clone())),
        _ => Err(MapSqlError::Spec(format!(
            "{} directive must be a string, got {}",
            key, value
        ))),
    }
}

fn parse_read_mode(value: &Value) -> Result<ReadMode> {
    match value {
        Value::Number(n) => n.as_u64().map(ReadMode::Many).ok_or_else(|| {
            MapSqlError::Spec(format!("#read_mode row cap must be a non-negative integer, got {}", n))
        }),
        Value::String(s) if s.eq_ignore_ascii_case("one") => Ok(ReadMode::One),
        Value::String(s) if s.eq_ignore_ascii_case("all") || s.eq_ignore_ascii_case("fetchall") => {
            Ok(ReadMode::All)
        }
        other => Err(MapSqlError::Spec(format!(
            "unrecognized #read_mode value {}",
            other
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn spec_of(value: Value) -> Spec {
        value.as_object().unwrap().clone()
    }

    #[test]
    fn test_payload_preserves_insertion_order() {
        let spec = spec_of(json!({
            "#table": "users",
            "name": "Ann",
            "age": 30,
            "email": "ann@example.com"
        }));

        let normalized = normalize(&spec).unwrap();
        assert_eq!(normalized.table, "users");
        assert_eq!(normalized.payload_columns, vec!["name", "age", "email"]);
        assert_eq!(
            normalized.payload_values,
            vec![json!("Ann"), json!(30), json!("ann@example.com")]
        );
    }

    #[test]
    fn test_missing_table_is_rejected() {
        let spec = spec_of(json!({ "name": "Ann" }));
        match normalize(&spec).unwrap_err() {
            MapSqlError::Spec(msg) => assert!(msg.contains("#table")),
            other => panic!("Expected Spec error, got {:?}", other),
        }

        // A blanked-out table directive counts as absent.
        let spec = spec_of(json!({ "#table": "", "name": "Ann" }));
        assert!(normalize(&spec).is_err());
    }

    #[test]
    fn test_where_is_compiled_eagerly() {
        let spec = spec_of(json!({
            "#table": "users",
            "#where": { "id": ["=", 7] }
        }));

        let normalized = normalize(&spec).unwrap();
        let compiled = normalized.where_clause.as_ref().unwrap();
        assert_eq!(compiled.fragment, "id = ?");
        assert_eq!(compiled.values, vec![json!(7)]);
        assert!(!normalized.has_payload());
    }

    #[test]
    fn test_blank_directives_are_absent() {
        let spec = spec_of(json!({
            "#table": "users",
            "#where": "",
            "#columns": "",
            "#order_by": "",
            "#read_mode": ""
        }));

        let normalized = normalize(&spec).unwrap();
        assert!(normalized.where_clause.is_none());
        assert!(normalized.columns.is_none());
        assert!(normalized.order_by.is_none());
        assert_eq!(normalized.read_mode, ReadMode::One);

        let spec = spec_of(json!({ "#table": "users", "#where": {} }));
        assert!(normalize(&spec).unwrap().where_clause.is_none());
    }

    #[test]
    fn test_read_mode_parsing() {
        let mode = |v: Value| {
            let spec = spec_of(json!({ "#table": "t", "#read_mode": v }));
            normalize(&spec).map(|n| n.read_mode)
        };

        assert_eq!(mode(json!("one")).unwrap(), ReadMode::One);
        assert_eq!(mode(json!("ALL")).unwrap(), ReadMode::All);
        assert_eq!(mode(json!("fetchall")).unwrap(), ReadMode::All);
        assert_eq!(mode(json!(25)).unwrap(), ReadMode::Many(25));
        assert!(mode(json!("some")).is_err());
        assert!(mode(json!(-3)).is_err());
    }

    #[test]
    fn test_named_shape_directive() {
        let spec = spec_of(json!({ "#table": "users", "#named": "" }));
        assert_eq!(normalize(&spec).unwrap().shape, RowShape::Named);

        let spec = spec_of(json!({ "#table": "users" }));
        assert_eq!(normalize(&spec).unwrap().shape, RowShape::Positional);
    }

    #[test]
    fn test_unreserved_hash_key_falls_through_to_payload() {
        let spec = spec_of(json!({ "#table": "users", "#note": "x" }));
        let normalized = normalize(&spec).unwrap();
        assert_eq!(normalized.payload_columns, vec!["#note"]);
    }

    #[test]
    fn test_batch_isolates_per_element_failures() {
        let batch = vec![
            json!({ "#table": "users", "name": "Ann" }),
            json!("not a mapping"),
            json!({ "name": "Bob" }),
            json!({ "#table": "users", "name": "Eve" }),
        ];

        let results = normalize_batch(&batch);
        assert_eq!(results.len(), 4);
        assert!(results[0].is_ok());
        assert!(results[1].is_err());
        assert!(results[2].is_err());
        assert!(results[3].is_ok());
    }
}

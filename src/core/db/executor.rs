/// Statement Execution Module
///
/// Runs compiled statements against an open connection: binds positional
/// parameters, picks the fetch cardinality for reads, and converts driver
/// rows into the requested output shape. Statement resources are scoped to
/// each call and released on every exit path.
///
/// The connection operates in autocommit mode, so a successful mutating
/// statement is committed before the call returns; a failed statement
/// yields an error and no fetched rows.
use crate::builder::Statement;
use crate::core::db::value;
use crate::core::{MapSqlError, Result};
use crate::spec::{ReadMode, RowShape};
use mysql::prelude::Queryable;
use mysql::{Conn, Params, Row as SqlRow};
use serde_json::{Map, Value};
use tracing::{debug, error};

/// One fetched row, in the shape the spec requested.
#[derive(Debug, Clone, PartialEq)]
pub enum Row {
    /// A positional sequence of column values.
    Positional(Vec<Value>),
    /// A column-name to value mapping, in result-set column order.
    Named(Map<String, Value>),
}

/// The result of a SELECT, matching the requested cardinality.
#[derive(Debug, Clone, PartialEq)]
pub enum Fetched {
    /// `ReadMode::One`: the first matching row, if any.
    One(Option<Row>),
    /// `ReadMode::Many` / `ReadMode::All`: the matching rows in order.
    Rows(Vec<Row>),
}

/// Runs a SELECT and fetches according to the read mode.
pub fn select(
    conn: &mut Conn,
    statement: &Statement,
    read_mode: ReadMode,
    shape: RowShape,
) -> Result<Fetched> {
    let params = bind(&statement.params);

    let fetched = match read_mode {
        ReadMode::One => conn
            .exec_first::<SqlRow, _, _>(statement.sql.as_str(), params)
            .map(|row| Fetched::One(row.map(|r| convert_row(r, shape)))),
        ReadMode::Many(_) | ReadMode::All => conn
            .exec::<SqlRow, _, _>(statement.sql.as_str(), params)
            .map(|rows| {
                let rows = rows.into_iter().map(|r| convert_row(r, shape)).collect();
                Fetched::Rows(apply_cap(rows, read_mode))
            }),
    };

    match fetched {
        Ok(result) => {
            debug!("select ok: {}", statement.sql);
            Ok(result)
        }
        Err(e) => {
            error!("select failed: {} ({})", statement.sql, e);
            Err(MapSqlError::Driver(e))
        }
    }
}

/// Runs a mutating statement (INSERT, UPDATE, DELETE). Autocommit means a
/// successful return implies the statement is committed.
pub fn execute(conn: &mut Conn, statement: &Statement) -> Result<()> {
    conn.exec_drop(statement.sql.as_str(), bind(&statement.params))
        .map_err(|e| {
            error!("execute failed: {} ({})", statement.sql, e);
            MapSqlError::Driver(e)
        })?;

    debug!("execute ok: {}", statement.sql);
    Ok(())
}

/// Bounds what the caller sees to the requested row cap. The driver has
/// already drained the result set at this point.
fn apply_cap(mut rows: Vec<Row>, read_mode: ReadMode) -> Vec<Row> {
    if let ReadMode::Many(cap) = read_mode {
        rows.truncate(cap as usize);
    }
    rows
}

fn bind(params: &[Value]) -> Params {
    if params.is_empty() {
        Params::Empty
    } else {
        Params::Positional(params.iter().map(value::to_sql).collect())
    }
}

fn convert_row(row: SqlRow, shape: RowShape) -> Row {
    match shape {
        RowShape::Positional => {
            Row::Positional(row.unwrap().into_iter().map(value::from_sql).collect())
        }
        RowShape::Named => {
            let columns = row.columns();
            let values = row.unwrap();
            Row::Named(
                columns
                    .iter()
                    .map(|column| column.name_str().into_owned())
                    .zip(values.into_iter().map(value::from_sql))
                    .collect(),
            )
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mysql::Value as SqlValue;
    use serde_json::json;

    #[test]
    fn test_empty_parameter_list_binds_as_empty() {
        match bind(&[]) {
            Params::Empty => {}
            other => panic!("Expected Params::Empty, got {:?}", other),
        }
    }

    fn sample_rows(count: usize) -> Vec<Row> {
        (0..count)
            .map(|i| Row::Positional(vec![json!(i)]))
            .collect()
    }

    #[test]
    fn test_many_caps_the_visible_row_count() {
        let capped = apply_cap(sample_rows(5), ReadMode::Many(3));
        assert_eq!(capped.len(), 3);
        // The cap keeps the leading rows in order.
        assert_eq!(capped[0], Row::Positional(vec![json!(0)]));
        assert_eq!(capped[2], Row::Positional(vec![json!(2)]));

        assert!(apply_cap(sample_rows(5), ReadMode::Many(0)).is_empty());
    }

    #[test]
    fn test_cap_beyond_result_set_returns_everything() {
        assert_eq!(apply_cap(sample_rows(2), ReadMode::Many(10)).len(), 2);
        assert_eq!(apply_cap(sample_rows(4), ReadMode::All).len(), 4);
    }

    #[test]
    fn test_parameters_bind_positionally_in_order() {
        match bind(&[json!("Ann"), json!(30)]) {
            Params::Positional(values) => {
                assert_eq!(
                    values,
                    vec![SqlValue::Bytes(b"Ann".to_vec()), SqlValue::Int(30)]
                );
            }
            other => panic!("Expected positional params, got {:?}", other),
        }
    }
}

/// Statement Builders
///
/// Four pure builders (SELECT, INSERT, UPDATE, DELETE) that turn a
/// normalized spec into SQL text plus an ordered parameter list. The
/// `compile_*` entry points are the compile-only surface: they normalize
/// and build without ever touching a connection.
///
/// Table and column identifiers come from the spec verbatim; callers must
/// pass pre-validated identifiers. Only bound values are injection-safe.
use crate::core::{MapSqlError, Result};
use crate::spec::{self, NormalizedSpec, Spec};
use serde_json::Value;
use tracing::debug;

/// A compiled statement: SQL text and the values to bind, left to right.
/// The number of `?` placeholders in the text always equals the number of
/// parameters.
#[derive(Debug, Clone, PartialEq)]
pub struct Statement {
    pub sql: String,
    pub params: Vec<Value>,
}

/// Builds `SELECT <columns|*> FROM <table>[ WHERE ...][ ORDER BY ...]`.
/// Parameters are the where-clause bound values.
pub fn select(spec: &NormalizedSpec) -> Statement {
    let columns = spec.columns.as_deref().unwrap_or("*");
    let mut sql = format!("SELECT {} FROM {}", columns, spec.table);
    let mut params = Vec::new();

    if let Some(clause) = &spec.where_clause {
        sql.push_str(" WHERE ");
        sql.push_str(&clause.fragment);
        params.extend(clause.values.iter().cloned());
    }
    if let Some(order_by) = &spec.order_by {
        sql.push_str(" ORDER BY ");
        sql.push_str(order_by);
    }

    debug!("built select: {}", sql);
    Statement { sql, params }
}

/// Builds `INSERT IGNORE INTO <table>(<columns>) VALUES (?, ...)`.
///
/// `IGNORE` makes duplicate-key conflicts resolve silently at the
/// statement level. Parameters are the payload values in normalized
/// order; an empty payload is malformed.
pub fn insert(spec: &NormalizedSpec) -> Result<Statement> {
    if !spec.has_payload() {
        return Err(MapSqlError::Spec(format!(
            "INSERT into '{}' requires at least one payload column",
            spec.table
        )));
    }

    let placeholders = vec!["?"; spec.payload_columns.len()].join(", ");
    let sql = format!(
        "INSERT IGNORE INTO {}({}) VALUES ({})",
        spec.table,
        spec.payload_columns.join(", "),
        placeholders
    );

    debug!("built insert: {}", sql);
    Ok(Statement {
        sql,
        params: spec.payload_values.clone(),
    })
}

/// Builds `UPDATE <table> SET <col> = ?, ... WHERE <fragment>`.
///
/// Parameters are the payload values followed by the where-clause bound
/// values; that concatenation order matches the placeholder order in the
/// SQL text and must not change. Empty payload or missing `#where` is
/// malformed.
pub fn update(spec: &NormalizedSpec) -> Result<Statement> {
    if !spec.has_payload() {
        return Err(MapSqlError::Spec(format!(
            "UPDATE of '{}' requires at least one payload column",
            spec.table
        )));
    }
    let clause = spec.where_clause.as_ref().ok_or_else(|| {
        MapSqlError::Spec(format!("UPDATE of '{}' requires a #where directive", spec.table))
    })?;

    let assignments = spec
        .payload_columns
        .iter()
        .map(|column| format!("{} = ?", column))
        .collect::<Vec<_>>()
        .join(", ");
    let sql = format!(
        "UPDATE {} SET {} WHERE {}",
        spec.table, assignments, clause.fragment
    );

    let mut params = spec.payload_values.clone();
    params.extend(clause.values.iter().cloned());

    debug!("built update: {}", sql);
    Ok(Statement { sql, params })
}

/// Builds `DELETE FROM <table> WHERE <fragment>`.
///
/// Parameters are the where-clause bound values. A spec without `#where`
/// is malformed: unconditional deletes are not part of the grammar.
pub fn delete(spec: &NormalizedSpec) -> Result<Statement> {
    let clause = spec.where_clause.as_ref().ok_or_else(|| {
        MapSqlError::Spec(format!("DELETE from '{}' requires a #where directive", spec.table))
    })?;

    let sql = format!("DELETE FROM {} WHERE {}", spec.table, clause.fragment);

    debug!("built delete: {}", sql);
    Ok(Statement {
        sql,
        params: clause.values.clone(),
    })
}

/// Compile-only SELECT: normalize and build, never touching a connection.
pub fn compile_select(spec: &Spec) -> Result<Statement> {
    Ok(select(&spec::normalize(spec)?))
}

/// Compile-only INSERT.
pub fn compile_insert(spec: &Spec) -> Result<Statement> {
    insert(&spec::normalize(spec)?)
}

/// Compile-only UPDATE.
pub fn compile_update(spec: &Spec) -> Result<Statement> {
    update(&spec::normalize(spec)?)
}

/// Compile-only DELETE.
pub fn compile_delete(spec: &Spec) -> Result<Statement> {
    delete(&spec::normalize(spec)?)
}

/// Compile-only batch: one compiled statement (or one error) per input
/// element, in input order.
pub fn compile_batch(
    specs: &[Value],
    build: impl Fn(&NormalizedSpec) -> Result<Statement>,
) -> Vec<Result<Statement>> {
    spec::normalize_batch(specs)
        .into_iter()
        .map(|normalized| build(&normalized?))
        .collect()
}

/// Condition Compiler
///
/// Translates the WHERE-clause mini-grammar into a SQL fragment plus an
/// ordered list of bound values. Each entry of a `#where` directive maps a
/// column name to an array of 1 to 3 elements:
///
/// - `[comparator]`: a raw SQL fragment with no bound value, inserted
///   verbatim (enables expressions like `a.id = b.id` keyed on any label)
/// - `[comparator, value]`: one bound value, chained to the previous
///   clause by plain concatenation
/// - `[comparator, value, connector]`: one bound value plus an explicit
///   logical connector (`and`, `or`, ...) joining to the next clause
///
/// Entries are processed strictly in input order; the order of bound
/// values in the output list is exactly the order they appear in the
/// fragment. Comparators, connectors and column names are interpolated
/// unescaped; only bound values are injection-safe.
use crate::core::{MapSqlError, Result};
use serde_json::Value;

/// One parsed where-clause entry.
#[derive(Debug, Clone, PartialEq)]
pub struct Condition {
    pub column: String,
    pub comparator: String,
    pub value: Option<Value>,
    pub connector: Option<String>,
}

/// The compiled WHERE fragment and its bound values, in emission order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CompiledWhere {
    pub fragment: String,
    pub values: Vec<Value>,
}

impl Condition {
    /// Parses a single `column -> [comparator[, value[, connector]]]`
    /// entry. Arrays outside 1..=3 elements, non-string comparators and
    /// non-string connectors are malformed.
    pub fn parse(column: &str, entry: &Value) -> Result<Self> {
        let items = entry.as_array().ok_or_else(|| {
            MapSqlError::Spec(format!(
                "where entry for '{}' must be an array of 1 to 3 elements",
                column
            ))
        })?;

        if items.is_empty() || items.len() > 3 {
            return Err(MapSqlError::Spec(format!(
                "where entry for '{}' has {} elements, expected 1 to 3",
                column,
                items.len()
            )));
        }

        let comparator = items[0]
            .as_str()
            .ok_or_else(|| {
                MapSqlError::Spec(format!("where comparator for '{}' must be a string", column))
            })?
            .to_string();

        let connector = match items.get(2) {
            Some(c) => Some(
                c.as_str()
                    .ok_or_else(|| {
                        MapSqlError::Spec(format!(
                            "where connector for '{}' must be a string",
                            column
                        ))
                    })?
                    .to_string(),
            ),
            None => None,
        };

        Ok(Condition {
            column: column.to_string(),
            comparator,
            value: items.get(1).cloned(),
            connector,
        })
    }
}

/// Compiles an ordered sequence of conditions into a single fragment and
/// value list. Per entry: emit `<column> <comparator>`, append a `?`
/// placeholder when a value is present, append the connector when one is
/// present. Pieces are concatenated with a single space, in input order.
pub fn compile(conditions: &[Condition]) -> CompiledWhere {
    let mut pieces = Vec::with_capacity(conditions.len());
    let mut values = Vec::new();

    for condition in conditions {
        let mut piece = format!("{} {}", condition.column, condition.comparator);

        if let Some(value) = &condition.value {
            piece.push_str(" ?");
            values.push(value.clone());
        }
        if let Some(connector) = &condition.connector {
            piece.push(' ');
            piece.push_str(connector);
        }

        pieces.push(piece);
    }

    CompiledWhere {
        fragment: pieces.join(" "),
        values,
    }
}

/// Compiles a raw `#where` directive value. An empty object compiles to
/// no clause at all; anything other than an object is malformed.
pub fn compile_directive(directive: &Value) -> Result<Option<CompiledWhere>> {
    let entries = directive.as_object().ok_or_else(|| {
        MapSqlError::Spec("#where directive must be a mapping of column to condition".to_string())
    })?;

    if entries.is_empty() {
        return Ok(None);
    }

    let conditions = entries
        .iter()
        .map(|(column, entry)| Condition::parse(column, entry))
        .collect::<Result<Vec<_>>>()?;

    Ok(Some(compile(&conditions)))
}

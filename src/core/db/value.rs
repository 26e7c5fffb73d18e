/// Value Conversion Module
///
/// Maps `serde_json::Value` to `mysql::Value` for parameter binding and
/// back for fetched rows. Arrays and objects bind as their JSON text;
/// temporal driver values come back as their SQL literal text.
use mysql::Value as SqlValue;
use serde_json::{Number, Value};

/// Converts a JSON value into a bindable driver value.
pub fn to_sql(value: &Value) -> SqlValue {
    match value {
        Value::Null => SqlValue::NULL,
        Value::Bool(b) => SqlValue::Int(i64::from(*b)),
        Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                SqlValue::Int(i)
            } else if let Some(u) = n.as_u64() {
                SqlValue::UInt(u)
            } else {
                SqlValue::Double(n.as_f64().unwrap_or_default())
            }
        }
        Value::String(s) => SqlValue::Bytes(s.clone().into_bytes()),
        other => SqlValue::Bytes(other.to_string().into_bytes()),
    }
}

/// Converts a fetched driver value into a JSON value.
pub fn from_sql(value: SqlValue) -> Value {
    match value {
        SqlValue::NULL => Value::Null,
        SqlValue::Bytes(bytes) => Value::String(String::from_utf8_lossy(&bytes).into_owned()),
        SqlValue::Int(i) => Value::Number(i.into()),
        SqlValue::UInt(u) => Value::Number(u.into()),
        SqlValue::Float(f) => finite_number(f64::from(f)),
        SqlValue::Double(d) => finite_number(d),
        SqlValue::Date(year, month, day, hour, minute, second, micros) => {
            let mut text = format!("{:04}-{:02}-{:02}", year, month, day);
            if hour > 0 || minute > 0 || second > 0 || micros > 0 {
                text.push_str(&format!(" {:02}:{:02}:{:02}", hour, minute, second));
                if micros > 0 {
                    text.push_str(&format!(".{:06}", micros));
                }
            }
            Value::String(text)
        }
        SqlValue::Time(negative, days, hours, minutes, seconds, micros) => {
            let mut text = format!(
                "{}{:02}:{:02}:{:02}",
                if negative { "-" } else { "" },
                u32::from(hours) + days * 24,
                minutes,
                seconds
            );
            if micros > 0 {
                text.push_str(&format!(".{:06}", micros));
            }
            Value::String(text)
        }
    }
}

fn finite_number(d: f64) -> Value {
    Number::from_f64(d).map(Value::Number).unwrap_or(Value::Null)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_scalar_binding() {
        assert_eq!(to_sql(&json!(null)), SqlValue::NULL);
        assert_eq!(to_sql(&json!(true)), SqlValue::Int(1));
        assert_eq!(to_sql(&json!(-5)), SqlValue::Int(-5));
        assert_eq!(to_sql(&json!(u64::MAX)), SqlValue::UInt(u64::MAX));
        assert_eq!(to_sql(&json!(1.5)), SqlValue::Double(1.5));
        assert_eq!(to_sql(&json!("Ann")), SqlValue::Bytes(b"Ann".to_vec()));
    }

    #[test]
    fn test_structured_values_bind_as_json_text() {
        assert_eq!(
            to_sql(&json!([1, 2])),
            SqlValue::Bytes(b"[1,2]".to_vec())
        );
        assert_eq!(
            to_sql(&json!({ "a": 1 })),
            SqlValue::Bytes(b"{\"a\":1}".to_vec())
        );
    }

    #[test]
    fn test_fetched_scalars() {
        assert_eq!(from_sql(SqlValue::NULL), json!(null));
        assert_eq!(from_sql(SqlValue::Int(7)), json!(7));
        assert_eq!(from_sql(SqlValue::UInt(7)), json!(7u64));
        assert_eq!(from_sql(SqlValue::Double(2.5)), json!(2.5));
        assert_eq!(
            from_sql(SqlValue::Bytes(b"hello".to_vec())),
            json!("hello")
        );
    }

    #[test]
    fn test_temporal_values_render_as_literals() {
        assert_eq!(
            from_sql(SqlValue::Date(2024, 3, 9, 0, 0, 0, 0)),
            json!("2024-03-09")
        );
        assert_eq!(
            from_sql(SqlValue::Date(2024, 3, 9, 13, 30, 5, 0)),
            json!("2024-03-09 13:30:05")
        );
        assert_eq!(
            from_sql(SqlValue::Time(true, 1, 2, 15, 0, 0)),
            json!("-26:15:00")
        );
    }
}

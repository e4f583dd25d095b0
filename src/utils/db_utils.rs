use serde_json::Value;
use chrono::{NaiveDate, NaiveDateTime};
use sqlx::MySqlPool;

use crate::error::ValidationError;


/// ===============================
/// SQL bindable value enum
/// ===============================
#[derive(Debug, PartialEq)]
pub enum SqlValue {
    String(String),
    I64(i64),
    F64(f64),
    Bool(bool),
    Date(NaiveDate),
    DateTime(NaiveDateTime),
    Null,
}


/// ===============================
/// SQL update container
/// ===============================
#[derive(Debug)]
pub struct SqlUpdate {
    pub sql: String,
    pub values: Vec<SqlValue>,
}

/// Columns a partial update may touch. Keys in `ignored` are dropped silently.
pub struct UpdatableColumns<'a> {
    pub allowed: &'a [&'a str],
    pub ignored: &'a [&'a str],
}


/// ===============================
/// Build dynamic UPDATE SQL
/// ===============================
pub fn build_update_sql(
    table: &str,
    payload: &Value,
    columns: &UpdatableColumns<'_>,
    id_column: &str,
    id_value: i64,
) -> Result<SqlUpdate, ValidationError> {
    let obj = payload
        .as_object()
        .ok_or_else(|| ValidationError::Payload("Payload must be a JSON object".into()))?;

    let mut assignments = Vec::with_capacity(obj.len());
    let mut values = Vec::with_capacity(obj.len() + 1);

    for (key, value) in obj {
        if columns.ignored.contains(&key.as_str()) {
            continue;
        }
        if !columns.allowed.contains(&key.as_str()) {
            return Err(ValidationError::Payload(format!(
                "Field {key:?} cannot be updated"
            )));
        }
        assignments.push(format!("{} = ?", key));

        // Convert JSON values → SqlValue
        match value {
            Value::String(s) => {
                if let Ok(d) = NaiveDate::parse_from_str(s, "%Y-%m-%d") {
                    values.push(SqlValue::Date(d));
                } else if let Ok(dt) =
                    NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S")
                {
                    values.push(SqlValue::DateTime(dt));
                } else {
                    values.push(SqlValue::String(s.clone()));
                }
            }
            Value::Number(n) => {
                if let Some(i) = n.as_i64() {
                    values.push(SqlValue::I64(i));
                } else if let Some(f) = n.as_f64() {
                    values.push(SqlValue::F64(f));
                }
            }
            Value::Bool(b) => values.push(SqlValue::Bool(*b)),
            Value::Null => values.push(SqlValue::Null),
            _ => {
                return Err(ValidationError::Payload(format!(
                    "Unsupported value for {key:?}"
                )))
            }
        }
    }

    if assignments.is_empty() {
        return Err(ValidationError::Payload("No fields provided for update".into()));
    }

    let sql = format!(
        "UPDATE {} SET {} WHERE {} = ?",
        table,
        assignments.join(", "),
        id_column
    );

    // WHERE id = ?
    values.push(SqlValue::I64(id_value));

    Ok(SqlUpdate { sql, values })
}


/// ===============================
/// Execute the update
/// ===============================
pub async fn execute_update(
    pool: &MySqlPool,
    update: SqlUpdate,
) -> Result<u64, sqlx::Error> {
    let mut query = sqlx::query(&update.sql);

    for value in update.values {
        query = match value {
            SqlValue::String(v) => query.bind(v),
            SqlValue::I64(v) => query.bind(v),
            SqlValue::F64(v) => query.bind(v),
            SqlValue::Bool(v) => query.bind(v),
            SqlValue::Date(v) => query.bind(v),
            SqlValue::DateTime(v) => query.bind(v),
            SqlValue::Null => query.bind(None::<String>),
        };
    }

    let result = query.execute(pool).await?;
    Ok(result.rows_affected())
}

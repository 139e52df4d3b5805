//! Records and their two wire renderings: SQL literals and positional JSON rows.
//!
//! Both renderings start from the same normalized row, built by walking the
//! schema in order. Escaping only ever happens in the SQL rendering.

use chrono::{DateTime, NaiveDate, NaiveDateTime, SecondsFormat, Utc};
use serde_json::Value;

use crate::store::error::{StoreError, StoreResult};
use crate::store::schema::{ColumnSchema, ColumnType};

#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    Text(String),
    Integer(i64),
    Timestamp(DateTime<Utc>),
    Null,
}

impl From<&str> for FieldValue {
    fn from(v: &str) -> Self {
        FieldValue::Text(v.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(v: String) -> Self {
        FieldValue::Text(v)
    }
}

impl From<i64> for FieldValue {
    fn from(v: i64) -> Self {
        FieldValue::Integer(v)
    }
}

impl From<i32> for FieldValue {
    fn from(v: i32) -> Self {
        FieldValue::Integer(v.into())
    }
}

impl From<DateTime<Utc>> for FieldValue {
    fn from(v: DateTime<Utc>) -> Self {
        FieldValue::Timestamp(v)
    }
}

impl<T: Into<FieldValue>> From<Option<T>> for FieldValue {
    fn from(v: Option<T>) -> Self {
        v.map(Into::into).unwrap_or(FieldValue::Null)
    }
}

impl FieldValue {
    /// Reads a cell of a query result back into a value of the column's type.
    pub fn from_json(column_type: ColumnType, value: &Value) -> StoreResult<Self> {
        let decoded = match (column_type, value) {
            (_, Value::Null) => Some(FieldValue::Null),
            (ColumnType::String, Value::String(s)) => Some(FieldValue::Text(s.clone())),
            (ColumnType::Integer | ColumnType::Long, Value::Number(n)) => {
                n.as_i64().map(FieldValue::Integer)
            }
            (ColumnType::Integer | ColumnType::Long, Value::String(s)) => {
                s.parse().ok().map(FieldValue::Integer)
            }
            (ColumnType::Timestamp, Value::String(s)) => parse_timestamp(s).map(FieldValue::Timestamp),
            _ => None,
        };
        decoded.ok_or_else(|| {
            StoreError::validation(format!(
                "cannot read {value} as {}",
                column_type.as_str()
            ))
        })
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            FieldValue::Text(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            FieldValue::Integer(i) => Some(*i),
            _ => None,
        }
    }

    pub fn as_timestamp(&self) -> Option<DateTime<Utc>> {
        match self {
            FieldValue::Timestamp(ts) => Some(*ts),
            _ => None,
        }
    }

    /// SQL literal. Text has every `'` doubled.
    pub fn to_sql_literal(&self) -> String {
        match self {
            FieldValue::Text(s) => format!("'{}'", escape_sql_string(s)),
            FieldValue::Integer(i) => i.to_string(),
            FieldValue::Timestamp(ts) => format!("TIMESTAMP('{}')", format_timestamp(ts)),
            FieldValue::Null => "NULL".to_string(),
        }
    }

    /// JSON scalar for the positional row format. No SQL escaping here.
    pub fn to_json(&self) -> Value {
        match self {
            FieldValue::Text(s) => Value::String(s.clone()),
            FieldValue::Integer(i) => Value::from(*i),
            FieldValue::Timestamp(ts) => Value::String(format_timestamp(ts)),
            FieldValue::Null => Value::Null,
        }
    }
}

/// Named field values supplied by the caller. Field order does not matter;
/// the schema decides the order on the wire.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Record {
    fields: Vec<(String, FieldValue)>,
}

impl Record {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, name: impl Into<String>, value: impl Into<FieldValue>) -> Self {
        self.set(name, value);
        self
    }

    pub fn set(&mut self, name: impl Into<String>, value: impl Into<FieldValue>) {
        let name = name.into();
        let value = value.into();
        match self.fields.iter_mut().find(|(n, _)| *n == name) {
            Some((_, slot)) => *slot = value,
            None => self.fields.push((name, value)),
        }
    }

    pub fn get(&self, name: &str) -> Option<&FieldValue> {
        self.fields.iter().find(|(n, _)| n == name).map(|(_, v)| v)
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Checks the record against `schema` and returns one normalized value
    /// per column, in schema order.
    pub fn to_row(&self, schema: &ColumnSchema) -> StoreResult<Vec<FieldValue>> {
        if let Some((name, _)) = self
            .fields
            .iter()
            .find(|(name, _)| !schema.names().any(|c| c == name))
        {
            return Err(StoreError::validation(format!(
                "field '{name}' is not a column of the container schema"
            )));
        }

        schema
            .columns()
            .iter()
            .map(|column| {
                let value = self.get(&column.name).ok_or_else(|| {
                    StoreError::validation(format!("record is missing field '{}'", column.name))
                })?;
                coerce(&column.name, column.column_type, value)
            })
            .collect()
    }
}

fn coerce(name: &str, column_type: ColumnType, value: &FieldValue) -> StoreResult<FieldValue> {
    match (column_type, value) {
        (_, FieldValue::Null) => Ok(FieldValue::Null),

        (ColumnType::String, FieldValue::Text(_)) => Ok(value.clone()),
        (ColumnType::String, FieldValue::Integer(i)) => Ok(FieldValue::Text(i.to_string())),
        (ColumnType::String, FieldValue::Timestamp(ts)) => {
            Ok(FieldValue::Text(format_timestamp(ts)))
        }

        (ColumnType::Integer | ColumnType::Long, FieldValue::Integer(i)) => {
            check_range(name, column_type, *i)
        }
        (ColumnType::Integer | ColumnType::Long, FieldValue::Text(s)) => {
            let parsed = s.parse::<i64>().map_err(|_| {
                StoreError::validation(format!("field '{name}' expects an integer, got '{s}'"))
            })?;
            check_range(name, column_type, parsed)
        }

        (ColumnType::Timestamp, FieldValue::Timestamp(_)) => Ok(value.clone()),
        (ColumnType::Timestamp, FieldValue::Text(s)) => parse_timestamp(s)
            .map(FieldValue::Timestamp)
            .ok_or_else(|| {
                StoreError::validation(format!(
                    "field '{name}' expects an ISO-8601 timestamp, got '{s}'"
                ))
            }),

        (expected, _) => Err(StoreError::validation(format!(
            "field '{name}' cannot hold {value:?} (column type {})",
            expected.as_str()
        ))),
    }
}

fn check_range(name: &str, column_type: ColumnType, value: i64) -> StoreResult<FieldValue> {
    if column_type == ColumnType::Integer && i32::try_from(value).is_err() {
        return Err(StoreError::validation(format!(
            "field '{name}' value {value} does not fit in INTEGER"
        )));
    }
    Ok(FieldValue::Integer(value))
}

pub fn escape_sql_string(s: &str) -> String {
    s.replace('\'', "''")
}

pub fn format_timestamp(ts: &DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// RFC 3339 first; zone-less date-times and bare dates are taken as UTC.
fn parse_timestamp(s: &str) -> Option<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Utc));
    }
    for format in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(s, format) {
            return Some(naive.and_utc());
        }
    }
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}

/// `INSERT INTO <container>(cols...) VALUES(...)` for an already-normalized row.
pub fn insert_statement(container: &str, schema: &ColumnSchema, row: &[FieldValue]) -> String {
    let columns = schema.names().collect::<Vec<_>>().join(", ");
    let values = row
        .iter()
        .map(FieldValue::to_sql_literal)
        .collect::<Vec<_>>()
        .join(", ");
    format!("INSERT INTO {container}({columns}) VALUES({values})")
}

/// Body of `PUT /containers/{name}/rows`: an array holding one row array.
pub fn row_payload(row: &[FieldValue]) -> Value {
    Value::Array(vec![Value::Array(row.iter().map(FieldValue::to_json).collect())])
}

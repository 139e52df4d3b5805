//! Query batches and the normalized success value returned by every operation.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::store::error::{StoreError, StoreResult};
use crate::store::record::{FieldValue, Record};
use crate::store::schema::ColumnType;

pub const SUCCESS_MESSAGE: &str = "Operation completed successfully";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum QueryKind {
    #[serde(rename = "sql-select")]
    SqlSelect,
}

/// One statement of a query batch. The statement is forwarded verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Query {
    #[serde(rename = "type")]
    pub kind: QueryKind,
    pub stmt: String,
}

impl Query {
    pub fn select(stmt: impl Into<String>) -> Self {
        Self {
            kind: QueryKind::SqlSelect,
            stmt: stmt.into(),
        }
    }

    /// Reads an untyped batch (e.g. a request body). Anything other than a
    /// non-empty array of `{type, stmt}` objects is a validation error.
    pub(crate) fn parse_batch(value: &Value) -> StoreResult<Vec<Query>> {
        let queries: Vec<Query> = match value {
            Value::Array(_) => serde_json::from_value(value.clone()).map_err(|e| {
                StoreError::validation(format!("queries must be {{type, stmt}} objects: {e}"))
            })?,
            _ => {
                return Err(StoreError::validation(
                    "Queries must be a non-empty array of SQL query objects.",
                ))
            }
        };
        validate_batch(&queries)?;
        Ok(queries)
    }
}

pub(crate) fn validate_batch(queries: &[Query]) -> StoreResult<()> {
    if queries.is_empty() {
        return Err(StoreError::validation(
            "Queries must be a non-empty array of SQL query objects.",
        ));
    }
    Ok(())
}

/// `{stmt}` entry for the SQL-update endpoint.
#[derive(Debug, Serialize)]
pub(crate) struct UpdateStatement<'a> {
    pub stmt: &'a str,
}

/// Success value of a store call.
///
/// The store sometimes answers a successful write with an empty or non-JSON
/// body; those are reported as `Synthetic` instead of failing.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum StoreResponse {
    Json(Value),
    Synthetic {
        message: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        response: Option<String>,
    },
}

impl StoreResponse {
    pub fn from_body(text: &str) -> Self {
        if text.is_empty() {
            return Self::synthetic(None);
        }
        match serde_json::from_str(text) {
            Ok(value) => StoreResponse::Json(value),
            Err(_) => Self::synthetic(Some(text.to_string())),
        }
    }

    fn synthetic(response: Option<String>) -> Self {
        StoreResponse::Synthetic {
            message: SUCCESS_MESSAGE.to_string(),
            response,
        }
    }

    pub fn as_json(&self) -> Option<&Value> {
        match self {
            StoreResponse::Json(v) => Some(v),
            StoreResponse::Synthetic { .. } => None,
        }
    }

    pub fn is_synthetic(&self) -> bool {
        matches!(self, StoreResponse::Synthetic { .. })
    }

    /// Decodes `[{columns, results}, ...]`, one entry per submitted query.
    /// A synthetic response carries no result sets.
    pub fn result_sets(&self) -> StoreResult<Vec<ResultSet>> {
        let value = match self {
            StoreResponse::Json(v) => v,
            StoreResponse::Synthetic { .. } => return Ok(Vec::new()),
        };
        let parsed: Result<Vec<ResultSet>, serde_json::Error> = match value {
            Value::Array(_) => serde_json::from_value(value.clone()),
            Value::Object(_) => {
                serde_json::from_value::<ResultSet>(value.clone()).map(|set| vec![set])
            }
            _ => return Ok(Vec::new()),
        };
        parsed.map_err(|e| StoreError::validation(format!("unexpected result set shape: {e}")))
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct ResultColumn {
    pub name: String,
    #[serde(rename = "type", default)]
    pub type_name: String,
}

impl ResultColumn {
    fn column_type(&self) -> Option<ColumnType> {
        let t = self.type_name.to_ascii_uppercase();
        if t.starts_with("TIMESTAMP") {
            Some(ColumnType::Timestamp)
        } else {
            match t.as_str() {
                "STRING" | "TEXT" => Some(ColumnType::String),
                "INTEGER" => Some(ColumnType::Integer),
                "LONG" => Some(ColumnType::Long),
                _ => None,
            }
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct ResultSet {
    #[serde(default)]
    pub columns: Vec<ResultColumn>,
    #[serde(default)]
    pub results: Vec<Vec<Value>>,
}

impl ResultSet {
    pub fn row_count(&self) -> usize {
        self.results.len()
    }

    /// Rows keyed by column name.
    pub fn records(&self) -> StoreResult<Vec<Record>> {
        self.results
            .iter()
            .map(|row| {
                if row.len() != self.columns.len() {
                    return Err(StoreError::validation(format!(
                        "row has {} cells but result has {} columns",
                        row.len(),
                        self.columns.len()
                    )));
                }
                let mut record = Record::new();
                for (column, cell) in self.columns.iter().zip(row) {
                    let value = match column.column_type() {
                        Some(t) => FieldValue::from_json(t, cell)?,
                        None => untyped_cell(cell),
                    };
                    record.set(column.name.clone(), value);
                }
                Ok(record)
            })
            .collect()
    }
}

fn untyped_cell(cell: &Value) -> FieldValue {
    match cell {
        Value::Null => FieldValue::Null,
        Value::String(s) => FieldValue::Text(s.clone()),
        Value::Number(n) => match n.as_i64() {
            Some(i) => FieldValue::Integer(i),
            None => FieldValue::Text(n.to_string()),
        },
        other => FieldValue::Text(other.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_query_serializes_with_type_tag() {
        let q = Query::select("SELECT * FROM resumes");
        assert_eq!(
            serde_json::to_value(&q).unwrap(),
            json!({"type": "sql-select", "stmt": "SELECT * FROM resumes"})
        );
    }

    #[test]
    fn test_parse_batch_rejects_null_and_empty() {
        assert!(matches!(
            Query::parse_batch(&Value::Null),
            Err(StoreError::Validation(_))
        ));
        assert!(matches!(
            Query::parse_batch(&json!([])),
            Err(StoreError::Validation(_))
        ));
        assert!(Query::parse_batch(&json!([{"stmt": "SELECT 1"}])).is_err());
    }

    #[test]
    fn test_statements_are_forwarded_unchecked() {
        let batch = Query::parse_batch(&json!([{"type": "sql-select", "stmt": "  "}])).unwrap();
        assert_eq!(batch[0].stmt, "  ");
        assert!(validate_batch(&[Query::select("")]).is_ok());
    }

    #[test]
    fn test_parse_batch_accepts_well_formed() {
        let batch = Query::parse_batch(&json!([
            {"type": "sql-select", "stmt": "SELECT 1"},
            {"type": "sql-select", "stmt": "SELECT 2"}
        ]))
        .unwrap();
        assert_eq!(batch.len(), 2);
        assert_eq!(batch[1].stmt, "SELECT 2");
    }

    #[test]
    fn test_response_from_body() {
        assert_eq!(
            StoreResponse::from_body(""),
            StoreResponse::Synthetic {
                message: SUCCESS_MESSAGE.to_string(),
                response: None
            }
        );
        assert_eq!(
            StoreResponse::from_body("OK"),
            StoreResponse::Synthetic {
                message: SUCCESS_MESSAGE.to_string(),
                response: Some("OK".to_string())
            }
        );
        assert_eq!(
            StoreResponse::from_body(r#"{"count":1}"#),
            StoreResponse::Json(json!({"count": 1}))
        );
    }

    #[test]
    fn test_synthetic_serializes_flat() {
        let value = serde_json::to_value(StoreResponse::from_body("done")).unwrap();
        assert_eq!(value, json!({"message": SUCCESS_MESSAGE, "response": "done"}));
    }

    #[test]
    fn test_result_sets_decode_rows() {
        let response = StoreResponse::Json(json!([{
            "columns": [
                {"name": "id", "type": "LONG"},
                {"name": "status", "type": "STRING"},
                {"name": "createdAt", "type": "TIMESTAMP"},
                {"name": "score", "type": "DOUBLE"}
            ],
            "results": [[1, "active", "2024-01-01T00:00:00.000Z", 0.5]],
            "responseSizeByte": 64
        }]));
        let sets = response.result_sets().unwrap();
        assert_eq!(sets.len(), 1);
        let records = sets[0].records().unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].get("id"), Some(&FieldValue::Integer(1)));
        assert_eq!(records[0].get("status").and_then(|v| v.as_text()), Some("active"));
        assert!(records[0].get("createdAt").and_then(|v| v.as_timestamp()).is_some());
        assert_eq!(records[0].get("score"), Some(&FieldValue::Text("0.5".to_string())));
    }

    #[test]
    fn test_result_sets_of_synthetic_is_empty() {
        assert!(StoreResponse::from_body("").result_sets().unwrap().is_empty());
    }

    #[test]
    fn test_ragged_row_is_an_error() {
        let set: ResultSet = serde_json::from_value(json!({
            "columns": [{"name": "id", "type": "LONG"}],
            "results": [[1, 2]]
        }))
        .unwrap();
        assert!(set.records().is_err());
    }
}

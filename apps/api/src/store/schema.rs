//! Container (table) shape: ordered columns and the creation payload.

use serde::{Deserialize, Serialize};

use crate::store::error::{StoreError, StoreResult};

pub const DEFAULT_CONTAINER: &str = "resumes";

/// Column types understood by the store. `TEXT` is accepted as an alias of `STRING`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ColumnType {
    #[serde(alias = "TEXT")]
    String,
    /// 32-bit signed.
    Integer,
    /// 64-bit signed.
    Long,
    Timestamp,
}

impl ColumnType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ColumnType::String => "STRING",
            ColumnType::Integer => "INTEGER",
            ColumnType::Long => "LONG",
            ColumnType::Timestamp => "TIMESTAMP",
        }
    }

    pub fn is_integral(&self) -> bool {
        matches!(self, ColumnType::Integer | ColumnType::Long)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Column {
    pub name: String,
    #[serde(rename = "type")]
    pub column_type: ColumnType,
}

impl Column {
    pub fn new(name: impl Into<String>, column_type: ColumnType) -> Self {
        Self {
            name: name.into(),
            column_type,
        }
    }
}

/// Ordered column list. Row tuples sent to or read from the store follow
/// this order exactly; the store has no name-keyed insert format.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ColumnSchema(Vec<Column>);

impl ColumnSchema {
    pub fn new(columns: Vec<Column>) -> StoreResult<Self> {
        if columns.is_empty() {
            return Err(StoreError::validation("schema must declare at least one column"));
        }
        for (i, column) in columns.iter().enumerate() {
            validate_identifier("column", &column.name)?;
            if columns[..i].iter().any(|c| c.name == column.name) {
                return Err(StoreError::validation(format!(
                    "duplicate column '{}' in schema",
                    column.name
                )));
            }
        }
        Ok(Self(columns))
    }

    /// Resume container layout: `id` is the row key.
    pub fn resumes() -> Self {
        Self(vec![
            Column::new("id", ColumnType::Long),
            Column::new("rawContent", ColumnType::String),
            Column::new("formattedContent", ColumnType::String),
            Column::new("status", ColumnType::String),
            Column::new("createdAt", ColumnType::Timestamp),
            Column::new("information", ColumnType::String),
        ])
    }

    pub fn columns(&self) -> &[Column] {
        &self.0
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(|c| c.name.as_str())
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl Default for ColumnSchema {
    fn default() -> Self {
        Self::resumes()
    }
}

/// Body of `POST /containers`.
#[derive(Debug, Serialize)]
pub(crate) struct ContainerSpec<'a> {
    pub container_name: &'a str,
    pub container_type: &'static str,
    pub rowkey: bool,
    pub columns: &'a ColumnSchema,
}

impl<'a> ContainerSpec<'a> {
    pub fn collection(container_name: &'a str, columns: &'a ColumnSchema) -> Self {
        Self {
            container_name,
            container_type: "COLLECTION",
            rowkey: true,
            columns,
        }
    }
}

/// Container and column names end up inside SQL text and URL paths, so only
/// plain identifiers are accepted.
pub fn validate_identifier(kind: &str, name: &str) -> StoreResult<()> {
    let mut chars = name.chars();
    let valid_head = matches!(chars.next(), Some(c) if c.is_ascii_alphabetic() || c == '_');
    if !valid_head || !chars.all(|c| c.is_ascii_alphanumeric() || c == '_') {
        return Err(StoreError::validation(format!(
            "invalid {kind} name '{name}': expected letters, digits or '_'"
        )));
    }
    Ok(())
}

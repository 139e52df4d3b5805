use chrono::{DateTime, SubsecRound, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::store::{Record, StoreError, StoreResult};

pub const STATUS_ACTIVE: &str = "active";

/// A generated resume as stored in the `resumes` container.
///
/// Field names match the container's column names; see `ColumnSchema::resumes`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResumeRecord {
    pub id: i64,
    pub raw_content: String,
    pub formatted_content: String,
    /// Free-form tag, `active` for freshly generated resumes.
    pub status: String,
    pub created_at: DateTime<Utc>,
    /// JSON-encoded blob (generation stats and the like).
    pub information: String,
}

impl ResumeRecord {
    pub fn new(raw_content: String, formatted_content: String, information: String) -> Self {
        Self {
            id: generate_id(),
            raw_content,
            formatted_content,
            status: STATUS_ACTIVE.to_string(),
            // The store keeps millisecond precision.
            created_at: Utc::now().trunc_subsecs(3),
            information,
        }
    }

    pub fn to_record(&self) -> Record {
        Record::new()
            .with("id", self.id)
            .with("rawContent", self.raw_content.as_str())
            .with("formattedContent", self.formatted_content.as_str())
            .with("status", self.status.as_str())
            .with("createdAt", self.created_at)
            .with("information", self.information.as_str())
    }

    pub fn from_record(record: &Record) -> StoreResult<Self> {
        let text = |name: &str| -> StoreResult<String> {
            record
                .get(name)
                .and_then(|v| v.as_text())
                .map(str::to_string)
                .ok_or_else(|| missing(name))
        };

        Ok(Self {
            id: record
                .get("id")
                .and_then(|v| v.as_i64())
                .ok_or_else(|| missing("id"))?,
            raw_content: text("rawContent")?,
            formatted_content: text("formattedContent")?,
            status: text("status")?,
            created_at: record
                .get("createdAt")
                .and_then(|v| v.as_timestamp())
                .ok_or_else(|| missing("createdAt"))?,
            information: text("information")?,
        })
    }
}

fn missing(name: &str) -> StoreError {
    StoreError::Validation(format!("resume row has no usable '{name}' column"))
}

/// Positive 63-bit identifier. Random rather than time-based so concurrent
/// requests cannot collide on the row key.
pub fn generate_id() -> i64 {
    (Uuid::new_v4().as_u128() as u64 >> 1) as i64
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    use crate::store::{ColumnSchema, FieldValue};

    fn sample() -> ResumeRecord {
        ResumeRecord {
            id: 7,
            raw_content: "I'm a Go developer".to_string(),
            formatted_content: "# Alex".to_string(),
            status: STATUS_ACTIVE.to_string(),
            created_at: Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap(),
            information: "{}".to_string(),
        }
    }

    #[test]
    fn test_record_matches_resume_schema() {
        let row = sample().to_record().to_row(&ColumnSchema::resumes()).unwrap();
        assert_eq!(row[0], FieldValue::Integer(7));
        assert_eq!(row[1], FieldValue::Text("I'm a Go developer".to_string()));
    }

    #[test]
    fn test_from_record_round_trip() {
        let resume = sample();
        assert_eq!(ResumeRecord::from_record(&resume.to_record()).unwrap(), resume);
    }

    #[test]
    fn test_from_record_missing_column() {
        let record = sample().to_record().with("status", FieldValue::Null);
        let err = ResumeRecord::from_record(&record).unwrap_err();
        assert!(err.to_string().contains("status"));
    }

    #[test]
    fn test_new_resume_defaults() {
        let resume = ResumeRecord::new("raw".into(), "# md".into(), "{}".into());
        assert!(resume.id >= 0);
        assert_eq!(resume.status, STATUS_ACTIVE);
        assert_eq!(resume.created_at.timestamp_subsec_nanos() % 1_000_000, 0);
    }

    #[test]
    fn test_serializes_camel_case() {
        let value = serde_json::to_value(sample()).unwrap();
        assert_eq!(value["formattedContent"], "# Alex");
        assert_eq!(value["createdAt"], "2024-01-01T00:00:00Z");
    }
}

//! Import job and row models.

use serde::{Deserialize, Serialize};
use validator::Validate;

use super::entity::EntityType;

/// Maximum rows accepted in one import submission.
pub const MAX_IMPORT_ROWS: usize = 10_000;

/// A raw input row: source column name to raw value, order-independent.
pub type RawRow = std::collections::BTreeMap<String, String>;

/// Status of an import job.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ImportJobStatus {
    Pending,
    Processing,
    Completed,
    Failed,
}

impl ImportJobStatus {
    /// Convert to database string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Processing => "processing",
            Self::Completed => "completed",
            Self::Failed => "failed",
        }
    }
}

impl std::fmt::Display for ImportJobStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Terminal outcome of processing one input row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ImportRowStatus {
    Pending,
    Inserted,
    Updated,
    Skipped,
    Error,
}

impl ImportRowStatus {
    /// Convert to database string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Inserted => "inserted",
            Self::Updated => "updated",
            Self::Skipped => "skipped",
            Self::Error => "error",
        }
    }
}

impl std::fmt::Display for ImportRowStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// How a vendor feed handles a row that matches an existing record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum DuplicateStrategy {
    /// Update the matched record.
    #[default]
    Update,
    /// Leave the matched record alone; row outcome is `skipped`.
    Skip,
    /// Record the row as an error without writing.
    Error,
}

impl DuplicateStrategy {
    /// Convert to database string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Update => "update",
            Self::Skip => "skip",
            Self::Error => "error",
        }
    }
}

/// Request to run a direct bulk import.
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct ImportRequest {
    /// Which canonical entity the rows describe.
    pub entity_type: EntityType,

    /// Descriptor of the source file, kept for the audit trail.
    pub source_file: Option<String>,

    /// Ordered input rows as raw column-name → value objects.
    #[validate(length(min = 1, max = 10000, message = "rows must contain 1-10000 items"))]
    pub rows: Vec<serde_json::Map<String, serde_json::Value>>,

    /// Explicit source-column → canonical-field overrides, merged over the
    /// built-in defaults after header normalization.
    #[serde(default)]
    pub column_overrides: std::collections::BTreeMap<String, String>,
}

/// One row-scoped failure, indexed by source position.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportRowError {
    /// 0-based index of the offending row in the submitted sequence.
    pub row_index: usize,

    /// Error message.
    pub message: String,
}

/// Outcome summary returned to direct-import callers.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportResult {
    pub total: u32,
    pub inserted: u32,
    pub updated: u32,
    pub skipped: u32,
    pub errors: Vec<ImportRowError>,
}

impl ImportResult {
    pub fn errored(&self) -> u32 {
        self.errors.len() as u32
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_job_status_as_str() {
        assert_eq!(ImportJobStatus::Pending.as_str(), "pending");
        assert_eq!(ImportJobStatus::Processing.as_str(), "processing");
        assert_eq!(ImportJobStatus::Completed.as_str(), "completed");
        assert_eq!(ImportJobStatus::Failed.as_str(), "failed");
    }

    #[test]
    fn test_row_status_as_str() {
        assert_eq!(ImportRowStatus::Inserted.as_str(), "inserted");
        assert_eq!(ImportRowStatus::Error.as_str(), "error");
    }

    #[test]
    fn test_duplicate_strategy_default_is_update() {
        assert_eq!(DuplicateStrategy::default(), DuplicateStrategy::Update);
    }

    #[test]
    fn test_import_request_deserialize() {
        let json = json!({
            "entityType": "member",
            "sourceFile": "roster-2024.csv",
            "rows": [
                { "First Name": "Jane", "Last Name": "Doe", "Email Address": "JANE@X.COM" }
            ]
        });

        let request: ImportRequest = serde_json::from_value(json).unwrap();
        assert_eq!(request.entity_type, EntityType::Member);
        assert_eq!(request.rows.len(), 1);
        assert!(request.column_overrides.is_empty());
        assert!(request.validate().is_ok());
    }

    #[test]
    fn test_row_limit_matches_request_validation() {
        assert_eq!(MAX_IMPORT_ROWS, 10_000);
    }

    #[test]
    fn test_import_request_rejects_empty_rows() {
        let json = json!({
            "entityType": "lead",
            "rows": []
        });
        let request: ImportRequest = serde_json::from_value(json).unwrap();
        assert!(request.validate().is_err());
    }

    #[test]
    fn test_import_result_serialize() {
        let result = ImportResult {
            total: 100,
            inserted: 80,
            updated: 15,
            skipped: 0,
            errors: vec![ImportRowError {
                row_index: 52,
                message: "missing required field: last_name".to_string(),
            }],
        };

        let json = serde_json::to_value(&result).unwrap();
        assert_eq!(json["total"], 100);
        assert_eq!(json["errors"][0]["rowIndex"], 52);
        assert_eq!(result.errored(), 1);
    }
}

//! Vendor feed models.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use validator::Validate;

use super::import::DuplicateStrategy;
use super::vendor_change::{ChangeType, Severity};

/// Kind of recurring vendor feed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VendorFileType {
    Enrollment,
    Pricing,
    Roster,
    Termination,
    Change,
    Other,
}

impl VendorFileType {
    /// Convert to database string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Enrollment => "enrollment",
            Self::Pricing => "pricing",
            Self::Roster => "roster",
            Self::Termination => "termination",
            Self::Change => "change",
            Self::Other => "other",
        }
    }
}

impl std::fmt::Display for VendorFileType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Processing status of a vendor file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VendorFileStatus {
    Pending,
    Processing,
    Completed,
    PartiallyCompleted,
    Failed,
}

impl VendorFileStatus {
    /// Convert to database string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Processing => "processing",
            Self::Completed => "completed",
            Self::PartiallyCompleted => "partially_completed",
            Self::Failed => "failed",
        }
    }
}

impl std::fmt::Display for VendorFileStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Request to process one vendor feed instance.
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct VendorFeedRequest {
    pub file_type: VendorFileType,

    /// Source format descriptor ("csv", "json", ...), audit-only.
    #[serde(default = "default_file_format")]
    pub file_format: String,

    /// Descriptor of the source file, kept for the audit trail.
    pub source_file: Option<String>,

    /// What to do with rows that match an existing record when change
    /// detection is off.
    #[serde(default)]
    pub duplicate_strategy: DuplicateStrategy,

    /// When true (the default), differences are staged as change proposals
    /// instead of written to the canonical records.
    #[serde(default = "default_change_detection")]
    pub change_detection: bool,

    /// Severity escalations injected by the caller (state mandates, age
    /// thresholds), keyed by change type. Unlisted types keep their
    /// defaults.
    #[serde(default)]
    pub severity_overrides: HashMap<ChangeType, Severity>,

    /// Ordered input rows as raw column-name → value objects.
    #[validate(length(min = 1, max = 10000, message = "rows must contain 1-10000 items"))]
    pub rows: Vec<serde_json::Map<String, serde_json::Value>>,
}

fn default_file_format() -> String {
    "json".to_string()
}

fn default_change_detection() -> bool {
    true
}

/// Processing summary returned for a vendor feed.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VendorFileSummary {
    pub total_rows: u32,
    pub processed_rows: u32,
    pub valid_rows: u32,
    pub error_rows: u32,
    pub new_records: u32,
    pub updated_records: u32,
}

impl VendorFileSummary {
    pub fn empty(total_rows: u32) -> Self {
        Self {
            total_rows,
            processed_rows: 0,
            valid_rows: 0,
            error_rows: 0,
            new_records: 0,
            updated_records: 0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_file_type_as_str() {
        assert_eq!(VendorFileType::Enrollment.as_str(), "enrollment");
        assert_eq!(VendorFileType::Termination.as_str(), "termination");
        assert_eq!(VendorFileType::Other.as_str(), "other");
    }

    #[test]
    fn test_file_status_as_str() {
        assert_eq!(
            VendorFileStatus::PartiallyCompleted.as_str(),
            "partially_completed"
        );
        assert_eq!(VendorFileStatus::Failed.as_str(), "failed");
    }

    #[test]
    fn test_feed_request_defaults() {
        let json = json!({
            "fileType": "enrollment",
            "rows": [ { "member_number": "M-100" } ]
        });

        let request: VendorFeedRequest = serde_json::from_value(json).unwrap();
        assert_eq!(request.file_format, "json");
        assert_eq!(request.duplicate_strategy, DuplicateStrategy::Update);
        assert!(request.change_detection);
        assert!(request.severity_overrides.is_empty());
        assert!(request.validate().is_ok());
    }

    #[test]
    fn test_feed_request_severity_overrides() {
        let json = json!({
            "fileType": "enrollment",
            "severityOverrides": { "address_change": "critical" },
            "rows": [ { "member_number": "M-100" } ]
        });

        let request: VendorFeedRequest = serde_json::from_value(json).unwrap();
        assert_eq!(
            request.severity_overrides.get(&ChangeType::AddressChange),
            Some(&Severity::Critical)
        );
    }

    #[test]
    fn test_feed_request_explicit_strategy() {
        let json = json!({
            "fileType": "roster",
            "duplicateStrategy": "skip",
            "changeDetection": false,
            "rows": [ { "member_number": "M-100" } ]
        });

        let request: VendorFeedRequest = serde_json::from_value(json).unwrap();
        assert_eq!(request.duplicate_strategy, DuplicateStrategy::Skip);
        assert!(!request.change_detection);
    }

    #[test]
    fn test_summary_empty() {
        let summary = VendorFileSummary::empty(25);
        assert_eq!(summary.total_rows, 25);
        assert_eq!(summary.processed_rows, 0);
        assert_eq!(summary.error_rows, 0);
    }
}

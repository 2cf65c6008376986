//! Vendor change proposal models.

use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

/// Business classification of a detected discrepancy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChangeType {
    NewEnrollment,
    Termination,
    DemographicUpdate,
    PlanChange,
    AddressChange,
    StatusChange,
    DependentAdd,
    DependentRemove,
}

impl ChangeType {
    /// Convert to database string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::NewEnrollment => "new_enrollment",
            Self::Termination => "termination",
            Self::DemographicUpdate => "demographic_update",
            Self::PlanChange => "plan_change",
            Self::AddressChange => "address_change",
            Self::StatusChange => "status_change",
            Self::DependentAdd => "dependent_add",
            Self::DependentRemove => "dependent_remove",
        }
    }

    /// Parse a database string back into a change type.
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "new_enrollment" => Some(Self::NewEnrollment),
            "termination" => Some(Self::Termination),
            "demographic_update" => Some(Self::DemographicUpdate),
            "plan_change" => Some(Self::PlanChange),
            "address_change" => Some(Self::AddressChange),
            "status_change" => Some(Self::StatusChange),
            "dependent_add" => Some(Self::DependentAdd),
            "dependent_remove" => Some(Self::DependentRemove),
            _ => None,
        }
    }
}

impl std::fmt::Display for ChangeType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Review urgency of a change proposal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Low,
    Normal,
    High,
    Critical,
}

impl Severity {
    /// Convert to database string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Normal => "normal",
            Self::High => "high",
            Self::Critical => "critical",
        }
    }
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Lifecycle of a change proposal. Only the review workflow moves a change
/// out of `pending`; `applied` is terminal and immutable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChangeStatus {
    Pending,
    Approved,
    Rejected,
    Ignored,
    Applied,
}

impl ChangeStatus {
    /// Convert to database string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Approved => "approved",
            Self::Rejected => "rejected",
            Self::Ignored => "ignored",
            Self::Applied => "applied",
        }
    }

    /// Parse a database string back into a status.
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "pending" => Some(Self::Pending),
            "approved" => Some(Self::Approved),
            "rejected" => Some(Self::Rejected),
            "ignored" => Some(Self::Ignored),
            "applied" => Some(Self::Applied),
            _ => None,
        }
    }
}

impl std::fmt::Display for ChangeStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Reviewer decision on a pending change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReviewAction {
    Approve,
    Reject,
    Ignore,
}

impl ReviewAction {
    /// Status a pending change transitions to under this action.
    pub fn resulting_status(&self) -> ChangeStatus {
        match self {
            Self::Approve => ChangeStatus::Approved,
            Self::Reject => ChangeStatus::Rejected,
            Self::Ignore => ChangeStatus::Ignored,
        }
    }
}

/// Request to review a single change.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewRequest {
    pub action: ReviewAction,
    /// Reviewer identifier recorded on the change.
    pub reviewer_id: Option<Uuid>,
}

/// Request to review a batch of changes with one action.
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct BulkReviewRequest {
    #[validate(length(min = 1, max = 500, message = "changeIds must contain 1-500 items"))]
    pub change_ids: Vec<Uuid>,
    pub action: ReviewAction,
    pub reviewer_id: Option<Uuid>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_change_type_round_trip() {
        for ct in [
            ChangeType::NewEnrollment,
            ChangeType::Termination,
            ChangeType::DemographicUpdate,
            ChangeType::PlanChange,
            ChangeType::AddressChange,
            ChangeType::StatusChange,
            ChangeType::DependentAdd,
            ChangeType::DependentRemove,
        ] {
            assert_eq!(ChangeType::parse(ct.as_str()), Some(ct));
        }
    }

    #[test]
    fn test_severity_ordering() {
        assert!(Severity::Critical > Severity::High);
        assert!(Severity::High > Severity::Normal);
        assert!(Severity::Normal > Severity::Low);
    }

    #[test]
    fn test_change_status_round_trip() {
        for status in [
            ChangeStatus::Pending,
            ChangeStatus::Approved,
            ChangeStatus::Rejected,
            ChangeStatus::Ignored,
            ChangeStatus::Applied,
        ] {
            assert_eq!(ChangeStatus::parse(status.as_str()), Some(status));
        }
        assert_eq!(ChangeStatus::parse("deleted"), None);
    }

    #[test]
    fn test_review_action_resulting_status() {
        assert_eq!(
            ReviewAction::Approve.resulting_status(),
            ChangeStatus::Approved
        );
        assert_eq!(
            ReviewAction::Reject.resulting_status(),
            ChangeStatus::Rejected
        );
        assert_eq!(
            ReviewAction::Ignore.resulting_status(),
            ChangeStatus::Ignored
        );
    }

    #[test]
    fn test_bulk_review_request_deserialize() {
        let json = json!({
            "changeIds": [Uuid::new_v4(), Uuid::new_v4()],
            "action": "reject"
        });
        let request: BulkReviewRequest = serde_json::from_value(json).unwrap();
        assert_eq!(request.action, ReviewAction::Reject);
        assert_eq!(request.change_ids.len(), 2);
        assert!(request.validate().is_ok());
    }

    #[test]
    fn test_bulk_review_request_rejects_empty() {
        let json = json!({ "changeIds": [], "action": "approve" });
        let request: BulkReviewRequest = serde_json::from_value(json).unwrap();
        assert!(request.validate().is_err());
    }
}

//! Vendor change detection.
//!
//! Compares an incoming, validated vendor row against the current state of
//! the matched canonical record and produces zero or more change proposals.
//! The detector never mutates anything; staged changes are applied only
//! through the review workflow.

use std::collections::{BTreeMap, BTreeSet, HashMap};

use crate::models::field::{names, ValidatedRow};
use crate::models::vendor_change::{ChangeType, Severity};

/// Canonical fields that classify as an address change.
pub const ADDRESS_FIELDS: &[&str] = &[
    names::ADDRESS1,
    names::ADDRESS2,
    names::CITY,
    names::STATE,
    names::ZIP,
];

/// Canonical fields that classify as a plan change.
pub const PLAN_FIELDS: &[&str] = &[names::PLAN_ID, names::PLAN_NAME, names::MONTHLY_PREMIUM];

/// Status values that mark a row as a termination notice.
const TERMINATED_STATUSES: &[&str] = &["terminated"];

/// One detected discrepancy, not yet persisted.
#[derive(Debug, Clone, PartialEq)]
pub struct DetectedChange {
    pub change_type: ChangeType,
    /// Canonical field name; `None` for whole-entity events.
    pub field_changed: Option<String>,
    pub old_value: Option<String>,
    pub new_value: Option<String>,
    pub severity: Severity,
}

/// Severity defaults per change type, with caller-supplied overrides.
///
/// Escalation rules (state mandates, age thresholds) live outside the
/// detector; they inject themselves here as overrides at detection time.
#[derive(Debug, Clone, Default)]
pub struct SeverityPolicy {
    overrides: HashMap<ChangeType, Severity>,
}

impl SeverityPolicy {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fixed default severity for a change type.
    pub fn default_for(change_type: ChangeType) -> Severity {
        match change_type {
            ChangeType::NewEnrollment | ChangeType::Termination | ChangeType::PlanChange => {
                Severity::High
            }
            ChangeType::DemographicUpdate
            | ChangeType::AddressChange
            | ChangeType::StatusChange
            | ChangeType::DependentAdd
            | ChangeType::DependentRemove => Severity::Normal,
        }
    }

    /// Override the severity for one change type.
    pub fn with_override(mut self, change_type: ChangeType, severity: Severity) -> Self {
        self.overrides.insert(change_type, severity);
        self
    }

    /// Effective severity for a change type under this policy.
    pub fn severity_for(&self, change_type: ChangeType) -> Severity {
        self.overrides
            .get(&change_type)
            .copied()
            .unwrap_or_else(|| Self::default_for(change_type))
    }
}

/// Whether a validated row carries a termination signal of its own:
/// a termination date, or a post-validation terminated status.
pub fn is_termination_marker(row: &ValidatedRow) -> bool {
    if row.date(names::TERMINATION_DATE).is_some() {
        return true;
    }
    matches!(row.text(names::STATUS), Some(status) if TERMINATED_STATUSES.contains(&status))
}

/// Detect changes between the current record state and an incoming row.
///
/// `current` is the matched record's tracked fields in canonical string
/// form, or `None` when the row matched nothing. `termination_marker` is
/// the row-level marker, possibly forced by the feed's file type.
pub fn detect_changes(
    current: Option<&BTreeMap<String, String>>,
    incoming: &ValidatedRow,
    policy: &SeverityPolicy,
    termination_marker: bool,
) -> Vec<DetectedChange> {
    match current {
        None => {
            if termination_marker {
                // A termination notice for a record we do not have; there
                // is nothing to stage against.
                return Vec::new();
            }
            vec![DetectedChange {
                change_type: ChangeType::NewEnrollment,
                field_changed: None,
                old_value: None,
                new_value: Some(incoming.to_json().to_string()),
                severity: policy.severity_for(ChangeType::NewEnrollment),
            }]
        }
        Some(current) => {
            let already_terminated = current
                .get(names::STATUS)
                .map(|s| TERMINATED_STATUSES.contains(&s.as_str()))
                .unwrap_or(false);

            if termination_marker && !already_terminated {
                return vec![DetectedChange {
                    change_type: ChangeType::Termination,
                    field_changed: None,
                    old_value: current.get(names::STATUS).cloned(),
                    new_value: Some("terminated".to_string()),
                    severity: policy.severity_for(ChangeType::Termination),
                }];
            }

            diff_fields(current, incoming, policy)
        }
    }
}

fn diff_fields(
    current: &BTreeMap<String, String>,
    incoming: &ValidatedRow,
    policy: &SeverityPolicy,
) -> Vec<DetectedChange> {
    let mut changes = Vec::new();

    for (field, value) in incoming.iter() {
        if field == names::DEPENDENTS {
            continue;
        }
        let new_value = value.to_canonical_string();
        let old_value = current
            .get(field.as_str())
            .filter(|v| !v.is_empty())
            .cloned();

        if old_value.as_deref() != Some(new_value.as_str()) {
            let change_type = classify_field(field);
            changes.push(DetectedChange {
                change_type,
                field_changed: Some(field.clone()),
                old_value,
                new_value: Some(new_value),
                severity: policy.severity_for(change_type),
            });
        }
    }

    if let Some(incoming_deps) = incoming.text(names::DEPENDENTS) {
        let current_deps = current.get(names::DEPENDENTS).map(String::as_str);
        changes.extend(diff_dependents(current_deps, incoming_deps, policy));
    }

    changes
}

/// Change type for a differing field.
pub fn classify_field(field: &str) -> ChangeType {
    if ADDRESS_FIELDS.contains(&field) {
        ChangeType::AddressChange
    } else if PLAN_FIELDS.contains(&field) {
        ChangeType::PlanChange
    } else if field == names::STATUS {
        ChangeType::StatusChange
    } else {
        ChangeType::DemographicUpdate
    }
}

fn dependent_set(raw: &str) -> BTreeSet<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(String::from)
        .collect()
}

fn diff_dependents(
    current: Option<&str>,
    incoming: &str,
    policy: &SeverityPolicy,
) -> Vec<DetectedChange> {
    let old_set = current.map(dependent_set).unwrap_or_default();
    let new_set = dependent_set(incoming);
    let mut changes = Vec::new();

    for added in new_set.difference(&old_set) {
        changes.push(DetectedChange {
            change_type: ChangeType::DependentAdd,
            field_changed: Some(names::DEPENDENTS.to_string()),
            old_value: None,
            new_value: Some(added.clone()),
            severity: policy.severity_for(ChangeType::DependentAdd),
        });
    }
    for removed in old_set.difference(&new_set) {
        changes.push(DetectedChange {
            change_type: ChangeType::DependentRemove,
            field_changed: Some(names::DEPENDENTS.to_string()),
            old_value: Some(removed.clone()),
            new_value: None,
            severity: policy.severity_for(ChangeType::DependentRemove),
        });
    }

    changes
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::field::FieldValue;
    use chrono::NaiveDate;

    fn current(pairs: &[(&str, &str)]) -> BTreeMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    fn text_row(pairs: &[(&str, &str)]) -> ValidatedRow {
        let mut row = ValidatedRow::new();
        for (k, v) in pairs {
            row.insert(*k, FieldValue::Text(v.to_string()));
        }
        row
    }

    #[test]
    fn test_no_match_yields_new_enrollment() {
        let mut row = text_row(&[(names::FIRST_NAME, "Jane"), (names::LAST_NAME, "Doe")]);
        row.insert(names::STATUS, FieldValue::Choice("active".to_string()));

        let changes = detect_changes(None, &row, &SeverityPolicy::new(), false);
        assert_eq!(changes.len(), 1);
        let change = &changes[0];
        assert_eq!(change.change_type, ChangeType::NewEnrollment);
        assert_eq!(change.field_changed, None);
        assert_eq!(change.severity, Severity::High);
        // The mapped row travels in the proposal so approval can create it.
        assert!(change.new_value.as_ref().unwrap().contains("Jane"));
    }

    #[test]
    fn test_no_match_with_termination_marker_yields_nothing() {
        let mut row = text_row(&[(names::FIRST_NAME, "Gone")]);
        row.insert(
            names::TERMINATION_DATE,
            FieldValue::Date(NaiveDate::from_ymd_opt(2024, 9, 30).unwrap()),
        );

        let changes = detect_changes(None, &row, &SeverityPolicy::new(), true);
        assert!(changes.is_empty());
    }

    #[test]
    fn test_termination_marker_yields_single_high_change() {
        let existing = current(&[(names::STATUS, "active"), (names::CITY, "Austin")]);
        // Even with other differing fields, termination short-circuits.
        let mut row = text_row(&[(names::CITY, "Dallas")]);
        row.insert(
            names::TERMINATION_DATE,
            FieldValue::Date(NaiveDate::from_ymd_opt(2024, 9, 30).unwrap()),
        );

        assert!(is_termination_marker(&row));
        let changes = detect_changes(Some(&existing), &row, &SeverityPolicy::new(), true);
        assert_eq!(changes.len(), 1);
        assert_eq!(changes[0].change_type, ChangeType::Termination);
        assert_eq!(changes[0].field_changed, None);
        assert_eq!(changes[0].old_value.as_deref(), Some("active"));
        assert_eq!(changes[0].new_value.as_deref(), Some("terminated"));
        assert_eq!(changes[0].severity, Severity::High);
    }

    #[test]
    fn test_already_terminated_does_not_re_terminate() {
        let existing = current(&[(names::STATUS, "terminated")]);
        let mut row = ValidatedRow::new();
        row.insert(names::STATUS, FieldValue::Choice("terminated".to_string()));

        let changes = detect_changes(Some(&existing), &row, &SeverityPolicy::new(), true);
        assert!(changes.is_empty());
    }

    #[test]
    fn test_field_diff_classification() {
        let existing = current(&[
            (names::CITY, "Austin"),
            (names::PLAN_NAME, "Silver"),
            (names::STATUS, "active"),
            (names::FIRST_NAME, "Jane"),
        ]);
        let mut row = text_row(&[
            (names::CITY, "Dallas"),
            (names::PLAN_NAME, "Gold"),
            (names::FIRST_NAME, "Janet"),
        ]);
        row.insert(names::STATUS, FieldValue::Choice("inactive".to_string()));

        let changes = detect_changes(Some(&existing), &row, &SeverityPolicy::new(), false);
        assert_eq!(changes.len(), 4);

        let by_field = |name: &str| {
            changes
                .iter()
                .find(|c| c.field_changed.as_deref() == Some(name))
                .unwrap()
        };
        assert_eq!(by_field(names::CITY).change_type, ChangeType::AddressChange);
        assert_eq!(by_field(names::PLAN_NAME).change_type, ChangeType::PlanChange);
        assert_eq!(by_field(names::STATUS).change_type, ChangeType::StatusChange);
        assert_eq!(
            by_field(names::FIRST_NAME).change_type,
            ChangeType::DemographicUpdate
        );
        assert_eq!(by_field(names::PLAN_NAME).severity, Severity::High);
        assert_eq!(by_field(names::CITY).severity, Severity::Normal);
    }

    #[test]
    fn test_equal_fields_yield_no_changes() {
        let existing = current(&[(names::CITY, "Austin"), (names::FIRST_NAME, "Jane")]);
        let row = text_row(&[(names::CITY, "Austin"), (names::FIRST_NAME, "Jane")]);

        let changes = detect_changes(Some(&existing), &row, &SeverityPolicy::new(), false);
        assert!(changes.is_empty());
    }

    #[test]
    fn test_detection_symmetry_after_applying_changes() {
        let existing = current(&[(names::CITY, "Austin"), (names::PLAN_NAME, "Silver")]);
        let row = text_row(&[(names::CITY, "Dallas"), (names::PLAN_NAME, "Gold")]);

        let policy = SeverityPolicy::new();
        let changes = detect_changes(Some(&existing), &row, &policy, false);
        assert_eq!(changes.len(), 2);

        // Apply the proposals to the current state, then diff again.
        let mut applied = existing.clone();
        for change in &changes {
            applied.insert(
                change.field_changed.clone().unwrap(),
                change.new_value.clone().unwrap(),
            );
        }
        let second = detect_changes(Some(&applied), &row, &policy, false);
        assert!(second.is_empty());
    }

    #[test]
    fn test_dependent_add_and_remove() {
        let existing = current(&[(names::DEPENDENTS, "Amy Doe, Ben Doe")]);
        let row = text_row(&[(names::DEPENDENTS, "Amy Doe, Cal Doe")]);

        let changes = detect_changes(Some(&existing), &row, &SeverityPolicy::new(), false);
        assert_eq!(changes.len(), 2);

        let added = changes
            .iter()
            .find(|c| c.change_type == ChangeType::DependentAdd)
            .unwrap();
        assert_eq!(added.new_value.as_deref(), Some("Cal Doe"));

        let removed = changes
            .iter()
            .find(|c| c.change_type == ChangeType::DependentRemove)
            .unwrap();
        assert_eq!(removed.old_value.as_deref(), Some("Ben Doe"));
    }

    #[test]
    fn test_severity_override() {
        let policy =
            SeverityPolicy::new().with_override(ChangeType::AddressChange, Severity::Critical);
        let existing = current(&[(names::CITY, "Austin")]);
        let row = text_row(&[(names::CITY, "Dallas")]);

        let changes = detect_changes(Some(&existing), &row, &policy, false);
        assert_eq!(changes[0].severity, Severity::Critical);
        // Types without an override keep their defaults.
        assert_eq!(policy.severity_for(ChangeType::Termination), Severity::High);
    }

    #[test]
    fn test_termination_marker_from_status() {
        let mut row = ValidatedRow::new();
        row.insert(names::STATUS, FieldValue::Choice("terminated".to_string()));
        assert!(is_termination_marker(&row));

        let mut active = ValidatedRow::new();
        active.insert(names::STATUS, FieldValue::Choice("active".to_string()));
        assert!(!is_termination_marker(&active));
    }
}

//! Canonical field schemas and typed field values.
//!
//! Every entity type has a fixed set of canonical fields. The import
//! pipeline maps raw vendor columns onto these names, and the validator
//! coerces raw strings into the closed [`FieldValue`] set so downstream
//! stages pattern-match instead of re-parsing strings.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::entity::EntityType;

/// Canonical field names shared across the pipeline.
///
/// These MUST match the column names in the canonical entity tables; the
/// mapper, validator, dedup resolver and change detector all key on them.
pub mod names {
    pub const MEMBER_NUMBER: &str = "member_number";
    pub const FIRST_NAME: &str = "first_name";
    pub const LAST_NAME: &str = "last_name";
    pub const EMAIL: &str = "email";
    pub const PHONE: &str = "phone";
    pub const DATE_OF_BIRTH: &str = "date_of_birth";
    pub const ADDRESS1: &str = "address1";
    pub const ADDRESS2: &str = "address2";
    pub const CITY: &str = "city";
    pub const STATE: &str = "state";
    pub const ZIP: &str = "zip";
    pub const PLAN_ID: &str = "plan_id";
    pub const PLAN_NAME: &str = "plan_name";
    pub const MONTHLY_PREMIUM: &str = "monthly_premium";
    pub const STATUS: &str = "status";
    pub const ENROLLMENT_DATE: &str = "enrollment_date";
    pub const TERMINATION_DATE: &str = "termination_date";
    pub const DEPENDENTS: &str = "dependents";
    pub const ADVISOR_CODE: &str = "advisor_code";
    pub const NATIONAL_PRODUCER_NUMBER: &str = "national_producer_number";
    pub const SOURCE: &str = "source";
}

/// Semantic type of a canonical field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    /// Free text.
    Text,
    /// One of a fixed set of values; unknown values fall back to a default.
    Choice,
    /// Calendar date, normalized to ISO.
    Date,
    /// Decimal number; unparsable values become null, not errors.
    Number,
}

/// Schema descriptor for one canonical field.
#[derive(Debug, Clone, Copy)]
pub struct TargetField {
    pub name: &'static str,
    pub kind: FieldKind,
    pub required: bool,
    /// Allowed values for `Choice` fields; empty otherwise.
    pub allowed: &'static [&'static str],
}

impl TargetField {
    const fn text(name: &'static str) -> Self {
        Self {
            name,
            kind: FieldKind::Text,
            required: false,
            allowed: &[],
        }
    }

    const fn required_text(name: &'static str) -> Self {
        Self {
            name,
            kind: FieldKind::Text,
            required: true,
            allowed: &[],
        }
    }

    const fn date(name: &'static str) -> Self {
        Self {
            name,
            kind: FieldKind::Date,
            required: false,
            allowed: &[],
        }
    }

    const fn number(name: &'static str) -> Self {
        Self {
            name,
            kind: FieldKind::Number,
            required: false,
            allowed: &[],
        }
    }

    const fn choice(name: &'static str, allowed: &'static [&'static str]) -> Self {
        Self {
            name,
            kind: FieldKind::Choice,
            required: false,
            allowed,
        }
    }
}

/// Member status values accepted as-is; anything else becomes the default.
pub const MEMBER_STATUSES: &[&str] = &["active", "pending", "inactive", "terminated"];
pub const ADVISOR_STATUSES: &[&str] = &["active", "pending", "inactive"];
pub const LEAD_STATUSES: &[&str] = &["new", "pending", "contacted", "converted", "closed"];

const MEMBER_FIELDS: &[TargetField] = &[
    TargetField::text(names::MEMBER_NUMBER),
    TargetField::required_text(names::FIRST_NAME),
    TargetField::required_text(names::LAST_NAME),
    TargetField::text(names::EMAIL),
    TargetField::text(names::PHONE),
    TargetField::date(names::DATE_OF_BIRTH),
    TargetField::text(names::ADDRESS1),
    TargetField::text(names::ADDRESS2),
    TargetField::text(names::CITY),
    TargetField::text(names::STATE),
    TargetField::text(names::ZIP),
    TargetField::text(names::PLAN_ID),
    TargetField::text(names::PLAN_NAME),
    TargetField::number(names::MONTHLY_PREMIUM),
    TargetField::choice(names::STATUS, MEMBER_STATUSES),
    TargetField::date(names::ENROLLMENT_DATE),
    TargetField::date(names::TERMINATION_DATE),
    TargetField::text(names::DEPENDENTS),
];

const ADVISOR_FIELDS: &[TargetField] = &[
    TargetField::text(names::ADVISOR_CODE),
    TargetField::text(names::NATIONAL_PRODUCER_NUMBER),
    TargetField::required_text(names::FIRST_NAME),
    TargetField::required_text(names::LAST_NAME),
    TargetField::required_text(names::EMAIL),
    TargetField::text(names::PHONE),
    TargetField::choice(names::STATUS, ADVISOR_STATUSES),
];

const LEAD_FIELDS: &[TargetField] = &[
    TargetField::text(names::FIRST_NAME),
    TargetField::text(names::LAST_NAME),
    TargetField::required_text(names::EMAIL),
    TargetField::text(names::PHONE),
    TargetField::text(names::SOURCE),
    TargetField::choice(names::STATUS, LEAD_STATUSES),
];

/// Target-field schema for an entity type.
pub fn fields_for(entity: EntityType) -> &'static [TargetField] {
    match entity {
        EntityType::Member => MEMBER_FIELDS,
        EntityType::Advisor => ADVISOR_FIELDS,
        EntityType::Lead => LEAD_FIELDS,
    }
}

/// Fallback status when an imported status value is not recognized.
///
/// Explicit policy table: rejecting a row over a status synonym loses more
/// value than tolerating it, so unknown statuses map to these defaults.
pub fn default_status_for(entity: EntityType) -> &'static str {
    match entity {
        EntityType::Member => "pending",
        EntityType::Advisor => "pending",
        EntityType::Lead => "new",
    }
}

/// A typed, validated field value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum FieldValue {
    Text(String),
    Choice(String),
    Date(NaiveDate),
    Number(f64),
}

impl FieldValue {
    /// Canonical string form, used for audit records and change diffs.
    ///
    /// Dates render as ISO; numbers drop a trailing `.0` so `42.0` and an
    /// incoming `"42"` compare equal.
    pub fn to_canonical_string(&self) -> String {
        match self {
            Self::Text(v) | Self::Choice(v) => v.clone(),
            Self::Date(d) => d.format("%Y-%m-%d").to_string(),
            Self::Number(n) => {
                if n.fract() == 0.0 && n.abs() < 1e15 {
                    format!("{}", *n as i64)
                } else {
                    format!("{}", n)
                }
            }
        }
    }
}

/// A validated row: canonical field name to typed value.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ValidatedRow {
    fields: BTreeMap<String, FieldValue>,
}

impl ValidatedRow {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, name: impl Into<String>, value: FieldValue) {
        self.fields.insert(name.into(), value);
    }

    pub fn get(&self, name: &str) -> Option<&FieldValue> {
        self.fields.get(name)
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &FieldValue)> {
        self.fields.iter()
    }

    /// Text or choice value for a field, if present.
    pub fn text(&self, name: &str) -> Option<&str> {
        match self.fields.get(name) {
            Some(FieldValue::Text(v)) | Some(FieldValue::Choice(v)) => Some(v.as_str()),
            _ => None,
        }
    }

    pub fn date(&self, name: &str) -> Option<NaiveDate> {
        match self.fields.get(name) {
            Some(FieldValue::Date(d)) => Some(*d),
            _ => None,
        }
    }

    pub fn number(&self, name: &str) -> Option<f64> {
        match self.fields.get(name) {
            Some(FieldValue::Number(n)) => Some(*n),
            _ => None,
        }
    }

    /// Canonical string form of every field, for diffs and audit records.
    pub fn to_string_map(&self) -> BTreeMap<String, String> {
        self.fields
            .iter()
            .map(|(k, v)| (k.clone(), v.to_canonical_string()))
            .collect()
    }

    /// JSON object of canonical string values.
    pub fn to_json(&self) -> serde_json::Value {
        serde_json::Value::Object(
            self.fields
                .iter()
                .map(|(k, v)| (k.clone(), serde_json::Value::String(v.to_canonical_string())))
                .collect(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_member_schema_has_required_name_fields() {
        let required: Vec<&str> = fields_for(EntityType::Member)
            .iter()
            .filter(|f| f.required)
            .map(|f| f.name)
            .collect();
        assert_eq!(required, vec![names::FIRST_NAME, names::LAST_NAME]);
    }

    #[test]
    fn test_advisor_schema_requires_email() {
        let email = fields_for(EntityType::Advisor)
            .iter()
            .find(|f| f.name == names::EMAIL)
            .unwrap();
        assert!(email.required);
    }

    #[test]
    fn test_lead_schema_requires_email_only() {
        let required: Vec<&str> = fields_for(EntityType::Lead)
            .iter()
            .filter(|f| f.required)
            .map(|f| f.name)
            .collect();
        assert_eq!(required, vec![names::EMAIL]);
    }

    #[test]
    fn test_default_statuses() {
        assert_eq!(default_status_for(EntityType::Member), "pending");
        assert_eq!(default_status_for(EntityType::Advisor), "pending");
        assert_eq!(default_status_for(EntityType::Lead), "new");
    }

    #[test]
    fn test_status_choice_allowed_values() {
        let status = fields_for(EntityType::Member)
            .iter()
            .find(|f| f.name == names::STATUS)
            .unwrap();
        assert_eq!(status.kind, FieldKind::Choice);
        assert!(status.allowed.contains(&"terminated"));
    }

    #[test]
    fn test_field_value_canonical_strings() {
        assert_eq!(
            FieldValue::Text("Jane".to_string()).to_canonical_string(),
            "Jane"
        );
        assert_eq!(
            FieldValue::Date(NaiveDate::from_ymd_opt(2024, 3, 5).unwrap()).to_canonical_string(),
            "2024-03-05"
        );
        assert_eq!(FieldValue::Number(42.0).to_canonical_string(), "42");
        assert_eq!(FieldValue::Number(42.5).to_canonical_string(), "42.5");
    }

    #[test]
    fn test_validated_row_accessors() {
        let mut row = ValidatedRow::new();
        row.insert(names::EMAIL, FieldValue::Text("a@b.com".to_string()));
        row.insert(names::STATUS, FieldValue::Choice("active".to_string()));
        row.insert(
            names::DATE_OF_BIRTH,
            FieldValue::Date(NaiveDate::from_ymd_opt(1990, 1, 2).unwrap()),
        );
        row.insert(names::MONTHLY_PREMIUM, FieldValue::Number(19.99));

        assert_eq!(row.text(names::EMAIL), Some("a@b.com"));
        assert_eq!(row.text(names::STATUS), Some("active"));
        assert_eq!(
            row.date(names::DATE_OF_BIRTH),
            NaiveDate::from_ymd_opt(1990, 1, 2)
        );
        assert_eq!(row.number(names::MONTHLY_PREMIUM), Some(19.99));
        assert_eq!(row.text("missing"), None);
    }

    #[test]
    fn test_validated_row_to_string_map() {
        let mut row = ValidatedRow::new();
        row.insert(
            names::ENROLLMENT_DATE,
            FieldValue::Date(NaiveDate::from_ymd_opt(2024, 7, 1).unwrap()),
        );
        let map = row.to_string_map();
        assert_eq!(map.get(names::ENROLLMENT_DATE).unwrap(), "2024-07-01");
    }
}

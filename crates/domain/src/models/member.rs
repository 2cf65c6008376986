//! Validated member record built from a mapped row.

use chrono::NaiveDate;

use super::field::{names, ValidatedRow};

/// Typed member fields extracted from a validated row.
///
/// Every field is optional: a row carries only the columns the source file
/// had, and updates touch only the fields present.
#[derive(Debug, Clone, Default)]
pub struct MemberRecord {
    pub member_number: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub date_of_birth: Option<NaiveDate>,
    pub address1: Option<String>,
    pub address2: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub zip: Option<String>,
    pub plan_id: Option<String>,
    pub plan_name: Option<String>,
    pub monthly_premium: Option<f64>,
    pub status: Option<String>,
    pub enrollment_date: Option<NaiveDate>,
    pub termination_date: Option<NaiveDate>,
    pub dependents: Option<String>,
}

impl MemberRecord {
    /// Extract member fields from a validated row.
    pub fn from_validated(row: &ValidatedRow) -> Self {
        Self {
            member_number: row.text(names::MEMBER_NUMBER).map(String::from),
            first_name: row.text(names::FIRST_NAME).map(String::from),
            last_name: row.text(names::LAST_NAME).map(String::from),
            email: row.text(names::EMAIL).map(String::from),
            phone: row.text(names::PHONE).map(String::from),
            date_of_birth: row.date(names::DATE_OF_BIRTH),
            address1: row.text(names::ADDRESS1).map(String::from),
            address2: row.text(names::ADDRESS2).map(String::from),
            city: row.text(names::CITY).map(String::from),
            state: row.text(names::STATE).map(String::from),
            zip: row.text(names::ZIP).map(String::from),
            plan_id: row.text(names::PLAN_ID).map(String::from),
            plan_name: row.text(names::PLAN_NAME).map(String::from),
            monthly_premium: row.number(names::MONTHLY_PREMIUM),
            status: row.text(names::STATUS).map(String::from),
            enrollment_date: row.date(names::ENROLLMENT_DATE),
            termination_date: row.date(names::TERMINATION_DATE),
            dependents: row.text(names::DEPENDENTS).map(String::from),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::field::FieldValue;

    #[test]
    fn test_from_validated_picks_known_fields() {
        let mut row = ValidatedRow::new();
        row.insert(names::FIRST_NAME, FieldValue::Text("Jane".to_string()));
        row.insert(names::LAST_NAME, FieldValue::Text("Doe".to_string()));
        row.insert(names::EMAIL, FieldValue::Text("jane@x.com".to_string()));
        row.insert(names::STATUS, FieldValue::Choice("active".to_string()));
        row.insert(
            names::DATE_OF_BIRTH,
            FieldValue::Date(NaiveDate::from_ymd_opt(1985, 6, 1).unwrap()),
        );
        row.insert(names::MONTHLY_PREMIUM, FieldValue::Number(120.50));

        let record = MemberRecord::from_validated(&row);
        assert_eq!(record.first_name.as_deref(), Some("Jane"));
        assert_eq!(record.email.as_deref(), Some("jane@x.com"));
        assert_eq!(record.status.as_deref(), Some("active"));
        assert_eq!(record.date_of_birth, NaiveDate::from_ymd_opt(1985, 6, 1));
        assert_eq!(record.monthly_premium, Some(120.50));
        assert!(record.member_number.is_none());
        assert!(record.termination_date.is_none());
    }
}

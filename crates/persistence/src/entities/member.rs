//! Member entity.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use std::collections::BTreeMap;
use uuid::Uuid;

/// A canonical member record.
///
/// Serializable so a pre-update copy can be captured into a job snapshot
/// and restored field-by-field on rollback.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct MemberEntity {
    pub id: Uuid,
    pub organization_id: Uuid,
    pub member_number: Option<String>,
    pub first_name: String,
    pub last_name: String,
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
    pub status: String,
    pub enrollment_date: Option<NaiveDate>,
    pub termination_date: Option<NaiveDate>,
    pub dependents: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl MemberEntity {
    /// Tracked fields in canonical string form, for vendor-row diffing.
    ///
    /// Uses the same formatting the validator produces (ISO dates, plain
    /// decimals) so equal values compare equal. Empty fields are omitted.
    pub fn comparable_fields(&self) -> BTreeMap<String, String> {
        let mut fields = BTreeMap::new();
        let mut put = |name: &str, value: Option<String>| {
            if let Some(v) = value {
                if !v.is_empty() {
                    fields.insert(name.to_string(), v);
                }
            }
        };

        put("member_number", self.member_number.clone());
        put("first_name", Some(self.first_name.clone()));
        put("last_name", Some(self.last_name.clone()));
        put("email", self.email.clone());
        put("phone", self.phone.clone());
        put(
            "date_of_birth",
            self.date_of_birth.map(|d| d.format("%Y-%m-%d").to_string()),
        );
        put("address1", self.address1.clone());
        put("address2", self.address2.clone());
        put("city", self.city.clone());
        put("state", self.state.clone());
        put("zip", self.zip.clone());
        put("plan_id", self.plan_id.clone());
        put("plan_name", self.plan_name.clone());
        put("monthly_premium", self.monthly_premium.map(format_number));
        put("status", Some(self.status.clone()));
        put(
            "enrollment_date",
            self.enrollment_date.map(|d| d.format("%Y-%m-%d").to_string()),
        );
        put(
            "termination_date",
            self.termination_date
                .map(|d| d.format("%Y-%m-%d").to_string()),
        );
        put("dependents", self.dependents.clone());

        fields
    }
}

fn format_number(n: f64) -> String {
    if n.fract() == 0.0 && n.abs() < 1e15 {
        format!("{}", n as i64)
    } else {
        format!("{}", n)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> MemberEntity {
        MemberEntity {
            id: Uuid::new_v4(),
            organization_id: Uuid::new_v4(),
            member_number: Some("M-100".to_string()),
            first_name: "Jane".to_string(),
            last_name: "Doe".to_string(),
            email: Some("jane@x.com".to_string()),
            phone: None,
            date_of_birth: NaiveDate::from_ymd_opt(1985, 3, 15),
            address1: Some("1 Main St".to_string()),
            address2: None,
            city: Some("Austin".to_string()),
            state: Some("TX".to_string()),
            zip: Some("78701".to_string()),
            plan_id: None,
            plan_name: Some("Gold".to_string()),
            monthly_premium: Some(129.95),
            status: "active".to_string(),
            enrollment_date: NaiveDate::from_ymd_opt(2024, 1, 1),
            termination_date: None,
            dependents: Some("Amy Doe".to_string()),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_comparable_fields_formats_dates_iso() {
        let fields = sample().comparable_fields();
        assert_eq!(fields.get("date_of_birth").unwrap(), "1985-03-15");
        assert_eq!(fields.get("enrollment_date").unwrap(), "2024-01-01");
    }

    #[test]
    fn test_comparable_fields_omits_empty() {
        let fields = sample().comparable_fields();
        assert!(!fields.contains_key("phone"));
        assert!(!fields.contains_key("termination_date"));
        assert!(!fields.contains_key("address2"));
    }

    #[test]
    fn test_comparable_fields_number_format_matches_validator() {
        let mut entity = sample();
        entity.monthly_premium = Some(130.0);
        let fields = entity.comparable_fields();
        assert_eq!(fields.get("monthly_premium").unwrap(), "130");
    }

    #[test]
    fn test_snapshot_round_trip() {
        let entity = sample();
        let json = serde_json::to_value(&entity).unwrap();
        let restored: MemberEntity = serde_json::from_value(json).unwrap();
        assert_eq!(restored.id, entity.id);
        assert_eq!(restored.member_number, entity.member_number);
        assert_eq!(restored.monthly_premium, entity.monthly_premium);
        assert_eq!(restored.date_of_birth, entity.date_of_birth);
    }
}

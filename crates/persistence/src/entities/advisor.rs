//! Advisor entity.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use std::collections::BTreeMap;
use uuid::Uuid;

/// A canonical advisor record.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct AdvisorEntity {
    pub id: Uuid,
    pub organization_id: Uuid,
    pub advisor_code: Option<String>,
    pub national_producer_number: Option<String>,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: Option<String>,
    pub status: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl AdvisorEntity {
    /// Tracked fields in canonical string form.
    pub fn comparable_fields(&self) -> BTreeMap<String, String> {
        let mut fields = BTreeMap::new();
        let mut put = |name: &str, value: Option<String>| {
            if let Some(v) = value {
                if !v.is_empty() {
                    fields.insert(name.to_string(), v);
                }
            }
        };

        put("advisor_code", self.advisor_code.clone());
        put(
            "national_producer_number",
            self.national_producer_number.clone(),
        );
        put("first_name", Some(self.first_name.clone()));
        put("last_name", Some(self.last_name.clone()));
        put("email", Some(self.email.clone()));
        put("phone", self.phone.clone());
        put("status", Some(self.status.clone()));

        fields
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fake::faker::internet::en::SafeEmail;
    use fake::Fake;

    #[test]
    fn test_comparable_fields() {
        let entity = AdvisorEntity {
            id: Uuid::new_v4(),
            organization_id: Uuid::new_v4(),
            advisor_code: Some("ADV-9".to_string()),
            national_producer_number: None,
            first_name: "Ann".to_string(),
            last_name: "Lee".to_string(),
            email: SafeEmail().fake(),
            phone: None,
            status: "active".to_string(),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };
        let fields = entity.comparable_fields();
        assert_eq!(fields.get("advisor_code").unwrap(), "ADV-9");
        assert_eq!(fields.get("email").unwrap(), &entity.email);
        assert!(!fields.contains_key("national_producer_number"));
        assert!(!fields.contains_key("phone"));
    }
}

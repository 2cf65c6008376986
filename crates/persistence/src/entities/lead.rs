//! Lead entity.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// A canonical lead record.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct LeadEntity {
    pub id: Uuid,
    pub organization_id: Uuid,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: String,
    pub phone: Option<String>,
    pub source: Option<String>,
    pub status: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_snapshot_round_trip() {
        let entity = LeadEntity {
            id: Uuid::new_v4(),
            organization_id: Uuid::new_v4(),
            first_name: None,
            last_name: Some("Doe".to_string()),
            email: "lead@x.com".to_string(),
            phone: Some("5551234567".to_string()),
            source: Some("webinar".to_string()),
            status: "new".to_string(),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };
        let json = serde_json::to_value(&entity).unwrap();
        let restored: LeadEntity = serde_json::from_value(json).unwrap();
        assert_eq!(restored.email, entity.email);
        assert_eq!(restored.first_name, None);
    }
}

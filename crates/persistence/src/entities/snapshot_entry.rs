//! Job snapshot entry entity.

use chrono::{DateTime, Utc};
use sqlx::FromRow;
use uuid::Uuid;

/// One reversible effect of an import job.
///
/// `operation` is `inserted` (rollback deletes the entity) or `updated`
/// (rollback restores `previous_values`). `restored_at` makes rollback
/// idempotent: entries are only ever reversed once.
#[derive(Debug, Clone, FromRow)]
pub struct SnapshotEntryEntity {
    pub id: i64,
    pub job_id: Uuid,
    pub entity_type: String,
    pub entity_id: Uuid,
    pub operation: String,
    pub previous_values: Option<serde_json::Value>,
    pub created_at: DateTime<Utc>,
    pub restored_at: Option<DateTime<Utc>>,
}

//! Import job entity.

use chrono::{DateTime, Utc};
use sqlx::FromRow;
use uuid::Uuid;

/// One batch import operation and its aggregated row counts.
#[derive(Debug, Clone, FromRow)]
pub struct ImportJobEntity {
    pub id: Uuid,
    pub organization_id: Uuid,
    pub entity_type: String,
    pub source_file: Option<String>,
    pub status: String,
    pub total_rows: i32,
    pub inserted_rows: i32,
    pub updated_rows: i32,
    pub skipped_rows: i32,
    pub errored_rows: i32,
    pub error_message: Option<String>,
    pub created_at: DateTime<Utc>,
    pub completed_at: Option<DateTime<Utc>>,
    pub rolled_back_at: Option<DateTime<Utc>>,
}

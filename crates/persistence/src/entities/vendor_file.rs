//! Vendor file entity.

use chrono::{DateTime, Utc};
use sqlx::FromRow;
use uuid::Uuid;

/// One processed vendor feed instance.
#[derive(Debug, Clone, FromRow)]
pub struct VendorFileEntity {
    pub id: Uuid,
    pub organization_id: Uuid,
    pub vendor_id: Uuid,
    pub file_type: String,
    pub file_format: String,
    pub source_file: Option<String>,
    pub duplicate_strategy: String,
    pub change_detection: bool,
    pub status: String,
    pub total_rows: i32,
    pub processed_rows: i32,
    pub valid_rows: i32,
    pub error_rows: i32,
    pub new_records: i32,
    pub updated_records: i32,
    pub created_at: DateTime<Utc>,
    pub completed_at: Option<DateTime<Utc>>,
}

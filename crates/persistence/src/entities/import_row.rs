//! Import row audit entity.

use chrono::{DateTime, Utc};
use sqlx::FromRow;
use uuid::Uuid;

/// The recorded outcome of one input row.
///
/// Append-only: rows are written once when processed and never mutated or
/// deleted afterwards. `row_index` is the position in the source file, not
/// the completion order.
#[derive(Debug, Clone, FromRow)]
pub struct ImportRowEntity {
    pub id: i64,
    pub job_id: Uuid,
    pub row_index: i32,
    pub raw: serde_json::Value,
    pub mapped: serde_json::Value,
    pub status: String,
    pub error_message: Option<String>,
    pub entity_id: Option<Uuid>,
    pub processed_at: DateTime<Utc>,
}

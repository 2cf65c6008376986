//! Vendor change proposal entity.

use chrono::{DateTime, Utc};
use sqlx::FromRow;
use uuid::Uuid;

/// One staged discrepancy between a vendor row and the canonical record.
///
/// Created `pending` by the change detector; only the review workflow moves
/// it, and once `applied` it is immutable.
#[derive(Debug, Clone, FromRow)]
pub struct VendorChangeEntity {
    pub id: Uuid,
    pub organization_id: Uuid,
    pub vendor_id: Uuid,
    pub vendor_file_id: Uuid,
    pub change_type: String,
    pub entity_type: String,
    pub entity_id: Option<Uuid>,
    pub field_changed: Option<String>,
    pub old_value: Option<String>,
    pub new_value: Option<String>,
    pub severity: String,
    pub status: String,
    pub detected_at: DateTime<Utc>,
    pub reviewed_by: Option<Uuid>,
    pub reviewed_at: Option<DateTime<Utc>>,
}

//! Vendor entity.

use chrono::{DateTime, Utc};
use sqlx::FromRow;
use uuid::Uuid;

/// A data vendor whose recurring feeds are reconciled for an organization.
#[derive(Debug, Clone, FromRow)]
pub struct VendorEntity {
    pub id: Uuid,
    pub organization_id: Uuid,
    pub name: String,
    pub code: String,
    pub created_at: DateTime<Utc>,
}

//! Vendor change repository.
//!
//! Changes are created `pending` and move only through guarded status
//! transitions: every UPDATE carries the expected current status in its
//! WHERE clause, so a lost race shows up as zero affected rows instead of
//! a double transition.

use sqlx::PgPool;
use uuid::Uuid;

use crate::entities::VendorChangeEntity;
use crate::metrics::QueryTimer;

const CHANGE_COLUMNS: &str = r#"
    id, organization_id, vendor_id, vendor_file_id, change_type, entity_type,
    entity_id, field_changed, old_value, new_value, severity, status,
    detected_at, reviewed_by, reviewed_at
"#;

/// A change proposal to stage.
#[derive(Debug, Clone)]
pub struct NewVendorChange {
    pub organization_id: Uuid,
    pub vendor_id: Uuid,
    pub vendor_file_id: Uuid,
    pub change_type: &'static str,
    pub entity_type: &'static str,
    pub entity_id: Option<Uuid>,
    pub field_changed: Option<String>,
    pub old_value: Option<String>,
    pub new_value: Option<String>,
    pub severity: &'static str,
}

/// Repository for vendor change database operations.
#[derive(Clone)]
pub struct VendorChangeRepository {
    pool: PgPool,
}

impl VendorChangeRepository {
    /// Creates a new VendorChangeRepository with the given connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Stage one change in `pending` status.
    pub async fn create(
        &self,
        change: &NewVendorChange,
    ) -> Result<VendorChangeEntity, sqlx::Error> {
        let timer = QueryTimer::new("create_vendor_change");

        let result = sqlx::query_as::<_, VendorChangeEntity>(&format!(
            r#"
            INSERT INTO vendor_changes (
                id, organization_id, vendor_id, vendor_file_id, change_type,
                entity_type, entity_id, field_changed, old_value, new_value,
                severity, status, detected_at
            )
            VALUES (
                gen_random_uuid(), $1, $2, $3, $4, $5, $6, $7, $8, $9, $10,
                'pending', NOW()
            )
            RETURNING {}
            "#,
            CHANGE_COLUMNS
        ))
        .bind(change.organization_id)
        .bind(change.vendor_id)
        .bind(change.vendor_file_id)
        .bind(change.change_type)
        .bind(change.entity_type)
        .bind(change.entity_id)
        .bind(&change.field_changed)
        .bind(&change.old_value)
        .bind(&change.new_value)
        .bind(change.severity)
        .fetch_one(&self.pool)
        .await;

        timer.record();
        result
    }

    /// Find a change by id.
    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<VendorChangeEntity>, sqlx::Error> {
        let timer = QueryTimer::new("find_vendor_change_by_id");

        let result = sqlx::query_as::<_, VendorChangeEntity>(&format!(
            "SELECT {} FROM vendor_changes WHERE id = $1",
            CHANGE_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await;

        timer.record();
        result
    }

    /// List an organization's changes, optionally filtered by status,
    /// newest first.
    pub async fn list_by_org(
        &self,
        organization_id: Uuid,
        status: Option<&str>,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<VendorChangeEntity>, sqlx::Error> {
        let timer = QueryTimer::new("list_vendor_changes");

        let result = sqlx::query_as::<_, VendorChangeEntity>(&format!(
            r#"
            SELECT {} FROM vendor_changes
            WHERE organization_id = $1
              AND ($2::TEXT IS NULL OR status = $2)
            ORDER BY detected_at DESC, id DESC
            LIMIT $3 OFFSET $4
            "#,
            CHANGE_COLUMNS
        ))
        .bind(organization_id)
        .bind(status)
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await;

        timer.record();
        result
    }

    /// Count an organization's changes, optionally filtered by status.
    pub async fn count_by_org(
        &self,
        organization_id: Uuid,
        status: Option<&str>,
    ) -> Result<i64, sqlx::Error> {
        let timer = QueryTimer::new("count_vendor_changes");

        let count: i64 = sqlx::query_scalar(
            r#"
            SELECT COUNT(*) FROM vendor_changes
            WHERE organization_id = $1
              AND ($2::TEXT IS NULL OR status = $2)
            "#,
        )
        .bind(organization_id)
        .bind(status)
        .fetch_one(&self.pool)
        .await?;

        timer.record();
        Ok(count)
    }

    /// Transition a `pending` change and stamp the reviewer. Returns the
    /// updated change, or `None` when the change was not pending.
    pub async fn review(
        &self,
        id: Uuid,
        new_status: &str,
        reviewer_id: Option<Uuid>,
    ) -> Result<Option<VendorChangeEntity>, sqlx::Error> {
        let timer = QueryTimer::new("review_vendor_change");

        let result = sqlx::query_as::<_, VendorChangeEntity>(&format!(
            r#"
            UPDATE vendor_changes SET
                status = $2, reviewed_by = $3, reviewed_at = NOW()
            WHERE id = $1 AND status = 'pending'
            RETURNING {}
            "#,
            CHANGE_COLUMNS
        ))
        .bind(id)
        .bind(new_status)
        .bind(reviewer_id)
        .fetch_optional(&self.pool)
        .await;

        timer.record();
        result
    }

    /// Move an `approved` change to `applied`. Returns false when the
    /// change was not in `approved` status (already applied, or never
    /// approved), which makes application exactly-once.
    pub async fn mark_applied(&self, id: Uuid) -> Result<bool, sqlx::Error> {
        let timer = QueryTimer::new("mark_vendor_change_applied");

        let result = sqlx::query(
            "UPDATE vendor_changes SET status = 'applied' WHERE id = $1 AND status = 'approved'",
        )
        .bind(id)
        .execute(&self.pool)
        .await?;

        timer.record();
        Ok(result.rows_affected() > 0)
    }
}

//! Job snapshot repository.

use sqlx::PgPool;
use uuid::Uuid;

use crate::entities::SnapshotEntryEntity;
use crate::metrics::QueryTimer;

const ENTRY_COLUMNS: &str = r#"
    id, job_id, entity_type, entity_id, operation, previous_values,
    created_at, restored_at
"#;

/// Repository for snapshot entries backing job rollback.
#[derive(Clone)]
pub struct SnapshotRepository {
    pool: PgPool,
}

impl SnapshotRepository {
    /// Creates a new SnapshotRepository with the given connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Record an entity the job inserted; rollback deletes it by id.
    pub async fn record_insert(
        &self,
        job_id: Uuid,
        entity_type: &str,
        entity_id: Uuid,
    ) -> Result<(), sqlx::Error> {
        let timer = QueryTimer::new("snapshot_record_insert");

        sqlx::query(
            r#"
            INSERT INTO import_snapshot_entries (
                job_id, entity_type, entity_id, operation, created_at
            )
            VALUES ($1, $2, $3, 'inserted', NOW())
            "#,
        )
        .bind(job_id)
        .bind(entity_type)
        .bind(entity_id)
        .execute(&self.pool)
        .await?;

        timer.record();
        Ok(())
    }

    /// Record an entity's pre-update state; rollback restores it.
    pub async fn record_update(
        &self,
        job_id: Uuid,
        entity_type: &str,
        entity_id: Uuid,
        previous_values: &serde_json::Value,
    ) -> Result<(), sqlx::Error> {
        let timer = QueryTimer::new("snapshot_record_update");

        sqlx::query(
            r#"
            INSERT INTO import_snapshot_entries (
                job_id, entity_type, entity_id, operation, previous_values,
                created_at
            )
            VALUES ($1, $2, $3, 'updated', $4, NOW())
            "#,
        )
        .bind(job_id)
        .bind(entity_type)
        .bind(entity_id)
        .bind(previous_values)
        .execute(&self.pool)
        .await?;

        timer.record();
        Ok(())
    }

    /// Unrestored entries for a job, newest first so effects reverse in
    /// the opposite order they were applied.
    pub async fn list_unrestored(
        &self,
        job_id: Uuid,
    ) -> Result<Vec<SnapshotEntryEntity>, sqlx::Error> {
        let timer = QueryTimer::new("snapshot_list_unrestored");

        let result = sqlx::query_as::<_, SnapshotEntryEntity>(&format!(
            r#"
            SELECT {} FROM import_snapshot_entries
            WHERE job_id = $1 AND restored_at IS NULL
            ORDER BY id DESC
            "#,
            ENTRY_COLUMNS
        ))
        .bind(job_id)
        .fetch_all(&self.pool)
        .await;

        timer.record();
        result
    }

    /// Mark one entry reversed.
    pub async fn mark_restored(&self, entry_id: i64) -> Result<bool, sqlx::Error> {
        let timer = QueryTimer::new("snapshot_mark_restored");

        let result = sqlx::query(
            r#"
            UPDATE import_snapshot_entries SET restored_at = NOW()
            WHERE id = $1 AND restored_at IS NULL
            "#,
        )
        .bind(entry_id)
        .execute(&self.pool)
        .await?;

        timer.record();
        Ok(result.rows_affected() > 0)
    }
}

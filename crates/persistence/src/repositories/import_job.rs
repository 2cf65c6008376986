//! Import job repository.

use sqlx::PgPool;
use uuid::Uuid;

use crate::entities::ImportJobEntity;
use crate::metrics::QueryTimer;

const JOB_COLUMNS: &str = r#"
    id, organization_id, entity_type, source_file, status, total_rows,
    inserted_rows, updated_rows, skipped_rows, errored_rows, error_message,
    created_at, completed_at, rolled_back_at
"#;

/// Aggregated row counts written back onto a finished job.
#[derive(Debug, Clone, Copy, Default)]
pub struct JobCounts {
    pub inserted: i32,
    pub updated: i32,
    pub skipped: i32,
    pub errored: i32,
}

/// Repository for import job database operations.
#[derive(Clone)]
pub struct ImportJobRepository {
    pool: PgPool,
}

impl ImportJobRepository {
    /// Creates a new ImportJobRepository with the given connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Create a job in `pending` state.
    pub async fn create(
        &self,
        organization_id: Uuid,
        entity_type: &str,
        source_file: Option<&str>,
        total_rows: i32,
    ) -> Result<ImportJobEntity, sqlx::Error> {
        let timer = QueryTimer::new("create_import_job");

        let result = sqlx::query_as::<_, ImportJobEntity>(&format!(
            r#"
            INSERT INTO import_jobs (
                id, organization_id, entity_type, source_file, status,
                total_rows, inserted_rows, updated_rows, skipped_rows,
                errored_rows, created_at
            )
            VALUES (gen_random_uuid(), $1, $2, $3, 'pending', $4, 0, 0, 0, 0, NOW())
            RETURNING {}
            "#,
            JOB_COLUMNS
        ))
        .bind(organization_id)
        .bind(entity_type)
        .bind(source_file)
        .bind(total_rows)
        .fetch_one(&self.pool)
        .await;

        timer.record();
        result
    }

    /// Find a job within an organization.
    pub async fn find_by_id(
        &self,
        organization_id: Uuid,
        id: Uuid,
    ) -> Result<Option<ImportJobEntity>, sqlx::Error> {
        let timer = QueryTimer::new("find_import_job_by_id");

        let result = sqlx::query_as::<_, ImportJobEntity>(&format!(
            "SELECT {} FROM import_jobs WHERE organization_id = $1 AND id = $2",
            JOB_COLUMNS
        ))
        .bind(organization_id)
        .bind(id)
        .fetch_optional(&self.pool)
        .await;

        timer.record();
        result
    }

    /// Move a pending job into `processing`.
    pub async fn mark_processing(&self, id: Uuid) -> Result<bool, sqlx::Error> {
        let timer = QueryTimer::new("mark_import_job_processing");

        let result = sqlx::query(
            "UPDATE import_jobs SET status = 'processing' WHERE id = $1 AND status = 'pending'",
        )
        .bind(id)
        .execute(&self.pool)
        .await?;

        timer.record();
        Ok(result.rows_affected() > 0)
    }

    /// Finish a job with its aggregated counts.
    pub async fn complete(&self, id: Uuid, counts: JobCounts) -> Result<bool, sqlx::Error> {
        let timer = QueryTimer::new("complete_import_job");

        let result = sqlx::query(
            r#"
            UPDATE import_jobs SET
                status = 'completed',
                inserted_rows = $2, updated_rows = $3, skipped_rows = $4,
                errored_rows = $5, completed_at = NOW()
            WHERE id = $1
            "#,
        )
        .bind(id)
        .bind(counts.inserted)
        .bind(counts.updated)
        .bind(counts.skipped)
        .bind(counts.errored)
        .execute(&self.pool)
        .await?;

        timer.record();
        Ok(result.rows_affected() > 0)
    }

    /// Mark a job `failed`. Rows already processed keep their outcomes.
    pub async fn fail(&self, id: Uuid, error_message: &str) -> Result<bool, sqlx::Error> {
        let timer = QueryTimer::new("fail_import_job");

        let result = sqlx::query(
            r#"
            UPDATE import_jobs SET
                status = 'failed', error_message = $2, completed_at = NOW()
            WHERE id = $1
            "#,
        )
        .bind(id)
        .bind(error_message)
        .execute(&self.pool)
        .await?;

        timer.record();
        Ok(result.rows_affected() > 0)
    }

    /// Stamp a job as rolled back.
    pub async fn mark_rolled_back(&self, id: Uuid) -> Result<bool, sqlx::Error> {
        let timer = QueryTimer::new("mark_import_job_rolled_back");

        let result = sqlx::query(
            "UPDATE import_jobs SET rolled_back_at = NOW() WHERE id = $1 AND rolled_back_at IS NULL",
        )
        .bind(id)
        .execute(&self.pool)
        .await?;

        timer.record();
        Ok(result.rows_affected() > 0)
    }

    /// Fail jobs stuck in `processing` longer than the given age.
    ///
    /// The worker holds a job for its whole run, so a long-stuck
    /// `processing` status means the process died mid-job.
    pub async fn reap_stale(&self, older_than_minutes: i64) -> Result<u64, sqlx::Error> {
        let timer = QueryTimer::new("reap_stale_import_jobs");

        let result = sqlx::query(
            r#"
            UPDATE import_jobs SET
                status = 'failed',
                error_message = 'processing timed out',
                completed_at = NOW()
            WHERE status = 'processing'
              AND created_at < NOW() - ($1 * INTERVAL '1 minute')
            "#,
        )
        .bind(older_than_minutes)
        .execute(&self.pool)
        .await?;

        timer.record();
        Ok(result.rows_affected())
    }
}

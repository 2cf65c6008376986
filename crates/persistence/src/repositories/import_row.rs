//! Import row audit repository.
//!
//! Rows are insert-only, keyed by (job id, row index). There is no update
//! or delete path: the table is the permanent audit trail of what each
//! input row became.

use sqlx::PgPool;
use uuid::Uuid;

use crate::entities::ImportRowEntity;
use crate::metrics::QueryTimer;

const ROW_COLUMNS: &str = r#"
    id, job_id, row_index, raw, mapped, status, error_message, entity_id,
    processed_at
"#;

/// Everything recorded for one processed row.
#[derive(Debug, Clone)]
pub struct NewImportRow {
    pub job_id: Uuid,
    pub row_index: i32,
    pub raw: serde_json::Value,
    pub mapped: serde_json::Value,
    pub status: &'static str,
    pub error_message: Option<String>,
    pub entity_id: Option<Uuid>,
}

/// Repository for the import row audit log.
#[derive(Clone)]
pub struct ImportRowRepository {
    pool: PgPool,
}

impl ImportRowRepository {
    /// Creates a new ImportRowRepository with the given connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Append one audit row.
    pub async fn append(&self, row: &NewImportRow) -> Result<(), sqlx::Error> {
        let timer = QueryTimer::new("append_import_row");

        sqlx::query(
            r#"
            INSERT INTO import_rows (
                job_id, row_index, raw, mapped, status, error_message,
                entity_id, processed_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, NOW())
            "#,
        )
        .bind(row.job_id)
        .bind(row.row_index)
        .bind(&row.raw)
        .bind(&row.mapped)
        .bind(row.status)
        .bind(&row.error_message)
        .bind(row.entity_id)
        .execute(&self.pool)
        .await?;

        timer.record();
        Ok(())
    }

    /// List a job's rows in source order.
    pub async fn list_by_job(
        &self,
        job_id: Uuid,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<ImportRowEntity>, sqlx::Error> {
        let timer = QueryTimer::new("list_import_rows");

        let result = sqlx::query_as::<_, ImportRowEntity>(&format!(
            r#"
            SELECT {} FROM import_rows
            WHERE job_id = $1
            ORDER BY row_index
            LIMIT $2 OFFSET $3
            "#,
            ROW_COLUMNS
        ))
        .bind(job_id)
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await;

        timer.record();
        result
    }

    /// Count a job's rows.
    pub async fn count_by_job(&self, job_id: Uuid) -> Result<i64, sqlx::Error> {
        let timer = QueryTimer::new("count_import_rows");

        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM import_rows WHERE job_id = $1")
            .bind(job_id)
            .fetch_one(&self.pool)
            .await?;

        timer.record();
        Ok(count)
    }
}

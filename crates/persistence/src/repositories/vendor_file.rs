//! Vendor file repository.

use sqlx::PgPool;
use uuid::Uuid;

use crate::entities::VendorFileEntity;
use crate::metrics::QueryTimer;

const FILE_COLUMNS: &str = r#"
    id, organization_id, vendor_id, file_type, file_format, source_file,
    duplicate_strategy, change_detection, status, total_rows, processed_rows,
    valid_rows, error_rows, new_records, updated_records, created_at,
    completed_at
"#;

/// Row counts written back onto a finished vendor file.
#[derive(Debug, Clone, Copy, Default)]
pub struct VendorFileCounts {
    pub processed: i32,
    pub valid: i32,
    pub errored: i32,
    pub new_records: i32,
    pub updated_records: i32,
}

/// Repository for vendor file database operations.
#[derive(Clone)]
pub struct VendorFileRepository {
    pool: PgPool,
}

impl VendorFileRepository {
    /// Creates a new VendorFileRepository with the given connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Create a vendor file in `pending` state.
    #[allow(clippy::too_many_arguments)]
    pub async fn create(
        &self,
        organization_id: Uuid,
        vendor_id: Uuid,
        file_type: &str,
        file_format: &str,
        source_file: Option<&str>,
        duplicate_strategy: &str,
        change_detection: bool,
        total_rows: i32,
    ) -> Result<VendorFileEntity, sqlx::Error> {
        let timer = QueryTimer::new("create_vendor_file");

        let result = sqlx::query_as::<_, VendorFileEntity>(&format!(
            r#"
            INSERT INTO vendor_files (
                id, organization_id, vendor_id, file_type, file_format,
                source_file, duplicate_strategy, change_detection, status,
                total_rows, processed_rows, valid_rows, error_rows,
                new_records, updated_records, created_at
            )
            VALUES (
                gen_random_uuid(), $1, $2, $3, $4, $5, $6, $7, 'pending',
                $8, 0, 0, 0, 0, 0, NOW()
            )
            RETURNING {}
            "#,
            FILE_COLUMNS
        ))
        .bind(organization_id)
        .bind(vendor_id)
        .bind(file_type)
        .bind(file_format)
        .bind(source_file)
        .bind(duplicate_strategy)
        .bind(change_detection)
        .bind(total_rows)
        .fetch_one(&self.pool)
        .await;

        timer.record();
        result
    }

    /// Find a vendor file within an organization.
    pub async fn find_by_id(
        &self,
        organization_id: Uuid,
        id: Uuid,
    ) -> Result<Option<VendorFileEntity>, sqlx::Error> {
        let timer = QueryTimer::new("find_vendor_file_by_id");

        let result = sqlx::query_as::<_, VendorFileEntity>(&format!(
            "SELECT {} FROM vendor_files WHERE organization_id = $1 AND id = $2",
            FILE_COLUMNS
        ))
        .bind(organization_id)
        .bind(id)
        .fetch_optional(&self.pool)
        .await;

        timer.record();
        result
    }

    /// Move a pending file into `processing`.
    pub async fn mark_processing(&self, id: Uuid) -> Result<bool, sqlx::Error> {
        let timer = QueryTimer::new("mark_vendor_file_processing");

        let result = sqlx::query(
            "UPDATE vendor_files SET status = 'processing' WHERE id = $1 AND status = 'pending'",
        )
        .bind(id)
        .execute(&self.pool)
        .await?;

        timer.record();
        Ok(result.rows_affected() > 0)
    }

    /// Finish a file with a terminal status and its counts.
    pub async fn finish(
        &self,
        id: Uuid,
        status: &str,
        counts: VendorFileCounts,
    ) -> Result<bool, sqlx::Error> {
        let timer = QueryTimer::new("finish_vendor_file");

        let result = sqlx::query(
            r#"
            UPDATE vendor_files SET
                status = $2, processed_rows = $3, valid_rows = $4,
                error_rows = $5, new_records = $6, updated_records = $7,
                completed_at = NOW()
            WHERE id = $1
            "#,
        )
        .bind(id)
        .bind(status)
        .bind(counts.processed)
        .bind(counts.valid)
        .bind(counts.errored)
        .bind(counts.new_records)
        .bind(counts.updated_records)
        .execute(&self.pool)
        .await?;

        timer.record();
        Ok(result.rows_affected() > 0)
    }
}

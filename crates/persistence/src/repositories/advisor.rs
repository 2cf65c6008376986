//! Advisor repository.

use domain::models::AdvisorRecord;
use sqlx::PgPool;
use uuid::Uuid;

use crate::entities::AdvisorEntity;
use crate::metrics::QueryTimer;

const ADVISOR_COLUMNS: &str = r#"
    id, organization_id, advisor_code, national_producer_number, first_name,
    last_name, email, phone, status, created_at, updated_at
"#;

/// Repository for advisor database operations.
#[derive(Clone)]
pub struct AdvisorRepository {
    pool: PgPool,
}

impl AdvisorRepository {
    /// Creates a new AdvisorRepository with the given connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Find an advisor by id.
    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<AdvisorEntity>, sqlx::Error> {
        let timer = QueryTimer::new("find_advisor_by_id");

        let result = sqlx::query_as::<_, AdvisorEntity>(&format!(
            "SELECT {} FROM advisors WHERE id = $1",
            ADVISOR_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await;

        timer.record();
        result
    }

    /// Dedup key: email, case-insensitive, within the organization.
    pub async fn find_by_email(
        &self,
        organization_id: Uuid,
        email: &str,
    ) -> Result<Option<AdvisorEntity>, sqlx::Error> {
        let timer = QueryTimer::new("find_advisor_by_email");

        let result = sqlx::query_as::<_, AdvisorEntity>(&format!(
            r#"
            SELECT {} FROM advisors
            WHERE organization_id = $1 AND LOWER(email) = LOWER($2)
            "#,
            ADVISOR_COLUMNS
        ))
        .bind(organization_id)
        .bind(email)
        .fetch_optional(&self.pool)
        .await;

        timer.record();
        result
    }

    /// Dedup key: advisor code within the organization.
    pub async fn find_by_code(
        &self,
        organization_id: Uuid,
        advisor_code: &str,
    ) -> Result<Option<AdvisorEntity>, sqlx::Error> {
        let timer = QueryTimer::new("find_advisor_by_code");

        let result = sqlx::query_as::<_, AdvisorEntity>(&format!(
            "SELECT {} FROM advisors WHERE organization_id = $1 AND advisor_code = $2",
            ADVISOR_COLUMNS
        ))
        .bind(organization_id)
        .bind(advisor_code)
        .fetch_optional(&self.pool)
        .await;

        timer.record();
        result
    }

    /// Dedup key: national producer number within the organization.
    pub async fn find_by_producer_number(
        &self,
        organization_id: Uuid,
        npn: &str,
    ) -> Result<Option<AdvisorEntity>, sqlx::Error> {
        let timer = QueryTimer::new("find_advisor_by_npn");

        let result = sqlx::query_as::<_, AdvisorEntity>(&format!(
            r#"
            SELECT {} FROM advisors
            WHERE organization_id = $1 AND national_producer_number = $2
            "#,
            ADVISOR_COLUMNS
        ))
        .bind(organization_id)
        .bind(npn)
        .fetch_optional(&self.pool)
        .await;

        timer.record();
        result
    }

    /// Insert an advisor from a validated record.
    pub async fn insert(
        &self,
        organization_id: Uuid,
        record: &AdvisorRecord,
    ) -> Result<AdvisorEntity, sqlx::Error> {
        let timer = QueryTimer::new("insert_advisor");

        let result = sqlx::query_as::<_, AdvisorEntity>(&format!(
            r#"
            INSERT INTO advisors (
                id, organization_id, advisor_code, national_producer_number,
                first_name, last_name, email, phone, status,
                created_at, updated_at
            )
            VALUES (
                gen_random_uuid(), $1, $2, $3, $4, $5, $6, $7,
                COALESCE($8, 'pending'), NOW(), NOW()
            )
            RETURNING {}
            "#,
            ADVISOR_COLUMNS
        ))
        .bind(organization_id)
        .bind(&record.advisor_code)
        .bind(&record.national_producer_number)
        .bind(&record.first_name)
        .bind(&record.last_name)
        .bind(&record.email)
        .bind(&record.phone)
        .bind(&record.status)
        .fetch_one(&self.pool)
        .await;

        timer.record();
        result
    }

    /// Update an advisor from a validated record; absent fields keep their
    /// stored values.
    pub async fn update(
        &self,
        id: Uuid,
        record: &AdvisorRecord,
    ) -> Result<AdvisorEntity, sqlx::Error> {
        let timer = QueryTimer::new("update_advisor");

        let result = sqlx::query_as::<_, AdvisorEntity>(&format!(
            r#"
            UPDATE advisors SET
                advisor_code = COALESCE($2, advisor_code),
                national_producer_number = COALESCE($3, national_producer_number),
                first_name = COALESCE($4, first_name),
                last_name = COALESCE($5, last_name),
                email = COALESCE($6, email),
                phone = COALESCE($7, phone),
                status = COALESCE($8, status),
                updated_at = NOW()
            WHERE id = $1
            RETURNING {}
            "#,
            ADVISOR_COLUMNS
        ))
        .bind(id)
        .bind(&record.advisor_code)
        .bind(&record.national_producer_number)
        .bind(&record.first_name)
        .bind(&record.last_name)
        .bind(&record.email)
        .bind(&record.phone)
        .bind(&record.status)
        .fetch_one(&self.pool)
        .await;

        timer.record();
        result
    }

    /// Restore every field from a snapshot copy. Used by rollback.
    pub async fn restore(&self, snapshot: &AdvisorEntity) -> Result<bool, sqlx::Error> {
        let timer = QueryTimer::new("restore_advisor");

        let result = sqlx::query(
            r#"
            UPDATE advisors SET
                advisor_code = $2, national_producer_number = $3,
                first_name = $4, last_name = $5, email = $6, phone = $7,
                status = $8, updated_at = NOW()
            WHERE id = $1
            "#,
        )
        .bind(snapshot.id)
        .bind(&snapshot.advisor_code)
        .bind(&snapshot.national_producer_number)
        .bind(&snapshot.first_name)
        .bind(&snapshot.last_name)
        .bind(&snapshot.email)
        .bind(&snapshot.phone)
        .bind(&snapshot.status)
        .execute(&self.pool)
        .await?;

        timer.record();
        Ok(result.rows_affected() > 0)
    }

    /// Delete an advisor. Used by rollback to remove job-inserted entities.
    pub async fn delete(&self, id: Uuid) -> Result<bool, sqlx::Error> {
        let timer = QueryTimer::new("delete_advisor");

        let result = sqlx::query("DELETE FROM advisors WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        timer.record();
        Ok(result.rows_affected() > 0)
    }
}

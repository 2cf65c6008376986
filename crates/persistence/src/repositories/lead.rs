//! Lead repository.

use domain::models::LeadRecord;
use sqlx::PgPool;
use uuid::Uuid;

use crate::entities::LeadEntity;
use crate::metrics::QueryTimer;

const LEAD_COLUMNS: &str = r#"
    id, organization_id, first_name, last_name, email, phone, source,
    status, created_at, updated_at
"#;

/// Repository for lead database operations.
#[derive(Clone)]
pub struct LeadRepository {
    pool: PgPool,
}

impl LeadRepository {
    /// Creates a new LeadRepository with the given connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Find a lead by id.
    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<LeadEntity>, sqlx::Error> {
        let timer = QueryTimer::new("find_lead_by_id");

        let result = sqlx::query_as::<_, LeadEntity>(&format!(
            "SELECT {} FROM leads WHERE id = $1",
            LEAD_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await;

        timer.record();
        result
    }

    /// Dedup key: email plus phone within the organization.
    pub async fn find_by_email_and_phone(
        &self,
        organization_id: Uuid,
        email: &str,
        phone: &str,
    ) -> Result<Option<LeadEntity>, sqlx::Error> {
        let timer = QueryTimer::new("find_lead_by_email_phone");

        let result = sqlx::query_as::<_, LeadEntity>(&format!(
            r#"
            SELECT {} FROM leads
            WHERE organization_id = $1 AND email = $2 AND phone = $3
            ORDER BY created_at
            LIMIT 1
            "#,
            LEAD_COLUMNS
        ))
        .bind(organization_id)
        .bind(email)
        .bind(phone)
        .fetch_optional(&self.pool)
        .await;

        timer.record();
        result
    }

    /// Dedup key: email alone within the organization.
    pub async fn find_by_email(
        &self,
        organization_id: Uuid,
        email: &str,
    ) -> Result<Option<LeadEntity>, sqlx::Error> {
        let timer = QueryTimer::new("find_lead_by_email");

        let result = sqlx::query_as::<_, LeadEntity>(&format!(
            r#"
            SELECT {} FROM leads
            WHERE organization_id = $1 AND email = $2
            ORDER BY created_at
            LIMIT 1
            "#,
            LEAD_COLUMNS
        ))
        .bind(organization_id)
        .bind(email)
        .fetch_optional(&self.pool)
        .await;

        timer.record();
        result
    }

    /// Insert a lead from a validated record.
    pub async fn insert(
        &self,
        organization_id: Uuid,
        record: &LeadRecord,
    ) -> Result<LeadEntity, sqlx::Error> {
        let timer = QueryTimer::new("insert_lead");

        let result = sqlx::query_as::<_, LeadEntity>(&format!(
            r#"
            INSERT INTO leads (
                id, organization_id, first_name, last_name, email, phone,
                source, status, created_at, updated_at
            )
            VALUES (
                gen_random_uuid(), $1, $2, $3, $4, $5, $6,
                COALESCE($7, 'new'), NOW(), NOW()
            )
            RETURNING {}
            "#,
            LEAD_COLUMNS
        ))
        .bind(organization_id)
        .bind(&record.first_name)
        .bind(&record.last_name)
        .bind(&record.email)
        .bind(&record.phone)
        .bind(&record.source)
        .bind(&record.status)
        .fetch_one(&self.pool)
        .await;

        timer.record();
        result
    }

    /// Update a lead from a validated record; absent fields keep their
    /// stored values.
    pub async fn update(&self, id: Uuid, record: &LeadRecord) -> Result<LeadEntity, sqlx::Error> {
        let timer = QueryTimer::new("update_lead");

        let result = sqlx::query_as::<_, LeadEntity>(&format!(
            r#"
            UPDATE leads SET
                first_name = COALESCE($2, first_name),
                last_name = COALESCE($3, last_name),
                email = COALESCE($4, email),
                phone = COALESCE($5, phone),
                source = COALESCE($6, source),
                status = COALESCE($7, status),
                updated_at = NOW()
            WHERE id = $1
            RETURNING {}
            "#,
            LEAD_COLUMNS
        ))
        .bind(id)
        .bind(&record.first_name)
        .bind(&record.last_name)
        .bind(&record.email)
        .bind(&record.phone)
        .bind(&record.source)
        .bind(&record.status)
        .fetch_one(&self.pool)
        .await;

        timer.record();
        result
    }

    /// Restore every field from a snapshot copy. Used by rollback.
    pub async fn restore(&self, snapshot: &LeadEntity) -> Result<bool, sqlx::Error> {
        let timer = QueryTimer::new("restore_lead");

        let result = sqlx::query(
            r#"
            UPDATE leads SET
                first_name = $2, last_name = $3, email = $4, phone = $5,
                source = $6, status = $7, updated_at = NOW()
            WHERE id = $1
            "#,
        )
        .bind(snapshot.id)
        .bind(&snapshot.first_name)
        .bind(&snapshot.last_name)
        .bind(&snapshot.email)
        .bind(&snapshot.phone)
        .bind(&snapshot.source)
        .bind(&snapshot.status)
        .execute(&self.pool)
        .await?;

        timer.record();
        Ok(result.rows_affected() > 0)
    }

    /// Delete a lead. Used by rollback to remove job-inserted entities.
    pub async fn delete(&self, id: Uuid) -> Result<bool, sqlx::Error> {
        let timer = QueryTimer::new("delete_lead");

        let result = sqlx::query("DELETE FROM leads WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        timer.record();
        Ok(result.rows_affected() > 0)
    }
}

//! Organization repository.

use sqlx::PgPool;
use uuid::Uuid;

use crate::entities::OrganizationEntity;
use crate::metrics::QueryTimer;

/// Repository for organization lookups.
#[derive(Clone)]
pub struct OrganizationRepository {
    pool: PgPool,
}

impl OrganizationRepository {
    /// Creates a new OrganizationRepository with the given connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Find an organization by id.
    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<OrganizationEntity>, sqlx::Error> {
        let timer = QueryTimer::new("find_organization_by_id");

        let result = sqlx::query_as::<_, OrganizationEntity>(
            "SELECT id, name, slug, created_at FROM organizations WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await;

        timer.record();
        result
    }

    /// Create an organization.
    pub async fn create(&self, name: &str, slug: &str) -> Result<OrganizationEntity, sqlx::Error> {
        let timer = QueryTimer::new("create_organization");

        let result = sqlx::query_as::<_, OrganizationEntity>(
            r#"
            INSERT INTO organizations (id, name, slug, created_at)
            VALUES (gen_random_uuid(), $1, $2, NOW())
            RETURNING id, name, slug, created_at
            "#,
        )
        .bind(name)
        .bind(slug)
        .fetch_one(&self.pool)
        .await;

        timer.record();
        result
    }
}

//! Vendor repository.

use sqlx::PgPool;
use uuid::Uuid;

use crate::entities::VendorEntity;
use crate::metrics::QueryTimer;

/// Repository for vendor registry operations.
#[derive(Clone)]
pub struct VendorRepository {
    pool: PgPool,
}

impl VendorRepository {
    /// Creates a new VendorRepository with the given connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Find a vendor within an organization.
    pub async fn find_by_id(
        &self,
        organization_id: Uuid,
        id: Uuid,
    ) -> Result<Option<VendorEntity>, sqlx::Error> {
        let timer = QueryTimer::new("find_vendor_by_id");

        let result = sqlx::query_as::<_, VendorEntity>(
            r#"
            SELECT id, organization_id, name, code, created_at
            FROM vendors
            WHERE organization_id = $1 AND id = $2
            "#,
        )
        .bind(organization_id)
        .bind(id)
        .fetch_optional(&self.pool)
        .await;

        timer.record();
        result
    }

    /// Register a vendor.
    pub async fn create(
        &self,
        organization_id: Uuid,
        name: &str,
        code: &str,
    ) -> Result<VendorEntity, sqlx::Error> {
        let timer = QueryTimer::new("create_vendor");

        let result = sqlx::query_as::<_, VendorEntity>(
            r#"
            INSERT INTO vendors (id, organization_id, name, code, created_at)
            VALUES (gen_random_uuid(), $1, $2, $3, NOW())
            RETURNING id, organization_id, name, code, created_at
            "#,
        )
        .bind(organization_id)
        .bind(name)
        .bind(code)
        .fetch_one(&self.pool)
        .await;

        timer.record();
        result
    }
}

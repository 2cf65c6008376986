//! Member repository: dedup-key lookups, insert/update from validated
//! records, snapshot restore, and field-level write-back for approved
//! vendor changes.

use chrono::NaiveDate;
use domain::models::MemberRecord;
use sqlx::PgPool;
use uuid::Uuid;

use crate::entities::MemberEntity;
use crate::metrics::QueryTimer;

const MEMBER_COLUMNS: &str = r#"
    id, organization_id, member_number, first_name, last_name, email, phone,
    date_of_birth, address1, address2, city, state, zip, plan_id, plan_name,
    monthly_premium, status, enrollment_date, termination_date, dependents,
    created_at, updated_at
"#;

/// Repository for member database operations.
#[derive(Clone)]
pub struct MemberRepository {
    pool: PgPool,
}

impl MemberRepository {
    /// Creates a new MemberRepository with the given connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Find a member by id.
    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<MemberEntity>, sqlx::Error> {
        let timer = QueryTimer::new("find_member_by_id");

        let result = sqlx::query_as::<_, MemberEntity>(&format!(
            "SELECT {} FROM members WHERE id = $1",
            MEMBER_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await;

        timer.record();
        result
    }

    /// Dedup key: member number within the organization.
    pub async fn find_by_member_number(
        &self,
        organization_id: Uuid,
        member_number: &str,
    ) -> Result<Option<MemberEntity>, sqlx::Error> {
        let timer = QueryTimer::new("find_member_by_number");

        let result = sqlx::query_as::<_, MemberEntity>(&format!(
            "SELECT {} FROM members WHERE organization_id = $1 AND member_number = $2",
            MEMBER_COLUMNS
        ))
        .bind(organization_id)
        .bind(member_number)
        .fetch_optional(&self.pool)
        .await;

        timer.record();
        result
    }

    /// Dedup key: email plus date of birth within the organization.
    ///
    /// Emails are stored lower-cased, so equality comparison suffices.
    pub async fn find_by_email_and_dob(
        &self,
        organization_id: Uuid,
        email: &str,
        date_of_birth: NaiveDate,
    ) -> Result<Option<MemberEntity>, sqlx::Error> {
        let timer = QueryTimer::new("find_member_by_email_dob");

        let result = sqlx::query_as::<_, MemberEntity>(&format!(
            r#"
            SELECT {} FROM members
            WHERE organization_id = $1 AND email = $2 AND date_of_birth = $3
            "#,
            MEMBER_COLUMNS
        ))
        .bind(organization_id)
        .bind(email)
        .bind(date_of_birth)
        .fetch_optional(&self.pool)
        .await;

        timer.record();
        result
    }

    /// Insert a member from a validated record.
    pub async fn insert(
        &self,
        organization_id: Uuid,
        record: &MemberRecord,
    ) -> Result<MemberEntity, sqlx::Error> {
        let timer = QueryTimer::new("insert_member");

        let result = sqlx::query_as::<_, MemberEntity>(&format!(
            r#"
            INSERT INTO members (
                id, organization_id, member_number, first_name, last_name,
                email, phone, date_of_birth, address1, address2, city, state,
                zip, plan_id, plan_name, monthly_premium, status,
                enrollment_date, termination_date, dependents,
                created_at, updated_at
            )
            VALUES (
                gen_random_uuid(), $1, $2, $3, $4, $5, $6, $7, $8, $9, $10,
                $11, $12, $13, $14, $15, COALESCE($16, 'pending'), $17, $18,
                $19, NOW(), NOW()
            )
            RETURNING {}
            "#,
            MEMBER_COLUMNS
        ))
        .bind(organization_id)
        .bind(&record.member_number)
        .bind(&record.first_name)
        .bind(&record.last_name)
        .bind(&record.email)
        .bind(&record.phone)
        .bind(record.date_of_birth)
        .bind(&record.address1)
        .bind(&record.address2)
        .bind(&record.city)
        .bind(&record.state)
        .bind(&record.zip)
        .bind(&record.plan_id)
        .bind(&record.plan_name)
        .bind(record.monthly_premium)
        .bind(&record.status)
        .bind(record.enrollment_date)
        .bind(record.termination_date)
        .bind(&record.dependents)
        .fetch_one(&self.pool)
        .await;

        timer.record();
        result
    }

    /// Update a member from a validated record.
    ///
    /// Only fields present in the record are written; absent fields keep
    /// their stored values.
    pub async fn update(
        &self,
        id: Uuid,
        record: &MemberRecord,
    ) -> Result<MemberEntity, sqlx::Error> {
        let timer = QueryTimer::new("update_member");

        let result = sqlx::query_as::<_, MemberEntity>(&format!(
            r#"
            UPDATE members SET
                member_number = COALESCE($2, member_number),
                first_name = COALESCE($3, first_name),
                last_name = COALESCE($4, last_name),
                email = COALESCE($5, email),
                phone = COALESCE($6, phone),
                date_of_birth = COALESCE($7, date_of_birth),
                address1 = COALESCE($8, address1),
                address2 = COALESCE($9, address2),
                city = COALESCE($10, city),
                state = COALESCE($11, state),
                zip = COALESCE($12, zip),
                plan_id = COALESCE($13, plan_id),
                plan_name = COALESCE($14, plan_name),
                monthly_premium = COALESCE($15, monthly_premium),
                status = COALESCE($16, status),
                enrollment_date = COALESCE($17, enrollment_date),
                termination_date = COALESCE($18, termination_date),
                dependents = COALESCE($19, dependents),
                updated_at = NOW()
            WHERE id = $1
            RETURNING {}
            "#,
            MEMBER_COLUMNS
        ))
        .bind(id)
        .bind(&record.member_number)
        .bind(&record.first_name)
        .bind(&record.last_name)
        .bind(&record.email)
        .bind(&record.phone)
        .bind(record.date_of_birth)
        .bind(&record.address1)
        .bind(&record.address2)
        .bind(&record.city)
        .bind(&record.state)
        .bind(&record.zip)
        .bind(&record.plan_id)
        .bind(&record.plan_name)
        .bind(record.monthly_premium)
        .bind(&record.status)
        .bind(record.enrollment_date)
        .bind(record.termination_date)
        .bind(&record.dependents)
        .fetch_one(&self.pool)
        .await;

        timer.record();
        result
    }

    /// Restore every field from a snapshot copy. Used by rollback.
    pub async fn restore(&self, snapshot: &MemberEntity) -> Result<bool, sqlx::Error> {
        let timer = QueryTimer::new("restore_member");

        let result = sqlx::query(
            r#"
            UPDATE members SET
                member_number = $2, first_name = $3, last_name = $4,
                email = $5, phone = $6, date_of_birth = $7, address1 = $8,
                address2 = $9, city = $10, state = $11, zip = $12,
                plan_id = $13, plan_name = $14, monthly_premium = $15,
                status = $16, enrollment_date = $17, termination_date = $18,
                dependents = $19, updated_at = NOW()
            WHERE id = $1
            "#,
        )
        .bind(snapshot.id)
        .bind(&snapshot.member_number)
        .bind(&snapshot.first_name)
        .bind(&snapshot.last_name)
        .bind(&snapshot.email)
        .bind(&snapshot.phone)
        .bind(snapshot.date_of_birth)
        .bind(&snapshot.address1)
        .bind(&snapshot.address2)
        .bind(&snapshot.city)
        .bind(&snapshot.state)
        .bind(&snapshot.zip)
        .bind(&snapshot.plan_id)
        .bind(&snapshot.plan_name)
        .bind(snapshot.monthly_premium)
        .bind(&snapshot.status)
        .bind(snapshot.enrollment_date)
        .bind(snapshot.termination_date)
        .bind(&snapshot.dependents)
        .execute(&self.pool)
        .await?;

        timer.record();
        Ok(result.rows_affected() > 0)
    }

    /// Delete a member. Used by rollback to remove job-inserted entities.
    pub async fn delete(&self, id: Uuid) -> Result<bool, sqlx::Error> {
        let timer = QueryTimer::new("delete_member");

        let result = sqlx::query("DELETE FROM members WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        timer.record();
        Ok(result.rows_affected() > 0)
    }

    /// Write one canonical field. Used when an approved vendor change is
    /// applied. The column name is resolved through a whitelist; unknown
    /// fields are rejected before any SQL is built.
    pub async fn apply_field(
        &self,
        id: Uuid,
        field: &str,
        value: Option<&str>,
    ) -> Result<bool, sqlx::Error> {
        let expr = match column_expr(field) {
            Some(expr) => expr,
            None => return Err(sqlx::Error::ColumnNotFound(field.to_string())),
        };
        let timer = QueryTimer::new("apply_member_field");

        let sql = format!(
            "UPDATE members SET {} = {}, updated_at = NOW() WHERE id = $1",
            field, expr
        );
        let result = sqlx::query(&sql)
            .bind(id)
            .bind(value)
            .execute(&self.pool)
            .await?;

        timer.record();
        Ok(result.rows_affected() > 0)
    }
}

/// Bind expression for a writable member column, with the cast needed to
/// take a text value. `None` means the field is not writable this way.
fn column_expr(field: &str) -> Option<&'static str> {
    match field {
        "member_number" | "first_name" | "last_name" | "email" | "phone" | "address1"
        | "address2" | "city" | "state" | "zip" | "plan_id" | "plan_name" | "status"
        | "dependents" => Some("$2"),
        "date_of_birth" | "enrollment_date" | "termination_date" => Some("$2::date"),
        "monthly_premium" => Some("$2::double precision"),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_column_expr_whitelist() {
        assert_eq!(column_expr("city"), Some("$2"));
        assert_eq!(column_expr("date_of_birth"), Some("$2::date"));
        assert_eq!(column_expr("monthly_premium"), Some("$2::double precision"));
        assert_eq!(column_expr("id"), None);
        assert_eq!(column_expr("organization_id"), None);
        assert_eq!(column_expr("created_at; DROP TABLE members"), None);
    }
}

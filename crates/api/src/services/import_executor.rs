//! Direct bulk import execution.
//!
//! Runs one job: rows flow through normalize → map → validate → dedup →
//! insert-or-update, strictly in source order, with a snapshot entry
//! captured before every write and an audit row appended after every row.
//!
//! Row-level failure isolation is the central contract here: a bad row is
//! recorded and processing continues. Only failures that mean storage is
//! unreachable (job creation, audit append, job finalization) abort the
//! job.

use anyhow::Context;
use domain::models::{
    AdvisorRecord, EntityType, ImportRequest, ImportResult, ImportRowError, ImportRowStatus,
    LeadRecord, MemberRecord, RawRow, ValidatedRow,
};
use domain::services::mapper::ColumnMap;
use domain::services::normalizer::normalize_row;
use domain::services::validator::{join_errors, validate_row};
use persistence::entities::ImportJobEntity;
use persistence::repositories::{
    AdvisorRepository, ImportJobRepository, ImportRowRepository, JobCounts, LeadRepository,
    MemberRepository, NewImportRow, SnapshotRepository,
};
use sqlx::PgPool;
use uuid::Uuid;

use super::dedup::DedupResolver;
use super::parser;

/// Outcome of processing one row.
struct RowOutcome {
    status: ImportRowStatus,
    entity_id: Option<Uuid>,
    error: Option<String>,
    mapped: serde_json::Value,
}

impl RowOutcome {
    fn error(message: String, mapped: serde_json::Value) -> Self {
        Self {
            status: ImportRowStatus::Error,
            entity_id: None,
            error: Some(message),
            mapped,
        }
    }
}

/// Executes direct bulk imports.
#[derive(Clone)]
pub struct ImportExecutor {
    jobs: ImportJobRepository,
    rows: ImportRowRepository,
    snapshots: SnapshotRepository,
    members: MemberRepository,
    advisors: AdvisorRepository,
    leads: LeadRepository,
    dedup: DedupResolver,
}

impl ImportExecutor {
    pub fn new(pool: PgPool) -> Self {
        Self {
            jobs: ImportJobRepository::new(pool.clone()),
            rows: ImportRowRepository::new(pool.clone()),
            snapshots: SnapshotRepository::new(pool.clone()),
            members: MemberRepository::new(pool.clone()),
            advisors: AdvisorRepository::new(pool.clone()),
            leads: LeadRepository::new(pool.clone()),
            dedup: DedupResolver::new(pool),
        }
    }

    /// Run one import job to completion and return its result summary.
    pub async fn run(
        &self,
        organization_id: Uuid,
        request: &ImportRequest,
    ) -> Result<(ImportJobEntity, ImportResult), anyhow::Error> {
        let entity = request.entity_type;
        let raw_rows = parser::rows_from_json(&request.rows);

        let job = self
            .jobs
            .create(
                organization_id,
                entity.as_str(),
                request.source_file.as_deref(),
                raw_rows.len() as i32,
            )
            .await
            .context("failed to create import job")?;
        self.jobs.mark_processing(job.id).await?;

        tracing::info!(
            job_id = %job.id,
            entity_type = %entity,
            rows = raw_rows.len(),
            "Import job started"
        );

        let column_map = ColumnMap::for_entity(entity).with_overrides(&request.column_overrides);

        let (counts, errors) = match self
            .process_rows(organization_id, entity, job.id, &raw_rows, &column_map)
            .await
        {
            Ok(outcome) => outcome,
            Err(err) => {
                // Job-scoped fatal error: already-processed rows keep their
                // recorded outcomes, the job lands in `failed`.
                let _ = self.jobs.fail(job.id, &err.to_string()).await;
                return Err(err);
            }
        };

        self.jobs.complete(job.id, counts).await?;

        tracing::info!(
            job_id = %job.id,
            inserted = counts.inserted,
            updated = counts.updated,
            errored = counts.errored,
            "Import job completed"
        );

        let result = ImportResult {
            total: raw_rows.len() as u32,
            inserted: counts.inserted as u32,
            updated: counts.updated as u32,
            skipped: counts.skipped as u32,
            errors,
        };
        Ok((job, result))
    }

    /// Process every row strictly in source order: the insert for row N
    /// must be visible to the dedup lookup of row N+1, or one subject
    /// appearing twice in a file becomes two records.
    async fn process_rows(
        &self,
        organization_id: Uuid,
        entity: EntityType,
        job_id: Uuid,
        raw_rows: &[RawRow],
        column_map: &ColumnMap,
    ) -> Result<(JobCounts, Vec<ImportRowError>), anyhow::Error> {
        let mut counts = JobCounts::default();
        let mut errors = Vec::new();

        for (index, raw) in raw_rows.iter().enumerate() {
            let outcome = self
                .process_row(organization_id, entity, job_id, raw, column_map)
                .await;

            match outcome.status {
                ImportRowStatus::Inserted => counts.inserted += 1,
                ImportRowStatus::Updated => counts.updated += 1,
                ImportRowStatus::Skipped => counts.skipped += 1,
                ImportRowStatus::Error => {
                    counts.errored += 1;
                    errors.push(ImportRowError {
                        row_index: index,
                        message: outcome.error.clone().unwrap_or_default(),
                    });
                }
                ImportRowStatus::Pending => unreachable!("rows always reach a terminal status"),
            }

            // The audit row is appended whatever the outcome was. Failing
            // to append is a job-scoped storage failure.
            self.rows
                .append(&NewImportRow {
                    job_id,
                    row_index: index as i32,
                    raw: serde_json::to_value(raw).unwrap_or_default(),
                    mapped: outcome.mapped,
                    status: outcome.status.as_str(),
                    error_message: outcome.error,
                    entity_id: outcome.entity_id,
                })
                .await
                .context("failed to append import audit row")?;
        }

        Ok((counts, errors))
    }

    /// Process one row. Never fails: every error becomes a row outcome.
    async fn process_row(
        &self,
        organization_id: Uuid,
        entity: EntityType,
        job_id: Uuid,
        raw: &RawRow,
        column_map: &ColumnMap,
    ) -> RowOutcome {
        let normalized = normalize_row(raw);
        let mapped = column_map.map_row(&normalized);
        let mapped_json = serde_json::to_value(&mapped).unwrap_or_default();

        let validated = match validate_row(entity, &mapped) {
            Ok(validated) => validated,
            Err(field_errors) => {
                return RowOutcome::error(join_errors(&field_errors), mapped_json);
            }
        };
        let mapped_json = validated.to_json();

        match self
            .write_row(organization_id, entity, job_id, &validated)
            .await
        {
            Ok((status, entity_id)) => RowOutcome {
                status,
                entity_id: Some(entity_id),
                error: None,
                mapped: mapped_json,
            },
            Err(err) => RowOutcome::error(err.to_string(), mapped_json),
        }
    }

    /// Resolve and write one validated row. The returned error is
    /// row-scoped; the caller records it and moves on.
    async fn write_row(
        &self,
        organization_id: Uuid,
        entity: EntityType,
        job_id: Uuid,
        validated: &ValidatedRow,
    ) -> Result<(ImportRowStatus, Uuid), anyhow::Error> {
        let matched = self
            .dedup
            .resolve(organization_id, entity, validated)
            .await?;

        match matched {
            Some(entity_id) => {
                self.capture_pre_update(job_id, entity, entity_id).await?;
                self.update_entity(entity, entity_id, validated).await?;
                Ok((ImportRowStatus::Updated, entity_id))
            }
            None => {
                let entity_id = self
                    .insert_entity(organization_id, entity, validated)
                    .await?;
                self.snapshots
                    .record_insert(job_id, entity.as_str(), entity_id)
                    .await?;
                Ok((ImportRowStatus::Inserted, entity_id))
            }
        }
    }

    /// Capture the entity's current state before it is updated.
    async fn capture_pre_update(
        &self,
        job_id: Uuid,
        entity: EntityType,
        entity_id: Uuid,
    ) -> Result<(), anyhow::Error> {
        let previous = match entity {
            EntityType::Member => self
                .members
                .find_by_id(entity_id)
                .await?
                .map(|m| serde_json::to_value(m))
                .transpose()?,
            EntityType::Advisor => self
                .advisors
                .find_by_id(entity_id)
                .await?
                .map(|a| serde_json::to_value(a))
                .transpose()?,
            EntityType::Lead => self
                .leads
                .find_by_id(entity_id)
                .await?
                .map(|l| serde_json::to_value(l))
                .transpose()?,
        };

        let previous = previous.context("matched entity vanished before snapshot")?;
        self.snapshots
            .record_update(job_id, entity.as_str(), entity_id, &previous)
            .await?;
        Ok(())
    }

    async fn insert_entity(
        &self,
        organization_id: Uuid,
        entity: EntityType,
        validated: &ValidatedRow,
    ) -> Result<Uuid, sqlx::Error> {
        match entity {
            EntityType::Member => {
                let record = MemberRecord::from_validated(validated);
                Ok(self.members.insert(organization_id, &record).await?.id)
            }
            EntityType::Advisor => {
                let record = AdvisorRecord::from_validated(validated);
                Ok(self.advisors.insert(organization_id, &record).await?.id)
            }
            EntityType::Lead => {
                let record = LeadRecord::from_validated(validated);
                Ok(self.leads.insert(organization_id, &record).await?.id)
            }
        }
    }

    async fn update_entity(
        &self,
        entity: EntityType,
        entity_id: Uuid,
        validated: &ValidatedRow,
    ) -> Result<(), sqlx::Error> {
        match entity {
            EntityType::Member => {
                let record = MemberRecord::from_validated(validated);
                self.members.update(entity_id, &record).await?;
            }
            EntityType::Advisor => {
                let record = AdvisorRecord::from_validated(validated);
                self.advisors.update(entity_id, &record).await?;
            }
            EntityType::Lead => {
                let record = LeadRecord::from_validated(validated);
                self.leads.update(entity_id, &record).await?;
            }
        }
        Ok(())
    }
}

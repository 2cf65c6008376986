//! Job rollback from captured snapshots.
//!
//! The executor captures a snapshot entry for every write it makes:
//! inserted entities by id, updated entities with their full pre-update
//! state. Rollback reverses unrestored entries newest-first, one at a
//! time, reporting per-entry failures without stopping, mirroring the
//! executor's row-level isolation. Entries are
//! marked restored as they are reversed, which makes a second rollback of
//! the same job a no-op.

use domain::models::EntityType;
use persistence::entities::SnapshotEntryEntity;
use persistence::repositories::{
    AdvisorRepository, ImportJobRepository, LeadRepository, MemberRepository, SnapshotRepository,
};
use serde::Serialize;
use sqlx::PgPool;
use uuid::Uuid;

/// One entity that could not be restored.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RollbackFailure {
    pub entity_id: Uuid,
    pub message: String,
}

/// Result of a rollback run.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RollbackReport {
    /// Entries reversed in this run. Zero for an already-rolled-back job.
    pub reversed: u32,
    pub failures: Vec<RollbackFailure>,
}

/// Reverses the net effect of an import job.
#[derive(Clone)]
pub struct SnapshotManager {
    snapshots: SnapshotRepository,
    jobs: ImportJobRepository,
    members: MemberRepository,
    advisors: AdvisorRepository,
    leads: LeadRepository,
}

impl SnapshotManager {
    pub fn new(pool: PgPool) -> Self {
        Self {
            snapshots: SnapshotRepository::new(pool.clone()),
            jobs: ImportJobRepository::new(pool.clone()),
            members: MemberRepository::new(pool.clone()),
            advisors: AdvisorRepository::new(pool.clone()),
            leads: LeadRepository::new(pool),
        }
    }

    /// Roll back everything the job changed that has not been reversed yet.
    pub async fn rollback(&self, job_id: Uuid) -> Result<RollbackReport, anyhow::Error> {
        let entries = self.snapshots.list_unrestored(job_id).await?;
        let mut reversed = 0u32;
        let mut failures = Vec::new();

        for entry in &entries {
            match self.reverse_entry(entry).await {
                Ok(()) => {
                    self.snapshots.mark_restored(entry.id).await?;
                    reversed += 1;
                }
                Err(err) => {
                    tracing::warn!(
                        job_id = %job_id,
                        entity_id = %entry.entity_id,
                        error = %err,
                        "Failed to restore entity during rollback"
                    );
                    failures.push(RollbackFailure {
                        entity_id: entry.entity_id,
                        message: err.to_string(),
                    });
                }
            }
        }

        self.jobs.mark_rolled_back(job_id).await?;

        tracing::info!(
            job_id = %job_id,
            reversed = reversed,
            failures = failures.len(),
            "Rollback finished"
        );

        Ok(RollbackReport { reversed, failures })
    }

    async fn reverse_entry(&self, entry: &SnapshotEntryEntity) -> Result<(), anyhow::Error> {
        let entity = EntityType::parse(&entry.entity_type)
            .ok_or_else(|| anyhow::anyhow!("unknown entity type: {}", entry.entity_type))?;

        match entry.operation.as_str() {
            "inserted" => self.delete_entity(entity, entry.entity_id).await,
            "updated" => {
                let previous = entry
                    .previous_values
                    .clone()
                    .ok_or_else(|| anyhow::anyhow!("update entry has no previous values"))?;
                self.restore_entity(entity, previous).await
            }
            other => Err(anyhow::anyhow!("unknown snapshot operation: {}", other)),
        }
    }

    async fn delete_entity(&self, entity: EntityType, entity_id: Uuid) -> Result<(), anyhow::Error> {
        let deleted = match entity {
            EntityType::Member => self.members.delete(entity_id).await?,
            EntityType::Advisor => self.advisors.delete(entity_id).await?,
            EntityType::Lead => self.leads.delete(entity_id).await?,
        };
        if !deleted {
            // Already gone; deleting it was the goal, so not a failure.
            tracing::debug!(entity_id = %entity_id, "Inserted entity already removed");
        }
        Ok(())
    }

    async fn restore_entity(
        &self,
        entity: EntityType,
        previous: serde_json::Value,
    ) -> Result<(), anyhow::Error> {
        match entity {
            EntityType::Member => {
                let snapshot = serde_json::from_value(previous)?;
                self.members.restore(&snapshot).await?;
            }
            EntityType::Advisor => {
                let snapshot = serde_json::from_value(previous)?;
                self.advisors.restore(&snapshot).await?;
            }
            EntityType::Lead => {
                let snapshot = serde_json::from_value(previous)?;
                self.leads.restore(&snapshot).await?;
            }
        }
        Ok(())
    }
}

//! Review workflow for staged vendor changes.
//!
//! Reviewing transitions a `pending` change to approved, rejected, or
//! ignored. Applying writes an `approved` change's new value into the
//! canonical record and marks it `applied`. Both transitions are guarded
//! in the repository by the expected current status, so applying an
//! already-applied change is a no-op rather than a second write.

use domain::models::field::names;
use domain::models::{ChangeStatus, ChangeType, EntityType, MemberRecord, ReviewAction};
use domain::services::mapper::MappedRow;
use domain::services::validator::validate_row;
use persistence::entities::VendorChangeEntity;
use persistence::repositories::{MemberRepository, VendorChangeRepository};
use sqlx::PgPool;
use std::collections::BTreeSet;
use uuid::Uuid;

/// Outcome of an apply attempt.
#[derive(Debug)]
pub enum ApplyOutcome {
    /// The change was written and is now `applied`.
    Applied(VendorChangeEntity),
    /// The change was already `applied`; nothing was written.
    AlreadyApplied,
    /// The change exists but is not `approved`.
    NotApproved(ChangeStatus),
    /// No such change.
    NotFound,
}

/// Outcome of a bulk review: which ids transitioned and which were not
/// pending anymore.
#[derive(Debug, Default)]
pub struct BulkReviewOutcome {
    pub updated: Vec<Uuid>,
    pub skipped: Vec<Uuid>,
}

/// Applies reviewer decisions to staged changes.
#[derive(Clone)]
pub struct ReviewService {
    changes: VendorChangeRepository,
    members: MemberRepository,
}

impl ReviewService {
    pub fn new(pool: PgPool) -> Self {
        Self {
            changes: VendorChangeRepository::new(pool.clone()),
            members: MemberRepository::new(pool),
        }
    }

    /// Transition one pending change. Returns `None` when the change does
    /// not exist or is no longer pending.
    pub async fn review_change(
        &self,
        change_id: Uuid,
        action: ReviewAction,
        reviewer_id: Option<Uuid>,
    ) -> Result<Option<VendorChangeEntity>, sqlx::Error> {
        self.changes
            .review(change_id, action.resulting_status().as_str(), reviewer_id)
            .await
    }

    /// Transition a batch of pending changes with one action. Each change
    /// is handled independently; non-pending ids are reported as skipped.
    pub async fn bulk_review(
        &self,
        change_ids: &[Uuid],
        action: ReviewAction,
        reviewer_id: Option<Uuid>,
    ) -> Result<BulkReviewOutcome, sqlx::Error> {
        let mut outcome = BulkReviewOutcome::default();
        for change_id in change_ids {
            match self.review_change(*change_id, action, reviewer_id).await? {
                Some(_) => outcome.updated.push(*change_id),
                None => outcome.skipped.push(*change_id),
            }
        }
        Ok(outcome)
    }

    /// Write an approved change into the canonical record, exactly once.
    pub async fn apply_change(&self, change_id: Uuid) -> Result<ApplyOutcome, anyhow::Error> {
        let change = match self.changes.find_by_id(change_id).await? {
            Some(change) => change,
            None => return Ok(ApplyOutcome::NotFound),
        };

        match ChangeStatus::parse(&change.status) {
            Some(ChangeStatus::Applied) => return Ok(ApplyOutcome::AlreadyApplied),
            Some(ChangeStatus::Approved) => {}
            Some(other) => return Ok(ApplyOutcome::NotApproved(other)),
            None => anyhow::bail!("change has unknown status: {}", change.status),
        }

        if change.entity_type != EntityType::Member.as_str() {
            anyhow::bail!("unsupported entity type for apply: {}", change.entity_type);
        }

        self.write_back(&change).await?;

        // The guard means a racing second apply finds `applied` and writes
        // nothing.
        self.changes.mark_applied(change.id).await?;
        let applied = self
            .changes
            .find_by_id(change.id)
            .await?
            .unwrap_or(change);

        tracing::info!(
            change_id = %applied.id,
            change_type = %applied.change_type,
            "Vendor change applied"
        );

        Ok(ApplyOutcome::Applied(applied))
    }

    async fn write_back(&self, change: &VendorChangeEntity) -> Result<(), anyhow::Error> {
        let change_type = ChangeType::parse(&change.change_type)
            .ok_or_else(|| anyhow::anyhow!("unknown change type: {}", change.change_type))?;

        match change_type {
            ChangeType::NewEnrollment => self.create_member(change).await,
            ChangeType::Termination => {
                let entity_id = required_entity_id(change)?;
                self.members
                    .apply_field(entity_id, names::STATUS, Some("terminated"))
                    .await?;
                Ok(())
            }
            ChangeType::DependentAdd | ChangeType::DependentRemove => {
                self.adjust_dependents(change, change_type).await
            }
            _ => {
                let entity_id = required_entity_id(change)?;
                let field = change
                    .field_changed
                    .as_deref()
                    .ok_or_else(|| anyhow::anyhow!("field-level change has no field name"))?;
                self.members
                    .apply_field(entity_id, field, change.new_value.as_deref())
                    .await?;
                Ok(())
            }
        }
    }

    /// A new-enrollment proposal carries the mapped row; approving it is
    /// what creates the member.
    async fn create_member(&self, change: &VendorChangeEntity) -> Result<(), anyhow::Error> {
        let payload = change
            .new_value
            .as_deref()
            .ok_or_else(|| anyhow::anyhow!("new enrollment change has no row payload"))?;
        let mapped: MappedRow = serde_json::from_str(payload)?;

        let validated = validate_row(EntityType::Member, &mapped)
            .map_err(|errors| anyhow::anyhow!("invalid enrollment payload: {:?}", errors))?;
        let record = MemberRecord::from_validated(&validated);
        self.members.insert(change.organization_id, &record).await?;
        Ok(())
    }

    async fn adjust_dependents(
        &self,
        change: &VendorChangeEntity,
        change_type: ChangeType,
    ) -> Result<(), anyhow::Error> {
        let entity_id = required_entity_id(change)?;
        let member = self
            .members
            .find_by_id(entity_id)
            .await?
            .ok_or_else(|| anyhow::anyhow!("member not found: {}", entity_id))?;

        let mut dependents: BTreeSet<String> = member
            .dependents
            .as_deref()
            .unwrap_or_default()
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(String::from)
            .collect();

        match change_type {
            ChangeType::DependentAdd => {
                if let Some(name) = change.new_value.as_deref() {
                    dependents.insert(name.to_string());
                }
            }
            ChangeType::DependentRemove => {
                if let Some(name) = change.old_value.as_deref() {
                    dependents.remove(name);
                }
            }
            _ => unreachable!("adjust_dependents only handles dependent changes"),
        }

        let joined = dependents.into_iter().collect::<Vec<_>>().join(", ");
        self.members
            .apply_field(entity_id, names::DEPENDENTS, Some(&joined))
            .await?;
        Ok(())
    }
}

fn required_entity_id(change: &VendorChangeEntity) -> Result<Uuid, anyhow::Error> {
    change
        .entity_id
        .ok_or_else(|| anyhow::anyhow!("change has no entity id"))
}

//! Vendor feed processing.
//!
//! Vendor feeds describe members. With change detection on (the default),
//! matched rows are diffed against the current record and the differences
//! staged as pending change proposals; nothing is written to the
//! canonical tables. With change detection off, rows are imported
//! directly under the feed's duplicate-handling strategy.

use anyhow::Context;
use domain::models::{
    DuplicateStrategy, EntityType, ImportRowError, MemberRecord, VendorFeedRequest,
    VendorFileStatus, VendorFileSummary, VendorFileType,
};
use domain::services::change_detect::{detect_changes, is_termination_marker, SeverityPolicy};
use domain::services::mapper::ColumnMap;
use domain::services::normalizer::normalize_row;
use domain::services::validator::{join_errors, validate_row};
use persistence::entities::{VendorChangeEntity, VendorFileEntity};
use persistence::repositories::{
    MemberRepository, NewVendorChange, VendorChangeRepository, VendorFileCounts,
    VendorFileRepository,
};
use sqlx::PgPool;
use uuid::Uuid;

use super::dedup::DedupResolver;
use super::parser;

/// Everything a vendor feed run produced.
pub struct VendorFeedOutcome {
    pub file: VendorFileEntity,
    pub summary: VendorFileSummary,
    pub changes: Vec<VendorChangeEntity>,
    pub errors: Vec<ImportRowError>,
}

/// Processes recurring vendor feeds.
#[derive(Clone)]
pub struct VendorFeedProcessor {
    files: VendorFileRepository,
    changes: VendorChangeRepository,
    members: MemberRepository,
    dedup: DedupResolver,
}

impl VendorFeedProcessor {
    pub fn new(pool: PgPool) -> Self {
        Self {
            files: VendorFileRepository::new(pool.clone()),
            changes: VendorChangeRepository::new(pool.clone()),
            members: MemberRepository::new(pool.clone()),
            dedup: DedupResolver::new(pool),
        }
    }

    /// Process one vendor feed to completion.
    pub async fn run(
        &self,
        organization_id: Uuid,
        vendor_id: Uuid,
        request: &VendorFeedRequest,
    ) -> Result<VendorFeedOutcome, anyhow::Error> {
        let raw_rows = parser::rows_from_json(&request.rows);

        let file = self
            .files
            .create(
                organization_id,
                vendor_id,
                request.file_type.as_str(),
                &request.file_format,
                request.source_file.as_deref(),
                request.duplicate_strategy.as_str(),
                request.change_detection,
                raw_rows.len() as i32,
            )
            .await
            .context("failed to create vendor file")?;
        self.files.mark_processing(file.id).await?;

        tracing::info!(
            file_id = %file.id,
            vendor_id = %vendor_id,
            file_type = %request.file_type,
            rows = raw_rows.len(),
            change_detection = request.change_detection,
            "Vendor feed started"
        );

        let column_map = ColumnMap::for_vendor_file(request.file_type);
        let mut policy = SeverityPolicy::new();
        for (change_type, severity) in &request.severity_overrides {
            policy = policy.with_override(*change_type, *severity);
        }

        let mut counts = VendorFileCounts::default();
        let mut errors = Vec::new();
        let mut created_changes = Vec::new();

        for (index, raw) in raw_rows.iter().enumerate() {
            counts.processed += 1;

            let normalized = normalize_row(raw);
            let mapped = column_map.map_row(&normalized);
            let validated = match validate_row(EntityType::Member, &mapped) {
                Ok(validated) => validated,
                Err(field_errors) => {
                    counts.errored += 1;
                    errors.push(ImportRowError {
                        row_index: index,
                        message: join_errors(&field_errors),
                    });
                    continue;
                }
            };

            let row_result = if request.change_detection {
                self.detect_row(
                    organization_id,
                    vendor_id,
                    file.id,
                    request.file_type,
                    &validated,
                    &policy,
                    &mut counts,
                    &mut created_changes,
                )
                .await
            } else {
                self.import_row(
                    organization_id,
                    request.duplicate_strategy,
                    &validated,
                    &mut counts,
                )
                .await
            };

            match row_result {
                Ok(()) => counts.valid += 1,
                Err(err) => {
                    counts.errored += 1;
                    errors.push(ImportRowError {
                        row_index: index,
                        message: err.to_string(),
                    });
                }
            }
        }

        let status = terminal_status(raw_rows.len() as i32, counts.errored);
        self.files.finish(file.id, status.as_str(), counts).await?;
        let file = self
            .files
            .find_by_id(organization_id, file.id)
            .await?
            .context("vendor file vanished after processing")?;

        tracing::info!(
            file_id = %file.id,
            status = %status,
            staged_changes = created_changes.len(),
            errored = counts.errored,
            "Vendor feed finished"
        );

        Ok(VendorFeedOutcome {
            file,
            summary: VendorFileSummary {
                total_rows: raw_rows.len() as u32,
                processed_rows: counts.processed as u32,
                valid_rows: counts.valid as u32,
                error_rows: counts.errored as u32,
                new_records: counts.new_records as u32,
                updated_records: counts.updated_records as u32,
            },
            changes: created_changes,
            errors,
        })
    }

    /// Change-detection path: diff and stage, never write.
    #[allow(clippy::too_many_arguments)]
    async fn detect_row(
        &self,
        organization_id: Uuid,
        vendor_id: Uuid,
        file_id: Uuid,
        file_type: VendorFileType,
        validated: &domain::models::ValidatedRow,
        policy: &SeverityPolicy,
        counts: &mut VendorFileCounts,
        created: &mut Vec<VendorChangeEntity>,
    ) -> Result<(), anyhow::Error> {
        let matched = self
            .dedup
            .resolve(organization_id, EntityType::Member, validated)
            .await?;

        let current = match matched {
            Some(id) => {
                let member = self
                    .members
                    .find_by_id(id)
                    .await?
                    .context("matched member vanished before diff")?;
                Some((id, member.comparable_fields()))
            }
            None => None,
        };

        // A termination file flags every row as a termination notice even
        // when the row itself carries no marker.
        let termination = file_type == VendorFileType::Termination
            || is_termination_marker(validated);

        let detected = detect_changes(
            current.as_ref().map(|(_, fields)| fields),
            validated,
            policy,
            termination,
        );

        let is_new = current.is_none() && !detected.is_empty();
        if is_new {
            counts.new_records += 1;
        } else if !detected.is_empty() {
            counts.updated_records += 1;
        }

        for change in detected {
            let entity = self
                .changes
                .create(&NewVendorChange {
                    organization_id,
                    vendor_id,
                    vendor_file_id: file_id,
                    change_type: change.change_type.as_str(),
                    entity_type: EntityType::Member.as_str(),
                    entity_id: current.as_ref().map(|(id, _)| *id),
                    field_changed: change.field_changed,
                    old_value: change.old_value,
                    new_value: change.new_value,
                    severity: change.severity.as_str(),
                })
                .await?;
            created.push(entity);
        }

        Ok(())
    }

    /// Direct-import path for feeds with change detection off.
    async fn import_row(
        &self,
        organization_id: Uuid,
        strategy: DuplicateStrategy,
        validated: &domain::models::ValidatedRow,
        counts: &mut VendorFileCounts,
    ) -> Result<(), anyhow::Error> {
        let matched = self
            .dedup
            .resolve(organization_id, EntityType::Member, validated)
            .await?;
        let record = MemberRecord::from_validated(validated);

        match matched {
            Some(id) => match strategy {
                DuplicateStrategy::Update => {
                    self.members.update(id, &record).await?;
                    counts.updated_records += 1;
                    Ok(())
                }
                DuplicateStrategy::Skip => Ok(()),
                DuplicateStrategy::Error => Err(anyhow::anyhow!(
                    "row matches existing member and duplicate strategy is 'error'"
                )),
            },
            None => {
                self.members.insert(organization_id, &record).await?;
                counts.new_records += 1;
                Ok(())
            }
        }
    }
}

/// Terminal file status from the error tally.
fn terminal_status(total: i32, errored: i32) -> VendorFileStatus {
    if errored == 0 {
        VendorFileStatus::Completed
    } else if errored >= total {
        VendorFileStatus::Failed
    } else {
        VendorFileStatus::PartiallyCompleted
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_terminal_status_all_clean() {
        assert_eq!(terminal_status(10, 0), VendorFileStatus::Completed);
    }

    #[test]
    fn test_terminal_status_partial() {
        assert_eq!(terminal_status(10, 3), VendorFileStatus::PartiallyCompleted);
    }

    #[test]
    fn test_terminal_status_all_failed() {
        assert_eq!(terminal_status(10, 10), VendorFileStatus::Failed);
    }
}

//! Vendor change review route handlers.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use shared::pagination::{PageInfo, PageParams};
use uuid::Uuid;
use validator::Validate;

use domain::models::vendor_change::ReviewRequest;
use domain::models::{BulkReviewRequest, ChangeStatus};
use persistence::entities::VendorChangeEntity;
use persistence::repositories::VendorChangeRepository;

use crate::app::AppState;
use crate::error::ApiError;
use crate::services::{ApplyOutcome, ReviewService};

/// Routes nested under /organizations/:org_id/vendor-changes.
pub fn org_router() -> Router<AppState> {
    Router::new().route("/", get(list_changes))
}

/// Routes nested under /vendor-changes.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/:change_id/review", post(review_change))
        .route("/:change_id/apply", post(apply_change))
        .route("/bulk-review", post(bulk_review))
}

/// One staged change, as returned to reviewers.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VendorChangeResponse {
    pub id: Uuid,
    pub vendor_id: Uuid,
    pub vendor_file_id: Uuid,
    pub change_type: String,
    pub entity_type: String,
    pub entity_id: Option<Uuid>,
    pub field_changed: Option<String>,
    pub old_value: Option<String>,
    pub new_value: Option<String>,
    pub severity: String,
    pub status: String,
    pub detected_at: DateTime<Utc>,
    pub reviewed_by: Option<Uuid>,
    pub reviewed_at: Option<DateTime<Utc>>,
}

impl From<VendorChangeEntity> for VendorChangeResponse {
    fn from(change: VendorChangeEntity) -> Self {
        Self {
            id: change.id,
            vendor_id: change.vendor_id,
            vendor_file_id: change.vendor_file_id,
            change_type: change.change_type,
            entity_type: change.entity_type,
            entity_id: change.entity_id,
            field_changed: change.field_changed,
            old_value: change.old_value,
            new_value: change.new_value,
            severity: change.severity,
            status: change.status,
            detected_at: change.detected_at,
            reviewed_by: change.reviewed_by,
            reviewed_at: change.reviewed_at,
        }
    }
}

// Query-string extraction does not support flattened numeric fields, so
// the paging fields are spelled out here.
#[derive(Debug, Deserialize)]
struct ListParams {
    status: Option<String>,
    page: Option<u32>,
    per_page: Option<u32>,
}

impl ListParams {
    fn page_params(&self) -> PageParams {
        let defaults = PageParams::default();
        PageParams {
            page: self.page.unwrap_or(defaults.page),
            per_page: self.per_page.unwrap_or(defaults.per_page),
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ChangeListResponse {
    changes: Vec<VendorChangeResponse>,
    page: PageInfo,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct BulkReviewResponse {
    updated: Vec<Uuid>,
    skipped: Vec<Uuid>,
}

/// List an organization's staged changes, optionally filtered by status.
///
/// GET /api/v1/organizations/{org_id}/vendor-changes
async fn list_changes(
    State(state): State<AppState>,
    Path(org_id): Path<Uuid>,
    Query(params): Query<ListParams>,
) -> Result<Json<ChangeListResponse>, ApiError> {
    if let Some(status) = params.status.as_deref() {
        if ChangeStatus::parse(status).is_none() {
            return Err(ApiError::Validation(format!(
                "unknown change status: {}",
                status
            )));
        }
    }

    let page = params.page_params();
    let repo = VendorChangeRepository::new(state.pool.clone());
    let changes = repo
        .list_by_org(org_id, params.status.as_deref(), page.limit(), page.offset())
        .await?;
    let total = repo.count_by_org(org_id, params.status.as_deref()).await?;

    Ok(Json(ChangeListResponse {
        changes: changes.into_iter().map(Into::into).collect(),
        page: PageInfo::new(&page, total),
    }))
}

/// Review one pending change.
///
/// POST /api/v1/vendor-changes/{change_id}/review
async fn review_change(
    State(state): State<AppState>,
    Path(change_id): Path<Uuid>,
    Json(request): Json<ReviewRequest>,
) -> Result<Json<VendorChangeResponse>, ApiError> {
    let service = ReviewService::new(state.pool.clone());
    let reviewed = service
        .review_change(change_id, request.action, request.reviewer_id)
        .await?;

    match reviewed {
        Some(change) => Ok(Json(change.into())),
        None => {
            // Distinguish missing from already-reviewed for the caller.
            let exists = VendorChangeRepository::new(state.pool.clone())
                .find_by_id(change_id)
                .await?;
            match exists {
                Some(change) => Err(ApiError::Conflict(format!(
                    "change is not pending (status: {})",
                    change.status
                ))),
                None => Err(ApiError::NotFound(format!(
                    "Vendor change not found: {}",
                    change_id
                ))),
            }
        }
    }
}

/// Review a batch of pending changes with one action.
///
/// POST /api/v1/vendor-changes/bulk-review
async fn bulk_review(
    State(state): State<AppState>,
    Json(request): Json<BulkReviewRequest>,
) -> Result<Json<BulkReviewResponse>, ApiError> {
    request
        .validate()
        .map_err(|e| ApiError::Validation(e.to_string()))?;

    let service = ReviewService::new(state.pool.clone());
    let outcome = service
        .bulk_review(&request.change_ids, request.action, request.reviewer_id)
        .await?;

    Ok(Json(BulkReviewResponse {
        updated: outcome.updated,
        skipped: outcome.skipped,
    }))
}

/// Apply an approved change to the canonical record, exactly once.
///
/// POST /api/v1/vendor-changes/{change_id}/apply
async fn apply_change(
    State(state): State<AppState>,
    Path(change_id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let service = ReviewService::new(state.pool.clone());

    match service.apply_change(change_id).await? {
        ApplyOutcome::Applied(change) => {
            Ok((StatusCode::OK, Json(VendorChangeResponse::from(change))).into_response())
        }
        ApplyOutcome::AlreadyApplied => Ok(StatusCode::NO_CONTENT.into_response()),
        ApplyOutcome::NotApproved(status) => Err(ApiError::Conflict(format!(
            "change is not approved (status: {})",
            status
        ))),
        ApplyOutcome::NotFound => Err(ApiError::NotFound(format!(
            "Vendor change not found: {}",
            change_id
        ))),
    }
}

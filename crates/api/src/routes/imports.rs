//! Direct bulk import route handlers.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use chrono::{DateTime, Utc};
use serde::Serialize;
use shared::pagination::{PageInfo, PageParams};
use uuid::Uuid;
use validator::Validate;

use domain::models::{ImportRequest, ImportResult};
use persistence::entities::{ImportJobEntity, ImportRowEntity};
use persistence::repositories::{ImportJobRepository, ImportRowRepository, OrganizationRepository};

use crate::app::AppState;
use crate::error::ApiError;
use crate::services::{ImportExecutor, SnapshotManager};

/// Create import routes, nested under /organizations/:org_id/imports.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", post(submit_import))
        .route("/:job_id", get(get_job))
        .route("/:job_id/rows", get(list_job_rows))
        .route("/:job_id/rollback", post(rollback_job))
}

/// Response for a completed import submission.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ImportResponse {
    job_id: Uuid,
    status: String,
    #[serde(flatten)]
    result: ImportResult,
}

/// Job detail response.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct JobResponse {
    id: Uuid,
    entity_type: String,
    source_file: Option<String>,
    status: String,
    total_rows: i32,
    inserted_rows: i32,
    updated_rows: i32,
    skipped_rows: i32,
    errored_rows: i32,
    error_message: Option<String>,
    created_at: DateTime<Utc>,
    completed_at: Option<DateTime<Utc>>,
    rolled_back_at: Option<DateTime<Utc>>,
}

impl From<ImportJobEntity> for JobResponse {
    fn from(job: ImportJobEntity) -> Self {
        Self {
            id: job.id,
            entity_type: job.entity_type,
            source_file: job.source_file,
            status: job.status,
            total_rows: job.total_rows,
            inserted_rows: job.inserted_rows,
            updated_rows: job.updated_rows,
            skipped_rows: job.skipped_rows,
            errored_rows: job.errored_rows,
            error_message: job.error_message,
            created_at: job.created_at,
            completed_at: job.completed_at,
            rolled_back_at: job.rolled_back_at,
        }
    }
}

/// Audit row response.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct JobRowResponse {
    row_index: i32,
    raw: serde_json::Value,
    mapped: serde_json::Value,
    status: String,
    error_message: Option<String>,
    entity_id: Option<Uuid>,
    processed_at: DateTime<Utc>,
}

impl From<ImportRowEntity> for JobRowResponse {
    fn from(row: ImportRowEntity) -> Self {
        Self {
            row_index: row.row_index,
            raw: row.raw,
            mapped: row.mapped,
            status: row.status,
            error_message: row.error_message,
            entity_id: row.entity_id,
            processed_at: row.processed_at,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct JobRowsResponse {
    rows: Vec<JobRowResponse>,
    page: PageInfo,
}

/// Submit rows for a direct import.
///
/// POST /api/v1/organizations/{org_id}/imports
async fn submit_import(
    State(state): State<AppState>,
    Path(org_id): Path<Uuid>,
    Json(request): Json<ImportRequest>,
) -> Result<impl IntoResponse, ApiError> {
    request
        .validate()
        .map_err(|e| ApiError::Validation(e.to_string()))?;
    require_organization(&state, org_id).await?;

    let executor = ImportExecutor::new(state.pool.clone());
    let (job, result) = executor.run(org_id, &request).await?;

    Ok((
        StatusCode::OK,
        Json(ImportResponse {
            job_id: job.id,
            status: "completed".to_string(),
            result,
        }),
    ))
}

/// Fetch a job with its aggregated counts.
///
/// GET /api/v1/organizations/{org_id}/imports/{job_id}
async fn get_job(
    State(state): State<AppState>,
    Path((org_id, job_id)): Path<(Uuid, Uuid)>,
) -> Result<Json<JobResponse>, ApiError> {
    let job = ImportJobRepository::new(state.pool.clone())
        .find_by_id(org_id, job_id)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("Import job not found: {}", job_id)))?;

    Ok(Json(job.into()))
}

/// List a job's audit rows in source order.
///
/// GET /api/v1/organizations/{org_id}/imports/{job_id}/rows
async fn list_job_rows(
    State(state): State<AppState>,
    Path((org_id, job_id)): Path<(Uuid, Uuid)>,
    Query(params): Query<PageParams>,
) -> Result<Json<JobRowsResponse>, ApiError> {
    let jobs = ImportJobRepository::new(state.pool.clone());
    jobs.find_by_id(org_id, job_id)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("Import job not found: {}", job_id)))?;

    let rows_repo = ImportRowRepository::new(state.pool.clone());
    let rows = rows_repo
        .list_by_job(job_id, params.limit(), params.offset())
        .await?;
    let total = rows_repo.count_by_job(job_id).await?;

    Ok(Json(JobRowsResponse {
        rows: rows.into_iter().map(Into::into).collect(),
        page: PageInfo::new(&params, total),
    }))
}

/// Reverse a job's net effect.
///
/// POST /api/v1/organizations/{org_id}/imports/{job_id}/rollback
async fn rollback_job(
    State(state): State<AppState>,
    Path((org_id, job_id)): Path<(Uuid, Uuid)>,
) -> Result<impl IntoResponse, ApiError> {
    ImportJobRepository::new(state.pool.clone())
        .find_by_id(org_id, job_id)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("Import job not found: {}", job_id)))?;

    let manager = SnapshotManager::new(state.pool.clone());
    let report = manager.rollback(job_id).await?;

    Ok((StatusCode::OK, Json(report)))
}

async fn require_organization(state: &AppState, org_id: Uuid) -> Result<(), ApiError> {
    OrganizationRepository::new(state.pool.clone())
        .find_by_id(org_id)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("Organization not found: {}", org_id)))?;
    Ok(())
}

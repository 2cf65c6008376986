//! Vendor feed route handlers.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use domain::models::{
    DuplicateStrategy, ImportRowError, VendorFeedRequest, VendorFileSummary, VendorFileType,
};
use persistence::entities::VendorFileEntity;
use persistence::repositories::{OrganizationRepository, VendorFileRepository, VendorRepository};

use crate::app::AppState;
use crate::error::ApiError;
use crate::routes::vendor_changes::VendorChangeResponse;
use crate::services::{parser, VendorFeedProcessor};

/// Routes nested under /organizations/:org_id/vendors/:vendor_id/files.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", post(submit_feed))
        .route("/csv", post(submit_feed_csv))
        .route("/:file_id", get(get_file))
}

/// Response for a processed vendor feed.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct VendorFeedResponse {
    file_id: Uuid,
    status: String,
    summary: VendorFileSummary,
    changes: Vec<VendorChangeResponse>,
    errors: Vec<ImportRowError>,
}

/// Vendor file detail response.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct VendorFileResponse {
    id: Uuid,
    vendor_id: Uuid,
    file_type: String,
    file_format: String,
    source_file: Option<String>,
    duplicate_strategy: String,
    change_detection: bool,
    status: String,
    total_rows: i32,
    processed_rows: i32,
    valid_rows: i32,
    error_rows: i32,
    new_records: i32,
    updated_records: i32,
    created_at: DateTime<Utc>,
    completed_at: Option<DateTime<Utc>>,
}

impl From<VendorFileEntity> for VendorFileResponse {
    fn from(file: VendorFileEntity) -> Self {
        Self {
            id: file.id,
            vendor_id: file.vendor_id,
            file_type: file.file_type,
            file_format: file.file_format,
            source_file: file.source_file,
            duplicate_strategy: file.duplicate_strategy,
            change_detection: file.change_detection,
            status: file.status,
            total_rows: file.total_rows,
            processed_rows: file.processed_rows,
            valid_rows: file.valid_rows,
            error_rows: file.error_rows,
            new_records: file.new_records,
            updated_records: file.updated_records,
            created_at: file.created_at,
            completed_at: file.completed_at,
        }
    }
}

/// Query parameters for the CSV submission endpoint; the body is the file.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CsvFeedParams {
    file_type: VendorFileType,
    source_file: Option<String>,
    #[serde(default)]
    duplicate_strategy: DuplicateStrategy,
    #[serde(default = "default_change_detection")]
    change_detection: bool,
}

fn default_change_detection() -> bool {
    true
}

/// Submit a vendor feed as JSON rows.
///
/// POST /api/v1/organizations/{org_id}/vendors/{vendor_id}/files
async fn submit_feed(
    State(state): State<AppState>,
    Path((org_id, vendor_id)): Path<(Uuid, Uuid)>,
    Json(request): Json<VendorFeedRequest>,
) -> Result<impl IntoResponse, ApiError> {
    request
        .validate()
        .map_err(|e| ApiError::Validation(e.to_string()))?;
    require_vendor(&state, org_id, vendor_id).await?;

    run_feed(&state, org_id, vendor_id, &request).await
}

/// Submit a vendor feed as a CSV body.
///
/// POST /api/v1/organizations/{org_id}/vendors/{vendor_id}/files/csv
async fn submit_feed_csv(
    State(state): State<AppState>,
    Path((org_id, vendor_id)): Path<(Uuid, Uuid)>,
    Query(params): Query<CsvFeedParams>,
    body: String,
) -> Result<impl IntoResponse, ApiError> {
    require_vendor(&state, org_id, vendor_id).await?;

    let rows = parser::rows_from_csv(&body)
        .map_err(|e| ApiError::Validation(format!("invalid CSV: {}", e)))?;
    if rows.is_empty() {
        return Err(ApiError::Validation("CSV contains no data rows".into()));
    }

    // Re-encode as the JSON row objects the processor consumes.
    let json_rows = rows
        .iter()
        .map(|row| {
            row.iter()
                .map(|(k, v)| (k.clone(), serde_json::Value::String(v.clone())))
                .collect()
        })
        .collect();

    let request = VendorFeedRequest {
        file_type: params.file_type,
        file_format: "csv".to_string(),
        source_file: params.source_file,
        duplicate_strategy: params.duplicate_strategy,
        change_detection: params.change_detection,
        severity_overrides: Default::default(),
        rows: json_rows,
    };

    run_feed(&state, org_id, vendor_id, &request).await
}

/// Fetch a vendor file's processing state.
///
/// GET /api/v1/organizations/{org_id}/vendors/{vendor_id}/files/{file_id}
async fn get_file(
    State(state): State<AppState>,
    Path((org_id, _vendor_id, file_id)): Path<(Uuid, Uuid, Uuid)>,
) -> Result<Json<VendorFileResponse>, ApiError> {
    let file = VendorFileRepository::new(state.pool.clone())
        .find_by_id(org_id, file_id)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("Vendor file not found: {}", file_id)))?;

    Ok(Json(file.into()))
}

async fn run_feed(
    state: &AppState,
    org_id: Uuid,
    vendor_id: Uuid,
    request: &VendorFeedRequest,
) -> Result<axum::response::Response, ApiError> {
    let processor = VendorFeedProcessor::new(state.pool.clone());
    let outcome = processor.run(org_id, vendor_id, request).await?;

    let response = VendorFeedResponse {
        file_id: outcome.file.id,
        status: outcome.file.status.clone(),
        summary: outcome.summary,
        changes: outcome.changes.into_iter().map(Into::into).collect(),
        errors: outcome.errors,
    };
    Ok((StatusCode::OK, Json(response)).into_response())
}

async fn require_vendor(
    state: &AppState,
    org_id: Uuid,
    vendor_id: Uuid,
) -> Result<(), ApiError> {
    OrganizationRepository::new(state.pool.clone())
        .find_by_id(org_id)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("Organization not found: {}", org_id)))?;
    VendorRepository::new(state.pool.clone())
        .find_by_id(org_id, vendor_id)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("Vendor not found: {}", vendor_id)))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_router_creation() {
        let _router: Router<AppState> = router();
    }

    #[test]
    fn test_csv_params_defaults() {
        let params: CsvFeedParams =
            serde_json::from_str(r#"{"fileType": "termination"}"#).unwrap();
        assert_eq!(params.file_type, VendorFileType::Termination);
        assert_eq!(params.duplicate_strategy, DuplicateStrategy::Update);
        assert!(params.change_detection);
    }
}

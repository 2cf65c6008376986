//! Integration tests for the direct bulk import pipeline.

mod common;

use axum::http::{Method, StatusCode};
use serde_json::json;
use tower::ServiceExt;

use common::{
    count_members, create_test_app, fetch_member, get_request, json_request, parse_response_body,
    seed_organization,
};

#[tokio::test]
async fn test_member_import_inserts_then_updates() {
    let (app, pool) = create_test_app().await;
    let org_id = seed_organization(&pool).await;

    let body = json!({
        "entityType": "member",
        "sourceFile": "roster.csv",
        "rows": [
            { "Member Number": "M-100", "First Name": "Jane", "Last Name": "Doe", "City": "Austin" },
            { "Member Number": "M-101", "First Name": "John", "Last Name": "Smith", "City": "Dallas" }
        ]
    });

    let response = app
        .clone()
        .oneshot(json_request(
            Method::POST,
            &format!("/api/v1/organizations/{}/imports", org_id),
            body.clone(),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let first = parse_response_body(response).await;
    assert_eq!(first["total"], 2);
    assert_eq!(first["inserted"], 2);
    assert_eq!(first["updated"], 0);
    assert_eq!(first["errors"].as_array().unwrap().len(), 0);
    assert_eq!(count_members(&pool, org_id).await, 2);

    // Importing the same file again resolves every row to an update: no
    // net duplicates on the second run.
    let response = app
        .clone()
        .oneshot(json_request(
            Method::POST,
            &format!("/api/v1/organizations/{}/imports", org_id),
            body,
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let second = parse_response_body(response).await;
    assert_eq!(second["inserted"], 0);
    assert_eq!(second["updated"], 2);
    assert_eq!(count_members(&pool, org_id).await, 2);
}

#[tokio::test]
async fn test_header_variants_map_to_same_field_and_email_is_lowercased() {
    let (app, pool) = create_test_app().await;
    let org_id = seed_organization(&pool).await;

    // One file spells the column "Email Address", the other "email"; both
    // land in the canonical email field, stored lower-cased.
    let body = json!({
        "entityType": "member",
        "rows": [
            { "Member Number": "M-200", "First Name": "Jane", "Last Name": "Doe", "Email Address": "JANE@X.COM" },
            { "Member Number": "M-201", "First Name": "Amy", "Last Name": "Poe", "email": "AMY@X.COM" }
        ]
    });

    let response = app
        .clone()
        .oneshot(json_request(
            Method::POST,
            &format!("/api/v1/organizations/{}/imports", org_id),
            body,
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let (_, _, email, _) = fetch_member(&pool, org_id, "M-200").await.unwrap();
    assert_eq!(email.as_deref(), Some("jane@x.com"));
    let (_, _, email, _) = fetch_member(&pool, org_id, "M-201").await.unwrap();
    assert_eq!(email.as_deref(), Some("amy@x.com"));
}

#[tokio::test]
async fn test_invalid_status_is_tolerated_with_default() {
    let (app, pool) = create_test_app().await;
    let org_id = seed_organization(&pool).await;

    let body = json!({
        "entityType": "member",
        "rows": [
            { "member_number": "M-300", "first_name": "Jane", "last_name": "Doe", "status": "foo" }
        ]
    });

    let response = app
        .clone()
        .oneshot(json_request(
            Method::POST,
            &format!("/api/v1/organizations/{}/imports", org_id),
            body,
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let result = parse_response_body(response).await;
    assert_eq!(result["inserted"], 1);
    assert_eq!(result["errors"].as_array().unwrap().len(), 0);

    let (_, status, _, _) = fetch_member(&pool, org_id, "M-300").await.unwrap();
    assert_eq!(status, "pending");
}

#[tokio::test]
async fn test_row_failure_does_not_abort_the_job() {
    let (app, pool) = create_test_app().await;
    let org_id = seed_organization(&pool).await;

    // Row 1 is missing the required last name; rows 0 and 2 are fine.
    let body = json!({
        "entityType": "member",
        "rows": [
            { "member_number": "M-400", "first_name": "Jane", "last_name": "Doe" },
            { "member_number": "M-401", "first_name": "Broken" },
            { "member_number": "M-402", "first_name": "John", "last_name": "Smith" }
        ]
    });

    let response = app
        .clone()
        .oneshot(json_request(
            Method::POST,
            &format!("/api/v1/organizations/{}/imports", org_id),
            body,
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let result = parse_response_body(response).await;

    assert_eq!(result["inserted"], 2);
    let errors = result["errors"].as_array().unwrap();
    assert_eq!(errors.len(), 1);
    assert_eq!(errors[0]["rowIndex"], 1);
    assert!(errors[0]["message"]
        .as_str()
        .unwrap()
        .contains("missing required field"));

    // The job record aggregates the same outcome.
    let job_id = result["jobId"].as_str().unwrap();
    let response = app
        .clone()
        .oneshot(get_request(&format!(
            "/api/v1/organizations/{}/imports/{}",
            org_id, job_id
        )))
        .await
        .unwrap();
    let job = parse_response_body(response).await;
    assert_eq!(job["status"], "completed");
    assert_eq!(job["insertedRows"], 2);
    assert_eq!(job["erroredRows"], 1);
}

#[tokio::test]
async fn test_audit_rows_preserve_source_order() {
    let (app, pool) = create_test_app().await;
    let org_id = seed_organization(&pool).await;

    let body = json!({
        "entityType": "lead",
        "rows": [
            { "email": "a@x.com" },
            { "email": "b@x.com" },
            { "email": "" },
            { "email": "d@x.com" }
        ]
    });

    let response = app
        .clone()
        .oneshot(json_request(
            Method::POST,
            &format!("/api/v1/organizations/{}/imports", org_id),
            body,
        ))
        .await
        .unwrap();
    let result = parse_response_body(response).await;
    let job_id = result["jobId"].as_str().unwrap().to_string();

    let response = app
        .clone()
        .oneshot(get_request(&format!(
            "/api/v1/organizations/{}/imports/{}/rows",
            org_id, job_id
        )))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = parse_response_body(response).await;
    let rows = body["rows"].as_array().unwrap();

    assert_eq!(rows.len(), 4);
    for (expected_index, row) in rows.iter().enumerate() {
        assert_eq!(row["rowIndex"], expected_index as i64);
    }
    // The empty-email row failed validation but still holds its position.
    assert_eq!(rows[2]["status"], "error");
    assert_eq!(rows[3]["status"], "inserted");
}

#[tokio::test]
async fn test_unknown_organization_is_not_found() {
    let (app, _pool) = create_test_app().await;

    let body = json!({
        "entityType": "member",
        "rows": [ { "first_name": "Jane", "last_name": "Doe" } ]
    });

    let response = app
        .clone()
        .oneshot(json_request(
            Method::POST,
            &format!("/api/v1/organizations/{}/imports", uuid::Uuid::new_v4()),
            body,
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_empty_rows_rejected() {
    let (app, pool) = create_test_app().await;
    let org_id = seed_organization(&pool).await;

    let body = json!({ "entityType": "member", "rows": [] });

    let response = app
        .clone()
        .oneshot(json_request(
            Method::POST,
            &format!("/api/v1/organizations/{}/imports", org_id),
            body,
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

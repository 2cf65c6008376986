//! Integration tests for job snapshots and rollback.

mod common;

use axum::http::{Method, StatusCode};
use serde_json::json;
use tower::ServiceExt;

use common::{
    count_members, create_test_app, empty_post_request, fetch_member, get_request, json_request,
    parse_response_body, seed_organization,
};

#[tokio::test]
async fn test_rollback_restores_updates_and_removes_inserts() {
    let (app, pool) = create_test_app().await;
    let org_id = seed_organization(&pool).await;
    let import_uri = format!("/api/v1/organizations/{}/imports", org_id);

    // Job 1: create the original member.
    let response = app
        .clone()
        .oneshot(json_request(
            Method::POST,
            &import_uri,
            json!({
                "entityType": "member",
                "rows": [{
                    "member_number": "M-700",
                    "first_name": "Jane",
                    "last_name": "Doe",
                    "city": "Austin"
                }]
            }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    // Job 2: update the existing member and insert a new one.
    let response = app
        .clone()
        .oneshot(json_request(
            Method::POST,
            &import_uri,
            json!({
                "entityType": "member",
                "rows": [
                    {
                        "member_number": "M-700",
                        "first_name": "Jane",
                        "last_name": "Doe",
                        "city": "Dallas"
                    },
                    {
                        "member_number": "M-701",
                        "first_name": "John",
                        "last_name": "Smith"
                    }
                ]
            }),
        ))
        .await
        .unwrap();
    let second = parse_response_body(response).await;
    assert_eq!(second["updated"], 1);
    assert_eq!(second["inserted"], 1);
    let job_id = second["jobId"].as_str().unwrap().to_string();

    let (_, _, _, city) = fetch_member(&pool, org_id, "M-700").await.unwrap();
    assert_eq!(city.as_deref(), Some("Dallas"));
    assert_eq!(count_members(&pool, org_id).await, 2);

    // Rolling back job 2 restores the update and deletes the insert.
    let response = app
        .clone()
        .oneshot(empty_post_request(&format!(
            "{}/{}/rollback",
            import_uri, job_id
        )))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let report = parse_response_body(response).await;
    assert_eq!(report["reversed"], 2);
    assert_eq!(report["failures"].as_array().unwrap().len(), 0);

    let (_, _, _, city) = fetch_member(&pool, org_id, "M-700").await.unwrap();
    assert_eq!(city.as_deref(), Some("Austin"));
    assert!(fetch_member(&pool, org_id, "M-701").await.is_none());
    assert_eq!(count_members(&pool, org_id).await, 1);

    // The job is stamped as rolled back.
    let response = app
        .clone()
        .oneshot(get_request(&format!("{}/{}", import_uri, job_id)))
        .await
        .unwrap();
    let job = parse_response_body(response).await;
    assert!(!job["rolledBackAt"].is_null());
}

#[tokio::test]
async fn test_rollback_is_idempotent() {
    let (app, pool) = create_test_app().await;
    let org_id = seed_organization(&pool).await;
    let import_uri = format!("/api/v1/organizations/{}/imports", org_id);

    let response = app
        .clone()
        .oneshot(json_request(
            Method::POST,
            &import_uri,
            json!({
                "entityType": "member",
                "rows": [{
                    "member_number": "M-710",
                    "first_name": "Jane",
                    "last_name": "Doe"
                }]
            }),
        ))
        .await
        .unwrap();
    let result = parse_response_body(response).await;
    let job_id = result["jobId"].as_str().unwrap().to_string();
    let rollback_uri = format!("{}/{}/rollback", import_uri, job_id);

    let response = app
        .clone()
        .oneshot(empty_post_request(&rollback_uri))
        .await
        .unwrap();
    let first = parse_response_body(response).await;
    assert_eq!(first["reversed"], 1);
    assert_eq!(count_members(&pool, org_id).await, 0);

    // A second rollback finds nothing left to reverse.
    let response = app
        .clone()
        .oneshot(empty_post_request(&rollback_uri))
        .await
        .unwrap();
    let second = parse_response_body(response).await;
    assert_eq!(second["reversed"], 0);
    assert_eq!(second["failures"].as_array().unwrap().len(), 0);
    assert_eq!(count_members(&pool, org_id).await, 0);
}

#[tokio::test]
async fn test_rollback_unknown_job_is_not_found() {
    let (app, pool) = create_test_app().await;
    let org_id = seed_organization(&pool).await;

    let response = app
        .clone()
        .oneshot(empty_post_request(&format!(
            "/api/v1/organizations/{}/imports/{}/rollback",
            org_id,
            uuid::Uuid::new_v4()
        )))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

//! Integration tests for request validation.
//!
//! All of these requests fail validation before any database access.

mod common;

use axum::http::{Method, StatusCode};
use common::{
    bearer_token, create_test_app, json_request_with_auth, parse_response_body, request_with_auth,
    test_config,
};
use serde_json::json;
use tower::ServiceExt;
use uuid::Uuid;

#[tokio::test]
async fn test_create_proposal_empty_title() {
    let app = create_test_app(test_config());
    let token = bearer_token(Uuid::new_v4());

    let body = json!({
        "client_id": Uuid::new_v4(),
        "client_name": "Acme Corp",
        "title": "",
        "amount": 100.0,
        "currency": "USD"
    });

    let response = app
        .oneshot(json_request_with_auth(
            Method::POST,
            "/api/v1/proposals",
            &token,
            &body,
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = parse_response_body(response).await;
    assert_eq!(body["error"], "validation_error");
    assert_eq!(body["message"], "Title is required");
}

#[tokio::test]
async fn test_create_proposal_lowercase_currency() {
    let app = create_test_app(test_config());
    let token = bearer_token(Uuid::new_v4());

    let body = json!({
        "client_id": Uuid::new_v4(),
        "client_name": "Acme Corp",
        "title": "Website redesign",
        "amount": 100.0,
        "currency": "usd"
    });

    let response = app
        .oneshot(json_request_with_auth(
            Method::POST,
            "/api/v1/proposals",
            &token,
            &body,
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_create_proposal_item_amount_mismatch() {
    let app = create_test_app(test_config());
    let token = bearer_token(Uuid::new_v4());

    let body = json!({
        "client_id": Uuid::new_v4(),
        "client_name": "Acme Corp",
        "title": "Website redesign",
        "amount": 1300.0,
        "currency": "USD",
        "items": [{
            "description": "Design sprint",
            "quantity": 3.0,
            "unit_price": 400.0,
            "amount": 1300.0
        }]
    });

    let response = app
        .oneshot(json_request_with_auth(
            Method::POST,
            "/api/v1/proposals",
            &token,
            &body,
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = parse_response_body(response).await;
    assert_eq!(body["message"], "Item amount must equal quantity * unit_price");
}

#[tokio::test]
async fn test_list_proposals_unknown_status_filter() {
    let app = create_test_app(test_config());
    let token = bearer_token(Uuid::new_v4());

    let response = app
        .oneshot(request_with_auth(
            Method::GET,
            "/api/v1/proposals?status=sent,bogus",
            &token,
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = parse_response_body(response).await;
    assert_eq!(body["error"], "validation_error");
    assert_eq!(body["message"], "Unknown proposal status: bogus");
}

#[tokio::test]
async fn test_send_email_missing_required_fields() {
    let app = create_test_app(test_config());
    let token = bearer_token(Uuid::new_v4());

    // 'to' omitted entirely.
    let body = json!({
        "subject": "Proposal",
        "message": "Please review",
        "proposal_id": Uuid::new_v4(),
        "proposal_title": "Website redesign",
        "client_name": "Acme Corp"
    });

    let response = app
        .oneshot(json_request_with_auth(
            Method::POST,
            "/email/send",
            &token,
            &body,
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = parse_response_body(response).await;
    assert_eq!(body["error"], "validation_error");
    assert_eq!(body["message"], "Missing required fields");
}

#[tokio::test]
async fn test_create_proposal_missing_required_fields() {
    let app = create_test_app(test_config());
    let token = bearer_token(Uuid::new_v4());

    let response = app
        .oneshot(json_request_with_auth(
            Method::POST,
            "/api/v1/proposals",
            &token,
            &json!({}),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = parse_response_body(response).await;
    assert_eq!(body["message"], "Missing required fields");
}

#[tokio::test]
async fn test_send_email_invalid_recipient() {
    let app = create_test_app(test_config());
    let token = bearer_token(Uuid::new_v4());

    let body = json!({
        "to": "not-an-email",
        "subject": "Proposal",
        "message": "Please review",
        "proposal_id": Uuid::new_v4(),
        "proposal_title": "Website redesign",
        "client_name": "Acme Corp"
    });

    let response = app
        .oneshot(json_request_with_auth(
            Method::POST,
            "/email/send",
            &token,
            &body,
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_send_email_invalid_cc() {
    let app = create_test_app(test_config());
    let token = bearer_token(Uuid::new_v4());

    let body = json!({
        "to": "client@example.com",
        "cc": "bogus",
        "subject": "Proposal",
        "message": "Please review",
        "proposal_id": Uuid::new_v4(),
        "proposal_title": "Website redesign",
        "client_name": "Acme Corp"
    });

    let response = app
        .oneshot(json_request_with_auth(
            Method::POST,
            "/email/send",
            &token,
            &body,
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_send_email_zero_expiry_days() {
    let app = create_test_app(test_config());
    let token = bearer_token(Uuid::new_v4());

    let body = json!({
        "to": "client@example.com",
        "subject": "Proposal",
        "message": "Please review",
        "proposal_id": Uuid::new_v4(),
        "proposal_title": "Website redesign",
        "client_name": "Acme Corp",
        "expiry_days": 0
    });

    let response = app
        .oneshot(json_request_with_auth(
            Method::POST,
            "/email/send",
            &token,
            &body,
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_create_share_link_zero_ttl() {
    let app = create_test_app(test_config());
    let token = bearer_token(Uuid::new_v4());

    let response = app
        .oneshot(json_request_with_auth(
            Method::POST,
            &format!("/api/v1/proposals/{}/share-links", Uuid::new_v4()),
            &token,
            &json!({ "ttl_days": 0 }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_create_template_empty_name() {
    let app = create_test_app(test_config());
    let token = bearer_token(Uuid::new_v4());

    let body = json!({
        "name": "",
        "subject": "Proposal from {userName}",
        "body": "Hi {clientName}"
    });

    let response = app
        .oneshot(json_request_with_auth(
            Method::POST,
            "/api/v1/templates",
            &token,
            &body,
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = parse_response_body(response).await;
    assert_eq!(body["message"], "Template name is required");
}

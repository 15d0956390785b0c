//! End-to-end tests for `/api/my/user`.

#![allow(clippy::indexing_slicing)]

use axum::http::{Method, StatusCode, header};
use serde_json::json;

use dinehub_integration_tests::{TestApp, json_request};

#[tokio::test]
async fn test_create_user_is_idempotent() {
    let app = TestApp::new();
    let body = json!({ "auth0Id": "auth0|ada", "email": "ada@example.com" });

    let first = app
        .send(json_request(Method::POST, "/api/my/user", None, Some(&body)))
        .await;
    assert_eq!(first.status, StatusCode::CREATED);
    let created = first.json();
    assert_eq!(created["auth0Id"], "auth0|ada");
    assert_eq!(created["email"], "ada@example.com");
    assert!(created["_id"].is_i64());

    let second = app
        .send(json_request(Method::POST, "/api/my/user", None, Some(&body)))
        .await;
    assert_eq!(second.status, StatusCode::OK);
    assert!(second.body.is_empty());

    assert_eq!(app.store.users().len(), 1);
}

#[tokio::test]
async fn test_create_user_with_other_email_is_still_a_no_op() {
    let app = TestApp::new();
    let _ = app.store.insert_user("auth0|ada", "ada@example.com");

    let body = json!({ "auth0Id": "auth0|ada", "email": "someone@else.com" });
    let response = app
        .send(json_request(Method::POST, "/api/my/user", None, Some(&body)))
        .await;

    assert_eq!(response.status, StatusCode::OK);
    let users = app.store.users();
    assert_eq!(users.len(), 1);
    assert_eq!(users[0].email.as_str(), "ada@example.com");
}

#[tokio::test]
async fn test_create_user_rejects_bad_email() {
    let app = TestApp::new();
    let body = json!({ "auth0Id": "auth0|ada", "email": "not-an-email" });

    let response = app
        .send(json_request(Method::POST, "/api/my/user", None, Some(&body)))
        .await;

    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert!(response.json()["message"].is_string());
    assert!(app.store.users().is_empty());
}

#[tokio::test]
async fn test_create_user_rejects_blank_subject() {
    let app = TestApp::new();
    let body = json!({ "auth0Id": "  ", "email": "ada@example.com" });

    let response = app
        .send(json_request(Method::POST, "/api/my/user", None, Some(&body)))
        .await;

    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(response.json()["message"], "auth0Id is required");
}

#[tokio::test]
async fn test_get_current_user() {
    let app = TestApp::new();
    let user = app.store.insert_user("auth0|ada", "ada@example.com");

    let response = app
        .send(json_request(Method::GET, "/api/my/user", Some("auth0|ada"), None))
        .await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.json()["_id"], user.id.as_i32());
}

#[tokio::test]
async fn test_protected_routes_require_subject() {
    let app = TestApp::new();

    let response = app
        .send(json_request(Method::GET, "/api/my/user", None, None))
        .await;
    assert_eq!(response.status, StatusCode::UNAUTHORIZED);
    assert_eq!(response.json()["message"], "missing caller identity");

    let response = app
        .send(json_request(Method::GET, "/api/my/user", Some("auth0|nobody"), None))
        .await;
    assert_eq!(response.status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_update_user_overwrites_every_field() {
    let app = TestApp::new();
    let _ = app.store.insert_user("auth0|ada", "ada@example.com");

    let full = json!({
        "name": "Ada",
        "addressLine1": "1 Main St",
        "city": "London",
        "country": "UK"
    });
    let response = app
        .send(json_request(Method::PUT, "/api/my/user", Some("auth0|ada"), Some(&full)))
        .await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.json()["city"], "London");

    let partial = json!({ "name": "Ada L." });
    let response = app
        .send(json_request(Method::PUT, "/api/my/user", Some("auth0|ada"), Some(&partial)))
        .await;
    assert_eq!(response.status, StatusCode::OK);

    let stored = &app.store.users()[0];
    assert_eq!(stored.name.as_deref(), Some("Ada L."));
    assert_eq!(stored.address_line1, None);
    assert_eq!(stored.city, None);
    assert_eq!(stored.country, None);
}

#[tokio::test]
async fn test_update_user_rejects_unknown_fields() {
    let app = TestApp::new();
    let _ = app.store.insert_user("auth0|ada", "ada@example.com");

    let body = json!({ "name": "Ada", "email": "new@example.com" });
    let response = app
        .send(json_request(Method::PUT, "/api/my/user", Some("auth0|ada"), Some(&body)))
        .await;

    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(app.store.users()[0].email.as_str(), "ada@example.com");
}

#[tokio::test]
async fn test_request_id_is_echoed() {
    let app = TestApp::new();

    let mut request = json_request(Method::GET, "/health", None, None);
    request
        .headers_mut()
        .insert("x-request-id", "req-123".parse().expect("header value"));
    let response = app.send(request).await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.headers["x-request-id"], "req-123");
    assert_eq!(&response.body[..], b"ok");
}

#[tokio::test]
async fn test_request_id_is_generated() {
    let app = TestApp::new();

    let response = app
        .send(json_request(Method::GET, "/health", None, None))
        .await;

    let id = response.headers["x-request-id"].to_str().expect("ascii id");
    assert_eq!(id.len(), 36);
}

#[tokio::test]
async fn test_readiness_reports_ok() {
    let app = TestApp::new();

    let response = app
        .send(json_request(Method::GET, "/health/ready", None, None))
        .await;

    assert_eq!(response.status, StatusCode::OK);
}

fn request_from(origin: &str) -> axum::http::Request<axum::body::Body> {
    let mut request = json_request(Method::GET, "/health", None, None);
    request
        .headers_mut()
        .insert(header::ORIGIN, origin.parse().expect("header value"));
    request
}

#[tokio::test]
async fn test_cors_echoes_configured_origin() {
    let app = TestApp::with_allowed_origin("https://dinehub.test");

    let response = app.send(request_from("https://dinehub.test")).await;

    assert_eq!(
        response.headers[header::ACCESS_CONTROL_ALLOW_ORIGIN],
        "https://dinehub.test"
    );
}

#[tokio::test]
async fn test_cors_invalid_origin_allows_no_origin() {
    let app = TestApp::with_allowed_origin("https://dinehub.test\nevil");

    let response = app.send(request_from("https://elsewhere.test")).await;

    assert_eq!(response.status, StatusCode::OK);
    assert!(
        response
            .headers
            .get(header::ACCESS_CONTROL_ALLOW_ORIGIN)
            .is_none()
    );
}

//! Tests de middleware.

mod helpers;

use axum::http::StatusCode;
use helpers::{ADMIN_TOKEN, client};
use uuid::Uuid;

// === Request ID ===

#[tokio::test]
async fn response_includes_request_id() {
    let response = client().get("/health").await;

    response.assert_header_exists("x-request-id");
}

#[tokio::test]
async fn request_id_is_uuid_v7() {
    let response = client().get("/health").await;

    let id = response.header("x-request-id").unwrap();
    let parsed = Uuid::parse_str(id).unwrap();

    assert_eq!(parsed.get_version_num(), 7);
}

#[tokio::test]
async fn propagates_incoming_request_id() {
    let custom_id = "my-custom-request-id-12345";

    let response = client()
        .get_with_headers("/health", &[("x-request-id", custom_id)])
        .await;

    response.assert_header("x-request-id", custom_id);
}

#[tokio::test]
async fn replaces_oversized_request_id() {
    let oversized = "x".repeat(200);

    let response = client()
        .get_with_headers("/health", &[("x-request-id", &oversized)])
        .await;

    let id = response.header("x-request-id").unwrap();
    assert!(Uuid::parse_str(id).is_ok());
}

#[tokio::test]
async fn generates_different_ids_for_each_request() {
    let client = client();
    let response1 = client.get("/health").await;
    let response2 = client.get("/health").await;

    let id1 = response1.header("x-request-id").unwrap();
    let id2 = response2.header("x-request-id").unwrap();

    assert_ne!(id1, id2);
}

// === Request ID en otros endpoints ===

#[tokio::test]
async fn request_id_present_in_content_endpoint() {
    let response = client().get("/api/services").await;

    response.assert_header_exists("x-request-id");
}

#[tokio::test]
async fn request_id_present_in_error_responses() {
    let response = client().get("/api/blog/posts/no-existe").await;

    response
        .assert_status(StatusCode::NOT_FOUND)
        .assert_header_exists("x-request-id");
}

#[tokio::test]
async fn request_id_present_in_admin_endpoint() {
    let response = client().delete("/api/admin/cache/keys/x", ADMIN_TOKEN).await;

    response.assert_header_exists("x-request-id");
}

// === CORS ===

#[tokio::test]
async fn public_routes_allow_any_origin() {
    let response = client()
        .get_with_headers("/api/services", &[("origin", "https://bufete.example.com")])
        .await;

    response.assert_header("access-control-allow-origin", "*");
}

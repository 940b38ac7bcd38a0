//! REST store integration tests
//!
//! Verifies the request shapes `RestStore` sends against a mock storage
//! endpoint: paths, query actions, the `x-ms-*` headers, copy-status
//! polling, and the mapping of HTTP failures into per-operation errors
//! with redacted reasons.

use std::collections::HashMap;
use std::sync::Arc;

use wiremock::matchers::{header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use upload_warden::{ObjectStore, RestConfig, RestStore, StaticCredential, WardenError};

fn store_for(server: &MockServer) -> RestStore {
    let mut config = RestConfig::new("scratch54");
    config.dfs_endpoint = Some(server.uri());
    config.blob_endpoint = Some(server.uri());
    config.copy_poll_interval_ms = 1;
    RestStore::new(config, Arc::new(StaticCredential::new("tok-123"))).unwrap()
}

// ─── Access Control ──────────────────────────────────────────────

#[tokio::test]
async fn test_get_access_control_reads_permissions_header() {
    let server = MockServer::start().await;
    Mock::given(method("HEAD"))
        .and(path("/uploads/a/evil.exe"))
        .and(query_param("action", "getAccessControl"))
        .and(header("authorization", "Bearer tok-123"))
        .and(header("x-ms-version", "2023-11-03"))
        .respond_with(ResponseTemplate::new(200).insert_header("x-ms-permissions", "rwxr-xr-x"))
        .expect(1)
        .mount(&server)
        .await;

    let permissions = store_for(&server)
        .get_access_control("uploads", "a/evil.exe")
        .await
        .unwrap();

    assert_eq!(permissions, "rwxr-xr-x");
}

#[tokio::test]
async fn test_get_access_control_without_header_is_read_error() {
    let server = MockServer::start().await;
    Mock::given(method("HEAD"))
        .and(path("/uploads/a/evil.exe"))
        .respond_with(ResponseTemplate::new(200))
        .mount(&server)
        .await;

    let err = store_for(&server)
        .get_access_control("uploads", "a/evil.exe")
        .await
        .unwrap_err();

    assert!(matches!(err, WardenError::AclRead { .. }));
    assert!(err.to_string().contains("x-ms-permissions"));
}

#[tokio::test]
async fn test_set_access_control_patches_permissions() {
    let server = MockServer::start().await;
    Mock::given(method("PATCH"))
        .and(path("/uploads/a/evil.exe"))
        .and(query_param("action", "setAccessControl"))
        .and(header("x-ms-permissions", "rw-r--r--"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    store_for(&server)
        .set_access_control("uploads", "a/evil.exe", "rw-r--r--")
        .await
        .unwrap();
}

// ─── Rename ──────────────────────────────────────────────────────

#[tokio::test]
async fn test_rename_puts_destination_with_source_header() {
    let server = MockServer::start().await;
    Mock::given(method("PUT"))
        .and(path("/uploads/a/evil.exe.sus"))
        .and(header("x-ms-rename-source", "/uploads/a/evil.exe"))
        .respond_with(ResponseTemplate::new(201))
        .expect(1)
        .mount(&server)
        .await;

    store_for(&server)
        .rename("uploads", "a/evil.exe", "a/evil.exe.sus")
        .await
        .unwrap();
}

#[tokio::test]
async fn test_rename_conflict_maps_to_rename_error() {
    let server = MockServer::start().await;
    Mock::given(method("PUT"))
        .and(path("/uploads/a/evil.exe.sus"))
        .respond_with(ResponseTemplate::new(409).set_body_string("PathAlreadyExists"))
        .mount(&server)
        .await;

    let err = store_for(&server)
        .rename("uploads", "a/evil.exe", "a/evil.exe.sus")
        .await
        .unwrap_err();

    match err {
        WardenError::Rename { path, reason } => {
            assert_eq!(path, "a/evil.exe");
            assert!(reason.contains("409"));
            assert!(reason.contains("PathAlreadyExists"));
        }
        other => panic!("expected rename error, got {:?}", other),
    }
}

// ─── Copy ────────────────────────────────────────────────────────

#[tokio::test]
async fn test_copy_success_without_polling() {
    let server = MockServer::start().await;
    Mock::given(method("PUT"))
        .and(path("/uploads/a/evil.exe.sus"))
        .respond_with(ResponseTemplate::new(202).insert_header("x-ms-copy-status", "success"))
        .expect(1)
        .mount(&server)
        .await;

    store_for(&server)
        .copy("uploads", "a/evil.exe", "a/evil.exe.sus")
        .await
        .unwrap();
}

#[tokio::test]
async fn test_copy_sends_absolute_source_url() {
    let server = MockServer::start().await;
    let source = format!("{}/uploads/a/evil.exe", server.uri());
    Mock::given(method("PUT"))
        .and(path("/uploads/a/evil.exe.sus"))
        .and(header("x-ms-copy-source", source.as_str()))
        .respond_with(ResponseTemplate::new(202))
        .expect(1)
        .mount(&server)
        .await;

    store_for(&server)
        .copy("uploads", "a/evil.exe", "a/evil.exe.sus")
        .await
        .unwrap();
}

#[tokio::test]
async fn test_copy_polls_pending_until_success() {
    let server = MockServer::start().await;
    Mock::given(method("PUT"))
        .and(path("/uploads/a/evil.exe.sus"))
        .respond_with(ResponseTemplate::new(202).insert_header("x-ms-copy-status", "pending"))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("HEAD"))
        .and(path("/uploads/a/evil.exe.sus"))
        .respond_with(ResponseTemplate::new(200).insert_header("x-ms-copy-status", "success"))
        .expect(1)
        .mount(&server)
        .await;

    store_for(&server)
        .copy("uploads", "a/evil.exe", "a/evil.exe.sus")
        .await
        .unwrap();
}

#[tokio::test]
async fn test_copy_stuck_pending_exhausts_poll_budget() {
    let server = MockServer::start().await;
    Mock::given(method("PUT"))
        .and(path("/uploads/a/evil.exe.sus"))
        .respond_with(ResponseTemplate::new(202).insert_header("x-ms-copy-status", "pending"))
        .mount(&server)
        .await;
    Mock::given(method("HEAD"))
        .and(path("/uploads/a/evil.exe.sus"))
        .respond_with(ResponseTemplate::new(200).insert_header("x-ms-copy-status", "pending"))
        .mount(&server)
        .await;

    let err = store_for(&server)
        .copy("uploads", "a/evil.exe", "a/evil.exe.sus")
        .await
        .unwrap_err();

    match err {
        WardenError::Copy { reason, .. } => assert!(reason.contains("pending")),
        other => panic!("expected copy error, got {:?}", other),
    }
}

#[tokio::test]
async fn test_copy_aborted_status_is_copy_error() {
    let server = MockServer::start().await;
    Mock::given(method("PUT"))
        .and(path("/uploads/a/evil.exe.sus"))
        .respond_with(ResponseTemplate::new(202).insert_header("x-ms-copy-status", "aborted"))
        .mount(&server)
        .await;

    let err = store_for(&server)
        .copy("uploads", "a/evil.exe", "a/evil.exe.sus")
        .await
        .unwrap_err();

    assert!(matches!(err, WardenError::Copy { .. }));
    assert!(err.to_string().contains("aborted"));
}

// ─── Delete & Metadata ───────────────────────────────────────────

#[tokio::test]
async fn test_delete_issues_delete_request() {
    let server = MockServer::start().await;
    Mock::given(method("DELETE"))
        .and(path("/uploads/a/evil.exe"))
        .respond_with(ResponseTemplate::new(202))
        .expect(1)
        .mount(&server)
        .await;

    store_for(&server)
        .delete("uploads", "a/evil.exe")
        .await
        .unwrap();
}

#[tokio::test]
async fn test_delete_missing_object_maps_to_delete_error() {
    let server = MockServer::start().await;
    Mock::given(method("DELETE"))
        .and(path("/uploads/a/evil.exe"))
        .respond_with(ResponseTemplate::new(404).set_body_string("BlobNotFound"))
        .mount(&server)
        .await;

    let err = store_for(&server)
        .delete("uploads", "a/evil.exe")
        .await
        .unwrap_err();

    assert!(matches!(err, WardenError::Delete { .. }));
    assert!(err.to_string().contains("404"));
}

#[tokio::test]
async fn test_set_metadata_sends_prefixed_headers() {
    let server = MockServer::start().await;
    Mock::given(method("PUT"))
        .and(path("/uploads/a/evil.exe.sus"))
        .and(query_param("comp", "metadata"))
        .and(header("x-ms-meta-quarantined", "true"))
        .and(header("x-ms-meta-originalName", "evil.exe"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    let metadata = HashMap::from([
        ("quarantined".to_string(), "true".to_string()),
        ("originalName".to_string(), "evil.exe".to_string()),
    ]);
    store_for(&server)
        .set_metadata("uploads", "a/evil.exe.sus", &metadata)
        .await
        .unwrap();
}

// ─── Error Reporting ─────────────────────────────────────────────

#[tokio::test]
async fn test_error_bodies_are_redacted_before_reporting() {
    let server = MockServer::start().await;
    Mock::given(method("DELETE"))
        .and(path("/uploads/a/evil.exe"))
        .respond_with(
            ResponseTemplate::new(403)
                .set_body_string("AuthenticationFailed for url?sig=topsecretvalue&se=2026"),
        )
        .mount(&server)
        .await;

    let err = store_for(&server)
        .delete("uploads", "a/evil.exe")
        .await
        .unwrap_err();

    let text = err.to_string();
    assert!(!text.contains("topsecretvalue"));
    assert!(text.contains("sig=<REDACTED>"));
}

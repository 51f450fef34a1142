//! Integration tests for the guest lifecycle over real HTTP
//!
//! **Coverage:**
//! - Invite: 201 with `invitedUser.id` → id returned
//! - Read: 404 → `Api` error carrying status and body
//! - Token caching: several requests share one client-credentials exchange
//! - Decode failures on success statuses
//! - Delete: guest, non-guest, already-absent identities
//! - Failed token exchange leaves the cached credential in place
//!
//! **Infrastructure:**
//! - One WireMock server playing both the token endpoint and the directory
//! - Real `ClientCredentialsClient` + `TokenManager` + `ApiClient`

use std::sync::Arc;

use guestdir_domain::{DirectoryConfig, DirectoryError};
use guestdir_infra::{ApiClient, ApiClientConfig, DirectoryAuthService, GuestService};
use wiremock::matchers::{body_string_contains, header, method, path, path_regex};
use wiremock::{Mock, MockServer, ResponseTemplate};

const TENANT: &str = "contoso";
const TOKEN_PATH: &str = "/contoso/oauth2/v2.0/token";

fn config_for(server: &MockServer) -> DirectoryConfig {
    DirectoryConfig::new(TENANT, "app-id", "app-secret")
        .with_authority_url(server.uri())
        .with_base_url(format!("{}/v1.0", server.uri()))
}

fn token_response(token: &str, expires_in: i64) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_json(serde_json::json!({
        "token_type": "Bearer",
        "expires_in": expires_in,
        "access_token": token
    }))
}

async fn mount_token_endpoint(server: &MockServer, expected_calls: u64) {
    Mock::given(method("POST"))
        .and(path(TOKEN_PATH))
        .and(body_string_contains("grant_type=client_credentials"))
        .respond_with(token_response("integration-token", 3600))
        .expect(expected_calls)
        .mount(server)
        .await;
}

/// Build a service whose auth layer stays reachable from the test
fn service_with_auth(server: &MockServer) -> (GuestService, Arc<DirectoryAuthService>) {
    let config = config_for(server);
    let auth = Arc::new(DirectoryAuthService::from_config(&config).expect("auth service"));
    let client = ApiClient::new(ApiClientConfig::from(&config), auth.clone()).expect("api client");
    (GuestService::new(Arc::new(client)), auth)
}

/// Validates the invite happy path against a real token exchange.
///
/// # Test Steps
/// 1. Token endpoint issues a one-hour token
/// 2. `POST /v1.0/invitations` answers 201 with `invitedUser.id`
/// 3. `invite_guest` returns that id
#[tokio::test(flavor = "multi_thread")]
async fn invite_guest_returns_new_identity_id() {
    let server = MockServer::start().await;
    mount_token_endpoint(&server, 1).await;

    Mock::given(method("POST"))
        .and(path("/v1.0/invitations"))
        .and(header("authorization", "Bearer integration-token"))
        .respond_with(
            ResponseTemplate::new(201)
                .set_body_json(serde_json::json!({"invitedUser": {"id": "abc123"}})),
        )
        .expect(1)
        .mount(&server)
        .await;

    let service = GuestService::from_config(&config_for(&server)).expect("service");
    let id = service.invite_guest("a@b.com").await.expect("invite");

    assert_eq!(id, "abc123");
}

/// Validates that a missing identity surfaces as an API error.
///
/// # Test Steps
/// 1. `GET /v1.0/users/missing` answers 404 with a JSON error body
/// 2. `get_guest` fails with `Api { status: 404 }` keeping the body
#[tokio::test(flavor = "multi_thread")]
async fn get_missing_guest_is_api_not_found() {
    let server = MockServer::start().await;
    mount_token_endpoint(&server, 1).await;

    Mock::given(method("GET"))
        .and(path("/v1.0/users/missing"))
        .respond_with(
            ResponseTemplate::new(404).set_body_json(serde_json::json!({"error": "not found"})),
        )
        .mount(&server)
        .await;

    let service = GuestService::from_config(&config_for(&server)).expect("service");
    let err = service.get_guest("missing").await.unwrap_err();

    assert!(err.is_not_found());
    match err {
        DirectoryError::Api { status, body } => {
            assert_eq!(status, 404);
            assert!(body.contains("not found"));
        }
        other => panic!("expected Api error, got {other:?}"),
    }
}

/// Validates that requests within the token lifetime reuse one credential.
///
/// # Test Steps
/// 1. Token endpoint issues `expires_in = 3600` and expects one call
/// 2. Two directory reads run back to back
/// 3. Both carry the same bearer token
#[tokio::test(flavor = "multi_thread")]
async fn requests_within_lifetime_share_one_exchange() {
    let server = MockServer::start().await;
    mount_token_endpoint(&server, 1).await;

    Mock::given(method("GET"))
        .and(path("/v1.0/users/abc123"))
        .and(header("authorization", "Bearer integration-token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "id": "abc123",
            "userType": "Guest"
        })))
        .expect(2)
        .mount(&server)
        .await;

    let service = GuestService::from_config(&config_for(&server)).expect("service");
    service.get_guest("abc123").await.expect("first read");
    service.get_guest("abc123").await.expect("second read");
}

/// Validates that concurrent first requests trigger a single exchange.
///
/// # Test Steps
/// 1. Eight reads start together on a cold cache
/// 2. Token endpoint expects exactly one call
#[tokio::test(flavor = "multi_thread")]
async fn concurrent_cold_requests_exchange_once() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(TOKEN_PATH))
        .respond_with(
            token_response("integration-token", 3600)
                .set_delay(std::time::Duration::from_millis(100)),
        )
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path_regex(r"^/v1\.0/users/.+$"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({"id": "x"})))
        .expect(8)
        .mount(&server)
        .await;

    let service =
        Arc::new(GuestService::from_config(&config_for(&server)).expect("service"));
    let reads = (0..8).map(|i| {
        let service = Arc::clone(&service);
        tokio::spawn(async move { service.get_guest(&format!("user-{i}")).await })
    });

    for result in futures::future::join_all(reads).await {
        result.expect("task").expect("read");
    }
}

/// Validates that a 201 without `invitedUser.id` is a decode error.
///
/// # Test Steps
/// 1. Invitation endpoint answers 201 with an unrelated body
/// 2. `invite_guest` fails with `Decode { status: 201 }`
#[tokio::test(flavor = "multi_thread")]
async fn invite_with_unexpected_body_is_decode_error() {
    let server = MockServer::start().await;
    mount_token_endpoint(&server, 1).await;

    Mock::given(method("POST"))
        .and(path("/v1.0/invitations"))
        .respond_with(ResponseTemplate::new(201).set_body_json(serde_json::json!({"ok": true})))
        .mount(&server)
        .await;

    let service = GuestService::from_config(&config_for(&server)).expect("service");
    let err = service.invite_guest("a@b.com").await.unwrap_err();

    assert!(matches!(err, DirectoryError::Decode { status: 201, .. }), "got {err:?}");
}

/// Validates deleting a guest identity.
///
/// # Test Steps
/// 1. Read returns `userType = Guest`
/// 2. Exactly one `DELETE` is sent and answered 204
#[tokio::test(flavor = "multi_thread")]
async fn delete_guest_removes_guest_identity() {
    let server = MockServer::start().await;
    mount_token_endpoint(&server, 1).await;

    Mock::given(method("GET"))
        .and(path("/v1.0/users/guest-1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "id": "guest-1",
            "userType": "Guest"
        })))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("DELETE"))
        .and(path("/v1.0/users/guest-1"))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;

    let service = GuestService::from_config(&config_for(&server)).expect("service");
    service.delete_guest("guest-1").await.expect("delete");
}

/// Validates that non-guest identities are never deleted.
///
/// # Test Steps
/// 1. Read returns `userType = Member`
/// 2. `delete_guest` fails with `Precondition`
/// 3. No `DELETE` reaches the directory
#[tokio::test(flavor = "multi_thread")]
async fn delete_guest_refuses_member_identity() {
    let server = MockServer::start().await;
    mount_token_endpoint(&server, 1).await;

    Mock::given(method("GET"))
        .and(path("/v1.0/users/member-1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "id": "member-1",
            "userType": "Member"
        })))
        .mount(&server)
        .await;
    Mock::given(method("DELETE"))
        .respond_with(ResponseTemplate::new(204))
        .expect(0)
        .mount(&server)
        .await;

    let service = GuestService::from_config(&config_for(&server)).expect("service");
    let err = service.delete_guest("member-1").await.unwrap_err();

    assert!(matches!(err, DirectoryError::Precondition { .. }), "got {err:?}");
}

/// Validates that deleting an absent identity succeeds without a DELETE.
///
/// # Test Steps
/// 1. Read answers 404
/// 2. `delete_guest` succeeds
/// 3. No `DELETE` reaches the directory
#[tokio::test(flavor = "multi_thread")]
async fn delete_guest_treats_absent_identity_as_deleted() {
    let server = MockServer::start().await;
    mount_token_endpoint(&server, 1).await;

    Mock::given(method("GET"))
        .and(path("/v1.0/users/gone"))
        .respond_with(
            ResponseTemplate::new(404)
                .set_body_json(serde_json::json!({"error": {"code": "Request_ResourceNotFound"}})),
        )
        .mount(&server)
        .await;
    Mock::given(method("DELETE"))
        .respond_with(ResponseTemplate::new(204))
        .expect(0)
        .mount(&server)
        .await;

    let service = GuestService::from_config(&config_for(&server)).expect("service");
    service.delete_guest("gone").await.expect("absent identity counts as deleted");
}

/// Validates that a rejected exchange keeps the previous credential.
///
/// # Test Steps
/// 1. First exchange succeeds and caches a token
/// 2. Forced refresh is rejected with 401
/// 3. Cached credential is unchanged and still served
#[tokio::test(flavor = "multi_thread")]
async fn failed_refresh_keeps_cached_credential() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(TOKEN_PATH))
        .respond_with(token_response("first-token", 3600))
        .up_to_n_times(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path(TOKEN_PATH))
        .respond_with(
            ResponseTemplate::new(401).set_body_json(serde_json::json!({
                "error": "invalid_client",
                "error_description": "bad secret"
            })),
        )
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/v1.0/users/abc123"))
        .and(header("authorization", "Bearer first-token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({"id": "abc123"})))
        .expect(2)
        .mount(&server)
        .await;

    let (service, auth) = service_with_auth(&server);
    service.get_guest("abc123").await.expect("first read");
    let before = auth.token_manager().cached().await.expect("cached credential");

    assert!(auth.token_manager().refresh().await.is_err());

    let after = auth.token_manager().cached().await.expect("cached credential");
    assert_eq!(before, after);
    service.get_guest("abc123").await.expect("second read uses cached token");
}

/// Validates that an exchange failure on a cold cache is an auth error.
///
/// # Test Steps
/// 1. Token endpoint rejects the client
/// 2. No directory request is sent
/// 3. The operation fails with `Authentication`
#[tokio::test(flavor = "multi_thread")]
async fn rejected_exchange_is_authentication_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(TOKEN_PATH))
        .respond_with(
            ResponseTemplate::new(400)
                .set_body_json(serde_json::json!({"error": "unauthorized_client"})),
        )
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path_regex(r"^/v1\.0/.*$"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let (service, auth) = service_with_auth(&server);
    let err = service.get_guest("abc123").await.unwrap_err();

    assert!(matches!(err, DirectoryError::Authentication { .. }), "got {err:?}");
    assert!(auth.token_manager().cached().await.is_none());
}

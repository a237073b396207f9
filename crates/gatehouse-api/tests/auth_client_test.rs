#![allow(clippy::unwrap_used)]
// Integration tests for `AuthClient` using wiremock.

use pretty_assertions::assert_eq;
use secrecy::{ExposeSecret, SecretString};
use serde_json::json;
use url::Url;
use wiremock::matchers::{body_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use gatehouse_api::{AuthClient, Error};

// ── Helpers ─────────────────────────────────────────────────────────

async fn setup() -> (MockServer, AuthClient) {
    let server = MockServer::start().await;
    let base_url = Url::parse(&server.uri()).unwrap();
    let client = AuthClient::with_client(reqwest::Client::new(), base_url);
    (server, client)
}

fn password(p: &str) -> SecretString {
    SecretString::from(p.to_owned())
}

fn dashboard_body() -> serde_json::Value {
    json!({
        "userProfile": {
            "fullName": "Ana Torres",
            "avatar": "https://example.test/ana.png",
            "permissions": ["read", "write"]
        },
        "stats": {
            "totalUsers": 5,
            "activeProjects": 3,
            "completedTasks": 42,
            "pendingReviews": 7
        },
        "recentActivity": [
            { "id": 1, "action": "Login", "timestamp": "2024-06-15T10:30:00Z", "ip": "10.0.0.1" },
            { "id": "a2", "action": "Export", "timestamp": "2024-06-15T11:00:00Z", "ip": "10.0.0.2" }
        ]
    })
}

// ── Authentication tests ────────────────────────────────────────────

#[tokio::test]
async fn test_login_installs_token() {
    let (server, client) = setup().await;

    Mock::given(method("POST"))
        .and(path("/api/auth/login"))
        .and(body_json(json!({ "username": "ana", "password": "secret" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": true,
            "token": "tok-123",
            "user": { "username": "ana", "email": "ana@example.test", "roles": ["admin"] }
        })))
        .mount(&server)
        .await;

    let user = client.login("ana", &password("secret")).await.unwrap();

    assert_eq!(user.username, "ana");
    assert_eq!(user.roles, vec!["admin".to_owned()]);
    assert_eq!(client.token().unwrap().expose_secret(), "tok-123");
}

#[tokio::test]
async fn test_login_rejected() {
    let (server, client) = setup().await;

    Mock::given(method("POST"))
        .and(path("/api/auth/login"))
        .respond_with(
            ResponseTemplate::new(401)
                .set_body_json(json!({ "success": false, "message": "Credenciales inválidas" })),
        )
        .mount(&server)
        .await;

    let result = client.login("ana", &password("wrong")).await;

    match result {
        Err(Error::Authentication { ref message }) => {
            assert_eq!(message, "Credenciales inválidas");
        }
        other => panic!("expected Authentication error, got: {other:?}"),
    }
    assert!(!client.has_token());
}

#[tokio::test]
async fn test_me_accepts_wrapped_user() {
    let (server, client) = setup().await;
    client.set_token(SecretString::from("tok-abc".to_owned()));

    Mock::given(method("GET"))
        .and(path("/api/auth/me"))
        .and(header("authorization", "Bearer tok-abc"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "user": { "username": "ana", "email": "ana@example.test", "roles": ["user"] }
        })))
        .mount(&server)
        .await;

    let user = client.me().await.unwrap();
    assert_eq!(user.email, "ana@example.test");
}

#[tokio::test]
async fn test_logout_clears_token_even_on_failure() {
    let (server, client) = setup().await;
    client.set_token(SecretString::from("tok-abc".to_owned()));

    Mock::given(method("POST"))
        .and(path("/api/auth/logout"))
        .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
        .mount(&server)
        .await;

    let result = client.logout().await;

    assert!(matches!(result, Err(Error::Api { status: 500, .. })));
    assert!(!client.has_token());
}

// ── Protected data tests ────────────────────────────────────────────

#[tokio::test]
async fn test_fetch_protected_data_sends_bearer() {
    let (server, client) = setup().await;
    client.set_token(SecretString::from("tok-abc".to_owned()));

    Mock::given(method("GET"))
        .and(path("/api/protected/dashboard"))
        .and(header("authorization", "Bearer tok-abc"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({ "success": true, "data": dashboard_body() })),
        )
        .mount(&server)
        .await;

    let data = client.fetch_protected_data().await.unwrap();

    assert_eq!(data.user_profile.full_name.as_deref(), Some("Ana Torres"));
    assert_eq!(data.user_profile.permissions, vec!["read", "write"]);
    assert_eq!(data.stats.total_users, 5);
    assert_eq!(data.stats.pending_reviews, 7);
    assert_eq!(data.recent_activity.len(), 2);
    assert_eq!(data.recent_activity[1].ip, "10.0.0.2");
}

#[tokio::test]
async fn test_fetch_protected_data_without_token() {
    let (_server, client) = setup().await;

    let result = client.fetch_protected_data().await;

    assert!(matches!(result, Err(Error::NotAuthenticated)));
}

#[tokio::test]
async fn test_fetch_protected_data_expired_token() {
    let (server, client) = setup().await;
    client.set_token(SecretString::from("stale".to_owned()));

    Mock::given(method("GET"))
        .and(path("/api/protected/dashboard"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&server)
        .await;

    let err = client.fetch_protected_data().await.unwrap_err();

    assert!(matches!(err, Error::SessionExpired));
    assert!(err.is_auth_expired());
}

#[tokio::test]
async fn test_fetch_protected_data_server_error() {
    let (server, client) = setup().await;
    client.set_token(SecretString::from("tok".to_owned()));

    Mock::given(method("GET"))
        .and(path("/api/protected/dashboard"))
        .respond_with(
            ResponseTemplate::new(503).set_body_json(json!({ "error": "Servicio no disponible" })),
        )
        .mount(&server)
        .await;

    let err = client.fetch_protected_data().await.unwrap_err();

    match err {
        Error::Api { status, ref message } => {
            assert_eq!(status, 503);
            assert_eq!(message, "Servicio no disponible");
        }
        ref other => panic!("expected Api error, got: {other:?}"),
    }
    assert!(err.is_transient());
}

#[tokio::test]
async fn test_fetch_protected_data_malformed_body() {
    let (server, client) = setup().await;
    client.set_token(SecretString::from("tok".to_owned()));

    Mock::given(method("GET"))
        .and(path("/api/protected/dashboard"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>oops</html>"))
        .mount(&server)
        .await;

    let result = client.fetch_protected_data().await;

    assert!(matches!(result, Err(Error::Deserialization { .. })));
}

//! End-to-end session flow tests against a mock authorization server.
//!
//! These exercise the real reqwest transport through the full lifecycle:
//! code exchange, cached reads, lazy refresh, refresh failure, revocation,
//! and userinfo.

use oauth2_session::{
    session_config, AuthError, CodeExchange, GrantAccount, RefreshFailure, SessionClient,
    SessionConfig,
};
use serde_json::json;
use wiremock::matchers::{body_string_contains, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn config_for(server: &MockServer) -> SessionConfig {
    session_config()
        .client_id("integration-client")
        .client_secret("integration-secret")
        .authorization_endpoint(format!("{}/authorize", server.uri()))
        .token_endpoint(format!("{}/token", server.uri()))
        .revocation_endpoint(format!("{}/revoke", server.uri()))
        .userinfo_endpoint(format!("{}/userinfo", server.uri()))
        .add_scope("openid")
        .add_scope("profile")
        .build()
        .expect("valid test configuration")
}

fn client_for(server: &MockServer) -> SessionClient {
    SessionClient::new(config_for(server))
}

fn past_grant(access: &str, refresh: &str) -> GrantAccount {
    GrantAccount {
        access_token: access.to_string(),
        refresh_token: Some(refresh.to_string()),
        // Already behind the skew window, so the first read must refresh.
        expires_at: Some(1),
    }
}

#[tokio::test]
async fn sign_in_then_cached_reads_hit_network_once() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/token"))
        .and(body_string_contains("grant_type=authorization_code"))
        .and(body_string_contains("code=test-auth-code"))
        .and(body_string_contains("code_verifier="))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "access_token": "exchange-access",
            "token_type": "Bearer",
            "expires_in": 3600,
            "refresh_token": "exchange-refresh"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server);
    let record = client
        .complete_sign_in(
            "s1",
            CodeExchange {
                code: "test-auth-code".to_string(),
                code_verifier: "a".repeat(43),
                redirect_uri: "https://app.example.com/callback".to_string(),
            },
        )
        .await
        .expect("sign-in succeeds");

    assert_eq!(record.access_token.as_deref(), Some("exchange-access"));
    assert_eq!(record.refresh_token.as_deref(), Some("exchange-refresh"));
    assert!(record.error.is_none());

    // Both follow-up reads are served from the cached record; the expect(1)
    // above fails the test if either one reaches the token endpoint.
    for _ in 0..2 {
        let read = client.get_valid_token("s1").await.expect("cached read");
        assert_eq!(read, record);
    }
}

#[tokio::test]
async fn stale_token_refreshes_once_and_persists() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/token"))
        .and(body_string_contains("grant_type=refresh_token"))
        .and(body_string_contains("refresh_token=old-refresh"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "access_token": "rotated-access",
            "token_type": "Bearer",
            "expires_in": 3600,
            "refresh_token": "rotated-refresh"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server);
    client
        .record_grant("s1", past_grant("old-access", "old-refresh"))
        .await
        .expect("grant recorded");

    let refreshed = client.get_valid_token("s1").await.expect("refresh");
    assert_eq!(refreshed.access_token.as_deref(), Some("rotated-access"));
    assert_eq!(refreshed.refresh_token.as_deref(), Some("rotated-refresh"));
    assert!(refreshed.error.is_none());

    // The rotated token is persisted, so the next read stays local.
    let cached = client.get_valid_token("s1").await.expect("cached read");
    assert_eq!(cached, refreshed);
}

#[tokio::test]
async fn refresh_without_rotation_keeps_previous_refresh_token() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "access_token": "new-access",
            "token_type": "Bearer",
            "expires_in": 3600
        })))
        .mount(&server)
        .await;

    let client = client_for(&server);
    client
        .record_grant("s1", past_grant("old-access", "keeper-refresh"))
        .await
        .expect("grant recorded");

    let refreshed = client.get_valid_token("s1").await.expect("refresh");
    assert_eq!(refreshed.access_token.as_deref(), Some("new-access"));
    assert_eq!(refreshed.refresh_token.as_deref(), Some("keeper-refresh"));
}

#[tokio::test]
async fn failed_refresh_keeps_stale_tokens_and_marks_record() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/token"))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({
            "error": "invalid_grant",
            "error_description": "refresh token revoked"
        })))
        // One refresh per read: the errored record retries naturally.
        .expect(2)
        .mount(&server)
        .await;

    let client = client_for(&server);
    client
        .record_grant("s1", past_grant("stale-access", "dead-refresh"))
        .await
        .expect("grant recorded");

    for _ in 0..2 {
        let record = client.get_valid_token("s1").await.expect("read succeeds");
        assert_eq!(record.access_token.as_deref(), Some("stale-access"));
        assert_eq!(record.refresh_token.as_deref(), Some("dead-refresh"));
        assert_eq!(record.error, Some(RefreshFailure::Fetch));
    }
}

#[tokio::test]
async fn revocation_sends_refresh_token_hint_and_clears_session() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/revoke"))
        .and(header("content-type", "application/x-www-form-urlencoded"))
        .and(body_string_contains("token=live-refresh"))
        .and(body_string_contains("token_type_hint=refresh_token"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server);
    client
        .record_grant(
            "s1",
            GrantAccount {
                access_token: "live-access".to_string(),
                refresh_token: Some("live-refresh".to_string()),
                expires_at: Some(far_future_secs()),
            },
        )
        .await
        .expect("grant recorded");

    let outcome = client.revoke("s1").await.expect("revocation succeeds");
    assert_eq!(outcome.status, 200);
    assert!(outcome.should_sign_out);

    assert!(matches!(
        client.get_valid_token("s1").await,
        Err(AuthError::NoCredential { .. })
    ));
}

#[tokio::test]
async fn revocation_failure_surfaces_status_and_keeps_session() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/revoke"))
        .respond_with(ResponseTemplate::new(503).set_body_string("try later"))
        .mount(&server)
        .await;

    let client = client_for(&server);
    client
        .record_grant(
            "s1",
            GrantAccount {
                access_token: "live-access".to_string(),
                refresh_token: None,
                expires_at: Some(far_future_secs()),
            },
        )
        .await
        .expect("grant recorded");

    match client.revoke("s1").await {
        Err(AuthError::Upstream { status, body }) => {
            assert_eq!(status, 503);
            assert_eq!(body, "try later");
        }
        other => panic!("expected upstream error, got {other:?}"),
    }

    // The session is still usable after a failed revocation.
    assert!(client.get_valid_token("s1").await.is_ok());
}

#[tokio::test]
async fn userinfo_sends_bearer_header() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/userinfo"))
        .and(header("authorization", "Bearer live-access"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "sub": "user-42",
            "name": "Integration User"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server);
    client
        .record_grant(
            "s1",
            GrantAccount {
                access_token: "live-access".to_string(),
                refresh_token: None,
                expires_at: Some(far_future_secs()),
            },
        )
        .await
        .expect("grant recorded");

    let profile = client.userinfo("s1").await.expect("userinfo");
    assert_eq!(profile["sub"], "user-42");
}

#[tokio::test]
async fn concurrent_reads_all_succeed() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "access_token": "concurrent-access",
            "token_type": "Bearer",
            "expires_in": 3600
        })))
        .mount(&server)
        .await;

    let client = std::sync::Arc::new(client_for(&server));
    client
        .record_grant("s1", past_grant("old-access", "old-refresh"))
        .await
        .expect("grant recorded");

    // No refresh dedup: concurrent stale reads may each refresh, and the
    // last write wins. Every caller still gets a usable record.
    let reads = (0..4).map(|_| {
        let client = client.clone();
        async move { client.get_valid_token("s1").await }
    });
    let records = futures::future::join_all(reads).await;

    for record in records {
        let record = record.expect("read succeeds");
        assert_eq!(record.access_token.as_deref(), Some("concurrent-access"));
        assert!(record.error.is_none());
    }
}

fn far_future_secs() -> u64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0)
        + 3_600
}

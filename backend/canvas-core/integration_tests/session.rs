// Public API tests for the session collaborators, against a mock HTTP server

use canvas_core::error::session::SessionError;
use canvas_core::protocol::{ContentFormat, Payload};
use canvas_core::session::SessionClient;

use common::SessionToken;

use serde_json::json;
use wiremock::matchers::{body_json, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

// ----------------------------------------------------------------------------
// authenticate()
// ----------------------------------------------------------------------------

/// **VALUE**: Verifies the authentication exchange: init data out, token in.
///
/// **WHY THIS MATTERS**: This is the one-time trade that makes the whole
/// session possible. Wrong body shape or endpoint means every boot dies on
/// "Access denied" against a perfectly healthy server.
///
/// **BUG THIS CATCHES**: Would catch the `initData` field being renamed by a
/// serde refactor, or the endpoint path drifting.
#[tokio::test]
async fn given_valid_init_data_when_authenticated_then_token_returned() {
    // GIVEN: An auth endpoint that knows our init data
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/auth"))
        .and(body_json(json!({ "initData": "init-123" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "token": "t1" })))
        .expect(1)
        .mount(&server)
        .await;
    let client = SessionClient::new(&server.uri()).expect("client builds");

    // WHEN: Authenticating
    let token = client.authenticate("init-123").await.expect("auth succeeds");

    // THEN: The opaque token is exactly what the server issued
    assert_eq!(token.as_str(), "t1");
}

/// **VALUE**: Verifies any non-success auth response is an authentication
/// failure.
#[tokio::test]
async fn given_rejecting_server_when_authenticated_then_denied() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/auth"))
        .respond_with(ResponseTemplate::new(403))
        .mount(&server)
        .await;
    let client = SessionClient::new(&server.uri()).expect("client builds");

    let result = client.authenticate("init-123").await;

    assert!(matches!(result, Err(SessionError::Denied { .. })));
}

/// **VALUE**: Verifies a success response without a token is still an
/// authentication failure.
///
/// **BUG THIS CATCHES**: Would catch an empty or missing token being wrapped
/// and handed to the connection manager, which would then open a channel the
/// server immediately rejects.
#[tokio::test]
async fn given_success_without_token_when_authenticated_then_denied() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/auth"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
        .mount(&server)
        .await;
    let client = SessionClient::new(&server.uri()).expect("client builds");

    let result = client.authenticate("init-123").await;

    assert!(matches!(result, Err(SessionError::Denied { .. })));
}

/// **VALUE**: Verifies a malformed auth body surfaces as a JSON error rather
/// than a panic or a bogus token.
#[tokio::test]
async fn given_malformed_auth_body_when_authenticated_then_json_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/auth"))
        .respond_with(ResponseTemplate::new(200).set_body_string("{truncated"))
        .mount(&server)
        .await;
    let client = SessionClient::new(&server.uri()).expect("client builds");

    let result = client.authenticate("init-123").await;

    assert!(matches!(result, Err(SessionError::Json { .. })));
}

// ----------------------------------------------------------------------------
// fetch_state()
// ----------------------------------------------------------------------------

/// **VALUE**: Verifies the state fetch carries the session token and parses
/// the shared frame shape into a payload.
///
/// **BUG THIS CATCHES**: Would catch the token query parameter being dropped,
/// which the server answers with 401 in production.
#[tokio::test]
async fn given_canvas_state_when_fetched_then_payload_returned() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/state"))
        .and(query_param("token", "t1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "type": "canvas",
            "format": "text",
            "content": "hello"
        })))
        .expect(1)
        .mount(&server)
        .await;
    let client = SessionClient::new(&server.uri()).expect("client builds");
    let token = SessionToken::new("t1".to_string());

    let state = client.fetch_state(&token).await.expect("fetch succeeds");

    assert_eq!(
        state,
        Some(Payload::Content {
            format: ContentFormat::Text,
            body: "hello".to_string()
        })
    );
}

/// **VALUE**: Verifies JSON `null` maps to "no state yet".
#[tokio::test]
async fn given_null_state_when_fetched_then_none_returned() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/state"))
        .respond_with(ResponseTemplate::new(200).set_body_string("null"))
        .mount(&server)
        .await;
    let client = SessionClient::new(&server.uri()).expect("client builds");
    let token = SessionToken::new("t1".to_string());

    let state = client.fetch_state(&token).await.expect("fetch succeeds");

    assert!(state.is_none());
}

/// **VALUE**: Verifies a failing state endpoint is an error carrying the
/// typed status (callers recover it as "no content yet").
#[tokio::test]
async fn given_failing_state_endpoint_when_fetched_then_server_error_with_status() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/state"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;
    let client = SessionClient::new(&server.uri()).expect("client builds");
    let token = SessionToken::new("t1".to_string());

    let result = client.fetch_state(&token).await;

    match result {
        Err(SessionError::Server { status, .. }) => {
            assert_eq!(status.0, 503);
            assert!(status.is_retryable());
        }
        other => panic!("expected server error, got {other:?}"),
    }
}

// ----------------------------------------------------------------------------
// socket_url()
// ----------------------------------------------------------------------------

/// **VALUE**: Verifies the socket endpoint mirrors the page's transport
/// security and carries the token.
///
/// **WHY THIS MATTERS**: A secure page connecting over plain `ws://` is
/// blocked by every host environment; an insecure page connecting over
/// `wss://` fails against dev servers. The mapping must be scheme-for-scheme.
#[tokio::test]
async fn given_base_urls_when_socket_url_derived_then_scheme_mirrors_security() {
    let plain = SessionClient::new("http://127.0.0.1:8787").expect("client builds");
    let secure = SessionClient::new("https://canvas.example").expect("client builds");
    let token = SessionToken::new("t1".to_string());

    let plain_url = plain.socket_url(&token).expect("derives");
    let secure_url = secure.socket_url(&token).expect("derives");

    assert_eq!(plain_url.as_str(), "ws://127.0.0.1:8787/ws?token=t1");
    assert_eq!(secure_url.as_str(), "wss://canvas.example/ws?token=t1");
}

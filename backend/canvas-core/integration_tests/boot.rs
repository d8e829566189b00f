// End-to-end boot sequence tests: mock auth/state endpoints plus a fake host
// bridge, asserting the placeholder progression the user actually sees

use crate::helpers::{FakeBridge, RecordingSurface, wait_for};

use canvas_core::boot::{self, BootOutcome};
use canvas_core::config::TimingConfig;
use canvas_core::present::{Presenter, Surface, View};
use canvas_core::session::SessionClient;

use std::sync::Arc;
use std::sync::atomic::Ordering;
use std::time::Duration;

use serde_json::json;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn quick_timing() -> TimingConfig {
    TimingConfig {
        reconnect_delay_ms: 100,
        connected_notice_ms: 30,
        settle_delay_ms: 10,
    }
}

fn rig() -> (Presenter, Arc<RecordingSurface>) {
    let surface = Arc::new(RecordingSurface::default());
    let dyn_surface: Arc<dyn Surface> = surface.clone();
    let presenter = Presenter::new(dyn_surface, &quick_timing());
    (presenter, surface)
}

/// **VALUE**: Verifies the happy boot path: Connecting placeholder, auth,
/// state fetch with the issued token, waiting placeholder for a clear state,
/// then the session goes online.
///
/// **WHY THIS MATTERS**: Boot is a strict linear sequence. Users judge the
/// app by these first two placeholders; a wrong order (state before auth,
/// content before state) breaks against any real server.
///
/// **BUG THIS CATCHES**: Would catch the state fetch using anything but the
/// freshly issued token, or `Clear` state rendering as content.
#[tokio::test]
async fn given_valid_init_data_when_booted_then_waiting_placeholder_and_online() {
    // GIVEN: A server that authenticates us and reports a cleared canvas
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/auth"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "token": "t1" })))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/state"))
        .and(query_param("token", "t1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "type": "clear" })))
        .expect(1)
        .mount(&server)
        .await;
    let session = SessionClient::new(&server.uri()).expect("client builds");
    let (presenter, surface) = rig();
    let (bridge, _closed) = FakeBridge::new("init-123");

    // WHEN: Booting
    let outcome = boot::run(&session, &presenter, bridge, quick_timing()).await;

    // THEN: The session is online and the placeholders appeared in order
    assert!(matches!(outcome, BootOutcome::Online(_)));
    let messages = surface.placeholder_messages();
    assert_eq!(messages[0], "Connecting...");
    assert_eq!(messages[1], "Waiting for content...");
}

/// **VALUE**: Verifies the fatal path: rejected auth shows "Access denied"
/// with a close action wired to the host bridge, and nothing else runs - no
/// state fetch, no connection.
///
/// **WHY THIS MATTERS**: This is the one terminal state in the design. It
/// must not retry, and the stranded user must have a working way out.
///
/// **BUG THIS CATCHES**: Would catch the state fetch firing despite failed
/// auth (the `.expect(0)` mock), or the close action losing its bridge.
#[tokio::test]
async fn given_rejected_init_data_when_booted_then_denied_with_close_action() {
    // GIVEN: A server that rejects authentication
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/auth"))
        .respond_with(ResponseTemplate::new(403))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/state"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;
    let session = SessionClient::new(&server.uri()).expect("client builds");
    let (presenter, surface) = rig();
    let (bridge, closed) = FakeBridge::new("bad-init");

    // WHEN: Booting
    let outcome = boot::run(&session, &presenter, bridge, quick_timing()).await;

    // THEN: Terminal denial, with the close action functional
    assert!(matches!(outcome, BootOutcome::Denied));
    match surface.last_view() {
        Some(View::Placeholder {
            message,
            busy,
            action,
        }) => {
            assert_eq!(message, "Access denied");
            assert!(!busy);
            let action = action.expect("denied placeholder carries an action");
            assert_eq!(action.label(), "Close");
            action.trigger();
            assert!(closed.load(Ordering::SeqCst), "close reached the bridge");
        }
        other => panic!("expected denied placeholder, got {other:?}"),
    }
}

/// **VALUE**: Verifies a failing state fetch is non-fatal: the canvas starts
/// empty and the session still goes online.
///
/// **BUG THIS CATCHES**: Would catch state-fetch errors being treated like
/// auth errors (terminal), which would lock users out over a flaky endpoint.
#[tokio::test]
async fn given_failing_state_endpoint_when_booted_then_waiting_placeholder_and_online() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/auth"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "token": "t1" })))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/state"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;
    let session = SessionClient::new(&server.uri()).expect("client builds");
    let (presenter, surface) = rig();
    let (bridge, _closed) = FakeBridge::new("init-123");

    let outcome = boot::run(&session, &presenter, bridge, quick_timing()).await;

    assert!(matches!(outcome, BootOutcome::Online(_)));
    assert!(
        surface
            .placeholder_messages()
            .contains(&"Waiting for content...".to_string()),
        "state failure degrades to an empty canvas"
    );
}

/// **VALUE**: Verifies fetched state renders immediately, before the live
/// channel opens.
///
/// **WHY THIS MATTERS**: The initial fetch is what makes a reopened surface
/// show current content instantly instead of waiting for the next push.
#[tokio::test]
async fn given_existing_state_when_booted_then_content_rendered_immediately() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/auth"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "token": "t1" })))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/state"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "type": "canvas",
            "format": "text",
            "content": "hello"
        })))
        .mount(&server)
        .await;
    let session = SessionClient::new(&server.uri()).expect("client builds");
    let (presenter, surface) = rig();
    let (bridge, _closed) = FakeBridge::new("init-123");

    let outcome = boot::run(&session, &presenter, bridge, quick_timing()).await;

    assert!(matches!(outcome, BootOutcome::Online(_)));
    assert!(
        wait_for(
            || surface
                .content_markups()
                .contains(&"<pre>hello</pre>".to_string()),
            Duration::from_secs(2)
        )
        .await,
        "fetched state was presented"
    );
}

/// **VALUE**: Verifies auth success without a token is still the fatal path.
#[tokio::test]
async fn given_tokenless_auth_success_when_booted_then_denied() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/auth"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
        .mount(&server)
        .await;
    let session = SessionClient::new(&server.uri()).expect("client builds");
    let (presenter, surface) = rig();
    let (bridge, _closed) = FakeBridge::new("init-123");

    let outcome = boot::run(&session, &presenter, bridge, quick_timing()).await;

    assert!(matches!(outcome, BootOutcome::Denied));
    assert!(
        surface
            .placeholder_messages()
            .contains(&"Access denied".to_string())
    );
}

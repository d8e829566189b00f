// Public API tests for the connection manager, against an in-process socket
// peer that scripts server behavior (push, drop, hold)

use crate::helpers::{RecordingSurface, SurfaceCall, start_socket_server, wait_for};

use canvas_core::config::TimingConfig;
use canvas_core::connection::ConnectionManager;
use canvas_core::error::connection::ConnectionError;
use canvas_core::present::{Presenter, Surface, View};

use common::SessionToken;

use std::sync::Arc;
use std::time::Duration;

use futures_util::SinkExt;
use serde_json::json;
use tokio_tungstenite::tungstenite::Message;

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

/// **VALUE**: Verifies the full receive path: open, indicator true, transient
/// "Connected" notice shown and dismissed, pushed Markdown rendered.
///
/// **WHY THIS MATTERS**: This is the normal operating mode of the client -
/// everything else is recovery. If frames don't reach the presenter, the
/// canvas is permanently stale with no error anywhere.
///
/// **BUG THIS CATCHES**: Would catch frames being read before the open
/// transition, the indicator not tracking `Open`, or the notice timer never
/// dismissing.
#[tokio::test]
async fn given_open_channel_when_canvas_frame_pushed_then_rendered_and_indicator_true() {
    // GIVEN: A peer that pushes one Markdown canvas frame and holds the line
    let server = start_socket_server(|mut socket, _index| async move {
        let frame = json!({
            "type": "canvas",
            "format": "markdown",
            "content": "# Hi\n- one\n- two"
        })
        .to_string();
        let _ = socket.send(Message::Text(frame.into())).await;
        tokio::time::sleep(Duration::from_secs(30)).await;
    })
    .await;
    let (presenter, surface) = rig();

    // WHEN: Connecting
    let handle = ConnectionManager::spawn(
        SessionToken::new("t1".to_string()),
        server.url(),
        presenter,
        quick_timing(),
    );
    handle.connect().await.expect("connect dispatches");

    // THEN: The pushed content is rendered through the Markdown pipeline
    assert!(
        wait_for(
            || !surface.content_markups().is_empty(),
            Duration::from_secs(2)
        )
        .await,
        "content arrived"
    );
    assert_eq!(
        surface.content_markups(),
        vec!["<h1>Hi</h1><ul><li>one</li><li>two</li></ul>".to_string()]
    );

    // THEN: The indicator went true and the transient notice was dismissed
    assert_eq!(surface.connected_flags(), vec![true]);
    assert!(
        wait_for(
            || {
                let calls = surface.calls();
                calls
                    .iter()
                    .any(|call| matches!(call, SurfaceCall::Notice(text) if text == "Connected"))
                    && calls
                        .iter()
                        .any(|call| matches!(call, SurfaceCall::NoticeDismissed))
            },
            Duration::from_secs(2)
        )
        .await,
        "notice shown and dismissed"
    );
}

/// **VALUE**: Verifies the reconnect cycle: N consecutive drops produce N+1
/// connection attempts and recovery, with the lost placeholder in between and
/// no runaway attempts once stable.
///
/// **WHY THIS MATTERS**: This is the core resilience property. The manager
/// must retry indefinitely after any disruption, exactly once per delay, and
/// stop churning the moment a transport stays up.
///
/// **BUG THIS CATCHES**: Would catch double-scheduled reconnect timers (two
/// attempts per drop), a retry loop that gives up, or an indicator stuck true
/// across a drop.
#[tokio::test]
async fn given_dropping_peer_when_reconnecting_then_attempts_match_drops_plus_one() {
    // GIVEN: A peer that drops the first two connections and then holds
    let server = start_socket_server(|mut socket, index| async move {
        if index < 2 {
            let _ = socket.close(None).await;
        } else {
            tokio::time::sleep(Duration::from_secs(30)).await;
        }
    })
    .await;
    let (presenter, surface) = rig();

    // WHEN: Connecting through two drops
    let handle = ConnectionManager::spawn(
        SessionToken::new("t1".to_string()),
        server.url(),
        presenter,
        quick_timing(),
    );
    handle.connect().await.expect("connect dispatches");

    // THEN: Exactly three attempts (initial + one per drop), then stability
    assert!(
        wait_for(|| server.accepted() == 3, Duration::from_secs(3)).await,
        "two retries followed the two drops"
    );
    tokio::time::sleep(Duration::from_millis(400)).await;
    assert_eq!(server.accepted(), 3, "no further attempts once stable");

    // THEN: The indicator tracked every transition and ended connected
    let flags = surface.connected_flags();
    assert_eq!(flags, vec![true, false, true, false, true]);

    // THEN: The lost placeholder was shown (busy) for each disruption
    let lost_placeholders: Vec<bool> = surface
        .calls()
        .into_iter()
        .filter_map(|call| match call {
            SurfaceCall::Replaced(View::Placeholder { message, busy, .. })
                if message == "Connection lost. Reconnecting..." =>
            {
                Some(busy)
            }
            _ => None,
        })
        .collect();
    assert_eq!(lost_placeholders, vec![true, true]);
}

/// **VALUE**: Verifies a clear frame returns the display to the waiting
/// placeholder.
#[tokio::test]
async fn given_open_channel_when_clear_frame_pushed_then_waiting_placeholder() {
    let server = start_socket_server(|mut socket, _index| async move {
        let _ = socket
            .send(Message::Text(r#"{"type":"clear"}"#.to_string().into()))
            .await;
        tokio::time::sleep(Duration::from_secs(30)).await;
    })
    .await;
    let (presenter, surface) = rig();

    let handle = ConnectionManager::spawn(
        SessionToken::new("t1".to_string()),
        server.url(),
        presenter,
        quick_timing(),
    );
    handle.connect().await.expect("connect dispatches");

    assert!(
        wait_for(
            || surface
                .placeholder_messages()
                .contains(&"Waiting for content...".to_string()),
            Duration::from_secs(2)
        )
        .await,
        "clear frame produced the waiting placeholder"
    );
}

/// **VALUE**: Verifies malformed frames, unrecognized kinds and keep-alives
/// are silently discarded while the channel keeps working.
///
/// **WHY THIS MATTERS**: Server-side evolution must not crash or desync old
/// clients. Discard means discard: no error placeholder, no disconnect, no
/// render.
///
/// **BUG THIS CATCHES**: Would catch malformed input tearing down the
/// transport, or pings causing spurious re-renders.
#[tokio::test]
async fn given_junk_frames_when_received_then_discarded_and_channel_survives() {
    // GIVEN: A peer that sends junk before one good frame
    let server = start_socket_server(|mut socket, _index| async move {
        for raw in [
            "not json at all",
            r#"{"type":"resize","w":10}"#,
            r#"{"type":"ping"}"#,
            r#"{"type":"canvas","format":"html","content":"ok"}"#,
        ] {
            let _ = socket.send(Message::Text(raw.to_string().into())).await;
        }
        tokio::time::sleep(Duration::from_secs(30)).await;
    })
    .await;
    let (presenter, surface) = rig();

    // WHEN: Connecting and receiving the burst
    let handle = ConnectionManager::spawn(
        SessionToken::new("t1".to_string()),
        server.url(),
        presenter,
        quick_timing(),
    );
    handle.connect().await.expect("connect dispatches");

    // THEN: Only the recognized canvas frame rendered
    assert!(
        wait_for(
            || !surface.content_markups().is_empty(),
            Duration::from_secs(2)
        )
        .await,
        "good frame arrived"
    );
    assert_eq!(surface.content_markups(), vec!["ok".to_string()]);

    // THEN: No disruption was surfaced
    assert_eq!(surface.connected_flags(), vec![true]);
    assert!(
        !surface
            .placeholder_messages()
            .iter()
            .any(|message| message.starts_with("Connection lost")),
        "junk frames are not disruptions"
    );
}

/// **VALUE**: Verifies connect() refuses an empty session token and opens no
/// transport.
///
/// **WHY THIS MATTERS**: An unauthenticated connect would be rejected
/// server-side anyway, but refusing locally keeps the state machine in
/// `Idle` instead of entering a doomed reconnect loop.
#[tokio::test]
async fn given_empty_token_when_connect_called_then_missing_credential_and_no_attempt() {
    let server = start_socket_server(|_socket, _index| async move {}).await;
    let (presenter, _surface) = rig();

    let handle = ConnectionManager::spawn(
        SessionToken::new(String::new()),
        server.url(),
        presenter,
        quick_timing(),
    );
    let result = handle.connect().await;

    assert!(matches!(
        result,
        Err(ConnectionError::MissingCredential { .. })
    ));
    tokio::time::sleep(Duration::from_millis(200)).await;
    assert_eq!(server.accepted(), 0, "no transport was opened");
}

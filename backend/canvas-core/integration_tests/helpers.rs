// Shared fixtures for integration tests: a recording surface, a scriptable
// in-process socket peer, and a fake host bridge

use canvas_core::host::HostBridge;
use canvas_core::present::{Surface, View};

use std::future::Future;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use tokio::net::{TcpListener, TcpStream};
use tokio::task::JoinHandle;
use tokio_tungstenite::{WebSocketStream, accept_async};
use url::Url;

// ============================================================================
// Recording surface
// ============================================================================

#[derive(Debug, Clone)]
pub enum SurfaceCall {
    Replaced(View),
    Settled,
    Connected(bool),
    Notice(String),
    NoticeDismissed,
}

/// A render target that records every call for later assertions.
#[derive(Default)]
pub struct RecordingSurface {
    calls: Mutex<Vec<SurfaceCall>>,
}

impl RecordingSurface {
    pub fn calls(&self) -> Vec<SurfaceCall> {
        self.calls.lock().expect("calls lock").clone()
    }

    /// Every connected-indicator transition, in order.
    pub fn connected_flags(&self) -> Vec<bool> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                SurfaceCall::Connected(flag) => Some(flag),
                _ => None,
            })
            .collect()
    }

    /// Every placeholder message replaced onto the surface, in order.
    pub fn placeholder_messages(&self) -> Vec<String> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                SurfaceCall::Replaced(View::Placeholder { message, .. }) => Some(message),
                _ => None,
            })
            .collect()
    }

    /// Every content markup replaced onto the surface, in order.
    pub fn content_markups(&self) -> Vec<String> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                SurfaceCall::Replaced(View::Content { markup }) => Some(markup),
                _ => None,
            })
            .collect()
    }

    pub fn last_view(&self) -> Option<View> {
        self.calls()
            .into_iter()
            .rev()
            .find_map(|call| match call {
                SurfaceCall::Replaced(view) => Some(view),
                _ => None,
            })
    }

    fn record(&self, call: SurfaceCall) {
        self.calls.lock().expect("calls lock").push(call);
    }
}

impl Surface for RecordingSurface {
    fn replace(&self, view: View) {
        self.record(SurfaceCall::Replaced(view));
    }

    fn settle(&self) {
        self.record(SurfaceCall::Settled);
    }

    fn set_connected(&self, connected: bool) {
        self.record(SurfaceCall::Connected(connected));
    }

    fn show_notice(&self, text: &str) {
        self.record(SurfaceCall::Notice(text.to_string()));
    }

    fn dismiss_notice(&self) {
        self.record(SurfaceCall::NoticeDismissed);
    }
}

// ============================================================================
// In-process socket peer
// ============================================================================

/// A local WebSocket peer driven by a per-connection script.
///
/// Connections are served sequentially, which matches the client under test:
/// it never holds more than one transport.
pub struct SocketServer {
    port: u16,
    accepted: Arc<AtomicUsize>,
    _task: JoinHandle<()>,
}

impl SocketServer {
    pub fn url(&self) -> Url {
        Url::parse(&format!("ws://127.0.0.1:{}/ws", self.port)).expect("socket url")
    }

    /// How many handshakes have completed so far.
    pub fn accepted(&self) -> usize {
        self.accepted.load(Ordering::SeqCst)
    }
}

/// Start a socket peer. The handler receives each accepted connection and its
/// zero-based index; returning from the handler drops the connection.
pub async fn start_socket_server<H, Fut>(handler: H) -> SocketServer
where
    H: Fn(WebSocketStream<TcpStream>, usize) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = ()> + Send,
{
    let listener = TcpListener::bind(("127.0.0.1", 0))
        .await
        .expect("bind test listener");
    let port = listener.local_addr().expect("local addr").port();
    let accepted = Arc::new(AtomicUsize::new(0));
    let accepted_in_task = Arc::clone(&accepted);

    let task = tokio::spawn(async move {
        let mut index = 0;
        while let Ok((stream, _)) = listener.accept().await {
            let socket = match accept_async(stream).await {
                Ok(socket) => socket,
                Err(_) => continue,
            };
            accepted_in_task.fetch_add(1, Ordering::SeqCst);
            handler(socket, index).await;
            index += 1;
        }
    });

    SocketServer {
        port,
        accepted,
        _task: task,
    }
}

// ============================================================================
// Fake host bridge
// ============================================================================

pub struct FakeBridge {
    init_data: String,
    closed: Arc<AtomicBool>,
}

impl FakeBridge {
    pub fn new(init_data: &str) -> (Arc<Self>, Arc<AtomicBool>) {
        let closed = Arc::new(AtomicBool::new(false));
        let bridge = Arc::new(Self {
            init_data: init_data.to_string(),
            closed: Arc::clone(&closed),
        });
        (bridge, closed)
    }
}

impl HostBridge for FakeBridge {
    fn init_data(&self) -> String {
        self.init_data.clone()
    }

    fn close(&self) {
        self.closed.store(true, Ordering::SeqCst);
    }
}

// ============================================================================
// Polling
// ============================================================================

/// Poll a predicate until it holds or the timeout elapses.
pub async fn wait_for<F: Fn() -> bool>(predicate: F, timeout: Duration) -> bool {
    let deadline = tokio::time::Instant::now() + timeout;
    while tokio::time::Instant::now() < deadline {
        if predicate() {
            return true;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    predicate()
}

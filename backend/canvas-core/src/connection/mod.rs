//! Persistent-connection lifecycle management.
//!
//! This module owns the connect / open / receive / lose / reconnect cycle for
//! the canvas channel. All mutable state lives inside one event-loop task:
//! transport tasks and timers communicate with it exclusively through an mpsc
//! channel, and the loop processes one event at a time, so no two handlers
//! ever interleave. That serialization is what makes the lifecycle invariants
//! cheap to uphold:
//!
//! - one live transport per `Connecting`/`Open` state
//! - at most one pending reconnect timer; entering `Connecting` cancels it
//! - the connected indicator reflects `Open` and only `Open`
//!
//! Every transport attempt carries a fresh [`Uuid`]. Events from a superseded
//! attempt (a reader that lost a race with a reconnect, a handshake that
//! resolved after its transport was replaced) are discarded by identity, so a
//! stale transport can never resurrect a dead UI state.
//!
//! Reconnection is time-based with a constant delay. The policy lives behind
//! the [`Backoff`] trait, so swapping in a bounded exponential policy is a
//! one-type change; nothing externally observable depends on the exact delay
//! beyond "eventually retries".

mod state;

pub use state::ConnectionState;

use crate::config::TimingConfig;
use crate::error::connection::ConnectionError;
use crate::present::{Presenter, Surface};
use crate::protocol::ServerFrame;

use common::{ErrorLocation, SessionToken};

use std::panic::Location;
use std::sync::Arc;

use backoff::backoff::{Backoff, Constant};
use futures_util::StreamExt;
use log::{debug, info, warn};
use tokio::net::TcpStream;
use tokio::spawn as TokioSpawn;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::sleep as TokioSleep;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream, connect_async};
use url::Url;
use uuid::Uuid;

const RECONNECTING_MESSAGE: &str = "Connection lost. Reconnecting...";
const CONNECTED_NOTICE: &str = "Connected";
const EVENT_CHANNEL_CAPACITY: usize = 100;

type Transport = WebSocketStream<MaybeTlsStream<TcpStream>>;

/// Events delivered to the manager's event loop.
///
/// Transport tasks tag everything with the attempt id they were spawned for;
/// the loop discards events whose attempt has been superseded.
enum Event {
    /// Explicit `connect()` from the handle.
    ConnectRequested,
    /// A handshake completed; the transport is ready to read.
    Opened { attempt: Uuid, transport: Transport },
    /// A text frame arrived on the transport.
    Inbound { attempt: Uuid, raw: String },
    /// The transport failed to open, errored, or closed.
    Lost { attempt: Uuid },
    /// The scheduled reconnect delay elapsed.
    RetryDue,
}

/// Handle to a running connection manager.
///
/// Dropping the handle does not stop the manager; it runs for the lifetime of
/// the process, which matches the session model (the channel is retried
/// indefinitely and only the host closing the surface ends it).
pub struct ConnectionHandle {
    token: SessionToken,
    events_tx: mpsc::Sender<Event>,
}

impl ConnectionHandle {
    /// Open the canvas channel.
    ///
    /// Requires a non-empty session token; fails with `MissingCredential`
    /// (and the manager stays `Idle`) otherwise. Reconnection after a
    /// disruption happens automatically and reuses the same token.
    pub async fn connect(&self) -> Result<(), ConnectionError> {
        if self.token.is_empty() {
            return Err(ConnectionError::MissingCredential {
                message: "a session token is required before opening the canvas channel"
                    .to_string(),
                location: ErrorLocation::from(Location::caller()),
            });
        }

        self.events_tx
            .send(Event::ConnectRequested)
            .await
            .map_err(|e| ConnectionError::Dispatch {
                message: format!("connection manager is gone: {e}"),
                location: ErrorLocation::from(Location::caller()),
            })
    }
}

/// The connection lifecycle state machine.
///
/// Constructed via [`ConnectionManager::spawn`], which moves the manager into
/// its event-loop task and returns the [`ConnectionHandle`].
pub struct ConnectionManager {
    endpoint: Url,
    presenter: Presenter,
    surface: Arc<dyn Surface>,
    timing: TimingConfig,
    retry_policy: Constant,
    events_tx: mpsc::Sender<Event>,
    state: ConnectionState,
    attempt: Option<Uuid>,
    reader: Option<JoinHandle<()>>,
    reconnect_timer: Option<JoinHandle<()>>,
    notice_timer: Option<JoinHandle<()>>,
}

impl ConnectionManager {
    /// Spawn the manager's event loop and return the handle that drives it.
    ///
    /// `endpoint` is the fully parameterized socket URL (token included);
    /// reconnection reuses it as-is and never re-authenticates.
    pub fn spawn(
        token: SessionToken,
        endpoint: Url,
        presenter: Presenter,
        timing: TimingConfig,
    ) -> ConnectionHandle {
        let (events_tx, events_rx) = mpsc::channel(EVENT_CHANNEL_CAPACITY);

        let manager = ConnectionManager {
            endpoint,
            surface: presenter.surface(),
            presenter,
            retry_policy: Constant::new(timing.reconnect_delay()),
            timing,
            events_tx: events_tx.clone(),
            state: ConnectionState::Idle,
            attempt: None,
            reader: None,
            reconnect_timer: None,
            notice_timer: None,
        };

        TokioSpawn(manager.run(events_rx));

        ConnectionHandle { token, events_tx }
    }

    async fn run(mut self, mut events_rx: mpsc::Receiver<Event>) {
        info!("Connection manager started");

        while let Some(event) = events_rx.recv().await {
            match event {
                Event::ConnectRequested => self.begin_attempt(),
                Event::RetryDue => {
                    // A cancelled timer can still have an event in flight;
                    // only a closed-and-retrying state may act on it.
                    if matches!(self.state, ConnectionState::Closed { will_retry: true }) {
                        self.begin_attempt();
                    } else {
                        debug!("Discarding stale retry tick in state {:?}", self.state);
                    }
                }
                Event::Opened { attempt, transport } => self.on_opened(attempt, transport),
                Event::Inbound { attempt, raw } => self.on_inbound(attempt, &raw),
                Event::Lost { attempt } => self.on_lost(attempt),
            }
        }

        debug!("Connection manager stopped: all handles dropped");
    }

    /// Enter `Connecting` with a fresh transport attempt.
    ///
    /// Cancels any pending reconnect timer and releases any superseded
    /// transport before the new handshake starts.
    fn begin_attempt(&mut self) {
        if let Some(timer) = self.reconnect_timer.take() {
            timer.abort();
        }
        if let Some(reader) = self.reader.take() {
            reader.abort();
        }
        if self.state.is_open() {
            self.surface.set_connected(false);
        }

        let attempt = Uuid::new_v4();
        self.attempt = Some(attempt);
        self.state = ConnectionState::Connecting;
        debug!("Opening canvas channel (attempt {attempt})");

        let endpoint = self.endpoint.clone();
        let events_tx = self.events_tx.clone();
        TokioSpawn(async move {
            match connect_async(endpoint.as_str()).await {
                Ok((transport, _)) => {
                    let _ = events_tx.send(Event::Opened { attempt, transport }).await;
                }
                Err(e) => {
                    debug!("Canvas channel handshake failed: {e}");
                    let _ = events_tx.send(Event::Lost { attempt }).await;
                }
            }
        });
    }

    fn on_opened(&mut self, attempt: Uuid, transport: Transport) {
        if self.attempt != Some(attempt) || self.state != ConnectionState::Connecting {
            debug!("Discarding open event from superseded transport {attempt}");
            return;
        }

        self.state = ConnectionState::Open;
        self.retry_policy.reset();
        self.surface.set_connected(true);
        self.show_connected_notice();
        info!("Canvas channel open");

        let events_tx = self.events_tx.clone();
        self.reader = Some(TokioSpawn(read_frames(attempt, transport, events_tx)));
    }

    fn on_inbound(&mut self, attempt: Uuid, raw: &str) {
        if self.attempt != Some(attempt) || self.state != ConnectionState::Open {
            debug!("Discarding frame from superseded transport {attempt}");
            return;
        }

        let frame = match ServerFrame::parse(raw) {
            Ok(frame) => frame,
            Err(e) => {
                debug!("Discarding malformed frame: {e}");
                return;
            }
        };

        // Keep-alives carry no payload and cause no render.
        if let Some(payload) = frame.into_payload() {
            self.presenter.present(Some(payload));
        }
    }

    fn on_lost(&mut self, attempt: Uuid) {
        if self.attempt != Some(attempt) {
            debug!("Discarding loss event from superseded transport {attempt}");
            return;
        }

        if let Some(reader) = self.reader.take() {
            reader.abort();
        }

        self.state = ConnectionState::Closed { will_retry: true };
        self.surface.set_connected(false);
        self.presenter.present_error(RECONNECTING_MESSAGE, true, None);
        self.schedule_reconnect();
    }

    fn schedule_reconnect(&mut self) {
        if let Some(timer) = self.reconnect_timer.take() {
            timer.abort();
        }

        let delay = self
            .retry_policy
            .next_backoff()
            .unwrap_or_else(|| self.timing.reconnect_delay());
        warn!("Canvas channel lost, reconnecting in {delay:?}");

        let events_tx = self.events_tx.clone();
        self.reconnect_timer = Some(TokioSpawn(async move {
            TokioSleep(delay).await;
            let _ = events_tx.send(Event::RetryDue).await;
        }));
    }

    fn show_connected_notice(&mut self) {
        self.surface.show_notice(CONNECTED_NOTICE);

        if let Some(timer) = self.notice_timer.take() {
            timer.abort();
        }

        let surface = Arc::clone(&self.surface);
        let dwell = self.timing.connected_notice();
        self.notice_timer = Some(TokioSpawn(async move {
            TokioSleep(dwell).await;
            surface.dismiss_notice();
        }));
    }
}

/// Forward frames from an open transport into the event loop.
///
/// Ends on the first transport error or close and reports the loss. The task
/// is aborted when its attempt is superseded, so a stale reader never gets to
/// report anything.
async fn read_frames(attempt: Uuid, mut transport: Transport, events_tx: mpsc::Sender<Event>) {
    while let Some(next) = transport.next().await {
        match next {
            Ok(Message::Text(text)) => {
                let raw = text.to_string();
                if events_tx.send(Event::Inbound { attempt, raw }).await.is_err() {
                    return;
                }
            }
            Ok(Message::Close(_)) => break,
            // Binary, ping and pong frames carry no canvas traffic.
            Ok(_) => {}
            Err(e) => {
                debug!("Canvas channel read failed: {e}");
                break;
            }
        }
    }

    let _ = events_tx.send(Event::Lost { attempt }).await;
}

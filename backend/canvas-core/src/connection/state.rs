//! Connection lifecycle states.

/// Lifecycle of the persistent canvas channel.
///
/// Exactly one live transport exists per `Connecting`/`Open` state, and at
/// most one reconnect timer is pending at any time. The connected indicator
/// reflects `Open` and only `Open`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    /// No transport, no pending retry. The state before the first connect.
    Idle,
    /// A transport handshake is in flight.
    Connecting,
    /// The channel is live and delivering frames.
    Open,
    /// The transport is gone. `will_retry` records whether a reconnection
    /// is scheduled; every disruption in normal operation retries.
    Closed { will_retry: bool },
}

impl ConnectionState {
    pub fn is_open(&self) -> bool {
        matches!(self, ConnectionState::Open)
    }
}

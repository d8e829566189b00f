//! One-time startup sequencing.
//!
//! Linear, no retries at this level: authenticate, fetch the current state,
//! render it, then hand the session to the connection manager. The only
//! terminal failure is authentication - everything after it degrades into a
//! placeholder and the live channel's own recovery.

use crate::config::TimingConfig;
use crate::connection::{ConnectionHandle, ConnectionManager};
use crate::host::HostBridge;
use crate::present::{Presenter, ViewAction};
use crate::session::SessionClient;

use std::sync::Arc;

use log::{info, warn};

const CONNECTING_MESSAGE: &str = "Connecting...";
const DENIED_MESSAGE: &str = "Access denied";
const CLOSE_ACTION_LABEL: &str = "Close";

/// How the boot sequence ended.
pub enum BootOutcome {
    /// Authentication failed. The surface shows the terminal "Access denied"
    /// placeholder whose only action closes the host surface. Never retried.
    Denied,
    /// The live channel is running. The handle keeps the session reachable;
    /// the connection manager owns the lifecycle from here on.
    Online(ConnectionHandle),
}

/// Run the boot sequence.
///
/// Failure behavior: an authentication failure is fatal and surfaces the
/// close action; a state-fetch failure is "no content yet" and the session
/// still goes live.
pub async fn run(
    session: &SessionClient,
    presenter: &Presenter,
    bridge: Arc<dyn HostBridge>,
    timing: TimingConfig,
) -> BootOutcome {
    presenter.present_error(CONNECTING_MESSAGE, true, None);

    let init_data = bridge.init_data();
    let token = match session.authenticate(&init_data).await {
        Ok(token) => token,
        Err(e) => {
            warn!("Authentication failed: {e}");
            return denied(presenter, bridge);
        }
    };
    info!("Session established");

    // The socket endpoint derives from the same validated base URL the auth
    // call just used; failing here means the session cannot go live at all.
    let endpoint = match session.socket_url(&token) {
        Ok(endpoint) => endpoint,
        Err(e) => {
            warn!("Cannot derive socket endpoint: {e}");
            return denied(presenter, bridge);
        }
    };

    match session.fetch_state(&token).await {
        Ok(state) => presenter.present(state),
        Err(e) => {
            warn!("State fetch failed, starting with an empty canvas: {e}");
            presenter.present(None);
        }
    }

    let handle = ConnectionManager::spawn(token, endpoint, presenter.clone(), timing);
    if let Err(e) = handle.connect().await {
        // Only reachable with an empty token, which authenticate() never
        // returns; the reconnect cycle is not started for it.
        warn!("Connect refused: {e}");
    }

    BootOutcome::Online(handle)
}

fn denied(presenter: &Presenter, bridge: Arc<dyn HostBridge>) -> BootOutcome {
    let action = ViewAction::new(CLOSE_ACTION_LABEL, move || bridge.close());
    presenter.present_error(DENIED_MESSAGE, false, Some(action));
    BootOutcome::Denied
}

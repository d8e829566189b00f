//! Content presentation.
//!
//! The presenter turns payloads into the single representation the render
//! target holds: trusted HTML passes through verbatim, Markdown goes through
//! the renderer, and everything else becomes preformatted literal text. It
//! also owns the placeholder states ("Waiting for content...", the boot and
//! failure placeholders) and the cosmetic entry transition.
//!
//! The [`Surface`] trait is the seam to the host display. Replacement is
//! atomic from the viewer's perspective: a surface swaps the whole view, it
//! never mixes old and new content.

use crate::config::TimingConfig;
use crate::markdown;
use crate::protocol::{ContentFormat, Payload};

use std::fmt;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use tokio::spawn as TokioSpawn;
use tokio::task::JoinHandle;
use tokio::time::sleep as TokioSleep;

const WAITING_MESSAGE: &str = "Waiting for content...";

/// A user-triggerable action attached to a placeholder.
#[derive(Clone)]
pub struct ViewAction {
    label: String,
    handler: Arc<dyn Fn() + Send + Sync>,
}

impl ViewAction {
    pub fn new(label: &str, handler: impl Fn() + Send + Sync + 'static) -> Self {
        Self {
            label: label.to_string(),
            handler: Arc::new(handler),
        }
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    /// Invoke the action on behalf of the user.
    pub fn trigger(&self) {
        (self.handler)();
    }
}

impl fmt::Debug for ViewAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ViewAction")
            .field("label", &self.label)
            .finish_non_exhaustive()
    }
}

/// The single representation held by the render target at any instant.
#[derive(Debug, Clone)]
pub enum View {
    /// Centered message, optionally with a busy indicator and an action.
    Placeholder {
        message: String,
        busy: bool,
        action: Option<ViewAction>,
    },
    /// Rendered content markup.
    Content { markup: String },
}

/// The host display surface.
pub trait Surface: Send + Sync {
    /// Atomically replace the current representation. New content starts in
    /// the freshly-entered state.
    fn replace(&self, view: View);

    /// Clear the freshly-entered marker.
    fn settle(&self);

    /// Reflect the connection indicator.
    fn set_connected(&self, connected: bool);

    /// Show a transient notice above the content.
    fn show_notice(&self, text: &str);

    /// Remove the transient notice, if any.
    fn dismiss_notice(&self);
}

/// Selects a rendering strategy per payload and drives the surface.
///
/// Clone-able handle; all clones share the surface and the settle timer.
#[derive(Clone)]
pub struct Presenter {
    surface: Arc<dyn Surface>,
    settle_delay: Duration,
    settle_timer: Arc<Mutex<Option<JoinHandle<()>>>>,
}

impl Presenter {
    pub fn new(surface: Arc<dyn Surface>, timing: &TimingConfig) -> Self {
        Self {
            surface,
            settle_delay: timing.settle_delay(),
            settle_timer: Arc::new(Mutex::new(None)),
        }
    }

    pub(crate) fn surface(&self) -> Arc<dyn Surface> {
        Arc::clone(&self.surface)
    }

    /// Display a payload. `None` and `Clear` both show the waiting
    /// placeholder.
    pub fn present(&self, payload: Option<Payload>) {
        match payload {
            None | Some(Payload::Clear) => {
                self.cancel_settle();
                self.surface.replace(View::Placeholder {
                    message: WAITING_MESSAGE.to_string(),
                    busy: false,
                    action: None,
                });
            }
            Some(Payload::Content { format, body }) => {
                let markup = match format {
                    // Trust boundary: html originates only from the
                    // authenticated server channel.
                    ContentFormat::Html => body,
                    ContentFormat::Markdown => markdown::render(&body),
                    ContentFormat::Text => {
                        format!("<pre>{}</pre>", markdown::escape_text(&body))
                    }
                };
                self.surface.replace(View::Content { markup });
                self.schedule_settle();
            }
        }
    }

    /// Display one of the placeholder states ("Connecting...",
    /// "Access denied", "Connection lost. Reconnecting...").
    pub fn present_error(&self, message: &str, busy: bool, action: Option<ViewAction>) {
        self.cancel_settle();
        self.surface.replace(View::Placeholder {
            message: message.to_string(),
            busy,
            action,
        });
    }

    fn schedule_settle(&self) {
        let surface = Arc::clone(&self.surface);
        let delay = self.settle_delay;
        let timer = TokioSpawn(async move {
            TokioSleep(delay).await;
            surface.settle();
        });
        if let Ok(mut slot) = self.settle_timer.lock() {
            if let Some(previous) = slot.replace(timer) {
                previous.abort();
            }
        }
    }

    fn cancel_settle(&self) {
        if let Ok(mut slot) = self.settle_timer.lock() {
            if let Some(previous) = slot.take() {
                previous.abort();
            }
        }
    }
}

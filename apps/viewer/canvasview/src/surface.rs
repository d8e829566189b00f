//! Terminal render target.
//!
//! Holds exactly one view at a time and reprints the whole frame on every
//! change, so a replacement is atomic from the reader's perspective. The
//! header line carries the connection indicator, the transient notice and
//! the entry marker.

use canvas_core::present::{Surface, View};

use std::sync::Mutex;

#[derive(Default)]
struct SurfaceState {
    view: Option<View>,
    connected: bool,
    notice: Option<String>,
    entering: bool,
}

pub struct TerminalSurface {
    state: Mutex<SurfaceState>,
    echo: bool,
}

impl TerminalSurface {
    pub fn new() -> Self {
        Self::with_echo(true)
    }

    #[cfg(test)]
    pub(crate) fn muted() -> Self {
        Self::with_echo(false)
    }

    fn with_echo(echo: bool) -> Self {
        Self {
            state: Mutex::new(SurfaceState::default()),
            echo,
        }
    }

    /// The current frame as text.
    pub fn render(&self) -> String {
        let Ok(state) = self.state.lock() else {
            return String::new();
        };

        let indicator = if state.connected { "●" } else { "○" };
        let mut header = format!("── canvas {indicator}");
        if state.entering {
            header.push_str(" ~");
        }
        if let Some(notice) = &state.notice {
            header.push_str(&format!("  [{notice}]"));
        }

        let mut lines = vec![header];
        match &state.view {
            None => {}
            Some(View::Placeholder {
                message,
                busy,
                action,
            }) => {
                let mut line = String::new();
                if *busy {
                    line.push_str("… ");
                }
                line.push_str(message);
                lines.push(line);
                if let Some(action) = action {
                    lines.push(format!("[{}]", action.label()));
                }
            }
            Some(View::Content { markup }) => {
                lines.push(markup.clone());
            }
        }

        lines.join("\n")
    }

    /// Trigger the current placeholder's action, as a user activating the
    /// button would. Returns whether an action fired.
    pub fn activate_action(&self) -> bool {
        let action = {
            let Ok(state) = self.state.lock() else {
                return false;
            };
            match &state.view {
                Some(View::Placeholder {
                    action: Some(action),
                    ..
                }) => Some(action.clone()),
                _ => None,
            }
        };

        match action {
            Some(action) => {
                action.trigger();
                true
            }
            None => false,
        }
    }

    fn mutate(&self, apply: impl FnOnce(&mut SurfaceState)) {
        if let Ok(mut state) = self.state.lock() {
            apply(&mut state);
        }
        if self.echo {
            println!("{}\n", self.render());
        }
    }
}

impl Default for TerminalSurface {
    fn default() -> Self {
        Self::new()
    }
}

impl Surface for TerminalSurface {
    fn replace(&self, view: View) {
        let entering = matches!(view, View::Content { .. });
        self.mutate(|state| {
            state.view = Some(view);
            state.entering = entering;
        });
    }

    fn settle(&self) {
        self.mutate(|state| state.entering = false);
    }

    fn set_connected(&self, connected: bool) {
        self.mutate(|state| state.connected = connected);
    }

    fn show_notice(&self, text: &str) {
        let text = text.to_string();
        self.mutate(|state| state.notice = Some(text));
    }

    fn dismiss_notice(&self) {
        self.mutate(|state| state.notice = None);
    }
}

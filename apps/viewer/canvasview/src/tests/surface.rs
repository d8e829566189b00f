// Unit tests for the terminal render target

use crate::surface::TerminalSurface;

use canvas_core::present::{Surface, View, ViewAction};

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

/// **VALUE**: Verifies the initial frame: disconnected indicator, no view.
#[test]
fn given_fresh_surface_when_rendered_then_disconnected_and_empty() {
    let surface = TerminalSurface::muted();

    assert_eq!(surface.render(), "── canvas ○");
}

/// **VALUE**: Verifies a placeholder frame carries the message, the busy
/// marker and the action label.
///
/// **WHY THIS MATTERS**: These three placeholder ingredients are the entire
/// failure UX ("Connecting...", "Access denied" + Close, "Connection
/// lost..."). Dropping any of them leaves the user without feedback.
#[test]
fn given_placeholder_view_when_rendered_then_message_busy_and_action_shown() {
    let surface = TerminalSurface::muted();

    surface.replace(View::Placeholder {
        message: "Access denied".to_string(),
        busy: false,
        action: Some(ViewAction::new("Close", || {})),
    });
    let denied = surface.render();
    assert!(denied.contains("Access denied"));
    assert!(denied.contains("[Close]"));

    surface.replace(View::Placeholder {
        message: "Connecting...".to_string(),
        busy: true,
        action: None,
    });
    let connecting = surface.render();
    assert!(connecting.contains("… Connecting..."));
    assert!(!connecting.contains("[Close]"), "old view fully replaced");
}

/// **VALUE**: Verifies content replacement is atomic and the entry marker
/// settles.
///
/// **BUG THIS CATCHES**: Would catch stale placeholder lines surviving under
/// new content, or the entry marker never clearing.
#[test]
fn given_content_view_when_rendered_then_markup_shown_and_entry_marker_settles() {
    let surface = TerminalSurface::muted();

    surface.replace(View::Placeholder {
        message: "Waiting for content...".to_string(),
        busy: false,
        action: None,
    });
    surface.replace(View::Content {
        markup: "<h1>Hi</h1>".to_string(),
    });

    let entering = surface.render();
    assert!(entering.contains("<h1>Hi</h1>"));
    assert!(!entering.contains("Waiting"), "old view fully replaced");
    assert!(entering.contains("~"), "fresh content carries the entry marker");

    surface.settle();
    assert!(!surface.render().contains("~"), "settle clears the marker");
}

/// **VALUE**: Verifies the connected indicator and the transient notice
/// reflect their setters exactly.
#[test]
fn given_indicator_and_notice_changes_when_rendered_then_header_tracks_them() {
    let surface = TerminalSurface::muted();

    surface.set_connected(true);
    surface.show_notice("Connected");
    let open = surface.render();
    assert!(open.starts_with("── canvas ●"));
    assert!(open.contains("[Connected]"));

    surface.dismiss_notice();
    surface.set_connected(false);
    let closed = surface.render();
    assert!(closed.starts_with("── canvas ○"));
    assert!(!closed.contains("[Connected]"));
}

/// **VALUE**: Verifies activate_action triggers the current placeholder's
/// action exactly when one is present.
///
/// **WHY THIS MATTERS**: This is the keyboard stand-in for the close button
/// on the denied screen; firing on the wrong view would close the surface
/// during normal operation.
#[test]
fn given_views_with_and_without_action_when_activated_then_fires_only_with_action() {
    let surface = TerminalSurface::muted();
    let fired = Arc::new(AtomicBool::new(false));
    let fired_clone = Arc::clone(&fired);

    assert!(!surface.activate_action(), "no view, nothing to fire");

    surface.replace(View::Content {
        markup: "x".to_string(),
    });
    assert!(!surface.activate_action(), "content carries no action");

    surface.replace(View::Placeholder {
        message: "Access denied".to_string(),
        busy: false,
        action: Some(ViewAction::new("Close", move || {
            fired_clone.store(true, Ordering::SeqCst);
        })),
    });
    assert!(surface.activate_action());
    assert!(fired.load(Ordering::SeqCst), "handler ran");
}

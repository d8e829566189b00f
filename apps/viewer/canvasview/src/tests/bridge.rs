// Unit tests for the environment-backed host bridge

use crate::bridge::EnvBridge;

use canvas_core::host::HostBridge;

use std::sync::Arc;
use std::time::Duration;

use serial_test::serial;
use tokio::sync::Notify;

/// **VALUE**: Verifies init data comes from the environment, with an empty
/// default when unset.
///
/// **WHY THIS MATTERS**: Missing init data must not crash boot; it flows to
/// the auth endpoint as an empty string and fails there, landing on the
/// designed "Access denied" path.
#[test]
#[serial]
fn given_env_var_when_init_data_read_then_value_or_empty_default() {
    let bridge = EnvBridge::new(Arc::new(Notify::new()));

    unsafe { std::env::remove_var("CANVAS_INIT_DATA") };
    assert_eq!(bridge.init_data(), "");

    unsafe { std::env::set_var("CANVAS_INIT_DATA", "init-123") };
    assert_eq!(bridge.init_data(), "init-123");

    unsafe { std::env::remove_var("CANVAS_INIT_DATA") };
}

/// **VALUE**: Verifies close() trips the shutdown notifier, including when
/// nobody is waiting yet (the permit is stored).
///
/// **BUG THIS CATCHES**: Would catch a switch to `notify_waiters()`, which
/// drops the signal if close() wins the race against the main loop reaching
/// its await point.
#[tokio::test]
async fn given_close_called_when_waiter_arrives_later_then_notification_received() {
    let closed = Arc::new(Notify::new());
    let bridge = EnvBridge::new(Arc::clone(&closed));

    bridge.close();

    let woken = tokio::time::timeout(Duration::from_millis(100), closed.notified()).await;
    assert!(woken.is_ok(), "stored permit wakes the later waiter");
}

//! Environment-backed host bridge.
//!
//! For running the viewer outside any embedding host: init data comes from
//! the environment, and closing the surface trips the shutdown notifier the
//! main loop parks on.

use canvas_core::host::HostBridge;

use std::sync::Arc;

use log::info;
use tokio::sync::Notify;

const INIT_DATA_VAR: &str = "CANVAS_INIT_DATA";

pub struct EnvBridge {
    closed: Arc<Notify>,
}

impl EnvBridge {
    pub fn new(closed: Arc<Notify>) -> Self {
        Self { closed }
    }
}

impl HostBridge for EnvBridge {
    fn init_data(&self) -> String {
        std::env::var(INIT_DATA_VAR).unwrap_or_default()
    }

    fn close(&self) {
        info!("Close requested through the host bridge");
        self.closed.notify_one();
    }
}

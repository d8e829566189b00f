// Library exports for testing
// The binary (main.rs) imports these as well

pub mod bridge;
pub mod error;
pub mod logger;
pub mod surface;

#[cfg(test)]
mod tests;

use crate::bridge::EnvBridge;
use crate::error::ViewerError;
use crate::surface::TerminalSurface;

use canvas_core::boot::{self, BootOutcome};
use canvas_core::config::AppConfig;
use canvas_core::error::CoreError;
use canvas_core::host::HostBridge;
use canvas_core::present::{Presenter, Surface};
use canvas_core::session::SessionClient;

use common::ErrorLocation;

use std::fs::create_dir_all;
use std::panic::Location;
use std::path::PathBuf;
use std::sync::Arc;

use log::{info, warn};
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::Notify;

const APP_DIR_NAME: &str = "canvasview";
const SERVER_URL_VAR: &str = "CANVAS_SERVER_URL";

/// Start the viewer: logging, config, then hand off to the boot sequence.
///
/// Blocks until the host bridge closes the surface or the process is
/// interrupted.
pub fn run() -> Result<(), ViewerError> {
    // .env first so overrides are visible to everything below
    let _ = dotenvy::dotenv();

    let log_dir = data_dir()?.join(APP_DIR_NAME).join("logs");
    create_dir_all(&log_dir).map_err(|e| ViewerError::Viewer {
        message: format!("Failed to create log directory: {e}"),
        location: ErrorLocation::from(Location::caller()),
    })?;
    logger::initialize(&log_dir)?;

    info!("canvasview starting");
    info!("Log directory: {}", log_dir.display());

    let config = load_config();
    info!("Canvas server: {}", config.server.base_url);

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .map_err(|e| ViewerError::Viewer {
            message: format!("Failed to start runtime: {e}"),
            location: ErrorLocation::from(Location::caller()),
        })?;

    runtime.block_on(serve(config))
}

fn data_dir() -> Result<PathBuf, ViewerError> {
    dirs::data_local_dir().ok_or_else(|| ViewerError::Viewer {
        message: "No local data directory available".to_string(),
        location: ErrorLocation::from(Location::caller()),
    })
}

fn load_config() -> AppConfig {
    let mut config = match dirs::config_dir() {
        Some(dir) => AppConfig::load(&dir.join(APP_DIR_NAME)).unwrap_or_else(|e| {
            warn!("Config unusable, falling back to defaults: {e}");
            AppConfig::default()
        }),
        None => AppConfig::default(),
    };

    if let Ok(url) = std::env::var(SERVER_URL_VAR) {
        info!("Server URL override from {SERVER_URL_VAR}");
        config.server.base_url = url;
    }

    config
}

async fn serve(config: AppConfig) -> Result<(), ViewerError> {
    let closed = Arc::new(Notify::new());
    let bridge: Arc<dyn HostBridge> = Arc::new(EnvBridge::new(Arc::clone(&closed)));

    let terminal = Arc::new(TerminalSurface::new());
    let dyn_surface: Arc<dyn Surface> = terminal.clone();
    let presenter = Presenter::new(dyn_surface, &config.timing);

    let session = SessionClient::new(&config.server.base_url).map_err(CoreError::Session)?;

    match boot::run(&session, &presenter, bridge, config.timing.clone()).await {
        BootOutcome::Denied => {
            // The denied placeholder's only action closes the surface; any
            // input line stands in for activating it.
            let wait_close = async {
                let mut line = String::new();
                let mut input = BufReader::new(tokio::io::stdin());
                let _ = input.read_line(&mut line).await;
                terminal.activate_action();
                closed.notified().await;
            };
            tokio::select! {
                _ = wait_close => {}
                _ = tokio::signal::ctrl_c() => info!("Interrupted"),
            }
        }
        BootOutcome::Online(_handle) => {
            // The handle keeps the session alive; the connection manager owns
            // the lifecycle until the host closes the surface.
            tokio::select! {
                _ = closed.notified() => info!("Host bridge closed the surface"),
                _ = tokio::signal::ctrl_c() => info!("Interrupted"),
            }
        }
    }

    info!("canvasview shutting down");
    Ok(())
}

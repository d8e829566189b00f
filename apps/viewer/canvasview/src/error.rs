use common::ErrorLocation;

use canvas_core::error::CoreError;

use thiserror::Error;

/// Errors that can occur while wiring up the viewer.
///
/// Once the boot sequence is running, failures are handled by the core
/// (placeholders, reconnect cycle) and never surface here.
#[derive(Debug, Error)]
pub enum ViewerError {
    /// Error from this app's own setup (directories, logger, runtime)
    #[error("Viewer Error: {message} {location}")]
    Viewer {
        message: String,
        location: ErrorLocation,
    },

    /// Error from canvas-core operations
    #[error(transparent)]
    Core(#[from] CoreError),
}

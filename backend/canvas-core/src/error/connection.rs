use common::ErrorLocation;

use thiserror::Error as ThisError;

#[derive(Debug, ThisError)]
pub enum ConnectionError {
    #[error("Missing Credential Error: {message} {location}")]
    MissingCredential {
        message: String,
        location: ErrorLocation,
    },

    #[error("Dispatch Error: {message} {location}")]
    Dispatch {
        message: String,
        location: ErrorLocation,
    },
}

//! Top-level error type for a parkfinder session

use thiserror::Error;

use crate::data::{NpsError, PlacesError};

/// Errors that end an interactive session
///
/// Invalid menu input is not an error: the driver reports it and prompts again.
#[derive(Debug, Error)]
pub enum AppError {
    /// Fetching or parsing an nps.gov page failed
    #[error(transparent)]
    Nps(#[from] NpsError),

    /// Looking up nearby places failed
    #[error(transparent)]
    Places(#[from] PlacesError),

    /// Reading the prompt or writing output failed
    #[error("Console I/O failed: {0}")]
    Io(#[from] std::io::Error),
}

use common::ErrorLocation;

use thiserror::Error;

/// Errors raised by the inverse-search callback process.
///
/// The process has no UI: every variant ends up in the log file and as a
/// non-zero exit code the viewer ignores.
#[derive(Debug, Error)]
pub enum InverseSearchError {
    /// The viewer handed us something that is not a binding
    #[error("Argument Error: {message} {location}")]
    Arguments {
        message: String,
        location: ErrorLocation,
    },

    /// Logger could not be set up
    #[error("Logger Error: {message} {location}")]
    Logger {
        message: String,
        location: ErrorLocation,
    },
}

use common::ErrorLocation;

use std::error::Error as StdError;
use std::path::PathBuf;

use thiserror::Error as ThisError;

#[derive(Debug, ThisError)]
pub enum LaunchError {
    #[error("Spawn Error: {path}: {message} {location}")]
    Spawn {
        path: PathBuf,
        message: String,
        location: ErrorLocation,
        #[source]
        source: Box<dyn StdError + Send + Sync>,
    },

    #[error("Not Configured Error: {message} {location}")]
    NotConfigured {
        message: String,
        location: ErrorLocation,
    },
}

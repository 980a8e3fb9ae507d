use common::ErrorLocation;

use thiserror::Error as ThisError;

#[derive(Debug, ThisError)]
pub enum BindingError {
    #[error("Binding Parse Error: {message} {location}")]
    Parse {
        message: String,
        location: ErrorLocation,
    },

    #[error("Window Id Error: {message} {location}")]
    WindowId {
        message: String,
        location: ErrorLocation,
    },
}

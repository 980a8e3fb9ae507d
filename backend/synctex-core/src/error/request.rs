use common::ErrorLocation;

use thiserror::Error as ThisError;

#[derive(Debug, ThisError)]
pub enum RequestError {
    #[error("Invalid Request Error: {message} {location}")]
    Invalid {
        message: String,
        location: ErrorLocation,
    },
}

//! Command line as written by the viewer after placeholder substitution:
//!
//! ```text
//! inverse-search <window-id> <port> <secret> <source-file> <line>
//! ```
//!
//! An editor without a secret registers an empty token, which the viewer's
//! own command-line splitting drops entirely. Four positionals therefore mean
//! "no secret" and are forwarded as such; the listener rejects them.

use crate::error::InverseSearchError;

use synctex_core::callback::CallbackOutcome;
use synctex_core::error::ipc::IpcError;
use synctex_core::proto::InverseSearchCallback;
use synctex_core::session::WindowId;

use common::ErrorLocation;

use std::panic::Location;

use clap::Parser;

pub const EXIT_ACCEPTED: u8 = 0;
pub const EXIT_REJECTED: u8 = 1;
pub const EXIT_ERROR: u8 = 2;

#[derive(Parser)]
#[command(
    name = "inverse-search",
    version,
    about = "Forward a PDF viewer click to the editor that opened the document"
)]
pub struct Cli {
    /// Editor window handle (hex with 0x prefix, or decimal)
    pub window_id: String,

    /// Loopback port of the editor's listener
    pub port: u16,

    /// [secret] <source-file> <line>
    #[arg(num_args = 2..=3, required = true, allow_hyphen_values = true)]
    pub rest: Vec<String>,
}

impl Cli {
    /// Turn the parsed arguments into the frame sent to the listener.
    ///
    /// # Errors
    ///
    /// Returns [`InverseSearchError::Arguments`] for a malformed window id or
    /// line number.
    #[track_caller]
    pub fn into_callback(self) -> Result<InverseSearchCallback, InverseSearchError> {
        let window_id = self
            .window_id
            .parse::<WindowId>()
            .map_err(|e| InverseSearchError::Arguments {
                message: e.to_string(),
                location: ErrorLocation::from(Location::caller()),
            })?;

        let mut rest = self.rest.into_iter();
        let (secret, source_path, line) = match (rest.next(), rest.next(), rest.next()) {
            (Some(secret), Some(path), Some(line)) => (secret, path, line),
            (Some(path), Some(line), None) => (String::new(), path, line),
            _ => {
                return Err(InverseSearchError::Arguments {
                    message: "Expected [secret] <source-file> <line>".to_string(),
                    location: ErrorLocation::from(Location::caller()),
                });
            }
        };

        let source_line = line
            .parse::<u32>()
            .ok()
            .filter(|line| *line > 0)
            .ok_or_else(|| InverseSearchError::Arguments {
                message: format!("Invalid source line '{line}'"),
                location: ErrorLocation::from(Location::caller()),
            })?;

        Ok(InverseSearchCallback {
            window_id: window_id.as_u64(),
            port: u32::from(self.port),
            secret,
            source_path,
            source_line,
        })
    }
}

/// Process exit code for a callback attempt: 0 accepted, 1 rejected, 2 error.
pub fn exit_code(result: &Result<CallbackOutcome, IpcError>) -> u8 {
    match result {
        Ok(CallbackOutcome::Accepted) => EXIT_ACCEPTED,
        Ok(CallbackOutcome::Rejected) => EXIT_REJECTED,
        Err(_) => EXIT_ERROR,
    }
}

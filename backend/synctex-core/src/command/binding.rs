use crate::config::ViewerFlags;
use crate::error::binding::BindingError;
use crate::session::{Provisioner, WindowId};

use common::{ErrorLocation, SharedSecret};

use std::panic::Location;
use std::path::{Path, PathBuf};

use log::warn;
use regex::{Captures, Regex};

const CAPTURE_EXE: &str = "exe";
const CAPTURE_WINDOW: &str = "window";
const CAPTURE_PORT: &str = "port";
const CAPTURE_SECRET: &str = "secret";

/// The callback invocation the viewer stores and runs on every click.
///
/// Rebuilt from the provisioner on each forward search / open, because the
/// viewer keeps only the last command string it was given.
#[derive(Debug, Clone)]
pub struct InverseSearchBinding {
    pub callback_executable_path: PathBuf,
    pub caller_window_id: WindowId,
    pub listen_port: u16,
    pub shared_secret: SharedSecret,
}

impl InverseSearchBinding {
    /// Snapshot the provisioner's current values.
    pub fn from_provisioner(
        callback_executable_path: impl Into<PathBuf>,
        provisioner: &dyn Provisioner,
    ) -> Self {
        Self {
            callback_executable_path: callback_executable_path.into(),
            caller_window_id: provisioner.caller_window_id(),
            listen_port: provisioner.current_port(),
            shared_secret: provisioner.current_secret(),
        }
    }

    /// Serialize into the single argument passed after the inverse-search flag:
    ///
    /// `"<exe>" <windowId> <port> <secret> "%f" %l`
    ///
    /// A secret that cannot be embedded as one bare word is replaced by the
    /// empty token, which the listener always rejects.
    pub fn to_argument(&self, flags: &ViewerFlags) -> String {
        let secret = if self.shared_secret.is_embeddable() {
            self.shared_secret.as_str()
        } else {
            warn!("Shared secret is not embeddable in a command line, binding an empty token");
            ""
        };

        format!(
            "\"{exe}\" {window} {port} {secret} \"{file}\" {line}",
            exe = self.callback_executable_path.display(),
            window = self.caller_window_id,
            port = self.listen_port,
            file = flags.file_placeholder,
            line = flags.line_placeholder,
        )
    }

    /// Recover a binding from its serialized argument.
    ///
    /// # Errors
    ///
    /// Returns [`BindingError::Parse`] if the argument does not have the
    /// shape produced by [`to_argument`](Self::to_argument), and
    /// [`BindingError::WindowId`] if the window id is malformed.
    #[track_caller]
    pub fn parse(argument: &str, flags: &ViewerFlags) -> Result<Self, BindingError> {
        let re = binding_regex(flags)?;

        let caps = re.captures(argument).ok_or_else(|| BindingError::Parse {
            message: "Argument is not an inverse-search binding".to_string(),
            location: ErrorLocation::from(Location::caller()),
        })?;

        let callback_executable_path = Path::new(capture(&caps, CAPTURE_EXE)?).to_path_buf();
        let caller_window_id = capture(&caps, CAPTURE_WINDOW)?.parse::<WindowId>()?;
        let port_str = capture(&caps, CAPTURE_PORT)?;
        let listen_port = port_str.parse::<u16>().map_err(|e| BindingError::Parse {
            message: format!("Invalid port '{port_str}': {e}"),
            location: ErrorLocation::from(Location::caller()),
        })?;
        let shared_secret = SharedSecret::new(capture(&caps, CAPTURE_SECRET)?);

        Ok(Self {
            callback_executable_path,
            caller_window_id,
            listen_port,
            shared_secret,
        })
    }
}

#[track_caller]
fn capture<'h>(caps: &Captures<'h>, name: &str) -> Result<&'h str, BindingError> {
    caps.name(name)
        .map(|m| m.as_str())
        .ok_or_else(|| BindingError::Parse {
            message: format!("Regex matched but missing '{name}' capture group"),
            location: ErrorLocation::from(Location::caller()),
        })
}

#[track_caller]
fn binding_regex(flags: &ViewerFlags) -> Result<Regex, BindingError> {
    let pattern = format!(
        r#"^"(?P<{CAPTURE_EXE}>[^"]*)" (?P<{CAPTURE_WINDOW}>\S+) (?P<{CAPTURE_PORT}>\d+) (?P<{CAPTURE_SECRET}>\S*) "{file}" {line}$"#,
        file = regex::escape(&flags.file_placeholder),
        line = regex::escape(&flags.line_placeholder),
    );

    Regex::new(&pattern).map_err(|e| BindingError::Parse {
        message: format!("Invalid binding pattern: {e}"),
        location: ErrorLocation::from(Location::caller()),
    })
}

//! Session identity shared by both halves of the bridge.
//!
//! - [`WindowId`]: the editor window an inverse search navigates
//! - [`ViewerSession`]: how the viewer is invoked, fixed for the process lifetime
//! - [`Provisioner`]: read-only access to the secret, port and window id

pub mod provisioner;

pub use provisioner::{EnvProvisioner, Provisioner, provision_secret};

use crate::config::ViewerConfig;
use crate::error::binding::BindingError;

use common::ErrorLocation;

use std::fmt;
use std::panic::Location;
use std::path::PathBuf;
use std::str::FromStr;

/// Native handle of an editor window, as passed through the viewer.
///
/// Displays as lowercase hex (`0x1001`); parses hex with a `0x` prefix or
/// plain decimal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct WindowId(pub u64);

impl WindowId {
    pub fn as_u64(self) -> u64 {
        self.0
    }
}

impl fmt::Display for WindowId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:#x}", self.0)
    }
}

impl FromStr for WindowId {
    type Err = BindingError;

    #[track_caller]
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let parsed = match s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")) {
            Some(hex) => u64::from_str_radix(hex, 16),
            None => s.parse::<u64>(),
        };

        parsed.map(WindowId).map_err(|e| BindingError::WindowId {
            message: format!("Invalid window id '{s}': {e}"),
            location: ErrorLocation::from(Location::caller()),
        })
    }
}

impl From<u64> for WindowId {
    fn from(value: u64) -> Self {
        WindowId(value)
    }
}

/// How the viewer executable is invoked. Supplied once at bridge construction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ViewerSession {
    pub viewer_executable_path: Option<PathBuf>,
    pub reuse_instance: bool,
    pub background_color: String,
}

impl From<&ViewerConfig> for ViewerSession {
    fn from(config: &ViewerConfig) -> Self {
        Self {
            viewer_executable_path: config.executable_path.clone(),
            reuse_instance: config.reuse_instance,
            background_color: config.background_color.clone(),
        }
    }
}

/// Where an editor session stands in the synchronization handshake.
///
/// `Bound` is re-entered on every forward search / open. Only a process
/// restart goes back to `Uninitialized`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionPhase {
    /// No secret in the environment. Every callback will be rejected.
    Uninitialized,
    /// A secret exists but no binding has been handed to the viewer yet.
    SecretProvisioned,
    /// At least one binding was handed to the viewer; no listener is running.
    Bound,
    /// Bindings are out and the listener is accepting callbacks.
    ListenerActive,
}

impl SessionPhase {
    pub fn derive(secret_provisioned: bool, bindings_issued: u64, listener_active: bool) -> Self {
        match (secret_provisioned, bindings_issued, listener_active) {
            (false, _, _) => SessionPhase::Uninitialized,
            (true, 0, _) => SessionPhase::SecretProvisioned,
            (true, _, false) => SessionPhase::Bound,
            (true, _, true) => SessionPhase::ListenerActive,
        }
    }
}

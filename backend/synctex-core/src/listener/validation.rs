//! Fail-closed validation of an inbound inverse-search callback.

use crate::listener::dispatch::NavigateToSource;
use crate::listener::windows::LiveWindows;
use crate::proto::InverseSearchCallback;
use crate::session::WindowId;

use common::SharedSecret;

use std::fmt;
use std::path::PathBuf;

/// Why a callback was dropped. Only ever logged, never sent back.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum RejectReason {
    NoSecretProvisioned,
    EmptySecret,
    SecretMismatch,
    UnknownWindow,
    PortMismatch,
    EmptyPath,
    InvalidLine,
}

impl fmt::Display for RejectReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let reason = match self {
            RejectReason::NoSecretProvisioned => "no secret provisioned for this session",
            RejectReason::EmptySecret => "callback presented an empty secret",
            RejectReason::SecretMismatch => "secret mismatch (stale or foreign binding)",
            RejectReason::UnknownWindow => "window id does not match a live editor window",
            RejectReason::PortMismatch => "port does not match this listener",
            RejectReason::EmptyPath => "empty source path",
            RejectReason::InvalidLine => "source line must be 1-based",
        };
        f.write_str(reason)
    }
}

/// Check a decoded callback against the session.
///
/// `current_secret` is read by the caller immediately before validation, so
/// a regenerated secret invalidates every older binding.
pub(crate) async fn validate(
    callback: &InverseSearchCallback,
    listen_port: u16,
    current_secret: &SharedSecret,
    windows: &LiveWindows,
) -> Result<NavigateToSource, RejectReason> {
    if current_secret.is_empty() {
        return Err(RejectReason::NoSecretProvisioned);
    }
    if callback.secret.is_empty() {
        return Err(RejectReason::EmptySecret);
    }
    if !current_secret.matches(&callback.secret) {
        return Err(RejectReason::SecretMismatch);
    }

    let window_id = WindowId(callback.window_id);
    if !windows.contains(window_id).await {
        return Err(RejectReason::UnknownWindow);
    }

    if callback.port != u32::from(listen_port) {
        return Err(RejectReason::PortMismatch);
    }
    if callback.source_path.is_empty() {
        return Err(RejectReason::EmptyPath);
    }
    if callback.source_line == 0 {
        return Err(RejectReason::InvalidLine);
    }

    Ok(NavigateToSource {
        window_id,
        path: PathBuf::from(&callback.source_path),
        line: callback.source_line,
    })
}

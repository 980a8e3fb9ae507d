use crate::session::WindowId;

use common::SharedSecret;

use std::env;

use log::{info, warn};
use uuid::Uuid;

/// Read-only view of the per-session values an inverse-search binding needs.
///
/// Accessors never fail. Anything unavailable comes back empty or zero and
/// is rejected downstream by the listener; it is never read as "no
/// authentication required".
pub trait Provisioner: Send + Sync {
    fn current_secret(&self) -> SharedSecret;
    fn current_port(&self) -> u16;
    fn caller_window_id(&self) -> WindowId;
}

/// Provisioner backed by a process-wide environment variable.
///
/// The secret is re-read on every call, so a regenerated secret takes effect
/// immediately for both new bindings and listener validation.
#[derive(Debug, Clone)]
pub struct EnvProvisioner {
    secret_var: String,
    port: u16,
    window_id: WindowId,
}

impl EnvProvisioner {
    pub fn new(secret_var: impl Into<String>, port: u16, window_id: WindowId) -> Self {
        Self {
            secret_var: secret_var.into(),
            port,
            window_id,
        }
    }
}

impl Provisioner for EnvProvisioner {
    fn current_secret(&self) -> SharedSecret {
        match env::var(&self.secret_var) {
            Ok(value) => SharedSecret::new(value),
            Err(env::VarError::NotPresent) => SharedSecret::empty(),
            Err(env::VarError::NotUnicode(_)) => {
                warn!(
                    "{} is not valid unicode, treating secret as empty",
                    self.secret_var
                );
                SharedSecret::empty()
            }
        }
    }

    fn current_port(&self) -> u16 {
        self.port
    }

    fn caller_window_id(&self) -> WindowId {
        self.window_id
    }
}

/// Generate a fresh session secret and install it in `secret_var`.
///
/// Called once at editor startup. Calling it again regenerates the secret,
/// which invalidates every binding the viewer still holds.
///
/// # Safety
///
/// Mutates the process environment. Must be called before any other thread
/// may read or write environment variables (typically first thing in
/// `main`, before the async runtime starts).
pub unsafe fn provision_secret(secret_var: &str) -> SharedSecret {
    let token = Uuid::new_v4().simple().to_string();

    // SAFETY: upheld by the caller per this function's contract.
    unsafe { env::set_var(secret_var, &token) };

    info!("Provisioned inverse-search secret in {secret_var} ({} chars)", token.len());
    SharedSecret::new(token)
}

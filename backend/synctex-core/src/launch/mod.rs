//! Detached viewer launch.
//!
//! The viewer is started (or, with instance reuse, handed the request) and
//! forgotten: the caller never waits on it and keeps no handle. A spawn
//! failure is returned so it can be logged, but nothing retries it. With an
//! instance already running, a failed launch and a successful hand-off look
//! the same on screen.

use crate::INVERSE_SEARCH_BINARY;
use crate::error::launch::LaunchError;

use common::ErrorLocation;

use std::env::consts::EXE_SUFFIX;
use std::env::current_exe;
use std::ffi::OsString;
use std::panic::Location;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use std::thread;

use log::{debug, info, trace};

/// Starts an external process without waiting for it.
pub trait ProcessLauncher: Send + Sync {
    /// Spawn `executable` with `args`. Must not block on the child.
    fn launch(&self, executable: &Path, args: &[OsString]) -> Result<(), LaunchError>;
}

/// Launches via `std::process` with null stdio.
///
/// The child is reaped on a short-lived background thread so a long-running
/// viewer never leaves a zombie behind; its exit status only reaches the log.
#[derive(Debug, Default, Clone, Copy)]
pub struct DetachedLauncher;

pub(crate) fn build_launch_command(executable: &Path, args: &[OsString]) -> Command {
    let mut cmd = Command::new(executable);
    cmd.args(args)
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::null());
    cmd
}

impl ProcessLauncher for DetachedLauncher {
    #[track_caller]
    fn launch(&self, executable: &Path, args: &[OsString]) -> Result<(), LaunchError> {
        debug!("Launching {} with {} args", executable.display(), args.len());

        let mut child = build_launch_command(executable, args)
            .spawn()
            .map_err(|e| LaunchError::Spawn {
                path: executable.to_path_buf(),
                message: format!("Failed to launch viewer: {e}"),
                location: ErrorLocation::from(Location::caller()),
                source: Box::new(e),
            })?;

        let pid = child.id();
        info!("Launched {} (PID: {pid})", executable.display());

        thread::spawn(move || match child.wait() {
            Ok(status) => trace!("Viewer process {pid} exited: {status}"),
            Err(e) => trace!("Failed to reap viewer process {pid}: {e}"),
        });

        Ok(())
    }
}

/// Default location of the inverse-search callback executable: next to the
/// running executable, falling back to a bare name resolved through `PATH`.
pub fn locate_callback_executable() -> PathBuf {
    let file_name = format!("{INVERSE_SEARCH_BINARY}{EXE_SUFFIX}");

    match current_exe() {
        Ok(exe) => match exe.parent() {
            Some(dir) => dir.join(&file_name),
            None => {
                debug!("Executable has no parent directory: {}", exe.display());
                PathBuf::from(file_name)
            }
        },
        Err(e) => {
            debug!("Failed to get current executable path: {e}");
            PathBuf::from(file_name)
        }
    }
}

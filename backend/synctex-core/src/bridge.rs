//! Editor-side entry points.
//!
//! [`SyncBridge`] turns a [`SyncRequest`] into a viewer invocation: it
//! snapshots a fresh inverse-search binding from the provisioner, builds the
//! argument list and hands it to the launcher. Nothing here blocks on the
//! viewer.
//!
//! [`BridgeSession`] wires a bridge to a running listener for one editor
//! process.

use crate::command::{InverseSearchBinding, build_viewer_args};
use crate::config::{BridgeConfig, ViewerFlags};
use crate::error::CoreError;
use crate::error::launch::LaunchError;
use crate::launch::{DetachedLauncher, ProcessLauncher, locate_callback_executable};
use crate::listener::{
    LiveWindows, ListenerHandle, NavigationReceiver, navigation_channel, start_listener,
};
use crate::request::SyncRequest;
use crate::session::{EnvProvisioner, Provisioner, SessionPhase, ViewerSession, WindowId};

use common::ErrorLocation;

use std::ffi::OsString;
use std::panic::Location;
use std::path::PathBuf;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use log::{debug, info, warn};

pub struct SyncBridge {
    session: ViewerSession,
    flags: ViewerFlags,
    callback_executable: PathBuf,
    provisioner: Arc<dyn Provisioner>,
    launcher: Arc<dyn ProcessLauncher>,
    bindings_issued: AtomicU64,
}

impl SyncBridge {
    pub fn new(
        session: ViewerSession,
        flags: ViewerFlags,
        callback_executable: impl Into<PathBuf>,
        provisioner: Arc<dyn Provisioner>,
        launcher: Arc<dyn ProcessLauncher>,
    ) -> Self {
        Self {
            session,
            flags,
            callback_executable: callback_executable.into(),
            provisioner,
            launcher,
            bindings_issued: AtomicU64::new(0),
        }
    }

    pub fn session(&self) -> &ViewerSession {
        &self.session
    }

    pub fn flags(&self) -> &ViewerFlags {
        &self.flags
    }

    /// How many bindings have reached a successfully launched viewer.
    pub fn bindings_issued(&self) -> u64 {
        self.bindings_issued.load(Ordering::SeqCst)
    }

    /// Snapshot the provisioner into a new binding.
    pub fn current_binding(&self) -> InverseSearchBinding {
        InverseSearchBinding::from_provisioner(&self.callback_executable, self.provisioner.as_ref())
    }

    /// Build the viewer arguments for `request` with a freshly re-read binding.
    pub(crate) fn build_args(&self, request: &SyncRequest) -> Vec<OsString> {
        let binding = self.current_binding();
        if binding.shared_secret.is_empty() {
            warn!("No inverse-search secret available; viewer clicks will be ignored");
        }

        build_viewer_args(request, &self.session, &binding, &self.flags)
    }

    /// Hand `request` to the viewer.
    ///
    /// Returns as soon as the process is spawned. With instance reuse the
    /// spawned process forwards to the running viewer and exits; concurrent
    /// requests race and the last one wins on screen.
    ///
    /// # Errors
    ///
    /// Returns [`LaunchError`] if no viewer is configured or the spawn
    /// itself fails. The error is also logged here.
    pub fn sync_view(&self, request: &SyncRequest) -> Result<(), LaunchError> {
        let Some(viewer) = self.session.viewer_executable_path.as_deref() else {
            warn!(
                "No PDF viewer configured, cannot show {}",
                request.document_path().display()
            );
            return Err(LaunchError::NotConfigured {
                message: "viewer.executable_path is not set".to_string(),
                location: ErrorLocation::from(Location::caller()),
            });
        };

        let args = self.build_args(request);
        debug!("Viewer request: {:?}", request.target());

        self.launcher.launch(viewer, &args).inspect_err(|e| {
            warn!("Viewer launch failed: {e}");
        })?;
        self.bindings_issued.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    /// Forward search: show the PDF location for `source`:`line` (`column` is
    /// the in-line offset handed to the viewer).
    ///
    /// `source` should be absolute; it is passed to the viewer unchanged.
    pub fn forward_search(
        &self,
        document: impl Into<PathBuf>,
        source: impl Into<PathBuf>,
        line: u32,
        column: u32,
    ) -> Result<(), CoreError> {
        let request = SyncRequest::forward_search(document, source, line, column)?;
        Ok(self.sync_view(&request)?)
    }

    /// Show a 1-based page.
    pub fn navigate_page(&self, document: impl Into<PathBuf>, page: u32) -> Result<(), CoreError> {
        let request = SyncRequest::page(document, page)?;
        Ok(self.sync_view(&request)?)
    }

    /// Open the document, optionally at a page.
    pub fn view(&self, document: impl Into<PathBuf>, page: Option<u32>) -> Result<(), CoreError> {
        let request = match page {
            Some(page) => SyncRequest::page(document, page)?,
            None => SyncRequest::open(document),
        };
        Ok(self.sync_view(&request)?)
    }
}

/// Everything one editor process needs for two-way sync.
pub struct BridgeSession {
    bridge: SyncBridge,
    listener: ListenerHandle,
    windows: LiveWindows,
    provisioner: Arc<dyn Provisioner>,
}

impl BridgeSession {
    /// Start the listener and build a bridge whose bindings point at it.
    ///
    /// The secret is expected in the environment variable named by the
    /// config (see [`provision_secret`](crate::session::provision_secret)).
    /// A missing secret does not fail startup: the session runs degraded and
    /// rejects every callback.
    ///
    /// The returned [`NavigationReceiver`] belongs on the editor's UI thread.
    pub async fn start(
        config: &BridgeConfig,
        flags: ViewerFlags,
        window_id: WindowId,
    ) -> Result<(Self, NavigationReceiver), CoreError> {
        Self::start_with_launcher(config, flags, window_id, Arc::new(DetachedLauncher)).await
    }

    /// [`start`](Self::start) with a caller-supplied launcher.
    pub async fn start_with_launcher(
        config: &BridgeConfig,
        flags: ViewerFlags,
        window_id: WindowId,
        launcher: Arc<dyn ProcessLauncher>,
    ) -> Result<(Self, NavigationReceiver), CoreError> {
        config.validate()?;

        let secret_var = config.inverse_search.secret_env_var.clone();
        let windows = LiveWindows::new();
        windows.register(window_id).await?;

        let (dispatcher, receiver) = navigation_channel();
        let listener_provisioner: Arc<dyn Provisioner> = Arc::new(EnvProvisioner::new(
            secret_var.clone(),
            config.inverse_search.listen_port,
            window_id,
        ));
        let listener = start_listener(
            config.inverse_search.listen_port,
            listener_provisioner,
            windows.clone(),
            dispatcher,
        )
        .await?;

        let provisioner: Arc<dyn Provisioner> =
            Arc::new(EnvProvisioner::new(secret_var, listener.port(), window_id));

        let callback_executable = config
            .inverse_search
            .callback_executable_path
            .clone()
            .unwrap_or_else(locate_callback_executable);
        info!("Inverse-search callback: {}", callback_executable.display());

        let bridge = SyncBridge::new(
            ViewerSession::from(&config.viewer),
            flags,
            callback_executable,
            Arc::clone(&provisioner),
            launcher,
        );

        let session = Self {
            bridge,
            listener,
            windows,
            provisioner,
        };
        info!("Bridge session started: {:?}", session.phase());

        Ok((session, receiver))
    }

    pub fn bridge(&self) -> &SyncBridge {
        &self.bridge
    }

    pub fn windows(&self) -> &LiveWindows {
        &self.windows
    }

    pub fn listener_port(&self) -> u16 {
        self.listener.port()
    }

    pub fn phase(&self) -> SessionPhase {
        SessionPhase::derive(
            !self.provisioner.current_secret().is_empty(),
            self.bridge.bindings_issued(),
            self.listener.is_active(),
        )
    }

    pub async fn shutdown(&mut self) {
        self.listener.shutdown().await;
    }
}

//! Registry of editor windows that may receive inverse-search navigation.
//!
//! # Architecture
//!
//! Uses an actor pattern so registrations are serialized:
//! - Commands are sent via an mpsc channel
//! - A dedicated task applies them in order and acknowledges each one
//! - Reads go straight to the shared `RwLock` and never wait on the actor

use crate::error::ipc::IpcError;
use crate::session::WindowId;

use common::ErrorLocation;

use std::collections::HashSet;
use std::panic::Location;
use std::sync::Arc;

use log::{debug, info, warn};
use tokio::sync::{Mutex, RwLock, mpsc, oneshot};

enum WindowCommand {
    Register(WindowId, oneshot::Sender<()>),
    Unregister(WindowId, oneshot::Sender<()>),
}

/// Live editor windows.
///
/// `Clone` and shareable across tasks; all clones see the same set.
#[derive(Clone)]
pub struct LiveWindows {
    command_tx: Arc<Mutex<Option<mpsc::Sender<WindowCommand>>>>,
    windows: Arc<RwLock<HashSet<WindowId>>>,
    actor_init: Arc<Mutex<bool>>,
}

impl LiveWindows {
    /// Create an empty registry. The actor is spawned on first mutation.
    pub fn new() -> Self {
        Self {
            command_tx: Arc::new(Mutex::new(None)),
            windows: Arc::new(RwLock::new(HashSet::new())),
            actor_init: Arc::new(Mutex::new(false)),
        }
    }

    /// Allow callbacks addressed to `window_id`. Returns once applied.
    pub async fn register(&self, window_id: WindowId) -> Result<(), IpcError> {
        let (ack_tx, ack_rx) = oneshot::channel();
        self.send(WindowCommand::Register(window_id, ack_tx)).await?;
        wait_for_ack(ack_rx).await
    }

    /// Stop routing callbacks to `window_id` (window closed). Returns once applied.
    pub async fn unregister(&self, window_id: WindowId) -> Result<(), IpcError> {
        let (ack_tx, ack_rx) = oneshot::channel();
        self.send(WindowCommand::Unregister(window_id, ack_tx)).await?;
        wait_for_ack(ack_rx).await
    }

    pub async fn contains(&self, window_id: WindowId) -> bool {
        self.windows.read().await.contains(&window_id)
    }

    async fn send(&self, cmd: WindowCommand) -> Result<(), IpcError> {
        self.ensure_actor().await;

        let tx_guard = self.command_tx.lock().await;
        let tx = tx_guard.as_ref().ok_or_else(|| IpcError::Io {
            message: "Window registry actor not initialized".to_string(),
            location: ErrorLocation::from(Location::caller()),
        })?;

        tx.send(cmd).await.map_err(|e| IpcError::Io {
            message: format!("Window registry actor died: {}", e),
            location: ErrorLocation::from(Location::caller()),
        })
    }

    async fn ensure_actor(&self) {
        let mut init_guard = self.actor_init.lock().await;
        if !*init_guard {
            let (tx, rx) = mpsc::channel(100);
            let windows_clone = Arc::clone(&self.windows);

            // Store tx BEFORE spawning to avoid race
            let mut tx_guard = self.command_tx.lock().await;
            *tx_guard = Some(tx);
            drop(tx_guard);

            tokio::spawn(windows_actor(rx, windows_clone));
            *init_guard = true;
            info!("Window registry actor spawned");
        }
    }
}

impl Default for LiveWindows {
    fn default() -> Self {
        Self::new()
    }
}

async fn wait_for_ack(ack_rx: oneshot::Receiver<()>) -> Result<(), IpcError> {
    ack_rx.await.map_err(|e| IpcError::Io {
        message: format!("Window registry actor dropped command: {e}"),
        location: ErrorLocation::from(Location::caller()),
    })
}

/// Owns mutation of the window set; runs until every `LiveWindows` clone is dropped.
async fn windows_actor(
    mut command_rx: mpsc::Receiver<WindowCommand>,
    windows: Arc<RwLock<HashSet<WindowId>>>,
) {
    info!("Window registry actor started");

    while let Some(cmd) = command_rx.recv().await {
        match cmd {
            WindowCommand::Register(window_id, ack) => {
                if windows.write().await.insert(window_id) {
                    info!("Registered editor window {window_id}");
                } else {
                    debug!("Editor window {window_id} already registered");
                }
                let _ = ack.send(());
            }
            WindowCommand::Unregister(window_id, ack) => {
                if windows.write().await.remove(&window_id) {
                    info!("Unregistered editor window {window_id}");
                } else {
                    warn!("Unregister requested for unknown window {window_id}");
                }
                let _ = ack.send(());
            }
        }
    }

    debug!("Window registry actor stopped");
}

//! Handle to a running inverse-search listener.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use log::debug;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;

/// Returned by [`start_listener`](crate::listener::start_listener).
///
/// Dropping the handle closes the shutdown channel, which also stops the
/// accept loop; [`shutdown`](Self::shutdown) additionally waits for it to
/// exit. Connections already accepted run to completion either way.
pub struct ListenerHandle {
    port: u16,
    active: Arc<AtomicBool>,
    shutdown_tx: Option<oneshot::Sender<()>>,
    task: Option<JoinHandle<()>>,
}

impl ListenerHandle {
    pub(crate) fn new(
        port: u16,
        active: Arc<AtomicBool>,
        shutdown_tx: oneshot::Sender<()>,
        task: JoinHandle<()>,
    ) -> Self {
        Self {
            port,
            active,
            shutdown_tx: Some(shutdown_tx),
            task: Some(task),
        }
    }

    /// The loopback port actually bound (resolved when 0 was requested).
    pub fn port(&self) -> u16 {
        self.port
    }

    pub fn is_active(&self) -> bool {
        self.active.load(Ordering::SeqCst)
    }

    /// Stop accepting connections and wait for the accept loop to exit.
    pub async fn shutdown(&mut self) {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
        }
        if let Some(task) = self.task.take()
            && let Err(e) = task.await
        {
            debug!("Listener task ended abnormally: {e}");
        }
        self.active.store(false, Ordering::SeqCst);
    }
}

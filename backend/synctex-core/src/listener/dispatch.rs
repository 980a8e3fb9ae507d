//! Hand-off from listener tasks to the editor's UI-affine context.
//!
//! Listener tasks only push [`NavigateToSource`] values into a bounded
//! queue. The editor drains the [`NavigationReceiver`] from whatever
//! thread owns its UI and performs the actual navigation there.

use crate::error::ipc::IpcError;
use crate::session::WindowId;

use common::ErrorLocation;

use std::panic::Location;
use std::path::PathBuf;

use log::debug;
use tokio::sync::mpsc;
use tokio::sync::mpsc::error::TrySendError;

/// Navigations the editor may leave undrained before new ones are dropped.
pub const NAVIGATION_QUEUE_DEPTH: usize = 100;

/// "Open `path` at `line` in window `window_id`."
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NavigateToSource {
    pub window_id: WindowId,
    pub path: PathBuf,
    pub line: u32,
}

/// What happened to a navigation handed to [`NavigationDispatcher::dispatch`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DispatchOutcome {
    Queued,
    /// The queue was full; the navigation was discarded.
    Dropped,
}

/// Sending half, cloned into every connection task.
#[derive(Debug, Clone)]
pub struct NavigationDispatcher {
    tx: mpsc::Sender<NavigateToSource>,
}

/// Receiving half, owned by the editor's UI context.
#[derive(Debug)]
pub struct NavigationReceiver {
    rx: mpsc::Receiver<NavigateToSource>,
}

pub fn navigation_channel() -> (NavigationDispatcher, NavigationReceiver) {
    let (tx, rx) = mpsc::channel(NAVIGATION_QUEUE_DEPTH);
    (NavigationDispatcher { tx }, NavigationReceiver { rx })
}

impl NavigationDispatcher {
    /// Queue a navigation for the UI context without waiting for room.
    ///
    /// A stalled UI context must not park listener tasks: when the queue is
    /// full the navigation is dropped and [`DispatchOutcome::Dropped`] is
    /// returned, so the caller can refuse the callback.
    ///
    /// # Errors
    ///
    /// Returns [`IpcError::Send`] if the editor dropped its receiver.
    pub fn dispatch(&self, navigation: NavigateToSource) -> Result<DispatchOutcome, IpcError> {
        match self.tx.try_send(navigation) {
            Ok(()) => Ok(DispatchOutcome::Queued),
            Err(TrySendError::Full(navigation)) => {
                debug!(
                    "Navigation queue full, dropped {}:{} for window {}",
                    navigation.path.display(),
                    navigation.line,
                    navigation.window_id
                );
                Ok(DispatchOutcome::Dropped)
            }
            Err(TrySendError::Closed(_)) => Err(IpcError::Send {
                message: "Navigation receiver closed".to_string(),
                location: ErrorLocation::from(Location::caller()),
            }),
        }
    }
}

impl NavigationReceiver {
    pub async fn recv(&mut self) -> Option<NavigateToSource> {
        self.rx.recv().await
    }

    /// Non-blocking poll, for UI event loops that drain between frames.
    pub fn try_recv(&mut self) -> Option<NavigateToSource> {
        self.rx.try_recv().ok()
    }

    /// Blocking receive for a dedicated non-async UI thread.
    ///
    /// # Panics
    ///
    /// Panics if called from inside an async runtime.
    pub fn blocking_recv(&mut self) -> Option<NavigateToSource> {
        self.rx.blocking_recv()
    }
}

//! Inverse-search WebSocket server.
//!
//! - Listens on localhost only
//! - Handles every connection on its own task, so rapid clicks are
//!   validated and dispatched independently
//! - Reads exactly one binary frame per connection, bounded by a timeout
//!
//! # Protocol
//!
//! 1. Client sends one `InverseSearchCallback` frame
//! 2. If it validates, the navigation is queued and an `InverseSearchAck`
//!    frame is returned
//! 3. Otherwise the connection is closed with no reply
//!
//! The same silence covers undecodable frames, non-binary frames and
//! timeouts, so a client learns nothing about why it was refused.

use crate::LOOPBACK_HOSTNAME;
use crate::error::ipc::IpcError;
use crate::listener::dispatch::{DispatchOutcome, NavigationDispatcher};
use crate::listener::handle::ListenerHandle;
use crate::listener::validation::validate;
use crate::listener::windows::LiveWindows;
use crate::proto::{InverseSearchAck, InverseSearchCallback};
use crate::session::Provisioner;

use common::ErrorLocation;

use std::net::SocketAddr;
use std::panic::Location;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use futures_util::stream::SplitSink;
use futures_util::{SinkExt, StreamExt};
use log::{debug, error, info, warn};
use prost::Message as ProstMessage;
use tokio::net::{TcpListener, TcpStream};
use tokio::spawn as TokioSpawn;
use tokio::sync::oneshot;
use tokio::time::{sleep as TokioSleep, timeout};
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{WebSocketStream, accept_async};

const HANDSHAKE_TIMEOUT: Duration = Duration::from_secs(5);
const READ_TIMEOUT: Duration = Duration::from_secs(5);
const ACCEPT_ERROR_BACKOFF: Duration = Duration::from_millis(50);

type WsWrite = SplitSink<WebSocketStream<TcpStream>, Message>;

struct ListenerContext {
    port: u16,
    provisioner: Arc<dyn Provisioner>,
    windows: LiveWindows,
    dispatcher: NavigationDispatcher,
}

/// Start the inverse-search listener on `127.0.0.1:<listen_port>`.
///
/// Pass `0` to let the OS choose; the bound port is available from
/// [`ListenerHandle::port`] and is what the bridge's bindings must carry.
/// Only `current_secret` is read from `provisioner`; it is re-read for every
/// callback.
///
/// # Errors
///
/// Returns [`IpcError::Io`] if the port is in use or cannot be bound.
pub async fn start_listener(
    listen_port: u16,
    provisioner: Arc<dyn Provisioner>,
    windows: LiveWindows,
    dispatcher: NavigationDispatcher,
) -> Result<ListenerHandle, IpcError> {
    let address = format!("{LOOPBACK_HOSTNAME}:{listen_port}");
    let listener = TcpListener::bind(&address).await?;
    let port = listener.local_addr()?.port();

    info!("Inverse-search listener on {LOOPBACK_HOSTNAME}:{port}");

    if provisioner.current_secret().is_empty() {
        warn!("No inverse-search secret provisioned; every callback will be rejected");
    }

    let context = Arc::new(ListenerContext {
        port,
        provisioner,
        windows,
        dispatcher,
    });

    let active = Arc::new(AtomicBool::new(true));
    let task_active = Arc::clone(&active);
    let (shutdown_tx, mut shutdown_rx) = oneshot::channel::<()>();

    let task = TokioSpawn(async move {
        loop {
            tokio::select! {
                // Fires on an explicit shutdown and when the handle is dropped
                _ = &mut shutdown_rx => {
                    info!("Inverse-search listener on port {port} shutting down");
                    break;
                }
                accepted = listener.accept() => match accepted {
                    Ok((stream, addr)) => {
                        let context = Arc::clone(&context);
                        TokioSpawn(async move {
                            if let Err(e) = handle_connection(stream, addr, context).await {
                                debug!("Inverse-search connection from {addr} failed: {e}");
                            }
                        });
                    }
                    Err(e) => {
                        error!("Failed to accept inverse-search connection: {e}");
                        TokioSleep(ACCEPT_ERROR_BACKOFF).await;
                    }
                },
            }
        }
        task_active.store(false, Ordering::SeqCst);
    });

    Ok(ListenerHandle::new(port, active, shutdown_tx, task))
}

/// Handle one callback connection.
///
/// # Errors
///
/// - [`IpcError::Timeout`] - WebSocket upgrade did not complete in time
/// - [`IpcError::Handshake`] - WebSocket upgrade failed
/// - [`IpcError::Read`] - transport error while reading the frame
/// - [`IpcError::Send`] - the editor's receiver is gone, or the ack could not be sent
///
/// Rejected callbacks are not errors.
async fn handle_connection(
    stream: TcpStream,
    addr: SocketAddr,
    context: Arc<ListenerContext>,
) -> Result<(), IpcError> {
    if !addr.ip().is_loopback() {
        warn!("Rejected non-loopback connection from {}", addr);
        return Ok(());
    }

    let ws_stream = timeout(HANDSHAKE_TIMEOUT, accept_async(stream))
        .await
        .map_err(|_| IpcError::Timeout {
            message: format!("WebSocket handshake from {addr} timed out"),
            location: ErrorLocation::from(Location::caller()),
        })?
        .map_err(|e| IpcError::Handshake {
            message: format!("WebSocket handshake failed: {}", e),
            location: ErrorLocation::from(Location::caller()),
        })?;

    let (mut write, mut read) = ws_stream.split();

    let data = match timeout(READ_TIMEOUT, read.next()).await {
        Ok(Some(Ok(Message::Binary(data)))) => data,
        Ok(Some(Ok(_))) => {
            debug!("Dropped callback from {addr}: non-binary frame");
            let _ = write.close().await;
            return Ok(());
        }
        Ok(Some(Err(e))) => {
            return Err(IpcError::Read {
                message: format!("Error reading callback: {}", e),
                location: ErrorLocation::from(Location::caller()),
            });
        }
        Ok(None) => {
            debug!("Client {addr} disconnected before sending a callback");
            return Ok(());
        }
        Err(_) => {
            debug!("Dropped callback from {addr}: no frame within {READ_TIMEOUT:?}");
            let _ = write.close().await;
            return Ok(());
        }
    };

    let callback = match InverseSearchCallback::decode(&data[..]) {
        Ok(callback) => callback,
        Err(e) => {
            debug!("Dropped callback from {addr}: undecodable frame ({e})");
            let _ = write.close().await;
            return Ok(());
        }
    };

    let secret = context.provisioner.current_secret();
    match validate(&callback, context.port, &secret, &context.windows).await {
        Ok(navigation) => {
            info!(
                "Inverse search to {}:{} for window {}",
                navigation.path.display(),
                navigation.line,
                navigation.window_id
            );
            match context.dispatcher.dispatch(navigation)? {
                DispatchOutcome::Queued => send_ack(&mut write).await?,
                DispatchOutcome::Dropped => {
                    debug!("Dropped callback from {addr}: navigation queue full");
                }
            }
        }
        Err(reason) => {
            debug!("Dropped callback from {addr}: {reason}");
        }
    }

    let _ = write.close().await;
    Ok(())
}

async fn send_ack(write: &mut WsWrite) -> Result<(), IpcError> {
    let ack = InverseSearchAck { accepted: true };

    let mut buf = Vec::new();
    ack.encode(&mut buf).map_err(|e| IpcError::ProtobufEncode {
        message: format!("Failed to encode ack: {e}"),
        location: ErrorLocation::from(Location::caller()),
    })?;

    write
        .send(Message::Binary(buf.into()))
        .await
        .map_err(|e| IpcError::Send {
            message: format!("Failed to send ack: {e}"),
            location: ErrorLocation::from(Location::caller()),
        })
}

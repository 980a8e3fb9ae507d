//! Client half of the loopback callback, run inside the process the viewer
//! spawns on every inverse-search click.

use crate::LOOPBACK_WS_BASE_URL;
use crate::error::ipc::IpcError;
use crate::proto::{InverseSearchAck, InverseSearchCallback};

use common::ErrorLocation;

use std::panic::Location;
use std::time::Duration;

use backoff::{ExponentialBackoff, backoff::Backoff};
use futures_util::{SinkExt, StreamExt};
use log::{debug, info, trace};
use prost::Message as ProstMessage;
use tokio::net::TcpStream;
use tokio::time::{sleep as TokioSleep, timeout};
use tokio_tungstenite::tungstenite::{Error as WsError, Message};
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream, connect_async};
use url::Url;

const CONNECT_MAX_ELAPSED: Duration = Duration::from_secs(3);
const ACK_TIMEOUT: Duration = Duration::from_secs(5);

/// What the listener made of a callback.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CallbackOutcome {
    /// Validated and queued for navigation.
    Accepted,
    /// Dropped by the listener. No reason is ever given.
    Rejected,
}

/// `ws://127.0.0.1:<port>`
#[track_caller]
pub fn listener_url(port: u16) -> Result<Url, IpcError> {
    if port == 0 {
        return Err(IpcError::Connect {
            message: "Binding carries no listener port".to_string(),
            location: ErrorLocation::from(Location::caller()),
        });
    }

    Url::parse(&format!("{LOOPBACK_WS_BASE_URL}:{port}")).map_err(|e| IpcError::Connect {
        message: format!("Invalid listener URL for port {port}: {e}"),
        location: ErrorLocation::from(Location::caller()),
    })
}

/// Deliver one callback to the listener named by `callback.port`.
///
/// # Returns
///
/// * `Ok(Accepted)` - the listener acknowledged the callback
/// * `Ok(Rejected)` - the listener closed the connection without an ack
/// * `Err(IpcError)` - no listener reachable, or the transport failed
pub async fn send_callback(
    callback: &InverseSearchCallback,
) -> Result<CallbackOutcome, IpcError> {
    let port = u16::try_from(callback.port).map_err(|_| IpcError::Connect {
        message: format!("Port out of range: {}", callback.port),
        location: ErrorLocation::from(Location::caller()),
    })?;
    let url = listener_url(port)?;

    let mut ws = connect_with_backoff(&url).await?;

    let mut buf = Vec::new();
    callback.encode(&mut buf)?;

    ws.send(Message::Binary(buf.into()))
        .await
        .map_err(|e| IpcError::Send {
            message: format!("Failed to send callback: {e}"),
            location: ErrorLocation::from(Location::caller()),
        })?;

    let outcome = match timeout(ACK_TIMEOUT, ws.next()).await {
        Err(_) => {
            return Err(IpcError::Timeout {
                message: format!("No answer from listener within {ACK_TIMEOUT:?}"),
                location: ErrorLocation::from(Location::caller()),
            });
        }
        Ok(Some(Ok(Message::Binary(data)))) => {
            let ack = InverseSearchAck::decode(&data[..])?;
            if ack.accepted {
                CallbackOutcome::Accepted
            } else {
                CallbackOutcome::Rejected
            }
        }
        Ok(Some(Ok(_))) | Ok(None) => CallbackOutcome::Rejected,
        Ok(Some(Err(WsError::ConnectionClosed | WsError::AlreadyClosed | WsError::Protocol(_)))) => {
            CallbackOutcome::Rejected
        }
        Ok(Some(Err(e))) => {
            return Err(IpcError::Read {
                message: format!("Error reading listener answer: {e}"),
                location: ErrorLocation::from(Location::caller()),
            });
        }
    };

    let _ = ws.close(None).await;

    info!("Inverse-search callback {outcome:?}");
    Ok(outcome)
}

async fn connect_with_backoff(
    url: &Url,
) -> Result<WebSocketStream<MaybeTlsStream<TcpStream>>, IpcError> {
    let mut backoff = ExponentialBackoff {
        max_elapsed_time: Some(CONNECT_MAX_ELAPSED),
        ..Default::default()
    };

    debug!("Connecting to inverse-search listener at {url}");

    loop {
        match connect_async(url.as_str()).await {
            Ok((ws, _)) => return Ok(ws),
            Err(e) => match backoff.next_backoff() {
                Some(duration) => {
                    trace!("Listener not reachable ({e}), retrying after {duration:?}");
                    TokioSleep(duration).await;
                }
                None => {
                    return Err(IpcError::Connect {
                        message: format!(
                            "Listener at {url} not reachable within {CONNECT_MAX_ELAPSED:?}: {e}"
                        ),
                        location: ErrorLocation::from(Location::caller()),
                    });
                }
            },
        }
    }
}

//! Test helpers for listener and bridge integration tests.
//!
//! - A provisioner whose secret can be swapped mid-test
//! - A launcher that records invocations instead of spawning
//! - Raw WebSocket access to the listener for frames `send_callback` never sends

use synctex_core::error::launch::LaunchError;
use synctex_core::launch::ProcessLauncher;
use synctex_core::listener::{
    ListenerHandle, LiveWindows, NavigationReceiver, navigation_channel, start_listener,
};
use synctex_core::proto::{InverseSearchAck, InverseSearchCallback};
use synctex_core::session::{Provisioner, WindowId};

use common::{ErrorLocation, SharedSecret};

use std::ffi::OsString;
use std::io;
use std::panic::Location;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, RwLock};

use futures_util::{SinkExt, StreamExt};
use prost::Message as ProstMessage;
use tokio::net::TcpStream;
use tokio::time::{Duration, timeout};
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream, connect_async, tungstenite::Message};

pub const TEST_SECRET: &str = "test-secret-12345";
pub const TEST_WINDOW: WindowId = WindowId(0x1001);
pub const TEST_SOURCE: &str = "/home/user/thesis/main.tex";

/// Provisioner with a swappable secret.
pub struct FixedProvisioner {
    secret: RwLock<String>,
    port: u16,
    window_id: WindowId,
}

impl FixedProvisioner {
    pub fn new(secret: &str, port: u16, window_id: WindowId) -> Self {
        Self {
            secret: RwLock::new(secret.to_string()),
            port,
            window_id,
        }
    }

    /// Simulate the editor regenerating its secret.
    pub fn set_secret(&self, secret: &str) {
        *self.secret.write().expect("secret lock poisoned") = secret.to_string();
    }
}

impl Provisioner for FixedProvisioner {
    fn current_secret(&self) -> SharedSecret {
        SharedSecret::new(self.secret.read().expect("secret lock poisoned").clone())
    }

    fn current_port(&self) -> u16 {
        self.port
    }

    fn caller_window_id(&self) -> WindowId {
        self.window_id
    }
}

/// Records every launch instead of spawning a process.
#[derive(Default)]
pub struct RecordingLauncher {
    calls: Mutex<Vec<(PathBuf, Vec<OsString>)>>,
    fail: bool,
}

impl RecordingLauncher {
    pub fn failing() -> Self {
        Self {
            calls: Mutex::new(Vec::new()),
            fail: true,
        }
    }

    pub fn calls(&self) -> Vec<(PathBuf, Vec<OsString>)> {
        self.calls.lock().expect("calls lock poisoned").clone()
    }

    /// Arguments of the most recent launch as UTF-8 strings.
    pub fn last_args(&self) -> Vec<String> {
        self.calls()
            .last()
            .map(|(_, args)| {
                args.iter()
                    .map(|a| a.to_string_lossy().into_owned())
                    .collect()
            })
            .unwrap_or_default()
    }
}

impl ProcessLauncher for RecordingLauncher {
    fn launch(&self, executable: &Path, args: &[OsString]) -> Result<(), LaunchError> {
        self.calls
            .lock()
            .expect("calls lock poisoned")
            .push((executable.to_path_buf(), args.to_vec()));

        if self.fail {
            return Err(LaunchError::Spawn {
                path: executable.to_path_buf(),
                message: "simulated spawn failure".to_string(),
                location: ErrorLocation::from(Location::caller()),
                source: Box::new(io::Error::new(io::ErrorKind::NotFound, "not found")),
            });
        }
        Ok(())
    }
}

pub struct TestListener {
    pub handle: ListenerHandle,
    pub receiver: NavigationReceiver,
    pub windows: LiveWindows,
    pub provisioner: Arc<FixedProvisioner>,
}

impl TestListener {
    pub fn port(&self) -> u16 {
        self.handle.port()
    }

    /// A callback that passes validation against this listener.
    pub fn valid_callback(&self, line: u32) -> InverseSearchCallback {
        InverseSearchCallback {
            window_id: TEST_WINDOW.as_u64(),
            port: u32::from(self.port()),
            secret: TEST_SECRET.to_string(),
            source_path: TEST_SOURCE.to_string(),
            source_line: line,
        }
    }
}

/// Start a listener on an OS-assigned port with `TEST_WINDOW` registered.
pub async fn start_test_listener(secret: &str) -> TestListener {
    let windows = LiveWindows::new();
    windows
        .register(TEST_WINDOW)
        .await
        .expect("Failed to register window");

    let provisioner = Arc::new(FixedProvisioner::new(secret, 0, TEST_WINDOW));
    let (dispatcher, receiver) = navigation_channel();

    let handle = start_listener(0, provisioner.clone(), windows.clone(), dispatcher)
        .await
        .expect("Failed to start listener");

    TestListener {
        handle,
        receiver,
        windows,
        provisioner,
    }
}

pub async fn connect_to_listener(port: u16) -> WebSocketStream<MaybeTlsStream<TcpStream>> {
    let url = format!("ws://127.0.0.1:{}", port);
    let (ws_stream, _) = connect_async(&url)
        .await
        .expect("Failed to connect to listener");
    ws_stream
}

/// Send one raw frame and return the ack, or `None` if the listener hung up
/// without answering.
pub async fn send_raw_frame(port: u16, frame: Message) -> Option<InverseSearchAck> {
    let mut ws = connect_to_listener(port).await;
    ws.send(frame).await.expect("Failed to send frame");

    match timeout(Duration::from_secs(2), ws.next()).await {
        Ok(Some(Ok(Message::Binary(data)))) => {
            Some(InverseSearchAck::decode(&data[..]).expect("Failed to decode ack"))
        }
        Ok(_) => None,
        Err(_) => panic!("Listener neither answered nor closed the connection"),
    }
}

pub async fn send_raw_callback(
    port: u16,
    callback: &InverseSearchCallback,
) -> Option<InverseSearchAck> {
    let mut buf = Vec::new();
    callback.encode(&mut buf).expect("Failed to encode callback");
    send_raw_frame(port, Message::Binary(buf.into())).await
}

/// Give the listener time to (not) dispatch before asserting absence.
pub async fn settle() {
    tokio::time::sleep(Duration::from_millis(100)).await;
}

use crate::helpers::{TEST_SECRET, TEST_SOURCE, TEST_WINDOW};

use synctex_core::callback::{listener_url, send_callback};
use synctex_core::error::ipc::IpcError;
use synctex_core::proto::InverseSearchCallback;

use tokio::net::TcpListener;

#[test]
fn given_port_when_listener_url_then_loopback_websocket_url() {
    let url = listener_url(7777).expect("Port 7777 should form a URL");

    assert_eq!(url.as_str(), "ws://127.0.0.1:7777/");
}

/// **VALUE**: A binding without a port fails fast instead of dialling port 0.
///
/// **BUG THIS CATCHES**: The callback retrying against an unbound listener for the
/// full backoff window when the editor never started one.
#[test]
fn given_port_zero_when_listener_url_then_connect_error() {
    let result = listener_url(0);

    assert!(matches!(result, Err(IpcError::Connect { .. })));
}

/// **VALUE**: With no listener running the callback gives up with a connect error.
///
/// **WHY THIS MATTERS**: The viewer waits on the callback process. A crashed editor
/// must not leave it hanging forever on every click.
#[tokio::test]
async fn given_no_listener_when_send_callback_then_connect_error() {
    // GIVEN: A port that was free a moment ago
    let port = {
        let scratch = TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind scratch socket");
        scratch.local_addr().expect("Scratch address").port()
    };

    let callback = InverseSearchCallback {
        window_id: TEST_WINDOW.as_u64(),
        port: u32::from(port),
        secret: TEST_SECRET.to_string(),
        source_path: TEST_SOURCE.to_string(),
        source_line: 1,
    };

    // WHEN: Sending with nobody listening
    let result = send_callback(&callback).await;

    // THEN: Connect error after the backoff window
    assert!(
        matches!(result, Err(IpcError::Connect { .. })),
        "Expected connect error, got {result:?}"
    );
}

#[tokio::test]
async fn given_out_of_range_port_when_send_callback_then_connect_error() {
    let callback = InverseSearchCallback {
        port: 70_000,
        ..InverseSearchCallback::default()
    };

    let result = send_callback(&callback).await;

    assert!(matches!(result, Err(IpcError::Connect { .. })));
}

#[test]
fn given_callback_when_debug_formatted_then_secret_not_shown() {
    let callback = InverseSearchCallback {
        secret: TEST_SECRET.to_string(),
        ..InverseSearchCallback::default()
    };

    let debug = format!("{callback:?}");

    assert!(!debug.contains(TEST_SECRET), "Secret leaked: {debug}");
}

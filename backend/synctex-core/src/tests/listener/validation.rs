use crate::listener::LiveWindows;
use crate::listener::validation::{RejectReason, validate};
use crate::proto::InverseSearchCallback;
use crate::session::WindowId;

use common::SharedSecret;

use std::path::PathBuf;

const PORT: u16 = 7777;
const WINDOW: WindowId = WindowId(0x1001);
const SECRET: &str = "abc123";

fn callback() -> InverseSearchCallback {
    InverseSearchCallback {
        window_id: WINDOW.as_u64(),
        port: u32::from(PORT),
        secret: SECRET.to_string(),
        source_path: "/home/user/thesis/main.tex".to_string(),
        source_line: 42,
    }
}

async fn windows() -> LiveWindows {
    let windows = LiveWindows::new();
    windows.register(WINDOW).await.expect("register should succeed");
    windows
}

#[tokio::test]
async fn given_matching_callback_when_validate_then_navigation() {
    let windows = windows().await;

    let navigation = validate(&callback(), PORT, &SharedSecret::new(SECRET), &windows)
        .await
        .expect("Callback should validate");

    assert_eq!(navigation.window_id, WINDOW);
    assert_eq!(navigation.path, PathBuf::from("/home/user/thesis/main.tex"));
    assert_eq!(navigation.line, 42);
}

/// **VALUE**: With no secret provisioned, nothing gets through. That includes a callback
/// that also presents an empty secret.
///
/// **WHY THIS MATTERS**: This is the fail-closed property of the whole bridge. An
/// unprovisioned session that accepted empty-vs-empty would let any local
/// process drive the editor.
///
/// **BUG THIS CATCHES**: Treating "no secret configured" as "authentication disabled".
#[tokio::test]
async fn given_no_secret_provisioned_when_validate_then_rejects_even_empty_token() {
    let windows = windows().await;
    let mut cb = callback();
    cb.secret.clear();

    let result = validate(&cb, PORT, &SharedSecret::empty(), &windows).await;

    assert_eq!(result, Err(RejectReason::NoSecretProvisioned));
}

#[tokio::test]
async fn given_empty_presented_secret_when_validate_then_rejects() {
    let windows = windows().await;
    let mut cb = callback();
    cb.secret.clear();

    let result = validate(&cb, PORT, &SharedSecret::new(SECRET), &windows).await;

    assert_eq!(result, Err(RejectReason::EmptySecret));
}

/// **VALUE**: A binding issued before the secret was regenerated is refused.
///
/// **BUG THIS CATCHES**: A crashed-and-restarted editor accepting clicks routed
/// through a binding the viewer still holds from the previous process.
#[tokio::test]
async fn given_stale_secret_when_validate_then_rejects() {
    let windows = windows().await;

    let result = validate(&callback(), PORT, &SharedSecret::new("regenerated"), &windows).await;

    assert_eq!(result, Err(RejectReason::SecretMismatch));
}

#[tokio::test]
async fn given_unknown_window_when_validate_then_rejects() {
    let windows = windows().await;
    let mut cb = callback();
    cb.window_id = 0x2002;

    let result = validate(&cb, PORT, &SharedSecret::new(SECRET), &windows).await;

    assert_eq!(result, Err(RejectReason::UnknownWindow));
}

#[tokio::test]
async fn given_unregistered_window_when_validate_then_rejects() {
    let windows = windows().await;
    windows.unregister(WINDOW).await.expect("unregister should succeed");

    let result = validate(&callback(), PORT, &SharedSecret::new(SECRET), &windows).await;

    assert_eq!(result, Err(RejectReason::UnknownWindow));
}

#[tokio::test]
async fn given_wrong_port_when_validate_then_rejects() {
    let windows = windows().await;
    let mut cb = callback();
    cb.port = 7778;

    let result = validate(&cb, PORT, &SharedSecret::new(SECRET), &windows).await;

    assert_eq!(result, Err(RejectReason::PortMismatch));
}

#[tokio::test]
async fn given_missing_source_position_when_validate_then_rejects() {
    let windows = windows().await;
    let secret = SharedSecret::new(SECRET);

    let mut no_path = callback();
    no_path.source_path.clear();
    let mut no_line = callback();
    no_line.source_line = 0;

    assert_eq!(
        validate(&no_path, PORT, &secret, &windows).await,
        Err(RejectReason::EmptyPath)
    );
    assert_eq!(
        validate(&no_line, PORT, &secret, &windows).await,
        Err(RejectReason::InvalidLine)
    );
}

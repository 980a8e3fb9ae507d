use crate::helpers::{
    TEST_SECRET, TEST_SOURCE, TEST_WINDOW, connect_to_listener, send_raw_callback,
    send_raw_frame, settle, start_test_listener,
};

use synctex_core::callback::{CallbackOutcome, send_callback};
use synctex_core::listener::NAVIGATION_QUEUE_DEPTH;
use synctex_core::session::WindowId;

use std::path::PathBuf;
use std::time::Duration;

use tokio::time::Instant;
use tokio_tungstenite::connect_async;
use tokio_tungstenite::tungstenite::Message;

/// **VALUE**: A callback carrying the session's secret, window and port reaches the editor.
///
/// **WHY THIS MATTERS**: This is the whole inverse-search path: viewer click,
/// callback process, listener, editor UI. If it fails, clicking in the PDF does nothing.
///
/// **BUG THIS CATCHES**: Would catch if:
/// - The listener never dispatches accepted callbacks
/// - The ack is sent before (or instead of) the dispatch
/// - Path or line get mangled between the wire and the UI queue
#[tokio::test]
async fn given_valid_callback_when_sent_then_accepted_and_dispatched() {
    // GIVEN: Listener with a provisioned secret and a live window
    let mut listener = start_test_listener(TEST_SECRET).await;

    // WHEN: The callback process reports a click on line 42
    let outcome = send_callback(&listener.valid_callback(42))
        .await
        .expect("Callback should reach the listener");

    // THEN: Accepted and queued for the UI
    assert_eq!(outcome, CallbackOutcome::Accepted);
    let navigation = listener
        .receiver
        .try_recv()
        .expect("Navigation should be queued before the ack");
    assert_eq!(navigation.window_id, TEST_WINDOW);
    assert_eq!(navigation.path, PathBuf::from(TEST_SOURCE));
    assert_eq!(navigation.line, 42);
}

/// **VALUE**: A wrong secret is dropped without a reply and without navigation.
///
/// **WHY THIS MATTERS**: Any local process can reach the loopback port. The secret
/// is the only thing standing between it and the editor.
///
/// **BUG THIS CATCHES**: Would catch if:
/// - Rejected callbacks still dispatch
/// - The listener answers rejections (leaking that the port is ours)
#[tokio::test]
async fn given_wrong_secret_when_sent_then_rejected_silently() {
    let mut listener = start_test_listener(TEST_SECRET).await;
    let mut callback = listener.valid_callback(7);
    callback.secret = "guessed-secret".to_string();

    let ack = send_raw_callback(listener.port(), &callback).await;

    assert!(ack.is_none(), "Rejections must not be answered");
    settle().await;
    assert!(listener.receiver.try_recv().is_none());
}

/// **VALUE**: With no secret provisioned every callback is rejected, including one that
/// presents an empty token.
///
/// **BUG THIS CATCHES**: Fail-open behaviour when the environment variable was never set.
#[tokio::test]
async fn given_no_secret_provisioned_when_empty_token_sent_then_rejected() {
    let mut listener = start_test_listener("").await;
    let mut callback = listener.valid_callback(3);
    callback.secret.clear();

    let outcome = send_callback(&callback)
        .await
        .expect("Listener should be reachable");

    assert_eq!(outcome, CallbackOutcome::Rejected);
    settle().await;
    assert!(listener.receiver.try_recv().is_none());
}

#[tokio::test]
async fn given_unknown_window_when_sent_then_rejected() {
    let mut listener = start_test_listener(TEST_SECRET).await;
    let mut callback = listener.valid_callback(3);
    callback.window_id = WindowId(0x2002).as_u64();

    assert!(send_raw_callback(listener.port(), &callback).await.is_none());
    settle().await;
    assert!(listener.receiver.try_recv().is_none());
}

/// **VALUE**: A binding issued for another listener is rejected even when it reaches this one.
///
/// **WHY THIS MATTERS**: Two editor instances each run a listener. A binding meant for
/// one must never navigate the other.
#[tokio::test]
async fn given_port_of_another_listener_when_sent_then_rejected() {
    let mut listener = start_test_listener(TEST_SECRET).await;
    let mut callback = listener.valid_callback(3);
    callback.port = u32::from(listener.port()).wrapping_add(1);

    assert!(send_raw_callback(listener.port(), &callback).await.is_none());
    settle().await;
    assert!(listener.receiver.try_recv().is_none());
}

/// **VALUE**: Regenerating the secret revokes every binding issued before.
///
/// **WHY THIS MATTERS**: The viewer holds the last binding it was given indefinitely.
/// Regeneration is the only way the editor can revoke it.
///
/// **BUG THIS CATCHES**: The listener caching the secret at start-up instead of
/// re-reading it per callback.
#[tokio::test]
async fn given_regenerated_secret_when_old_binding_used_then_rejected() {
    // GIVEN: A binding captured before regeneration
    let mut listener = start_test_listener(TEST_SECRET).await;
    let stale = listener.valid_callback(10);

    // WHEN: The editor regenerates its secret
    listener.provisioner.set_secret("regenerated-secret");

    // THEN: The stale binding is refused, a fresh one works
    let outcome = send_callback(&stale).await.expect("Listener should be reachable");
    assert_eq!(outcome, CallbackOutcome::Rejected);

    let mut fresh = stale.clone();
    fresh.secret = "regenerated-secret".to_string();
    let outcome = send_callback(&fresh).await.expect("Listener should be reachable");
    assert_eq!(outcome, CallbackOutcome::Accepted);

    let navigation = listener.receiver.try_recv().expect("Fresh binding should navigate");
    assert_eq!(navigation.line, 10);
    assert!(listener.receiver.try_recv().is_none(), "Stale binding must not navigate");
}

#[tokio::test]
async fn given_window_closed_when_callback_sent_then_rejected() {
    let mut listener = start_test_listener(TEST_SECRET).await;
    listener
        .windows
        .unregister(TEST_WINDOW)
        .await
        .expect("Failed to unregister window");

    let outcome = send_callback(&listener.valid_callback(5))
        .await
        .expect("Listener should be reachable");

    assert_eq!(outcome, CallbackOutcome::Rejected);
    assert!(listener.receiver.try_recv().is_none());
}

/// **VALUE**: Rapid clicks are each validated and dispatched independently.
///
/// **WHY THIS MATTERS**: Users double-click and click around. A listener that
/// serializes connections, or shares state between them, drops or mixes up clicks.
#[tokio::test]
async fn given_concurrent_callbacks_when_sent_then_all_dispatched() {
    let mut listener = start_test_listener(TEST_SECRET).await;

    let tasks: Vec<_> = (1..=10)
        .map(|line| {
            let callback = listener.valid_callback(line);
            tokio::spawn(async move { send_callback(&callback).await })
        })
        .collect();

    for task in tasks {
        let outcome = task
            .await
            .expect("Task panicked")
            .expect("Callback should reach the listener");
        assert_eq!(outcome, CallbackOutcome::Accepted);
    }

    let mut lines = Vec::new();
    while let Some(navigation) = listener.receiver.try_recv() {
        lines.push(navigation.line);
    }
    lines.sort_unstable();
    assert_eq!(lines, (1..=10).collect::<Vec<_>>());
}

/// **VALUE**: When the editor stops draining, a callback beyond the queue depth is
/// refused at once and never navigates later.
///
/// **WHY THIS MATTERS**: A hung UI thread must not park listener tasks with open
/// sockets. The callback process would time out and report failure, and then the
/// click would still fire once the UI woke up.
///
/// **BUG THIS CATCHES**: Would catch if:
/// - Dispatch waits for queue room instead of dropping
/// - A dropped navigation is still acknowledged
#[tokio::test]
async fn given_full_navigation_queue_when_callback_sent_then_rejected_promptly() {
    // GIVEN: A listener whose queue the editor has filled but not drained
    let mut listener = start_test_listener(TEST_SECRET).await;
    for line in 1..=NAVIGATION_QUEUE_DEPTH as u32 {
        let outcome = send_callback(&listener.valid_callback(line))
            .await
            .expect("Callback should reach the listener");
        assert_eq!(outcome, CallbackOutcome::Accepted, "line {line}");
    }

    // WHEN: One more click arrives
    let started = Instant::now();
    let overflow_line = NAVIGATION_QUEUE_DEPTH as u32 + 1;
    let outcome = send_callback(&listener.valid_callback(overflow_line))
        .await
        .expect("Listener should answer, not time out");

    // THEN: Refused well inside the callback's ack timeout, and only the first
    // NAVIGATION_QUEUE_DEPTH clicks ever reach the editor
    assert_eq!(outcome, CallbackOutcome::Rejected);
    assert!(
        started.elapsed() < Duration::from_secs(2),
        "Overflow took {:?}",
        started.elapsed()
    );

    settle().await;
    let mut lines = Vec::new();
    while let Some(navigation) = listener.receiver.try_recv() {
        lines.push(navigation.line);
    }
    assert_eq!(lines.len(), NAVIGATION_QUEUE_DEPTH);
    assert!(!lines.contains(&overflow_line));
}

#[tokio::test]
async fn given_text_frame_when_sent_then_connection_closed_without_ack() {
    let mut listener = start_test_listener(TEST_SECRET).await;

    let ack = send_raw_frame(listener.port(), Message::Text("hello".into())).await;

    assert!(ack.is_none());
    settle().await;
    assert!(listener.receiver.try_recv().is_none());
}

#[tokio::test]
async fn given_undecodable_frame_when_sent_then_connection_closed_without_ack() {
    let listener = start_test_listener(TEST_SECRET).await;

    let garbage = vec![0xFF, 0xFF, 0xFF, 0xFF, 0xFF];
    let ack = send_raw_frame(listener.port(), Message::Binary(garbage.into())).await;

    assert!(ack.is_none());
}

/// **VALUE**: After shutdown the port stops accepting connections.
///
/// **BUG THIS CATCHES**: An accept loop that ignores the shutdown signal and keeps the
/// port bound after the editor session ends.
#[tokio::test]
async fn given_running_listener_when_shutdown_then_inactive_and_refuses_connections() {
    let mut listener = start_test_listener(TEST_SECRET).await;
    let port = listener.port();

    // Sanity: reachable while running
    drop(connect_to_listener(port).await);
    assert!(listener.handle.is_active());

    listener.handle.shutdown().await;

    assert!(!listener.handle.is_active());
    let result = connect_async(format!("ws://127.0.0.1:{port}")).await;
    assert!(result.is_err(), "Listener should refuse connections after shutdown");
}

use crate::helpers::{FixedProvisioner, RecordingLauncher, TEST_SECRET, TEST_WINDOW};

use synctex_core::bridge::{BridgeSession, SyncBridge};
use synctex_core::callback::{CallbackOutcome, send_callback};
use synctex_core::config::{BridgeConfig, ViewerFlags};
use synctex_core::error::CoreError;
use synctex_core::error::launch::LaunchError;
use synctex_core::launch::{DetachedLauncher, ProcessLauncher};
use synctex_core::proto::InverseSearchCallback;
use synctex_core::session::{SessionPhase, ViewerSession};

use std::env;
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use serial_test::serial;

const VIEWER: &str = "/opt/sumatra/SumatraPDF.exe";
const CALLBACK_EXE: &str = "/opt/bridge/inverse-search";
const SESSION_SECRET_VAR: &str = "SYNCTEX_BRIDGE_IT_SECRET";

fn session(viewer: Option<&str>) -> ViewerSession {
    ViewerSession {
        viewer_executable_path: viewer.map(PathBuf::from),
        reuse_instance: true,
        background_color: "#ffffff".to_string(),
    }
}

fn bridge(
    viewer: Option<&str>,
    provisioner: Arc<FixedProvisioner>,
    launcher: Arc<RecordingLauncher>,
) -> SyncBridge {
    SyncBridge::new(
        session(viewer),
        ViewerFlags::sumatra(),
        CALLBACK_EXE,
        provisioner,
        launcher,
    )
}

/// **VALUE**: A forward search launches the configured viewer once with the full argument list.
///
/// **WHY THIS MATTERS**: This is the whole source-to-PDF path as the editor sees it.
#[test]
fn given_configured_viewer_when_forward_search_then_launches_with_binding() {
    // GIVEN: Bridge with a provisioned secret
    let provisioner = Arc::new(FixedProvisioner::new("abc123", 7777, TEST_WINDOW));
    let launcher = Arc::new(RecordingLauncher::default());
    let bridge = bridge(Some(VIEWER), provisioner, launcher.clone());

    // WHEN: Forward search from main.tex:42:5
    bridge
        .forward_search("out.pdf", "main.tex", 42, 5)
        .expect("Forward search should launch");

    // THEN: One launch of the viewer, ending in the forward search + binding + PDF
    let calls = launcher.calls();
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].0, PathBuf::from(VIEWER));
    assert_eq!(
        &launcher.last_args()[3..],
        &[
            "-forward-search",
            "main.tex",
            "5",
            "-inverse-search",
            r#""/opt/bridge/inverse-search" 0x1001 7777 abc123 "%f" %l"#,
            "out.pdf",
        ]
    );
    assert_eq!(bridge.bindings_issued(), 1);
}

/// **VALUE**: Every invocation re-reads the secret, so a regenerated secret is in the
/// very next binding.
///
/// **WHY THIS MATTERS**: The viewer only learns about a new secret when it is handed a
/// new binding. Caching the old one would leave inverse search broken until restart.
#[test]
fn given_regenerated_secret_when_next_request_then_binding_carries_new_secret() {
    let provisioner = Arc::new(FixedProvisioner::new("first-secret", 7777, TEST_WINDOW));
    let launcher = Arc::new(RecordingLauncher::default());
    let bridge = bridge(Some(VIEWER), provisioner.clone(), launcher.clone());

    bridge.navigate_page("out.pdf", 1).expect("Page should launch");
    provisioner.set_secret("second-secret");
    bridge.view("out.pdf", None).expect("Open should launch");

    let args = launcher.last_args();
    let binding = &args[args.len() - 2];
    assert!(binding.contains("second-secret"), "Stale binding: {binding}");
    assert!(!binding.contains("first-secret"));
    assert_eq!(bridge.bindings_issued(), 2);
}

#[test]
fn given_view_with_page_when_called_then_emits_page_flag() {
    let provisioner = Arc::new(FixedProvisioner::new("abc123", 7777, TEST_WINDOW));
    let launcher = Arc::new(RecordingLauncher::default());
    let bridge = bridge(Some(VIEWER), provisioner, launcher.clone());

    bridge.view("out.pdf", Some(4)).expect("View should launch");

    let args = launcher.last_args();
    assert_eq!(&args[3..5], &["-page", "4"]);
}

/// **VALUE**: Without a viewer path nothing is launched and the caller is told why.
///
/// **BUG THIS CATCHES**: Spawning an empty program name, which fails with an opaque OS
/// error, or counting a binding that was never handed to a viewer.
#[test]
fn given_no_viewer_configured_when_view_then_not_configured_error() {
    let provisioner = Arc::new(FixedProvisioner::new("abc123", 7777, TEST_WINDOW));
    let launcher = Arc::new(RecordingLauncher::default());
    let bridge = bridge(None, provisioner, launcher.clone());

    let result = bridge.view("out.pdf", None);

    assert!(matches!(
        result,
        Err(CoreError::Launch(LaunchError::NotConfigured { .. }))
    ));
    assert!(launcher.calls().is_empty());
    assert_eq!(bridge.bindings_issued(), 0);
}

#[test]
fn given_invalid_request_when_navigate_page_then_request_error_and_no_launch() {
    let provisioner = Arc::new(FixedProvisioner::new("abc123", 7777, TEST_WINDOW));
    let launcher = Arc::new(RecordingLauncher::default());
    let bridge = bridge(Some(VIEWER), provisioner, launcher.clone());

    let result = bridge.navigate_page("out.pdf", 0);

    assert!(matches!(result, Err(CoreError::Request(_))));
    assert!(launcher.calls().is_empty());
}

/// **VALUE**: A failed spawn is reported once and never retried.
#[test]
fn given_failing_launcher_when_forward_search_then_error_after_single_attempt() {
    let provisioner = Arc::new(FixedProvisioner::new("abc123", 7777, TEST_WINDOW));
    let launcher = Arc::new(RecordingLauncher::failing());
    let bridge = bridge(Some(VIEWER), provisioner, launcher.clone());

    let result = bridge.forward_search("out.pdf", "main.tex", 1, 1);

    assert!(matches!(
        result,
        Err(CoreError::Launch(LaunchError::Spawn { .. }))
    ));
    assert_eq!(launcher.calls().len(), 1, "Launch must not be retried");
}

/// **VALUE**: A binding only counts as issued once a viewer actually received it.
///
/// **BUG THIS CATCHES**: The session reporting `Bound` after every launch failed,
/// when no viewer holds a binding that could call back.
#[test]
fn given_failing_launcher_when_request_fails_then_no_binding_counted() {
    let provisioner = Arc::new(FixedProvisioner::new("abc123", 7777, TEST_WINDOW));
    let launcher = Arc::new(RecordingLauncher::failing());
    let bridge = bridge(Some(VIEWER), provisioner, launcher.clone());

    let _ = bridge.forward_search("out.pdf", "main.tex", 1, 1);
    let _ = bridge.view("out.pdf", Some(2));

    assert_eq!(launcher.calls().len(), 2);
    assert_eq!(bridge.bindings_issued(), 0);
}

#[test]
fn given_missing_executable_when_detached_launch_then_spawn_error() {
    let result = DetachedLauncher.launch(
        Path::new("/nonexistent/synctex-bridge/viewer"),
        &[OsString::from("out.pdf")],
    );

    match result {
        Err(LaunchError::Spawn { path, .. }) => {
            assert_eq!(path, PathBuf::from("/nonexistent/synctex-bridge/viewer"));
        }
        other => panic!("Expected spawn error, got {other:?}"),
    }
}

/// **VALUE**: A started session hands out bindings that its own listener accepts.
///
/// **WHY THIS MATTERS**: The bridge and the listener are built separately. If the
/// binding carries the configured port (0) instead of the bound one, or a secret read
/// from a different variable, every click is rejected.
///
/// **BUG THIS CATCHES**: Would catch if:
/// - The bridge's provisioner is built before the listener's port is known
/// - The session registers no window
/// - The phase does not advance once bindings are issued
#[tokio::test]
#[serial]
async fn given_started_session_when_binding_used_then_own_listener_accepts() {
    // GIVEN: A secret in the environment and a session bound to an OS-chosen port
    // SAFETY: serialized with every other test touching the environment
    unsafe { env::set_var(SESSION_SECRET_VAR, TEST_SECRET) };

    let mut config = BridgeConfig::default();
    config.inverse_search.secret_env_var = SESSION_SECRET_VAR.to_string();
    config.inverse_search.callback_executable_path = Some(PathBuf::from(CALLBACK_EXE));
    config.viewer.executable_path = Some(PathBuf::from(VIEWER));

    let launcher = Arc::new(RecordingLauncher::default());
    let (mut session, mut receiver) = BridgeSession::start_with_launcher(
        &config,
        ViewerFlags::sumatra(),
        TEST_WINDOW,
        launcher.clone(),
    )
    .await
    .expect("Session should start");

    assert_ne!(session.listener_port(), 0);
    assert_eq!(session.phase(), SessionPhase::SecretProvisioned);

    // WHEN: A request reaches the viewer
    session
        .bridge()
        .view("out.pdf", None)
        .expect("Recording launcher never fails");
    assert_eq!(launcher.calls().len(), 1);
    assert_eq!(session.phase(), SessionPhase::ListenerActive);

    // THEN: The current binding is accepted by the session's own listener
    let binding = session.bridge().current_binding();
    assert_eq!(binding.listen_port, session.listener_port());

    let outcome = send_callback(&InverseSearchCallback {
        window_id: binding.caller_window_id.as_u64(),
        port: u32::from(binding.listen_port),
        secret: binding.shared_secret.as_str().to_string(),
        source_path: "/home/user/thesis/intro.tex".to_string(),
        source_line: 12,
    })
    .await
    .expect("Listener should be reachable");
    assert_eq!(outcome, CallbackOutcome::Accepted);

    let navigation = receiver.try_recv().expect("Navigation should be queued");
    assert_eq!(navigation.line, 12);

    session.shutdown().await;
    // SAFETY: as above
    unsafe { env::remove_var(SESSION_SECRET_VAR) };
}

#[tokio::test]
#[serial]
async fn given_no_secret_in_environment_when_session_started_then_uninitialized() {
    // SAFETY: serialized with every other test touching the environment
    unsafe { env::remove_var(SESSION_SECRET_VAR) };

    let mut config = BridgeConfig::default();
    config.inverse_search.secret_env_var = SESSION_SECRET_VAR.to_string();

    let (mut session, _receiver) =
        BridgeSession::start(&config, ViewerFlags::sumatra(), TEST_WINDOW)
            .await
            .expect("A missing secret must not prevent start-up");

    assert_eq!(session.phase(), SessionPhase::Uninitialized);
    assert!(session.bridge().current_binding().shared_secret.is_empty());

    session.shutdown().await;
}

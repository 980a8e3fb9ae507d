//! Editor binding -> viewer substitution -> callback CLI -> listener.

use inverse_search::cli::{Cli, EXIT_ACCEPTED, EXIT_REJECTED, exit_code};

use synctex_core::callback::send_callback;
use synctex_core::command::InverseSearchBinding;
use synctex_core::config::ViewerFlags;
use synctex_core::listener::{
    ListenerHandle, LiveWindows, NavigationReceiver, navigation_channel, start_listener,
};
use synctex_core::session::{Provisioner, WindowId};

use common::SharedSecret;

use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;

const WINDOW: WindowId = WindowId(0x1001);

struct StaticProvisioner {
    secret: &'static str,
}

impl Provisioner for StaticProvisioner {
    fn current_secret(&self) -> SharedSecret {
        SharedSecret::new(self.secret)
    }

    fn current_port(&self) -> u16 {
        0
    }

    fn caller_window_id(&self) -> WindowId {
        WINDOW
    }
}

/// Substitute the placeholders and split the way the viewer does: on
/// whitespace, honouring double quotes, dropping empty tokens.
fn viewer_command_line(binding: &str, file: &str, line: u32) -> Vec<String> {
    let substituted = binding
        .replace("%f", file)
        .replace("%l", &line.to_string());

    let mut tokens = Vec::new();
    let mut current = String::new();
    let mut quoted = false;
    for c in substituted.chars() {
        match c {
            '"' => quoted = !quoted,
            c if c.is_whitespace() && !quoted => {
                if !current.is_empty() {
                    tokens.push(std::mem::take(&mut current));
                }
            }
            c => current.push(c),
        }
    }
    if !current.is_empty() {
        tokens.push(current);
    }
    tokens
}

async fn start(secret: &'static str) -> (ListenerHandle, NavigationReceiver) {
    let windows = LiveWindows::new();
    windows.register(WINDOW).await.expect("Failed to register window");
    let (dispatcher, receiver) = navigation_channel();

    let handle = start_listener(0, Arc::new(StaticProvisioner { secret }), windows, dispatcher)
        .await
        .expect("Failed to start listener");

    (handle, receiver)
}

fn binding(port: u16, secret: &str) -> String {
    InverseSearchBinding {
        callback_executable_path: PathBuf::from("/opt/synctex bridge/inverse-search"),
        caller_window_id: WINDOW,
        listen_port: port,
        shared_secret: SharedSecret::new(secret),
    }
    .to_argument(&ViewerFlags::sumatra())
}

/// **VALUE**: What the editor registers is exactly what the callback can parse and the
/// listener accepts.
///
/// **WHY THIS MATTERS**: The three pieces are only ever tested together by a user
/// clicking in the PDF. A mismatch in quoting or field order breaks inverse search
/// with no visible error anywhere.
#[tokio::test]
async fn given_registered_binding_when_viewer_runs_it_then_editor_navigates() {
    // GIVEN: A listener and the binding the editor would register
    let (listener, mut receiver) = start("abc123").await;
    let command = viewer_command_line(
        &binding(listener.port(), "abc123"),
        "/home/user/my thesis/main.tex",
        42,
    );

    // WHEN: The viewer runs the callback with the substituted command line
    assert_eq!(command[0], "/opt/synctex bridge/inverse-search");
    let callback = Cli::try_parse_from(&command)
        .expect("Callback should parse the viewer's command line")
        .into_callback()
        .expect("Arguments should be valid");
    let result = send_callback(&callback).await;

    // THEN: Accepted, and the editor is asked to open the clicked line
    assert_eq!(exit_code(&result), EXIT_ACCEPTED);
    let navigation = receiver.try_recv().expect("Navigation should be queued");
    assert_eq!(navigation.path, PathBuf::from("/home/user/my thesis/main.tex"));
    assert_eq!(navigation.line, 42);
}

/// **VALUE**: An empty-token binding survives the viewer's splitting, parses, and is
/// rejected.
///
/// **BUG THIS CATCHES**: The callback mis-assigning fields when the secret token
/// disappears, or the listener accepting the result.
#[tokio::test]
async fn given_empty_token_binding_when_viewer_runs_it_then_rejected() {
    let (listener, mut receiver) = start("").await;
    let command = viewer_command_line(&binding(listener.port(), ""), "main.tex", 3);
    assert_eq!(command.len(), 5, "Empty token should vanish: {command:?}");

    let callback = Cli::try_parse_from(&command)
        .expect("Four positionals should parse")
        .into_callback()
        .expect("Arguments should be valid");
    assert!(callback.secret.is_empty());

    let result = send_callback(&callback).await;

    assert_eq!(exit_code(&result), EXIT_REJECTED);
    assert!(receiver.try_recv().is_none());
}

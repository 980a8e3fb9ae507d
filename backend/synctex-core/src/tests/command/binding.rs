use crate::command::InverseSearchBinding;
use crate::config::ViewerFlags;
use crate::error::binding::BindingError;
use crate::session::WindowId;

use common::SharedSecret;

use std::path::PathBuf;

fn binding(secret: &str) -> InverseSearchBinding {
    InverseSearchBinding {
        callback_executable_path: PathBuf::from("/opt/bridge/inverse-search"),
        caller_window_id: WindowId(0x1001),
        listen_port: 7777,
        shared_secret: SharedSecret::new(secret),
    }
}

/// **VALUE**: The serialized binding has exactly the shape the viewer stores and
/// re-executes on click.
///
/// **WHY THIS MATTERS**: The viewer substitutes `%f` and `%l` and then runs the
/// string as a command line. Quoting or ordering mistakes only surface when a
/// user clicks in the PDF, far away from this code.
///
/// **BUG THIS CATCHES**: Unquoted executable path (breaks on paths with spaces),
/// swapped port/window fields, or a quoted `%l`.
#[test]
fn given_binding_when_to_argument_then_matches_viewer_format() {
    // GIVEN: A fully provisioned binding
    let binding = binding("abc123");

    // WHEN: Serialized with SumatraPDF placeholders
    let arg = binding.to_argument(&ViewerFlags::sumatra());

    // THEN: Quoted exe, hex window, port, bare secret, quoted file, bare line
    assert_eq!(
        arg,
        r#""/opt/bridge/inverse-search" 0x1001 7777 abc123 "%f" %l"#
    );
}

/// **VALUE**: The window id, port and secret survive serialize-then-parse.
///
/// **WHY THIS MATTERS**: The callback executable recovers these fields from the
/// viewer's command line. Anything lost in transit makes every click fail
/// validation.
#[test]
fn given_serialized_binding_when_parse_then_fields_recovered() {
    let flags = ViewerFlags::sumatra();
    let original = binding("abc123");

    let parsed = InverseSearchBinding::parse(&original.to_argument(&flags), &flags)
        .expect("Serialized binding should parse");

    assert_eq!(parsed.callback_executable_path, original.callback_executable_path);
    assert_eq!(parsed.caller_window_id, original.caller_window_id);
    assert_eq!(parsed.listen_port, original.listen_port);
    assert!(parsed.shared_secret.matches("abc123"));
}

/// **VALUE**: Without a secret the binding carries the empty token.
///
/// **WHY THIS MATTERS**: An unprovisioned session must still produce a binding
/// (forward search keeps working) but one that the listener can never accept.
///
/// **BUG THIS CATCHES**: Dropping the secret field entirely, which shifts
/// the placeholders one position left and makes the callback parse `%f` as a
/// secret.
#[test]
fn given_empty_secret_when_to_argument_then_token_is_empty() {
    let flags = ViewerFlags::sumatra();
    let arg = binding("").to_argument(&flags);

    assert_eq!(arg, r#""/opt/bridge/inverse-search" 0x1001 7777  "%f" %l"#);

    let parsed = InverseSearchBinding::parse(&arg, &flags).expect("Empty token should parse");
    assert!(parsed.shared_secret.is_empty());
}

/// **VALUE**: A secret that would split into several words is never embedded.
///
/// **BUG THIS CATCHES**: A secret with a space or quote injecting extra
/// arguments into the command the viewer runs on click.
#[test]
fn given_non_embeddable_secret_when_to_argument_then_token_is_empty() {
    let arg = binding("abc \"rm\" x").to_argument(&ViewerFlags::sumatra());

    assert_eq!(arg, r#""/opt/bridge/inverse-search" 0x1001 7777  "%f" %l"#);
}

#[test]
fn given_custom_placeholders_when_round_trip_then_uses_them() {
    let flags = ViewerFlags {
        file_placeholder: "$(file)".to_string(),
        line_placeholder: "$(line)".to_string(),
        ..ViewerFlags::sumatra()
    };

    let arg = binding("abc123").to_argument(&flags);
    assert!(arg.ends_with(r#""$(file)" $(line)"#), "Unexpected binding: {arg}");

    let parsed = InverseSearchBinding::parse(&arg, &flags).expect("Custom binding should parse");
    assert_eq!(parsed.listen_port, 7777);
}

#[test]
fn given_unrelated_argument_when_parse_then_parse_error() {
    let result = InverseSearchBinding::parse("-reuse-instance", &ViewerFlags::sumatra());

    assert!(matches!(result, Err(BindingError::Parse { .. })));
}

#[test]
fn given_malformed_window_id_when_parse_then_window_id_error() {
    let arg = r#""/opt/bridge/inverse-search" 0xZZ 7777 abc123 "%f" %l"#;

    let result = InverseSearchBinding::parse(arg, &ViewerFlags::sumatra());

    assert!(matches!(result, Err(BindingError::WindowId { .. })));
}

use crate::INVERSE_SEARCH_BINARY;
use crate::launch::{build_launch_command, locate_callback_executable};

use std::ffi::OsString;
use std::path::Path;

#[test]
fn given_executable_and_args_when_build_launch_command_then_passes_args_verbatim() {
    let args = vec![
        OsString::from("-page"),
        OsString::from("3"),
        OsString::from("my thesis.pdf"),
    ];

    let cmd = build_launch_command(Path::new("/opt/sumatra/SumatraPDF.exe"), &args);

    assert_eq!(cmd.get_program(), "/opt/sumatra/SumatraPDF.exe");
    let passed: Vec<_> = cmd.get_args().collect();
    assert_eq!(passed, vec!["-page", "3", "my thesis.pdf"]);
}

/// **VALUE**: The default callback executable sits next to the running binary.
///
/// **WHY THIS MATTERS**: Installers ship both binaries side by side. Resolving
/// through `PATH` first could pick up a different install's callback.
#[test]
fn given_running_test_binary_when_locate_callback_executable_then_sibling_path() {
    let located = locate_callback_executable();

    let file_name = located
        .file_name()
        .and_then(|name| name.to_str())
        .expect("Located path should have a file name");
    assert!(file_name.starts_with(INVERSE_SEARCH_BINARY));

    let exe_dir = std::env::current_exe()
        .expect("Test binary path")
        .parent()
        .map(Path::to_path_buf);
    assert_eq!(located.parent().map(Path::to_path_buf), exe_dir);
}

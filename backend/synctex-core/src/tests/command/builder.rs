use crate::command::builder::standard_args;
use crate::command::{InverseSearchBinding, build_viewer_args};
use crate::config::ViewerFlags;
use crate::request::SyncRequest;
use crate::session::{ViewerSession, WindowId};

use common::SharedSecret;

use std::ffi::OsString;
use std::path::PathBuf;

const FORWARD_FLAG: &str = "-forward-search";
const PAGE_FLAG: &str = "-page";

fn session() -> ViewerSession {
    ViewerSession {
        viewer_executable_path: Some(PathBuf::from("/opt/sumatra/SumatraPDF.exe")),
        reuse_instance: true,
        background_color: "#ffffff".to_string(),
    }
}

fn binding(secret: &str) -> InverseSearchBinding {
    InverseSearchBinding {
        callback_executable_path: PathBuf::from("/opt/bridge/inverse-search"),
        caller_window_id: WindowId(0x1001),
        listen_port: 7777,
        shared_secret: SharedSecret::new(secret),
    }
}

fn strings(args: &[OsString]) -> Vec<String> {
    args.iter()
        .map(|a| a.to_string_lossy().into_owned())
        .collect()
}

fn count(args: &[String], flag: &str) -> usize {
    args.iter().filter(|a| a.as_str() == flag).count()
}

/// **VALUE**: A forward search produces the exact argument list the viewer expects.
///
/// **WHY THIS MATTERS**: SumatraPDF parses positionally after each flag. One
/// misplaced element and the viewer opens the wrong file or ignores the
/// inverse-search registration.
///
/// **BUG THIS CATCHES**: Passing the line instead of the column as the offset, or
/// putting the document path anywhere but last.
#[test]
fn given_forward_search_when_build_viewer_args_then_matches_expected_layout() {
    // GIVEN: main.tex:42, column 5, window 0x1001, port 7777, secret abc123
    let request = SyncRequest::forward_search("out.pdf", "main.tex", 42, 5)
        .expect("valid forward search");

    // WHEN: Building the viewer arguments
    let args = strings(&build_viewer_args(
        &request,
        &session(),
        &binding("abc123"),
        &ViewerFlags::sumatra(),
    ));

    // THEN: Standard flags, forward search with column, binding, then the PDF
    assert_eq!(
        args,
        vec![
            "-bg-color",
            "#ffffff",
            "-reuse-instance",
            "-forward-search",
            "main.tex",
            "5",
            "-inverse-search",
            r#""/opt/bridge/inverse-search" 0x1001 7777 abc123 "%f" %l"#,
            "out.pdf",
        ]
    );
}

/// **VALUE**: Every request yields at most one of the forward-search and page flags.
///
/// **BUG THIS CATCHES**: A builder that appends a page flag after a forward search
/// (or vice versa), leaving the viewer to pick one.
#[test]
fn given_each_request_kind_when_build_viewer_args_then_at_most_one_target_flag() {
    let flags = ViewerFlags::sumatra();
    let cases = [
        (
            SyncRequest::forward_search("out.pdf", "main.tex", 10, 1).expect("valid"),
            1,
            0,
        ),
        (SyncRequest::page("out.pdf", 7).expect("valid"), 0, 1),
        (SyncRequest::open("out.pdf"), 0, 0),
    ];

    for (request, forward, page) in cases {
        let args = strings(&build_viewer_args(
            &request,
            &session(),
            &binding("abc123"),
            &flags,
        ));

        assert_eq!(count(&args, FORWARD_FLAG), forward, "{:?}", request.target());
        assert_eq!(count(&args, PAGE_FLAG), page, "{:?}", request.target());
    }
}

/// **VALUE**: A page jump with no secret still registers a binding, with an empty token.
///
/// **WHY THIS MATTERS**: The viewer keeps the last binding it saw. Skipping the
/// registration would leave an older (possibly valid) binding in place.
#[test]
fn given_page_without_secret_when_build_viewer_args_then_binding_has_empty_token() {
    let request = SyncRequest::page("out.pdf", 3).expect("valid page");

    let args = strings(&build_viewer_args(
        &request,
        &session(),
        &binding(""),
        &ViewerFlags::sumatra(),
    ));

    assert_eq!(
        &args[3..],
        &[
            "-page",
            "3",
            "-inverse-search",
            r#""/opt/bridge/inverse-search" 0x1001 7777  "%f" %l"#,
            "out.pdf",
        ]
    );
}

#[test]
fn given_reuse_disabled_when_standard_args_then_no_reuse_flag() {
    let session = ViewerSession {
        reuse_instance: false,
        background_color: "#202020".to_string(),
        ..session()
    };

    let args = strings(&standard_args(&session, &ViewerFlags::sumatra()));

    assert_eq!(args, vec!["-bg-color", "#202020"]);
}

#[test]
fn given_source_path_with_spaces_when_build_viewer_args_then_passed_as_single_argument() {
    let request = SyncRequest::forward_search("my thesis.pdf", "chapters/intro part.tex", 3, 2)
        .expect("valid forward search");

    let args = strings(&build_viewer_args(
        &request,
        &session(),
        &binding("abc123"),
        &ViewerFlags::sumatra(),
    ));

    assert_eq!(args[4], "chapters/intro part.tex");
    assert_eq!(args.last().map(String::as_str), Some("my thesis.pdf"));
}

/// **VALUE**: An absolute source path reaches the viewer exactly as the editor gave it.
///
/// **BUG THIS CATCHES**: Canonicalizing against the editor's working directory,
/// which resolves symlinks and hands the viewer a path synctex never recorded.
#[test]
fn given_absolute_source_path_when_build_viewer_args_then_emitted_verbatim() {
    let source = "/home/user/thesis/./chapters/intro.tex";
    let request =
        SyncRequest::forward_search("/home/user/thesis/out.pdf", source, 10, 1).expect("valid");

    let args = strings(&build_viewer_args(
        &request,
        &session(),
        &binding("abc123"),
        &ViewerFlags::sumatra(),
    ));

    let at = args
        .iter()
        .position(|a| a == FORWARD_FLAG)
        .expect("forward-search flag present");
    assert_eq!(args[at + 1], source);
}

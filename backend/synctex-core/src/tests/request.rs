use crate::error::request::RequestError;
use crate::request::{SyncRequest, SyncTarget};

use std::path::{Path, PathBuf};

/// **VALUE**: A request never carries both a source position and a page.
///
/// **WHY THIS MATTERS**: The viewer takes either `-forward-search` or `-page`. Emitting
/// both would let the viewer pick one arbitrarily, so the editor's intent is lost.
///
/// **BUG THIS CATCHES**: A `from_parts` match arm that silently prefers one target
/// over the other instead of refusing the request.
#[test]
fn given_source_position_and_page_when_from_parts_then_rejects() {
    // GIVEN: Loose fields with both targets populated
    let result = SyncRequest::from_parts(
        "out.pdf",
        Some(PathBuf::from("main.tex")),
        Some(42),
        None,
        Some(3),
    );

    // THEN: Refused
    assert!(matches!(result, Err(RequestError::Invalid { .. })));
}

#[test]
fn given_no_target_when_from_parts_then_open() {
    let request = SyncRequest::from_parts("out.pdf", None, None, None, None)
        .expect("plain open should be valid");

    assert_eq!(request.target(), &SyncTarget::Open);
    assert_eq!(request.document_path(), Path::new("out.pdf"));
}

/// **VALUE**: The column defaults to 1 when the editor has none.
///
/// **BUG THIS CATCHES**: Emitting `0` as the offset, which the viewer treats as
/// out-of-range and ignores.
#[test]
fn given_forward_search_without_column_when_from_parts_then_column_defaults_to_one() {
    let request = SyncRequest::from_parts(
        "out.pdf",
        Some(PathBuf::from("main.tex")),
        Some(42),
        None,
        None,
    )
    .expect("forward search should be valid");

    assert_eq!(
        request.target(),
        &SyncTarget::ForwardSearch {
            source_path: PathBuf::from("main.tex"),
            line: 42,
            column: 1,
        }
    );
}

#[test]
fn given_half_a_source_position_when_from_parts_then_rejects() {
    let path_only =
        SyncRequest::from_parts("out.pdf", Some(PathBuf::from("main.tex")), None, None, None);
    let line_only = SyncRequest::from_parts("out.pdf", None, Some(42), None, None);

    assert!(path_only.is_err(), "source path without line must be refused");
    assert!(line_only.is_err(), "source line without path must be refused");
}

#[test]
fn given_column_without_source_when_from_parts_then_rejects() {
    let with_page = SyncRequest::from_parts("out.pdf", None, None, Some(5), Some(2));
    let alone = SyncRequest::from_parts("out.pdf", None, None, Some(5), None);

    assert!(with_page.is_err());
    assert!(alone.is_err());
}

/// **VALUE**: Zero is never accepted where the viewer expects a 1-based number.
#[test]
fn given_zero_positions_when_building_requests_then_rejects() {
    assert!(SyncRequest::page("out.pdf", 0).is_err(), "page 0");
    assert!(
        SyncRequest::forward_search("out.pdf", "main.tex", 0, 1).is_err(),
        "line 0"
    );
    assert!(
        SyncRequest::forward_search("out.pdf", "main.tex", 1, 0).is_err(),
        "column 0"
    );
}

#[test]
fn given_empty_paths_when_building_requests_then_rejects() {
    assert!(SyncRequest::page("", 1).is_err(), "empty document");
    assert!(
        SyncRequest::forward_search("out.pdf", "", 1, 1).is_err(),
        "empty source"
    );
}

#[test]
fn given_valid_page_when_page_then_target_is_page() {
    let request = SyncRequest::page("out.pdf", 3).expect("page 3 should be valid");

    assert_eq!(request.target(), &SyncTarget::Page(3));
}

#[test]
fn given_invalid_request_when_formatted_then_error_names_the_problem() {
    let err = SyncRequest::page("out.pdf", 0).expect_err("page 0 must fail");

    assert!(
        err.to_string().contains("1-based"),
        "Error should explain the constraint: {err}"
    );
}

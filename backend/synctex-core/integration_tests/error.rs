use synctex_core::error::CoreError;
use synctex_core::error::request::RequestError;
use synctex_core::request::SyncRequest;
use synctex_core::session::WindowId;

/// **VALUE**: Error messages carry the source location they were raised at.
///
/// **WHY THIS MATTERS**: Launch and callback failures are only ever seen in logs. The
/// location is what turns "Invalid Request Error" into something actionable.
#[test]
fn given_request_error_when_displayed_then_includes_location() {
    let err = SyncRequest::page("out.pdf", 0).expect_err("page 0 must fail");

    let message = err.to_string();

    assert!(message.starts_with("Invalid Request Error:"), "{message}");
    assert!(message.contains(".rs:"), "Missing location: {message}");
}

/// **VALUE**: Wrapping in `CoreError` keeps the inner message unchanged.
#[test]
fn given_request_error_when_converted_to_core_error_then_display_is_transparent() {
    let err = SyncRequest::page("out.pdf", 0).expect_err("page 0 must fail");
    let inner = err.to_string();

    let core: CoreError = err.into();

    assert_eq!(core.to_string(), inner);
    assert!(matches!(
        core,
        CoreError::Request(RequestError::Invalid { .. })
    ));
}

#[test]
fn given_bad_window_id_when_parsed_then_error_names_input() {
    let err = "0xnope".parse::<WindowId>().expect_err("must fail");

    assert!(err.to_string().contains("0xnope"), "{err}");
}

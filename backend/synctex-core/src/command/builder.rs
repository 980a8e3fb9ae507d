use crate::command::binding::InverseSearchBinding;
use crate::config::ViewerFlags;
use crate::request::{SyncRequest, SyncTarget};
use crate::session::ViewerSession;

use std::ffi::OsString;

/// Flags prepended to every invocation, whatever the request.
pub(crate) fn standard_args(session: &ViewerSession, flags: &ViewerFlags) -> Vec<OsString> {
    let mut args = vec![
        OsString::from(&flags.background_color),
        OsString::from(&session.background_color),
    ];
    if session.reuse_instance {
        args.push(OsString::from(&flags.reuse_instance));
    }
    args
}

/// Build the ordered argument list for one viewer invocation.
///
/// Layout:
///
/// ```text
/// <standard flags> [<forward-search> <source> <column> | <page> <n>] <inverse-search> <binding> <document>
/// ```
///
/// Forward search passes the 1-based column, not the line: the viewer uses
/// it as the in-line offset to pick the nearest synctex block.
///
/// Paths are emitted as given. Callers pass an absolute source path; a
/// relative one only resolves if the viewer happens to share the editor's
/// working directory.
pub fn build_viewer_args(
    request: &SyncRequest,
    session: &ViewerSession,
    binding: &InverseSearchBinding,
    flags: &ViewerFlags,
) -> Vec<OsString> {
    let mut args = standard_args(session, flags);

    match request.target() {
        SyncTarget::ForwardSearch {
            source_path,
            column,
            ..
        } => {
            args.push(OsString::from(&flags.forward_search));
            args.push(source_path.as_os_str().to_owned());
            args.push(OsString::from(column.to_string()));
        }
        SyncTarget::Page(page) => {
            args.push(OsString::from(&flags.page));
            args.push(OsString::from(page.to_string()));
        }
        SyncTarget::Open => {}
    }

    args.push(OsString::from(&flags.inverse_search));
    args.push(OsString::from(binding.to_argument(flags)));
    args.push(request.document_path().as_os_str().to_owned());

    args
}

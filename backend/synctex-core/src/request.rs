//! What the editor asks the viewer to show.
//!
//! A request names the PDF and at most one target inside it: a source
//! position (forward search) or a page. Neither means "just open it".

use crate::error::request::RequestError;

use common::ErrorLocation;

use std::panic::Location;
use std::path::{Path, PathBuf};

/// Where inside the document the viewer should land.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SyncTarget {
    /// Open (or raise) the document without moving.
    Open,

    /// Navigate to a 1-based page.
    Page(u32),

    /// Jump to the PDF location matching a source position.
    ForwardSearch {
        source_path: PathBuf,
        line: u32,
        column: u32,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncRequest {
    document_path: PathBuf,
    target: SyncTarget,
}

impl SyncRequest {
    pub fn open(document_path: impl Into<PathBuf>) -> Self {
        Self {
            document_path: document_path.into(),
            target: SyncTarget::Open,
        }
    }

    /// Page navigation. Page numbers are 1-based.
    #[track_caller]
    pub fn page(document_path: impl Into<PathBuf>, page: u32) -> Result<Self, RequestError> {
        Self::from_parts(document_path, None, None, None, Some(page))
    }

    /// Forward search from `source_path` at `line`/`column` (both 1-based).
    ///
    /// `source_path` should be absolute. It reaches the viewer verbatim and
    /// is resolved against the viewer's working directory, not the editor's.
    #[track_caller]
    pub fn forward_search(
        document_path: impl Into<PathBuf>,
        source_path: impl Into<PathBuf>,
        line: u32,
        column: u32,
    ) -> Result<Self, RequestError> {
        Self::from_parts(
            document_path,
            Some(source_path.into()),
            Some(line),
            Some(column),
            None,
        )
    }

    /// Build a request from the loose optional-field shape editors tend to
    /// carry around.
    ///
    /// # Errors
    ///
    /// Returns [`RequestError::Invalid`] if:
    /// - the document path is empty
    /// - both a source position and a page are given
    /// - only one of source path / source line is given
    /// - a line, column or page is zero
    #[track_caller]
    pub fn from_parts(
        document_path: impl Into<PathBuf>,
        source_path: Option<PathBuf>,
        source_line: Option<u32>,
        source_column: Option<u32>,
        page: Option<u32>,
    ) -> Result<Self, RequestError> {
        let document_path = document_path.into();
        if document_path.as_os_str().is_empty() {
            return Err(invalid("document path cannot be empty"));
        }

        let target = match (source_path, source_line, page) {
            (Some(_), Some(_), Some(_)) => {
                return Err(invalid(
                    "a request carries either a source position or a page, not both",
                ));
            }
            (Some(source_path), Some(line), None) => {
                let column = source_column.unwrap_or(1);
                if source_path.as_os_str().is_empty() {
                    return Err(invalid("source path cannot be empty"));
                }
                if line == 0 || column == 0 {
                    return Err(invalid(format!(
                        "source position is 1-based (line {line}, column {column})"
                    )));
                }
                SyncTarget::ForwardSearch {
                    source_path,
                    line,
                    column,
                }
            }
            (Some(_), None, _) | (None, Some(_), _) => {
                return Err(invalid("source path and source line must be given together"));
            }
            (None, None, Some(0)) => return Err(invalid("page numbers are 1-based")),
            (None, None, Some(page)) => SyncTarget::Page(page),
            (None, None, None) => SyncTarget::Open,
        };

        if source_column.is_some() && !matches!(target, SyncTarget::ForwardSearch { .. }) {
            return Err(invalid("a source column needs a source path and line"));
        }

        Ok(Self {
            document_path,
            target,
        })
    }

    pub fn document_path(&self) -> &Path {
        &self.document_path
    }

    pub fn target(&self) -> &SyncTarget {
        &self.target
    }
}

#[track_caller]
fn invalid(message: impl Into<String>) -> RequestError {
    RequestError::Invalid {
        message: message.into(),
        location: ErrorLocation::from(Location::caller()),
    }
}

//! Viewer command-line construction.
//!
//! - [`binding`]: the inverse-search command string registered with the viewer
//! - [`builder`]: the full argument list for a forward search, page jump or open

pub mod binding;
pub mod builder;

pub use binding::InverseSearchBinding;
pub use builder::build_viewer_args;

//! Inverse-search listener: the trust boundary of the bridge.
//!
//! The viewer runs the registered callback executable on every click; that
//! process connects here over loopback and presents what it was given.
//!
//! - Loopback-only WebSocket server (`127.0.0.1`)
//! - One binary protobuf frame per connection (see [`crate::proto`])
//! - Fail-closed validation: empty or mismatched secret, unknown window or
//!   wrong port are all dropped without a reply
//! - Accepted callbacks are queued to the editor's UI context, never
//!   executed on the listener's tasks; when the editor stops draining, new
//!   callbacks are dropped and refused rather than left waiting
//!
//! # Security
//!
//! Anything that can reach the port is untrusted input. Rejection reasons are
//! only ever logged at `debug`.

mod dispatch;
mod handle;
mod server;
pub(crate) mod validation;
mod windows;

pub use dispatch::{
    DispatchOutcome, NAVIGATION_QUEUE_DEPTH, NavigateToSource, NavigationDispatcher,
    NavigationReceiver, navigation_channel,
};
pub use handle::ListenerHandle;
pub use server::start_listener;
pub use windows::LiveWindows;

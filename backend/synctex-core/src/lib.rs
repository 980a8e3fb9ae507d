pub mod bridge;
pub mod callback;
pub mod command;
pub mod config;
pub mod error;
pub mod launch;
pub mod listener;
pub mod proto;
pub mod request;
pub mod session;

#[cfg(test)]
mod tests;

pub const INVERSE_SEARCH_BINARY: &str = "inverse-search";
pub const SECRET_ENV_VAR: &str = "SYNCTEX_BRIDGE_SECRET";
pub const LOOPBACK_HOSTNAME: &str = "127.0.0.1";
pub const LOOPBACK_WS_BASE_URL: &str = const_format::concatcp!("ws://", LOOPBACK_HOSTNAME);

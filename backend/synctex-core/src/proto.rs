//! Loopback wire messages between the callback process and the listener.
//!
//! One binary [`InverseSearchCallback`] frame per connection, client to
//! listener. An [`InverseSearchAck`] frame comes back only when the callback
//! was accepted; a rejected callback sees the connection close unanswered.

use std::fmt;

#[derive(Clone, PartialEq, ::prost::Message)]
#[prost(skip_debug)]
pub struct InverseSearchCallback {
    #[prost(uint64, tag = "1")]
    pub window_id: u64,
    #[prost(uint32, tag = "2")]
    pub port: u32,
    #[prost(string, tag = "3")]
    pub secret: String,
    #[prost(string, tag = "4")]
    pub source_path: String,
    #[prost(uint32, tag = "5")]
    pub source_line: u32,
}

impl fmt::Debug for InverseSearchCallback {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InverseSearchCallback")
            .field("window_id", &format_args!("{:#x}", self.window_id))
            .field("port", &self.port)
            .field("secret_len", &self.secret.len())
            .field("source_path", &self.source_path)
            .field("source_line", &self.source_line)
            .finish()
    }
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct InverseSearchAck {
    #[prost(bool, tag = "1")]
    pub accepted: bool,
}

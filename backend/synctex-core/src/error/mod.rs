pub mod binding;
pub mod config;
pub mod ipc;
pub mod launch;
pub mod request;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum CoreError {
    #[error(transparent)]
    Config(#[from] config::ConfigError),

    #[error(transparent)]
    Launch(#[from] launch::LaunchError),

    #[error(transparent)]
    Ipc(#[from] ipc::IpcError),

    #[error(transparent)]
    Request(#[from] request::RequestError),

    #[error(transparent)]
    Binding(#[from] binding::BindingError),
}

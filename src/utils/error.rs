use thiserror::Error;

use crate::config::ConfigError;
use crate::context::BootstrapError;
use crate::engine::SessionError;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Bootstrap(#[from] BootstrapError),

    #[error(transparent)]
    Session(#[from] SessionError),

    #[error("Unknown demo '{name}', expected one of: {available}")]
    UnknownDemo { name: String, available: String },

    #[error("Event loop error: {0}")]
    EventLoop(String),
}

pub type Result<T> = std::result::Result<T, AppError>;

use crate::permissions::Capability;
use qrblock_core::CoreError;
use thiserror::Error;

pub type PluginResult<T> = Result<T, PluginError>;

#[derive(Debug, Error)]
pub enum PluginError {
    #[error("missing capability {}", .0.name())]
    PermissionDenied(Capability),
    #[error("block not available on page type {0}")]
    NotApplicable(String),
    #[error(transparent)]
    Core(#[from] CoreError),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("serde error: {0}")]
    Serde(#[from] serde_json::Error),
}

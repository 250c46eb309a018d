use std::error::Error as StdError;
use std::path::PathBuf;
use thiserror::Error;

pub type CoreResult<T> = Result<T, CoreError>;

#[derive(Debug, Error)]
pub enum CoreError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("serde error: {0}")]
    Serde(#[from] serde_json::Error),
    #[error("config error: {0}")]
    Config(String),
    #[error("failed to create cache directory {path:?}")]
    DirectoryCreation {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("qr encode error: {0}")]
    Encode(String),
    #[error("png error: {0}")]
    Png(#[from] image::ImageError),
    #[error("invalid course id: {0}")]
    InvalidCourseId(i64),
    #[error("invalid url: {0}")]
    InvalidUrl(#[from] url::ParseError),
}

impl CoreError {
    /// True for failures of the encode step: the symbol could not be built or
    /// the PNG could not be produced.
    pub fn is_encode_failure(&self) -> bool {
        matches!(self, CoreError::Encode(_) | CoreError::Png(_))
    }
}

/// Formats an error with every `source()` on its own line.
pub fn format_error_chain(error: &(dyn StdError + 'static)) -> String {
    let mut chain = vec![error.to_string()];
    let mut source = error.source();

    while let Some(err) = source {
        chain.push(format!("  caused by: {}", err));
        source = err.source();
    }

    chain.join("\n")
}

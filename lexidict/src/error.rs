use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Convenience alias for `Result<T, DictError>`.
pub type Result<T> = std::result::Result<T, DictError>;

#[derive(Error, Debug)]
pub enum DictError {
    #[error("cannot open {}: {source}", path.display())]
    Open {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}

impl DictError {
    pub(crate) fn open(path: impl Into<PathBuf>, source: io::Error) -> Self {
        DictError::Open {
            path: path.into(),
            source,
        }
    }
}

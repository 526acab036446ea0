use std::path::{Path, PathBuf};

use thiserror::Error;

pub type GostResult<T> = Result<T, GostError>;

#[derive(Debug, Error)]
pub enum GostError {
    /// Bad caller input: empty password, unknown algorithm, missing suffix,
    /// destination already present.
    #[error("validation error: {0}")]
    Validation(String),

    /// Container or padding does not have the expected shape.
    #[error("format error: {0}")]
    Format(String),

    /// Tag mismatch: the container was modified or the password is wrong.
    #[error("integrity error: {0}")]
    Integrity(String),

    #[error("I/O error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Payload-free classification of a [`GostError`], for progress reporting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    Validation,
    Format,
    Integrity,
    Io,
}

impl GostError {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn format(msg: impl Into<String>) -> Self {
        Self::Format(msg.into())
    }

    pub fn integrity(msg: impl Into<String>) -> Self {
        Self::Integrity(msg.into())
    }

    pub fn io(path: impl AsRef<Path>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.as_ref().to_path_buf(),
            source,
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Validation(_) => ErrorKind::Validation,
            Self::Format(_) => ErrorKind::Format,
            Self::Integrity(_) => ErrorKind::Integrity,
            Self::Io { .. } => ErrorKind::Io,
        }
    }
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Validation => "ValidationError",
            Self::Format => "FormatError",
            Self::Integrity => "IntegrityError",
            Self::Io => "IOError",
        };
        f.write_str(s)
    }
}

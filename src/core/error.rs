//! core/error.rs
//! Error taxonomy for the library pipeline.
//!
//! - `Parse` is the only pipeline-fatal error (library export unreadable).
//! - `FieldAccess` and `Io` are per-file: callers log them and move on.

use std::path::PathBuf;

use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug)]
pub enum Error {
    /// The library export is missing, malformed, or not shaped like an export.
    #[error("failed to parse library {}: {reason}", path.display())]
    Parse { path: PathBuf, reason: String },

    /// A tag field doesn't exist on the file or rejects the supplied value.
    #[error("tag field {field} on {}: {reason}", path.display())]
    FieldAccess {
        path: PathBuf,
        field: String,
        reason: String,
    },

    /// File missing, unreadable or unwritable.
    #[error("I/O error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Settings file or values are invalid.
    #[error("configuration error: {0}")]
    Config(String),
}

impl Error {
    pub(crate) fn parse(path: impl Into<PathBuf>, reason: impl Into<String>) -> Self {
        Error::Parse {
            path: path.into(),
            reason: reason.into(),
        }
    }

    pub(crate) fn field(
        path: impl Into<PathBuf>,
        field: impl std::fmt::Display,
        reason: impl Into<String>,
    ) -> Self {
        Error::FieldAccess {
            path: path.into(),
            field: field.to_string(),
            reason: reason.into(),
        }
    }

    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Error::Io {
            path: path.into(),
            source,
        }
    }
}

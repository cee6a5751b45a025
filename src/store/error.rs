use std::path::PathBuf;

use thiserror::Error;

/// Errors raised by the posture store.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("cannot read store {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("store {path} is not valid JSON: {source}")]
    Corrupt {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("cannot write store {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("cannot encode record {zname}: {source}")]
    Encode {
        zname: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("no record stored for {zname}")]
    NotFound { zname: String },
}

impl StoreError {
    pub(crate) fn read(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Read {
            path: path.into(),
            source,
        }
    }

    pub(crate) fn write(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Write {
            path: path.into(),
            source,
        }
    }

    pub(crate) fn not_found(zname: impl Into<String>) -> Self {
        Self::NotFound {
            zname: zname.into(),
        }
    }
}

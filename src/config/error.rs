use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read config file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("line {line}: invalid value '{value}' for '{key}' (expected {expected})")]
    InvalidValue {
        line: usize,
        key: String,
        value: String,
        expected: &'static str,
    },
}

impl ConfigError {
    pub(crate) fn invalid(line: usize, key: &str, value: &str, expected: &'static str) -> Self {
        Self::InvalidValue {
            line,
            key: key.to_string(),
            value: value.to_string(),
            expected,
        }
    }
}

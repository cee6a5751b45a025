use thiserror::Error;

use crate::config::ConfigError;
use crate::dns::DnsError;
use crate::input::InputError;
use crate::store::StoreError;
use crate::sts::StsFetchError;

/// Failures that stop a run before any domain is assessed.
#[derive(Debug, Error)]
pub enum RunError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Input(#[from] InputError),
    #[error("resolver setup failed: {0}")]
    Resolver(#[from] DnsError),
    #[error("HTTP client setup failed: {0}")]
    Http(#[from] StsFetchError),
    #[error("store unavailable: {0}")]
    Store(#[from] StoreError),
}

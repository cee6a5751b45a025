use thiserror::Error;

/// Errors raised while fetching an MTA-STS policy document.
#[derive(Debug, Error)]
pub enum StsFetchError {
    #[error("HTTP client initialization failed: {source}")]
    ClientInit {
        #[source]
        source: reqwest::Error,
    },
    #[error("policy fetch from {url} failed: {source}")]
    Http {
        url: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("policy host {url} answered {status}")]
    Status {
        url: String,
        status: reqwest::StatusCode,
    },
}

impl StsFetchError {
    pub(crate) fn client_init(source: reqwest::Error) -> Self {
        Self::ClientInit { source }
    }

    pub(crate) fn http(url: impl Into<String>, source: reqwest::Error) -> Self {
        Self::Http {
            url: url.into(),
            source,
        }
    }
}

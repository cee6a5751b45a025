use std::future::Future;
use std::time::Duration;

use super::StsFetchError;

/// Default request timeout for the policy fetch.
pub const STS_FETCH_TIMEOUT: Duration = Duration::from_secs(10);

/// Fetch seam for the well-known MTA-STS policy document.
pub trait StsFetcher {
    fn fetch_policy(
        &self,
        domain: &str,
    ) -> impl Future<Output = Result<Vec<String>, StsFetchError>> + Send;
}

pub fn policy_url(domain: &str) -> String {
    format!(
        "https://mta-sts.{}/.well-known/mta-sts.txt",
        domain.trim_end_matches('.')
    )
}

/// HTTPS fetcher backed by `reqwest`. Redirects are not followed.
pub struct HttpStsFetcher {
    client: reqwest::Client,
}

impl HttpStsFetcher {
    pub fn new(timeout: Duration) -> Result<Self, StsFetchError> {
        let client = reqwest::Client::builder()
            .user_agent(concat!("mailposture/", env!("CARGO_PKG_VERSION")))
            .timeout(timeout)
            .redirect(reqwest::redirect::Policy::none())
            .build()
            .map_err(StsFetchError::client_init)?;
        Ok(Self { client })
    }
}

impl StsFetcher for HttpStsFetcher {
    async fn fetch_policy(&self, domain: &str) -> Result<Vec<String>, StsFetchError> {
        let url = policy_url(domain);
        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|err| StsFetchError::http(&url, err))?;

        let status = response.status();
        if !status.is_success() {
            return Err(StsFetchError::Status { url, status });
        }

        let body = response
            .text()
            .await
            .map_err(|err| StsFetchError::http(&url, err))?;
        Ok(split_lines(&body))
    }
}

pub(crate) fn split_lines(body: &str) -> Vec<String> {
    body.lines().map(str::to_string).collect()
}

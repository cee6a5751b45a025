//! MTA-STS policy document retrieval.
//!
//! Only consulted when `_mta-sts.<domain>` publishes a `v=STSv1;` record.
//! Fetch failures are reported to the caller, which records the document as
//! absent and carries on.

mod error;
mod fetch;
mod policy;

pub use error::StsFetchError;
pub use fetch::{HttpStsFetcher, STS_FETCH_TIMEOUT, StsFetcher, policy_url};
pub use policy::{StsMode, StsPolicyDocument, StsPolicyIssue};

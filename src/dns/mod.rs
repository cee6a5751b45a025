//! Policy resolution over DNS.
//!
//! [`DnsResolver`] walks the configured nameservers; [`resolve_policy`]
//! picks the TXT record carrying a marker such as `v=spf1` and reports it
//! as a [`PolicyLookup`].

mod error;
mod policy;
mod resolver;

pub use error::DnsError;
pub use policy::{NONE, PolicyKind, PolicyLookup, resolve_kind, resolve_policy};
pub use resolver::{Answer, DNS_TIMEOUT, DnsLookup, DnsResolver, fqdn, normalize_domain};

#[cfg(test)]
pub(crate) mod tests;

use futures::future::join_all;
use trust_dns_resolver::proto::rr::RecordType;

use super::MxRecord;
use crate::dns::{Answer, DnsLookup, fqdn};

/// Owner name used for the TLSA query of an exchange.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum DaneQueryName {
    /// The exchange hostname itself.
    #[default]
    Bare,
    /// `_25._tcp.<exchange>`, the name TLSA records are normally published at.
    Port25,
}

impl DaneQueryName {
    pub fn owner(self, exchange: &str) -> String {
        match self {
            Self::Bare => fqdn("", exchange),
            Self::Port25 => fqdn("_25._tcp", exchange),
        }
    }
}

/// True when at least one TLSA record is published for `exchange`.
///
/// Lookup failures count as "no records".
pub async fn has_dane_records<L>(lookup: &L, exchange: &str, name: DaneQueryName) -> bool
where
    L: DnsLookup,
{
    let owner = name.owner(exchange);
    match lookup.query(&owner, RecordType::TLSA, false).await {
        Ok(answers) => answers.iter().any(|answer| matches!(answer, Answer::Tlsa)),
        Err(err) => {
            tracing::debug!(%owner, error = %err, "TLSA lookup failed");
            false
        }
    }
}

/// True when any of the exchanges has TLSA records.
pub async fn any_dane<L>(lookup: &L, records: &[MxRecord], name: DaneQueryName) -> bool
where
    L: DnsLookup,
{
    let checks = records
        .iter()
        .map(|record| has_dane_records(lookup, &record.exchange, name));
    join_all(checks).await.into_iter().any(|present| present)
}

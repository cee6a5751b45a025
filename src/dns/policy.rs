use std::fmt;

use serde::Serialize;
use trust_dns_resolver::proto::rr::RecordType;

use super::resolver::{Answer, DnsLookup, fqdn};

/// Legacy stored value for "no policy".
pub const NONE: &str = "none";

/// The DNS-published policies checked for every domain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PolicyKind {
    Spf,
    Dmarc,
    MtaSts,
    TlsRpt,
}

impl PolicyKind {
    pub const ALL: [PolicyKind; 4] = [Self::Spf, Self::Dmarc, Self::MtaSts, Self::TlsRpt];

    /// Owner label prepended to the domain (empty for the apex).
    pub fn label(self) -> &'static str {
        match self {
            Self::Spf => "",
            Self::Dmarc => "_dmarc",
            Self::MtaSts => "_mta-sts",
            Self::TlsRpt => "_smtp-tlsrpt",
        }
    }

    /// Case-sensitive substring identifying the record among the TXT set.
    pub fn marker(self) -> &'static str {
        match self {
            Self::Spf => "v=spf1",
            Self::Dmarc => "v=DMARC1;",
            Self::MtaSts => "v=STSv1;",
            Self::TlsRpt => "v=TLSRPTv1;",
        }
    }

    pub fn query_name(self, domain: &str) -> String {
        fqdn(self.label(), domain)
    }
}

impl fmt::Display for PolicyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Spf => f.write_str("spf"),
            Self::Dmarc => f.write_str("dmarc"),
            Self::MtaSts => f.write_str("mta-sts"),
            Self::TlsRpt => f.write_str("tls-rpt"),
        }
    }
}

/// Outcome of a policy lookup.
///
/// `Absent` and `QueryFailed` both persist as `"none"`, but stay distinct
/// here so callers can tell a missing policy from a DNS failure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PolicyLookup {
    Absent,
    Present(String),
    QueryFailed(String),
}

impl PolicyLookup {
    pub fn is_present(&self) -> bool {
        matches!(self, Self::Present(_))
    }

    pub fn record(&self) -> Option<&str> {
        match self {
            Self::Present(record) => Some(record.as_str()),
            Self::Absent | Self::QueryFailed(_) => None,
        }
    }

    pub fn failure(&self) -> Option<&str> {
        match self {
            Self::QueryFailed(reason) => Some(reason.as_str()),
            Self::Absent | Self::Present(_) => None,
        }
    }

    /// Value written to the persisted record.
    pub fn as_stored(&self) -> String {
        self.record().unwrap_or(NONE).to_string()
    }
}

/// Fetch the TXT set at `name` and return the first record containing `marker`.
pub async fn resolve_policy<L>(lookup: &L, name: &str, marker: &str, dnssec: bool) -> PolicyLookup
where
    L: DnsLookup,
{
    let answers = match lookup.query(name, RecordType::TXT, dnssec).await {
        Ok(answers) => answers,
        Err(err) => {
            tracing::warn!(%name, error = %err, "TXT lookup failed");
            return PolicyLookup::QueryFailed(err.to_string());
        }
    };

    answers
        .into_iter()
        .find_map(|answer| match answer {
            Answer::Txt(text) if text.contains(marker) => Some(text),
            _ => None,
        })
        .map(PolicyLookup::Present)
        .unwrap_or(PolicyLookup::Absent)
}

/// Resolve one of the well-known policy kinds for `domain`.
pub async fn resolve_kind<L>(lookup: &L, kind: PolicyKind, domain: &str, dnssec: bool) -> PolicyLookup
where
    L: DnsLookup,
{
    let name = kind.query_name(domain);
    let outcome = resolve_policy(lookup, &name, kind.marker(), dnssec).await;
    tracing::debug!(%kind, %name, present = outcome.is_present(), "policy resolved");
    outcome
}

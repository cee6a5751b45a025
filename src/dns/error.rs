use thiserror::Error;
use trust_dns_resolver::proto::op::ResponseCode;

/// Errors raised while querying DNS for policy, MX or TLSA records.
#[derive(Debug, Error)]
pub enum DnsError {
    #[error("domain is empty")]
    EmptyDomain,
    #[error("domain IDNA conversion failed")]
    IdnaConversion {
        #[source]
        source: idna::Errors,
    },
    #[error("resolver initialization failed: {source}")]
    ResolverInit {
        #[source]
        source: std::io::Error,
    },
    #[error("no nameserver configured")]
    NoNameServers,
    #[error("no nameserver answered the query for {name}")]
    NoAnswer { name: String },
    #[error("nameserver answered {code} for {name}")]
    ServerFailure { name: String, code: ResponseCode },
    #[error("lookup failed for {name}: {source}")]
    Query {
        name: String,
        #[source]
        source: trust_dns_resolver::error::ResolveError,
    },
}

impl DnsError {
    pub(crate) fn idna(source: idna::Errors) -> Self {
        Self::IdnaConversion { source }
    }

    pub(crate) fn resolver_init(source: std::io::Error) -> Self {
        Self::ResolverInit { source }
    }

    pub(crate) fn no_answer(name: impl Into<String>) -> Self {
        Self::NoAnswer { name: name.into() }
    }

    pub(crate) fn server_failure(name: impl Into<String>, code: ResponseCode) -> Self {
        Self::ServerFailure {
            name: name.into(),
            code,
        }
    }

    pub(crate) fn query(
        name: impl Into<String>,
        source: trust_dns_resolver::error::ResolveError,
    ) -> Self {
        Self::Query {
            name: name.into(),
            source,
        }
    }
}

use chrono::Utc;

use super::PostureReport;
use crate::dns::{DnsLookup, PolicyKind, resolve_kind};
use crate::mx::{DaneQueryName, MxList, MxOrder, any_dane, list_mx};
use crate::probe::{CapabilityCache, ProbeRunner};
use crate::sts::StsFetcher;

/// Knobs of a single assessment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssessOptions {
    /// Run the live capability probe against the primary exchange.
    pub full_test: bool,
    pub dnssec: bool,
    pub mx_order: MxOrder,
    pub dane_name: DaneQueryName,
}

impl Default for AssessOptions {
    fn default() -> Self {
        Self {
            full_test: false,
            dnssec: false,
            mx_order: MxOrder::Answer,
            dane_name: DaneQueryName::Bare,
        }
    }
}

/// Builds one [`PostureReport`] per domain from the resolver, the MTA-STS
/// fetcher and the capability probe. Owns the capability cache.
pub struct PostureAssembler<L, F, P> {
    resolver: L,
    fetcher: F,
    probe: P,
    cache: CapabilityCache,
    options: AssessOptions,
}

impl<L, F, P> PostureAssembler<L, F, P>
where
    L: DnsLookup,
    F: StsFetcher,
    P: ProbeRunner,
{
    pub fn new(resolver: L, fetcher: F, probe: P, cache: CapabilityCache) -> Self {
        Self {
            resolver,
            fetcher,
            probe,
            cache,
            options: AssessOptions::default(),
        }
    }

    pub fn with_options(mut self, options: AssessOptions) -> Self {
        self.options = options;
        self
    }

    pub fn options(&self) -> &AssessOptions {
        &self.options
    }

    pub fn cache(&self) -> &CapabilityCache {
        &self.cache
    }

    pub fn resolver(&self) -> &L {
        &self.resolver
    }

    pub fn fetcher(&self) -> &F {
        &self.fetcher
    }

    pub fn probe(&self) -> &P {
        &self.probe
    }

    /// Assess `domain`, which must already be normalized and fully qualified.
    pub async fn assess(&self, domain: &str, agency: &str) -> PostureReport {
        let observed_at = Utc::now();
        let dnssec = self.options.dnssec;

        let (spf, dmarc, mta_sts, tls_rpt) = futures::join!(
            resolve_kind(&self.resolver, PolicyKind::Spf, domain, dnssec),
            resolve_kind(&self.resolver, PolicyKind::Dmarc, domain, dnssec),
            resolve_kind(&self.resolver, PolicyKind::MtaSts, domain, dnssec),
            resolve_kind(&self.resolver, PolicyKind::TlsRpt, domain, dnssec),
        );

        let (sts_policy, sts_fetch_error) = if mta_sts.is_present() {
            match self.fetcher.fetch_policy(domain).await {
                Ok(lines) => (Some(lines), None),
                Err(err) => {
                    tracing::warn!(%domain, error = %err, "MTA-STS policy unavailable");
                    (None, Some(err.to_string()))
                }
            }
        } else {
            (None, None)
        };

        let mx = list_mx(&self.resolver, domain).await;

        let dane = match &mx {
            MxList::Records(records) => {
                any_dane(&self.resolver, records, self.options.dane_name).await
            }
            MxList::NoRecords | MxList::QueryFailed(_) => false,
        };

        let capabilities = match mx.primary(self.options.mx_order) {
            Some(primary) if self.options.full_test => Some(
                self.cache
                    .get_or_probe(&primary.exchange, &self.probe)
                    .await,
            ),
            _ => None,
        };

        let report = PostureReport {
            domain: domain.to_string(),
            agency: agency.to_string(),
            observed_at,
            spf,
            dmarc,
            mta_sts,
            tls_rpt,
            sts_policy,
            sts_fetch_error,
            mx,
            dane,
            capabilities,
        };
        tracing::info!(
            %domain,
            mx = report.mx.records().len(),
            dane = report.dane,
            failures = report.failures().len(),
            "domain assessed"
        );
        report
    }
}

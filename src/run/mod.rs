//! Batch runs: read the domain list, assess each domain under the rate
//! limit, persist the records.

mod error;
mod limiter;

pub use error::RunError;
pub use limiter::RateLimiter;

use std::sync::Arc;
use std::time::Instant;

use futures::StreamExt;
use serde::Serialize;

use crate::config::MonitorConfig;
use crate::dns::{DnsLookup, DnsResolver, normalize_domain};
use crate::input::{DomainEntry, read_domain_list};
use crate::posture::{PostureAssembler, PostureRecord};
use crate::probe::{CapabilityCache, CommandProbe, ProbeRunner};
use crate::store::{JsonFileStore, PostureStore, StoreError};
use crate::sts::{HttpStsFetcher, StsFetcher};

/// The assembler wired to the network collaborators.
pub type LiveAssembler = PostureAssembler<DnsResolver, HttpStsFetcher, CommandProbe>;

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct RunSummary {
    pub total: usize,
    pub inserted: usize,
    pub updated: usize,
    /// Entries whose domain name could not be normalized.
    pub skipped: usize,
    pub store_failures: usize,
    pub elapsed_seconds: f64,
}

impl RunSummary {
    pub fn is_clean(&self) -> bool {
        self.store_failures == 0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Outcome {
    Inserted,
    Updated,
    Skipped,
    StoreFailed,
}

/// Build the live assembler (resolver, HTTP fetcher, probe command, cache)
/// from `config`.
pub fn build_assembler(config: &MonitorConfig) -> Result<LiveAssembler, RunError> {
    let resolver = if config.nameservers.is_empty() {
        DnsResolver::from_system_conf(config.dns_timeout)?
    } else {
        DnsResolver::from_ips(&config.nameservers, config.dns_timeout)?
    };
    tracing::debug!(servers = ?resolver.server_addrs(), "resolver ready");

    let fetcher = HttpStsFetcher::new(config.sts_timeout)?;
    let probe = CommandProbe::new(&config.probe)
        .with_args(config.probe_args.iter().cloned())
        .with_timeout(config.probe_timeout);
    let cache = CapabilityCache::new().cache_timeouts(config.cache_timeouts);

    Ok(PostureAssembler::new(resolver, fetcher, probe, cache).with_options(config.assess_options()))
}

/// Run the whole monitor described by `config`.
pub async fn run_monitor(config: &MonitorConfig) -> Result<RunSummary, RunError> {
    let entries = read_domain_list(&config.input)?;
    tracing::info!(
        input = %config.input.display(),
        domains = entries.len(),
        full_test = config.full_test,
        "domain list loaded"
    );

    let assembler = build_assembler(config)?;
    let store = Arc::new(JsonFileStore::open(&config.store)?);
    let limiter = RateLimiter::start(config.rate, config.rate_interval, 1);

    let summary = run_batch(
        &assembler,
        store,
        &entries,
        limiter.as_ref(),
        config.concurrency,
    )
    .await;
    if let Some(limiter) = &limiter {
        limiter.shutdown();
    }
    Ok(summary)
}

/// Assess and persist every entry, at most `concurrency` at a time.
///
/// Store failures are logged and counted; they never stop the batch. Store
/// calls run on the blocking pool.
pub async fn run_batch<L, F, P, S>(
    assembler: &PostureAssembler<L, F, P>,
    store: Arc<S>,
    entries: &[DomainEntry],
    limiter: Option<&RateLimiter>,
    concurrency: usize,
) -> RunSummary
where
    L: DnsLookup,
    F: StsFetcher,
    P: ProbeRunner,
    S: PostureStore + Send + Sync + 'static,
{
    let started = Instant::now();
    let mut summary = futures::stream::iter(entries)
        .map(move |entry| {
            let store = Arc::clone(&store);
            async move {
                if let Some(limiter) = limiter {
                    limiter.acquire().await;
                }
                assess_and_store(assembler, store, entry).await
            }
        })
        .buffer_unordered(concurrency.max(1))
        .fold(RunSummary::default(), |mut summary, outcome| async move {
            summary.total += 1;
            match outcome {
                Outcome::Inserted => summary.inserted += 1,
                Outcome::Updated => summary.updated += 1,
                Outcome::Skipped => summary.skipped += 1,
                Outcome::StoreFailed => summary.store_failures += 1,
            }
            summary
        })
        .await;
    summary.elapsed_seconds = started.elapsed().as_secs_f64();

    tracing::info!(
        total = summary.total,
        inserted = summary.inserted,
        updated = summary.updated,
        skipped = summary.skipped,
        store_failures = summary.store_failures,
        elapsed = summary.elapsed_seconds,
        "run finished"
    );
    summary
}

async fn assess_and_store<L, F, P, S>(
    assembler: &PostureAssembler<L, F, P>,
    store: Arc<S>,
    entry: &DomainEntry,
) -> Outcome
where
    L: DnsLookup,
    F: StsFetcher,
    P: ProbeRunner,
    S: PostureStore + Send + Sync + 'static,
{
    let domain = match normalize_domain(&entry.domain) {
        Ok(domain) => domain,
        Err(err) => {
            tracing::warn!(domain = %entry.domain, error = %err, "skipping unusable domain");
            return Outcome::Skipped;
        }
    };

    let record = assembler.assess(&domain, &entry.agency).await.to_record();
    match tokio::task::spawn_blocking(move || persist(store.as_ref(), record)).await {
        Ok(Ok(outcome)) => outcome,
        Ok(Err(err)) => {
            tracing::warn!(%domain, error = %err, "record not persisted");
            Outcome::StoreFailed
        }
        Err(err) => {
            tracing::warn!(%domain, error = %err, "store task failed");
            Outcome::StoreFailed
        }
    }
}

fn persist<S: PostureStore>(store: &S, mut record: PostureRecord) -> Result<Outcome, StoreError> {
    match store.find_by_domain_name(&record.zname)? {
        Some(previous) => {
            record.merge_previous(&previous);
            store.update(&previous.zname, &record)?;
            Ok(Outcome::Updated)
        }
        None => {
            store.upsert(&record)?;
            Ok(Outcome::Inserted)
        }
    }
}

#[cfg(test)]
mod tests;

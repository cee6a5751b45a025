use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};

use tokio::sync::OnceCell;

use super::{Capabilities, ProbeOutcome, ProbeRunner, organizational_domain};

/// Capabilities per organizational domain, filled on first use and kept for
/// the life of the run.
///
/// Each key owns a [`OnceCell`], so concurrent lookups for exchanges of the
/// same operator wait for a single probe instead of starting their own.
pub struct CapabilityCache {
    entries: Mutex<HashMap<String, Arc<OnceCell<Capabilities>>>>,
    cache_timeouts: bool,
}

impl Default for CapabilityCache {
    fn default() -> Self {
        Self::new()
    }
}

impl CapabilityCache {
    pub fn new() -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
            cache_timeouts: true,
        }
    }

    /// Whether a timed-out probe is remembered (default) or retried by the
    /// next exchange of the same operator.
    pub fn cache_timeouts(mut self, value: bool) -> Self {
        self.cache_timeouts = value;
        self
    }

    /// Cached capabilities for `host`'s operator, probing on a miss.
    pub async fn get_or_probe<P>(&self, host: &str, runner: &P) -> Capabilities
    where
        P: ProbeRunner,
    {
        let key = organizational_domain(host);
        let cell = self.cell(key);

        if let Some(hit) = cell.get() {
            tracing::debug!(%host, %key, "capability cache hit");
            return hit.clone();
        }

        let filled = cell
            .get_or_try_init(|| async {
                tracing::info!(%host, %key, "probing mail exchange");
                let run = runner.run(host).await;
                match run.outcome {
                    ProbeOutcome::TimedOut if !self.cache_timeouts => Err(run.capabilities),
                    _ => Ok(run.capabilities),
                }
            })
            .await;

        match filled {
            Ok(capabilities) => capabilities.clone(),
            Err(defaults) => defaults,
        }
    }

    /// Cached entry for `host`'s operator without probing.
    pub fn get(&self, host: &str) -> Option<Capabilities> {
        let entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        entries
            .get(organizational_domain(host))
            .and_then(|cell| cell.get().cloned())
    }

    pub fn len(&self) -> usize {
        let entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        entries.values().filter(|cell| cell.initialized()).count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn cell(&self, key: &str) -> Arc<OnceCell<Capabilities>> {
        let mut entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        Arc::clone(entries.entry(key.to_string()).or_default())
    }
}

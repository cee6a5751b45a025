use std::sync::{Arc, Mutex};
use std::thread::{self, ThreadId};

use trust_dns_resolver::proto::rr::RecordType;

use super::{RunSummary, run_batch};
use crate::dns::tests::StubResolver;
use crate::input::DomainEntry;
use crate::posture::tests::StubFetcher;
use crate::posture::{AssessOptions, PostureAssembler, PostureRecord};
use crate::probe::CapabilityCache;
use crate::probe::tests::StubProbe;
use crate::store::{MemoryStore, PostureStore, StoreError};

fn entry(domain: &str, agency: &str) -> DomainEntry {
    DomainEntry {
        domain: domain.to_string(),
        agency: agency.to_string(),
    }
}

fn assembler(
    resolver: StubResolver,
    probe: StubProbe,
    full_test: bool,
) -> PostureAssembler<StubResolver, StubFetcher, StubProbe> {
    PostureAssembler::new(resolver, StubFetcher::new(), probe, CapabilityCache::new())
        .with_options(AssessOptions {
            full_test,
            ..AssessOptions::default()
        })
}

/// Store whose writes always fail.
struct ReadOnlyStore;

impl PostureStore for ReadOnlyStore {
    fn find_by_domain_name(&self, _zname: &str) -> Result<Option<PostureRecord>, StoreError> {
        Ok(None)
    }

    fn upsert(&self, record: &PostureRecord) -> Result<(), StoreError> {
        Err(StoreError::write(
            std::path::Path::new("/read-only"),
            std::io::Error::new(std::io::ErrorKind::PermissionDenied, record.zname.clone()),
        ))
    }

    fn update(&self, zname: &str, _record: &PostureRecord) -> Result<(), StoreError> {
        Err(StoreError::not_found(zname))
    }
}

/// Memory store noting the thread of every call.
#[derive(Default)]
struct ThreadTrackingStore {
    inner: MemoryStore,
    threads: Mutex<Vec<ThreadId>>,
}

impl ThreadTrackingStore {
    fn note(&self) {
        self.threads.lock().expect("thread log").push(thread::current().id());
    }

    fn threads(&self) -> Vec<ThreadId> {
        self.threads.lock().expect("thread log").clone()
    }
}

impl PostureStore for ThreadTrackingStore {
    fn find_by_domain_name(&self, zname: &str) -> Result<Option<PostureRecord>, StoreError> {
        self.note();
        self.inner.find_by_domain_name(zname)
    }

    fn upsert(&self, record: &PostureRecord) -> Result<(), StoreError> {
        self.note();
        self.inner.upsert(record)
    }

    fn update(&self, zname: &str, record: &PostureRecord) -> Result<(), StoreError> {
        self.note();
        self.inner.update(zname, record)
    }
}

#[tokio::test]
async fn new_domains_are_inserted_and_known_domains_updated() {
    let resolver = StubResolver::new()
        .with_txt("example.gov", ["v=spf1 -all"])
        .with_mx("example.gov", &[(10, "mail.example.gov.")]);
    let assembler = assembler(resolver, StubProbe::new(), false);
    let store = Arc::new(MemoryStore::new());

    let mut known = PostureRecord {
        zname: "known.gov.".to_string(),
        agency: "Old Agency".to_string(),
        dkimselect: "selector1".to_string(),
        dkim: "v=DKIM1; p=abc".to_string(),
        ..PostureRecord::default()
    };
    known.mx = vec!["none".to_string()];
    store.upsert(&known).expect("seed");
    let seeded_id = store.find_by_domain_name("known.gov.").unwrap().unwrap().id;

    let entries = [entry("Example.GOV", "GSA"), entry("known.gov", "")];
    let summary = run_batch(&assembler, Arc::clone(&store), &entries, None, 1).await;

    assert_eq!(summary.total, 2);
    assert_eq!(summary.inserted, 1);
    assert_eq!(summary.updated, 1);
    assert!(summary.is_clean());

    let example = store.find_by_domain_name("example.gov.").unwrap().expect("inserted");
    assert_eq!(example.spf, "v=spf1 -all");
    assert_eq!(example.mx, vec!["mail.example.gov"]);
    assert_eq!(example.agency, "GSA");

    let updated = store.find_by_domain_name("known.gov.").unwrap().expect("updated");
    assert_eq!(updated.id, seeded_id);
    assert_eq!(updated.dkimselect, "selector1");
    assert_eq!(updated.agency, "Old Agency");
    assert_eq!(updated.spf, "none");
}

#[tokio::test]
async fn store_failures_are_counted_and_the_run_continues() {
    let assembler = assembler(StubResolver::new(), StubProbe::new(), false);
    let entries = [entry("a.gov", ""), entry("b.gov", ""), entry("c.gov", "")];

    let summary = run_batch(&assembler, Arc::new(ReadOnlyStore), &entries, None, 2).await;

    assert_eq!(summary.total, 3);
    assert_eq!(summary.store_failures, 3);
    assert!(!summary.is_clean());
}

#[tokio::test]
async fn unusable_domains_are_skipped() {
    let resolver = StubResolver::new();
    let assembler = assembler(resolver, StubProbe::new(), false);
    let store = Arc::new(MemoryStore::new());

    let summary = run_batch(&assembler, Arc::clone(&store), &[entry("   ", "x")], None, 1).await;

    assert_eq!(
        summary,
        RunSummary {
            total: 1,
            skipped: 1,
            elapsed_seconds: summary.elapsed_seconds,
            ..RunSummary::default()
        }
    );
    assert!(store.is_empty());
    assert!(assembler.resolver().queried(RecordType::TXT).is_empty());
}

#[tokio::test]
async fn shared_provider_is_probed_once_across_the_batch() {
    let resolver = StubResolver::new()
        .with_mx("a.gov", &[(10, "a-gov.mail.protection.outlook.com.")])
        .with_mx("b.gov", &[(10, "b-gov.mail.protection.outlook.com.")])
        .with_mx("c.gov", &[(10, "c-gov.mail.protection.outlook.com.")]);
    let probe = StubProbe::new()
        .with_output("a-gov.mail.protection.outlook.com", "x,1,0,0,*.outlook.com")
        .with_output("b-gov.mail.protection.outlook.com", "x,1,0,0,*.outlook.com")
        .with_output("c-gov.mail.protection.outlook.com", "x,1,0,0,*.outlook.com");
    let assembler = assembler(resolver, probe, true);
    let store = Arc::new(MemoryStore::new());

    let entries = [entry("a.gov", ""), entry("b.gov", ""), entry("c.gov", "")];
    let summary = run_batch(&assembler, Arc::clone(&store), &entries, None, 3).await;

    assert_eq!(summary.inserted, 3);
    assert_eq!(assembler.probe().launches(), 1);
    for zname in ["a.gov.", "b.gov.", "c.gov."] {
        let record = store.find_by_domain_name(zname).unwrap().expect("stored");
        assert!(record.starttls, "{zname} shares the cached capabilities");
        assert_eq!(record.cert, "*.outlook.com");
    }
}

#[tokio::test]
async fn rate_limiter_gates_each_domain() {
    let limiter = super::RateLimiter::start(1000, std::time::Duration::from_secs(1), 1)
        .expect("enabled");
    let assembler = assembler(StubResolver::new(), StubProbe::new(), false);
    let store = Arc::new(MemoryStore::new());

    let entries = [entry("a.gov", ""), entry("b.gov", "")];
    let summary = run_batch(&assembler, Arc::clone(&store), &entries, Some(&limiter), 1).await;

    assert_eq!(summary.inserted, 2);
}

#[tokio::test]
async fn store_calls_run_off_the_async_thread() {
    let assembler = assembler(StubResolver::new(), StubProbe::new(), false);
    let store = Arc::new(ThreadTrackingStore::default());
    let async_thread = thread::current().id();

    let entries = [entry("a.gov", ""), entry("b.gov", "")];
    let summary = run_batch(&assembler, Arc::clone(&store), &entries, None, 2).await;

    assert_eq!(summary.inserted, 2);
    let threads = store.threads();
    assert_eq!(threads.len(), 4, "one lookup and one insert per domain");
    assert!(threads.iter().all(|id| *id != async_thread));
}

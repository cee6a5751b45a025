use std::collections::HashMap;
use std::sync::Mutex;

use trust_dns_resolver::proto::rr::RecordType;

use super::{
    Answer, DnsError, DnsLookup, PolicyKind, PolicyLookup, fqdn, normalize_domain, resolve_kind,
    resolve_policy,
};

enum Canned {
    Answers(Vec<Answer>),
    Unreachable,
}

/// In-memory zone data keyed by (name, type); unknown names answer empty.
pub(crate) struct StubResolver {
    zone: HashMap<(String, RecordType), Canned>,
    queries: Mutex<Vec<(String, RecordType)>>,
}

impl StubResolver {
    pub(crate) fn new() -> Self {
        Self {
            zone: HashMap::new(),
            queries: Mutex::new(Vec::new()),
        }
    }

    pub(crate) fn with_txt<I, S>(mut self, name: &str, records: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let answers = records.into_iter().map(|r| Answer::Txt(r.into())).collect();
        self.zone
            .insert((normalize_name(name), RecordType::TXT), Canned::Answers(answers));
        self
    }

    pub(crate) fn with_mx(mut self, name: &str, records: &[(u16, &str)]) -> Self {
        let answers = records
            .iter()
            .map(|(preference, exchange)| Answer::Mx {
                preference: *preference,
                exchange: exchange.to_string(),
            })
            .collect();
        self.zone
            .insert((normalize_name(name), RecordType::MX), Canned::Answers(answers));
        self
    }

    pub(crate) fn with_tlsa(mut self, name: &str, count: usize) -> Self {
        let answers = (0..count).map(|_| Answer::Tlsa).collect();
        self.zone.insert(
            (normalize_name(name), RecordType::TLSA),
            Canned::Answers(answers),
        );
        self
    }

    pub(crate) fn unreachable(mut self, name: &str, record_type: RecordType) -> Self {
        self.zone
            .insert((normalize_name(name), record_type), Canned::Unreachable);
        self
    }

    pub(crate) fn queried(&self, record_type: RecordType) -> Vec<String> {
        self.queries
            .lock()
            .expect("query log")
            .iter()
            .filter(|(_, kind)| *kind == record_type)
            .map(|(name, _)| name.clone())
            .collect()
    }
}

impl DnsLookup for StubResolver {
    async fn query(
        &self,
        name: &str,
        record_type: RecordType,
        _dnssec: bool,
    ) -> Result<Vec<Answer>, DnsError> {
        let key = (normalize_name(name), record_type);
        self.queries.lock().expect("query log").push(key.clone());
        match self.zone.get(&key) {
            Some(Canned::Answers(answers)) => Ok(answers.clone()),
            Some(Canned::Unreachable) => Err(DnsError::no_answer(name)),
            None => Ok(Vec::new()),
        }
    }
}

fn normalize_name(name: &str) -> String {
    name.trim().trim_end_matches('.').to_ascii_lowercase()
}

#[tokio::test]
async fn policy_absent_when_no_record_matches_marker() {
    let stub = StubResolver::new().with_txt(
        "example.gov",
        ["google-site-verification=abc", "MS=ms12345"],
    );
    let outcome = resolve_policy(&stub, "example.gov.", "v=spf1", false).await;
    assert_eq!(outcome, PolicyLookup::Absent);
    assert_eq!(outcome.as_stored(), "none");
}

#[tokio::test]
async fn policy_returns_full_matching_record() {
    let record = "v=spf1 include:_spf.example.gov ip4:192.0.2.0/24 -all";
    let stub = StubResolver::new().with_txt("example.gov", ["unrelated", record]);
    let outcome = resolve_policy(&stub, "example.gov.", "v=spf1", false).await;
    assert_eq!(outcome, PolicyLookup::Present(record.to_string()));
    assert_eq!(outcome.as_stored(), record);
}

#[tokio::test]
async fn policy_marker_is_case_sensitive() {
    let stub = StubResolver::new().with_txt("_dmarc.example.gov", ["V=DMARC1; p=reject"]);
    let outcome = resolve_kind(&stub, PolicyKind::Dmarc, "example.gov.", false).await;
    assert_eq!(outcome, PolicyLookup::Absent);
}

#[tokio::test]
async fn policy_query_failure_is_not_absent() {
    let stub = StubResolver::new().unreachable("_mta-sts.example.gov", RecordType::TXT);
    let outcome = resolve_kind(&stub, PolicyKind::MtaSts, "example.gov.", false).await;
    assert!(matches!(outcome, PolicyLookup::QueryFailed(_)));
    assert!(outcome.failure().is_some());
    assert_eq!(outcome.as_stored(), "none");
}

#[tokio::test]
async fn policy_kinds_query_their_owner_names() {
    let stub = StubResolver::new();
    for kind in PolicyKind::ALL {
        resolve_kind(&stub, kind, "example.gov.", false).await;
    }
    assert_eq!(
        stub.queried(RecordType::TXT),
        vec![
            "example.gov",
            "_dmarc.example.gov",
            "_mta-sts.example.gov",
            "_smtp-tlsrpt.example.gov",
        ]
    );
}

#[test]
fn normalize_domain_rejects_empty() {
    let err = normalize_domain("  ").expect_err("empty domain should fail");
    assert!(matches!(err, DnsError::EmptyDomain));
}

#[test]
fn normalize_domain_qualifies_and_lowercases() {
    assert_eq!(normalize_domain("Example.GOV").unwrap(), "example.gov.");
    assert_eq!(normalize_domain("example.gov.").unwrap(), "example.gov.");
}

#[test]
fn fqdn_prefixes_label() {
    assert_eq!(fqdn("_dmarc", "example.gov."), "_dmarc.example.gov.");
    assert_eq!(fqdn("", "example.gov"), "example.gov.");
}

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::dns::{NONE, PolicyKind, PolicyLookup};
use crate::mx::MxList;
use crate::probe::Capabilities;
use crate::sts::StsPolicyDocument;

/// Persisted posture of one domain, keyed by `zname`.
///
/// Field names follow the stored document layout. `id` belongs to the
/// store and is never written back on update.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PostureRecord {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub zname: String,
    #[serde(default)]
    pub agency: String,
    #[serde(default)]
    pub time: i64,
    #[serde(default)]
    pub spf: String,
    #[serde(default)]
    pub dkimselect: String,
    #[serde(default)]
    pub dkim: String,
    #[serde(default)]
    pub dmarc: String,
    #[serde(default)]
    pub dane: bool,
    #[serde(default)]
    pub mx: Vec<String>,
    #[serde(default)]
    pub smtpsts: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stspolicy: Option<Vec<String>>,
    #[serde(default)]
    pub stsmode: String,
    #[serde(default)]
    pub tlsreport: String,
    #[serde(default)]
    pub starttls: bool,
    #[serde(default)]
    pub requiretls: bool,
    #[serde(default)]
    pub blocktls: bool,
    #[serde(default)]
    pub cert: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub failures: Vec<String>,
}

impl PostureRecord {
    /// Carry over what this run does not compute from an earlier record.
    pub fn merge_previous(&mut self, previous: &PostureRecord) {
        self.id = None;
        self.dkimselect.clone_from(&previous.dkimselect);
        self.dkim.clone_from(&previous.dkim);
        if self.agency.is_empty() {
            self.agency.clone_from(&previous.agency);
        }
    }
}

/// Assessment of one domain with failures kept distinct from absence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PostureReport {
    /// Fully-qualified domain name (trailing dot).
    pub domain: String,
    pub agency: String,
    pub observed_at: DateTime<Utc>,
    pub spf: PolicyLookup,
    pub dmarc: PolicyLookup,
    pub mta_sts: PolicyLookup,
    pub tls_rpt: PolicyLookup,
    /// Lines of the MTA-STS document; `None` when not advertised or not fetched.
    pub sts_policy: Option<Vec<String>>,
    pub sts_fetch_error: Option<String>,
    pub mx: MxList,
    pub dane: bool,
    /// Present only when the capability probe ran.
    pub capabilities: Option<Capabilities>,
}

impl PostureReport {
    pub fn policy(&self, kind: PolicyKind) -> &PolicyLookup {
        match kind {
            PolicyKind::Spf => &self.spf,
            PolicyKind::Dmarc => &self.dmarc,
            PolicyKind::MtaSts => &self.mta_sts,
            PolicyKind::TlsRpt => &self.tls_rpt,
        }
    }

    pub fn sts_document(&self) -> Option<StsPolicyDocument> {
        let lines = self.sts_policy.as_ref()?;
        StsPolicyDocument::parse(lines).ok()
    }

    /// Human-readable list of the lookups that failed.
    pub fn failures(&self) -> Vec<String> {
        let mut failures: Vec<String> = PolicyKind::ALL
            .iter()
            .filter_map(|kind| {
                self.policy(*kind)
                    .failure()
                    .map(|reason| format!("{kind}: {reason}"))
            })
            .collect();
        if let Some(reason) = &self.sts_fetch_error {
            failures.push(format!("mta-sts policy: {reason}"));
        }
        if let Some(reason) = self.mx.failure() {
            failures.push(format!("mx: {reason}"));
        }
        failures
    }

    pub fn to_record(&self) -> PostureRecord {
        let capabilities = self.capabilities.clone().unwrap_or_default();
        let stsmode = self
            .sts_document()
            .map(|doc| doc.mode.to_string())
            .unwrap_or_else(|| NONE.to_string());

        PostureRecord {
            id: None,
            zname: self.domain.clone(),
            agency: self.agency.clone(),
            time: self.observed_at.timestamp(),
            spf: self.spf.as_stored(),
            dkimselect: String::new(),
            dkim: String::new(),
            dmarc: self.dmarc.as_stored(),
            dane: self.dane,
            mx: self.mx.stored(),
            smtpsts: self.mta_sts.as_stored(),
            stspolicy: self.sts_policy.clone(),
            stsmode,
            tlsreport: self.tls_rpt.as_stored(),
            starttls: capabilities.starttls,
            requiretls: capabilities.requiretls,
            blocktls: capabilities.blocktls,
            cert: capabilities.cert,
            failures: self.failures(),
        }
    }
}

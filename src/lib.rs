#![forbid(unsafe_code)]
//! mailposture — email security posture of domains (SPF, DMARC, MTA-STS,
//! TLS-RPT, MX, DANE, STARTTLS capabilities)

pub mod config;
pub mod dns;
pub mod input;
pub mod mx;
pub mod posture;
pub mod probe;
pub mod run;
pub mod store;
pub mod sts;

pub use config::{ConfigError, MonitorConfig};
pub use dns::{DnsError, DnsLookup, DnsResolver, PolicyKind, PolicyLookup, normalize_domain};
pub use input::{DomainEntry, InputError, parse_domain_list, read_domain_list};
pub use mx::{DaneQueryName, MxList, MxOrder, MxRecord};
pub use posture::{AssessOptions, PostureAssembler, PostureRecord, PostureReport};
pub use probe::{Capabilities, CapabilityCache, CommandProbe, ProbeRunner};
pub use run::{RateLimiter, RunError, RunSummary, build_assembler, run_batch, run_monitor};
pub use store::{JsonFileStore, MemoryStore, PostureStore, StoreError};
pub use sts::{HttpStsFetcher, StsFetcher, StsMode, StsPolicyDocument};

//! SMTP transport capability probing with a per-operator cache.
//!
//! The live probe is an external executable ([`CommandProbe`]) bounded by a
//! hard timeout. [`CapabilityCache`] makes sure each organizational domain
//! is probed at most once per run.

mod cache;
mod error;
mod org;
mod parse;
mod runner;
mod types;

pub use cache::CapabilityCache;
pub use error::ProbeError;
pub use org::organizational_domain;
pub use parse::parse_probe_output;
pub use runner::{CommandProbe, PROBE_TIMEOUT, ProbeRunner};
pub use types::{Capabilities, ProbeOutcome, ProbeRun};

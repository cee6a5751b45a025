//! Per-domain posture assembly.
//!
//! Call order: SPF, DMARC, MTA-STS and TLS-RPT records; the MTA-STS
//! document when advertised; MX; DANE across all exchanges; and, in full
//! test mode, the capability probe of the primary exchange.

mod assembler;
mod types;

pub use assembler::{AssessOptions, PostureAssembler};
pub use types::{PostureRecord, PostureReport};

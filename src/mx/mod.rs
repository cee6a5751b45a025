//! MX enumeration and per-exchange DANE checks.
//!
//! [`list_mx`] keeps the resolver's answer order and reports failures as
//! [`MxList::QueryFailed`]; [`any_dane`] folds the TLSA lookups of all
//! exchanges into one flag.

mod dane;
mod resolver;
mod types;

pub use dane::{DaneQueryName, any_dane, has_dane_records};
pub use resolver::list_mx;
pub use types::{MxList, MxOrder, MxRecord, NO_RECORDS, QUERY_FAILED};

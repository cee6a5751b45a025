//! Persistence of posture records, keyed by domain name.
//!
//! The assembler looks a domain up first and then either upserts a new
//! record or updates the existing one; ids are owned by the store.

mod collection;
mod error;
mod json;
mod memory;

pub use error::StoreError;
pub use json::JsonFileStore;
pub use memory::MemoryStore;

use crate::posture::PostureRecord;

pub trait PostureStore {
    fn find_by_domain_name(&self, zname: &str) -> Result<Option<PostureRecord>, StoreError>;
    fn upsert(&self, record: &PostureRecord) -> Result<(), StoreError>;
    fn update(&self, zname: &str, record: &PostureRecord) -> Result<(), StoreError>;
}

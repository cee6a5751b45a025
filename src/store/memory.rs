use std::sync::{Mutex, PoisonError};

use super::{PostureStore, StoreError, collection::Collection};
use crate::posture::PostureRecord;

/// Process-local store, for single-domain runs and embedding.
#[derive(Debug, Default)]
pub struct MemoryStore {
    inner: Mutex<Collection>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl PostureStore for MemoryStore {
    fn find_by_domain_name(&self, zname: &str) -> Result<Option<PostureRecord>, StoreError> {
        let inner = self.inner.lock().unwrap_or_else(PoisonError::into_inner);
        Ok(inner.find(zname))
    }

    fn upsert(&self, record: &PostureRecord) -> Result<(), StoreError> {
        let mut inner = self.inner.lock().unwrap_or_else(PoisonError::into_inner);
        inner.upsert(record);
        Ok(())
    }

    fn update(&self, zname: &str, record: &PostureRecord) -> Result<(), StoreError> {
        let mut inner = self.inner.lock().unwrap_or_else(PoisonError::into_inner);
        inner.update(zname, record)
    }
}

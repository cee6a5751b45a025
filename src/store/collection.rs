use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::StoreError;
use crate::posture::PostureRecord;

/// Records keyed by `zname`, with store-managed ids.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub(crate) struct Collection {
    records: BTreeMap<String, PostureRecord>,
}

impl Collection {
    pub(crate) fn len(&self) -> usize {
        self.records.len()
    }

    pub(crate) fn find(&self, zname: &str) -> Option<PostureRecord> {
        self.records.get(zname).cloned()
    }

    /// Insert or replace by `zname`. A new record gets a fresh id; an
    /// existing one keeps its id.
    pub(crate) fn upsert(&mut self, record: &PostureRecord) {
        let id = match self.records.get(&record.zname) {
            Some(existing) if existing.id.is_some() => existing.id.clone(),
            _ => Some(self.next_id()),
        };
        let mut stored = record.clone();
        stored.id = id;
        self.records.insert(stored.zname.clone(), stored);
    }

    /// Replace an existing record. The stored id is never overwritten.
    pub(crate) fn update(&mut self, zname: &str, record: &PostureRecord) -> Result<(), StoreError> {
        let Some(existing) = self.records.get_mut(zname) else {
            return Err(StoreError::not_found(zname));
        };
        let id = existing.id.take();
        *existing = record.clone();
        existing.id = id;
        existing.zname = zname.to_string();
        Ok(())
    }

    fn next_id(&self) -> String {
        let highest = self
            .records
            .values()
            .filter_map(|record| record.id.as_deref())
            .filter_map(|id| u64::from_str_radix(id, 16).ok())
            .max()
            .unwrap_or(0);
        format!("{:024x}", highest + 1)
    }
}

use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError};

use super::{PostureStore, StoreError, collection::Collection};
use crate::posture::PostureRecord;

/// Store backed by one JSON document (`zname` → record), rewritten
/// atomically after every change.
///
/// Each write serializes the whole collection, so a write costs O(N) in
/// the number of stored records. Call it from blocking code.
#[derive(Debug)]
pub struct JsonFileStore {
    path: PathBuf,
    inner: Mutex<Collection>,
}

impl JsonFileStore {
    /// Open `path`, starting empty when the file does not exist yet.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let path = path.into();
        let collection = match std::fs::read(&path) {
            Ok(bytes) if bytes.iter().all(u8::is_ascii_whitespace) => Collection::default(),
            Ok(bytes) => serde_json::from_slice(&bytes).map_err(|source| StoreError::Corrupt {
                path: path.clone(),
                source,
            })?,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Collection::default(),
            Err(err) => return Err(StoreError::read(&path, err)),
        };
        tracing::debug!(path = %path.display(), records = collection.len(), "store opened");
        Ok(Self {
            path,
            inner: Mutex::new(collection),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn len(&self) -> usize {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn commit<F>(&self, zname: &str, change: F) -> Result<(), StoreError>
    where
        F: FnOnce(&mut Collection) -> Result<(), StoreError>,
    {
        let mut inner = self.inner.lock().unwrap_or_else(PoisonError::into_inner);
        let mut next = inner.clone();
        change(&mut next)?;
        let bytes = serde_json::to_vec_pretty(&next).map_err(|source| StoreError::Encode {
            zname: zname.to_string(),
            source,
        })?;
        write_all_atomically(&self.path, &bytes)?;
        *inner = next;
        Ok(())
    }
}

impl PostureStore for JsonFileStore {
    fn find_by_domain_name(&self, zname: &str) -> Result<Option<PostureRecord>, StoreError> {
        let inner = self.inner.lock().unwrap_or_else(PoisonError::into_inner);
        Ok(inner.find(zname))
    }

    fn upsert(&self, record: &PostureRecord) -> Result<(), StoreError> {
        self.commit(&record.zname, |collection| {
            collection.upsert(record);
            Ok(())
        })
    }

    fn update(&self, zname: &str, record: &PostureRecord) -> Result<(), StoreError> {
        self.commit(zname, |collection| collection.update(zname, record))
    }
}

fn write_all_atomically(path: &Path, bytes: &[u8]) -> Result<(), StoreError> {
    let mut tmp = path.as_os_str().to_owned();
    tmp.push(".tmp");
    let tmp = PathBuf::from(tmp);
    {
        let mut f = std::fs::File::create(&tmp).map_err(|err| StoreError::write(&tmp, err))?;
        f.write_all(bytes).map_err(|err| StoreError::write(&tmp, err))?;
        f.sync_all().map_err(|err| StoreError::write(&tmp, err))?;
    }
    std::fs::rename(&tmp, path).map_err(|err| StoreError::write(path, err))
}

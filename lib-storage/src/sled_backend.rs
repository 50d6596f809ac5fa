use std::path::Path;

use tracing::debug;

use crate::{StorageBackend, StorageError};

/// Durable backend on top of `sled`. Sled's own write-ahead log gives us the
/// atomic-batch guarantee the old DHT storage layer hand-rolled with a
/// temp-file-then-rename; we just need to route every mutating call through
/// `sled::Batch` rather than one `insert` at a time.
#[derive(Debug)]
pub struct SledBackend {
    db: sled::Db,
}

impl SledBackend {
    pub fn open(path: impl AsRef<Path>) -> Result<Self, StorageError> {
        let db = sled::open(path).map_err(|e| StorageError::Backend(e.to_string()))?;
        Ok(Self { db })
    }

    pub fn flush(&self) -> Result<(), StorageError> {
        self.db.flush().map_err(|e| StorageError::Backend(e.to_string()))?;
        Ok(())
    }
}

impl StorageBackend for SledBackend {
    fn get(&self, key: &[u8]) -> Result<Option<Vec<u8>>, StorageError> {
        Ok(self
            .db
            .get(key)
            .map_err(|e| StorageError::Backend(e.to_string()))?
            .map(|ivec| ivec.to_vec()))
    }

    fn delete(&self, key: &[u8]) -> Result<(), StorageError> {
        self.db
            .remove(key)
            .map_err(|e| StorageError::Backend(e.to_string()))?;
        Ok(())
    }

    fn atomic_write(&self, batch: &[(Vec<u8>, Vec<u8>)]) -> Result<(), StorageError> {
        let mut sled_batch = sled::Batch::default();
        for (key, value) in batch {
            sled_batch.insert(key.as_slice(), value.as_slice());
        }
        self.db
            .apply_batch(sled_batch)
            .map_err(|e| StorageError::Backend(e.to_string()))?;
        debug!(entries = batch.len(), "applied atomic write batch");
        Ok(())
    }

    fn scan_prefix(&self, prefix: &[u8]) -> Result<Vec<(Vec<u8>, Vec<u8>)>, StorageError> {
        self.db
            .scan_prefix(prefix)
            .map(|res| {
                res.map(|(k, v)| (k.to_vec(), v.to_vec()))
                    .map_err(|e| StorageError::Backend(e.to_string()))
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn put_then_get_survives_reopen() {
        let dir = tempfile::tempdir().unwrap();
        {
            let backend = SledBackend::open(dir.path()).unwrap();
            backend.put(b"k", b"v").unwrap();
            backend.flush().unwrap();
        }
        let backend = SledBackend::open(dir.path()).unwrap();
        assert_eq!(backend.get(b"k").unwrap(), Some(b"v".to_vec()));
    }
}

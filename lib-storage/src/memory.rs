use std::collections::BTreeMap;
use std::sync::RwLock;

use crate::{StorageBackend, StorageError};

/// In-memory backend. Used by tests and by nodes that don't need state to
/// survive a restart.
#[derive(Debug, Default)]
pub struct MemoryBackend {
    data: RwLock<BTreeMap<Vec<u8>, Vec<u8>>>,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }
}

impl StorageBackend for MemoryBackend {
    fn get(&self, key: &[u8]) -> Result<Option<Vec<u8>>, StorageError> {
        Ok(self.data.read().unwrap().get(key).cloned())
    }

    fn delete(&self, key: &[u8]) -> Result<(), StorageError> {
        self.data.write().unwrap().remove(key);
        Ok(())
    }

    fn atomic_write(&self, batch: &[(Vec<u8>, Vec<u8>)]) -> Result<(), StorageError> {
        let mut guard = self.data.write().unwrap();
        for (key, value) in batch {
            guard.insert(key.clone(), value.clone());
        }
        Ok(())
    }

    fn scan_prefix(&self, prefix: &[u8]) -> Result<Vec<(Vec<u8>, Vec<u8>)>, StorageError> {
        Ok(self
            .data
            .read()
            .unwrap()
            .range(prefix.to_vec()..)
            .take_while(|(k, _)| k.starts_with(prefix))
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn put_then_get_round_trips() {
        let backend = MemoryBackend::new();
        backend.put(b"a", b"1").unwrap();
        assert_eq!(backend.get(b"a").unwrap(), Some(b"1".to_vec()));
    }

    #[test]
    fn scan_prefix_only_returns_matching_keys() {
        let backend = MemoryBackend::new();
        backend.put(b"bal/a", b"1").unwrap();
        backend.put(b"bal/b", b"2").unwrap();
        backend.put(b"other/c", b"3").unwrap();
        let mut found = backend.scan_prefix(b"bal/").unwrap();
        found.sort();
        assert_eq!(
            found,
            vec![(b"bal/a".to_vec(), b"1".to_vec()), (b"bal/b".to_vec(), b"2".to_vec())]
        );
    }

    #[test]
    fn delete_removes_key() {
        let backend = MemoryBackend::new();
        backend.put(b"a", b"1").unwrap();
        backend.delete(b"a").unwrap();
        assert_eq!(backend.get(b"a").unwrap(), None);
    }
}

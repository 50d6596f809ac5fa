//! Durable key-value storage for committed ledger state.
//!
//! The ledger overlay (`lib-blockchain`) only ever talks to the
//! [`StorageBackend`] trait; callers choose [`MemoryBackend`] for tests and
//! ephemeral nodes, or [`SledBackend`] for a durable node.

mod error;
mod memory;
mod sled_backend;

pub use error::StorageError;
pub use memory::MemoryBackend;
pub use sled_backend::SledBackend;

/// A generic, synchronous key-value store.
///
/// `atomic_write` is the only multi-key primitive: every write path in this
/// crate goes through it, so a single backend implementation is the one
/// place that has to reason about partial-write durability.
pub trait StorageBackend: Send + Sync + std::fmt::Debug {
    fn get(&self, key: &[u8]) -> Result<Option<Vec<u8>>, StorageError>;

    fn put(&self, key: &[u8], value: &[u8]) -> Result<(), StorageError> {
        self.atomic_write(&[(key.to_vec(), value.to_vec())])
    }

    fn delete(&self, key: &[u8]) -> Result<(), StorageError>;

    /// Writes every pair in `batch`, all-or-nothing.
    fn atomic_write(&self, batch: &[(Vec<u8>, Vec<u8>)]) -> Result<(), StorageError>;

    /// Returns every stored `(key, value)` pair whose key starts with `prefix`.
    fn scan_prefix(&self, prefix: &[u8]) -> Result<Vec<(Vec<u8>, Vec<u8>)>, StorageError>;
}

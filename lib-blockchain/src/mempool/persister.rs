//! Durable backing for the mempool (§4.2 Persister): a dedicated task
//! drains an event queue into a key-value store so a restart can replay
//! pending work without re-verifying signatures.

use std::sync::Arc;

use lib_storage::StorageBackend;
use tokio::sync::mpsc;
use tracing::{debug, warn};

use super::MempoolTx;

#[derive(Debug, Clone)]
pub enum PersistEvent {
    Add(MempoolTx),
    Remove(lib_crypto::Hash),
}

fn storage_key(hash: &lib_crypto::Hash) -> Vec<u8> {
    let mut key = b"mempool/".to_vec();
    key.extend_from_slice(hash.as_bytes());
    key
}

/// Handle held by the live mempool; `None` means persistence is disabled
/// and every operation is a no-op, per §4.2.
#[derive(Clone)]
pub struct PersisterHandle {
    sender: Option<mpsc::UnboundedSender<PersistEvent>>,
}

impl PersisterHandle {
    pub fn disabled() -> Self {
        Self { sender: None }
    }

    pub fn enqueue(&self, event: PersistEvent) {
        if let Some(sender) = &self.sender {
            // The task may have been stopped; a dropped receiver just
            // means the event is lost, not a panic.
            let _ = sender.send(event);
        }
    }
}

/// Starts the persister task, returning the handle to enqueue events and
/// every `MempoolTx` already on disk (for startup replay with
/// `persist_to_db=false`, per §4.2).
pub fn start(storage: Arc<dyn StorageBackend>) -> (PersisterHandle, Vec<MempoolTx>) {
    let replay = load_all(storage.as_ref());

    let (tx, mut rx) = mpsc::unbounded_channel::<PersistEvent>();
    tokio::spawn(async move {
        while let Some(event) = rx.recv().await {
            if let Err(err) = apply(storage.as_ref(), &event) {
                warn!(?err, "mempool persister failed to apply event");
            }
        }
        debug!("mempool persister task exiting");
    });

    (
        PersisterHandle {
            sender: Some(tx),
        },
        replay,
    )
}

fn apply(storage: &dyn StorageBackend, event: &PersistEvent) -> Result<(), lib_storage::StorageError> {
    match event {
        PersistEvent::Add(tx) => {
            let bytes = bincode::serialize(tx).expect("mempool tx encodes");
            storage.put(&storage_key(&tx.hash), &bytes)
        }
        PersistEvent::Remove(hash) => storage.delete(&storage_key(hash)),
    }
}

fn load_all(storage: &dyn StorageBackend) -> Vec<MempoolTx> {
    storage
        .scan_prefix(b"mempool/")
        .unwrap_or_default()
        .into_iter()
        .filter_map(|(_, value)| bincode::deserialize(&value).ok())
        .collect()
}

//! Fee-Time priority mempool with durable backing (§4.2).

pub mod errors;
pub mod persister;

use std::cmp::Reverse;
use std::collections::BTreeMap;
use std::collections::HashMap;
use std::sync::Arc;

use primitive_types::U256;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::ledger::view::LedgerView;
use crate::transaction::core::Transaction;
use crate::transaction::hashing::encoded_size;
use crate::transaction::signing::verify_transaction_signature;
use crate::types::{BlockHeight, Hash, Pkid, TransactionNonce};

pub use errors::AdmitError;
use persister::{PersistEvent, PersisterHandle};

/// A transaction as tracked by the mempool: the wire-level facts needed
/// for Fee-Time ordering and admission accounting, alongside the
/// transaction itself (§4.2 step 3).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MempoolTx {
    pub hash: Hash,
    pub transaction: Transaction,
    pub sender: Pkid,
    pub wire_size_bytes: u64,
    pub fee_per_kb_nanos: u64,
    pub arrival_seq: u64,
}

/// `(fee bucket descending, arrival ascending)` — the iteration order of
/// [`Mempool::priority_index`] is exactly Fee-Time order (§4.2).
type PriorityKey = (Reverse<u64>, u64);

pub struct Mempool {
    transactions: HashMap<Hash, MempoolTx>,
    priority_index: BTreeMap<PriorityKey, Hash>,
    nonce_index: HashMap<(Pkid, TransactionNonce), Hash>,
    sender_fee_totals: HashMap<Pkid, u64>,
    next_arrival_seq: u64,
    total_bytes: u64,

    max_bytes: u64,
    fee_bucket_width_nanos: u64,
    persister: PersisterHandle,
}

impl Mempool {
    pub fn new(max_bytes: u64, fee_bucket_width_nanos: u64) -> Self {
        Self {
            transactions: HashMap::new(),
            priority_index: BTreeMap::new(),
            nonce_index: HashMap::new(),
            sender_fee_totals: HashMap::new(),
            next_arrival_seq: 0,
            total_bytes: 0,
            max_bytes,
            fee_bucket_width_nanos: fee_bucket_width_nanos.max(1),
            persister: PersisterHandle::disabled(),
        }
    }

    /// Starts the durable persister against `storage`, replaying whatever
    /// was on disk with `persist_to_db=false` (no re-enqueue) to avoid
    /// feedback, exactly as §4.2 describes.
    pub fn start(&mut self, storage: Arc<dyn lib_storage::StorageBackend>) {
        let (handle, replayed) = persister::start(storage);
        self.persister = handle;
        for tx in replayed {
            self.insert_locally(tx, false);
        }
    }

    pub fn stop(&mut self) {
        self.persister = PersisterHandle::disabled();
    }

    pub fn len(&self) -> usize {
        self.transactions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.transactions.is_empty()
    }

    pub fn contains(&self, hash: &Hash) -> bool {
        self.transactions.contains_key(hash)
    }

    pub fn get_transaction(&self, hash: &Hash) -> Option<&Transaction> {
        self.transactions.get(hash).map(|tx| &tx.transaction)
    }

    /// Fee-Time order: highest fee-per-kb bucket first, earliest arrival
    /// within a bucket first (§4.2).
    pub fn get_transactions(&self) -> Vec<&Transaction> {
        self.priority_index
            .values()
            .map(|hash| &self.transactions[hash].transaction)
            .collect()
    }

    /// Top-priority transactions up to `max_count`, in Fee-Time order —
    /// the set a block proposer drains into a candidate block (spec's
    /// "propose-ready" signal handling).
    pub fn drain_top_priority(&self, max_count: usize) -> Vec<Transaction> {
        self.priority_index
            .values()
            .take(max_count)
            .map(|hash| self.transactions[hash].transaction.clone())
            .collect()
    }

    pub fn add_transaction(
        &mut self,
        view: &LedgerView,
        transaction: Transaction,
        verify_signature: bool,
    ) -> Result<(), AdmitError> {
        view.validate_static_sanity(&transaction)?;
        let sender = view.resolve_pkid(&transaction.sender_public_key);
        view.validate_transaction_nonce(&sender, &transaction.nonce)?;

        if verify_signature {
            verify_transaction_signature(&transaction).map_err(|_| AdmitError::InvalidSignature)?;
        }

        let hash = view.transaction_hash(&transaction);
        if self.transactions.contains_key(&hash) {
            return Err(AdmitError::AlreadyPresent);
        }

        let wire_size_bytes = encoded_size(&transaction) as u64;
        let size_kb = wire_size_bytes.div_ceil(1024).max(1);
        let fee_per_kb_nanos = transaction.declared_fee_nanos / size_kb;

        let nonce_key = (sender.clone(), transaction.nonce);
        if let Some(existing_hash) = self.nonce_index.get(&nonce_key).cloned() {
            let existing_fee = self.transactions[&existing_hash].fee_per_kb_nanos;
            if fee_per_kb_nanos <= existing_fee {
                return Err(AdmitError::FeeNotHigherThanExisting {
                    existing: existing_fee,
                    new: fee_per_kb_nanos,
                });
            }
        }

        let spendable = view.get_spendable_balance_for_public_key(&transaction.sender_public_key);
        let existing_sender_fees = self.sender_fee_totals.get(&sender).copied().unwrap_or(0);
        let replaced_fee = self
            .nonce_index
            .get(&nonce_key)
            .map(|h| self.transactions[h].fee_per_kb_nanos)
            .unwrap_or(0);
        let projected_fees = existing_sender_fees.saturating_sub(replaced_fee) + fee_per_kb_nanos;
        if U256::from(projected_fees) > spendable {
            return Err(AdmitError::SpendableBalanceExceeded);
        }

        if let Some(existing_hash) = self.nonce_index.get(&nonce_key).cloned() {
            self.remove_transaction(&existing_hash);
        }

        let mempool_tx = MempoolTx {
            hash,
            transaction,
            sender,
            wire_size_bytes,
            fee_per_kb_nanos,
            arrival_seq: self.next_arrival_seq,
        };
        self.next_arrival_seq += 1;

        self.persister.enqueue(PersistEvent::Add(mempool_tx.clone()));
        self.insert_locally(mempool_tx, true);
        self.prune_over_cap();
        Ok(())
    }

    fn insert_locally(&mut self, tx: MempoolTx, count_towards_seq: bool) {
        if !count_towards_seq {
            self.next_arrival_seq = self.next_arrival_seq.max(tx.arrival_seq + 1);
        }
        let bucket = tx.fee_per_kb_nanos / self.fee_bucket_width_nanos;
        let key = (Reverse(bucket), tx.arrival_seq);
        self.priority_index.insert(key, tx.hash);
        self.nonce_index.insert((tx.sender.clone(), tx.transaction.nonce), tx.hash);
        *self.sender_fee_totals.entry(tx.sender.clone()).or_insert(0) += tx.fee_per_kb_nanos;
        self.total_bytes += tx.wire_size_bytes;
        self.transactions.insert(tx.hash, tx);
    }

    pub fn remove_transaction(&mut self, hash: &Hash) -> Option<Transaction> {
        let tx = self.transactions.remove(hash)?;
        let bucket = tx.fee_per_kb_nanos / self.fee_bucket_width_nanos;
        self.priority_index.remove(&(Reverse(bucket), tx.arrival_seq));
        self.nonce_index.remove(&(tx.sender.clone(), tx.transaction.nonce));
        if let Some(total) = self.sender_fee_totals.get_mut(&tx.sender) {
            *total = total.saturating_sub(tx.fee_per_kb_nanos);
            if *total == 0 {
                self.sender_fee_totals.remove(&tx.sender);
            }
        }
        self.total_bytes = self.total_bytes.saturating_sub(tx.wire_size_bytes);
        self.persister.enqueue(PersistEvent::Remove(hash.clone()));
        Some(tx.transaction)
    }

    /// Evicts lowest-priority transactions until `total_bytes <= max_bytes`
    /// (§4.2 step 7).
    fn prune_over_cap(&mut self) {
        while self.total_bytes > self.max_bytes {
            let Some(hash) = self.priority_index.iter().next_back().map(|(_, v)| v.clone()) else {
                break;
            };
            debug!(?hash, "evicting lowest-priority mempool transaction over byte cap");
            self.remove_transaction(&hash);
        }
    }

    /// Rebuilds admission against a fresh tip view, dropping whatever no
    /// longer qualifies, without re-verifying signatures (§4.2 Refresh;
    /// §9 design note: sound only because admission always verifies).
    pub fn refresh(&mut self, view: &LedgerView) {
        let mut ephemeral = Mempool::new(self.max_bytes, self.fee_bucket_width_nanos);
        let ordered: Vec<Transaction> = self.get_transactions().into_iter().cloned().collect();
        for txn in ordered {
            let _ = ephemeral.add_transaction(view, txn, false);
        }

        let surviving: std::collections::HashSet<Hash> = ephemeral.transactions.keys().cloned().collect();
        let stale: Vec<Hash> = self
            .transactions
            .keys()
            .cloned()
            .filter(|h| !surviving.contains(h))
            .collect();
        for hash in stale {
            self.remove_transaction(&hash);
        }
    }

    /// Triggered after a new tip is connected (§4.2 Public contract).
    pub fn update_latest_block(&mut self, view: &LedgerView, _height: BlockHeight) {
        self.refresh(view);
    }

    /// Triggered by `UpdateGlobalParams` (min-fee may have risen).
    pub fn update_global_params(&mut self, view: &LedgerView) {
        self.refresh(view);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{sample_ledger_view, sample_pkid, sample_transaction};
    use crate::types::BalanceKey;

    fn txn_with(seed: u8, partial_id: u64, fee_per_kb_nanos: u64) -> Transaction {
        txn_with_amount(seed, partial_id, fee_per_kb_nanos, 1_000)
    }

    fn txn_with_amount(seed: u8, partial_id: u64, fee_per_kb_nanos: u64, amount_nanos: u64) -> Transaction {
        let mut txn = sample_transaction(seed);
        txn.nonce = TransactionNonce::new(1_000, partial_id);
        txn.fee_per_kb_nanos = fee_per_kb_nanos;
        txn.outputs[0].amount_nanos = amount_nanos;
        let size_kb = encoded_size(&txn).div_ceil(1024).max(1) as u64;
        txn.declared_fee_nanos = size_kb * fee_per_kb_nanos;
        txn
    }

    fn fund(view: &mut LedgerView, seed: u8) {
        view.set_balance(
            &mut crate::ledger::journal::Journal::new(),
            BalanceKey::deso(sample_pkid(seed)),
            U256::from(1_000_000_000u64),
        );
    }

    fn funded_view(seed: u8) -> (LedgerView, Pkid) {
        let mut view = sample_ledger_view(0);
        fund(&mut view, seed);
        (view, sample_pkid(seed))
    }

    #[test]
    fn admits_a_well_formed_transaction() {
        let (view, _sender) = funded_view(1);
        let mut mempool = Mempool::new(1_000_000, 1);
        let txn = txn_with(1, 1, 2_000);
        mempool.add_transaction(&view, txn, false).unwrap();
        assert_eq!(mempool.len(), 1);
    }

    #[test]
    fn rejects_duplicate_transaction() {
        let (view, _sender) = funded_view(1);
        let mut mempool = Mempool::new(1_000_000, 1);
        let txn = txn_with(1, 1, 2_000);
        mempool.add_transaction(&view, txn.clone(), false).unwrap();
        let err = mempool.add_transaction(&view, txn, false).unwrap_err();
        assert!(matches!(err, AdmitError::AlreadyPresent));
    }

    #[test]
    fn replace_by_fee_requires_strictly_higher_fee() {
        let (view, _sender) = funded_view(1);
        let mut mempool = Mempool::new(1_000_000, 1);
        let first = txn_with_amount(1, 1, 2_000, 1_000);
        mempool.add_transaction(&view, first, false).unwrap();

        let same_fee = txn_with_amount(1, 1, 2_000, 2_000);
        let err = mempool.add_transaction(&view, same_fee, false).unwrap_err();
        assert!(matches!(err, AdmitError::FeeNotHigherThanExisting { .. }));
        assert_eq!(mempool.len(), 1);

        let higher_fee = txn_with_amount(1, 1, 5_000, 3_000);
        mempool.add_transaction(&view, higher_fee.clone(), false).unwrap();
        assert_eq!(mempool.len(), 1);
        assert_eq!(mempool.get_transactions()[0].outputs[0].amount_nanos, 3_000);
    }

    #[test]
    fn fee_time_order_puts_highest_bucket_first_then_earliest_arrival() {
        let (mut view, _sender) = funded_view(1);
        fund(&mut view, 2);
        fund(&mut view, 3);
        let mut mempool = Mempool::new(1_000_000, 1_000);

        let low = txn_with(1, 1, 1_000);
        let high_first = txn_with(2, 2, 9_000);
        let high_second = txn_with(3, 3, 9_000);
        mempool.add_transaction(&view, low, false).unwrap();
        mempool.add_transaction(&view, high_first.clone(), false).unwrap();
        mempool.add_transaction(&view, high_second.clone(), false).unwrap();

        let ordered = mempool.get_transactions();
        assert_eq!(ordered[0].sender_public_key, high_first.sender_public_key);
        assert_eq!(ordered[1].sender_public_key, high_second.sender_public_key);
    }

    #[test]
    fn prunes_lowest_priority_transaction_once_over_byte_cap() {
        let (mut view, _sender) = funded_view(1);
        fund(&mut view, 2);
        let one_txn_bytes = encoded_size(&txn_with(1, 1, 1_000)) as u64;
        let mut mempool = Mempool::new(one_txn_bytes + one_txn_bytes / 2, 1);

        let low = txn_with(1, 1, 1_000);
        let high = txn_with(2, 2, 9_000);
        mempool.add_transaction(&view, low.clone(), false).unwrap();
        mempool.add_transaction(&view, high.clone(), false).unwrap();

        assert_eq!(mempool.len(), 1);
        assert_eq!(mempool.get_transactions()[0].sender_public_key, high.sender_public_key);
    }
}

//! The copy-on-write overlay above committed storage (§4.1). Single
//! component responsible for connecting/disconnecting one transaction at
//! a time; never shared across threads for writes.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use lib_crypto::PublicKey;
use primitive_types::U256;
use tracing::debug;

use crate::transaction::payloads::{
    access_group::{AccessGroupEntry, AccessGroupMemberEntry},
    coins::{CreatorCoinSupply, DaoCoinSupply},
    derived_key::DerivedKeyEntry,
    limit_order::LimitOrderEntry,
    nft::NftEntry,
};
use crate::transaction::{hash_transaction, validate_static};
use crate::types::{BalanceKey, BlockHeight, Hash, Pkid, TransactionNonce};
use lib_storage::StorageBackend;

use super::errors::{ConnectError, DisconnectError};
use super::journal::{Journal, Op};
use super::state::{EpochEntry, GlobalParams, PostEntry, ProfileEntry, ValidatorEntry};
use crate::transaction::core::Transaction;

/// Name of the fork gate in [`LedgerConfig::fork_heights`] that enables
/// the metamask-assembled (canonical UTF-8 string) access-signature form
/// on authorize-derived-key transactions (§4.1).
pub const METAMASK_SIGNATURE_FORK: &str = "metamask_assembled_signatures";

/// Configuration the ledger view needs beyond wire-level transaction
/// fields: the parameter updater's identity, the SPEC_FULL.md §B
/// validator-admission minimums, and per-named-feature fork heights
/// (§6 Configuration Surface).
#[derive(Debug, Clone)]
pub struct LedgerConfig {
    pub param_updater: Pkid,
    pub min_validator_stake_nanos: u64,
    pub unbonding_height_delta: u64,
    pub epoch_length_blocks: u64,
    pub validator_snapshot_lookback: u64,
    pub fork_heights: HashMap<String, BlockHeight>,
}

impl LedgerConfig {
    /// Whether the named feature's fork height has been reached.
    /// Unnamed/unconfigured features are never active.
    pub fn fork_active(&self, name: &str, height: BlockHeight) -> bool {
        self.fork_heights.get(name).is_some_and(|&fork_height| height >= fork_height)
    }
}

#[derive(Debug, Default)]
pub(crate) struct DerivedKeyMapKey(pub Pkid, pub Vec<u8>);

pub struct LedgerView {
    pub(crate) config: LedgerConfig,
    pub(crate) height: BlockHeight,

    pub(crate) balances: HashMap<BalanceKey, U256>,
    pub(crate) derived_keys: HashMap<(Pkid, Vec<u8>), DerivedKeyEntry>,
    pub(crate) access_groups: HashMap<(Pkid, String), AccessGroupEntry>,
    pub(crate) access_group_members: HashMap<(Pkid, String, Pkid, String), AccessGroupMemberEntry>,
    pub(crate) limit_orders: HashMap<u64, LimitOrderEntry>,
    pub(crate) next_order_id: u64,
    pub(crate) nft_entries: HashMap<(Hash, u32), NftEntry>,
    pub(crate) dao_supplies: HashMap<Pkid, DaoCoinSupply>,
    pub(crate) creator_coin_supplies: HashMap<Pkid, CreatorCoinSupply>,
    pub(crate) profiles: HashMap<Pkid, ProfileEntry>,
    pub(crate) posts: HashMap<Hash, PostEntry>,
    pub(crate) validators: HashMap<Pkid, ValidatorEntry>,
    pub(crate) epochs: HashMap<u64, EpochEntry>,
    pub(crate) current_epoch_number: u64,
    pub(crate) pkid_bindings: HashMap<Vec<u8>, Pkid>,
    pub(crate) used_nonces: HashSet<(Pkid, TransactionNonce)>,
    pub(crate) global_params: GlobalParams,

    storage: Arc<dyn StorageBackend>,
}

impl LedgerView {
    pub fn new(config: LedgerConfig, height: BlockHeight, storage: Arc<dyn StorageBackend>) -> Self {
        Self {
            config,
            height,
            balances: HashMap::new(),
            derived_keys: HashMap::new(),
            access_groups: HashMap::new(),
            access_group_members: HashMap::new(),
            limit_orders: HashMap::new(),
            next_order_id: 1,
            nft_entries: HashMap::new(),
            dao_supplies: HashMap::new(),
            creator_coin_supplies: HashMap::new(),
            profiles: HashMap::new(),
            posts: HashMap::new(),
            validators: HashMap::new(),
            epochs: HashMap::new(),
            current_epoch_number: 0,
            pkid_bindings: HashMap::new(),
            used_nonces: HashSet::new(),
            global_params: GlobalParams::default(),
            storage,
        }
    }

    pub fn height(&self) -> BlockHeight {
        self.height
    }

    pub fn global_params(&self) -> &GlobalParams {
        &self.global_params
    }

    pub fn config(&self) -> &LedgerConfig {
        &self.config
    }

    pub fn validators(&self) -> &HashMap<Pkid, ValidatorEntry> {
        &self.validators
    }

    pub fn get_validator(&self, pkid: &Pkid) -> Option<&ValidatorEntry> {
        self.validators.get(pkid)
    }

    pub fn epochs(&self) -> &HashMap<u64, EpochEntry> {
        &self.epochs
    }

    pub fn current_epoch_number(&self) -> u64 {
        self.current_epoch_number
    }

    /// `(public_key -> PKID)` resolution, following any identity swap that
    /// has occurred. Falls back to the deterministic derivation for a key
    /// that has never been swapped (§9 design note).
    pub fn resolve_pkid(&self, public_key: &PublicKey) -> Pkid {
        self.pkid_bindings
            .get(&public_key.dilithium_pk)
            .cloned()
            .unwrap_or_else(|| Pkid::from_public_key(public_key))
    }

    pub fn get_balance(&self, key: &BalanceKey) -> U256 {
        self.balances.get(key).copied().unwrap_or_default()
    }

    pub fn get_spendable_balance_for_public_key(&self, public_key: &PublicKey) -> U256 {
        let pkid = self.resolve_pkid(public_key);
        self.get_balance(&BalanceKey::deso(pkid))
    }

    pub fn get_derived_key_mapping_for_owner(
        &self,
        owner: &Pkid,
        derived_public_key: &PublicKey,
    ) -> Option<&DerivedKeyEntry> {
        self.derived_keys
            .get(&(owner.clone(), derived_public_key.dilithium_pk.clone()))
    }

    pub fn validate_transaction_nonce(&self, sender: &Pkid, nonce: &TransactionNonce) -> Result<(), ConnectError> {
        if !nonce.is_valid_at_height(self.height) {
            return Err(ConnectError::NonceExpired {
                expiration: nonce.expiration_block_height,
                partial_id: nonce.partial_id,
                current: self.height,
            });
        }
        if self.used_nonces.contains(&(sender.clone(), *nonce)) {
            return Err(ConnectError::NonceExpired {
                expiration: nonce.expiration_block_height,
                partial_id: nonce.partial_id,
                current: self.height,
            });
        }
        Ok(())
    }

    // -- mutation primitives used by connectors; each pushes its own undo op --

    pub(crate) fn set_balance(&mut self, journal: &mut Journal, key: BalanceKey, new_value: U256) {
        let prev = self.get_balance(&key);
        if new_value.is_zero() {
            self.balances.remove(&key);
        } else {
            self.balances.insert(key.clone(), new_value);
        }
        journal.push(Op::SetBalance { key, prev });
    }

    pub(crate) fn credit(&mut self, journal: &mut Journal, key: BalanceKey, amount: U256) {
        let new_value = self.get_balance(&key) + amount;
        self.set_balance(journal, key, new_value);
    }

    pub(crate) fn debit(&mut self, journal: &mut Journal, key: BalanceKey, amount: U256) -> Result<(), ConnectError> {
        let current = self.get_balance(&key);
        if current < amount {
            return Err(ConnectError::InsufficientBalance(key.holder.clone()));
        }
        self.set_balance(journal, key, current - amount);
        Ok(())
    }

    pub(crate) fn mark_nonce_used(&mut self, journal: &mut Journal, sender: Pkid, nonce: TransactionNonce) {
        let was_present = !self.used_nonces.insert((sender.clone(), nonce));
        journal.push(Op::SetNonceUsed {
            sender,
            nonce,
            was_present,
        });
    }

    // -- generic undo --

    pub(crate) fn undo(&mut self, op: Op) {
        match op {
            Op::SetBalance { key, prev } => {
                if prev.is_zero() {
                    self.balances.remove(&key);
                } else {
                    self.balances.insert(key, prev);
                }
            }
            Op::SetDerivedKey {
                owner,
                derived_key_id,
                prev,
            } => match prev {
                Some(entry) => {
                    self.derived_keys.insert((owner, derived_key_id), entry);
                }
                None => {
                    self.derived_keys.remove(&(owner, derived_key_id));
                }
            },
            Op::SetAccessGroup {
                owner,
                group_key_name,
                prev,
            } => match prev {
                Some(entry) => {
                    self.access_groups.insert((owner, group_key_name), entry);
                }
                None => {
                    self.access_groups.remove(&(owner, group_key_name));
                }
            },
            Op::SetAccessGroupMember {
                member_pkid,
                member_group_key_name,
                owner,
                owner_group_key_name,
                prev,
            } => {
                let key = (member_pkid, member_group_key_name, owner, owner_group_key_name);
                match prev {
                    Some(entry) => {
                        self.access_group_members.insert(key, entry);
                    }
                    None => {
                        self.access_group_members.remove(&key);
                    }
                }
            }
            Op::SetLimitOrder { order_id, prev } => match prev {
                Some(entry) => {
                    self.limit_orders.insert(order_id, entry);
                }
                None => {
                    self.limit_orders.remove(&order_id);
                }
            },
            Op::SetNextOrderId { prev } => {
                self.next_order_id = prev;
            }
            Op::SetNftEntry {
                post_hash,
                serial_number,
                prev,
            } => match prev {
                Some(entry) => {
                    self.nft_entries.insert((post_hash, serial_number), entry);
                }
                None => {
                    self.nft_entries.remove(&(post_hash, serial_number));
                }
            },
            Op::SetDaoSupply { creator, prev } => match prev {
                Some(supply) => {
                    self.dao_supplies.insert(creator, supply);
                }
                None => {
                    self.dao_supplies.remove(&creator);
                }
            },
            Op::SetCreatorCoinSupply { creator, prev } => match prev {
                Some(supply) => {
                    self.creator_coin_supplies.insert(creator, supply);
                }
                None => {
                    self.creator_coin_supplies.remove(&creator);
                }
            },
            Op::SetGlobalParams { prev } => {
                self.global_params = prev;
            }
            Op::SetPkidBinding { public_key, prev } => match prev {
                Some(pkid) => {
                    self.pkid_bindings.insert(public_key.dilithium_pk, pkid);
                }
                None => {
                    self.pkid_bindings.remove(&public_key.dilithium_pk);
                }
            },
            Op::SetProfile { pkid, prev } => match prev {
                Some(entry) => {
                    self.profiles.insert(pkid, entry);
                }
                None => {
                    self.profiles.remove(&pkid);
                }
            },
            Op::SetPost { post_hash, prev } => match prev {
                Some(entry) => {
                    self.posts.insert(post_hash, entry);
                }
                None => {
                    self.posts.remove(&post_hash);
                }
            },
            Op::SetValidator { pkid, prev } => match prev {
                Some(entry) => {
                    self.validators.insert(pkid, entry);
                }
                None => {
                    self.validators.remove(&pkid);
                }
            },
            Op::SetNonceUsed {
                sender,
                nonce,
                was_present,
            } => {
                if !was_present {
                    self.used_nonces.remove(&(sender, nonce));
                }
            }
            Op::TxnTypeTag(_) => {}
        }
    }

    /// Reverses a connected transaction's journal, restoring the view to
    /// exactly its pre-connect state (§4.1 Disconnect algorithm, §8).
    pub fn disconnect_transaction(
        &mut self,
        txn: &Transaction,
        mut journal: Journal,
    ) -> Result<(), DisconnectError> {
        let tag = match journal.pop() {
            Some(Op::TxnTypeTag(tag)) => tag,
            Some(other) => {
                return Err(DisconnectError::TypeTagMismatch {
                    expected: txn.payload.type_tag(),
                    found: format!("{other:?}"),
                })
            }
            None => return Err(DisconnectError::EmptyJournal),
        };
        if tag != txn.payload.type_tag() {
            return Err(DisconnectError::TypeTagMismatch {
                expected: txn.payload.type_tag(),
                found: tag.to_string(),
            });
        }
        for op in journal.into_iter().rev() {
            self.undo(op);
        }
        Ok(())
    }

    /// Commits the overlay to storage atomically and resets to empty
    /// (§4.1 `flush`). The overlay maps are the entire diff against
    /// committed state in this simplified model: there is no separate
    /// "read-through to storage" path, so flush always writes every
    /// entry currently held rather than a delta.
    pub fn flush(&mut self, committed_block_height: BlockHeight) -> Result<(), lib_storage::StorageError> {
        let mut batch = Vec::new();
        for (key, value) in &self.balances {
            let k = bincode::serialize(key).expect("balance key encodes");
            let v = bincode::serialize(value).expect("balance value encodes");
            batch.push((k, v));
        }
        batch.push((
            b"__committed_height".to_vec(),
            committed_block_height.to_le_bytes().to_vec(),
        ));
        self.storage.atomic_write(&batch)?;
        debug!(height = committed_block_height, "flushed ledger view to storage");

        self.balances.clear();
        self.derived_keys.clear();
        self.access_groups.clear();
        self.access_group_members.clear();
        self.limit_orders.clear();
        self.nft_entries.clear();
        self.dao_supplies.clear();
        self.creator_coin_supplies.clear();
        self.profiles.clear();
        self.posts.clear();
        self.validators.clear();
        self.used_nonces.clear();
        self.height = committed_block_height;
        Ok(())
    }

    /// Releases `Inactive` validators' locked stake back to spendable DESO
    /// once `unbonding_at_height` has passed, removing the entry (SPEC_FULL.md
    /// §B). Called once per block, before transactions are connected.
    pub fn release_matured_unbonding(&mut self, journal: &mut Journal) {
        let matured: Vec<Pkid> = self
            .validators
            .iter()
            .filter(|(_, entry)| {
                entry.status == super::state::ValidatorStatus::Inactive
                    && entry.unbonding_at_height.is_some_and(|h| h <= self.height)
            })
            .map(|(pkid, _)| pkid.clone())
            .collect();

        for pkid in matured {
            let entry = self.validators.get(&pkid).cloned().expect("matured pkid present");
            let locked = self.get_balance(&BalanceKey::stake_locked(pkid.clone()));
            self.debit(journal, BalanceKey::stake_locked(pkid.clone()), locked)
                .expect("locked balance covers its own entry's stake");
            self.credit(journal, BalanceKey::deso(pkid.clone()), locked);

            let prev = Some(entry);
            journal.push(Op::SetValidator {
                pkid: pkid.clone(),
                prev,
            });
            self.validators.remove(&pkid);
        }
    }

    pub fn validate_static_sanity(&self, txn: &Transaction) -> Result<(), ConnectError> {
        validate_static(txn)?;
        Ok(())
    }

    pub fn transaction_hash(&self, txn: &Transaction) -> Hash {
        hash_transaction(txn)
    }
}

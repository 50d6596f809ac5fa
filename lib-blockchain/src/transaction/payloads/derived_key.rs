use lib_crypto::PublicKey;
use primitive_types::U256;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::types::Pkid;

/// `spec.md` §3 Derived Key Entry lifecycle state. `Invalid` is terminal:
/// once reached, no authorize transaction may re-enable the key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DerivedKeyOperation {
    Valid,
    Invalid,
}

/// Immutable limits set at authorization time, carried alongside the
/// residual tracker rather than mutated in place (§9 design note).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpendingLimit {
    pub is_unlimited: bool,
    pub global_deso_limit_nanos: u64,
    pub transaction_count_limit: HashMap<String, u64>,
    pub creator_coin_operation_limit: HashMap<Pkid, u64>,
    pub dao_coin_operation_limit: HashMap<Pkid, u64>,
    pub nft_operation_limit: HashMap<Pkid, u64>,
    pub dao_coin_limit_order_limit: HashMap<Pkid, u64>,
}

impl SpendingLimit {
    pub fn unlimited() -> Self {
        Self {
            is_unlimited: true,
            global_deso_limit_nanos: 0,
            transaction_count_limit: HashMap::new(),
            creator_coin_operation_limit: HashMap::new(),
            dao_coin_operation_limit: HashMap::new(),
            nft_operation_limit: HashMap::new(),
            dao_coin_limit_order_limit: HashMap::new(),
        }
    }
}

/// The mutable residual quota tracker carried inside a derived key entry.
/// Decrements on use unless `immutable.is_unlimited`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpendingLimitTracker {
    pub remaining_global_deso_nanos: u64,
    pub remaining_transaction_count: HashMap<String, u64>,
    pub remaining_creator_coin_operations: HashMap<Pkid, u64>,
    pub remaining_dao_coin_operations: HashMap<Pkid, u64>,
    pub remaining_nft_operations: HashMap<Pkid, u64>,
    pub remaining_dao_coin_limit_order_operations: HashMap<Pkid, u64>,
}

impl SpendingLimitTracker {
    pub fn from_limit(limit: &SpendingLimit) -> Self {
        Self {
            remaining_global_deso_nanos: limit.global_deso_limit_nanos,
            remaining_transaction_count: limit.transaction_count_limit.clone(),
            remaining_creator_coin_operations: limit.creator_coin_operation_limit.clone(),
            remaining_dao_coin_operations: limit.dao_coin_operation_limit.clone(),
            remaining_nft_operations: limit.nft_operation_limit.clone(),
            remaining_dao_coin_limit_order_operations: limit.dao_coin_limit_order_limit.clone(),
        }
    }
}

/// `(owner_PKID, derived_public_key) -> entry` per `spec.md` §3.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DerivedKeyEntry {
    pub owner: Pkid,
    pub derived_public_key: PublicKey,
    pub expiration_block_height: u64,
    pub operation: DerivedKeyOperation,
    pub limit: SpendingLimit,
    pub tracker: SpendingLimitTracker,
    pub extra_data: HashMap<String, Vec<u8>>,
}

/// Payload of an authorize-derived-key transaction.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthorizeDerivedKeyPayload {
    pub derived_public_key: PublicKey,
    pub expiration_block_height: u64,
    pub operation: DerivedKeyOperation,
    pub spending_limit: Option<SpendingLimit>,
    /// Covers `derived_public_key || expiration_height [|| spending_limit_bytes]`,
    /// or after the metamask fork the canonical UTF-8 string form.
    pub access_signature: Vec<u8>,
    pub is_metamask_signature: bool,
    pub extra_data: HashMap<String, Vec<u8>>,
}

/// Implied DESO spend used against a derived key's global cap; always
/// `U256` even though current balances are `u64` nanos, so the check in
/// §4.1 step 2 never silently wraps.
pub fn implied_deso_spend(outputs_total_nanos: u64) -> U256 {
    U256::from(outputs_total_nanos)
}

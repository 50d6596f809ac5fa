//! The reversible operation log emitted by `connect_transaction` and
//! consumed by `disconnect_transaction` (§9 design note).
//!
//! Every variant but the terminal tag carries the previous value of
//! whatever it overwrote, so undoing a connect is a generic "replay the
//! previous value" walk in reverse order — no per-connector disconnect
//! logic is needed.

use lib_crypto::PublicKey;
use primitive_types::U256;
use serde::{Deserialize, Serialize};

use crate::transaction::payloads::{
    access_group::{AccessGroupEntry, AccessGroupMemberEntry},
    coins::{CreatorCoinSupply, DaoCoinSupply},
    derived_key::DerivedKeyEntry,
    limit_order::LimitOrderEntry,
    nft::NftEntry,
};
use crate::types::{BalanceKey, Hash, Pkid};

use super::state::{GlobalParams, PostEntry, ProfileEntry, ValidatorEntry};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Op {
    SetBalance {
        key: BalanceKey,
        prev: U256,
    },
    SetDerivedKey {
        owner: Pkid,
        derived_key_id: Vec<u8>,
        prev: Option<DerivedKeyEntry>,
    },
    SetAccessGroup {
        owner: Pkid,
        group_key_name: String,
        prev: Option<AccessGroupEntry>,
    },
    SetAccessGroupMember {
        member_pkid: Pkid,
        member_group_key_name: String,
        owner: Pkid,
        owner_group_key_name: String,
        prev: Option<AccessGroupMemberEntry>,
    },
    SetLimitOrder {
        order_id: u64,
        prev: Option<LimitOrderEntry>,
    },
    SetNextOrderId {
        prev: u64,
    },
    SetNftEntry {
        post_hash: Hash,
        serial_number: u32,
        prev: Option<NftEntry>,
    },
    SetDaoSupply {
        creator: Pkid,
        prev: Option<DaoCoinSupply>,
    },
    SetCreatorCoinSupply {
        creator: Pkid,
        prev: Option<CreatorCoinSupply>,
    },
    SetGlobalParams {
        prev: GlobalParams,
    },
    /// Reverses an identity swap by restoring the prior public-key -> PKID
    /// binding for one side of the swap. Two of these are emitted per swap.
    SetPkidBinding {
        public_key: PublicKey,
        prev: Option<Pkid>,
    },
    SetProfile {
        pkid: Pkid,
        prev: Option<ProfileEntry>,
    },
    SetPost {
        post_hash: Hash,
        prev: Option<PostEntry>,
    },
    SetValidator {
        pkid: Pkid,
        prev: Option<ValidatorEntry>,
    },
    SetNonceUsed {
        sender: Pkid,
        nonce: crate::types::TransactionNonce,
        was_present: bool,
    },
    /// Always the last entry in a transaction's journal; its payload-type
    /// tag must match the transaction being disconnected (§4.1, §8).
    TxnTypeTag(&'static str),
}

pub type Journal = Vec<Op>;

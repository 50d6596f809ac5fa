//! Entry types that live in the ledger overlay but aren't specific to any
//! one connector family.

use lib_crypto::PublicKey;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::types::{BlockHeight, Hash, Pkid};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GlobalParams {
    pub min_fee_per_kb_nanos: u64,
    pub max_mempool_bytes: u64,
    pub max_nft_copies: u32,
}

impl Default for GlobalParams {
    fn default() -> Self {
        Self {
            min_fee_per_kb_nanos: 1_000,
            max_mempool_bytes: 300 * 1024 * 1024,
            max_nft_copies: 10_000,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProfileEntry {
    pub username: Option<String>,
    pub description: Option<String>,
    pub profile_pic: Option<Vec<u8>>,
    pub is_hidden: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PostEntry {
    pub poster: Pkid,
    pub parent_post_hash: Option<Hash>,
    pub body: Vec<u8>,
    pub is_hidden: bool,
    pub extra_data: HashMap<String, Vec<u8>>,
}

/// `spec.md` §3 Validator Entry. Populated by the SPEC_FULL.md §B
/// validator-lifecycle connectors, not by any payload `spec.md` names.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ValidatorStatus {
    Active,
    Inactive,
    Jailed,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidatorEntry {
    pub pkid: Pkid,
    pub voting_public_key: PublicKey,
    pub stake_amount_nanos: u64,
    pub commission_bps: u16,
    pub status: ValidatorStatus,
    pub unbonding_at_height: Option<BlockHeight>,
}

/// `spec.md` §3 Epoch Entry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EpochEntry {
    pub epoch_number: u64,
    pub first_block_height: BlockHeight,
    pub final_block_height: BlockHeight,
    /// The epoch number whose validator-set snapshot governs voting on
    /// blocks in this epoch (current epoch minus the configured lookback).
    pub snapshot_validator_set_epoch: u64,
}

use primitive_types::U256;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::types::Pkid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CreatorCoinOperation {
    Buy,
    Sell,
    AddFounderReward,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreatorCoinPayload {
    pub creator: Pkid,
    pub operation: CreatorCoinOperation,
    /// DESO nanos for `Buy`, creator-coin units for `Sell`.
    pub amount: u64,
    pub min_amount_expected: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DaoCoinOperation {
    Mint,
    Burn,
    DisableMinting,
    UpdateTransferRestrictionStatus,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DaoCoinPayload {
    pub creator: Pkid,
    pub operation: DaoCoinOperation,
    pub coins_to_mint_or_burn: U256,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DaoCoinTransferPayload {
    pub creator: Pkid,
    pub recipient: Pkid,
    pub amount: U256,
}

/// Per-creator supply and mint-control state backing the DAO-coin balance
/// ledger (`spec.md` §3 invariant: sum over holders == recorded supply).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DaoCoinSupply {
    pub total_supply: U256,
    pub minting_disabled: bool,
    pub transfer_restricted: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreatorCoinSupply {
    pub total_supply: u64,
    pub deso_locked_nanos: u64,
    pub founder_reward_bps: HashMap<Pkid, u16>,
}

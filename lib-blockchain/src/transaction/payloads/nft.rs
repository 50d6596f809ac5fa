use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::types::{Hash, Pkid};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NftCreatePayload {
    pub post_hash: Hash,
    pub num_copies: u32,
    pub has_unlockable_content: bool,
    pub is_for_sale: bool,
    pub min_bid_amount_nanos: u64,
    pub creator_royalty_bps: u16,
    pub coin_royalty_bps: u16,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NftUpdatePayload {
    pub post_hash: Hash,
    pub serial_number: u32,
    pub is_for_sale: bool,
    pub min_bid_amount_nanos: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NftBidPayload {
    pub post_hash: Hash,
    pub serial_number: u32,
    pub bid_amount_nanos: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NftAcceptBidPayload {
    pub post_hash: Hash,
    pub serial_number: u32,
    pub bidder: Pkid,
    pub bid_amount_nanos: u64,
    pub unlockable_text: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NftTransferPayload {
    pub post_hash: Hash,
    pub serial_number: u32,
    pub recipient: Pkid,
    pub unlockable_text: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NftBurnPayload {
    pub post_hash: Hash,
    pub serial_number: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum NftPayload {
    Create(NftCreatePayload),
    Update(NftUpdatePayload),
    Bid(NftBidPayload),
    AcceptBid(NftAcceptBidPayload),
    Transfer(NftTransferPayload),
    Burn(NftBurnPayload),
}

/// `(post_hash, serial_number) -> entry`. Serial number 0 never exists as
/// an owned copy: it is the pre-mint post record in `spec.md`'s NFT-create
/// connector.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NftEntry {
    pub owner: Pkid,
    pub is_for_sale: bool,
    pub min_bid_amount_nanos: u64,
    pub last_accepted_bid_amount_nanos: u64,
    pub is_pending: bool,
    pub extra_data: HashMap<String, Vec<u8>>,
}

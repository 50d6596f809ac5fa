//! NFT create/update/bid/accept-bid/transfer/burn connectors (§3, §4.1).
//!
//! Bids are never stored in ledger state (no `NftEntry` field for them): an
//! accept-bid transaction names the bidder and amount directly, the way a
//! wallet-assembled signed bid is surfaced to the creator off-chain in the
//! system this crate is modeled on. A bid transaction is therefore pure
//! validation with no journal entries of its own.

use primitive_types::U256;

use crate::ledger::errors::ConnectError;
use crate::ledger::journal::Op;
use crate::ledger::view::LedgerView;
use crate::ledger::Journal;
use crate::transaction::payloads::nft::{
    NftAcceptBidPayload, NftBidPayload, NftBurnPayload, NftCreatePayload, NftEntry, NftTransferPayload,
    NftUpdatePayload,
};
use crate::types::{BalanceKey, Pkid};

fn set_entry(view: &mut LedgerView, journal: &mut Journal, key: (crate::types::Hash, u32), entry: Option<NftEntry>) {
    let prev = view.nft_entries.get(&key).cloned();
    journal.push(Op::SetNftEntry {
        post_hash: key.0.clone(),
        serial_number: key.1,
        prev,
    });
    match entry {
        Some(e) => {
            view.nft_entries.insert(key, e);
        }
        None => {
            view.nft_entries.remove(&key);
        }
    }
}

pub fn connect_create(
    view: &mut LedgerView,
    journal: &mut Journal,
    transactor: &Pkid,
    payload: &NftCreatePayload,
) -> Result<(), ConnectError> {
    if !view.posts.contains_key(&payload.post_hash) {
        return Err(ConnectError::PostNotFound);
    }
    for serial_number in 1..=payload.num_copies {
        let key = (payload.post_hash.clone(), serial_number);
        if view.nft_entries.contains_key(&key) {
            continue;
        }
        set_entry(
            view,
            journal,
            key,
            Some(NftEntry {
                owner: transactor.clone(),
                is_for_sale: payload.is_for_sale,
                min_bid_amount_nanos: payload.min_bid_amount_nanos,
                last_accepted_bid_amount_nanos: 0,
                is_pending: false,
                extra_data: std::collections::HashMap::new(),
            }),
        );
    }
    Ok(())
}

pub fn connect_update(
    view: &mut LedgerView,
    journal: &mut Journal,
    transactor: &Pkid,
    payload: &NftUpdatePayload,
) -> Result<(), ConnectError> {
    let key = (payload.post_hash.clone(), payload.serial_number);
    let mut entry = view.nft_entries.get(&key).cloned().ok_or(ConnectError::NftNotFound)?;
    if entry.owner != *transactor {
        return Err(ConnectError::NotNftOwner);
    }
    entry.is_for_sale = payload.is_for_sale;
    entry.min_bid_amount_nanos = payload.min_bid_amount_nanos;
    set_entry(view, journal, key, Some(entry));
    Ok(())
}

pub fn connect_bid(view: &LedgerView, payload: &NftBidPayload) -> Result<(), ConnectError> {
    let key = (payload.post_hash.clone(), payload.serial_number);
    let entry = view.nft_entries.get(&key).ok_or(ConnectError::NftNotFound)?;
    if !entry.is_for_sale {
        return Err(ConnectError::NftNotForSale);
    }
    if payload.bid_amount_nanos < entry.min_bid_amount_nanos {
        return Err(ConnectError::BidBelowMinimum);
    }
    Ok(())
}

pub fn connect_accept_bid(
    view: &mut LedgerView,
    journal: &mut Journal,
    transactor: &Pkid,
    payload: &NftAcceptBidPayload,
) -> Result<(), ConnectError> {
    let key = (payload.post_hash.clone(), payload.serial_number);
    let mut entry = view.nft_entries.get(&key).cloned().ok_or(ConnectError::NftNotFound)?;
    if entry.owner != *transactor {
        return Err(ConnectError::NotNftOwner);
    }
    if payload.bid_amount_nanos < entry.min_bid_amount_nanos {
        return Err(ConnectError::BidBelowMinimum);
    }

    view.debit(
        journal,
        BalanceKey::deso(payload.bidder.clone()),
        U256::from(payload.bid_amount_nanos),
    )?;
    view.credit(journal, BalanceKey::deso(transactor.clone()), U256::from(payload.bid_amount_nanos));

    entry.owner = payload.bidder.clone();
    entry.is_for_sale = false;
    entry.last_accepted_bid_amount_nanos = payload.bid_amount_nanos;
    set_entry(view, journal, key, Some(entry));
    Ok(())
}

pub fn connect_transfer(
    view: &mut LedgerView,
    journal: &mut Journal,
    transactor: &Pkid,
    payload: &NftTransferPayload,
) -> Result<(), ConnectError> {
    let key = (payload.post_hash.clone(), payload.serial_number);
    let mut entry = view.nft_entries.get(&key).cloned().ok_or(ConnectError::NftNotFound)?;
    if entry.owner != *transactor {
        return Err(ConnectError::NotNftOwner);
    }
    entry.owner = payload.recipient.clone();
    entry.is_pending = true;
    set_entry(view, journal, key, Some(entry));
    Ok(())
}

pub fn connect_burn(
    view: &mut LedgerView,
    journal: &mut Journal,
    transactor: &Pkid,
    payload: &NftBurnPayload,
) -> Result<(), ConnectError> {
    let key = (payload.post_hash.clone(), payload.serial_number);
    let entry = view.nft_entries.get(&key).cloned().ok_or(ConnectError::NftNotFound)?;
    if entry.owner != *transactor {
        return Err(ConnectError::NotNftOwner);
    }
    set_entry(view, journal, key, None);
    Ok(())
}

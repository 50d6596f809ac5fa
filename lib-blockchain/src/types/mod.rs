//! Shared data model types used across the ledger view, mempool, and fork manager.

mod coin;
mod nonce;
mod pkid;

pub use coin::CoinKind;
pub use nonce::TransactionNonce;
pub use pkid::Pkid;

pub use lib_crypto::Hash;
use lib_crypto::PublicKey;
use serde::{Deserialize, Serialize};

/// A `(holder, creator, kind)` key into the balance ledger.
///
/// Every non-DESO balance is scoped to the creator whose coin it is; DESO
/// balances use `creator == holder` by convention so the same key type
/// covers both without a separate map.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BalanceKey {
    pub holder: Pkid,
    pub creator: Pkid,
    pub kind: CoinKind,
}

impl BalanceKey {
    pub fn deso(holder: Pkid) -> Self {
        Self {
            creator: holder.clone(),
            holder,
            kind: CoinKind::Deso,
        }
    }

    pub fn creator_coin(holder: Pkid, creator: Pkid) -> Self {
        Self {
            holder,
            creator,
            kind: CoinKind::CreatorCoin,
        }
    }

    pub fn dao_coin(holder: Pkid, creator: Pkid) -> Self {
        Self {
            holder,
            creator,
            kind: CoinKind::DaoCoin,
        }
    }

    pub fn stake_locked(holder: Pkid) -> Self {
        Self {
            creator: holder.clone(),
            holder,
            kind: CoinKind::StakeLocked,
        }
    }
}

/// Raw sender/recipient identity as carried on the wire. Ledger state never
/// indexes on this directly — see [`Pkid`].
pub type PubKey = PublicKey;

/// Block height, used everywhere expiration and epoch math is computed.
pub type BlockHeight = u64;

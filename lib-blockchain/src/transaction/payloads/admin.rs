use lib_crypto::PublicKey;
use serde::{Deserialize, Serialize};

use crate::types::Pkid;

/// Negative values mean "do not change"; `update_global_params` connector
/// treats any non-negative field as an overwrite (§4.1).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GlobalParamsUpdatePayload {
    pub min_fee_per_kb_nanos: i64,
    pub max_mempool_bytes: i64,
    pub max_nft_copies: i64,
}

impl GlobalParamsUpdatePayload {
    pub const NO_CHANGE: i64 = -1;
}

/// Paramater-updater-only. Atomically exchanges `public_key <-> PKID` for
/// two targets (§4.1 Identity-Swap); all prior ledger entries keyed on
/// either PKID follow without rewriting.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IdentitySwapPayload {
    pub public_key_a: PublicKey,
    pub pkid_a: Pkid,
    pub public_key_b: PublicKey,
    pub pkid_b: Pkid,
}

use thiserror::Error;

use crate::ledger::ConnectError;

/// Rejections at mempool admission time (§4.2). `Connect` wraps the same
/// static/nonce/balance rules the Ledger View enforces, so a transaction
/// rejected here would also be rejected at block-connect time.
#[derive(Debug, Clone, Error)]
pub enum AdmitError {
    #[error(transparent)]
    Connect(#[from] ConnectError),

    #[error("signature does not verify")]
    InvalidSignature,

    #[error("a transaction with this (sender, nonce) is already admitted at fee-per-kb {existing}, new fee-per-kb {new} does not exceed it")]
    FeeNotHigherThanExisting { existing: u64, new: u64 },

    #[error("sender's total mempool fees would exceed their spendable balance")]
    SpendableBalanceExceeded,

    #[error("transaction is already present in the mempool")]
    AlreadyPresent,
}

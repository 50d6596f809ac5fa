use serde::{Deserialize, Serialize};

/// Replay-prevention and replace-by-fee key carried on every transaction.
///
/// Uniqueness invariant: for one sender PKID, at most one committed
/// transaction may exist with a given nonce (§3). `expiration_block_height`
/// additionally bounds how long the nonce stays admissible: a nonce whose
/// expiration is below the current height can never be connected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TransactionNonce {
    pub expiration_block_height: u64,
    pub partial_id: u64,
}

impl TransactionNonce {
    pub fn new(expiration_block_height: u64, partial_id: u64) -> Self {
        Self {
            expiration_block_height,
            partial_id,
        }
    }

    /// `spec.md` §8: "a transaction with expiration < H is rejected; at
    /// H-1 it is admitted" — i.e. the nonce is valid as long as the
    /// current height has not yet passed its expiration.
    pub fn is_valid_at_height(&self, current_height: u64) -> bool {
        self.expiration_block_height >= current_height
    }
}

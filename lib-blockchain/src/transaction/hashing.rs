use lib_crypto::Hash;

use super::core::Transaction;

/// Transaction identity: BLAKE3 over the bincode-serialized envelope.
/// Callers that need the wire size (for fee-per-kb math) should reuse the
/// same serialization rather than re-encoding.
pub fn hash_transaction(txn: &Transaction) -> Hash {
    let bytes = bincode::serialize(txn).expect("transaction must be serializable");
    Hash::from_bytes(&lib_crypto::hash_blake3(&bytes))
}

pub fn encoded_size(txn: &Transaction) -> usize {
    bincode::serialized_size(txn).expect("transaction must be serializable") as usize
}

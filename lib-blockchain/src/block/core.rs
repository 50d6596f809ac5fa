//! Block and header shapes for the Fast-HotStuff core (§4.3, §4.4).

use serde::{Deserialize, Serialize};

use crate::transaction::core::Transaction;
use crate::types::{BlockHeight, Hash, Pkid};

/// A quorum certificate: an aggregated BLS signature (opaque to this
/// crate, carried as raw bytes) over `(view, block_hash)` from a
/// supermajority of the epoch's validator set.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuorumCertificate {
    pub view: u64,
    pub block_hash: Hash,
    pub aggregate_signature: Vec<u8>,
    pub signer_bitmap: Vec<bool>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BlockHeader {
    pub version: u32,
    pub height: BlockHeight,
    pub view: u64,
    pub parent_hash: Hash,
    /// QC on the parent, proving the parent had quorum support at its
    /// own view before this block extended it.
    pub parent_qc: QuorumCertificate,
    pub merkle_root: Hash,
    pub timestamp: u64,
    pub proposer: Pkid,
    /// Signature over [`BlockHeader::signing_hash`] from `proposer`'s
    /// voting key, proving who actually built this block (§4.4
    /// "sign, apply locally, broadcast"). Opaque bytes here; the scheme
    /// (BLS) and verification live at the consensus layer, which holds
    /// the validator set needed to resolve a pkid to a public key.
    pub proposer_signature: Vec<u8>,
}

/// Fields covered by the proposer signature, excluding the signature
/// itself so the signed digest does not depend on its own value.
#[derive(Serialize)]
struct SigningPayload<'a> {
    version: u32,
    height: BlockHeight,
    view: u64,
    parent_hash: &'a Hash,
    parent_qc: &'a QuorumCertificate,
    merkle_root: &'a Hash,
    timestamp: u64,
    proposer: &'a Pkid,
}

impl BlockHeader {
    /// Digest the proposer signs and verifiers check against (§4.4).
    pub fn signing_hash(&self) -> Hash {
        let payload = SigningPayload {
            version: self.version,
            height: self.height,
            view: self.view,
            parent_hash: &self.parent_hash,
            parent_qc: &self.parent_qc,
            merkle_root: &self.merkle_root,
            timestamp: self.timestamp,
            proposer: &self.proposer,
        };
        let bytes = bincode::serialize(&payload).expect("header signing payload must be serializable");
        Hash::from_bytes(&lib_crypto::hash_blake3(&bytes))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Block {
    pub header: BlockHeader,
    pub transactions: Vec<Transaction>,
}

impl Block {
    pub fn height(&self) -> BlockHeight {
        self.header.height
    }

    pub fn view(&self) -> u64 {
        self.header.view
    }

    pub fn parent_hash(&self) -> &Hash {
        &self.header.parent_hash
    }

    pub fn is_genesis(&self) -> bool {
        self.header.height == 0
    }

    pub fn hash(&self) -> Hash {
        let bytes = bincode::serialize(&self.header).expect("block header must be serializable");
        Hash::from_bytes(&lib_crypto::hash_blake3(&bytes))
    }

    pub fn total_fees_nanos(&self) -> u64 {
        self.transactions.iter().map(|txn| txn.declared_fee_nanos).sum()
    }

    /// Merkle root over transaction hashes, recomputed to check against
    /// `header.merkle_root` (§4.3 step 1's implied static sanity).
    pub fn calculate_merkle_root(&self) -> Hash {
        if self.transactions.is_empty() {
            return Hash::from_bytes(&[0u8; 32]);
        }
        let mut level: Vec<Hash> = self
            .transactions
            .iter()
            .map(|txn| Hash::from_bytes(&lib_crypto::hash_blake3(&bincode::serialize(txn).expect("txn encodes"))))
            .collect();
        while level.len() > 1 {
            let mut next = Vec::with_capacity(level.len().div_ceil(2));
            for pair in level.chunks(2) {
                let mut bytes = pair[0].as_bytes().to_vec();
                let right = if pair.len() == 2 { pair[1].as_bytes() } else { pair[0].as_bytes() };
                bytes.extend_from_slice(right);
                next.push(Hash::from_bytes(&lib_crypto::hash_blake3(&bytes)));
            }
            level = next;
        }
        level.into_iter().next().expect("non-empty after loop")
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum BlockValidationError {
    #[error("merkle root does not match computed transaction root")]
    MerkleRootMismatch,
    #[error("block height does not follow parent height")]
    InvalidHeight,
    #[error("block view does not exceed parent view")]
    InvalidView,
    #[error("parent QC's block hash does not reference the claimed parent")]
    QcParentMismatch,
    #[error("block carries no proposer signature")]
    MissingProposerSignature,
}

/// Structural checks only; the proposer signature's cryptographic
/// validity is checked at the consensus layer, which holds the
/// validator set needed to resolve `proposer` to a public key.
pub fn validate_block_shape(block: &Block, parent_height: BlockHeight, parent_view: u64) -> Result<(), BlockValidationError> {
    if block.header.height != parent_height + 1 {
        return Err(BlockValidationError::InvalidHeight);
    }
    if block.header.view <= parent_view {
        return Err(BlockValidationError::InvalidView);
    }
    if block.header.parent_qc.block_hash != block.header.parent_hash {
        return Err(BlockValidationError::QcParentMismatch);
    }
    if block.calculate_merkle_root() != block.header.merkle_root {
        return Err(BlockValidationError::MerkleRootMismatch);
    }
    if block.header.proposer_signature.is_empty() {
        return Err(BlockValidationError::MissingProposerSignature);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::sample_pkid;

    fn valid_block() -> Block {
        let parent_hash = Hash::from_bytes(&[1u8; 32]);
        let header = BlockHeader {
            version: 1,
            height: 5,
            view: 3,
            parent_hash: parent_hash.clone(),
            parent_qc: QuorumCertificate {
                view: 2,
                block_hash: parent_hash,
                aggregate_signature: vec![],
                signer_bitmap: vec![],
            },
            merkle_root: Hash::from_bytes(&[0u8; 32]),
            timestamp: 0,
            proposer: sample_pkid(1),
            proposer_signature: vec![7],
        };
        Block {
            header,
            transactions: vec![],
        }
    }

    #[test]
    fn accepts_well_formed_block() {
        let block = valid_block();
        assert!(validate_block_shape(&block, 4, 2).is_ok());
    }

    #[test]
    fn rejects_block_with_wrong_height() {
        let block = valid_block();
        assert_eq!(
            validate_block_shape(&block, 10, 2),
            Err(BlockValidationError::InvalidHeight)
        );
    }

    #[test]
    fn rejects_block_whose_view_does_not_exceed_parent() {
        let block = valid_block();
        assert_eq!(
            validate_block_shape(&block, 4, 3),
            Err(BlockValidationError::InvalidView)
        );
    }

    #[test]
    fn rejects_qc_parent_mismatch() {
        let mut block = valid_block();
        block.header.parent_qc.block_hash = Hash::from_bytes(&[2u8; 32]);
        assert_eq!(
            validate_block_shape(&block, 4, 2),
            Err(BlockValidationError::QcParentMismatch)
        );
    }

    #[test]
    fn rejects_merkle_root_mismatch() {
        let mut block = valid_block();
        block.header.merkle_root = Hash::from_bytes(&[9u8; 32]);
        assert_eq!(
            validate_block_shape(&block, 4, 2),
            Err(BlockValidationError::MerkleRootMismatch)
        );
    }

    #[test]
    fn rejects_missing_proposer_signature() {
        let mut block = valid_block();
        block.header.proposer_signature = vec![];
        assert_eq!(
            validate_block_shape(&block, 4, 2),
            Err(BlockValidationError::MissingProposerSignature)
        );
    }
}

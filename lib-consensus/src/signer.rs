//! The BLS signing boundary (spec §6 "Signer"). The teacher signs
//! everything with post-quantum Dilithium via `lib_crypto`; votes here
//! need to aggregate into quorum certificates, which Dilithium does not
//! support, so this boundary is BLS-specific and new.

use blst::min_pk::{AggregateSignature, PublicKey as BlsPublicKey, SecretKey, Signature as BlsSignature};
use thiserror::Error;

const DST: &[u8] = b"FASTHOTSTUFF_BLS_SIG_BLS12381G1_XMD:SHA-256_SSWU_RO_NUL_";

#[derive(Debug, Error)]
pub enum SignerError {
    #[error("invalid BLS secret key material")]
    InvalidSecretKey,
    #[error("BLS signature did not verify")]
    InvalidSignature,
    #[error("no signatures to aggregate")]
    EmptyAggregate,
}

/// Input: `(view, hash)` for a vote, or `(view, high_qc_view)` for a
/// timeout. Output: a BLS partial signature over the encoded pair.
pub trait Signer: Send + Sync {
    fn sign(&self, view: u64, payload: &[u8]) -> Vec<u8>;
    fn public_key_bytes(&self) -> Vec<u8>;
}

pub struct BlsSigner {
    secret_key: SecretKey,
    public_key: BlsPublicKey,
}

impl BlsSigner {
    pub fn from_seed(seed: &[u8]) -> Result<Self, SignerError> {
        let secret_key = SecretKey::key_gen(seed, &[]).map_err(|_| SignerError::InvalidSecretKey)?;
        let public_key = secret_key.sk_to_pk();
        Ok(Self { secret_key, public_key })
    }

    fn message(view: u64, payload: &[u8]) -> Vec<u8> {
        let mut message = Vec::with_capacity(8 + payload.len());
        message.extend_from_slice(&view.to_le_bytes());
        message.extend_from_slice(payload);
        message
    }
}

impl Signer for BlsSigner {
    fn sign(&self, view: u64, payload: &[u8]) -> Vec<u8> {
        let message = Self::message(view, payload);
        self.secret_key.sign(&message, DST, &[]).to_bytes().to_vec()
    }

    fn public_key_bytes(&self) -> Vec<u8> {
        self.public_key.to_bytes().to_vec()
    }
}

/// Verifies one partial signature against a raw public key's bytes.
pub fn verify_partial(public_key_bytes: &[u8], view: u64, payload: &[u8], signature: &[u8]) -> Result<(), SignerError> {
    let public_key = BlsPublicKey::from_bytes(public_key_bytes).map_err(|_| SignerError::InvalidSignature)?;
    let signature = BlsSignature::from_bytes(signature).map_err(|_| SignerError::InvalidSignature)?;
    let message = BlsSigner::message(view, payload);
    let result = signature.verify(true, &message, DST, &[], &public_key, true);
    if result == blst::BLST_ERROR::BLST_SUCCESS {
        Ok(())
    } else {
        Err(SignerError::InvalidSignature)
    }
}

/// Aggregates a quorum's partial signatures into the `aggregate_signature`
/// bytes carried on a `QuorumCertificate`.
pub fn aggregate(signatures: &[Vec<u8>]) -> Result<Vec<u8>, SignerError> {
    let parsed: Vec<BlsSignature> = signatures
        .iter()
        .map(|bytes| BlsSignature::from_bytes(bytes).map_err(|_| SignerError::InvalidSignature))
        .collect::<Result<_, _>>()?;
    let refs: Vec<&BlsSignature> = parsed.iter().collect();
    let aggregate = AggregateSignature::aggregate(&refs, true).map_err(|_| SignerError::EmptyAggregate)?;
    Ok(aggregate.to_signature().to_bytes().to_vec())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn signer(byte: u8) -> BlsSigner {
        BlsSigner::from_seed(&[byte; 32]).unwrap()
    }

    #[test]
    fn a_partial_signature_verifies_against_its_own_public_key() {
        let signer = signer(1);
        let sig = signer.sign(7, b"block-digest");
        verify_partial(&signer.public_key_bytes(), 7, b"block-digest", &sig).unwrap();
    }

    #[test]
    fn verification_fails_against_the_wrong_view() {
        let signer = signer(1);
        let sig = signer.sign(7, b"block-digest");
        assert!(verify_partial(&signer.public_key_bytes(), 8, b"block-digest", &sig).is_err());
    }

    #[test]
    fn verification_fails_against_a_different_signer() {
        let signer_a = signer(1);
        let signer_b = signer(2);
        let sig = signer_a.sign(7, b"block-digest");
        assert!(verify_partial(&signer_b.public_key_bytes(), 7, b"block-digest", &sig).is_err());
    }

    #[test]
    fn aggregate_signature_combines_partials_over_the_same_message() {
        let signer_a = signer(1);
        let signer_b = signer(2);
        let sig_a = signer_a.sign(7, b"block-digest");
        let sig_b = signer_b.sign(7, b"block-digest");

        let combined = aggregate(&[sig_a, sig_b]).unwrap();
        assert!(!combined.is_empty());
    }

    #[test]
    fn aggregate_of_empty_slice_errors() {
        assert!(aggregate(&[]).is_err());
    }
}

//! Signature verification, including the derived-key and metamask-assembled
//! variants recognized by the authorize-derived-key connector (§4.1).

use lib_crypto::verify_signature;
use lib_crypto::PublicKey;
use thiserror::Error;

use super::core::{Transaction, TxSignature};
use super::hashing::hash_transaction;

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum SignatureError {
    #[error("signature does not verify against the signer's public key")]
    Invalid,
    #[error("signature verification failed: {0}")]
    VerifyBackend(String),
}

/// Verifies the transaction's signature against whichever key actually
/// signed it: the sender's own key for `TxSignature::Plain`, or the
/// derived key for either derived-key variant (§4.1: "a txn signed by the
/// derived key itself is permitted").
pub fn verify_transaction_signature(txn: &Transaction) -> Result<(), SignatureError> {
    let signing_key = txn.signature.signer_public_key(&txn.sender_public_key);
    let message = signing_message(txn);
    verify_raw(&message, txn.signature.raw_signature().signature.as_slice(), signing_key)
}

fn signing_message(txn: &Transaction) -> Vec<u8> {
    // The signature covers everything but itself: re-hash with the
    // signature field absent by hashing a copy that zeroes it out would
    // require mutation, so instead we hash the canonical pre-signature
    // encoding directly.
    let mut unsigned = txn.clone();
    unsigned.signature = TxSignature::Plain(lib_crypto::Signature {
        signature: Vec::new(),
        public_key: txn.sender_public_key.clone(),
        algorithm: lib_crypto::SignatureAlgorithm::Dilithium2,
        timestamp: 0,
    });
    hash_transaction(&unsigned).as_bytes().to_vec()
}

fn verify_raw(message: &[u8], signature: &[u8], public_key: &PublicKey) -> Result<(), SignatureError> {
    let ok = verify_signature(message, signature, &public_key.dilithium_pk)
        .map_err(|e| SignatureError::VerifyBackend(e.to_string()))?;
    if ok {
        Ok(())
    } else {
        Err(SignatureError::Invalid)
    }
}

/// Access-signature message for an authorize-derived-key transaction:
/// `derived_public_key || expiration_height [|| spending_limit_bytes]`,
/// or after the metamask fork the canonical UTF-8 string form.
pub fn derived_key_access_message(
    derived_public_key: &PublicKey,
    expiration_block_height: u64,
    spending_limit_bytes: Option<&[u8]>,
    is_metamask: bool,
) -> Vec<u8> {
    if is_metamask {
        let mut s = format!(
            "Authorize Derived Key\nDerived Public Key: {}\nExpiration Block: {}",
            hex::encode(&derived_public_key.dilithium_pk),
            expiration_block_height
        );
        if let Some(bytes) = spending_limit_bytes {
            s.push_str(&format!("\nSpending Limit: {}", hex::encode(bytes)));
        }
        s.into_bytes()
    } else {
        let mut message = derived_public_key.dilithium_pk.clone();
        message.extend_from_slice(&expiration_block_height.to_le_bytes());
        if let Some(bytes) = spending_limit_bytes {
            message.extend_from_slice(bytes);
        }
        message
    }
}

pub fn verify_access_signature(
    owner_public_key: &PublicKey,
    access_signature: &[u8],
    derived_public_key: &PublicKey,
    expiration_block_height: u64,
    spending_limit_bytes: Option<&[u8]>,
    is_metamask: bool,
) -> Result<(), SignatureError> {
    let message = derived_key_access_message(
        derived_public_key,
        expiration_block_height,
        spending_limit_bytes,
        is_metamask,
    );
    verify_raw(&message, access_signature, owner_public_key)
}

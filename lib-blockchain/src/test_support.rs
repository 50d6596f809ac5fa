//! Shared fixtures for unit tests across this crate. Not part of the public API.
#![cfg(test)]

use std::collections::HashMap;
use std::sync::Arc;

use lib_crypto::{PublicKey, Signature, SignatureAlgorithm};
use lib_storage::MemoryBackend;

use crate::ledger::view::{LedgerConfig, LedgerView};
use crate::transaction::core::{Transaction, TransactionPayload, TxOutput, TxSignature};
use crate::types::{BlockHeight, Pkid, TransactionNonce};

pub fn sample_public_key(seed: u8) -> PublicKey {
    PublicKey {
        dilithium_pk: vec![seed; 1312],
        kyber_pk: vec![seed; 800],
        key_id: [seed; 32],
    }
}

pub fn sample_pkid(seed: u8) -> Pkid {
    Pkid::from_public_key(&sample_public_key(seed))
}

pub fn dummy_signature(pk: &PublicKey) -> TxSignature {
    TxSignature::Plain(Signature {
        signature: vec![0u8; 2420],
        public_key: pk.clone(),
        algorithm: SignatureAlgorithm::Dilithium2,
        timestamp: 0,
    })
}

/// `declared_fee_nanos` is derived from the encoded size so it always
/// agrees with `fee_per_kb_nanos`, matching what `connect_transaction`'s
/// fee-consistency check requires.
pub fn sample_transaction(seed: u8) -> Transaction {
    let sender = sample_public_key(seed);
    let signature = dummy_signature(&sender);
    let fee_per_kb_nanos = 2_000;
    let mut txn = Transaction {
        version: 1,
        sender_public_key: sender,
        outputs: vec![TxOutput {
            recipient: sample_pkid(seed.wrapping_add(1)),
            amount_nanos: 1_000,
        }],
        payload: TransactionPayload::BasicTransfer,
        extra_data: HashMap::new(),
        fee_per_kb_nanos,
        declared_fee_nanos: 0,
        nonce: TransactionNonce::new(1_000, seed as u64),
        signature,
    };
    let size_kb = crate::transaction::hashing::encoded_size(&txn).div_ceil(1024).max(1) as u64;
    txn.declared_fee_nanos = size_kb * fee_per_kb_nanos;
    txn
}

/// Builds a transaction signed by a freshly generated, genuinely valid
/// Dilithium2 keypair, for the handful of tests that exercise
/// `connect_transaction`'s signature verification rather than stubbing
/// around it with [`dummy_signature`].
pub fn sample_signed_transaction(recipient: Pkid, amount_nanos: u64, nonce: TransactionNonce) -> Transaction {
    let keypair = lib_crypto::generate_keypair().expect("keypair generation succeeds");
    let fee_per_kb_nanos = 2_000;

    let mut txn = Transaction {
        version: 1,
        sender_public_key: keypair.public_key.clone(),
        outputs: vec![TxOutput {
            recipient,
            amount_nanos,
        }],
        payload: TransactionPayload::BasicTransfer,
        extra_data: HashMap::new(),
        fee_per_kb_nanos,
        declared_fee_nanos: 0,
        nonce,
        signature: dummy_signature(&keypair.public_key),
    };
    let size_kb = crate::transaction::hashing::encoded_size(&txn).div_ceil(1024).max(1) as u64;
    txn.declared_fee_nanos = size_kb * fee_per_kb_nanos;

    // Matches the zeroing transform `verify_transaction_signature` applies
    // before hashing, so the message signed here is exactly what gets
    // re-derived and checked at verification time.
    let mut unsigned = txn.clone();
    unsigned.signature = TxSignature::Plain(Signature {
        signature: Vec::new(),
        public_key: txn.sender_public_key.clone(),
        algorithm: SignatureAlgorithm::Dilithium2,
        timestamp: 0,
    });
    let message = crate::transaction::hashing::hash_transaction(&unsigned).as_bytes().to_vec();
    let real_signature = keypair.sign(&message).expect("signing succeeds");
    txn.signature = TxSignature::Plain(real_signature);
    txn
}

pub fn sample_ledger_config() -> LedgerConfig {
    LedgerConfig {
        param_updater: sample_pkid(0),
        min_validator_stake_nanos: 1_000_000,
        unbonding_height_delta: 100,
        epoch_length_blocks: 10,
        validator_snapshot_lookback: 1,
        fork_heights: HashMap::new(),
    }
}

pub fn sample_ledger_view(height: BlockHeight) -> LedgerView {
    LedgerView::new(sample_ledger_config(), height, Arc::new(MemoryBackend::new()))
}

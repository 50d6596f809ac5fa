//! Authorize-derived-key connector (§3, §4.1).

use lib_crypto::PublicKey;

use crate::ledger::errors::ConnectError;
use crate::ledger::journal::{Journal, Op};
use crate::ledger::view::{LedgerView, METAMASK_SIGNATURE_FORK};
use crate::transaction::payloads::derived_key::{
    AuthorizeDerivedKeyPayload, DerivedKeyEntry, DerivedKeyOperation, SpendingLimitTracker,
};
use crate::transaction::signing::verify_access_signature;
use crate::types::Pkid;

pub fn connect(
    view: &mut LedgerView,
    journal: &mut Journal,
    owner: &Pkid,
    owner_public_key: &PublicKey,
    payload: &AuthorizeDerivedKeyPayload,
) -> Result<(), ConnectError> {
    if payload.is_metamask_signature && !view.config().fork_active(METAMASK_SIGNATURE_FORK, view.height()) {
        return Err(ConnectError::FeatureNotYetActive(METAMASK_SIGNATURE_FORK));
    }

    let spending_limit_bytes = payload
        .spending_limit
        .as_ref()
        .map(|limit| bincode::serialize(limit).expect("spending limit encodes"));

    verify_access_signature(
        owner_public_key,
        &payload.access_signature,
        &payload.derived_public_key,
        payload.expiration_block_height,
        spending_limit_bytes.as_deref(),
        payload.is_metamask_signature,
    )
    .map_err(|_| ConnectError::InvalidSignature)?;

    let key = (owner.clone(), payload.derived_public_key.dilithium_pk.clone());
    let existing = view.derived_keys.get(&key).cloned();

    if let Some(existing) = &existing {
        if existing.operation == DerivedKeyOperation::Invalid {
            return Err(ConnectError::DerivedKeyDeleted);
        }
    }

    let new_entry = match payload.operation {
        DerivedKeyOperation::Invalid => {
            let mut entry = existing.clone().unwrap_or_else(|| DerivedKeyEntry {
                owner: owner.clone(),
                derived_public_key: payload.derived_public_key.clone(),
                expiration_block_height: payload.expiration_block_height,
                operation: DerivedKeyOperation::Invalid,
                limit: payload
                    .spending_limit
                    .clone()
                    .unwrap_or_else(crate::transaction::payloads::derived_key::SpendingLimit::unlimited),
                tracker: SpendingLimitTracker::from_limit(
                    &payload
                        .spending_limit
                        .clone()
                        .unwrap_or_else(crate::transaction::payloads::derived_key::SpendingLimit::unlimited),
                ),
                extra_data: payload.extra_data.clone(),
            });
            entry.operation = DerivedKeyOperation::Invalid;
            entry
        }
        DerivedKeyOperation::Valid => {
            let limit = payload
                .spending_limit
                .clone()
                .or_else(|| existing.as_ref().map(|e| e.limit.clone()))
                .unwrap_or_else(crate::transaction::payloads::derived_key::SpendingLimit::unlimited);
            let tracker = SpendingLimitTracker::from_limit(&limit);
            DerivedKeyEntry {
                owner: owner.clone(),
                derived_public_key: payload.derived_public_key.clone(),
                expiration_block_height: payload.expiration_block_height,
                operation: DerivedKeyOperation::Valid,
                limit,
                tracker,
                extra_data: payload.extra_data.clone(),
            }
        }
    };

    journal.push(Op::SetDerivedKey {
        owner: owner.clone(),
        derived_key_id: key.1.clone(),
        prev: existing,
    });
    view.derived_keys.insert(key, new_entry);
    Ok(())
}

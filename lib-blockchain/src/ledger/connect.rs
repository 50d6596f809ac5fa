//! Top-level `connect_transaction` algorithm (§4.1).

use primitive_types::U256;

use crate::ledger::connectors::{access_group, admin, coins, dao_coin_transfer, derived_key, limit_order, nft, social, validator};
use crate::ledger::errors::ConnectError;
use crate::ledger::journal::{Journal, Op};
use crate::ledger::view::LedgerView;
use crate::transaction::core::{Transaction, TransactionPayload, TxSignature};
use crate::transaction::payloads::derived_key::implied_deso_spend;
use crate::transaction::signing::verify_transaction_signature;
use crate::types::BalanceKey;

/// Everything `connect_transaction` hands back to a caller that needs more
/// than the reversal journal: the accounting a block or mempool replay
/// checks against (§4.1, §8).
pub struct ConnectOutcome {
    pub journal: Journal,
    /// Total nanos debited from the sender: outputs plus the fee.
    pub total_input_nanos: u64,
    /// Total nanos credited to `txn.outputs`.
    pub total_output_nanos: u64,
    pub fee_nanos: u64,
}

/// Connects one transaction to `view`, returning the journal needed to
/// reverse it plus its input/output/fee accounting. Mutation is
/// transactional only in the sense that every write before a failing step
/// is still recorded on the journal and must be unwound by the caller via
/// `disconnect_transaction` if it chooses not to keep a partially-applied
/// view (§7: the view is expected to be discarded on error in practice,
/// not patched up).
///
/// `verify_signatures` is false only for trusted replay of blocks whose
/// signatures were already checked once (e.g. re-deriving a view from a
/// locally-committed chain); normal ingress always passes `true`.
pub fn connect_transaction(view: &mut LedgerView, txn: &Transaction, verify_signatures: bool) -> Result<ConnectOutcome, ConnectError> {
    view.validate_static_sanity(txn)?;

    let sender = view.resolve_pkid(&txn.sender_public_key);
    view.validate_transaction_nonce(&sender, &txn.nonce)?;

    if verify_signatures {
        verify_transaction_signature(txn).map_err(|_| ConnectError::InvalidSignature)?;
    }

    let mut journal = Journal::new();

    if let TxSignature::DerivedKey {
        derived_public_key, ..
    }
    | TxSignature::DerivedKeyMetamask {
        derived_public_key, ..
    } = &txn.signature
    {
        apply_derived_key_spend(view, &mut journal, &sender, derived_public_key, txn)?;
    }

    for output in &txn.outputs {
        view.debit(&mut journal, BalanceKey::deso(sender.clone()), U256::from(output.amount_nanos))?;
        view.credit(&mut journal, BalanceKey::deso(output.recipient.clone()), U256::from(output.amount_nanos));
    }

    dispatch(view, &mut journal, &sender, txn)?;

    let fee_floor = fee_floor_nanos(view, txn);
    if txn.declared_fee_nanos < fee_floor {
        return Err(ConnectError::FeeBelowFloor {
            declared: txn.declared_fee_nanos,
            floor: fee_floor,
        });
    }
    let required_fee = required_fee_nanos(txn);
    if txn.declared_fee_nanos != required_fee {
        return Err(ConnectError::FeeMismatch {
            declared: txn.declared_fee_nanos,
            required: required_fee,
        });
    }
    view.debit(&mut journal, BalanceKey::deso(sender.clone()), U256::from(txn.declared_fee_nanos))?;

    view.mark_nonce_used(&mut journal, sender, txn.nonce);
    journal.push(Op::TxnTypeTag(txn.payload.type_tag()));

    let total_output_nanos = txn.total_output_nanos();
    Ok(ConnectOutcome {
        journal,
        total_input_nanos: total_output_nanos + txn.declared_fee_nanos,
        total_output_nanos,
        fee_nanos: txn.declared_fee_nanos,
    })
}

fn fee_floor_nanos(view: &LedgerView, txn: &Transaction) -> u64 {
    let size_bytes = crate::transaction::hashing::encoded_size(txn) as u64;
    let size_kb = size_bytes.div_ceil(1024).max(1);
    size_kb * view.global_params().min_fee_per_kb_nanos
}

/// The fee `declared_fee_nanos` must equal: `fee_per_kb_nanos` times the
/// transaction's encoded size in kilobytes (§4.1 step 4 "reject if fee
/// differs from the fee declared in the txn" — the txn declares its fee
/// two ways, and they must agree).
fn required_fee_nanos(txn: &Transaction) -> u64 {
    let size_bytes = crate::transaction::hashing::encoded_size(txn) as u64;
    let size_kb = size_bytes.div_ceil(1024).max(1);
    size_kb * txn.fee_per_kb_nanos
}

fn apply_derived_key_spend(
    view: &mut LedgerView,
    journal: &mut Journal,
    owner: &crate::types::Pkid,
    derived_public_key: &lib_crypto::PublicKey,
    txn: &Transaction,
) -> Result<(), ConnectError> {
    let key = (owner.clone(), derived_public_key.dilithium_pk.clone());
    let mut entry = view
        .derived_keys
        .get(&key)
        .cloned()
        .ok_or(ConnectError::DerivedKeyNotAuthorized)?;

    if entry.operation != crate::transaction::payloads::derived_key::DerivedKeyOperation::Valid {
        return Err(ConnectError::DerivedKeyNotAuthorized);
    }
    if entry.expiration_block_height < view.height() {
        return Err(ConnectError::DerivedKeyExpired);
    }

    if !entry.limit.is_unlimited {
        let type_tag = txn.payload.type_tag();
        if let Some(remaining) = entry.tracker.remaining_transaction_count.get_mut(type_tag) {
            if *remaining == 0 {
                return Err(ConnectError::TxnTypeNotAuthorized);
            }
            *remaining -= 1;
        } else {
            return Err(ConnectError::TxnTypeNotAuthorized);
        }

        let implied_spend = implied_deso_spend(txn.total_output_nanos());
        let remaining_deso = U256::from(entry.tracker.remaining_global_deso_nanos);
        if implied_spend > remaining_deso {
            return Err(ConnectError::SpendingLimitExceeded);
        }
        entry.tracker.remaining_global_deso_nanos -= implied_spend.as_u64();
    }

    let prev = view.derived_keys.get(&key).cloned();
    journal.push(Op::SetDerivedKey {
        owner: owner.clone(),
        derived_key_id: key.1.clone(),
        prev,
    });
    view.derived_keys.insert(key, entry);
    Ok(())
}

fn dispatch(
    view: &mut LedgerView,
    journal: &mut Journal,
    sender: &crate::types::Pkid,
    txn: &Transaction,
) -> Result<(), ConnectError> {
    match &txn.payload {
        TransactionPayload::BasicTransfer => Ok(()),
        TransactionPayload::AuthorizeDerivedKey(payload) => {
            derived_key::connect(view, journal, sender, &txn.sender_public_key, payload)
        }
        TransactionPayload::AccessGroupCreate(payload) => access_group::connect_create(view, journal, sender, payload),
        TransactionPayload::AccessGroupMembers(payload) => {
            access_group::connect_members(view, journal, sender, payload)
        }
        TransactionPayload::CreatorCoin(payload) => coins::connect_creator_coin(view, journal, sender, payload),
        TransactionPayload::DaoCoin(payload) => coins::connect_dao_coin(view, journal, sender, payload),
        TransactionPayload::DaoCoinTransfer(payload) => dao_coin_transfer::connect(view, journal, sender, payload),
        TransactionPayload::DaoCoinLimitOrder(payload) => {
            limit_order::connect(view, journal, sender, payload, view.height())
        }
        TransactionPayload::Nft(payload) => dispatch_nft(view, journal, sender, payload),
        TransactionPayload::SubmitPost(payload) => social::connect_submit_post(view, journal, sender, payload),
        TransactionPayload::UpdateProfile(payload) => social::connect_update_profile(view, journal, sender, payload),
        TransactionPayload::UpdateGlobalParams(payload) => {
            admin::connect_update_global_params(view, journal, sender, payload)
        }
        TransactionPayload::IdentitySwap(payload) => admin::connect_identity_swap(view, journal, sender, payload),
        TransactionPayload::RegisterValidator(payload) => validator::connect_register(view, journal, sender, payload),
        TransactionPayload::UnregisterValidator(payload) => {
            validator::connect_unregister(view, journal, sender, payload)
        }
        TransactionPayload::Stake(payload) => validator::connect_stake(view, journal, sender, payload),
        TransactionPayload::Unstake(payload) => validator::connect_unstake(view, journal, sender, payload),
        TransactionPayload::UnjailValidator(payload) => validator::connect_unjail(view, journal, sender, payload),
    }
}

fn dispatch_nft(
    view: &mut LedgerView,
    journal: &mut Journal,
    sender: &crate::types::Pkid,
    payload: &crate::transaction::payloads::nft::NftPayload,
) -> Result<(), ConnectError> {
    use crate::transaction::payloads::nft::NftPayload;
    match payload {
        NftPayload::Create(p) => nft::connect_create(view, journal, sender, p),
        NftPayload::Update(p) => nft::connect_update(view, journal, sender, p),
        NftPayload::Bid(p) => nft::connect_bid(view, p),
        NftPayload::AcceptBid(p) => nft::connect_accept_bid(view, journal, sender, p),
        NftPayload::Transfer(p) => nft::connect_transfer(view, journal, sender, p),
        NftPayload::Burn(p) => nft::connect_burn(view, journal, sender, p),
    }
}

//! Identity-swap and global-params-update connectors, both gated on the
//! configured parameter updater (§3, §4.1).

use crate::ledger::errors::ConnectError;
use crate::ledger::journal::Op;
use crate::ledger::view::LedgerView;
use crate::ledger::Journal;
use crate::transaction::payloads::admin::{GlobalParamsUpdatePayload, IdentitySwapPayload};
use crate::types::Pkid;

pub fn connect_identity_swap(
    view: &mut LedgerView,
    journal: &mut Journal,
    transactor: &Pkid,
    payload: &IdentitySwapPayload,
) -> Result<(), ConnectError> {
    if *transactor != view.config.param_updater {
        return Err(ConnectError::NotParamUpdater);
    }

    let prev_a = view.pkid_bindings.get(&payload.public_key_a.dilithium_pk).cloned();
    journal.push(Op::SetPkidBinding {
        public_key: payload.public_key_a.clone(),
        prev: prev_a,
    });
    view.pkid_bindings
        .insert(payload.public_key_a.dilithium_pk.clone(), payload.pkid_b.clone());

    let prev_b = view.pkid_bindings.get(&payload.public_key_b.dilithium_pk).cloned();
    journal.push(Op::SetPkidBinding {
        public_key: payload.public_key_b.clone(),
        prev: prev_b,
    });
    view.pkid_bindings
        .insert(payload.public_key_b.dilithium_pk.clone(), payload.pkid_a.clone());

    Ok(())
}

pub fn connect_update_global_params(
    view: &mut LedgerView,
    journal: &mut Journal,
    transactor: &Pkid,
    payload: &GlobalParamsUpdatePayload,
) -> Result<(), ConnectError> {
    if *transactor != view.config.param_updater {
        return Err(ConnectError::NotGlobalParamsUpdater);
    }

    let mut params = view.global_params.clone();
    if payload.min_fee_per_kb_nanos != GlobalParamsUpdatePayload::NO_CHANGE {
        params.min_fee_per_kb_nanos = payload.min_fee_per_kb_nanos as u64;
    }
    if payload.max_mempool_bytes != GlobalParamsUpdatePayload::NO_CHANGE {
        params.max_mempool_bytes = payload.max_mempool_bytes as u64;
    }
    if payload.max_nft_copies != GlobalParamsUpdatePayload::NO_CHANGE {
        params.max_nft_copies = payload.max_nft_copies as u32;
    }

    journal.push(Op::SetGlobalParams {
        prev: view.global_params.clone(),
    });
    view.global_params = params;
    Ok(())
}

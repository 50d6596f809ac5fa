//! DAO-coin transfer connector (§3, §4.1).

use crate::ledger::errors::ConnectError;
use crate::ledger::journal::Journal;
use crate::ledger::view::LedgerView;
use crate::transaction::payloads::coins::DaoCoinTransferPayload;
use crate::types::{BalanceKey, Pkid};

pub fn connect(
    view: &mut LedgerView,
    journal: &mut Journal,
    transactor: &Pkid,
    payload: &DaoCoinTransferPayload,
) -> Result<(), ConnectError> {
    if let Some(supply) = view.dao_supplies.get(&payload.creator) {
        if supply.transfer_restricted && *transactor != payload.creator && payload.recipient != payload.creator {
            return Err(ConnectError::OperationNotSupported);
        }
    }
    view.debit(
        journal,
        BalanceKey::dao_coin(transactor.clone(), payload.creator.clone()),
        payload.amount,
    )?;
    view.credit(
        journal,
        BalanceKey::dao_coin(payload.recipient.clone(), payload.creator.clone()),
        payload.amount,
    );
    Ok(())
}

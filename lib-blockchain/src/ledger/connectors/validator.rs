//! Validator-lifecycle connectors (SPEC_FULL.md §B): register, unregister,
//! stake, unstake, unjail. Jailing itself has no admission path here — it
//! is applied by the consensus controller, not by a transaction connector.

use crate::ledger::errors::ConnectError;
use crate::ledger::journal::Op;
use crate::ledger::state::{ValidatorEntry, ValidatorStatus};
use crate::ledger::view::LedgerView;
use crate::ledger::Journal;
use crate::transaction::payloads::validator::{
    RegisterValidatorPayload, StakePayload, UnjailValidatorPayload, UnregisterValidatorPayload, UnstakePayload,
};
use crate::types::{BalanceKey, Pkid};
use primitive_types::U256;

fn set_validator(view: &mut LedgerView, journal: &mut Journal, pkid: &Pkid, entry: Option<ValidatorEntry>) {
    let prev = view.validators.get(pkid).cloned();
    journal.push(Op::SetValidator {
        pkid: pkid.clone(),
        prev,
    });
    match entry {
        Some(e) => {
            view.validators.insert(pkid.clone(), e);
        }
        None => {
            view.validators.remove(pkid);
        }
    }
}

pub fn connect_register(
    view: &mut LedgerView,
    journal: &mut Journal,
    transactor: &Pkid,
    payload: &RegisterValidatorPayload,
) -> Result<(), ConnectError> {
    if view.validators.contains_key(transactor) {
        return Err(ConnectError::ValidatorAlreadyRegistered);
    }
    if payload.stake_amount_nanos < view.config.min_validator_stake_nanos {
        return Err(ConnectError::StakeBelowMinimum);
    }
    view.debit(
        journal,
        BalanceKey::deso(transactor.clone()),
        U256::from(payload.stake_amount_nanos),
    )?;
    view.credit(
        journal,
        BalanceKey::stake_locked(transactor.clone()),
        U256::from(payload.stake_amount_nanos),
    );
    set_validator(
        view,
        journal,
        transactor,
        Some(ValidatorEntry {
            pkid: transactor.clone(),
            voting_public_key: payload.voting_public_key.clone(),
            stake_amount_nanos: payload.stake_amount_nanos,
            commission_bps: payload.commission_bps,
            status: ValidatorStatus::Active,
            unbonding_at_height: None,
        }),
    );
    Ok(())
}

/// Unregistering does not immediately return the stake: it flips the
/// entry to `Inactive` with an `unbonding_at_height`, and the locked
/// balance is released by [`LedgerView::release_matured_unbonding`] once
/// that height is reached (SPEC_FULL.md §B).
pub fn connect_unregister(
    view: &mut LedgerView,
    journal: &mut Journal,
    transactor: &Pkid,
    _payload: &UnregisterValidatorPayload,
) -> Result<(), ConnectError> {
    let mut entry = view.validators.get(transactor).cloned().ok_or(ConnectError::ValidatorNotRegistered)?;
    entry.status = ValidatorStatus::Inactive;
    entry.unbonding_at_height = Some(view.height() + view.config.unbonding_height_delta);
    set_validator(view, journal, transactor, Some(entry));
    Ok(())
}

pub fn connect_stake(
    view: &mut LedgerView,
    journal: &mut Journal,
    transactor: &Pkid,
    payload: &StakePayload,
) -> Result<(), ConnectError> {
    let mut entry = view.validators.get(transactor).cloned().ok_or(ConnectError::ValidatorNotRegistered)?;
    view.debit(
        journal,
        BalanceKey::deso(transactor.clone()),
        U256::from(payload.additional_amount_nanos),
    )?;
    view.credit(
        journal,
        BalanceKey::stake_locked(transactor.clone()),
        U256::from(payload.additional_amount_nanos),
    );
    entry.stake_amount_nanos += payload.additional_amount_nanos;
    set_validator(view, journal, transactor, Some(entry));
    Ok(())
}

pub fn connect_unstake(
    view: &mut LedgerView,
    journal: &mut Journal,
    transactor: &Pkid,
    payload: &UnstakePayload,
) -> Result<(), ConnectError> {
    let mut entry = view.validators.get(transactor).cloned().ok_or(ConnectError::ValidatorNotRegistered)?;
    if payload.amount_nanos > entry.stake_amount_nanos {
        return Err(ConnectError::InsufficientStake);
    }
    view.debit(
        journal,
        BalanceKey::stake_locked(transactor.clone()),
        U256::from(payload.amount_nanos),
    )?;
    entry.stake_amount_nanos -= payload.amount_nanos;
    view.credit(journal, BalanceKey::deso(transactor.clone()), U256::from(payload.amount_nanos));
    set_validator(view, journal, transactor, Some(entry));
    Ok(())
}

pub fn connect_unjail(
    view: &mut LedgerView,
    journal: &mut Journal,
    transactor: &Pkid,
    _payload: &UnjailValidatorPayload,
) -> Result<(), ConnectError> {
    let mut entry = view.validators.get(transactor).cloned().ok_or(ConnectError::ValidatorNotRegistered)?;
    if entry.status != ValidatorStatus::Jailed {
        return Err(ConnectError::ValidatorNotJailed);
    }
    entry.status = ValidatorStatus::Active;
    entry.unbonding_at_height = None;
    set_validator(view, journal, transactor, Some(entry));
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ledger::journal::Journal;
    use crate::test_support::{sample_ledger_view, sample_pkid, sample_public_key};

    fn register_payload(stake: u64) -> RegisterValidatorPayload {
        RegisterValidatorPayload {
            voting_public_key: sample_public_key(9),
            stake_amount_nanos: stake,
            commission_bps: 500,
        }
    }

    #[test]
    fn register_debits_deso_and_credits_locked_stake() {
        let mut view = sample_ledger_view(0);
        let transactor = sample_pkid(1);
        view.set_balance(&mut Journal::new(), BalanceKey::deso(transactor.clone()), U256::from(5_000_000u64));

        let mut journal = Journal::new();
        connect_register(&mut view, &mut journal, &transactor, &register_payload(2_000_000)).unwrap();

        assert_eq!(view.get_balance(&BalanceKey::deso(transactor.clone())), U256::from(3_000_000u64));
        assert_eq!(view.get_balance(&BalanceKey::stake_locked(transactor.clone())), U256::from(2_000_000u64));
        let entry = view.get_validator(&transactor).unwrap();
        assert_eq!(entry.status, ValidatorStatus::Active);
        assert_eq!(entry.stake_amount_nanos, 2_000_000);
    }

    #[test]
    fn register_rejects_stake_below_minimum() {
        let mut view = sample_ledger_view(0);
        let transactor = sample_pkid(1);
        let err = connect_register(&mut view, &mut Journal::new(), &transactor, &register_payload(1)).unwrap_err();
        assert_eq!(err, ConnectError::StakeBelowMinimum);
    }

    #[test]
    fn register_rejects_already_registered() {
        let mut view = sample_ledger_view(0);
        let transactor = sample_pkid(1);
        view.set_balance(&mut Journal::new(), BalanceKey::deso(transactor.clone()), U256::from(5_000_000u64));
        connect_register(&mut view, &mut Journal::new(), &transactor, &register_payload(2_000_000)).unwrap();

        let err = connect_register(&mut view, &mut Journal::new(), &transactor, &register_payload(2_000_000)).unwrap_err();
        assert_eq!(err, ConnectError::ValidatorAlreadyRegistered);
    }

    #[test]
    fn unregister_sets_inactive_with_unbonding_height() {
        let mut view = sample_ledger_view(100);
        let transactor = sample_pkid(1);
        view.set_balance(&mut Journal::new(), BalanceKey::deso(transactor.clone()), U256::from(5_000_000u64));
        connect_register(&mut view, &mut Journal::new(), &transactor, &register_payload(2_000_000)).unwrap();

        connect_unregister(&mut view, &mut Journal::new(), &transactor, &UnregisterValidatorPayload).unwrap();

        let entry = view.get_validator(&transactor).unwrap();
        assert_eq!(entry.status, ValidatorStatus::Inactive);
        assert_eq!(entry.unbonding_at_height, Some(100 + view.config().unbonding_height_delta));
    }

    #[test]
    fn unbonding_stake_is_released_once_matured() {
        let mut view = sample_ledger_view(100);
        let transactor = sample_pkid(1);
        view.set_balance(&mut Journal::new(), BalanceKey::deso(transactor.clone()), U256::from(5_000_000u64));
        connect_register(&mut view, &mut Journal::new(), &transactor, &register_payload(2_000_000)).unwrap();
        connect_unregister(&mut view, &mut Journal::new(), &transactor, &UnregisterValidatorPayload).unwrap();

        let maturity = view.get_validator(&transactor).unwrap().unbonding_at_height.unwrap();
        view.height = maturity;
        view.release_matured_unbonding(&mut Journal::new());

        assert!(view.get_validator(&transactor).is_none());
        assert_eq!(view.get_balance(&BalanceKey::stake_locked(transactor.clone())), U256::zero());
        assert_eq!(view.get_balance(&BalanceKey::deso(transactor)), U256::from(5_000_000u64));
    }

    #[test]
    fn stake_and_unstake_update_locked_balance_and_entry() {
        let mut view = sample_ledger_view(0);
        let transactor = sample_pkid(1);
        view.set_balance(&mut Journal::new(), BalanceKey::deso(transactor.clone()), U256::from(5_000_000u64));
        connect_register(&mut view, &mut Journal::new(), &transactor, &register_payload(2_000_000)).unwrap();

        connect_stake(
            &mut view,
            &mut Journal::new(),
            &transactor,
            &StakePayload {
                additional_amount_nanos: 500_000,
            },
        )
        .unwrap();
        assert_eq!(view.get_validator(&transactor).unwrap().stake_amount_nanos, 2_500_000);
        assert_eq!(view.get_balance(&BalanceKey::stake_locked(transactor.clone())), U256::from(2_500_000u64));

        connect_unstake(
            &mut view,
            &mut Journal::new(),
            &transactor,
            &UnstakePayload { amount_nanos: 1_000_000 },
        )
        .unwrap();
        assert_eq!(view.get_validator(&transactor).unwrap().stake_amount_nanos, 1_500_000);
        assert_eq!(view.get_balance(&BalanceKey::deso(transactor.clone())), U256::from(1_500_000u64));
    }

    #[test]
    fn unstake_rejects_amount_exceeding_current_stake() {
        let mut view = sample_ledger_view(0);
        let transactor = sample_pkid(1);
        view.set_balance(&mut Journal::new(), BalanceKey::deso(transactor.clone()), U256::from(5_000_000u64));
        connect_register(&mut view, &mut Journal::new(), &transactor, &register_payload(2_000_000)).unwrap();

        let err = connect_unstake(
            &mut view,
            &mut Journal::new(),
            &transactor,
            &UnstakePayload {
                amount_nanos: 10_000_000,
            },
        )
        .unwrap_err();
        assert_eq!(err, ConnectError::InsufficientStake);
    }

    #[test]
    fn unjail_requires_jailed_status() {
        let mut view = sample_ledger_view(0);
        let transactor = sample_pkid(1);
        view.set_balance(&mut Journal::new(), BalanceKey::deso(transactor.clone()), U256::from(5_000_000u64));
        connect_register(&mut view, &mut Journal::new(), &transactor, &register_payload(2_000_000)).unwrap();

        let err = connect_unjail(&mut view, &mut Journal::new(), &transactor, &UnjailValidatorPayload).unwrap_err();
        assert_eq!(err, ConnectError::ValidatorNotJailed);

        let mut entry = view.get_validator(&transactor).unwrap().clone();
        entry.status = ValidatorStatus::Jailed;
        set_validator(&mut view, &mut Journal::new(), &transactor, Some(entry));

        connect_unjail(&mut view, &mut Journal::new(), &transactor, &UnjailValidatorPayload).unwrap();
        let entry = view.get_validator(&transactor).unwrap();
        assert_eq!(entry.status, ValidatorStatus::Active);
        assert!(entry.unbonding_at_height.is_none());
    }
}

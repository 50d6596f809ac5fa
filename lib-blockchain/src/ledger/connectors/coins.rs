//! Creator-coin and DAO-coin connectors (§3, §4.1).
//!
//! Creator coins use a simplified constant-reserve-ratio curve: the buy
//! price tracks `deso_locked / total_supply`, so a purchase mints
//! `floor(deso_in * total_supply / deso_locked)` coins (or, pre-genesis,
//! `deso_in` coins 1:1) and a sale pays out the symmetric amount. This
//! keeps the reserve solvent without needing the full bancor integral.

use primitive_types::U256;

use crate::ledger::errors::ConnectError;
use crate::ledger::journal::{Journal, Op};
use crate::ledger::view::LedgerView;
use crate::transaction::payloads::coins::{
    CreatorCoinOperation, CreatorCoinPayload, CreatorCoinSupply, DaoCoinOperation, DaoCoinPayload,
    DaoCoinSupply,
};
use crate::types::{BalanceKey, Pkid};

fn get_or_default_creator_coin_supply(view: &LedgerView, creator: &Pkid) -> CreatorCoinSupply {
    view.creator_coin_supplies
        .get(creator)
        .cloned()
        .unwrap_or(CreatorCoinSupply {
            total_supply: 0,
            deso_locked_nanos: 0,
            founder_reward_bps: std::collections::HashMap::new(),
        })
}

fn set_creator_coin_supply(view: &mut LedgerView, journal: &mut Journal, creator: &Pkid, supply: CreatorCoinSupply) {
    let prev = view.creator_coin_supplies.get(creator).cloned();
    journal.push(Op::SetCreatorCoinSupply {
        creator: creator.clone(),
        prev,
    });
    view.creator_coin_supplies.insert(creator.clone(), supply);
}

pub fn connect_creator_coin(
    view: &mut LedgerView,
    journal: &mut Journal,
    transactor: &Pkid,
    payload: &CreatorCoinPayload,
) -> Result<(), ConnectError> {
    let mut supply = get_or_default_creator_coin_supply(view, &payload.creator);

    match payload.operation {
        CreatorCoinOperation::Buy => {
            let minted = if supply.deso_locked_nanos == 0 || supply.total_supply == 0 {
                payload.amount
            } else {
                ((payload.amount as u128 * supply.total_supply as u128) / supply.deso_locked_nanos as u128) as u64
            };
            if minted < payload.min_amount_expected {
                return Err(ConnectError::InsufficientBalance(transactor.clone()));
            }
            view.debit(journal, BalanceKey::deso(transactor.clone()), U256::from(payload.amount))?;
            supply.deso_locked_nanos += payload.amount;
            supply.total_supply += minted;
            set_creator_coin_supply(view, journal, &payload.creator, supply);
            view.credit(
                journal,
                BalanceKey::creator_coin(transactor.clone(), payload.creator.clone()),
                U256::from(minted),
            );
        }
        CreatorCoinOperation::Sell => {
            if supply.total_supply == 0 {
                return Err(ConnectError::InsufficientSupply);
            }
            view.debit(
                journal,
                BalanceKey::creator_coin(transactor.clone(), payload.creator.clone()),
                U256::from(payload.amount),
            )?;
            let payout = ((payload.amount as u128 * supply.deso_locked_nanos as u128) / supply.total_supply as u128) as u64;
            if payout < payload.min_amount_expected {
                return Err(ConnectError::InsufficientBalance(transactor.clone()));
            }
            supply.total_supply = supply.total_supply.saturating_sub(payload.amount);
            supply.deso_locked_nanos = supply.deso_locked_nanos.saturating_sub(payout);
            set_creator_coin_supply(view, journal, &payload.creator, supply);
            view.credit(journal, BalanceKey::deso(transactor.clone()), U256::from(payout));
        }
        CreatorCoinOperation::AddFounderReward => {
            supply.founder_reward_bps.insert(transactor.clone(), payload.amount as u16);
            set_creator_coin_supply(view, journal, &payload.creator, supply);
        }
    }
    Ok(())
}

fn get_or_default_dao_supply(view: &LedgerView, creator: &Pkid) -> DaoCoinSupply {
    view.dao_supplies.get(creator).cloned().unwrap_or(DaoCoinSupply {
        total_supply: U256::zero(),
        minting_disabled: false,
        transfer_restricted: false,
    })
}

pub fn connect_dao_coin(
    view: &mut LedgerView,
    journal: &mut Journal,
    transactor: &Pkid,
    payload: &DaoCoinPayload,
) -> Result<(), ConnectError> {
    let mut supply = get_or_default_dao_supply(view, &payload.creator);

    match payload.operation {
        DaoCoinOperation::Mint => {
            if supply.minting_disabled {
                return Err(ConnectError::MintingDisabled);
            }
            supply.total_supply += payload.coins_to_mint_or_burn;
            let prev = view.dao_supplies.get(&payload.creator).cloned();
            journal.push(Op::SetDaoSupply {
                creator: payload.creator.clone(),
                prev,
            });
            view.dao_supplies.insert(payload.creator.clone(), supply);
            view.credit(
                journal,
                BalanceKey::dao_coin(transactor.clone(), payload.creator.clone()),
                payload.coins_to_mint_or_burn,
            );
        }
        DaoCoinOperation::Burn => {
            view.debit(
                journal,
                BalanceKey::dao_coin(transactor.clone(), payload.creator.clone()),
                payload.coins_to_mint_or_burn,
            )?;
            if supply.total_supply < payload.coins_to_mint_or_burn {
                return Err(ConnectError::InsufficientSupply);
            }
            supply.total_supply -= payload.coins_to_mint_or_burn;
            let prev = view.dao_supplies.get(&payload.creator).cloned();
            journal.push(Op::SetDaoSupply {
                creator: payload.creator.clone(),
                prev,
            });
            view.dao_supplies.insert(payload.creator.clone(), supply);
        }
        DaoCoinOperation::DisableMinting => {
            supply.minting_disabled = true;
            let prev = view.dao_supplies.get(&payload.creator).cloned();
            journal.push(Op::SetDaoSupply {
                creator: payload.creator.clone(),
                prev,
            });
            view.dao_supplies.insert(payload.creator.clone(), supply);
        }
        DaoCoinOperation::UpdateTransferRestrictionStatus => {
            supply.transfer_restricted = !supply.transfer_restricted;
            let prev = view.dao_supplies.get(&payload.creator).cloned();
            journal.push(Op::SetDaoSupply {
                creator: payload.creator.clone(),
                prev,
            });
            view.dao_supplies.insert(payload.creator.clone(), supply);
        }
    }
    Ok(())
}

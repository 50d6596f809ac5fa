//! DAO-coin limit-order connector: place/cancel and the matching engine
//! (§3, §4.1).
//!
//! Orders are matched maker-priority: a taker walks resting orders on the
//! opposite side best-price-first (ties broken by placement height), filling
//! at the resting order's own rate. There is no separate escrow step; a
//! resting order whose owner can no longer cover it is dropped from the
//! book rather than partially honored.

use primitive_types::U256;

use crate::ledger::errors::ConnectError;
use crate::ledger::journal::{Journal, Op};
use crate::ledger::view::LedgerView;
use crate::transaction::payloads::limit_order::{
    compute_buy_quantity, exchange_rate_scale, DaoCoinLimitOrderPayload, LimitOrderEntry, OrderFillType,
};
use crate::types::{BalanceKey, BlockHeight, Pkid};

pub fn connect(
    view: &mut LedgerView,
    journal: &mut Journal,
    transactor: &Pkid,
    payload: &DaoCoinLimitOrderPayload,
    height: BlockHeight,
) -> Result<(), ConnectError> {
    if let Some(cancel_id) = payload.cancel_order_id {
        return cancel_order(view, journal, transactor, cancel_id);
    }

    if payload.buying_coin_pkid == payload.selling_coin_pkid {
        return Err(ConnectError::SameBuySellCoin);
    }
    if payload.scaled_exchange_rate.is_zero() || payload.quantity_to_fill.is_zero() {
        return Err(ConnectError::ZeroRateOrQuantity);
    }

    let balance_key = BalanceKey::dao_coin(transactor.clone(), payload.selling_coin_pkid.clone());
    let available = view.get_balance(&balance_key);
    if available < payload.quantity_to_fill {
        return Err(ConnectError::InsufficientFundsToOpenOrder);
    }

    let mut remaining_sell = payload.quantity_to_fill;
    let scale = exchange_rate_scale();
    let (scale_squared, scale_squared_overflowed) = scale.overflowing_mul(scale);

    let mut candidate_ids: Vec<u64> = view
        .limit_orders
        .values()
        .filter(|o| o.buying_coin_pkid == payload.selling_coin_pkid && o.selling_coin_pkid == payload.buying_coin_pkid)
        .map(|o| o.order_id)
        .collect();
    candidate_ids.sort_by_key(|id| {
        let o = &view.limit_orders[id];
        (o.scaled_exchange_rate, o.block_height_placed, o.order_id)
    });

    for order_id in candidate_ids {
        if remaining_sell.is_zero() {
            break;
        }
        let resting = match view.limit_orders.get(&order_id) {
            Some(o) => o.clone(),
            None => continue,
        };
        if resting.transactor == *transactor {
            return Err(ConnectError::SelfMatch);
        }

        let (product, product_overflowed) = payload
            .scaled_exchange_rate
            .overflowing_mul(resting.scaled_exchange_rate);
        let price_compatible =
            !product_overflowed && !scale_squared_overflowed && product <= scale_squared;
        if !price_compatible {
            continue;
        }

        let buy_wanted = match compute_buy_quantity(remaining_sell, resting.scaled_exchange_rate) {
            Some(q) => q,
            None => continue,
        };
        let actual_buy = buy_wanted.min(resting.quantity_to_fill_remaining);
        if actual_buy.is_zero() {
            continue;
        }
        let actual_sell = (actual_buy * resting.scaled_exchange_rate) / scale;
        if actual_sell.is_zero() || actual_sell > remaining_sell {
            continue;
        }

        let resting_balance_key = BalanceKey::dao_coin(resting.transactor.clone(), resting.selling_coin_pkid.clone());
        if view.get_balance(&resting_balance_key) < actual_buy {
            remove_order(view, journal, order_id);
            continue;
        }

        view.debit(journal, resting_balance_key, actual_buy)?;
        view.credit(
            journal,
            BalanceKey::dao_coin(transactor.clone(), payload.buying_coin_pkid.clone()),
            actual_buy,
        );
        view.debit(
            journal,
            BalanceKey::dao_coin(transactor.clone(), payload.selling_coin_pkid.clone()),
            actual_sell,
        )?;
        view.credit(
            journal,
            BalanceKey::dao_coin(resting.transactor.clone(), payload.selling_coin_pkid.clone()),
            actual_sell,
        );

        remaining_sell -= actual_sell;

        let new_remaining = resting.quantity_to_fill_remaining - actual_buy;
        if new_remaining.is_zero() {
            remove_order(view, journal, order_id);
        } else {
            update_remaining(view, journal, order_id, new_remaining);
        }
    }

    match payload.fill_type {
        OrderFillType::FillOrKill => {
            if !remaining_sell.is_zero() {
                return Err(ConnectError::FillOrKillUnfilled);
            }
        }
        OrderFillType::ImmediateOrCancel => {
            // Any unfilled remainder is simply dropped, no resting entry.
        }
        OrderFillType::GoodTillCancelled => {
            if !remaining_sell.is_zero() {
                rest_order(view, journal, transactor, payload, remaining_sell, height);
            }
        }
    }

    Ok(())
}

fn rest_order(
    view: &mut LedgerView,
    journal: &mut Journal,
    transactor: &Pkid,
    payload: &DaoCoinLimitOrderPayload,
    remaining: U256,
    height: BlockHeight,
) {
    let order_id = view.next_order_id;
    journal.push(Op::SetNextOrderId { prev: order_id });
    view.next_order_id += 1;

    let entry = LimitOrderEntry {
        order_id,
        transactor: transactor.clone(),
        buying_coin_pkid: payload.buying_coin_pkid.clone(),
        selling_coin_pkid: payload.selling_coin_pkid.clone(),
        scaled_exchange_rate: payload.scaled_exchange_rate,
        quantity_to_fill_remaining: remaining,
        operation: payload.operation,
        fill_type: payload.fill_type,
        block_height_placed: height,
    };
    journal.push(Op::SetLimitOrder { order_id, prev: None });
    view.limit_orders.insert(order_id, entry);
}

fn update_remaining(view: &mut LedgerView, journal: &mut Journal, order_id: u64, new_remaining: U256) {
    let mut entry = view.limit_orders.get(&order_id).expect("order exists").clone();
    journal.push(Op::SetLimitOrder {
        order_id,
        prev: Some(entry.clone()),
    });
    entry.quantity_to_fill_remaining = new_remaining;
    view.limit_orders.insert(order_id, entry);
}

fn remove_order(view: &mut LedgerView, journal: &mut Journal, order_id: u64) {
    if let Some(entry) = view.limit_orders.remove(&order_id) {
        journal.push(Op::SetLimitOrder {
            order_id,
            prev: Some(entry),
        });
    }
}

fn cancel_order(
    view: &mut LedgerView,
    journal: &mut Journal,
    transactor: &Pkid,
    order_id: u64,
) -> Result<(), ConnectError> {
    let entry = view.limit_orders.get(&order_id).cloned().ok_or(ConnectError::OrderNotFound)?;
    if entry.transactor != *transactor {
        return Err(ConnectError::OrderNotFound);
    }
    remove_order(view, journal, order_id);
    Ok(())
}

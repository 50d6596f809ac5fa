use primitive_types::U256;
use serde::{Deserialize, Serialize};

use crate::types::{BlockHeight, Pkid};

/// Sentinel standing in for "DESO" wherever a limit order needs a coin
/// PKID slot but DESO has no creator (§3).
pub const DESO_SENTINEL: Pkid = Pkid([0u8; 33]);

/// Fixed-point scale for the exchange rate: `rate` is "sell-coins per
/// buy-coin" scaled by `10^38` (§3).
pub const EXCHANGE_RATE_SCALE_EXPONENT: u32 = 38;

pub fn exchange_rate_scale() -> U256 {
    U256::from(10u64).pow(U256::from(EXCHANGE_RATE_SCALE_EXPONENT))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OrderOperation {
    Bid,
    Ask,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OrderFillType {
    GoodTillCancelled,
    ImmediateOrCancel,
    FillOrKill,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DaoCoinLimitOrderPayload {
    pub buying_coin_pkid: Pkid,
    pub selling_coin_pkid: Pkid,
    pub scaled_exchange_rate: U256,
    pub quantity_to_fill: U256,
    pub operation: OrderOperation,
    pub fill_type: OrderFillType,
    /// Set when this transaction cancels a prior order instead of placing
    /// a new one; mutually exclusive with everything else on the payload.
    pub cancel_order_id: Option<u64>,
}

/// A resting order in the book (§3 Limit-Order Entry).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LimitOrderEntry {
    pub order_id: u64,
    pub transactor: Pkid,
    pub buying_coin_pkid: Pkid,
    pub selling_coin_pkid: Pkid,
    pub scaled_exchange_rate: U256,
    pub quantity_to_fill_remaining: U256,
    pub operation: OrderOperation,
    pub fill_type: OrderFillType,
    pub block_height_placed: BlockHeight,
}

/// `floor(sell_quantity * 10^38 / rate)`, rejecting the match if it rounds
/// to less than one nano (§3).
pub fn compute_buy_quantity(sell_quantity: U256, scaled_rate: U256) -> Option<U256> {
    if scaled_rate.is_zero() {
        return None;
    }
    let scale = exchange_rate_scale();
    let (product, overflowed) = sell_quantity.overflowing_mul(scale);
    if overflowed {
        return None;
    }
    let buy_quantity = product / scaled_rate;
    if buy_quantity.is_zero() {
        None
    } else {
        Some(buy_quantity)
    }
}

use serde::{Deserialize, Serialize};

/// Which balance a `BalanceKey` refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CoinKind {
    Deso,
    CreatorCoin,
    DaoCoin,
    /// Non-spendable stake bucket backing a `Validator Entry` (SPEC_FULL §B).
    StakeLocked,
}

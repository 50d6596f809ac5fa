//! Rule-violation and corruption errors (§7 kinds 1 and 5).

use thiserror::Error;

use crate::transaction::validation::StaticValidationError;
use crate::types::Pkid;

/// Deterministic, consensus-relevant rejection. Attached to the offending
/// transaction and never retried locally (§7).
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ConnectError {
    #[error("static validation failed: {0}")]
    StaticValidation(#[from] StaticValidationError),

    #[error("signature does not verify")]
    InvalidSignature,
    #[error("feature '{0}' is not active at this block height")]
    FeatureNotYetActive(&'static str),

    #[error("nonce {partial_id} expired at height {expiration}, current height {current}")]
    NonceExpired {
        expiration: u64,
        partial_id: u64,
        current: u64,
    },

    #[error("derived key is not authorized for this sender")]
    DerivedKeyNotAuthorized,
    #[error("derived key has expired")]
    DerivedKeyExpired,
    #[error("derived key transitioned to invalid and cannot be re-authorized")]
    DerivedKeyDeleted,
    #[error("txn type not authorized under this derived key's spending limit")]
    TxnTypeNotAuthorized,
    #[error("derived key spending limit would go negative")]
    SpendingLimitExceeded,
    #[error("derived key global DESO cap exceeded")]
    GlobalDesoCapExceeded,

    #[error("fee {declared} does not match required fee {required}")]
    FeeMismatch { declared: u64, required: u64 },
    #[error("fee {declared} is below the floor of {floor}")]
    FeeBelowFloor { declared: u64, floor: u64 },
    #[error("insufficient spendable balance for sender {0}")]
    InsufficientBalance(Pkid),

    #[error("access group '{0}' does not exist")]
    AccessGroupNotFound(String),
    #[error("the 'base' access group name is reserved")]
    ReservedGroupName,
    #[error("access group member already present")]
    DuplicateAccessGroupMember,
    #[error("owner cannot be added as a member of their own group under the same key")]
    RecursiveAccessGroupMember,
    #[error("member's referenced access group does not exist")]
    MemberAccessGroupNotFound,
    #[error("duplicate member in the same transaction's member list")]
    DuplicateMemberInTransaction,
    #[error("operation type not supported")]
    OperationNotSupported,

    #[error("limit order may not buy and sell the same coin")]
    SameBuySellCoin,
    #[error("limit order rate or quantity must be non-zero")]
    ZeroRateOrQuantity,
    #[error("limit order total cost overflowed u256")]
    CostOverflow,
    #[error("limit order cost rounds to less than one nano")]
    CostBelowOneNano,
    #[error("insufficient funds to open limit order")]
    InsufficientFundsToOpenOrder,
    #[error("a transactor's order may not match their own resting order")]
    SelfMatch,
    #[error("fill-or-kill order could not be fully filled")]
    FillOrKillUnfilled,
    #[error("order id not found")]
    OrderNotFound,
    #[error("unrecognized order operation or fill type")]
    UnrecognizedOrderKind,

    #[error("identity swap may only be performed by the parameter updater")]
    NotParamUpdater,
    #[error("global params update may only be performed by the parameter updater")]
    NotGlobalParamsUpdater,

    #[error("validator is already registered")]
    ValidatorAlreadyRegistered,
    #[error("validator is not registered")]
    ValidatorNotRegistered,
    #[error("stake amount below the configured minimum")]
    StakeBelowMinimum,
    #[error("validator is not jailed")]
    ValidatorNotJailed,
    #[error("insufficient stake to unstake the requested amount")]
    InsufficientStake,

    #[error("referenced NFT entry not found")]
    NftNotFound,
    #[error("transaction sender does not own this NFT")]
    NotNftOwner,
    #[error("NFT is not listed for sale")]
    NftNotForSale,
    #[error("bid amount below the minimum")]
    BidBelowMinimum,

    #[error("referenced post not found")]
    PostNotFound,

    #[error("dao coin minting has been disabled for this creator")]
    MintingDisabled,
    #[error("insufficient dao coin supply to burn")]
    InsufficientSupply,
}

/// Fatal: disconnect-time state mismatch or journal type mismatch. The
/// caller must halt rather than continue (§7 kind 5).
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum DisconnectError {
    #[error("journal terminal tag '{found}' does not match transaction type '{expected}'")]
    TypeTagMismatch {
        expected: &'static str,
        found: String,
    },
    #[error("journal was empty; expected at least a terminal type tag")]
    EmptyJournal,
}

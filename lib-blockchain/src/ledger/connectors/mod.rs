//! One connector per transaction-type family (§4.1). `connect::connect_transaction`
//! applies outputs and fees itself; connectors only handle payload-specific
//! state transitions.

pub mod access_group;
pub mod admin;
pub mod coins;
pub mod dao_coin_transfer;
pub mod derived_key;
pub mod limit_order;
pub mod nft;
pub mod social;
pub mod validator;

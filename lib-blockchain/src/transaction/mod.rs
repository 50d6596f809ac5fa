//! Transaction envelope, typed payloads, static validation and signing.

pub mod core;
pub mod hashing;
pub mod payloads;
pub mod signing;
pub mod validation;

pub use core::{Transaction, TransactionPayload, TxOutput, TxSignature};
pub use hashing::{encoded_size, hash_transaction};
pub use validation::{validate_static, StaticValidationError};

//! Static sanity checks: everything `connect_transaction` can reject
//! without consulting ledger state (§4.1 step 1).

use thiserror::Error;

use super::core::Transaction;
use super::hashing::encoded_size;

pub const MAX_TRANSACTION_SIZE_BYTES: usize = 100 * 1024;

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum StaticValidationError {
    #[error("transaction exceeds maximum size of {0} bytes")]
    TooLarge(usize),
    #[error("transaction output amount must be positive")]
    NonPositiveAmount,
    #[error("sender public key must not be all-zero")]
    ZeroSender,
    #[error("transaction version {0} is not recognized")]
    UnrecognizedVersion(u32),
}

pub fn validate_static(txn: &Transaction) -> Result<(), StaticValidationError> {
    let size = encoded_size(txn);
    if size > MAX_TRANSACTION_SIZE_BYTES {
        return Err(StaticValidationError::TooLarge(MAX_TRANSACTION_SIZE_BYTES));
    }

    if txn.version == 0 {
        return Err(StaticValidationError::UnrecognizedVersion(txn.version));
    }

    if txn.sender_public_key.dilithium_pk.is_empty() && txn.sender_public_key.kyber_pk.is_empty() {
        return Err(StaticValidationError::ZeroSender);
    }

    for output in &txn.outputs {
        if output.amount_nanos == 0 {
            return Err(StaticValidationError::NonPositiveAmount);
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::sample_transaction;

    #[test]
    fn rejects_zero_amount_output() {
        let mut txn = sample_transaction(1);
        txn.outputs[0].amount_nanos = 0;
        assert_eq!(
            validate_static(&txn),
            Err(StaticValidationError::NonPositiveAmount)
        );
    }

    #[test]
    fn accepts_well_formed_transaction() {
        let txn = sample_transaction(1);
        assert!(validate_static(&txn).is_ok());
    }
}

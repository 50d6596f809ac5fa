//! Applies a block's transactions to a Ledger View and offers the result
//! to the Fork Manager (§4.4 "block is connected via Ledger View ...
//! block is offered to Fork Manager").

use thiserror::Error;

use crate::ledger::connect::{connect_transaction, ConnectOutcome};
use crate::ledger::errors::ConnectError;
use crate::ledger::journal::Journal;
use crate::ledger::view::LedgerView;

use super::core::Block;
use super::fork::{ForkError, ForkManager, ProcessResult};

#[derive(Debug, Error)]
pub enum ApplyBlockError {
    #[error("transaction {index} rejected: {source}")]
    TransactionRejected { index: usize, source: ConnectError },
    #[error(transparent)]
    Fork(#[from] ForkError),
}

pub struct AppliedBlock {
    pub result: ProcessResult,
    pub transaction_journals: Vec<Journal>,
    pub total_output_nanos: u64,
    pub total_fees_nanos: u64,
}

/// Connects every transaction in `block` to `view`, in order, then offers
/// `block` to `fork`. Matured unbonding stake is released first, before
/// any transaction of the block is connected, matching the validator
/// lifecycle's once-per-block release point (SPEC_FULL.md §B). Block
/// ingress always re-verifies signatures (§4.1's public contract still
/// permits skipping them for trusted local replay, which this entry point
/// does not do).
///
/// On a rejected transaction the caller is responsible for discarding
/// `view` — a partially-applied view is never rewound in place here,
/// since a block that fails to connect is simply not offered to the
/// fork manager at all.
pub fn apply_block(view: &mut LedgerView, fork: &mut ForkManager, block: Block) -> Result<AppliedBlock, ApplyBlockError> {
    let mut unbonding_journal = Journal::new();
    view.release_matured_unbonding(&mut unbonding_journal);

    let mut transaction_journals = Vec::with_capacity(block.transactions.len() + 1);
    transaction_journals.push(unbonding_journal);

    let mut total_output_nanos = 0u64;
    let mut total_fees_nanos = 0u64;

    for (index, txn) in block.transactions.iter().enumerate() {
        let ConnectOutcome {
            journal,
            total_output_nanos: output_nanos,
            fee_nanos,
            ..
        } = connect_transaction(view, txn, true).map_err(|source| ApplyBlockError::TransactionRejected { index, source })?;
        total_output_nanos += output_nanos;
        total_fees_nanos += fee_nanos;
        transaction_journals.push(journal);
    }

    let result = fork.process_block(block)?;
    Ok(AppliedBlock {
        result,
        transaction_journals,
        total_output_nanos,
        total_fees_nanos,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::block::core::{BlockHeader, QuorumCertificate};
    use crate::block::fork::ForkManager;
    use crate::test_support::{sample_ledger_view, sample_pkid, sample_signed_transaction, sample_transaction};
    use crate::types::{BalanceKey, Hash, TransactionNonce};
    use primitive_types::U256;

    fn genesis() -> Block {
        let header = BlockHeader {
            version: 1,
            height: 0,
            view: 0,
            parent_hash: Hash::from_bytes(&[0u8; 32]),
            parent_qc: QuorumCertificate {
                view: 0,
                block_hash: Hash::from_bytes(&[0u8; 32]),
                aggregate_signature: vec![],
                signer_bitmap: vec![],
            },
            merkle_root: Hash::from_bytes(&[0u8; 32]),
            timestamp: 0,
            proposer: sample_pkid(0),
            proposer_signature: vec![],
        };
        Block {
            header,
            transactions: vec![],
        }
    }

    fn block_with(transactions: Vec<crate::transaction::core::Transaction>, parent: &Block) -> Block {
        let parent_hash = parent.hash();
        let header = BlockHeader {
            version: 1,
            height: parent.height() + 1,
            view: parent.view() + 1,
            parent_hash: parent_hash.clone(),
            parent_qc: QuorumCertificate {
                view: parent.view(),
                block_hash: parent_hash,
                aggregate_signature: vec![],
                signer_bitmap: vec![],
            },
            merkle_root: Hash::from_bytes(&[0u8; 32]),
            timestamp: 0,
            proposer: sample_pkid(1),
            proposer_signature: vec![1],
        };
        let mut block = Block { header, transactions };
        block.header.merkle_root = block.calculate_merkle_root();
        block
    }

    #[test]
    fn applies_transactions_and_advances_fork_tip() {
        let genesis = genesis();
        let mut fork = ForkManager::new(genesis.clone());
        let mut view = sample_ledger_view(1);

        let txn = sample_signed_transaction(sample_pkid(2), 1_000, TransactionNonce::new(1_000, 1));
        let sender = view.resolve_pkid(&txn.sender_public_key);
        let required = txn.total_output_nanos() + txn.declared_fee_nanos;
        view.set_balance(&mut Journal::new(), BalanceKey::deso(sender), U256::from(required));

        let block = block_with(vec![txn.clone()], &genesis);
        let applied = apply_block(&mut view, &mut fork, block).unwrap();

        assert!(!applied.result.applied_new_tip, "a single block can't yet complete the two-QC commit chain");
        assert_eq!(applied.total_output_nanos, txn.total_output_nanos());
        assert_eq!(applied.total_fees_nanos, txn.declared_fee_nanos);
        assert_eq!(applied.transaction_journals.len(), 2);
    }

    #[test]
    fn rejects_block_whose_transaction_fails_to_connect() {
        let genesis = genesis();
        let mut fork = ForkManager::new(genesis.clone());
        let mut view = sample_ledger_view(1);

        let txn = sample_transaction(1);
        let block = block_with(vec![txn], &genesis);
        let err = apply_block(&mut view, &mut fork, block).unwrap_err();
        assert!(matches!(err, ApplyBlockError::TransactionRejected { index: 0, .. }));
    }
}

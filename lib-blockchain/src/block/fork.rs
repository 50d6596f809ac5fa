//! Fork Manager: the sole writer of committed state transitions derived
//! from block shape and the Fast-HotStuff commit rule (§4.3).

use thiserror::Error;

use crate::types::Hash;

use super::core::{validate_block_shape, Block, BlockValidationError};
use super::index::BlockIndex;

#[derive(Debug, Error)]
pub enum ForkError {
    #[error("block shape invalid: {0}")]
    InvalidShape(#[from] BlockValidationError),
    #[error("parent block is unknown")]
    UnknownParent,
}

pub struct ForkManager {
    index: BlockIndex,
}

/// Result of offering a block to the manager (§4.4 `handle_block` step 1's
/// `{applied_new_tip, missing_ancestor_hashes, err}`).
pub struct ProcessResult {
    pub applied_new_tip: bool,
    pub missing_ancestor_hashes: Vec<Hash>,
}

impl ForkManager {
    pub fn new(genesis: Block) -> Self {
        Self {
            index: BlockIndex::new(genesis),
        }
    }

    pub fn committed_tip(&self) -> &Block {
        self.index.committed_tip()
    }

    pub fn safe_blocks(&self) -> Vec<&Block> {
        self.index.safe_blocks()
    }

    pub fn get_block(&self, hash: &Hash) -> Option<&Block> {
        self.index.get(hash)
    }

    /// Offers a newly-received or locally-produced block. Shape is
    /// validated against its parent when the parent is known; an unknown
    /// parent parks the block as an orphan and is reported back rather
    /// than treated as an error (§4.3 Orphan handling).
    pub fn process_block(&mut self, block: Block) -> Result<ProcessResult, ForkError> {
        let hash = block.hash();
        if let Some(parent) = self.index.get(block.parent_hash()).cloned() {
            validate_block_shape(&block, parent.height(), parent.view())?;
        }

        let missing = self.index.offer(block);
        if !missing.is_empty() {
            return Ok(ProcessResult {
                applied_new_tip: false,
                missing_ancestor_hashes: missing,
            });
        }

        let applied_new_tip = self.try_advance_commit(&hash);
        Ok(ProcessResult {
            applied_new_tip,
            missing_ancestor_hashes: vec![],
        })
    }

    /// Walks from `from` back toward the current committed tip, trying
    /// the commit rule at each ancestor not yet committed. A new block
    /// can only move the tip forward by completing the two-consecutive-QC
    /// chain on some ancestor of itself.
    fn try_advance_commit(&mut self, from: &Hash) -> bool {
        let mut candidate = Some(from.clone());
        let mut committed_any = false;
        while let Some(hash) = candidate {
            if self.index.try_commit(&hash) {
                committed_any = true;
                break;
            }
            candidate = self.index.get(&hash).map(|b| b.parent_hash().clone()).filter(|p| self.index.contains(p));
        }
        committed_any
    }

    pub fn mark_invalid(&mut self, hash: &Hash) {
        self.index.mark_invalid(hash);
    }
}

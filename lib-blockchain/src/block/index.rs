//! Block classification and orphan tracking (§4.3).

use std::collections::HashMap;

use crate::types::Hash;

use super::core::Block;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlockStatus {
    Committed,
    Safe,
    Invalid,
}

struct IndexedBlock {
    block: Block,
    status: BlockStatus,
}

/// Tracks every block the node has seen, classified into
/// `{committed, safe, orphan, invalid}` (§4.3). Orphans are blocks whose
/// parent hash is not yet known; they are re-offered once that parent
/// arrives.
pub struct BlockIndex {
    blocks: HashMap<Hash, IndexedBlock>,
    children: HashMap<Hash, Vec<Hash>>,
    orphans: HashMap<Hash, Vec<Block>>,
    committed_tip: Hash,
}

impl BlockIndex {
    pub fn new(genesis: Block) -> Self {
        let genesis_hash = genesis.hash();
        let mut blocks = HashMap::new();
        blocks.insert(
            genesis_hash.clone(),
            IndexedBlock {
                block: genesis,
                status: BlockStatus::Committed,
            },
        );
        Self {
            blocks,
            children: HashMap::new(),
            orphans: HashMap::new(),
            committed_tip: genesis_hash,
        }
    }

    pub fn committed_tip(&self) -> &Block {
        &self.blocks[&self.committed_tip].block
    }

    pub fn get(&self, hash: &Hash) -> Option<&Block> {
        self.blocks.get(hash).map(|ib| &ib.block)
    }

    pub fn status(&self, hash: &Hash) -> Option<BlockStatus> {
        self.blocks.get(hash).map(|ib| ib.status)
    }

    pub fn contains(&self, hash: &Hash) -> bool {
        self.blocks.contains_key(hash)
    }

    /// Offers a block to the index. Returns the hashes of any ancestors
    /// still missing (§4.3 Orphan handling: the block is parked until
    /// they arrive); an empty vec means the block was accepted.
    pub fn offer(&mut self, block: Block) -> Vec<Hash> {
        let parent_hash = block.parent_hash().clone();
        if !self.blocks.contains_key(&parent_hash) {
            self.orphans.entry(parent_hash.clone()).or_default().push(block);
            return vec![parent_hash];
        }
        self.accept(block);
        vec![]
    }

    fn accept(&mut self, block: Block) {
        let hash = block.hash();
        let parent_hash = block.parent_hash().clone();
        self.children.entry(parent_hash).or_default().push(hash.clone());
        self.blocks.insert(
            hash.clone(),
            IndexedBlock {
                block,
                status: BlockStatus::Safe,
            },
        );

        if let Some(waiting) = self.orphans.remove(&hash) {
            for orphan in waiting {
                self.offer(orphan);
            }
        }
    }

    pub fn mark_invalid(&mut self, hash: &Hash) {
        if let Some(ib) = self.blocks.get_mut(hash) {
            ib.status = BlockStatus::Invalid;
        }
    }

    /// Blocks that are descendants of the committed tip along a validated
    /// path, with strictly greater view, and not invalid (§4.3
    /// Safe-block rule). These are exactly what a new proposal may
    /// extend.
    pub fn safe_blocks(&self) -> Vec<&Block> {
        let tip_view = self.committed_tip().view();
        self.blocks
            .values()
            .filter(|ib| ib.status == BlockStatus::Safe && ib.block.view() > tip_view)
            .filter(|ib| self.descends_from_committed_tip(&ib.block.hash()))
            .map(|ib| &ib.block)
            .collect()
    }

    fn descends_from_committed_tip(&self, hash: &Hash) -> bool {
        let mut current = hash.clone();
        loop {
            if current == self.committed_tip {
                return true;
            }
            match self.blocks.get(&current) {
                Some(ib) if ib.block.is_genesis() => return false,
                Some(ib) => current = ib.block.parent_hash().clone(),
                None => return false,
            }
        }
    }

    /// Fast-HotStuff tip commit rule (§4.3): `candidate` commits once
    /// there exist two consecutive blocks (by view) built atop it, each
    /// with a valid QC on its immediate parent. The caller has already
    /// verified each QC's signature; this only checks the view-chain
    /// shape. `candidate` may have more than one child (an equivocating
    /// proposal alongside the honest one); any child with a valid
    /// grandchild chain is enough to commit.
    pub fn try_commit(&mut self, candidate: &Hash) -> bool {
        let Some(children) = self.children.get(candidate).cloned() else {
            return false;
        };
        let candidate_view = self.blocks[candidate].block.view();

        for child in &children {
            let Some(child_block) = self.blocks.get(child).map(|ib| &ib.block) else {
                continue;
            };
            if child_block.view() != candidate_view + 1 || child_block.header.parent_qc.block_hash != *candidate {
                continue;
            }

            let Some(grandchildren) = self.children.get(child).cloned() else {
                continue;
            };
            let child_view = child_block.view();
            let has_valid_grandchild = grandchildren.iter().any(|grandchild| {
                self.blocks.get(grandchild).is_some_and(|ib| {
                    ib.block.view() == child_view + 1 && ib.block.header.parent_qc.block_hash == *child
                })
            });

            if has_valid_grandchild {
                self.committed_tip = candidate.clone();
                if let Some(ib) = self.blocks.get_mut(candidate) {
                    ib.status = BlockStatus::Committed;
                }
                return true;
            }
        }
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::block::core::{BlockHeader, QuorumCertificate};
    use crate::test_support::sample_pkid;

    fn qc_on(block_hash: Hash, view: u64) -> QuorumCertificate {
        QuorumCertificate {
            view,
            block_hash,
            aggregate_signature: vec![],
            signer_bitmap: vec![],
        }
    }

    fn block_at(height: u64, view: u64, parent_hash: Hash) -> Block {
        let parent_qc = qc_on(parent_hash.clone(), view.saturating_sub(1));
        let header = BlockHeader {
            version: 1,
            height,
            view,
            parent_hash,
            parent_qc,
            merkle_root: Hash::from_bytes(&[0u8; 32]),
            timestamp: 0,
            proposer: sample_pkid(view as u8),
            proposer_signature: vec![1],
        };
        Block {
            header,
            transactions: vec![],
        }
    }

    fn genesis() -> Block {
        block_at(0, 0, Hash::from_bytes(&[0u8; 32]))
    }

    #[test]
    fn offer_parks_block_as_orphan_until_parent_arrives() {
        let mut index = BlockIndex::new(genesis());
        let genesis_hash = index.committed_tip().hash();

        let child = block_at(1, 1, genesis_hash.clone());
        let grandchild = block_at(2, 2, child.hash());
        let grandchild_hash = grandchild.hash();

        assert!(!index.offer(grandchild).is_empty());
        assert!(!index.contains(&grandchild_hash));

        assert!(index.offer(child).is_empty());
        assert!(index.contains(&grandchild_hash));
    }

    #[test]
    fn try_commit_succeeds_on_two_consecutive_qcs() {
        let mut index = BlockIndex::new(genesis());
        let genesis_hash = index.committed_tip().hash();

        let candidate = block_at(1, 1, genesis_hash.clone());
        let candidate_hash = candidate.hash();
        index.offer(candidate);

        let child = block_at(2, 2, candidate_hash.clone());
        let child_hash = child.hash();
        index.offer(child);

        assert!(!index.try_commit(&candidate_hash));

        let grandchild = block_at(3, 3, child_hash);
        index.offer(grandchild);

        assert!(index.try_commit(&candidate_hash));
        assert_eq!(index.status(&candidate_hash), Some(BlockStatus::Committed));
    }

    #[test]
    fn try_commit_checks_every_child_not_just_the_first() {
        let mut index = BlockIndex::new(genesis());
        let genesis_hash = index.committed_tip().hash();

        let candidate = block_at(1, 1, genesis_hash.clone());
        let candidate_hash = candidate.hash();
        index.offer(candidate);

        // An equivocating child with no grandchild QC chain behind it.
        let equivocating_child = block_at(2, 5, candidate_hash.clone());
        index.offer(equivocating_child);

        // The honest child, whose own child completes the two-QC chain.
        let honest_child = block_at(2, 2, candidate_hash.clone());
        let honest_child_hash = honest_child.hash();
        index.offer(honest_child);
        let grandchild = block_at(3, 3, honest_child_hash);
        index.offer(grandchild);

        assert!(index.try_commit(&candidate_hash));
    }

    #[test]
    fn safe_blocks_excludes_blocks_not_descended_from_committed_tip() {
        let mut index = BlockIndex::new(genesis());
        let genesis_hash = index.committed_tip().hash();

        let candidate = block_at(1, 1, genesis_hash.clone());
        let candidate_hash = candidate.hash();
        index.offer(candidate);
        let child = block_at(2, 2, candidate_hash.clone());
        let child_hash = child.hash();
        index.offer(child);
        let grandchild = block_at(3, 3, child_hash);
        index.offer(grandchild);
        assert!(index.try_commit(&candidate_hash));

        // A sibling fork off genesis, never built atop the now-committed
        // candidate: it must not count as safe even though its view
        // exceeds the new tip's view.
        let sibling = block_at(1, 4, genesis_hash);
        index.offer(sibling);

        let safe = index.safe_blocks();
        assert!(safe.iter().all(|b| b.hash() != index.get(&candidate_hash).unwrap().hash()));
        assert!(safe.iter().any(|b| b.view() == 2));
        assert!(safe.iter().all(|b| b.view() != 4));
    }
}

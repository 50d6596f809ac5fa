//! Fast-HotStuff event loop: tracks the current view, the highest QC
//! observed, and raises the four signals the controller reacts to (spec
//! §4.4). Grounded on `engines/bft_engine.rs`'s `handle_consensus_event`
//! dispatch shape and its `vote_pool`/round-advance bookkeeping, collapsed
//! from a three-phase (propose/prevote/precommit) round into
//! Fast-HotStuff's single-phase vote-then-QC chain.

use std::collections::HashSet;
use std::time::Duration;

use lib_blockchain::block::QuorumCertificate;
use lib_blockchain::types::{BlockHeight, Hash, Pkid};
use tracing::{debug, warn};

use crate::types::EventLoopSignal;
use crate::validators::ValidatorSetSnapshot;

/// A block plus the validator set that will govern voting on ITS
/// children, exactly what the controller feeds back after a tip change
/// or a new safe block (spec §4.4 step 4-5).
#[derive(Debug, Clone)]
pub struct AnnotatedBlock {
    pub hash: Hash,
    pub height: BlockHeight,
    pub view: u64,
    pub validators: ValidatorSetSnapshot,
}

pub struct EventLoop {
    current_view: u64,
    high_qc: QuorumCertificate,
    /// Views this node has already voted in — enforces "at most one vote
    /// per view" (spec §8) independent of which block is being voted on.
    voted_views: HashSet<u64>,
    timed_out_views: HashSet<u64>,
    tip: Option<AnnotatedBlock>,
    safe_blocks: Vec<AnnotatedBlock>,
    vote_timeout: Duration,
}

impl EventLoop {
    pub fn new(genesis_qc: QuorumCertificate, vote_timeout: Duration) -> Self {
        Self {
            current_view: genesis_qc.view,
            high_qc: genesis_qc,
            voted_views: HashSet::new(),
            timed_out_views: HashSet::new(),
            tip: None,
            safe_blocks: Vec::new(),
            vote_timeout,
        }
    }

    pub fn current_view(&self) -> u64 {
        self.current_view
    }

    pub fn high_qc(&self) -> &QuorumCertificate {
        &self.high_qc
    }

    pub fn vote_timeout(&self) -> Duration {
        self.vote_timeout
    }

    /// Records a new quorum certificate as `high_qc` if it strictly
    /// exceeds the current one's view; returns whether it did.
    pub fn observe_qc(&mut self, qc: QuorumCertificate) -> bool {
        if qc.view > self.high_qc.view {
            self.high_qc = qc;
            true
        } else {
            false
        }
    }

    /// One-shot view advance used by a timeout-ready handler (spec §4.4
    /// "advance the loop's view via a one-shot API").
    pub fn advance_view(&mut self, from_view: u64) -> Option<u64> {
        if from_view != self.current_view {
            return None;
        }
        self.current_view += 1;
        Some(self.current_view)
    }

    /// The new tip after connecting a block, with the validator set for
    /// its children (spec §4.4 step 5). Advances the loop's view if the
    /// tip's view is ahead.
    pub fn process_tip_block(&mut self, tip: AnnotatedBlock, safe_blocks: Vec<AnnotatedBlock>) {
        if tip.view >= self.current_view {
            self.current_view = tip.view + 1;
        }
        self.tip = Some(tip);
        self.safe_blocks = safe_blocks;
    }

    pub fn update_safe_blocks(&mut self, safe_blocks: Vec<AnnotatedBlock>) {
        self.safe_blocks = safe_blocks;
    }

    pub fn tip(&self) -> Option<&AnnotatedBlock> {
        self.tip.as_ref()
    }

    pub fn safe_blocks(&self) -> &[AnnotatedBlock] {
        &self.safe_blocks
    }

    /// Accepts a vote-ready signal's resulting vote iff this view hasn't
    /// voted yet; rejects (does not broadcast) a duplicate (spec §8
    /// "at-most-one-vote-per-view", scenario 6).
    pub fn try_record_vote(&mut self, view: u64) -> bool {
        if self.voted_views.contains(&view) {
            debug!(view, "duplicate vote rejected by event loop");
            return false;
        }
        self.voted_views.insert(view);
        true
    }

    /// Accepts a timeout-ready signal iff `view` still matches current
    /// (spec §4.4 "Cancellation" — stale timeouts are dropped).
    pub fn try_record_timeout(&mut self, view: u64) -> bool {
        if view != self.current_view {
            warn!(view, current = self.current_view, "stale timeout-ready dropped");
            return false;
        }
        self.timed_out_views.insert(view);
        true
    }

    /// The safe block with the highest view this node would propose on
    /// top of next, along with who should propose for `view`.
    pub fn propose_target(&self, view: u64) -> Option<&AnnotatedBlock> {
        self.safe_blocks.iter().max_by_key(|b| b.view).or(self.tip.as_ref()).filter(|b| b.view < view)
    }

    /// Emits whichever signal currently applies, given the local node's
    /// identity and a proposer lookup against the safe parent's snapshot.
    pub fn next_signal(&self, local: &Pkid, height: BlockHeight) -> Option<EventLoopSignal> {
        if let Some(parent) = self.propose_target(self.current_view) {
            if parent.validators.proposer_for(height, self.current_view) == Some(local) {
                return Some(EventLoopSignal::ProposeReady {
                    height,
                    view: self.current_view,
                });
            }
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use lib_blockchain::ledger::{LedgerConfig, LedgerView};
    use lib_storage::MemoryBackend;

    use super::*;
    use crate::validators::ValidatorSnapshotCache;

    fn pkid(seed: u8) -> Pkid {
        Pkid([seed; 33])
    }

    fn qc_at(view: u64) -> QuorumCertificate {
        QuorumCertificate {
            view,
            block_hash: Hash::from_bytes(&[0u8; 32]),
            aggregate_signature: vec![],
            signer_bitmap: vec![],
        }
    }

    /// No validators are registered in this view, so the resulting
    /// snapshot has no members — adequate for every test below that
    /// doesn't care about snapshot content, only tip/safe-block plumbing.
    fn empty_snapshot() -> ValidatorSetSnapshot {
        let config = LedgerConfig {
            param_updater: pkid(0),
            min_validator_stake_nanos: 1_000_000,
            unbonding_height_delta: 100,
            epoch_length_blocks: 10,
            validator_snapshot_lookback: 1,
            fork_heights: std::collections::HashMap::new(),
        };
        let view = LedgerView::new(config, 0, Arc::new(MemoryBackend::new()));
        ValidatorSnapshotCache::new().snapshot_for_height(&view, 0)
    }

    fn annotated(height: BlockHeight, view: u64, validators: ValidatorSetSnapshot) -> AnnotatedBlock {
        AnnotatedBlock {
            hash: Hash::from_bytes(&[height as u8; 32]),
            height,
            view,
            validators,
        }
    }

    #[test]
    fn observe_qc_only_adopts_strictly_higher_views() {
        let mut loop_ = EventLoop::new(qc_at(0), Duration::from_millis(10));
        assert!(loop_.observe_qc(qc_at(5)));
        assert_eq!(loop_.high_qc().view, 5);
        assert!(!loop_.observe_qc(qc_at(5)));
        assert!(!loop_.observe_qc(qc_at(3)));
        assert_eq!(loop_.high_qc().view, 5);
    }

    #[test]
    fn advance_view_is_one_shot_from_the_expected_view() {
        let mut loop_ = EventLoop::new(qc_at(0), Duration::from_millis(10));
        assert_eq!(loop_.advance_view(0), Some(1));
        assert_eq!(loop_.current_view(), 1);
        assert_eq!(loop_.advance_view(0), None);
        assert_eq!(loop_.current_view(), 1);
    }

    #[test]
    fn try_record_vote_rejects_a_second_vote_in_the_same_view() {
        let mut loop_ = EventLoop::new(qc_at(0), Duration::from_millis(10));
        assert!(loop_.try_record_vote(3));
        assert!(!loop_.try_record_vote(3));
        assert!(loop_.try_record_vote(4));
    }

    #[test]
    fn try_record_timeout_drops_a_stale_view() {
        let mut loop_ = EventLoop::new(qc_at(0), Duration::from_millis(10));
        loop_.advance_view(0);
        assert_eq!(loop_.current_view(), 1);
        assert!(!loop_.try_record_timeout(0));
        assert!(loop_.try_record_timeout(1));
    }

    #[test]
    fn process_tip_block_advances_view_past_the_new_tip() {
        let mut loop_ = EventLoop::new(qc_at(0), Duration::from_millis(10));
        let tip = annotated(1, 4, empty_snapshot());
        loop_.process_tip_block(tip.clone(), vec![tip.clone()]);
        assert_eq!(loop_.current_view(), 5);
        assert_eq!(loop_.tip().unwrap().hash, tip.hash);
        assert_eq!(loop_.safe_blocks().len(), 1);
    }

    #[test]
    fn propose_target_prefers_the_highest_view_safe_block_under_the_target_view() {
        let mut loop_ = EventLoop::new(qc_at(0), Duration::from_millis(10));
        let tip = annotated(1, 2, empty_snapshot());
        let safe_low = annotated(1, 2, empty_snapshot());
        let safe_high = annotated(2, 3, empty_snapshot());
        loop_.process_tip_block(tip, vec![safe_low, safe_high.clone()]);

        let target = loop_.propose_target(5).unwrap();
        assert_eq!(target.view, safe_high.view);

        assert!(loop_.propose_target(3).is_none());
    }

    #[test]
    fn next_signal_is_none_with_no_propose_target_or_no_assigned_proposer() {
        let local = pkid(7);

        let mut loop_ = EventLoop::new(qc_at(0), Duration::from_millis(10));
        // No tip yet: propose_target has nothing to offer.
        assert!(loop_.next_signal(&local, 1).is_none());

        let tip = annotated(1, 0, empty_snapshot());
        loop_.process_tip_block(tip, vec![]);
        // A tip exists now but its (empty) validator set never assigns `local`.
        assert!(loop_.next_signal(&local, 2).is_none());
    }
}

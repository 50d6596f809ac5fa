//! Per-epoch validator-set snapshots, cached for the lifetime of one
//! `handle_block` call (spec §4.4 step 4: "cache by snapshot-epoch within
//! this call"). Grounded on `validators/validator_manager.rs`'s
//! deterministic-sort proposer selection and 2/3-majority threshold math,
//! re-targeted from a single live validator map to epoch-scoped
//! read-only snapshots pulled from a Ledger View.

use std::collections::HashMap;

use lib_blockchain::ledger::LedgerView;
use lib_blockchain::ledger::state::ValidatorStatus;
use lib_blockchain::types::{BlockHeight, Pkid};

/// The validator set that governs voting for one epoch, sorted
/// deterministically by PKID bytes so proposer rotation never depends on
/// hash-map iteration order.
#[derive(Debug, Clone)]
pub struct ValidatorSetSnapshot {
    pub epoch_number: u64,
    members: Vec<(Pkid, u64, Vec<u8>)>,
    total_voting_power: u64,
}

impl ValidatorSetSnapshot {
    fn new(epoch_number: u64, mut members: Vec<(Pkid, u64, Vec<u8>)>) -> Self {
        members.sort_by(|a, b| a.0.cmp(&b.0));
        let total_voting_power = members.iter().map(|(_, power, _)| power).sum();
        Self {
            epoch_number,
            members,
            total_voting_power,
        }
    }

    pub fn voting_power_of(&self, pkid: &Pkid) -> u64 {
        self.members.iter().find(|(p, _, _)| p == pkid).map(|(_, power, _)| *power).unwrap_or(0)
    }

    /// Raw BLS public-key bytes registered for `pkid`, used to verify a
    /// vote, timeout, or block-proposal signature against this snapshot.
    pub fn voting_public_key_of(&self, pkid: &Pkid) -> Option<&[u8]> {
        self.members.iter().find(|(p, _, _)| p == pkid).map(|(_, _, key)| key.as_slice())
    }

    pub fn total_voting_power(&self) -> u64 {
        self.total_voting_power
    }

    /// 2/3-majority quorum threshold (spec §4.4, Fast-HotStuff safety).
    pub fn quorum_threshold(&self) -> u64 {
        (self.total_voting_power * 2) / 3 + 1
    }

    pub fn meets_quorum(&self, voting_power: u64) -> bool {
        voting_power >= self.quorum_threshold()
    }

    /// Deterministic round-robin proposer for `(height, view)`.
    pub fn proposer_for(&self, height: BlockHeight, view: u64) -> Option<&Pkid> {
        if self.members.is_empty() {
            return None;
        }
        let index = ((height + view) % self.members.len() as u64) as usize;
        self.members.get(index).map(|(pkid, _, _)| pkid)
    }

    pub fn members(&self) -> impl Iterator<Item = &Pkid> {
        self.members.iter().map(|(pkid, _, _)| pkid)
    }
}

#[derive(Default)]
pub struct ValidatorSnapshotCache {
    by_snapshot_epoch: HashMap<u64, ValidatorSetSnapshot>,
}

impl ValidatorSnapshotCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Validator set snapshot for the epoch containing `block_height`,
    /// following the configured lookback (spec §4.4 step 4). Cached per
    /// snapshot-epoch so repeated lookups within one call are free.
    pub fn snapshot_for_height(&mut self, view: &LedgerView, block_height: BlockHeight) -> ValidatorSetSnapshot {
        let epoch_length = view.config().epoch_length_blocks.max(1);
        let lookback = view.config().validator_snapshot_lookback;
        let epoch_number = block_height / epoch_length;
        let snapshot_epoch = epoch_number.saturating_sub(lookback);

        if let Some(cached) = self.by_snapshot_epoch.get(&snapshot_epoch) {
            return cached.clone();
        }

        let members: Vec<(Pkid, u64, Vec<u8>)> = view
            .validators()
            .values()
            .filter(|entry| entry.status == ValidatorStatus::Active)
            .map(|entry| (entry.pkid.clone(), entry.stake_amount_nanos, entry.voting_public_key.dilithium_pk.clone()))
            .collect();

        let snapshot = ValidatorSetSnapshot::new(snapshot_epoch, members);
        self.by_snapshot_epoch.insert(snapshot_epoch, snapshot.clone());
        snapshot
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_pkid(seed: u8) -> Pkid {
        Pkid([seed; 33])
    }

    fn snapshot(members: Vec<(Pkid, u64, Vec<u8>)>) -> ValidatorSetSnapshot {
        ValidatorSetSnapshot::new(0, members)
    }

    #[test]
    fn quorum_threshold_is_two_thirds_plus_one() {
        let snap = snapshot(vec![
            (sample_pkid(1), 10, vec![1]),
            (sample_pkid(2), 10, vec![2]),
            (sample_pkid(3), 10, vec![3]),
        ]);
        assert_eq!(snap.total_voting_power(), 30);
        assert_eq!(snap.quorum_threshold(), 21);
        assert!(!snap.meets_quorum(20));
        assert!(snap.meets_quorum(21));
    }

    #[test]
    fn proposer_for_round_robins_deterministically_over_sorted_members() {
        let a = sample_pkid(1);
        let b = sample_pkid(2);
        let snap = snapshot(vec![(a.clone(), 10, vec![1]), (b.clone(), 10, vec![2])]);

        let first = snap.proposer_for(0, 0).cloned();
        let second = snap.proposer_for(0, 1).cloned();
        assert_ne!(first, second);
        assert_eq!(snap.proposer_for(0, 0), snap.proposer_for(2, 0));
    }

    #[test]
    fn proposer_for_is_none_with_no_members() {
        let snap = snapshot(vec![]);
        assert!(snap.proposer_for(0, 0).is_none());
    }

    #[test]
    fn voting_public_key_of_resolves_registered_members_only() {
        let member = sample_pkid(1);
        let stranger = sample_pkid(9);
        let snap = snapshot(vec![(member.clone(), 10, vec![0xAB])]);

        assert_eq!(snap.voting_public_key_of(&member), Some([0xAB].as_slice()));
        assert_eq!(snap.voting_public_key_of(&stranger), None);
    }
}

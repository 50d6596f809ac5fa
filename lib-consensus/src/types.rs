//! Wire-level shapes the event loop and controller exchange (spec §4.4,
//! §6 Peer layer). Grounded on `engines/bft_engine.rs`'s
//! `ConsensusEvent`/`ConsensusVote` shapes, re-targeted from a three-phase
//! BFT round to Fast-HotStuff's vote/timeout/QC vocabulary.

use lib_blockchain::block::{Block, QuorumCertificate};
use lib_blockchain::types::{Hash, Pkid};
use serde::{Deserialize, Serialize};

/// A vote over `(view, block_hash)`, BLS-signed by one validator.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Vote {
    pub view: u64,
    pub block_hash: Hash,
    pub voter: Pkid,
    pub signature: Vec<u8>,
}

/// A view-change message carrying the sender's highest known QC.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Timeout {
    pub view: u64,
    pub high_qc: QuorumCertificate,
    pub voter: Pkid,
    pub signature: Vec<u8>,
}

/// The four signals the event loop raises to the controller (spec §4.4
/// "Event loop signals" table).
#[derive(Debug, Clone)]
pub enum EventLoopSignal {
    VoteReady { view: u64, tip_hash: Hash },
    TimeoutReady { view: u64, high_qc: QuorumCertificate },
    ProposeReady { height: u64, view: u64 },
    ProposeEmptyReady { height: u64, view: u64 },
}

/// Outbound messages the core produces for the peer layer (spec §6).
#[derive(Debug, Clone)]
pub enum PeerMessage {
    Block(Block),
    Vote(Vote),
    Timeout(Timeout),
    HeaderBundle(Vec<Block>),
    GetBlocks(Vec<Hash>),
    GetHeaders { from: Hash, count: u32 },
}

/// Fork heights, mempool limits, and BLS key material the controller is
/// configured with (spec §6 "Configuration surface").
#[derive(Debug, Clone)]
pub struct ConsensusConfig {
    pub epoch_length_blocks: u64,
    pub validator_snapshot_lookback: u64,
    pub propose_timeout_ms: u64,
    pub vote_timeout_ms: u64,
}

impl Default for ConsensusConfig {
    fn default() -> Self {
        Self {
            epoch_length_blocks: 3600,
            validator_snapshot_lookback: 2,
            propose_timeout_ms: 4_000,
            vote_timeout_ms: 4_000,
        }
    }
}

//! Fast-HotStuff consensus controller for the validator core: event
//! loop, BLS signer boundary, validator/epoch snapshot cache, and the
//! peer-layer interface the core produces messages against (spec §4.4).

pub mod controller;
pub mod engine;
pub mod peer;
pub mod signer;
pub mod types;
pub mod validators;

pub use controller::{BlockIngressOutcome, ConsensusController, ControllerError};
pub use engine::{AnnotatedBlock, EventLoop};
pub use peer::PeerLayer;
pub use signer::{BlsSigner, Signer, SignerError};
pub use types::{ConsensusConfig, EventLoopSignal, PeerMessage, Timeout, Vote};
pub use validators::{ValidatorSetSnapshot, ValidatorSnapshotCache};

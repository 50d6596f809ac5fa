//! Validator/epoch snapshot cache for consensus (spec §4.4 step 4).

pub mod snapshot;

pub use snapshot::{ValidatorSetSnapshot, ValidatorSnapshotCache};

//! Advanced cryptographic schemes module
//! 
//! Ring signatures, multi-signatures, and other advanced cryptographic constructions

pub mod ring_signature;
pub mod multisig;

// Re-export main types and functions
pub use ring_signature::*;
pub use multisig::*;

//! Core cryptographic type definitions
//! 
//! types from the production ZHTP cryptography system

pub mod hash;
pub mod keys;
pub mod signatures;
pub mod encapsulation;

// Re-export main types
pub use hash::Hash;
pub use keys::{PublicKey, PrivateKey};
pub use signatures::{Signature, SignatureAlgorithm, PostQuantumSignature};
pub use encapsulation::Encapsulation;

use lib_crypto::PublicKey;
use serde::{Deserialize, Serialize};

/// Stable internal identity, decoupled from the cryptographic public key
/// behind it so an identity swap (§4.1, Identity-Swap) is a single rename
/// in the public-key -> PKID map rather than a rewrite of every ledger
/// entry that mentions the identity.
///
/// Kept as a distinct type from [`PublicKey`] on purpose: a function that
/// accepts one cannot accidentally be called with the other.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Pkid(pub [u8; 33]);

impl Pkid {
    /// Derive the canonical PKID for a public key that has never been
    /// through an identity swap (i.e. the common case: first sighting of a
    /// public key mints its PKID from a hash of the key bytes).
    pub fn from_public_key(pk: &PublicKey) -> Self {
        let digest = lib_crypto::hash_blake3(&pk.dilithium_pk);
        let mut bytes = [0u8; 33];
        bytes[0] = 1; // version tag, reserved for future PKID formats
        bytes[1..33].copy_from_slice(&digest);
        Pkid(bytes)
    }

    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }
}

impl std::fmt::Display for Pkid {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.to_hex())
    }
}

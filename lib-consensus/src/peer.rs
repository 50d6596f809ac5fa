//! Peer layer boundary (spec §6): the core only produces/consumes
//! messages, framing and transport are someone else's concern.

use async_trait::async_trait;
use lib_blockchain::types::Hash;

use crate::types::PeerMessage;

#[async_trait]
pub trait PeerLayer: Send + Sync {
    async fn broadcast(&self, message: PeerMessage);
    async fn request_blocks(&self, peer: &Hash, missing: Vec<Hash>);
}

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::types::Hash;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubmitPostPayload {
    pub post_hash_to_modify: Option<Hash>,
    pub parent_post_hash: Option<Hash>,
    pub body: Vec<u8>,
    pub is_hidden: bool,
    pub extra_data: HashMap<String, Vec<u8>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdateProfilePayload {
    pub new_username: Option<String>,
    pub new_description: Option<String>,
    pub new_profile_pic: Option<Vec<u8>>,
    pub is_hidden: bool,
}

use lib_crypto::PublicKey;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::types::Pkid;

/// The reserved name every owner's implicit default group carries. Explicit
/// creation under this name is always rejected (§3).
pub const BASE_GROUP_KEY_NAME: &str = "base";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccessGroupCreatePayload {
    pub group_key_name: String,
    pub access_public_key: PublicKey,
    pub extra_data: HashMap<String, Vec<u8>>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AccessGroupMemberOperation {
    Add,
    /// Reserved, not yet implemented (§4.1, §9 Open Questions): any
    /// transaction carrying this operation is rejected with
    /// `ConnectError::OperationNotSupported`.
    Remove,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccessGroupMemberInput {
    pub member_pkid: Pkid,
    pub member_group_key_name: String,
    pub encrypted_key: Vec<u8>,
    pub extra_data: HashMap<String, Vec<u8>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccessGroupMembersPayload {
    pub owner_group_key_name: String,
    pub operation: AccessGroupMemberOperation,
    pub members: Vec<AccessGroupMemberInput>,
}

/// `(owner_PKID, group_key_name) -> entry`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccessGroupEntry {
    pub owner: Pkid,
    pub group_key_name: String,
    pub access_public_key: PublicKey,
    pub extra_data: HashMap<String, Vec<u8>>,
}

/// `(member_PKID, member_group_key_name, owner_PKID, owner_group_key_name) -> entry`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccessGroupMemberEntry {
    pub encrypted_key: Vec<u8>,
    pub extra_data: HashMap<String, Vec<u8>>,
    pub deleted: bool,
}

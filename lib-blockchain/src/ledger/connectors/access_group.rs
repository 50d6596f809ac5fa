//! Access-group create/members connectors (§3, §4.1).

use std::collections::HashSet;

use crate::ledger::errors::ConnectError;
use crate::ledger::journal::{Journal, Op};
use crate::ledger::view::LedgerView;
use crate::transaction::payloads::access_group::{
    AccessGroupCreatePayload, AccessGroupEntry, AccessGroupMemberEntry, AccessGroupMemberOperation,
    AccessGroupMembersPayload, BASE_GROUP_KEY_NAME,
};
use crate::types::Pkid;

pub fn connect_create(
    view: &mut LedgerView,
    journal: &mut Journal,
    owner: &Pkid,
    payload: &AccessGroupCreatePayload,
) -> Result<(), ConnectError> {
    if payload.group_key_name == BASE_GROUP_KEY_NAME {
        return Err(ConnectError::ReservedGroupName);
    }
    let key = (owner.clone(), payload.group_key_name.clone());
    let prev = view.access_groups.get(&key).cloned();
    journal.push(Op::SetAccessGroup {
        owner: owner.clone(),
        group_key_name: payload.group_key_name.clone(),
        prev,
    });
    view.access_groups.insert(
        key,
        AccessGroupEntry {
            owner: owner.clone(),
            group_key_name: payload.group_key_name.clone(),
            access_public_key: payload.access_public_key.clone(),
            extra_data: payload.extra_data.clone(),
        },
    );
    Ok(())
}

pub fn connect_members(
    view: &mut LedgerView,
    journal: &mut Journal,
    owner: &Pkid,
    payload: &AccessGroupMembersPayload,
) -> Result<(), ConnectError> {
    if payload.operation != AccessGroupMemberOperation::Add {
        return Err(ConnectError::OperationNotSupported);
    }

    let owner_group_exists = payload.owner_group_key_name == BASE_GROUP_KEY_NAME
        || view
            .access_groups
            .contains_key(&(owner.clone(), payload.owner_group_key_name.clone()));
    if !owner_group_exists {
        return Err(ConnectError::AccessGroupNotFound(payload.owner_group_key_name.clone()));
    }

    let mut seen_in_txn: HashSet<(Pkid, String)> = HashSet::new();
    for member in &payload.members {
        let member_key = (member.member_pkid.clone(), member.member_group_key_name.clone());
        if !seen_in_txn.insert(member_key.clone()) {
            return Err(ConnectError::DuplicateMemberInTransaction);
        }
        if member.member_pkid == *owner && member.member_group_key_name == payload.owner_group_key_name {
            return Err(ConnectError::RecursiveAccessGroupMember);
        }
        let member_group_exists = member.member_group_key_name == BASE_GROUP_KEY_NAME
            || view.access_groups.contains_key(&member_key);
        if !member_group_exists {
            return Err(ConnectError::MemberAccessGroupNotFound);
        }

        let full_key = (
            member.member_pkid.clone(),
            member.member_group_key_name.clone(),
            owner.clone(),
            payload.owner_group_key_name.clone(),
        );
        if let Some(existing) = view.access_group_members.get(&full_key) {
            if !existing.deleted {
                return Err(ConnectError::DuplicateAccessGroupMember);
            }
        }

        let prev = view.access_group_members.get(&full_key).cloned();
        journal.push(Op::SetAccessGroupMember {
            member_pkid: full_key.0.clone(),
            member_group_key_name: full_key.1.clone(),
            owner: full_key.2.clone(),
            owner_group_key_name: full_key.3.clone(),
            prev,
        });
        view.access_group_members.insert(
            full_key,
            AccessGroupMemberEntry {
                encrypted_key: member.encrypted_key.clone(),
                extra_data: member.extra_data.clone(),
                deleted: false,
            },
        );
    }
    Ok(())
}

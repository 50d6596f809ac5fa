//! Submit-post and update-profile connectors (§3, §4.1).

use crate::ledger::errors::ConnectError;
use crate::ledger::journal::Op;
use crate::ledger::state::{PostEntry, ProfileEntry};
use crate::ledger::view::LedgerView;
use crate::ledger::Journal;
use crate::transaction::payloads::social::{SubmitPostPayload, UpdateProfilePayload};
use crate::types::{Hash, Pkid};

pub fn connect_submit_post(
    view: &mut LedgerView,
    journal: &mut Journal,
    transactor: &Pkid,
    payload: &SubmitPostPayload,
) -> Result<(), ConnectError> {
    let post_hash = match &payload.post_hash_to_modify {
        Some(hash) => {
            let existing = view.posts.get(hash).ok_or(ConnectError::PostNotFound)?;
            if existing.poster != *transactor {
                return Err(ConnectError::PostNotFound);
            }
            hash.clone()
        }
        None => {
            let mut seed = payload.body.clone();
            seed.extend_from_slice(&(payload.body.len() as u64).to_le_bytes());
            Hash::from_bytes(&lib_crypto::hash_blake3(&seed))
        }
    };

    let prev = view.posts.get(&post_hash).cloned();
    journal.push(Op::SetPost {
        post_hash: post_hash.clone(),
        prev,
    });
    view.posts.insert(
        post_hash,
        PostEntry {
            poster: transactor.clone(),
            parent_post_hash: payload.parent_post_hash.clone(),
            body: payload.body.clone(),
            is_hidden: payload.is_hidden,
            extra_data: payload.extra_data.clone(),
        },
    );
    Ok(())
}

pub fn connect_update_profile(
    view: &mut LedgerView,
    journal: &mut Journal,
    transactor: &Pkid,
    payload: &UpdateProfilePayload,
) -> Result<(), ConnectError> {
    let mut entry = view.profiles.get(transactor).cloned().unwrap_or(ProfileEntry {
        username: None,
        description: None,
        profile_pic: None,
        is_hidden: false,
    });
    if payload.new_username.is_some() {
        entry.username = payload.new_username.clone();
    }
    if payload.new_description.is_some() {
        entry.description = payload.new_description.clone();
    }
    if payload.new_profile_pic.is_some() {
        entry.profile_pic = payload.new_profile_pic.clone();
    }
    entry.is_hidden = payload.is_hidden;

    let prev = view.profiles.get(transactor).cloned();
    journal.push(Op::SetProfile {
        pkid: transactor.clone(),
        prev,
    });
    view.profiles.insert(transactor.clone(), entry);
    Ok(())
}

use lib_crypto::PublicKey;
use serde::{Deserialize, Serialize};

/// Supplemented payloads (SPEC_FULL.md §B): spec.md's data model requires
/// a mutable `Validator Entry`/`Epoch Entry` but its transaction-type list
/// has no admission path for one. These five connectors are that path.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegisterValidatorPayload {
    pub voting_public_key: PublicKey,
    pub stake_amount_nanos: u64,
    pub commission_bps: u16,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UnregisterValidatorPayload;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StakePayload {
    pub additional_amount_nanos: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UnstakePayload {
    pub amount_nanos: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UnjailValidatorPayload;

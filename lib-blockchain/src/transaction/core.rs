//! The on-chain transaction envelope: sender, outputs, typed payload, fee,
//! nonce and signature (§3).

use lib_crypto::{PublicKey, Signature};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::transaction::payloads::{
    access_group::{AccessGroupCreatePayload, AccessGroupMembersPayload},
    admin::{GlobalParamsUpdatePayload, IdentitySwapPayload},
    coins::{CreatorCoinPayload, DaoCoinPayload, DaoCoinTransferPayload},
    derived_key::AuthorizeDerivedKeyPayload,
    limit_order::DaoCoinLimitOrderPayload,
    nft::NftPayload,
    social::{SubmitPostPayload, UpdateProfilePayload},
    validator::{
        RegisterValidatorPayload, StakePayload, UnjailValidatorPayload,
        UnregisterValidatorPayload, UnstakePayload,
    },
};
use crate::types::{Pkid, TransactionNonce};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TxOutput {
    pub recipient: Pkid,
    pub amount_nanos: u64,
}

/// Every transaction type the validator recognizes. The fourteen named in
/// `spec.md` §3 plus the five supplemented in `SPEC_FULL.md` §B.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum TransactionPayload {
    BasicTransfer,
    AuthorizeDerivedKey(AuthorizeDerivedKeyPayload),
    AccessGroupCreate(AccessGroupCreatePayload),
    AccessGroupMembers(AccessGroupMembersPayload),
    CreatorCoin(CreatorCoinPayload),
    DaoCoin(DaoCoinPayload),
    DaoCoinTransfer(DaoCoinTransferPayload),
    DaoCoinLimitOrder(DaoCoinLimitOrderPayload),
    Nft(NftPayload),
    SubmitPost(SubmitPostPayload),
    UpdateProfile(UpdateProfilePayload),
    UpdateGlobalParams(GlobalParamsUpdatePayload),
    IdentitySwap(IdentitySwapPayload),
    RegisterValidator(RegisterValidatorPayload),
    UnregisterValidator(UnregisterValidatorPayload),
    Stake(StakePayload),
    Unstake(UnstakePayload),
    UnjailValidator(UnjailValidatorPayload),
}

impl TransactionPayload {
    /// Stable discriminant used as the terminal journal tag (§9): disconnect
    /// asserts the journal's tag matches the transaction it is unwinding.
    pub fn type_tag(&self) -> &'static str {
        match self {
            Self::BasicTransfer => "BasicTransfer",
            Self::AuthorizeDerivedKey(_) => "AuthorizeDerivedKey",
            Self::AccessGroupCreate(_) => "AccessGroupCreate",
            Self::AccessGroupMembers(_) => "AccessGroupMembers",
            Self::CreatorCoin(_) => "CreatorCoin",
            Self::DaoCoin(_) => "DaoCoin",
            Self::DaoCoinTransfer(_) => "DaoCoinTransfer",
            Self::DaoCoinLimitOrder(_) => "DaoCoinLimitOrder",
            Self::Nft(_) => "Nft",
            Self::SubmitPost(_) => "SubmitPost",
            Self::UpdateProfile(_) => "UpdateProfile",
            Self::UpdateGlobalParams(_) => "UpdateGlobalParams",
            Self::IdentitySwap(_) => "IdentitySwap",
            Self::RegisterValidator(_) => "RegisterValidator",
            Self::UnregisterValidator(_) => "UnregisterValidator",
            Self::Stake(_) => "Stake",
            Self::Unstake(_) => "Unstake",
            Self::UnjailValidator(_) => "UnjailValidator",
        }
    }
}

/// Plain signature, or one of the two derived-key variants recognized by
/// the authorize-derived-key connector (§4.1).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum TxSignature {
    Plain(Signature),
    DerivedKey {
        derived_public_key: PublicKey,
        signature: Signature,
    },
    /// Post-fork variant covering the canonical UTF-8 string form produced
    /// by wallet-assembled ("metamask-style") signing flows.
    DerivedKeyMetamask {
        derived_public_key: PublicKey,
        signature: Signature,
    },
}

impl TxSignature {
    pub fn signer_public_key<'a>(&'a self, sender_public_key: &'a PublicKey) -> &'a PublicKey {
        match self {
            TxSignature::Plain(_) => sender_public_key,
            TxSignature::DerivedKey {
                derived_public_key, ..
            }
            | TxSignature::DerivedKeyMetamask {
                derived_public_key, ..
            } => derived_public_key,
        }
    }

    pub fn raw_signature(&self) -> &Signature {
        match self {
            TxSignature::Plain(sig) => sig,
            TxSignature::DerivedKey { signature, .. } => signature,
            TxSignature::DerivedKeyMetamask { signature, .. } => signature,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Transaction {
    pub version: u32,
    pub sender_public_key: PublicKey,
    pub outputs: Vec<TxOutput>,
    pub payload: TransactionPayload,
    pub extra_data: HashMap<String, Vec<u8>>,
    pub fee_per_kb_nanos: u64,
    pub declared_fee_nanos: u64,
    pub nonce: TransactionNonce,
    pub signature: TxSignature,
}

impl Transaction {
    pub fn total_output_nanos(&self) -> u64 {
        self.outputs.iter().map(|o| o.amount_nanos).sum()
    }

    pub fn sender_pkid(&self) -> Pkid {
        Pkid::from_public_key(&self.sender_public_key)
    }

    pub fn is_derived_key_signed(&self) -> bool {
        !matches!(self.signature, TxSignature::Plain(_))
    }
}

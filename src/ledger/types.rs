//! Transient ledger values threaded through a workflow run.
//!
//! Nothing here is persisted; entity ids and receipts are whatever the
//! network handed back for the lifetime of one run.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use thiserror::Error;

use crate::ledger::keys::PublicKey;

pub const TINYBARS_PER_HBAR: i64 = 100_000_000;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum IdParseError {
    #[error("entity id `{0}` is not of the form shard.realm.num")]
    Malformed(String),
}

macro_rules! entity_id {
    ($name:ident) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
        pub struct $name {
            pub shard: u64,
            pub realm: u64,
            pub num: u64,
        }

        impl $name {
            pub fn new(shard: u64, realm: u64, num: u64) -> Self {
                Self { shard, realm, num }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}.{}.{}", self.shard, self.realm, self.num)
            }
        }

        impl FromStr for $name {
            type Err = IdParseError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                let mut parts = s.split('.');
                let (shard, realm, num) = match (
                    parts.next(),
                    parts.next(),
                    parts.next(),
                    parts.next(),
                ) {
                    (Some(shard), Some(realm), Some(num), None) => (shard, realm, num),
                    _ => return Err(IdParseError::Malformed(s.to_string())),
                };
                let parse = |part: &str| {
                    part.parse::<u64>()
                        .map_err(|_| IdParseError::Malformed(s.to_string()))
                };
                Ok(Self {
                    shard: parse(shard)?,
                    realm: parse(realm)?,
                    num: parse(num)?,
                })
            }
        }

        impl Serialize for $name {
            fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
                serializer.collect_str(self)
            }
        }

        impl<'de> Deserialize<'de> for $name {
            fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
                let raw = String::deserialize(deserializer)?;
                raw.parse().map_err(serde::de::Error::custom)
            }
        }
    };
}

entity_id!(AccountId);
entity_id!(TokenId);

/// One minted instance of a non-fungible token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct NftId {
    pub token_id: TokenId,
    pub serial: i64,
}

impl NftId {
    pub fn new(token_id: TokenId, serial: i64) -> Self {
        Self { token_id, serial }
    }
}

impl fmt::Display for NftId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.token_id, self.serial)
    }
}

/// Whole-unit wrapper over the network's smallest denomination.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Hbar(i64);

impl Hbar {
    pub const fn new(hbars: i64) -> Self {
        Self(hbars * TINYBARS_PER_HBAR)
    }

    pub const fn from_tinybars(tinybars: i64) -> Self {
        Self(tinybars)
    }

    pub const fn to_tinybars(self) -> i64 {
        self.0
    }

    pub const ZERO: Hbar = Hbar(0);
}

impl fmt::Display for Hbar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let whole = self.0 / TINYBARS_PER_HBAR;
        let frac = (self.0 % TINYBARS_PER_HBAR).abs();
        if frac == 0 {
            write!(f, "{} ℏ", whole)
        } else {
            let frac = format!("{:08}", frac);
            write!(f, "{}.{} ℏ", whole, frac.trim_end_matches('0'))
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TokenType {
    FungibleCommon,
    NonFungibleUnique,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TokenSupplyType {
    Infinite,
    Finite,
}

/// Everything the network needs to register a new token.
#[derive(Debug, Clone, PartialEq)]
pub struct TokenDefinition {
    pub name: String,
    pub symbol: String,
    pub token_type: TokenType,
    pub decimals: u32,
    pub initial_supply: u64,
    pub supply_type: TokenSupplyType,
    pub max_supply: Option<u64>,
    pub treasury: AccountId,
    pub supply_key: PublicKey,
}

/// A fungible transfer intent: signed per-account adjustments that must
/// sum to zero before the network will accept them.
#[derive(Debug, Clone, PartialEq)]
pub struct TransferList {
    pub token_id: TokenId,
    pub adjustments: Vec<(AccountId, i64)>,
}

impl TransferList {
    /// Debit `amount` units from `sender` and credit them to `receiver`.
    pub fn between(token_id: TokenId, sender: AccountId, receiver: AccountId, amount: i64) -> Self {
        Self {
            token_id,
            adjustments: vec![(sender, -amount), (receiver, amount)],
        }
    }

    pub fn net(&self) -> i64 {
        self.adjustments.iter().map(|(_, amount)| amount).sum()
    }
}

/// Receipt status codes the workflows actually run into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TransactionStatus {
    Success,
    InvalidSignature,
    TokenNotAssociatedToAccount,
    TokenAlreadyAssociatedToAccount,
    InsufficientTokenBalance,
    TokenMaxSupplyReached,
    InvalidAccountAmounts,
    SenderDoesNotOwnNftSerial,
}

impl TransactionStatus {
    pub fn is_success(self) -> bool {
        self == TransactionStatus::Success
    }
}

impl fmt::Display for TransactionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            TransactionStatus::Success => "SUCCESS",
            TransactionStatus::InvalidSignature => "INVALID_SIGNATURE",
            TransactionStatus::TokenNotAssociatedToAccount => "TOKEN_NOT_ASSOCIATED_TO_ACCOUNT",
            TransactionStatus::TokenAlreadyAssociatedToAccount => {
                "TOKEN_ALREADY_ASSOCIATED_TO_ACCOUNT"
            }
            TransactionStatus::InsufficientTokenBalance => "INSUFFICIENT_TOKEN_BALANCE",
            TransactionStatus::TokenMaxSupplyReached => "TOKEN_MAX_SUPPLY_REACHED",
            TransactionStatus::InvalidAccountAmounts => "INVALID_ACCOUNT_AMOUNTS",
            TransactionStatus::SenderDoesNotOwnNftSerial => "SENDER_DOES_NOT_OWN_NFT_SERIAL",
        };
        f.write_str(name)
    }
}

/// Network confirmation of a submitted transaction. Entity ids are only
/// present for the transaction kinds that create them.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TransactionReceipt {
    pub status: TransactionStatus,
    pub transaction_id: String,
    pub consensus_at: DateTime<Utc>,
    pub account_id: Option<AccountId>,
    pub token_id: Option<TokenId>,
    pub serials: Vec<i64>,
}

/// Snapshot of an account's holdings at query time.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AccountBalance {
    pub account_id: AccountId,
    pub hbars: Hbar,
    pub tokens: BTreeMap<TokenId, u64>,
    pub nfts: BTreeMap<TokenId, Vec<i64>>,
}

impl AccountBalance {
    pub fn token_units(&self, token_id: &TokenId) -> u64 {
        self.tokens.get(token_id).copied().unwrap_or(0)
    }

    pub fn nft_serials(&self, token_id: &TokenId) -> Vec<i64> {
        self.nfts.get(token_id).cloned().unwrap_or_default()
    }
}

//! Ledger client error taxonomy.
//!
//! Mirrors the network's precheck/receipt split: these errors cover
//! requests that never reach consensus (malformed, unknown entities,
//! transport failures). Rejections that happen at consensus come back as a
//! [`TransactionReceipt`](crate::ledger::TransactionReceipt) with a
//! non-success status instead.

use thiserror::Error;

use crate::ledger::types::{AccountId, Hbar, TokenId, TokenType};

#[derive(Debug, Error)]
pub enum LedgerError {
    #[error("account {account} is not known on {network}")]
    UnknownAccount { account: AccountId, network: String },

    #[error("token {token} is not known on {network}")]
    UnknownToken { token: TokenId, network: String },

    #[error("token {token} is not of type {expected:?}")]
    WrongTokenType { token: TokenId, expected: TokenType },

    #[error("operator {operator} cannot cover the {required} starting balance")]
    InsufficientOperatorFunds { operator: AccountId, required: Hbar },

    #[error("invalid request: {message}")]
    InvalidRequest { message: String },

    #[error("transport failure talking to {network}: {message}")]
    Transport { network: String, message: String },
}

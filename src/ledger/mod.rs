pub mod client;
pub mod errors;
pub mod keys;
pub mod memory;
pub mod types;

pub use client::LedgerOps;
pub use errors::LedgerError;
pub use keys::{KeyParseError, PrivateKey, PublicKey};
pub use memory::InMemoryLedger;
pub use types::{
    AccountBalance, AccountId, Hbar, IdParseError, NftId, TokenDefinition, TokenId,
    TokenSupplyType, TokenType, TransactionReceipt, TransactionStatus, TransferList,
};

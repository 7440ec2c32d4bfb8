//! The ledger client contract.
//!
//! Provides the trait-based abstraction the workflows are written against,
//! enabling testable runs through dependency injection. A binding to a real
//! network SDK would implement this same trait; the workflows never know
//! which backend they are driving.

use async_trait::async_trait;

use crate::ledger::errors::LedgerError;
use crate::ledger::keys::{PrivateKey, PublicKey};
use crate::ledger::types::{
    AccountBalance, AccountId, Hbar, NftId, TokenDefinition, TokenId, TransactionReceipt,
    TransferList,
};

/// Operations a network-bound ledger client must expose.
///
/// Every mutating call names the signatory the network requires for it:
/// the treasury key for token creation, the supply key for minting, the
/// target account's own key for association, and the sender's key for
/// transfers. Passing the wrong key is the network's rejection to make,
/// not the caller's.
#[async_trait]
pub trait LedgerOps: Send + Sync {
    /// Submit an account-creation transaction, paid by the operator, and
    /// wait for its receipt carrying the assigned account id.
    async fn create_account(
        &self,
        key: PublicKey,
        initial_balance: Hbar,
    ) -> Result<TransactionReceipt, LedgerError>;

    /// Register a new token owned by its treasury account; the receipt
    /// carries the assigned token id.
    async fn create_token(
        &self,
        definition: &TokenDefinition,
        treasury_key: &PrivateKey,
    ) -> Result<TransactionReceipt, LedgerError>;

    /// Mint one serial per metadata entry under a non-fungible token; the
    /// receipt carries the assigned serial numbers.
    async fn mint_nft(
        &self,
        token: TokenId,
        metadata: Vec<Vec<u8>>,
        supply_key: &PrivateKey,
    ) -> Result<TransactionReceipt, LedgerError>;

    /// Opt an account in to holding a token.
    async fn associate_token(
        &self,
        account: AccountId,
        token: TokenId,
        account_key: &PrivateKey,
    ) -> Result<TransactionReceipt, LedgerError>;

    /// Apply a zero-sum list of fungible adjustments.
    async fn transfer_tokens(
        &self,
        transfer: &TransferList,
        signer: &PrivateKey,
    ) -> Result<TransactionReceipt, LedgerError>;

    /// Move one minted serial between accounts.
    async fn transfer_nft(
        &self,
        nft: NftId,
        sender: AccountId,
        receiver: AccountId,
        signer: &PrivateKey,
    ) -> Result<TransactionReceipt, LedgerError>;

    /// Read-only holdings snapshot for an account.
    async fn account_balance(&self, account: AccountId)
        -> Result<AccountBalance, LedgerError>;

    /// Name of the network environment this client is bound to.
    fn network(&self) -> &str;

    /// The operator account paying for submitted transactions.
    fn operator(&self) -> AccountId;
}

//! Shared fixtures for workflow integration tests: a pre-funded in-process
//! ledger, a call-recording wrapper, and receipt builders for mocks.
#![allow(dead_code)]

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::Utc;

use mintline::ledger::{
    AccountBalance, AccountId, Hbar, InMemoryLedger, LedgerError, LedgerOps, NftId, PrivateKey,
    PublicKey, TokenDefinition, TokenId, TransactionReceipt, TransactionStatus, TransferList,
};

pub const OPERATOR_ID: &str = "0.0.2";

/// An in-process testnet with a funded operator, as the binary would build it.
pub fn seeded_ledger() -> InMemoryLedger {
    let operator: AccountId = OPERATOR_ID.parse().unwrap();
    let operator_key = PrivateKey::generate();
    InMemoryLedger::bootstrap("testnet", operator, operator_key.public_key())
}

/// One observed call against the ledger client contract.
#[derive(Debug, Clone)]
pub enum LedgerCall {
    CreateAccount {
        key: PublicKey,
        initial_balance: Hbar,
    },
    CreateToken {
        definition: TokenDefinition,
        signer: PublicKey,
    },
    MintNft {
        token: TokenId,
        metadata: Vec<Vec<u8>>,
        signer: PublicKey,
    },
    AssociateToken {
        account: AccountId,
        token: TokenId,
        signer: PublicKey,
    },
    TransferTokens {
        transfer: TransferList,
        signer: PublicKey,
    },
    TransferNft {
        nft: NftId,
        sender: AccountId,
        receiver: AccountId,
        signer: PublicKey,
    },
    AccountBalance {
        account: AccountId,
    },
}

impl LedgerCall {
    pub fn kind(&self) -> &'static str {
        match self {
            LedgerCall::CreateAccount { .. } => "create_account",
            LedgerCall::CreateToken { .. } => "create_token",
            LedgerCall::MintNft { .. } => "mint_nft",
            LedgerCall::AssociateToken { .. } => "associate_token",
            LedgerCall::TransferTokens { .. } => "transfer_tokens",
            LedgerCall::TransferNft { .. } => "transfer_nft",
            LedgerCall::AccountBalance { .. } => "account_balance",
        }
    }
}

/// Wraps any backend and records every call before delegating, so tests
/// can assert the exact order and signatories of a run.
pub struct RecordingLedger<C> {
    inner: C,
    calls: Arc<Mutex<Vec<LedgerCall>>>,
}

impl<C> RecordingLedger<C> {
    pub fn new(inner: C) -> Self {
        Self {
            inner,
            calls: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn call_log(&self) -> Arc<Mutex<Vec<LedgerCall>>> {
        Arc::clone(&self.calls)
    }

    fn record(&self, call: LedgerCall) {
        self.calls.lock().unwrap().push(call);
    }
}

#[async_trait]
impl<C: LedgerOps> LedgerOps for RecordingLedger<C> {
    async fn create_account(
        &self,
        key: PublicKey,
        initial_balance: Hbar,
    ) -> Result<TransactionReceipt, LedgerError> {
        self.record(LedgerCall::CreateAccount {
            key,
            initial_balance,
        });
        self.inner.create_account(key, initial_balance).await
    }

    async fn create_token(
        &self,
        definition: &TokenDefinition,
        treasury_key: &PrivateKey,
    ) -> Result<TransactionReceipt, LedgerError> {
        self.record(LedgerCall::CreateToken {
            definition: definition.clone(),
            signer: treasury_key.public_key(),
        });
        self.inner.create_token(definition, treasury_key).await
    }

    async fn mint_nft(
        &self,
        token: TokenId,
        metadata: Vec<Vec<u8>>,
        supply_key: &PrivateKey,
    ) -> Result<TransactionReceipt, LedgerError> {
        self.record(LedgerCall::MintNft {
            token,
            metadata: metadata.clone(),
            signer: supply_key.public_key(),
        });
        self.inner.mint_nft(token, metadata, supply_key).await
    }

    async fn associate_token(
        &self,
        account: AccountId,
        token: TokenId,
        account_key: &PrivateKey,
    ) -> Result<TransactionReceipt, LedgerError> {
        self.record(LedgerCall::AssociateToken {
            account,
            token,
            signer: account_key.public_key(),
        });
        self.inner.associate_token(account, token, account_key).await
    }

    async fn transfer_tokens(
        &self,
        transfer: &TransferList,
        signer: &PrivateKey,
    ) -> Result<TransactionReceipt, LedgerError> {
        self.record(LedgerCall::TransferTokens {
            transfer: transfer.clone(),
            signer: signer.public_key(),
        });
        self.inner.transfer_tokens(transfer, signer).await
    }

    async fn transfer_nft(
        &self,
        nft: NftId,
        sender: AccountId,
        receiver: AccountId,
        signer: &PrivateKey,
    ) -> Result<TransactionReceipt, LedgerError> {
        self.record(LedgerCall::TransferNft {
            nft,
            sender,
            receiver,
            signer: signer.public_key(),
        });
        self.inner.transfer_nft(nft, sender, receiver, signer).await
    }

    async fn account_balance(
        &self,
        account: AccountId,
    ) -> Result<AccountBalance, LedgerError> {
        self.record(LedgerCall::AccountBalance { account });
        self.inner.account_balance(account).await
    }

    fn network(&self) -> &str {
        self.inner.network()
    }

    fn operator(&self) -> AccountId {
        self.inner.operator()
    }
}

/// Bare receipt with the given status, for mock returns.
pub fn receipt(status: TransactionStatus) -> TransactionReceipt {
    TransactionReceipt {
        status,
        transaction_id: format!("{OPERATOR_ID}@0.0"),
        consensus_at: Utc::now(),
        account_id: None,
        token_id: None,
        serials: Vec::new(),
    }
}

pub fn account_receipt(account: AccountId) -> TransactionReceipt {
    let mut receipt = receipt(TransactionStatus::Success);
    receipt.account_id = Some(account);
    receipt
}

pub fn token_receipt(token: TokenId) -> TransactionReceipt {
    let mut receipt = receipt(TransactionStatus::Success);
    receipt.token_id = Some(token);
    receipt
}

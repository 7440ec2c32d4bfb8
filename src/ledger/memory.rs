//! In-process ledger backend.
//!
//! Stands in for a live network so the workflows can run end to end
//! without credentials for one: it keeps account and token bookkeeping in
//! memory and enforces the same authorization rules a network would —
//! treasury signature for token creation, supply key for minting, the
//! account's own key for association, the sender's key for transfers.
//! It implements no wire format, consensus, or networking; the
//! [`LedgerOps`] seam is where a real SDK binding would plug in.

use std::collections::{BTreeMap, BTreeSet};
use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;
use chrono::Utc;

use crate::ledger::client::LedgerOps;
use crate::ledger::errors::LedgerError;
use crate::ledger::keys::{PrivateKey, PublicKey};
use crate::ledger::types::{
    AccountBalance, AccountId, Hbar, NftId, TokenDefinition, TokenId, TokenSupplyType, TokenType,
    TransactionReceipt, TransactionStatus, TransferList,
};

/// What a testnet faucet leaves in a freshly funded operator account.
const OPERATOR_STARTING_FUNDS: Hbar = Hbar::new(10_000);

/// Entity numbering starts above the network's reserved range.
const FIRST_USER_ENTITY: u64 = 1000;

#[derive(Debug, Clone)]
struct AccountState {
    key: PublicKey,
    hbars: i64,
    tokens: BTreeMap<TokenId, u64>,
    nfts: BTreeMap<TokenId, BTreeSet<i64>>,
    associations: BTreeSet<TokenId>,
}

impl AccountState {
    fn new(key: PublicKey, balance: Hbar) -> Self {
        Self {
            key,
            hbars: balance.to_tinybars(),
            tokens: BTreeMap::new(),
            nfts: BTreeMap::new(),
            associations: BTreeSet::new(),
        }
    }
}

#[derive(Debug, Clone)]
struct TokenState {
    token_type: TokenType,
    supply_type: TokenSupplyType,
    max_supply: Option<u64>,
    treasury: AccountId,
    supply_key: PublicKey,
    total_supply: u64,
    next_serial: i64,
    metadata: BTreeMap<i64, Vec<u8>>,
}

#[derive(Debug)]
struct LedgerState {
    accounts: BTreeMap<AccountId, AccountState>,
    tokens: BTreeMap<TokenId, TokenState>,
    next_entity_num: u64,
}

/// A self-contained ledger environment bound to a network name and a
/// pre-funded operator account.
#[derive(Debug)]
pub struct InMemoryLedger {
    network: String,
    operator: AccountId,
    state: Mutex<LedgerState>,
}

impl InMemoryLedger {
    pub fn bootstrap(
        network: impl Into<String>,
        operator: AccountId,
        operator_key: PublicKey,
    ) -> Self {
        let mut accounts = BTreeMap::new();
        accounts.insert(operator, AccountState::new(operator_key, OPERATOR_STARTING_FUNDS));
        Self {
            network: network.into(),
            operator,
            state: Mutex::new(LedgerState {
                accounts,
                tokens: BTreeMap::new(),
                next_entity_num: operator.num.max(FIRST_USER_ENTITY) + 1,
            }),
        }
    }

    fn state(&self) -> MutexGuard<'_, LedgerState> {
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn receipt(&self, status: TransactionStatus) -> TransactionReceipt {
        let now = Utc::now();
        TransactionReceipt {
            status,
            transaction_id: format!(
                "{}@{}.{}",
                self.operator,
                now.timestamp(),
                now.timestamp_subsec_nanos()
            ),
            consensus_at: now,
            account_id: None,
            token_id: None,
            serials: Vec::new(),
        }
    }

    fn unknown_account(&self, account: AccountId) -> LedgerError {
        LedgerError::UnknownAccount {
            account,
            network: self.network.clone(),
        }
    }

    fn unknown_token(&self, token: TokenId) -> LedgerError {
        LedgerError::UnknownToken {
            token,
            network: self.network.clone(),
        }
    }
}

#[async_trait]
impl LedgerOps for InMemoryLedger {
    async fn create_account(
        &self,
        key: PublicKey,
        initial_balance: Hbar,
    ) -> Result<TransactionReceipt, LedgerError> {
        if initial_balance < Hbar::ZERO {
            return Err(LedgerError::InvalidRequest {
                message: "starting balance must not be negative".to_string(),
            });
        }
        let mut state = self.state();
        let funds = initial_balance.to_tinybars();
        let operator = state
            .accounts
            .get_mut(&self.operator)
            .ok_or_else(|| self.unknown_account(self.operator))?;
        if operator.hbars < funds {
            return Err(LedgerError::InsufficientOperatorFunds {
                operator: self.operator,
                required: initial_balance,
            });
        }
        operator.hbars -= funds;

        let num = state.next_entity_num;
        state.next_entity_num += 1;
        let account_id = AccountId::new(self.operator.shard, self.operator.realm, num);
        state
            .accounts
            .insert(account_id, AccountState::new(key, initial_balance));

        tracing::debug!(%account_id, "account created");
        let mut receipt = self.receipt(TransactionStatus::Success);
        receipt.account_id = Some(account_id);
        Ok(receipt)
    }

    async fn create_token(
        &self,
        definition: &TokenDefinition,
        treasury_key: &PrivateKey,
    ) -> Result<TransactionReceipt, LedgerError> {
        if definition.supply_type == TokenSupplyType::Finite && definition.max_supply.is_none() {
            return Err(LedgerError::InvalidRequest {
                message: "finite supply tokens need a max supply".to_string(),
            });
        }
        if definition.token_type == TokenType::NonFungibleUnique
            && (definition.decimals != 0 || definition.initial_supply != 0)
        {
            return Err(LedgerError::InvalidRequest {
                message: "non-fungible tokens start at zero supply with zero decimals".to_string(),
            });
        }
        let mut state = self.state();
        let treasury_account = state
            .accounts
            .get(&definition.treasury)
            .ok_or_else(|| self.unknown_account(definition.treasury))?;
        if treasury_account.key != treasury_key.public_key() {
            return Ok(self.receipt(TransactionStatus::InvalidSignature));
        }

        let num = state.next_entity_num;
        state.next_entity_num += 1;
        let token_id = TokenId::new(definition.treasury.shard, definition.treasury.realm, num);
        state.tokens.insert(
            token_id,
            TokenState {
                token_type: definition.token_type,
                supply_type: definition.supply_type,
                max_supply: definition.max_supply,
                treasury: definition.treasury,
                supply_key: definition.supply_key,
                total_supply: definition.initial_supply,
                next_serial: 1,
                metadata: BTreeMap::new(),
            },
        );

        // The treasury holds the whole initial supply and is associated
        // implicitly, the way networks treat token owners.
        let treasury_account = state
            .accounts
            .get_mut(&definition.treasury)
            .ok_or_else(|| self.unknown_account(definition.treasury))?;
        treasury_account.associations.insert(token_id);
        if definition.initial_supply > 0 {
            treasury_account.tokens.insert(token_id, definition.initial_supply);
        }

        tracing::debug!(%token_id, symbol = %definition.symbol, "token created");
        let mut receipt = self.receipt(TransactionStatus::Success);
        receipt.token_id = Some(token_id);
        Ok(receipt)
    }

    async fn mint_nft(
        &self,
        token: TokenId,
        metadata: Vec<Vec<u8>>,
        supply_key: &PrivateKey,
    ) -> Result<TransactionReceipt, LedgerError> {
        if metadata.is_empty() {
            return Err(LedgerError::InvalidRequest {
                message: "minting requires at least one metadata entry".to_string(),
            });
        }
        let mut state = self.state();
        let token_state = state
            .tokens
            .get_mut(&token)
            .ok_or_else(|| self.unknown_token(token))?;
        if token_state.token_type != TokenType::NonFungibleUnique {
            return Err(LedgerError::WrongTokenType {
                token,
                expected: TokenType::NonFungibleUnique,
            });
        }
        if token_state.supply_key != supply_key.public_key() {
            return Ok(self.receipt(TransactionStatus::InvalidSignature));
        }
        let minted = metadata.len() as u64;
        if let Some(max) = token_state.max_supply {
            if token_state.total_supply + minted > max {
                return Ok(self.receipt(TransactionStatus::TokenMaxSupplyReached));
            }
        }

        let mut serials = Vec::with_capacity(metadata.len());
        for entry in metadata {
            let serial = token_state.next_serial;
            token_state.next_serial += 1;
            token_state.metadata.insert(serial, entry);
            serials.push(serial);
        }
        token_state.total_supply += minted;
        let treasury = token_state.treasury;

        let treasury_account = state
            .accounts
            .get_mut(&treasury)
            .ok_or_else(|| self.unknown_account(treasury))?;
        treasury_account
            .nfts
            .entry(token)
            .or_default()
            .extend(serials.iter().copied());

        tracing::debug!(%token, ?serials, "minted");
        let mut receipt = self.receipt(TransactionStatus::Success);
        receipt.token_id = Some(token);
        receipt.serials = serials;
        Ok(receipt)
    }

    async fn associate_token(
        &self,
        account: AccountId,
        token: TokenId,
        account_key: &PrivateKey,
    ) -> Result<TransactionReceipt, LedgerError> {
        let mut state = self.state();
        if !state.tokens.contains_key(&token) {
            return Err(self.unknown_token(token));
        }
        let account_state = state
            .accounts
            .get_mut(&account)
            .ok_or_else(|| self.unknown_account(account))?;
        if account_state.key != account_key.public_key() {
            return Ok(self.receipt(TransactionStatus::InvalidSignature));
        }
        if !account_state.associations.insert(token) {
            return Ok(self.receipt(TransactionStatus::TokenAlreadyAssociatedToAccount));
        }
        tracing::debug!(%account, %token, "associated");
        Ok(self.receipt(TransactionStatus::Success))
    }

    async fn transfer_tokens(
        &self,
        transfer: &TransferList,
        signer: &PrivateKey,
    ) -> Result<TransactionReceipt, LedgerError> {
        if transfer.adjustments.is_empty() {
            return Err(LedgerError::InvalidRequest {
                message: "a transfer needs at least one adjustment".to_string(),
            });
        }
        let mut state = self.state();
        let token_state = state
            .tokens
            .get(&transfer.token_id)
            .ok_or_else(|| self.unknown_token(transfer.token_id))?;
        if token_state.token_type != TokenType::FungibleCommon {
            return Err(LedgerError::WrongTokenType {
                token: transfer.token_id,
                expected: TokenType::FungibleCommon,
            });
        }
        if transfer.net() != 0 {
            return Ok(self.receipt(TransactionStatus::InvalidAccountAmounts));
        }

        let signer_key = signer.public_key();
        for (account, amount) in &transfer.adjustments {
            let account_state = state
                .accounts
                .get(account)
                .ok_or_else(|| self.unknown_account(*account))?;
            if !account_state.associations.contains(&transfer.token_id) {
                return Ok(self.receipt(TransactionStatus::TokenNotAssociatedToAccount));
            }
            if *amount < 0 {
                if account_state.key != signer_key {
                    return Ok(self.receipt(TransactionStatus::InvalidSignature));
                }
                let held = account_state
                    .tokens
                    .get(&transfer.token_id)
                    .copied()
                    .unwrap_or(0);
                if held < amount.unsigned_abs() {
                    return Ok(self.receipt(TransactionStatus::InsufficientTokenBalance));
                }
            }
        }

        for (account, amount) in &transfer.adjustments {
            let account_state = state
                .accounts
                .get_mut(account)
                .ok_or_else(|| self.unknown_account(*account))?;
            let held = account_state
                .tokens
                .entry(transfer.token_id)
                .or_insert(0);
            if *amount < 0 {
                *held -= amount.unsigned_abs();
            } else {
                *held += *amount as u64;
            }
        }

        tracing::debug!(token = %transfer.token_id, "fungible transfer applied");
        Ok(self.receipt(TransactionStatus::Success))
    }

    async fn transfer_nft(
        &self,
        nft: NftId,
        sender: AccountId,
        receiver: AccountId,
        signer: &PrivateKey,
    ) -> Result<TransactionReceipt, LedgerError> {
        let mut state = self.state();
        let token_state = state
            .tokens
            .get(&nft.token_id)
            .ok_or_else(|| self.unknown_token(nft.token_id))?;
        if token_state.token_type != TokenType::NonFungibleUnique {
            return Err(LedgerError::WrongTokenType {
                token: nft.token_id,
                expected: TokenType::NonFungibleUnique,
            });
        }
        if !state.accounts.contains_key(&receiver) {
            return Err(self.unknown_account(receiver));
        }
        let sender_state = state
            .accounts
            .get(&sender)
            .ok_or_else(|| self.unknown_account(sender))?;
        if sender_state.key != signer.public_key() {
            return Ok(self.receipt(TransactionStatus::InvalidSignature));
        }
        let owns_serial = sender_state
            .nfts
            .get(&nft.token_id)
            .is_some_and(|serials| serials.contains(&nft.serial));
        if !owns_serial {
            return Ok(self.receipt(TransactionStatus::SenderDoesNotOwnNftSerial));
        }
        let receiver_state = state
            .accounts
            .get(&receiver)
            .ok_or_else(|| self.unknown_account(receiver))?;
        if !receiver_state.associations.contains(&nft.token_id) {
            return Ok(self.receipt(TransactionStatus::TokenNotAssociatedToAccount));
        }

        let sender_state = state
            .accounts
            .get_mut(&sender)
            .ok_or_else(|| self.unknown_account(sender))?;
        if let Some(serials) = sender_state.nfts.get_mut(&nft.token_id) {
            serials.remove(&nft.serial);
        }
        let receiver_state = state
            .accounts
            .get_mut(&receiver)
            .ok_or_else(|| self.unknown_account(receiver))?;
        receiver_state
            .nfts
            .entry(nft.token_id)
            .or_default()
            .insert(nft.serial);

        tracing::debug!(%nft, %sender, %receiver, "nft transfer applied");
        Ok(self.receipt(TransactionStatus::Success))
    }

    async fn account_balance(
        &self,
        account: AccountId,
    ) -> Result<AccountBalance, LedgerError> {
        let state = self.state();
        let account_state = state
            .accounts
            .get(&account)
            .ok_or_else(|| self.unknown_account(account))?;
        Ok(AccountBalance {
            account_id: account,
            hbars: Hbar::from_tinybars(account_state.hbars),
            tokens: account_state.tokens.clone(),
            nfts: account_state
                .nfts
                .iter()
                .map(|(token, serials)| (*token, serials.iter().copied().collect()))
                .collect(),
        })
    }

    fn network(&self) -> &str {
        &self.network
    }

    fn operator(&self) -> AccountId {
        self.operator
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn operator_id() -> AccountId {
        AccountId::new(0, 0, 2)
    }

    fn ledger() -> (InMemoryLedger, PrivateKey) {
        let operator_key = PrivateKey::generate();
        let ledger = InMemoryLedger::bootstrap("testnet", operator_id(), operator_key.public_key());
        (ledger, operator_key)
    }

    async fn funded_account(ledger: &InMemoryLedger) -> (AccountId, PrivateKey) {
        let key = PrivateKey::generate();
        let receipt = ledger
            .create_account(key.public_key(), Hbar::new(10))
            .await
            .unwrap();
        (receipt.account_id.unwrap(), key)
    }

    fn fungible_definition(treasury: AccountId, supply_key: PublicKey) -> TokenDefinition {
        TokenDefinition {
            name: "USD Bar".to_string(),
            symbol: "USDB".to_string(),
            token_type: TokenType::FungibleCommon,
            decimals: 2,
            initial_supply: 10_000,
            supply_type: TokenSupplyType::Infinite,
            max_supply: None,
            treasury,
            supply_key,
        }
    }

    fn nft_definition(treasury: AccountId, supply_key: PublicKey) -> TokenDefinition {
        TokenDefinition {
            name: "diploma".to_string(),
            symbol: "GRAD".to_string(),
            token_type: TokenType::NonFungibleUnique,
            decimals: 0,
            initial_supply: 0,
            supply_type: TokenSupplyType::Finite,
            max_supply: Some(2),
            treasury,
            supply_key,
        }
    }

    #[tokio::test]
    async fn accounts_get_sequential_ids_and_operator_pays() {
        let (ledger, _) = ledger();
        let (first, _) = funded_account(&ledger).await;
        let (second, _) = funded_account(&ledger).await;
        assert_eq!(second.num, first.num + 1);

        let operator_balance = ledger.account_balance(operator_id()).await.unwrap();
        assert_eq!(operator_balance.hbars, Hbar::new(10_000 - 20));
    }

    #[tokio::test]
    async fn token_creation_needs_the_treasury_signature() {
        let (ledger, _) = ledger();
        let (treasury, treasury_key) = funded_account(&ledger).await;
        let supply_key = PrivateKey::generate();
        let definition = fungible_definition(treasury, supply_key.public_key());

        let forged = ledger
            .create_token(&definition, &PrivateKey::generate())
            .await
            .unwrap();
        assert_eq!(forged.status, TransactionStatus::InvalidSignature);
        assert!(forged.token_id.is_none());

        let receipt = ledger.create_token(&definition, &treasury_key).await.unwrap();
        assert_eq!(receipt.status, TransactionStatus::Success);
        let token_id = receipt.token_id.unwrap();

        let balance = ledger.account_balance(treasury).await.unwrap();
        assert_eq!(balance.token_units(&token_id), 10_000);
    }

    #[tokio::test]
    async fn association_requires_the_accounts_own_key_and_is_one_shot() {
        let (ledger, _) = ledger();
        let (treasury, treasury_key) = funded_account(&ledger).await;
        let (other, other_key) = funded_account(&ledger).await;
        let definition = fungible_definition(treasury, PrivateKey::generate().public_key());
        let token_id = ledger
            .create_token(&definition, &treasury_key)
            .await
            .unwrap()
            .token_id
            .unwrap();

        let wrong = ledger
            .associate_token(other, token_id, &treasury_key)
            .await
            .unwrap();
        assert_eq!(wrong.status, TransactionStatus::InvalidSignature);

        let first = ledger.associate_token(other, token_id, &other_key).await.unwrap();
        assert_eq!(first.status, TransactionStatus::Success);

        let again = ledger.associate_token(other, token_id, &other_key).await.unwrap();
        assert_eq!(
            again.status,
            TransactionStatus::TokenAlreadyAssociatedToAccount
        );
    }

    #[tokio::test]
    async fn minting_respects_the_supply_key_and_the_finite_cap() {
        let (ledger, _) = ledger();
        let (treasury, treasury_key) = funded_account(&ledger).await;
        let supply_key = PrivateKey::generate();
        let definition = nft_definition(treasury, supply_key.public_key());
        let token_id = ledger
            .create_token(&definition, &treasury_key)
            .await
            .unwrap()
            .token_id
            .unwrap();

        let forged = ledger
            .mint_nft(token_id, vec![b"cid".to_vec()], &treasury_key)
            .await
            .unwrap();
        assert_eq!(forged.status, TransactionStatus::InvalidSignature);

        let first = ledger
            .mint_nft(token_id, vec![b"one".to_vec(), b"two".to_vec()], &supply_key)
            .await
            .unwrap();
        assert_eq!(first.status, TransactionStatus::Success);
        assert_eq!(first.serials, vec![1, 2]);

        let capped = ledger
            .mint_nft(token_id, vec![b"three".to_vec()], &supply_key)
            .await
            .unwrap();
        assert_eq!(capped.status, TransactionStatus::TokenMaxSupplyReached);
    }

    #[tokio::test]
    async fn fungible_transfers_enforce_association_zero_sum_and_funds() {
        let (ledger, _) = ledger();
        let (treasury, treasury_key) = funded_account(&ledger).await;
        let (receiver, receiver_key) = funded_account(&ledger).await;
        let definition = fungible_definition(treasury, PrivateKey::generate().public_key());
        let token_id = ledger
            .create_token(&definition, &treasury_key)
            .await
            .unwrap()
            .token_id
            .unwrap();

        let unassociated = ledger
            .transfer_tokens(
                &TransferList::between(token_id, treasury, receiver, 100),
                &treasury_key,
            )
            .await
            .unwrap();
        assert_eq!(
            unassociated.status,
            TransactionStatus::TokenNotAssociatedToAccount
        );

        ledger
            .associate_token(receiver, token_id, &receiver_key)
            .await
            .unwrap();

        let lopsided = TransferList {
            token_id,
            adjustments: vec![(treasury, -100), (receiver, 50)],
        };
        let rejected = ledger.transfer_tokens(&lopsided, &treasury_key).await.unwrap();
        assert_eq!(rejected.status, TransactionStatus::InvalidAccountAmounts);

        let overdraft = ledger
            .transfer_tokens(
                &TransferList::between(token_id, treasury, receiver, 20_000),
                &treasury_key,
            )
            .await
            .unwrap();
        assert_eq!(
            overdraft.status,
            TransactionStatus::InsufficientTokenBalance
        );

        let applied = ledger
            .transfer_tokens(
                &TransferList::between(token_id, treasury, receiver, 2_500),
                &treasury_key,
            )
            .await
            .unwrap();
        assert_eq!(applied.status, TransactionStatus::Success);
        let treasury_balance = ledger.account_balance(treasury).await.unwrap();
        let receiver_balance = ledger.account_balance(receiver).await.unwrap();
        assert_eq!(treasury_balance.token_units(&token_id), 7_500);
        assert_eq!(receiver_balance.token_units(&token_id), 2_500);
    }

    #[tokio::test]
    async fn nft_transfers_track_serial_ownership() {
        let (ledger, _) = ledger();
        let (treasury, treasury_key) = funded_account(&ledger).await;
        let (receiver, receiver_key) = funded_account(&ledger).await;
        let supply_key = PrivateKey::generate();
        let definition = nft_definition(treasury, supply_key.public_key());
        let token_id = ledger
            .create_token(&definition, &treasury_key)
            .await
            .unwrap()
            .token_id
            .unwrap();
        ledger
            .mint_nft(token_id, vec![b"cid".to_vec()], &supply_key)
            .await
            .unwrap();
        ledger
            .associate_token(receiver, token_id, &receiver_key)
            .await
            .unwrap();

        let missing = ledger
            .transfer_nft(NftId::new(token_id, 9), treasury, receiver, &treasury_key)
            .await
            .unwrap();
        assert_eq!(
            missing.status,
            TransactionStatus::SenderDoesNotOwnNftSerial
        );

        let moved = ledger
            .transfer_nft(NftId::new(token_id, 1), treasury, receiver, &treasury_key)
            .await
            .unwrap();
        assert_eq!(moved.status, TransactionStatus::Success);

        let treasury_balance = ledger.account_balance(treasury).await.unwrap();
        let receiver_balance = ledger.account_balance(receiver).await.unwrap();
        assert!(treasury_balance.nft_serials(&token_id).is_empty());
        assert_eq!(receiver_balance.nft_serials(&token_id), vec![1]);
    }

    #[tokio::test]
    async fn balance_queries_for_unknown_accounts_fail_fast() {
        let (ledger, _) = ledger();
        let missing = AccountId::new(0, 0, 9999);
        let err = ledger.account_balance(missing).await.unwrap_err();
        assert!(matches!(err, LedgerError::UnknownAccount { account, .. } if account == missing));
    }
}

//! The two demonstration runs: fungible-unit and NFT transfers.
//!
//! Each run is a straight-line sequence against a [`LedgerOps`] backend —
//! no retries, no branching, no shared state beyond the values each step
//! hands to the next. Every receipt is checked before the run moves on;
//! the first rejection or transport failure halts the whole run.

use serde::Serialize;

use crate::ledger::{
    AccountBalance, AccountId, Hbar, LedgerOps, NftId, PrivateKey, TokenDefinition, TokenId,
    TokenSupplyType, TokenType, TransactionStatus, TransferList,
};
use crate::telemetry::generate_correlation_id;
use crate::workflows::steps::{confirmed, WorkflowError, WorkflowStep};

/// Parameters for the fungible run; defaults mirror the walkthrough's
/// stablecoin example.
#[derive(Debug, Clone)]
pub struct FungibleRun {
    pub token_name: String,
    pub token_symbol: String,
    pub decimals: u32,
    pub initial_supply: u64,
    pub transfer_amount: u64,
    pub starting_balance: Hbar,
}

impl Default for FungibleRun {
    fn default() -> Self {
        Self {
            token_name: "USD Bar".to_string(),
            token_symbol: "USDB".to_string(),
            decimals: 2,
            initial_supply: 10_000,
            transfer_amount: 2_500,
            starting_balance: Hbar::new(10),
        }
    }
}

/// Parameters for the NFT run; defaults mirror the walkthrough's diploma
/// example, metadata being an IPFS content identifier.
#[derive(Debug, Clone)]
pub struct NftRun {
    pub token_name: String,
    pub token_symbol: String,
    pub max_supply: u64,
    pub metadata_cid: String,
    pub starting_balance: Hbar,
}

impl Default for NftRun {
    fn default() -> Self {
        Self {
            token_name: "diploma".to_string(),
            token_symbol: "GRAD".to_string(),
            max_supply: 250,
            metadata_cid: "QmTzWcVfk88JRqjTpVwHzBeULRTNzHY7mnBSG42CpwHmPa".to_string(),
            starting_balance: Hbar::new(10),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct BalancePair {
    pub treasury: AccountBalance,
    pub receiver: AccountBalance,
}

#[derive(Debug, Clone, Serialize)]
pub struct FungibleTransferReport {
    pub network: String,
    pub operator: AccountId,
    pub treasury: AccountId,
    pub receiver: AccountId,
    pub token_id: TokenId,
    pub association_status: TransactionStatus,
    pub transfer_status: TransactionStatus,
    pub opening: BalancePair,
    pub closing: BalancePair,
}

#[derive(Debug, Clone, Serialize)]
pub struct NftTransferReport {
    pub network: String,
    pub operator: AccountId,
    pub treasury: AccountId,
    pub receiver: AccountId,
    pub token_id: TokenId,
    pub minted_serials: Vec<i64>,
    pub transferred: NftId,
    pub association_status: TransactionStatus,
    pub transfer_status: TransactionStatus,
    pub opening: BalancePair,
    pub closing: BalancePair,
}

/// Drives a run against whichever backend it was handed.
pub struct TransferWorkflow<C> {
    client: C,
    announce: bool,
}

impl<C: LedgerOps> TransferWorkflow<C> {
    pub fn new(client: C) -> Self {
        Self {
            client,
            announce: true,
        }
    }

    /// Silence the console transcript; reports still carry everything.
    pub fn with_announcements(mut self, announce: bool) -> Self {
        self.announce = announce;
        self
    }

    pub async fn run_fungible(
        &self,
        run: &FungibleRun,
    ) -> Result<FungibleTransferReport, WorkflowError> {
        let correlation_id = generate_correlation_id();
        tracing::info!(
            %correlation_id,
            network = self.client.network(),
            symbol = %run.token_symbol,
            "starting fungible transfer run"
        );
        if self.announce {
            println!(
                "🌐 Operator {} driving {}",
                self.client.operator(),
                self.client.network()
            );
        }

        let (treasury, treasury_key) = self
            .create_funded_account(WorkflowStep::CreateTreasuryAccount, run.starting_balance)
            .await?;
        if self.announce {
            println!("🏦 Treasury account created: {treasury}");
        }

        let (receiver, receiver_key) = self
            .create_funded_account(WorkflowStep::CreateReceiverAccount, run.starting_balance)
            .await?;
        if self.announce {
            println!("👤 Receiver account created: {receiver}");
        }

        let supply_key = PrivateKey::generate();
        let definition = TokenDefinition {
            name: run.token_name.clone(),
            symbol: run.token_symbol.clone(),
            token_type: TokenType::FungibleCommon,
            decimals: run.decimals,
            initial_supply: run.initial_supply,
            supply_type: TokenSupplyType::Infinite,
            max_supply: None,
            treasury,
            supply_key: supply_key.public_key(),
        };
        let token_id = self.create_token(&definition, &treasury_key).await?;
        if self.announce {
            println!("🪙 Created fungible token with token ID {token_id}");
        }

        let association_status = self
            .associate_receiver(receiver, token_id, &receiver_key)
            .await?;
        if self.announce {
            println!("🔗 Token association with the receiver's account: {association_status}");
        }

        let opening = self
            .balances(WorkflowStep::QueryOpeningBalances, treasury, receiver)
            .await?;
        self.announce_units(&opening, &token_id);

        let transfer =
            TransferList::between(token_id, treasury, receiver, run.transfer_amount as i64);
        let receipt = self
            .client
            .transfer_tokens(&transfer, &treasury_key)
            .await
            .map_err(|source| WorkflowError::Ledger {
                step: WorkflowStep::TransferToReceiver,
                source,
            })?;
        let transfer_status = confirmed(WorkflowStep::TransferToReceiver, receipt)?.status;
        if self.announce {
            println!("📤 Token transfer from treasury to receiver: {transfer_status}");
        }

        let closing = self
            .balances(WorkflowStep::QueryClosingBalances, treasury, receiver)
            .await?;
        self.announce_units(&closing, &token_id);

        tracing::info!(%correlation_id, %token_id, "fungible transfer run complete");
        Ok(FungibleTransferReport {
            network: self.client.network().to_string(),
            operator: self.client.operator(),
            treasury,
            receiver,
            token_id,
            association_status,
            transfer_status,
            opening,
            closing,
        })
    }

    pub async fn run_nft(&self, run: &NftRun) -> Result<NftTransferReport, WorkflowError> {
        let correlation_id = generate_correlation_id();
        tracing::info!(
            %correlation_id,
            network = self.client.network(),
            symbol = %run.token_symbol,
            "starting NFT transfer run"
        );
        if self.announce {
            println!(
                "🌐 Operator {} driving {}",
                self.client.operator(),
                self.client.network()
            );
        }

        let (treasury, treasury_key) = self
            .create_funded_account(WorkflowStep::CreateTreasuryAccount, run.starting_balance)
            .await?;
        if self.announce {
            println!("🏦 Treasury account created: {treasury}");
        }

        let (receiver, receiver_key) = self
            .create_funded_account(WorkflowStep::CreateReceiverAccount, run.starting_balance)
            .await?;
        if self.announce {
            println!("👤 Receiver account created: {receiver}");
        }

        let supply_key = PrivateKey::generate();
        let definition = TokenDefinition {
            name: run.token_name.clone(),
            symbol: run.token_symbol.clone(),
            token_type: TokenType::NonFungibleUnique,
            decimals: 0,
            initial_supply: 0,
            supply_type: TokenSupplyType::Finite,
            max_supply: Some(run.max_supply),
            treasury,
            supply_key: supply_key.public_key(),
        };
        let token_id = self.create_token(&definition, &treasury_key).await?;
        if self.announce {
            println!("🪙 Created NFT token with token ID {token_id}");
        }

        let receipt = self
            .client
            .mint_nft(
                token_id,
                vec![run.metadata_cid.clone().into_bytes()],
                &supply_key,
            )
            .await
            .map_err(|source| WorkflowError::Ledger {
                step: WorkflowStep::MintNft,
                source,
            })?;
        let receipt = confirmed(WorkflowStep::MintNft, receipt)?;
        let minted_serials = receipt.serials;
        let first_serial =
            minted_serials
                .first()
                .copied()
                .ok_or(WorkflowError::IncompleteReceipt {
                    step: WorkflowStep::MintNft,
                    what: "a serial number",
                })?;
        if self.announce {
            println!("🖼️  Minted NFT {token_id} with serials {minted_serials:?}");
        }

        let association_status = self
            .associate_receiver(receiver, token_id, &receiver_key)
            .await?;
        if self.announce {
            println!("🔗 NFT association with the receiver's account: {association_status}");
        }

        let opening = self
            .balances(WorkflowStep::QueryOpeningBalances, treasury, receiver)
            .await?;
        self.announce_serials(&opening, &token_id);

        let transferred = NftId::new(token_id, first_serial);
        let receipt = self
            .client
            .transfer_nft(transferred, treasury, receiver, &treasury_key)
            .await
            .map_err(|source| WorkflowError::Ledger {
                step: WorkflowStep::TransferToReceiver,
                source,
            })?;
        let transfer_status = confirmed(WorkflowStep::TransferToReceiver, receipt)?.status;
        if self.announce {
            println!("📤 NFT transfer from treasury to receiver: {transfer_status}");
        }

        let closing = self
            .balances(WorkflowStep::QueryClosingBalances, treasury, receiver)
            .await?;
        self.announce_serials(&closing, &token_id);

        tracing::info!(%correlation_id, %token_id, serial = first_serial, "NFT transfer run complete");
        Ok(NftTransferReport {
            network: self.client.network().to_string(),
            operator: self.client.operator(),
            treasury,
            receiver,
            token_id,
            minted_serials,
            transferred,
            association_status,
            transfer_status,
            opening,
            closing,
        })
    }

    async fn create_funded_account(
        &self,
        step: WorkflowStep,
        balance: Hbar,
    ) -> Result<(AccountId, PrivateKey), WorkflowError> {
        let key = PrivateKey::generate();
        let receipt = self
            .client
            .create_account(key.public_key(), balance)
            .await
            .map_err(|source| WorkflowError::Ledger { step, source })?;
        let receipt = confirmed(step, receipt)?;
        let account = receipt
            .account_id
            .ok_or(WorkflowError::IncompleteReceipt {
                step,
                what: "an account id",
            })?;
        Ok((account, key))
    }

    async fn create_token(
        &self,
        definition: &TokenDefinition,
        treasury_key: &PrivateKey,
    ) -> Result<TokenId, WorkflowError> {
        let step = WorkflowStep::CreateToken;
        let receipt = self
            .client
            .create_token(definition, treasury_key)
            .await
            .map_err(|source| WorkflowError::Ledger { step, source })?;
        let receipt = confirmed(step, receipt)?;
        receipt.token_id.ok_or(WorkflowError::IncompleteReceipt {
            step,
            what: "a token id",
        })
    }

    async fn associate_receiver(
        &self,
        receiver: AccountId,
        token_id: TokenId,
        receiver_key: &PrivateKey,
    ) -> Result<TransactionStatus, WorkflowError> {
        let step = WorkflowStep::AssociateReceiver;
        let receipt = self
            .client
            .associate_token(receiver, token_id, receiver_key)
            .await
            .map_err(|source| WorkflowError::Ledger { step, source })?;
        Ok(confirmed(step, receipt)?.status)
    }

    async fn balances(
        &self,
        step: WorkflowStep,
        treasury: AccountId,
        receiver: AccountId,
    ) -> Result<BalancePair, WorkflowError> {
        let treasury_balance = self
            .client
            .account_balance(treasury)
            .await
            .map_err(|source| WorkflowError::Ledger { step, source })?;
        let receiver_balance = self
            .client
            .account_balance(receiver)
            .await
            .map_err(|source| WorkflowError::Ledger { step, source })?;
        Ok(BalancePair {
            treasury: treasury_balance,
            receiver: receiver_balance,
        })
    }

    fn announce_units(&self, balances: &BalancePair, token_id: &TokenId) {
        if !self.announce {
            return;
        }
        println!(
            "💰 Treasury balance: {} units of token {}",
            balances.treasury.token_units(token_id),
            token_id
        );
        println!(
            "💰 Receiver balance: {} units of token {}",
            balances.receiver.token_units(token_id),
            token_id
        );
    }

    fn announce_serials(&self, balances: &BalancePair, token_id: &TokenId) {
        if !self.announce {
            return;
        }
        let treasury_serials = balances.treasury.nft_serials(token_id);
        let receiver_serials = balances.receiver.nft_serials(token_id);
        println!(
            "💰 Treasury balance: {} NFTs of token {} (serials {treasury_serials:?})",
            treasury_serials.len(),
            token_id
        );
        println!(
            "💰 Receiver balance: {} NFTs of token {} (serials {receiver_serials:?})",
            receiver_serials.len(),
            token_id
        );
    }
}

// Mintline Library - Token Transfer Walkthroughs
// This exposes the core components for testing and integration

pub mod config;
pub mod ledger;
pub mod telemetry;
pub mod workflows;

// Re-export key types for easy access
pub use config::{config, MintlineConfig};
pub use ledger::{
    AccountBalance, AccountId, Hbar, InMemoryLedger, LedgerError, LedgerOps, NftId, PrivateKey,
    PublicKey, TokenDefinition, TokenId, TokenSupplyType, TokenType, TransactionReceipt,
    TransactionStatus, TransferList,
};
pub use telemetry::{generate_correlation_id, init_telemetry};
pub use workflows::{
    FungibleRun, FungibleTransferReport, NftRun, NftTransferReport, TransferWorkflow,
    WorkflowError, WorkflowStep,
};

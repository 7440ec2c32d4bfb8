//! The ordered steps of a transfer run and the errors that halt one.

use std::fmt;

use thiserror::Error;

use crate::ledger::{LedgerError, TransactionReceipt, TransactionStatus};

/// The fixed stations of a run, in submission order. There are no
/// back-edges: each step consumes the receipt of the one before it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorkflowStep {
    CreateTreasuryAccount,
    CreateReceiverAccount,
    CreateToken,
    MintNft,
    AssociateReceiver,
    QueryOpeningBalances,
    TransferToReceiver,
    QueryClosingBalances,
}

impl fmt::Display for WorkflowStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            WorkflowStep::CreateTreasuryAccount => "treasury account creation",
            WorkflowStep::CreateReceiverAccount => "receiver account creation",
            WorkflowStep::CreateToken => "token creation",
            WorkflowStep::MintNft => "NFT mint",
            WorkflowStep::AssociateReceiver => "receiver token association",
            WorkflowStep::QueryOpeningBalances => "opening balance query",
            WorkflowStep::TransferToReceiver => "treasury transfer",
            WorkflowStep::QueryClosingBalances => "closing balance query",
        };
        f.write_str(name)
    }
}

/// First failure wins: a run halts at the step that produced it, and no
/// later step is attempted.
#[derive(Debug, Error)]
pub enum WorkflowError {
    #[error("{step} was rejected with status {status}")]
    StepRejected {
        step: WorkflowStep,
        status: TransactionStatus,
    },

    #[error("{step} failed: {source}")]
    Ledger {
        step: WorkflowStep,
        #[source]
        source: LedgerError,
    },

    #[error("the receipt for {step} did not carry {what}")]
    IncompleteReceipt {
        step: WorkflowStep,
        what: &'static str,
    },
}

/// Accept a receipt only if the network confirmed the step.
pub(crate) fn confirmed(
    step: WorkflowStep,
    receipt: TransactionReceipt,
) -> Result<TransactionReceipt, WorkflowError> {
    if receipt.status.is_success() {
        Ok(receipt)
    } else {
        Err(WorkflowError::StepRejected {
            step,
            status: receipt.status,
        })
    }
}

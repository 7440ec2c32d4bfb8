// Workflow orchestration: the straight-line transfer runs and their steps.

pub mod steps;
pub mod transfer;

pub use steps::{WorkflowError, WorkflowStep};
pub use transfer::{
    BalancePair, FungibleRun, FungibleTransferReport, NftRun, NftTransferReport, TransferWorkflow,
};

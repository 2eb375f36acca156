use super::contract::{Contract, ContractStatus};

#[derive(thiserror::Error, Debug)]
pub enum ContractError {
    #[error("Contract {id} was not found")]
    NotFound { id: String },
    #[error("Contract {} has no selected signer", .0.id)]
    NoSignerSelected(Box<Contract>),
    #[error("Signer index {index} is out of range for {len} signers")]
    IndexOutOfRange { index: usize, len: usize },
    #[error("Contract {id} was modified concurrently, expected version {expected_version}")]
    Conflict { id: String, expected_version: u64 },
    #[error("Transition from '{from}' to '{to}' is not allowed")]
    InvalidTransition {
        from: ContractStatus,
        to: ContractStatus,
    },
    #[error("Contract {id} is completed and can no longer change")]
    ContractClosed { id: String },
    #[error("Contract {id} already has a selected signer, the signer list is locked")]
    SelectionInProgress { id: String },
    #[error("Signers of contract {id} can no longer change, it is '{status}'")]
    SignersLocked { id: String, status: ContractStatus },
    #[error("Contract {id} already exists")]
    AlreadyExists { id: String },
    #[error("Invalid contract: {0}")]
    InvalidContract(String),
    #[error("Unknown contract status '{0}'")]
    InvalidStatus(String),
    #[error("Failed to build identifier: {0}")]
    Identifier(String),
    #[error("Storage failure: {0}")]
    Storage(#[from] sled::Error),
    #[error("Failed to encode contract: {0}")]
    Encoding(String),
    #[error("Failed to decode contract: {0}")]
    Decoding(#[from] minicbor::decode::Error),
}

impl ContractError {
    /// True when the caller should reload the contract and retry the operation.
    pub fn is_conflict(&self) -> bool {
        matches!(self, ContractError::Conflict { .. })
    }
}

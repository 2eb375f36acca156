//! Contract approval workflow: signer selection and the contract status lifecycle.

pub mod config;
pub mod contract;
pub mod error;
pub mod lifecycle;
pub mod repository;
pub mod service;
pub mod signer;
pub mod store;
pub mod utils;

pub use contract::{Contract, ContractDraft, ContractStatus};
pub use error::ContractError;
pub use repository::{ContractFilter, ContractRepository, InMemoryContractRepository};
pub use service::ContractService;
pub use signer::{Signer, SignerSet};
pub use store::SledContractRepository;

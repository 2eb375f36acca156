//! Storage boundary for contracts
use super::contract::{Contract, ContractStatus, TimeStamp};
use super::error::ContractError;
use std::collections::HashMap;
use std::sync::Mutex;
use tracing::debug;

/// Durable contract storage keyed by contract id.
///
/// `save` is an atomic full-record replace guarded by the contract's `version`: when the
/// stored revision is not the one the caller loaded, the write is rejected with
/// [`ContractError::Conflict`] instead of overwriting someone else's change. The repository
/// owns `created_at`, `updated_at` and `version`.
pub trait ContractRepository: Send + Sync {
    fn get(&self, id: &str) -> Result<Contract, ContractError>;
    /// Store a brand new contract, failing if the id is taken.
    fn insert(&self, contract: Contract) -> Result<Contract, ContractError>;
    fn save(&self, contract: Contract) -> Result<Contract, ContractError>;
    fn list(&self) -> Result<Vec<Contract>, ContractError>;
}

/// Criteria for `ContractService::list_contracts`. Empty filter matches everything.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ContractFilter {
    pub employer_id: Option<String>,
    pub status: Option<ContractStatus>,
    pub title_contains: Option<String>,
    /// Leave out contracts still in `open`, as the employer portal does.
    pub exclude_open: bool,
}

impl ContractFilter {
    pub fn new() -> Self {
        Self::default()
    }
    pub fn employer(mut self, employer_id: impl Into<String>) -> Self {
        self.employer_id = Some(employer_id.into());
        self
    }
    pub fn status(mut self, status: ContractStatus) -> Self {
        self.status = Some(status);
        self
    }
    pub fn title_contains(mut self, needle: impl Into<String>) -> Self {
        self.title_contains = Some(needle.into());
        self
    }
    pub fn exclude_open(mut self) -> Self {
        self.exclude_open = true;
        self
    }

    pub fn matches(&self, contract: &Contract) -> bool {
        if self.exclude_open && contract.status() == ContractStatus::Open {
            return false;
        }
        if let Some(employer) = &self.employer_id {
            if contract.employer_id() != employer {
                return false;
            }
        }
        if let Some(status) = self.status {
            if contract.status() != status {
                return false;
            }
        }
        match &self.title_contains {
            Some(needle) if !needle.trim().is_empty() => contract
                .title()
                .to_lowercase()
                .contains(&needle.trim().to_lowercase()),
            _ => true,
        }
    }
}

/// Process-local repository, for embedding and tests.
#[derive(Debug, Default)]
pub struct InMemoryContractRepository {
    contracts: Mutex<HashMap<String, Contract>>,
}

impl InMemoryContractRepository {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, HashMap<String, Contract>> {
        // a poisoned map still holds whole records, every write is a single insert
        self.contracts
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl ContractRepository for InMemoryContractRepository {
    fn get(&self, id: &str) -> Result<Contract, ContractError> {
        self.lock()
            .get(id)
            .cloned()
            .ok_or_else(|| ContractError::NotFound { id: id.to_string() })
    }

    fn insert(&self, contract: Contract) -> Result<Contract, ContractError> {
        let mut contracts = self.lock();
        if contracts.contains_key(contract.id()) {
            return Err(ContractError::AlreadyExists {
                id: contract.id().to_string(),
            });
        }

        let stored = contract.stamp_inserted(TimeStamp::new());
        contracts.insert(stored.id().to_string(), stored.clone());
        debug!(contract_id = stored.id(), "inserted contract");

        Ok(stored)
    }

    fn save(&self, contract: Contract) -> Result<Contract, ContractError> {
        let mut contracts = self.lock();
        let current = contracts
            .get(contract.id())
            .ok_or_else(|| ContractError::NotFound {
                id: contract.id().to_string(),
            })?;

        if current.version() != contract.version() {
            return Err(ContractError::Conflict {
                id: contract.id().to_string(),
                expected_version: contract.version(),
            });
        }

        let stored = contract.stamp_saved(TimeStamp::new());
        contracts.insert(stored.id().to_string(), stored.clone());
        debug!(
            contract_id = stored.id(),
            version = stored.version(),
            "saved contract"
        );

        Ok(stored)
    }

    fn list(&self) -> Result<Vec<Contract>, ContractError> {
        Ok(self.lock().values().cloned().collect())
    }
}

//! sled backed contract repository
use super::contract::{Contract, TimeStamp};
use super::error::ContractError;
use super::repository::ContractRepository;
use std::sync::Arc;
use tracing::{debug, warn};

const CONTRACTS_TREE: &str = "contracts";

/// Contracts encoded as CBOR, keyed by id in the `contracts` tree.
///
/// Writes go through `compare_and_swap` against the exact bytes the version check was made
/// on, so two writers racing on one contract cannot both succeed.
#[derive(Debug, Clone)]
pub struct SledContractRepository {
    // keeps the database open for as long as the tree is in use
    _db: Arc<sled::Db>,
    tree: sled::Tree,
}

impl SledContractRepository {
    pub fn new(db: Arc<sled::Db>) -> Result<Self, ContractError> {
        let tree = db.open_tree(CONTRACTS_TREE)?;
        Ok(Self { _db: db, tree })
    }

    /// Block until every write so far is durable on disk.
    pub fn flush(&self) -> Result<(), ContractError> {
        self.tree.flush()?;
        Ok(())
    }

    fn conflict(id: &str, expected_version: u64) -> ContractError {
        warn!(contract_id = id, expected_version, "rejected stale contract write");
        ContractError::Conflict {
            id: id.to_string(),
            expected_version,
        }
    }
}

impl ContractRepository for SledContractRepository {
    fn get(&self, id: &str) -> Result<Contract, ContractError> {
        match self.tree.get(id.as_bytes())? {
            Some(bytes) => Contract::from_cbor(&bytes),
            None => Err(ContractError::NotFound { id: id.to_string() }),
        }
    }

    fn insert(&self, contract: Contract) -> Result<Contract, ContractError> {
        let stored = contract.stamp_inserted(TimeStamp::new());
        let cbor = stored.to_cbor()?;

        // only succeeds when the key is absent
        if self
            .tree
            .compare_and_swap(stored.id().as_bytes(), None as Option<&[u8]>, Some(cbor))?
            .is_err()
        {
            return Err(ContractError::AlreadyExists {
                id: stored.id().to_string(),
            });
        }
        debug!(contract_id = stored.id(), "inserted contract");

        Ok(stored)
    }

    fn save(&self, contract: Contract) -> Result<Contract, ContractError> {
        let key = contract.id().as_bytes().to_vec();
        let current_bytes = self.tree.get(&key)?.ok_or_else(|| ContractError::NotFound {
            id: contract.id().to_string(),
        })?;

        let expected_version = contract.version();
        if Contract::from_cbor(&current_bytes)?.version() != expected_version {
            return Err(Self::conflict(contract.id(), expected_version));
        }

        let stored = contract.stamp_saved(TimeStamp::new());
        let cbor = stored.to_cbor()?;

        // another writer may have replaced the record since the read above
        if self
            .tree
            .compare_and_swap(key, Some(current_bytes), Some(cbor))?
            .is_err()
        {
            return Err(Self::conflict(stored.id(), expected_version));
        }
        debug!(
            contract_id = stored.id(),
            version = stored.version(),
            "saved contract"
        );

        Ok(stored)
    }

    fn list(&self) -> Result<Vec<Contract>, ContractError> {
        self.tree
            .iter()
            .values()
            .map(|value| Contract::from_cbor(&value?))
            .collect()
    }
}

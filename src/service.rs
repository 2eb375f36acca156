//! Service layer API for contract workflow operations
use super::config::Config;
use super::contract::{Contract, ContractDraft};
use super::error::ContractError;
use super::lifecycle;
use super::repository::{ContractFilter, ContractRepository};
use super::signer::Signer;
use super::utils;
use std::sync::Arc;
use tracing::{debug, info, warn};

pub const DEFAULT_ID_PREFIX: &str = "contract_";

/// Every operation is one read, an in-memory lifecycle step and at most one write.
/// Nothing is cached between calls and nothing is retried: a `Conflict` goes back to
/// the caller, who reloads and tries again.
pub struct ContractService<R: ContractRepository> {
    repository: Arc<R>,
    id_prefix: String,
}

impl<R: ContractRepository> ContractService<R> {
    pub fn new(repository: Arc<R>) -> Self {
        Self {
            repository,
            id_prefix: DEFAULT_ID_PREFIX.to_string(),
        }
    }

    pub fn with_config(repository: Arc<R>, config: &Config) -> Result<Self, ContractError> {
        utils::validate_prefix(&config.id_prefix)?;
        Ok(Self {
            repository,
            id_prefix: config.id_prefix.clone(),
        })
    }

    pub fn repository(&self) -> &Arc<R> {
        &self.repository
    }

    /// Load, apply `step`, persist. Nothing is written when `step` fails.
    fn apply<F>(&self, id: &str, operation: &str, step: F) -> Result<Contract, ContractError>
    where
        F: FnOnce(&Contract) -> Result<Contract, ContractError>,
    {
        let contract = self.load_contract(id)?;

        let updated = step(&contract).inspect_err(|err| {
            warn!(contract_id = id, operation, error = %err, "contract operation rejected");
        })?;

        let saved = self.repository.save(updated)?;
        debug!(
            contract_id = id,
            operation,
            version = saved.version(),
            "contract persisted"
        );
        if saved.status() != contract.status() {
            info!(
                contract_id = id,
                from = %contract.status(),
                to = %saved.status(),
                "contract status changed"
            );
        }

        Ok(saved)
    }

    /// Create a contract from a draft, entering the workflow in `open` or `Contract Created`.
    pub fn create_contract(&self, draft: ContractDraft) -> Result<Contract, ContractError> {
        let id = utils::new_uuid_to_bech32(&self.id_prefix)?;
        let contract = draft.validate_and_finalise(id)?;

        let stored = self.repository.insert(contract)?;
        info!(
            contract_id = stored.id(),
            employer_id = stored.employer_id(),
            status = %stored.status(),
            "contract created"
        );

        Ok(stored)
    }

    pub fn load_contract(&self, id: &str) -> Result<Contract, ContractError> {
        debug!(contract_id = id, "loading contract");
        self.repository.get(id)
    }

    /// Mark or unmark the signer at `index`. The status is left alone.
    pub fn update_signer_selection(
        &self,
        id: &str,
        index: usize,
        selected: bool,
    ) -> Result<Contract, ContractError> {
        self.apply(id, "update_signer_selection", |contract| {
            lifecycle::set_signer_selected(contract, index, selected)
        })
    }

    /// Move the contract to `pending` together with its current signer selection.
    ///
    /// With no selected signer this fails with [`ContractError::NoSignerSelected`], which
    /// carries the contract as loaded; storage is not touched.
    pub fn advance_to_pending(&self, id: &str) -> Result<Contract, ContractError> {
        self.apply(id, "advance_to_pending", lifecycle::request_advance_to_pending)
    }

    pub fn confirm_contract(&self, id: &str) -> Result<Contract, ContractError> {
        self.apply(id, "confirm_contract", lifecycle::confirm)
    }

    pub fn complete_contract(&self, id: &str) -> Result<Contract, ContractError> {
        self.apply(id, "complete_contract", lifecycle::complete)
    }

    pub fn add_signer(&self, id: &str, signer: Signer) -> Result<Contract, ContractError> {
        self.apply(id, "add_signer", |contract| {
            lifecycle::add_signer(contract, signer)
        })
    }

    pub fn assign_employee(&self, id: &str, employee_id: &str) -> Result<Contract, ContractError> {
        self.apply(id, "assign_employee", |contract| {
            lifecycle::assign_employee(contract, employee_id)
        })
    }

    /// Contracts matching `filter`, newest first.
    pub fn list_contracts(&self, filter: &ContractFilter) -> Result<Vec<Contract>, ContractError> {
        let mut contracts: Vec<Contract> = self
            .repository
            .list()?
            .into_iter()
            .filter(|contract| filter.matches(contract))
            .collect();

        contracts.sort_by(|a, b| b.created_at().cmp(a.created_at()));
        Ok(contracts)
    }
}

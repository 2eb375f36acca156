//! State machine for the contract workflow
//!
//! Every rule here is a pure function from one contract value to the next. Nothing
//! touches storage; the service decides whether the result is persisted. A failed
//! guard returns an error and the input contract is left exactly as it was.
//!
//! ```text
//! open ─────────────┐
//!                   ├─(≥1 signer selected)─> pending ─(confirm)─> active ─(complete)─> completed
//! Contract Created ─┘
//! ```
use super::contract::{Contract, ContractStatus};
use super::error::ContractError;
use super::signer::Signer;

fn ensure_open_for_changes(contract: &Contract) -> Result<(), ContractError> {
    if contract.status.is_terminal() {
        return Err(ContractError::ContractClosed {
            id: contract.id.clone(),
        });
    }
    Ok(())
}

fn transition(contract: &Contract, to: ContractStatus) -> Result<Contract, ContractError> {
    if !contract.status.can_transition_to(to) {
        return Err(ContractError::InvalidTransition {
            from: contract.status,
            to,
        });
    }
    Ok(Contract {
        status: to,
        ..contract.clone()
    })
}

/// Replace the selection flag of the signer at `signer_index`. Status is never changed.
pub fn set_signer_selected(
    contract: &Contract,
    signer_index: usize,
    selected: bool,
) -> Result<Contract, ContractError> {
    // a bad index is reported as such whatever the status
    let signers = contract.signers.with_selected(signer_index, selected)?;
    ensure_open_for_changes(contract)?;

    Ok(Contract {
        signers,
        ..contract.clone()
    })
}

/// Move an `open` or `Contract Created` contract to `pending`.
///
/// Requires at least one selected signer. The signer snapshot is carried over untouched,
/// so status and selection are persisted together by a single save.
pub fn request_advance_to_pending(contract: &Contract) -> Result<Contract, ContractError> {
    if !contract.status.can_transition_to(ContractStatus::Pending) {
        return Err(ContractError::InvalidTransition {
            from: contract.status,
            to: ContractStatus::Pending,
        });
    }
    if !contract.signers.any_selected() {
        return Err(ContractError::NoSignerSelected(Box::new(contract.clone())));
    }
    transition(contract, ContractStatus::Pending)
}

/// External confirmation: `pending` to `active`.
pub fn confirm(contract: &Contract) -> Result<Contract, ContractError> {
    transition(contract, ContractStatus::Active)
}

/// External completion: `active` to `completed`.
pub fn complete(contract: &Contract) -> Result<Contract, ContractError> {
    transition(contract, ContractStatus::Completed)
}

/// Append a signer while nobody has been selected yet, keeping existing indices stable.
pub fn add_signer(contract: &Contract, signer: Signer) -> Result<Contract, ContractError> {
    ensure_open_for_changes(contract)?;
    if !contract.status.is_pre_pending() {
        return Err(ContractError::SignersLocked {
            id: contract.id.clone(),
            status: contract.status,
        });
    }
    if contract.signers.any_selected() {
        return Err(ContractError::SelectionInProgress {
            id: contract.id.clone(),
        });
    }

    Ok(Contract {
        signers: contract.signers.with_appended(signer),
        ..contract.clone()
    })
}

pub fn assign_employee(contract: &Contract, employee_id: &str) -> Result<Contract, ContractError> {
    ensure_open_for_changes(contract)?;
    if employee_id.trim().is_empty() {
        return Err(ContractError::InvalidContract("employee id is empty".into()));
    }

    Ok(Contract {
        employee_id: Some(employee_id.to_string()),
        ..contract.clone()
    })
}

//! Property-based tests for the contract lifecycle and signer selection
//!
//! These use proptest to check that the selection gate and the status table hold
//! for arbitrary signer lists and selection patterns, not just the handful of
//! cases covered by the unit tests.
//!
//! What these tests DON'T cover (deliberately):
//!
//! - Persistence and version conflicts (see scenarios.rs)

use contract_approval::{
    ContractDraft, ContractError, ContractStatus, Signer, contract::Contract, lifecycle,
};
use proptest::prelude::*;

/// Strategy for one of the two entry states
fn entry_status_strategy() -> impl Strategy<Value = ContractStatus> {
    prop_oneof![
        Just(ContractStatus::Open),
        Just(ContractStatus::ContractCreated)
    ]
}

fn any_status_strategy() -> impl Strategy<Value = ContractStatus> {
    prop::sample::select(ContractStatus::ALL.to_vec())
}

/// Strategy for 1 to 8 signers with generated names and wallets
fn signers_strategy() -> impl Strategy<Value = Vec<Signer>> {
    prop::collection::vec(
        ("[A-Z][a-z]{2,8}", "0x[0-9a-f]{8}").prop_map(|(name, wallet)| Signer::new(name, wallet)),
        1..=8,
    )
}

fn build(status: ContractStatus, signers: Vec<Signer>) -> Contract {
    signers
        .into_iter()
        .fold(
            ContractDraft::new()
                .set_title("Generated contract")
                .set_employer("employer_prop")
                .set_status(status),
            |draft, signer| draft.add_signer(signer),
        )
        .validate_and_finalise("contract_prop".to_string())
        .expect("draft should be valid")
}

/// Apply a selection pattern, one flag per signer position
fn select(contract: &Contract, flags: &[bool]) -> Contract {
    flags
        .iter()
        .enumerate()
        .fold(contract.clone(), |c, (i, flag)| {
            lifecycle::set_signer_selected(&c, i, *flag).expect("index is in range")
        })
}

/// Entry-state contract plus a selection pattern matching its signer count
fn contract_with_flags_strategy() -> impl Strategy<Value = (Contract, Vec<bool>)> {
    (entry_status_strategy(), signers_strategy()).prop_flat_map(|(status, signers)| {
        let len = signers.len();
        let contract = build(status, signers);
        (Just(contract), prop::collection::vec(any::<bool>(), len))
    })
}

proptest! {
    /// Property: no selected signer means no advance, and nothing about the contract changes
    #[test]
    fn prop_advance_without_selection_fails(
        status in entry_status_strategy(),
        signers in signers_strategy(),
    ) {
        let contract = build(status, signers);

        match lifecycle::request_advance_to_pending(&contract) {
            Err(ContractError::NoSignerSelected(unchanged)) => {
                prop_assert_eq!(&*unchanged, &contract);
                prop_assert_eq!(unchanged.status(), status);
            }
            other => prop_assert!(false, "expected NoSignerSelected, got {:?}", other),
        }
    }

    /// Property: the gate opens exactly when at least one signer is selected,
    /// and advancing never touches the selection
    #[test]
    fn prop_advance_iff_any_selected((contract, flags) in contract_with_flags_strategy()) {
        let selected = select(&contract, &flags);
        let result = lifecycle::request_advance_to_pending(&selected);

        if flags.iter().any(|f| *f) {
            let pending = result.expect("advance should succeed");
            prop_assert_eq!(pending.status(), ContractStatus::Pending);
            prop_assert_eq!(pending.signers(), selected.signers());
        } else {
            let is_gate_failure = matches!(result, Err(ContractError::NoSignerSelected(_)));
            prop_assert!(is_gate_failure);
        }
    }

    /// Property: setting the same flag twice is the same as setting it once
    #[test]
    fn prop_set_signer_selected_is_idempotent(
        (contract, flags) in contract_with_flags_strategy(),
        index_seed in any::<prop::sample::Index>(),
        value in any::<bool>(),
    ) {
        let contract = select(&contract, &flags);
        let index = index_seed.index(contract.signers().len());

        let once = lifecycle::set_signer_selected(&contract, index, value).unwrap();
        let twice = lifecycle::set_signer_selected(&once, index, value).unwrap();

        prop_assert_eq!(&once, &twice);
        prop_assert_eq!(once.status(), contract.status());
        for (i, (before, after)) in contract.signers().iter().zip(once.signers()).enumerate() {
            prop_assert_eq!(&before.name, &after.name);
            prop_assert_eq!(&before.wallet_address, &after.wallet_address);
            if i != index {
                prop_assert_eq!(before.selected, after.selected);
            }
        }
    }

    /// Property: an index at or past the end is always rejected
    #[test]
    fn prop_out_of_range_index_is_rejected(
        (contract, _flags) in contract_with_flags_strategy(),
        overshoot in 0usize..100,
        value in any::<bool>(),
    ) {
        let len = contract.signers().len();
        let result = lifecycle::set_signer_selected(&contract, len + overshoot, value);

        match result {
            Err(ContractError::IndexOutOfRange { index, len: reported }) => {
                prop_assert_eq!(index, len + overshoot);
                prop_assert_eq!(reported, len);
            }
            other => prop_assert!(false, "expected IndexOutOfRange, got {:?}", other),
        }
    }

    /// Property: status only ever moves along the table, and completed never moves
    #[test]
    fn prop_transitions_follow_table(
        status in any_status_strategy(),
        signers in signers_strategy(),
    ) {
        let mut contract = build(ContractStatus::Open, signers);
        contract = lifecycle::set_signer_selected(&contract, 0, true).unwrap();

        // walk the happy path up to the generated status
        let path = [
            ContractStatus::Open,
            ContractStatus::Pending,
            ContractStatus::Active,
            ContractStatus::Completed,
        ];
        for next in path.iter().skip(1) {
            if contract.status() == status || status == ContractStatus::ContractCreated {
                break;
            }
            contract = match next {
                ContractStatus::Pending => lifecycle::request_advance_to_pending(&contract).unwrap(),
                ContractStatus::Active => lifecycle::confirm(&contract).unwrap(),
                _ => lifecycle::complete(&contract).unwrap(),
            };
        }

        let attempts = [
            (ContractStatus::Pending, lifecycle::request_advance_to_pending(&contract)),
            (ContractStatus::Active, lifecycle::confirm(&contract)),
            (ContractStatus::Completed, lifecycle::complete(&contract)),
        ];
        for (target, attempt) in attempts {
            prop_assert_eq!(
                attempt.is_ok(),
                contract.status().can_transition_to(target),
                "{} -> {}", contract.status(), target
            );
        }
    }

    /// Property: CBOR round trip keeps every field, including signer order and flags
    #[test]
    fn prop_cbor_roundtrip((contract, flags) in contract_with_flags_strategy()) {
        let contract = select(&contract, &flags);

        let encoded = contract.to_cbor().expect("encoding should succeed");
        let decoded = Contract::from_cbor(&encoded).expect("decoding should succeed");

        prop_assert_eq!(&decoded, &contract);
    }
}

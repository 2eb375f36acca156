//! Contract record, its status set and the draft used to create one
use super::error::ContractError;
use super::signer::{Signer, SignerSet};
use chrono::{DateTime, TimeZone, Utc};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, PartialEq, Eq, Clone)]
pub struct TimeStamp<T: TimeZone>(DateTime<T>);

impl TimeStamp<Utc> {
    pub fn new() -> Self {
        Self(Utc::now())
    }
    pub fn to_datetime_utc(&self) -> DateTime<Utc> {
        self.0
    }
}

impl Default for TimeStamp<Utc> {
    fn default() -> Self {
        Self::new()
    }
}

// `Utc` itself is not `Ord`, so ordering goes through the inner instant
impl PartialOrd for TimeStamp<Utc> {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for TimeStamp<Utc> {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.0.cmp(&other.0)
    }
}

impl<T: TimeZone> From<DateTime<T>> for TimeStamp<T> {
    fn from(value: DateTime<T>) -> Self {
        TimeStamp(value)
    }
}

impl<C> minicbor::Encode<C> for TimeStamp<Utc> {
    fn encode<W: minicbor::encode::Write>(
        &self,
        e: &mut minicbor::Encoder<W>,
        _: &mut C,
    ) -> Result<(), minicbor::encode::Error<W::Error>> {
        if let Some(nsec) = self.0.timestamp_nanos_opt() {
            return e.i64(nsec)?.ok();
        }

        Err(minicbor::encode::Error::message(
            "failed to encode timestamp. timestamp_nanos_opt returned None",
        ))
    }
}

impl<'b, C> minicbor::Decode<'b, C> for TimeStamp<Utc> {
    fn decode(d: &mut minicbor::Decoder<'b>, _: &mut C) -> Result<Self, minicbor::decode::Error> {
        let nsecs = d.i64()?;

        Ok(TimeStamp(DateTime::from_timestamp_nanos(nsecs)))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, minicbor::Encode, minicbor::Decode)]
pub enum ContractStatus {
    /// Posted, not yet matched to a counterparty.
    #[n(0)]
    Open,
    /// Terms drafted, awaiting signer selection.
    #[n(1)]
    ContractCreated,
    #[n(2)]
    Pending,
    #[n(3)]
    Active,
    #[n(4)]
    Completed,
}

impl ContractStatus {
    pub const ALL: [ContractStatus; 5] = [
        ContractStatus::Open,
        ContractStatus::ContractCreated,
        ContractStatus::Pending,
        ContractStatus::Active,
        ContractStatus::Completed,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ContractStatus::Open => "open",
            ContractStatus::ContractCreated => "Contract Created",
            ContractStatus::Pending => "pending",
            ContractStatus::Active => "active",
            ContractStatus::Completed => "completed",
        }
    }
    pub fn is_terminal(&self) -> bool {
        matches!(self, ContractStatus::Completed)
    }
    /// Both entry states, the only ones that may move to `pending`.
    pub fn is_pre_pending(&self) -> bool {
        matches!(self, ContractStatus::Open | ContractStatus::ContractCreated)
    }
    /// Status changes permitted by the workflow. Staying in place is not a transition.
    pub fn can_transition_to(&self, next: ContractStatus) -> bool {
        use ContractStatus::*;
        matches!(
            (self, next),
            (Open | ContractCreated, Pending) | (Pending, Active) | (Active, Completed)
        )
    }
}

impl fmt::Display for ContractStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ContractStatus {
    type Err = ContractError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        ContractStatus::ALL
            .into_iter()
            .find(|status| status.as_str().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| ContractError::InvalidStatus(s.to_string()))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, minicbor::Encode, minicbor::Decode)]
pub struct Contract {
    #[n(0)]
    pub(crate) id: String, // bech32 encoded uuid7
    #[n(1)]
    pub(crate) title: String,
    #[n(2)]
    pub(crate) description: String,
    #[n(3)]
    pub(crate) location: String,
    #[n(4)]
    pub(crate) payment_rate: String,
    #[n(5)]
    pub(crate) payment_frequency: String,
    #[n(6)]
    pub(crate) employer_id: String,
    #[n(7)]
    pub(crate) employee_id: Option<String>,
    #[n(8)]
    pub(crate) status: ContractStatus,
    #[n(9)]
    pub(crate) signers: SignerSet,
    #[n(10)]
    pub(crate) created_at: TimeStamp<Utc>,
    #[n(11)]
    pub(crate) updated_at: TimeStamp<Utc>,
    #[n(12)]
    pub(crate) version: u64, // owned by the repository
}

impl Contract {
    pub fn id(&self) -> &str {
        &self.id
    }
    pub fn title(&self) -> &str {
        &self.title
    }
    pub fn description(&self) -> &str {
        &self.description
    }
    pub fn location(&self) -> &str {
        &self.location
    }
    pub fn payment_rate(&self) -> &str {
        &self.payment_rate
    }
    pub fn payment_frequency(&self) -> &str {
        &self.payment_frequency
    }
    pub fn employer_id(&self) -> &str {
        &self.employer_id
    }
    pub fn employee_id(&self) -> Option<&str> {
        self.employee_id.as_deref()
    }
    pub fn status(&self) -> ContractStatus {
        self.status
    }
    pub fn signers(&self) -> &SignerSet {
        &self.signers
    }
    pub fn created_at(&self) -> &TimeStamp<Utc> {
        &self.created_at
    }
    pub fn updated_at(&self) -> &TimeStamp<Utc> {
        &self.updated_at
    }
    pub fn version(&self) -> u64 {
        self.version
    }

    /// Stamps a contract about to be stored for the first time.
    pub(crate) fn stamp_inserted(mut self, now: TimeStamp<Utc>) -> Self {
        self.created_at = now.clone();
        self.updated_at = now;
        self.version = 1;
        self
    }
    /// Stamps a contract replacing the stored revision it was loaded from.
    pub(crate) fn stamp_saved(mut self, now: TimeStamp<Utc>) -> Self {
        self.updated_at = now;
        self.version += 1;
        self
    }

    pub fn to_cbor(&self) -> Result<Vec<u8>, ContractError> {
        minicbor::to_vec(self).map_err(|e| ContractError::Encoding(e.to_string()))
    }
    pub fn from_cbor(bytes: &[u8]) -> Result<Self, ContractError> {
        Ok(minicbor::decode(bytes)?)
    }
    /// Hex sha256 of the encoded record, changes whenever any field does.
    pub fn fingerprint(&self) -> Result<String, ContractError> {
        let cbor = self.to_cbor()?;
        Ok(sha256::digest(&cbor))
    }
}

/// Builder for a new contract, the basis for `ContractService::create_contract`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ContractDraft {
    title: Option<String>,
    description: String,
    location: String,
    payment_rate: String,
    payment_frequency: String,
    employer_id: Option<String>,
    employee_id: Option<String>,
    status: Option<ContractStatus>,
    signers: Vec<Signer>,
}

impl ContractDraft {
    pub fn new() -> Self {
        Self::default()
    }
    pub fn set_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }
    pub fn set_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }
    pub fn set_location(mut self, location: impl Into<String>) -> Self {
        self.location = location.into();
        self
    }
    pub fn set_payment_rate(mut self, rate: impl Into<String>) -> Self {
        self.payment_rate = rate.into();
        self
    }
    pub fn set_payment_frequency(mut self, frequency: impl Into<String>) -> Self {
        self.payment_frequency = frequency.into();
        self
    }
    pub fn set_employer(mut self, employer_id: impl Into<String>) -> Self {
        self.employer_id = Some(employer_id.into());
        self
    }
    pub fn set_employee(mut self, employee_id: impl Into<String>) -> Self {
        self.employee_id = Some(employee_id.into());
        self
    }
    /// Entry status, `open` when left unset.
    pub fn set_status(mut self, status: ContractStatus) -> Self {
        self.status = Some(status);
        self
    }
    pub fn add_signer(mut self, signer: Signer) -> Self {
        self.signers.push(signer);
        self
    }

    // Checks fields and turns the draft into an unsaved contract under `id`
    pub fn validate_and_finalise(self, id: String) -> Result<Contract, ContractError> {
        let title = match self.title {
            Some(title) if !title.trim().is_empty() => title,
            _ => return Err(ContractError::InvalidContract("title is not set".into())),
        };
        let employer_id = match self.employer_id {
            Some(employer) if !employer.trim().is_empty() => employer,
            _ => return Err(ContractError::InvalidContract("employer is not set".into())),
        };
        if matches!(&self.employee_id, Some(employee) if employee.trim().is_empty()) {
            return Err(ContractError::InvalidContract("employee id is empty".into()));
        }

        let status = self.status.unwrap_or(ContractStatus::Open);
        if !status.is_pre_pending() {
            return Err(ContractError::InvalidTransition {
                from: ContractStatus::Open,
                to: status,
            });
        }

        // selection only ever happens through the lifecycle
        let signers = self
            .signers
            .into_iter()
            .fold(SignerSet::default(), |set, signer| set.with_appended(signer));

        let now = TimeStamp::new();
        Ok(Contract {
            id,
            title,
            description: self.description,
            location: self.location,
            payment_rate: self.payment_rate,
            payment_frequency: self.payment_frequency,
            employer_id,
            employee_id: self.employee_id,
            status,
            signers,
            created_at: now.clone(),
            updated_at: now,
            version: 0,
        })
    }
}

//! Signer records and the ordered set a contract owns

use super::error::ContractError;

/// A candidate counterparty. `selected` means "marked to proceed", not "has signed".
#[derive(Debug, Clone, PartialEq, Eq, minicbor::Encode, minicbor::Decode)]
pub struct Signer {
    #[n(0)]
    pub name: String,
    #[n(1)]
    pub wallet_address: String, // opaque, never verified here
    #[n(2)]
    pub selected: bool,
}

impl Signer {
    pub fn new(name: impl Into<String>, wallet_address: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            wallet_address: wallet_address.into(),
            selected: false,
        }
    }
}

/// Ordered signers of a single contract.
///
/// Selection is addressed by position, so the sequence is never reordered. Every
/// mutation returns a new set and leaves the receiver untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq, minicbor::Encode, minicbor::Decode)]
pub struct SignerSet(#[n(0)] Vec<Signer>);

impl SignerSet {
    pub fn new(signers: Vec<Signer>) -> Self {
        Self(signers)
    }
    pub fn len(&self) -> usize {
        self.0.len()
    }
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
    pub fn get(&self, index: usize) -> Option<&Signer> {
        self.0.get(index)
    }
    pub fn iter(&self) -> std::slice::Iter<'_, Signer> {
        self.0.iter()
    }
    pub fn any_selected(&self) -> bool {
        self.0.iter().any(|s| s.selected)
    }
    pub fn selected_count(&self) -> usize {
        self.0.iter().filter(|s| s.selected).count()
    }

    /// Returns a copy with the flag at `index` replaced.
    pub fn with_selected(&self, index: usize, selected: bool) -> Result<Self, ContractError> {
        let len = self.0.len();
        if index >= len {
            return Err(ContractError::IndexOutOfRange { index, len });
        }

        let signers = self
            .0
            .iter()
            .enumerate()
            .map(|(i, signer)| {
                if i == index {
                    Signer {
                        selected,
                        ..signer.clone()
                    }
                } else {
                    signer.clone()
                }
            })
            .collect();

        Ok(Self(signers))
    }

    /// Returns a copy with `signer` appended, always unselected.
    pub fn with_appended(&self, signer: Signer) -> Self {
        let mut signers = self.0.clone();
        signers.push(Signer {
            selected: false,
            ..signer
        });
        Self(signers)
    }
}

impl From<Vec<Signer>> for SignerSet {
    fn from(value: Vec<Signer>) -> Self {
        Self(value)
    }
}

impl<'a> IntoIterator for &'a SignerSet {
    type Item = &'a Signer;
    type IntoIter = std::slice::Iter<'a, Signer>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

//! Utility functions for identifiers

use super::error::ContractError;
use bech32::Bech32m;
use uuid7::uuid7;

// construct a unique id then encode using bech32
pub fn new_uuid_to_bech32(hrp: &str) -> Result<String, ContractError> {
    let hrp = bech32::Hrp::parse(hrp).map_err(|e| ContractError::Identifier(e.to_string()))?;
    let encode = bech32::encode::<Bech32m>(hrp, uuid7().as_bytes())
        .map_err(|e| ContractError::Identifier(e.to_string()))?;
    Ok(encode)
}

/// Checks that `hrp` can be used as an identifier prefix.
pub fn validate_prefix(hrp: &str) -> Result<(), ContractError> {
    bech32::Hrp::parse(hrp)
        .map(|_| ())
        .map_err(|e| ContractError::Identifier(e.to_string()))
}

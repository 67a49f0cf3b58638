use alloy_primitives::{Address, U256};

use crate::errors::ModelError;

/// Require that an incoming amount is not zero
///
/// ### Arguments
/// * `amount` - The amount to check
///
/// ### Errors
/// If the amount is zero
pub fn require_nonzero(amount: U256) -> Result<(), ModelError> {
    if amount.is_zero() {
        return Err(ModelError::BadRequest);
    }
    Ok(())
}

/// Require that a transaction timestamp does not precede the last update
///
/// ### Arguments
/// * `last_time` - The timestamp of the last update
/// * `timestamp` - The transaction timestamp
///
/// ### Errors
/// If the timestamp is before the last update
pub fn require_not_stale(last_time: u64, timestamp: u64) -> Result<(), ModelError> {
    if timestamp < last_time {
        return Err(ModelError::BadRequest);
    }
    Ok(())
}

/// Require that a position belongs to the reserve it is applied against
///
/// ### Errors
/// If the assets do not match
pub fn require_same_asset(reserve_asset: &Address, position_asset: &Address) -> Result<(), ModelError> {
    if reserve_asset != position_asset {
        return Err(ModelError::BadRequest);
    }
    Ok(())
}

/// Checked addition mapped to an `Overflow`
pub fn add(a: U256, b: U256) -> Result<U256, ModelError> {
    a.checked_add(b).ok_or(ModelError::Overflow)
}

/// Checked subtraction where going negative breaks an invariant
pub fn sub(a: U256, b: U256) -> Result<U256, ModelError> {
    a.checked_sub(b).ok_or(ModelError::InvariantViolation)
}

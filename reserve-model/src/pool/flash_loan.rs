use alloy_primitives::U256;

use crate::{
    config::{PoolConfig, ReserveConfig},
    errors::ModelError,
    validator::require_nonzero,
};

use super::{
    fees::calc_flash_loan_premium,
    reserve::ReserveSnapshot,
    user::{accrue_position, UserSnapshot},
};

/// Predict the reserve and receiver after `receiver` flash borrows `amount` and repays it
/// with the premium in the same transaction
///
/// Only the premium stays in the reserve. The protocol share is accrued to the treasury and
/// the supplier share is distributed through the liquidity index.
///
/// ### Arguments
/// * `pool_config` - The pool configuration holding the flash loan premiums
/// * `config` - The reserve configuration
/// * `reserve` - The reserve before the flash loan
/// * `receiver` - The position of the account repaying the flash loan
/// * `amount` - The amount borrowed
/// * `timestamp` - The timestamp of the flash loan
///
/// ### Errors
/// If the amount is zero, exceeds the available liquidity, or the premium cannot be paid
pub fn execute_flash_loan(
    pool_config: &PoolConfig,
    config: &ReserveConfig,
    reserve: &ReserveSnapshot,
    receiver: &UserSnapshot,
    amount: U256,
    timestamp: u64,
) -> Result<(ReserveSnapshot, UserSnapshot), ModelError> {
    require_nonzero(amount)?;
    let (mut reserve, mut receiver) = accrue_position(reserve, receiver, timestamp)?;
    if amount > reserve.available_liquidity {
        return Err(ModelError::BadRequest);
    }

    let premium = calc_flash_loan_premium(
        amount,
        pool_config.flash_loan_premium_total,
        pool_config.flash_loan_premium_to_protocol,
    )?;
    reserve.cumulate_to_liquidity_index(premium.to_lp)?;
    reserve.accrue_to_treasury(premium.to_protocol)?;
    reserve.update_interest_rates(config, premium.total, U256::ZERO)?;
    receiver.spend(premium.total)?;

    tracing::debug!(
        asset = %reserve.asset,
        receiver = %receiver.user,
        %amount,
        premium = %premium.total,
        "flash loan"
    );
    let receiver = receiver.accrue(&reserve, timestamp)?;
    Ok((reserve, receiver))
}

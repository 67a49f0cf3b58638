use alloy_primitives::U256;

use crate::{
    constants::{RAY, SECONDS_PER_YEAR},
    errors::ModelError,
    math::WadRayMath,
    validator::require_not_stale,
};

/// Calculates the simple interest accumulated at `rate` between `last_time` and `timestamp`
///
/// ### Arguments
/// * `rate` - The annualized rate (27 decimals)
/// * `timestamp` - The current timestamp
/// * `last_time` - The timestamp of the last accrual
///
/// ### Returns
/// * U256 - The interest factor scaled to 27 decimal places
pub fn calc_linear_interest(rate: U256, timestamp: u64, last_time: u64) -> Result<U256, ModelError> {
    require_not_stale(last_time, timestamp)?;
    let delta_time = U256::from(timestamp - last_time);
    let accrued = rate
        .checked_mul(delta_time)
        .ok_or(ModelError::Overflow)?
        / U256::from(SECONDS_PER_YEAR);
    RAY.checked_add(accrued).ok_or(ModelError::Overflow)
}

/// Calculates the interest compounded every second at `rate` between `last_time` and
/// `timestamp`, approximated with the first three terms of the binomial expansion.
///
/// The rate powers are divided by the year length before they are multiplied by the time
/// terms, which fixes the integer rounding of each term.
///
/// ### Arguments
/// * `rate` - The annualized rate (27 decimals)
/// * `timestamp` - The current timestamp
/// * `last_time` - The timestamp of the last accrual
///
/// ### Returns
/// * U256 - The interest factor scaled to 27 decimal places
pub fn calc_compounded_interest(
    rate: U256,
    timestamp: u64,
    last_time: u64,
) -> Result<U256, ModelError> {
    require_not_stale(last_time, timestamp)?;
    if timestamp == last_time {
        return Ok(RAY);
    }

    let exp = U256::from(timestamp - last_time);
    let exp_minus_one = exp - U256::from(1u8);
    let exp_minus_two = if exp > U256::from(2u8) {
        exp - U256::from(2u8)
    } else {
        U256::ZERO
    };
    let seconds_per_year = U256::from(SECONDS_PER_YEAR);

    let base_power_two = rate.ray_mul(rate)? / (seconds_per_year * seconds_per_year);
    let base_power_three = base_power_two.ray_mul(rate)? / seconds_per_year;

    let second_term = checked_product(&[exp, exp_minus_one, base_power_two])? / U256::from(2u8);
    let third_term = checked_product(&[exp, exp_minus_one, exp_minus_two, base_power_three])?
        / U256::from(6u8);
    let first_term = rate.checked_mul(exp).ok_or(ModelError::Overflow)? / seconds_per_year;

    [first_term, second_term, third_term]
        .into_iter()
        .try_fold(RAY, |acc, term| acc.checked_add(term))
        .ok_or(ModelError::Overflow)
}

/// Calculates the liquidity index at `timestamp`
///
/// ### Arguments
/// * `liquidity_rate` - The supply rate since `last_time`
/// * `liquidity_index` - The liquidity index at `last_time`
/// * `last_time` - The timestamp of the last update
/// * `timestamp` - The current timestamp
pub fn calc_normalized_income(
    liquidity_rate: U256,
    liquidity_index: U256,
    last_time: u64,
    timestamp: u64,
) -> Result<U256, ModelError> {
    require_not_stale(last_time, timestamp)?;
    if liquidity_rate.is_zero() {
        return Ok(liquidity_index);
    }
    calc_linear_interest(liquidity_rate, timestamp, last_time)?.ray_mul(liquidity_index)
}

/// Calculates the variable borrow index at `timestamp`
///
/// ### Arguments
/// * `variable_borrow_rate` - The variable borrow rate since `last_time`
/// * `variable_borrow_index` - The variable borrow index at `last_time`
/// * `last_time` - The timestamp of the last update
/// * `timestamp` - The current timestamp
pub fn calc_normalized_debt(
    variable_borrow_rate: U256,
    variable_borrow_index: U256,
    last_time: u64,
    timestamp: u64,
) -> Result<U256, ModelError> {
    require_not_stale(last_time, timestamp)?;
    if variable_borrow_rate.is_zero() {
        return Ok(variable_borrow_index);
    }
    calc_compounded_interest(variable_borrow_rate, timestamp, last_time)?
        .ray_mul(variable_borrow_index)
}

/// Calculates a stable debt balance at `timestamp`
///
/// ### Arguments
/// * `principal` - The stable debt principal as of `last_time`
/// * `rate` - The stable rate locked for the principal
/// * `last_time` - The timestamp the principal was last updated
/// * `timestamp` - The current timestamp
pub fn calc_stable_debt(
    principal: U256,
    rate: U256,
    last_time: u64,
    timestamp: u64,
) -> Result<U256, ModelError> {
    if principal.is_zero() {
        return Ok(U256::ZERO);
    }
    let cumulated = calc_compounded_interest(rate, timestamp, last_time)?;
    principal.ray_mul(cumulated)
}

fn checked_product(terms: &[U256]) -> Result<U256, ModelError> {
    terms
        .iter()
        .try_fold(U256::from(1u8), |acc, term| acc.checked_mul(*term))
        .ok_or(ModelError::Overflow)
}

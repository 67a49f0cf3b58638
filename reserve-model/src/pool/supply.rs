use alloy_primitives::U256;

use crate::{
    config::ReserveConfig,
    constants::MAX_UINT_AMOUNT,
    errors::ModelError,
    math::WadRayMath,
    validator::{add, require_nonzero, sub},
};

use super::{
    reserve::ReserveSnapshot,
    user::{accrue_position, UserSnapshot},
};

/// Predict the reserve and user after `user` supplies `amount` of underlying
///
/// ### Arguments
/// * `config` - The reserve configuration
/// * `reserve` - The reserve before the supply
/// * `user` - The supplier's position before the supply
/// * `amount` - The amount of underlying supplied
/// * `timestamp` - The timestamp of the supply
///
/// ### Errors
/// If the amount is zero, the wallet cannot pay it, or the reserve math fails
pub fn execute_supply(
    config: &ReserveConfig,
    reserve: &ReserveSnapshot,
    user: &UserSnapshot,
    amount: U256,
    timestamp: u64,
) -> Result<(ReserveSnapshot, UserSnapshot), ModelError> {
    require_nonzero(amount)?;
    let (mut reserve, mut user) = accrue_position(reserve, user, timestamp)?;

    reserve.update_interest_rates(config, amount, U256::ZERO)?;
    let scaled = amount.ray_div(reserve.liquidity_index)?;
    require_nonzero(scaled)?;
    reserve.scaled_a_token_supply = add(reserve.scaled_a_token_supply, scaled)?;
    user.add_supply(scaled)?;
    user.spend(amount)?;

    tracing::debug!(asset = %reserve.asset, user = %user.user, %amount, "supply");
    let user = user.accrue(&reserve, timestamp)?;
    Ok((reserve, user))
}

/// Predict the reserve and user after `user` withdraws `amount` of underlying. Passing
/// `MAX_UINT_AMOUNT` withdraws the whole balance, as of `timestamp`.
///
/// ### Arguments
/// * `config` - The reserve configuration
/// * `reserve` - The reserve before the withdrawal
/// * `user` - The supplier's position before the withdrawal
/// * `amount` - The amount of underlying withdrawn
/// * `timestamp` - The timestamp of the withdrawal
///
/// ### Errors
/// If the amount is zero, exceeds the user's balance, or exceeds the reserve's liquidity
pub fn execute_withdraw(
    config: &ReserveConfig,
    reserve: &ReserveSnapshot,
    user: &UserSnapshot,
    amount: U256,
    timestamp: u64,
) -> Result<(ReserveSnapshot, UserSnapshot), ModelError> {
    require_nonzero(amount)?;
    let (mut reserve, mut user) = accrue_position(reserve, user, timestamp)?;

    let balance = user.current_a_token_balance;
    let amount = if amount == MAX_UINT_AMOUNT {
        balance
    } else {
        amount
    };
    require_nonzero(amount)?;
    if amount > balance || amount > reserve.available_liquidity {
        return Err(ModelError::BadRequest);
    }
    let scaled = if amount == balance {
        user.scaled_a_token_balance
    } else {
        amount.ray_div(reserve.liquidity_index)?
    };

    reserve.update_interest_rates(config, U256::ZERO, amount)?;
    reserve.scaled_a_token_supply = sub(reserve.scaled_a_token_supply, scaled)?;
    user.remove_supply(scaled)?;
    user.receive(amount)?;

    tracing::debug!(asset = %reserve.asset, user = %user.user, %amount, "withdraw");
    let user = user.accrue(&reserve, timestamp)?;
    Ok((reserve, user))
}

/// Predict the two positions after `amount` of supply moves from `from` to `to`. Transfers
/// do not write to the reserve, so only the positions are returned.
///
/// ### Arguments
/// * `reserve` - The reserve the supply belongs to
/// * `from` - The sender's position
/// * `to` - The recipient's position
/// * `amount` - The amount of underlying worth of supply transferred
/// * `timestamp` - The timestamp of the transfer
///
/// ### Errors
/// If the amount is zero or exceeds the sender's balance
pub fn execute_transfer(
    reserve: &ReserveSnapshot,
    from: &UserSnapshot,
    to: &UserSnapshot,
    amount: U256,
    timestamp: u64,
) -> Result<(UserSnapshot, UserSnapshot), ModelError> {
    require_nonzero(amount)?;
    let reserve = reserve.accrue(timestamp)?;
    let mut from = from.accrue(&reserve, timestamp)?;
    let mut to = to.accrue(&reserve, timestamp)?;
    if amount > from.current_a_token_balance {
        return Err(ModelError::BadRequest);
    }
    if from.user == to.user {
        return Ok((from.clone(), from));
    }

    let scaled = if amount == from.current_a_token_balance {
        from.scaled_a_token_balance
    } else {
        amount.ray_div(reserve.liquidity_index)?
    };
    from.remove_supply(scaled)?;
    to.add_supply(scaled)?;

    tracing::debug!(asset = %reserve.asset, from = %from.user, to = %to.user, %amount, "transfer");
    Ok((
        from.accrue(&reserve, timestamp)?,
        to.accrue(&reserve, timestamp)?,
    ))
}

/// Predict the user after explicitly toggling whether their supply counts as collateral
///
/// ### Errors
/// If collateral is enabled on an empty balance
pub fn execute_set_collateral(
    reserve: &ReserveSnapshot,
    user: &UserSnapshot,
    enabled: bool,
    timestamp: u64,
) -> Result<UserSnapshot, ModelError> {
    let reserve = reserve.accrue(timestamp)?;
    let mut user = user.accrue(&reserve, timestamp)?;
    if enabled && user.scaled_a_token_balance.is_zero() {
        return Err(ModelError::BadRequest);
    }
    user.usage_as_collateral_enabled = enabled;
    Ok(user)
}

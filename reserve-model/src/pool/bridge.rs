use alloy_primitives::U256;

use crate::{
    config::{PoolConfig, ReserveConfig},
    errors::ModelError,
    math::WadRayMath,
    validator::{add, require_nonzero, sub},
};

use super::{
    fees::calc_backing_fee_split,
    reserve::ReserveSnapshot,
    user::{accrue_position, UserSnapshot},
};

/// Predict the reserve and user after a bridge mints `amount` of supply to `user` without
/// underlying backing it
///
/// ### Arguments
/// * `config` - The reserve configuration
/// * `reserve` - The reserve before the mint
/// * `user` - The position receiving the supply
/// * `amount` - The amount of unbacked supply minted
/// * `timestamp` - The timestamp of the mint
///
/// ### Errors
/// If the amount is zero, or the reserve's unbacked supply would exceed its cap
pub fn execute_mint_unbacked(
    config: &ReserveConfig,
    reserve: &ReserveSnapshot,
    user: &UserSnapshot,
    amount: U256,
    timestamp: u64,
) -> Result<(ReserveSnapshot, UserSnapshot), ModelError> {
    require_nonzero(amount)?;
    let (mut reserve, mut user) = accrue_position(reserve, user, timestamp)?;

    reserve.unbacked = add(reserve.unbacked, amount)?;
    let cap = U256::from(config.unbacked_mint_cap)
        .checked_mul(reserve.scalar()?)
        .ok_or(ModelError::Overflow)?;
    if reserve.unbacked > cap {
        return Err(ModelError::UnbackedMintCapExceeded);
    }
    reserve.update_interest_rates(config, U256::ZERO, U256::ZERO)?;

    let scaled = amount.ray_div(reserve.liquidity_index)?;
    require_nonzero(scaled)?;
    reserve.scaled_a_token_supply = add(reserve.scaled_a_token_supply, scaled)?;
    user.add_supply(scaled)?;

    tracing::debug!(asset = %reserve.asset, user = %user.user, %amount, "mint unbacked");
    let user = user.accrue(&reserve, timestamp)?;
    Ok((reserve, user))
}

/// Predict the reserve and backer after `backer` backs up to `amount` of unbacked supply and
/// pays `fee` on top of it
///
/// The backing is capped at the reserve's unbacked supply. The protocol share of the fee is
/// accrued to the treasury and the rest is distributed to suppliers through the liquidity
/// index.
///
/// ### Arguments
/// * `pool_config` - The pool configuration holding the bridge protocol fee
/// * `config` - The reserve configuration
/// * `reserve` - The reserve before the backing
/// * `backer` - The position of the account paying the backing
/// * `amount` - The amount of unbacked supply to back
/// * `fee` - The fee paid on top of the backing
/// * `timestamp` - The timestamp of the backing
///
/// ### Errors
/// If nothing is backed or paid, or the backer's wallet cannot pay
pub fn execute_back_unbacked(
    pool_config: &PoolConfig,
    config: &ReserveConfig,
    reserve: &ReserveSnapshot,
    backer: &UserSnapshot,
    amount: U256,
    fee: U256,
    timestamp: u64,
) -> Result<(ReserveSnapshot, UserSnapshot), ModelError> {
    let (mut reserve, mut backer) = accrue_position(reserve, backer, timestamp)?;

    let backing = amount.min(reserve.unbacked);
    let added = add(backing, fee)?;
    require_nonzero(added)?;
    let (fee_to_protocol, fee_to_lp) =
        calc_backing_fee_split(fee, pool_config.bridge_protocol_fee)?;

    reserve.cumulate_to_liquidity_index(fee_to_lp)?;
    reserve.accrue_to_treasury(fee_to_protocol)?;
    reserve.unbacked = sub(reserve.unbacked, backing)?;
    reserve.update_interest_rates(config, added, U256::ZERO)?;
    backer.spend(added)?;

    tracing::debug!(
        asset = %reserve.asset,
        %backing,
        %fee_to_protocol,
        %fee_to_lp,
        "back unbacked"
    );
    let backer = backer.accrue(&reserve, timestamp)?;
    Ok((reserve, backer))
}

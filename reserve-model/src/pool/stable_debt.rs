use alloy_primitives::U256;

use crate::{errors::ModelError, math::WadRayMath, validator::add};

/// Calculates the debt weighted stable rate after `amount` is borrowed at `rate` on top of
/// `balance` borrowed at `current_rate`.
///
/// Both the reserve average and a user's personal rate blend this way, for new borrows, for
/// swaps into stable debt and for rebalances.
///
/// ### Arguments
/// * `balance` - The stable debt before the mint (token decimals)
/// * `current_rate` - The rate carried by `balance` (27 decimals)
/// * `amount` - The amount being minted (token decimals)
/// * `rate` - The rate `amount` is minted at (27 decimals)
pub fn calc_rate_after_mint(
    balance: U256,
    current_rate: U256,
    amount: U256,
    rate: U256,
) -> Result<U256, ModelError> {
    let next_balance = add(balance, amount)?;
    if next_balance.is_zero() {
        return Ok(U256::ZERO);
    }
    let weighted_balance = current_rate.ray_mul(balance.wad_to_ray()?)?;
    let weighted_amount = rate.ray_mul(amount.wad_to_ray()?)?;
    add(weighted_balance, weighted_amount)?.ray_div(next_balance.wad_to_ray()?)
}

/// Calculates the total stable debt and average stable rate after `amount`, carried at
/// `user_rate`, is burned from the reserve's stable debt.
///
/// Accumulated rounding can leave the last burn larger than the tracked total, or the
/// removed rate weight larger than the remaining one. Both cases clear the total and the
/// average to zero.
///
/// ### Arguments
/// * `total_debt` - The reserve's stable debt before the burn (token decimals)
/// * `average_rate` - The reserve's average stable rate (27 decimals)
/// * `amount` - The amount being burned (token decimals)
/// * `user_rate` - The personal stable rate of the user whose debt is burned (27 decimals)
///
/// ### Returns
/// * (U256, U256) - (total stable debt, average stable rate) after the burn
pub fn calc_average_after_burn(
    total_debt: U256,
    average_rate: U256,
    amount: U256,
    user_rate: U256,
) -> Result<(U256, U256), ModelError> {
    if total_debt <= amount {
        return Ok((U256::ZERO, U256::ZERO));
    }
    let next_total = total_debt - amount;
    let first_term = average_rate.ray_mul(total_debt.wad_to_ray()?)?;
    let second_term = user_rate.ray_mul(amount.wad_to_ray()?)?;
    if second_term >= first_term {
        return Ok((U256::ZERO, U256::ZERO));
    }
    let next_average = (first_term - second_term).ray_div(next_total.wad_to_ray()?)?;
    Ok((next_total, next_average))
}

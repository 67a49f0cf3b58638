use alloy_primitives::U256;

use crate::{
    config::ReserveConfig,
    constants::PERCENTAGE_FACTOR,
    errors::ModelError,
    math::WadRayMath,
    validator::add,
};

/// The reserve balances the interest rate curve is evaluated against
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RateInputs {
    pub total_stable_debt: U256,
    pub total_variable_debt: U256,
    pub average_stable_borrow_rate: U256,
    pub available_liquidity: U256,
    pub unbacked: U256,
    pub reserve_factor: u32,
}

/// The output of the interest rate curve
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct InterestRates {
    pub liquidity_rate: U256,
    pub stable_borrow_rate: U256,
    pub variable_borrow_rate: U256,
    pub borrow_usage_ratio: U256,
    pub supply_usage_ratio: U256,
}

/// Calculates the borrow usage ratio and the supply usage ratio of a reserve
///
/// ### Returns
/// * (U256, U256) - (borrow usage ratio, supply usage ratio) scaled to 27 decimal places
///
/// ### Errors
/// `InvariantViolation` if the supply usage ratio exceeds the borrow usage ratio
pub fn calc_usage_ratios(
    total_debt: U256,
    available_liquidity: U256,
    unbacked: U256,
) -> Result<(U256, U256), ModelError> {
    if total_debt.is_zero() {
        return Ok((U256::ZERO, U256::ZERO));
    }
    let available_plus_debt = add(available_liquidity, total_debt)?;
    let borrow_usage_ratio = total_debt.ray_div(available_plus_debt)?;
    let supply_usage_ratio = total_debt.ray_div(add(available_plus_debt, unbacked)?)?;
    if supply_usage_ratio > borrow_usage_ratio {
        return Err(ModelError::InvariantViolation);
    }
    Ok((borrow_usage_ratio, supply_usage_ratio))
}

/// Calculates the debt weighted borrow rate across variable and stable borrowers
///
/// ### Arguments
/// * `total_stable_debt` - The total stable debt (token decimals)
/// * `total_variable_debt` - The total variable debt (token decimals)
/// * `variable_borrow_rate` - The current variable borrow rate (27 decimals)
/// * `average_stable_borrow_rate` - The current average stable rate (27 decimals)
pub fn calc_overall_borrow_rate(
    total_stable_debt: U256,
    total_variable_debt: U256,
    variable_borrow_rate: U256,
    average_stable_borrow_rate: U256,
) -> Result<U256, ModelError> {
    let total_debt = add(total_stable_debt, total_variable_debt)?;
    if total_debt.is_zero() {
        return Ok(U256::ZERO);
    }
    let weighted_variable_rate = total_variable_debt
        .wad_to_ray()?
        .ray_mul(variable_borrow_rate)?;
    let weighted_stable_rate = total_stable_debt
        .wad_to_ray()?
        .ray_mul(average_stable_borrow_rate)?;
    add(weighted_variable_rate, weighted_stable_rate)?.ray_div(total_debt.wad_to_ray()?)
}

/// Calculates the liquidity, stable and variable rates of a reserve from its balances using
/// a curve that kinks at the optimal usage ratio.
///
/// ### Arguments
/// * `config` - The Reserve config holding the curve parameters
/// * `inputs` - The reserve balances after the action being modeled
pub fn calc_interest_rates(
    config: &ReserveConfig,
    inputs: &RateInputs,
) -> Result<InterestRates, ModelError> {
    let total_debt = add(inputs.total_stable_debt, inputs.total_variable_debt)?;
    let (borrow_usage_ratio, supply_usage_ratio) =
        calc_usage_ratios(total_debt, inputs.available_liquidity, inputs.unbacked)?;
    let stable_to_total_debt_ratio = if total_debt.is_zero() {
        U256::ZERO
    } else {
        inputs.total_stable_debt.ray_div(total_debt)?
    };

    let mut stable_borrow_rate = config.base_stable_borrow_rate()?;
    let mut variable_borrow_rate = config.base_variable_borrow_rate;

    if borrow_usage_ratio > config.optimal_usage_ratio {
        let excess_borrow_usage_ratio = (borrow_usage_ratio - config.optimal_usage_ratio)
            .ray_div(config.max_excess_usage_ratio())?;
        stable_borrow_rate = add(
            stable_borrow_rate,
            add(
                config.stable_rate_slope1,
                config.stable_rate_slope2.ray_mul(excess_borrow_usage_ratio)?,
            )?,
        )?;
        variable_borrow_rate = add(
            variable_borrow_rate,
            add(
                config.variable_rate_slope1,
                config.variable_rate_slope2.ray_mul(excess_borrow_usage_ratio)?,
            )?,
        )?;
    } else {
        stable_borrow_rate = add(
            stable_borrow_rate,
            config
                .stable_rate_slope1
                .ray_mul(borrow_usage_ratio)?
                .ray_div(config.optimal_usage_ratio)?,
        )?;
        variable_borrow_rate = add(
            variable_borrow_rate,
            config
                .variable_rate_slope1
                .ray_mul(borrow_usage_ratio)?
                .ray_div(config.optimal_usage_ratio)?,
        )?;
    }

    if stable_to_total_debt_ratio > config.optimal_stable_to_total_debt_ratio {
        let excess_stable_debt_ratio = (stable_to_total_debt_ratio
            - config.optimal_stable_to_total_debt_ratio)
            .ray_div(config.max_excess_stable_to_total_debt_ratio())?;
        stable_borrow_rate = add(
            stable_borrow_rate,
            config
                .stable_rate_excess_offset
                .ray_mul(excess_stable_debt_ratio)?,
        )?;
    }

    let liquidity_rate = calc_overall_borrow_rate(
        inputs.total_stable_debt,
        inputs.total_variable_debt,
        variable_borrow_rate,
        inputs.average_stable_borrow_rate,
    )?
    .ray_mul(supply_usage_ratio)?
    .percent_mul(
        PERCENTAGE_FACTOR
            .checked_sub(inputs.reserve_factor)
            .ok_or(ModelError::InvalidReserveConfig)?,
    )?;

    Ok(InterestRates {
        liquidity_rate,
        stable_borrow_rate,
        variable_borrow_rate,
        borrow_usage_ratio,
        supply_usage_ratio,
    })
}

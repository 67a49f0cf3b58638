use alloy_primitives::U256;

use crate::{errors::ModelError, math::WadRayMath, validator::sub};

/// The collateral and debt moved by a liquidation
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct LiquidationAmounts {
    pub base_collateral: U256,       // the collateral worth exactly the debt covered
    pub total_collateral: U256,      // the collateral seized from the borrower, bonus included
    pub bonus_collateral: U256,      // the part of the seized collateral paid as a bonus
    pub protocol_fee: U256,          // the part of the bonus sent to the treasury
    pub liquidator_collateral: U256, // the collateral the liquidator receives
    pub debt_to_cover: U256,         // the debt the liquidator repays
}

/// Calculates the collateral seized for repaying `debt_to_cover` of a borrower's debt.
///
/// If the borrower holds less collateral than the bonus inflated amount, the whole balance is
/// seized and the debt covered shrinks to the amount that collateral pays for.
///
/// ### Arguments
/// * `debt_price` - The price of the debt asset
/// * `debt_to_cover` - The debt the liquidator offers to repay
/// * `debt_scalar` - One unit of the debt asset
/// * `collateral_price` - The price of the collateral asset, in the same base as `debt_price`
/// * `collateral_scalar` - One unit of the collateral asset
/// * `collateral_balance` - The borrower's collateral balance
/// * `liquidation_bonus` - The collateral multiplier paid to the liquidator (10500 = 105%)
/// * `protocol_fee` - The share of the bonus sent to the treasury
///
/// ### Errors
/// If a price is zero or a product overflows
#[allow(clippy::too_many_arguments)]
pub fn calc_liquidation_amounts(
    debt_price: U256,
    debt_to_cover: U256,
    debt_scalar: U256,
    collateral_price: U256,
    collateral_scalar: U256,
    collateral_balance: U256,
    liquidation_bonus: u32,
    protocol_fee: u32,
) -> Result<LiquidationAmounts, ModelError> {
    let base_collateral = mul_div(
        &[debt_price, debt_to_cover, collateral_scalar],
        &[collateral_price, debt_scalar],
    )?;
    let max_collateral = base_collateral.percent_mul(liquidation_bonus)?;

    let (total_collateral, debt_to_cover) = if max_collateral > collateral_balance {
        let debt_needed = mul_div(
            &[collateral_price, collateral_balance, debt_scalar],
            &[debt_price, collateral_scalar],
        )?
        .percent_div(liquidation_bonus)?;
        (collateral_balance, debt_needed)
    } else {
        (max_collateral, debt_to_cover)
    };

    let bonus_collateral = sub(
        total_collateral,
        total_collateral.percent_div(liquidation_bonus)?,
    )?;
    let protocol_fee = bonus_collateral.percent_mul(protocol_fee)?;

    Ok(LiquidationAmounts {
        base_collateral,
        total_collateral,
        bonus_collateral,
        protocol_fee,
        liquidator_collateral: sub(total_collateral, protocol_fee)?,
        debt_to_cover,
    })
}

/// The split of a flash loan premium
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct FlashLoanPremium {
    pub total: U256,       // the premium paid by the receiver
    pub to_protocol: U256, // the part sent to the treasury
    pub to_lp: U256,       // the part distributed to suppliers
}

/// Calculates the premium owed on a flash loan of `amount`
///
/// ### Arguments
/// * `amount` - The amount borrowed
/// * `premium_total` - The premium charged on the amount
/// * `premium_to_protocol` - The share of the premium sent to the treasury
pub fn calc_flash_loan_premium(
    amount: U256,
    premium_total: u32,
    premium_to_protocol: u32,
) -> Result<FlashLoanPremium, ModelError> {
    let total = amount.percent_mul(premium_total)?;
    let to_protocol = total.percent_mul(premium_to_protocol)?;
    Ok(FlashLoanPremium {
        total,
        to_protocol,
        to_lp: sub(total, to_protocol)?,
    })
}

/// Split a backing fee into (protocol share, supplier share)
pub fn calc_backing_fee_split(fee: U256, protocol_fee: u32) -> Result<(U256, U256), ModelError> {
    let to_protocol = fee.percent_mul(protocol_fee)?;
    Ok((to_protocol, sub(fee, to_protocol)?))
}

/// Compute the product of `numerators` divided by the product of `denominators`, rounding down
fn mul_div(numerators: &[U256], denominators: &[U256]) -> Result<U256, ModelError> {
    let numerator = numerators
        .iter()
        .try_fold(U256::from(1u8), |acc, term| acc.checked_mul(*term))
        .ok_or(ModelError::Overflow)?;
    let denominator = denominators
        .iter()
        .try_fold(U256::from(1u8), |acc, term| acc.checked_mul(*term))
        .ok_or(ModelError::Overflow)?;
    numerator
        .checked_div(denominator)
        .ok_or(ModelError::DivisionByZero)
}

use alloy_primitives::U256;

use crate::{
    config::ReserveConfig,
    constants::MAX_UINT_AMOUNT,
    errors::ModelError,
    math::WadRayMath,
    validator::{add, require_nonzero, sub},
};

use super::{
    fees::{calc_liquidation_amounts, LiquidationAmounts},
    reserve::ReserveSnapshot,
    user::UserSnapshot,
};

/// The priced inputs of a liquidation
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LiquidationParams {
    pub debt_price: U256,
    pub collateral_price: U256,
    pub debt_to_cover: U256, // `MAX_UINT_AMOUNT` covers the borrower's whole debt
    pub receive_a_token: bool, // the liquidator takes the collateral as supply
}

/// Every position a liquidation touches
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LiquidationPositions {
    pub borrower_debt: UserSnapshot,
    pub borrower_collateral: UserSnapshot,
    pub liquidator_debt: UserSnapshot,
    pub liquidator_collateral: UserSnapshot,
    pub treasury_collateral: UserSnapshot,
}

/// The predicted state after a liquidation
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LiquidationOutcome {
    pub debt_reserve: ReserveSnapshot,
    pub collateral_reserve: ReserveSnapshot,
    pub positions: LiquidationPositions,
    pub amounts: LiquidationAmounts,
}

impl LiquidationPositions {
    fn validate(
        &self,
        debt_reserve: &ReserveSnapshot,
        collateral_reserve: &ReserveSnapshot,
    ) -> Result<(), ModelError> {
        let borrower = self.borrower_debt.user;
        let liquidator = self.liquidator_debt.user;
        let treasury = self.treasury_collateral.user;
        if debt_reserve.asset == collateral_reserve.asset
            || self.borrower_collateral.user != borrower
            || self.liquidator_collateral.user != liquidator
            || borrower == liquidator
            || treasury == borrower
            || treasury == liquidator
        {
            return Err(ModelError::BadRequest);
        }
        Ok(())
    }
}

/// Predict the reserves and positions after a liquidator repays part of a borrower's debt in
/// exchange for the borrower's collateral plus a bonus
///
/// Debt is burned variable first, then stable. The protocol's share of the bonus moves to the
/// treasury as supply. When the liquidator takes the collateral as supply the collateral
/// reserve is not written to.
///
/// No health factor is computed here, so no close factor applies: `debt_to_cover` is only
/// capped at the borrower's total debt and by the collateral available to seize. Callers
/// modeling a partial close must pass the capped amount themselves.
///
/// ### Arguments
/// * `debt_config` - The configuration of the debt reserve
/// * `collateral_config` - The configuration of the collateral reserve, holding the bonus
/// * `debt_reserve` - The reserve of the debt being repaid
/// * `collateral_reserve` - The reserve of the collateral being seized
/// * `positions` - The positions the liquidation touches
/// * `params` - The prices and amount of the liquidation
/// * `timestamp` - The timestamp of the liquidation
///
/// ### Errors
/// If both reserves are the same asset, the positions are inconsistent, the borrower has no
/// debt or no enabled collateral, or the liquidator cannot pay
pub fn execute_liquidation(
    debt_config: &ReserveConfig,
    collateral_config: &ReserveConfig,
    debt_reserve: &ReserveSnapshot,
    collateral_reserve: &ReserveSnapshot,
    positions: &LiquidationPositions,
    params: &LiquidationParams,
    timestamp: u64,
) -> Result<LiquidationOutcome, ModelError> {
    positions.validate(debt_reserve, collateral_reserve)?;
    require_nonzero(params.debt_to_cover)?;

    let mut debt_reserve = debt_reserve.accrue(timestamp)?;
    let collateral_view = collateral_reserve.accrue(timestamp)?;
    let mut borrower_debt = positions.borrower_debt.accrue(&debt_reserve, timestamp)?;
    let mut liquidator_debt = positions.liquidator_debt.accrue(&debt_reserve, timestamp)?;
    let mut borrower_collateral = positions
        .borrower_collateral
        .accrue(&collateral_view, timestamp)?;
    let mut liquidator_collateral = positions
        .liquidator_collateral
        .accrue(&collateral_view, timestamp)?;
    let mut treasury_collateral = positions
        .treasury_collateral
        .accrue(&collateral_view, timestamp)?;

    if !borrower_collateral.usage_as_collateral_enabled {
        return Err(ModelError::BadRequest);
    }
    let user_debt = borrower_debt.total_debt()?;
    require_nonzero(user_debt)?;
    let debt_to_cover = if params.debt_to_cover == MAX_UINT_AMOUNT {
        user_debt
    } else {
        params.debt_to_cover.min(user_debt)
    };
    let collateral_balance = borrower_collateral.current_a_token_balance;
    require_nonzero(collateral_balance)?;

    let amounts = calc_liquidation_amounts(
        params.debt_price,
        debt_to_cover,
        debt_reserve.scalar()?,
        params.collateral_price,
        collateral_view.scalar()?,
        collateral_balance,
        collateral_config.liquidation_bonus,
        collateral_config.liquidation_protocol_fee,
    )?;
    let actual_debt = amounts.debt_to_cover;
    require_nonzero(actual_debt)?;

    // repay the debt, variable first
    let variable_debt = borrower_debt.current_variable_debt;
    if variable_debt >= actual_debt {
        let scaled = if variable_debt == actual_debt {
            borrower_debt.scaled_variable_debt
        } else {
            actual_debt.ray_div(debt_reserve.variable_borrow_index)?
        };
        borrower_debt.scaled_variable_debt = sub(borrower_debt.scaled_variable_debt, scaled)?;
        debt_reserve.burn_variable_debt(scaled)?;
    } else {
        if !variable_debt.is_zero() {
            debt_reserve.burn_variable_debt(borrower_debt.scaled_variable_debt)?;
            borrower_debt.scaled_variable_debt = U256::ZERO;
        }
        let stable_part = actual_debt - variable_debt;
        debt_reserve.burn_stable_debt(stable_part, borrower_debt.stable_borrow_rate, timestamp)?;
        borrower_debt.burn_stable_debt(stable_part, timestamp)?;
    }
    debt_reserve.update_interest_rates(debt_config, actual_debt, U256::ZERO)?;
    liquidator_debt.spend(actual_debt)?;

    // seize the collateral
    let liquidity_index = collateral_view.liquidity_index;
    let seizes_whole_balance = amounts.total_collateral == collateral_balance;
    let fee_scaled = amounts.protocol_fee.ray_div(liquidity_index)?;
    let liquidator_scaled = if seizes_whole_balance {
        sub(borrower_collateral.scaled_a_token_balance, fee_scaled)?
    } else {
        amounts.liquidator_collateral.ray_div(liquidity_index)?
    };

    let collateral_now = if params.receive_a_token {
        borrower_collateral.remove_supply(liquidator_scaled)?;
        liquidator_collateral.add_supply(liquidator_scaled)?;
        collateral_view
    } else {
        let mut reserve = collateral_view;
        if amounts.liquidator_collateral > reserve.available_liquidity {
            return Err(ModelError::BadRequest);
        }
        reserve.update_interest_rates(
            collateral_config,
            U256::ZERO,
            amounts.liquidator_collateral,
        )?;
        reserve.scaled_a_token_supply = sub(reserve.scaled_a_token_supply, liquidator_scaled)?;
        borrower_collateral.remove_supply(liquidator_scaled)?;
        liquidator_collateral.receive(amounts.liquidator_collateral)?;
        reserve
    };

    if !fee_scaled.is_zero() {
        borrower_collateral.remove_supply(fee_scaled)?;
        treasury_collateral.scaled_a_token_balance =
            add(treasury_collateral.scaled_a_token_balance, fee_scaled)?;
    }
    if seizes_whole_balance {
        borrower_collateral.usage_as_collateral_enabled = false;
    }

    tracing::debug!(
        debt_asset = %debt_reserve.asset,
        collateral_asset = %collateral_now.asset,
        borrower = %borrower_debt.user,
        debt = %actual_debt,
        collateral = %amounts.total_collateral,
        protocol_fee = %amounts.protocol_fee,
        "liquidation"
    );

    let positions = LiquidationPositions {
        borrower_debt: borrower_debt.accrue(&debt_reserve, timestamp)?,
        borrower_collateral: borrower_collateral.accrue(&collateral_now, timestamp)?,
        liquidator_debt: liquidator_debt.accrue(&debt_reserve, timestamp)?,
        liquidator_collateral: liquidator_collateral.accrue(&collateral_now, timestamp)?,
        treasury_collateral: treasury_collateral.accrue(&collateral_now, timestamp)?,
    };
    let collateral_reserve = if params.receive_a_token {
        collateral_reserve.clone()
    } else {
        collateral_now
    };
    Ok(LiquidationOutcome {
        debt_reserve,
        collateral_reserve,
        positions,
        amounts,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        constants::SECONDS_PER_YEAR,
        pool::{
            borrow::{execute_borrow, RateMode},
            supply::execute_supply,
        },
        testutils::{self, tokens},
    };
    use alloy_primitives::Address;

    struct Setup {
        debt_reserve: ReserveSnapshot,
        collateral_reserve: ReserveSnapshot,
        positions: LiquidationPositions,
    }

    /// A borrower with 100 collateral tokens owing 20 variable and 60 stable debt tokens
    fn setup() -> Setup {
        let config = testutils::default_reserve_config();
        let borrower = Address::repeat_byte(0xB);
        let liquidator = Address::repeat_byte(0xC);
        let treasury = testutils::default_pool_config().treasury;

        let debt_reserve = testutils::supplied_reserve();
        let mut collateral_reserve = testutils::supplied_reserve();
        collateral_reserve.asset = Address::repeat_byte(2);

        let borrower_collateral =
            UserSnapshot::new(borrower, collateral_reserve.asset, tokens(1000));
        let (collateral_reserve, borrower_collateral) = execute_supply(
            &config,
            &collateral_reserve,
            &borrower_collateral,
            tokens(100),
            0,
        )
        .unwrap();

        let borrower_debt = UserSnapshot::new(borrower, debt_reserve.asset, U256::ZERO);
        let (debt_reserve, borrower_debt) = execute_borrow(
            &config,
            &debt_reserve,
            &borrower_debt,
            tokens(20),
            RateMode::Variable,
            0,
        )
        .unwrap();
        let (debt_reserve, borrower_debt) = execute_borrow(
            &config,
            &debt_reserve,
            &borrower_debt,
            tokens(60),
            RateMode::Stable,
            0,
        )
        .unwrap();

        Setup {
            positions: LiquidationPositions {
                borrower_debt,
                borrower_collateral,
                liquidator_debt: UserSnapshot::new(liquidator, debt_reserve.asset, tokens(1000)),
                liquidator_collateral: UserSnapshot::new(
                    liquidator,
                    collateral_reserve.asset,
                    U256::ZERO,
                ),
                treasury_collateral: UserSnapshot::new(
                    treasury,
                    collateral_reserve.asset,
                    U256::ZERO,
                ),
            },
            debt_reserve,
            collateral_reserve,
        }
    }

    #[test]
    fn test_execute_liquidation() {
        let config = testutils::default_reserve_config();
        let setup = setup();
        let params = LiquidationParams {
            debt_price: U256::from(1u8),
            collateral_price: U256::from(1u8),
            debt_to_cover: tokens(50),
            receive_a_token: false,
        };

        let outcome = execute_liquidation(
            &config,
            &config,
            &setup.debt_reserve,
            &setup.collateral_reserve,
            &setup.positions,
            &params,
            SECONDS_PER_YEAR,
        )
        .unwrap();

        let amounts = &outcome.amounts;
        assert_eq!(amounts.total_collateral, U256::from(52_500_000_000_000_000_000u128));
        assert_eq!(amounts.protocol_fee, U256::from(250_000_000_000_000_000u128));
        assert_eq!(amounts.debt_to_cover, tokens(50));

        // the 20.25 variable tokens are cleared before the stable debt is touched
        let debt_reserve = &outcome.debt_reserve;
        assert_eq!(debt_reserve.scaled_variable_debt, U256::ZERO);
        assert_eq!(
            debt_reserve.total_stable_debt,
            U256::from(36_105_035_348_957_361_396u128)
        );
        assert_eq!(debt_reserve.available_liquidity, tokens(970));
        assert_eq!(
            debt_reserve.accrued_to_treasury_scaled,
            U256::from(607_313_922_176_465_344u128)
        );
        assert_eq!(
            debt_reserve.variable_borrow_rate,
            U256::from(5_582_258_943_880_609_486_511_051u128)
        );

        let collateral_reserve = &outcome.collateral_reserve;
        assert_eq!(
            collateral_reserve.available_liquidity,
            U256::from(1_047_750_000_000_000_000_000u128)
        );
        assert_eq!(
            collateral_reserve.scaled_a_token_supply,
            U256::from(1_047_750_000_000_000_000_000u128)
        );
        assert_eq!(collateral_reserve.last_update_timestamp, SECONDS_PER_YEAR);

        let positions = &outcome.positions;
        assert_eq!(positions.borrower_debt.scaled_variable_debt, U256::ZERO);
        assert_eq!(
            positions.borrower_debt.principal_stable_debt,
            U256::from(36_105_035_348_957_361_396u128)
        );
        assert_eq!(
            positions.borrower_collateral.scaled_a_token_balance,
            U256::from(47_500_000_000_000_000_000u128)
        );
        assert!(positions.borrower_collateral.usage_as_collateral_enabled);
        assert_eq!(positions.liquidator_debt.wallet_balance, tokens(950));
        assert_eq!(
            positions.liquidator_collateral.wallet_balance,
            U256::from(52_250_000_000_000_000_000u128)
        );
        assert_eq!(
            positions.treasury_collateral.scaled_a_token_balance,
            U256::from(250_000_000_000_000_000u128)
        );
        assert!(!positions.treasury_collateral.usage_as_collateral_enabled);
    }

    #[test]
    fn test_execute_liquidation_whole_collateral_as_supply() {
        let config = testutils::default_reserve_config();
        let setup = setup();
        let params = LiquidationParams {
            debt_price: U256::from(2u8),
            collateral_price: U256::from(1u8),
            debt_to_cover: MAX_UINT_AMOUNT,
            receive_a_token: true,
        };

        let outcome = execute_liquidation(
            &config,
            &config,
            &setup.debt_reserve,
            &setup.collateral_reserve,
            &setup.positions,
            &params,
            SECONDS_PER_YEAR,
        )
        .unwrap();

        let amounts = &outcome.amounts;
        assert_eq!(amounts.total_collateral, tokens(100));
        assert_eq!(
            amounts.debt_to_cover,
            U256::from(47_619_047_619_047_619_048u128)
        );
        assert_eq!(
            amounts.protocol_fee,
            U256::from(476_190_476_190_476_191u128)
        );

        assert_eq!(
            outcome.debt_reserve.total_stable_debt,
            U256::from(38_485_987_729_909_742_348u128)
        );
        assert_eq!(
            outcome.debt_reserve.available_liquidity,
            U256::from(967_619_047_619_047_619_048u128)
        );
        assert_eq!(outcome.collateral_reserve, setup.collateral_reserve);

        let positions = &outcome.positions;
        assert_eq!(positions.borrower_collateral.scaled_a_token_balance, U256::ZERO);
        assert!(!positions.borrower_collateral.usage_as_collateral_enabled);
        assert_eq!(
            positions.liquidator_collateral.scaled_a_token_balance,
            U256::from(99_523_809_523_809_523_809u128)
        );
        assert!(positions.liquidator_collateral.usage_as_collateral_enabled);
        assert_eq!(positions.liquidator_collateral.wallet_balance, U256::ZERO);
        assert_eq!(
            positions.treasury_collateral.scaled_a_token_balance,
            U256::from(476_190_476_190_476_191u128)
        );
        assert_eq!(
            positions.liquidator_debt.wallet_balance,
            U256::from(952_380_952_380_952_380_952u128)
        );
    }

    #[test]
    fn test_execute_liquidation_covers_past_half_the_debt() {
        let config = testutils::default_reserve_config();
        let setup = setup();
        // 70 of roughly 81 debt tokens, with no close factor limiting it
        let params = LiquidationParams {
            debt_price: U256::from(1u8),
            collateral_price: U256::from(1u8),
            debt_to_cover: tokens(70),
            receive_a_token: false,
        };

        let outcome = execute_liquidation(
            &config,
            &config,
            &setup.debt_reserve,
            &setup.collateral_reserve,
            &setup.positions,
            &params,
            SECONDS_PER_YEAR,
        )
        .unwrap();

        assert_eq!(outcome.amounts.debt_to_cover, tokens(70));
        assert_eq!(
            outcome.amounts.total_collateral,
            U256::from(73_500_000_000_000_000_000u128)
        );
        assert_eq!(outcome.debt_reserve.available_liquidity, tokens(990));
        assert_eq!(outcome.positions.liquidator_debt.wallet_balance, tokens(930));
    }

    #[test]
    fn test_execute_liquidation_same_asset() {
        let config = testutils::default_reserve_config();
        let setup = setup();
        let params = LiquidationParams {
            debt_price: U256::from(1u8),
            collateral_price: U256::from(1u8),
            debt_to_cover: tokens(10),
            receive_a_token: false,
        };
        let result = execute_liquidation(
            &config,
            &config,
            &setup.debt_reserve,
            &setup.debt_reserve,
            &setup.positions,
            &params,
            SECONDS_PER_YEAR,
        );
        assert_eq!(result, Err(ModelError::BadRequest));
    }

    #[test]
    fn test_execute_liquidation_collateral_disabled() {
        let config = testutils::default_reserve_config();
        let mut setup = setup();
        setup.positions.borrower_collateral.usage_as_collateral_enabled = false;
        let params = LiquidationParams {
            debt_price: U256::from(1u8),
            collateral_price: U256::from(1u8),
            debt_to_cover: tokens(10),
            receive_a_token: false,
        };
        let result = execute_liquidation(
            &config,
            &config,
            &setup.debt_reserve,
            &setup.collateral_reserve,
            &setup.positions,
            &params,
            SECONDS_PER_YEAR,
        );
        assert_eq!(result, Err(ModelError::BadRequest));
    }

    #[test]
    fn test_execute_liquidation_self() {
        let config = testutils::default_reserve_config();
        let mut setup = setup();
        setup.positions.liquidator_debt.user = setup.positions.borrower_debt.user;
        setup.positions.liquidator_collateral.user = setup.positions.borrower_debt.user;
        let params = LiquidationParams {
            debt_price: U256::from(1u8),
            collateral_price: U256::from(1u8),
            debt_to_cover: tokens(10),
            receive_a_token: false,
        };
        let result = execute_liquidation(
            &config,
            &config,
            &setup.debt_reserve,
            &setup.collateral_reserve,
            &setup.positions,
            &params,
            SECONDS_PER_YEAR,
        );
        assert_eq!(result, Err(ModelError::BadRequest));
    }
}

use alloy_primitives::U256;

use crate::{
    config::ReserveConfig,
    constants::MAX_UINT_AMOUNT,
    errors::ModelError,
    math::WadRayMath,
    validator::{require_nonzero, sub},
};

use super::{
    reserve::ReserveSnapshot,
    user::{accrue_position, UserSnapshot},
};

/// The kind of debt a borrow or repay acts on
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub enum RateMode {
    Stable,
    Variable,
}

/// Predict the reserve and user after `user` borrows `amount` of underlying
///
/// Stable borrows lock in the reserve's stable rate from before the borrow.
///
/// ### Arguments
/// * `config` - The reserve configuration
/// * `reserve` - The reserve before the borrow
/// * `user` - The borrower's position before the borrow
/// * `amount` - The amount of underlying borrowed
/// * `rate_mode` - The kind of debt taken on
/// * `timestamp` - The timestamp of the borrow
///
/// ### Errors
/// If the amount is zero or exceeds the reserve's available liquidity
pub fn execute_borrow(
    config: &ReserveConfig,
    reserve: &ReserveSnapshot,
    user: &UserSnapshot,
    amount: U256,
    rate_mode: RateMode,
    timestamp: u64,
) -> Result<(ReserveSnapshot, UserSnapshot), ModelError> {
    require_nonzero(amount)?;
    let (mut reserve, mut user) = accrue_position(reserve, user, timestamp)?;
    if amount > reserve.available_liquidity {
        return Err(ModelError::BadRequest);
    }

    match rate_mode {
        RateMode::Variable => {
            let scaled = reserve.mint_variable_debt(amount)?;
            user.scaled_variable_debt = user
                .scaled_variable_debt
                .checked_add(scaled)
                .ok_or(ModelError::Overflow)?;
        }
        RateMode::Stable => {
            let rate = reserve.stable_borrow_rate;
            user.mint_stable_debt(amount, rate, timestamp)?;
            reserve.mint_stable_debt(amount, rate, timestamp)?;
        }
    }
    reserve.update_interest_rates(config, U256::ZERO, amount)?;
    user.receive(amount)?;

    tracing::debug!(asset = %reserve.asset, user = %user.user, %amount, ?rate_mode, "borrow");
    let user = user.accrue(&reserve, timestamp)?;
    Ok((reserve, user))
}

/// Predict the reserve and user after `user` repays `amount` of one kind of debt
///
/// The amount is capped at the user's debt as of `timestamp`. Passing `MAX_UINT_AMOUNT` repays
/// the whole debt.
///
/// ### Arguments
/// * `config` - The reserve configuration
/// * `reserve` - The reserve before the repayment
/// * `user` - The borrower's position before the repayment
/// * `amount` - The amount of underlying repaid
/// * `rate_mode` - The kind of debt repaid
/// * `timestamp` - The timestamp of the repayment
///
/// ### Errors
/// If the amount is zero, the user has no debt of that kind, or the wallet cannot pay
pub fn execute_repay(
    config: &ReserveConfig,
    reserve: &ReserveSnapshot,
    user: &UserSnapshot,
    amount: U256,
    rate_mode: RateMode,
    timestamp: u64,
) -> Result<(ReserveSnapshot, UserSnapshot), ModelError> {
    require_nonzero(amount)?;
    let (mut reserve, mut user) = accrue_position(reserve, user, timestamp)?;

    let debt = match rate_mode {
        RateMode::Variable => user.current_variable_debt,
        RateMode::Stable => user.current_stable_debt,
    };
    require_nonzero(debt)?;
    let payback = if amount == MAX_UINT_AMOUNT {
        debt
    } else {
        amount.min(debt)
    };

    match rate_mode {
        RateMode::Variable => {
            let scaled = if payback == debt {
                user.scaled_variable_debt
            } else {
                payback.ray_div(reserve.variable_borrow_index)?
            };
            user.scaled_variable_debt = sub(user.scaled_variable_debt, scaled)?;
            reserve.burn_variable_debt(scaled)?;
        }
        RateMode::Stable => {
            reserve.burn_stable_debt(payback, user.stable_borrow_rate, timestamp)?;
            user.burn_stable_debt(payback, timestamp)?;
        }
    }
    reserve.update_interest_rates(config, payback, U256::ZERO)?;
    user.spend(payback)?;

    tracing::debug!(asset = %reserve.asset, user = %user.user, %payback, ?rate_mode, "repay");
    let user = user.accrue(&reserve, timestamp)?;
    Ok((reserve, user))
}

/// Predict the reserve and user after `user` moves their whole debt out of `rate_mode` and
/// into the other mode. Debt moved to stable locks in the reserve's current stable rate.
///
/// ### Errors
/// If the user has no debt of `rate_mode`
pub fn execute_swap_rate_mode(
    config: &ReserveConfig,
    reserve: &ReserveSnapshot,
    user: &UserSnapshot,
    rate_mode: RateMode,
    timestamp: u64,
) -> Result<(ReserveSnapshot, UserSnapshot), ModelError> {
    let (mut reserve, mut user) = accrue_position(reserve, user, timestamp)?;

    match rate_mode {
        RateMode::Stable => {
            let debt = user.current_stable_debt;
            require_nonzero(debt)?;
            reserve.burn_stable_debt(debt, user.stable_borrow_rate, timestamp)?;
            user.burn_stable_debt(debt, timestamp)?;
            let scaled = reserve.mint_variable_debt(debt)?;
            user.scaled_variable_debt = user
                .scaled_variable_debt
                .checked_add(scaled)
                .ok_or(ModelError::Overflow)?;
        }
        RateMode::Variable => {
            let debt = user.current_variable_debt;
            require_nonzero(debt)?;
            reserve.burn_variable_debt(user.scaled_variable_debt)?;
            user.scaled_variable_debt = U256::ZERO;
            let rate = reserve.stable_borrow_rate;
            user.mint_stable_debt(debt, rate, timestamp)?;
            reserve.mint_stable_debt(debt, rate, timestamp)?;
        }
    }
    reserve.update_interest_rates(config, U256::ZERO, U256::ZERO)?;

    tracing::debug!(asset = %reserve.asset, user = %user.user, ?rate_mode, "swap rate mode");
    let user = user.accrue(&reserve, timestamp)?;
    Ok((reserve, user))
}

/// Predict the reserve and user after the user's stable debt is re-minted at the reserve's
/// current stable rate
///
/// ### Errors
/// If the user has no stable debt
pub fn execute_rebalance_stable_rate(
    config: &ReserveConfig,
    reserve: &ReserveSnapshot,
    user: &UserSnapshot,
    timestamp: u64,
) -> Result<(ReserveSnapshot, UserSnapshot), ModelError> {
    let (mut reserve, mut user) = accrue_position(reserve, user, timestamp)?;
    let debt = user.current_stable_debt;
    require_nonzero(debt)?;

    reserve.burn_stable_debt(debt, user.stable_borrow_rate, timestamp)?;
    user.burn_stable_debt(debt, timestamp)?;
    let rate = reserve.stable_borrow_rate;
    user.mint_stable_debt(debt, rate, timestamp)?;
    reserve.mint_stable_debt(debt, rate, timestamp)?;
    reserve.update_interest_rates(config, U256::ZERO, U256::ZERO)?;

    tracing::debug!(asset = %reserve.asset, user = %user.user, %rate, "rebalance stable rate");
    let user = user.accrue(&reserve, timestamp)?;
    Ok((reserve, user))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        constants::SECONDS_PER_YEAR,
        testutils::{self, tokens},
    };
    use alloy_primitives::Address;

    const TWO_YEARS: u64 = 2 * SECONDS_PER_YEAR;

    fn borrower(reserve: &ReserveSnapshot) -> UserSnapshot {
        UserSnapshot::new(Address::repeat_byte(0xB), reserve.asset, U256::ZERO)
    }

    /// Borrow 100 tokens of `rate_mode` from the borrowed reserve after one year and refill
    /// the borrower's wallet
    fn with_debt(rate_mode: RateMode) -> (ReserveSnapshot, UserSnapshot) {
        let config = testutils::default_reserve_config();
        let reserve = testutils::borrowed_reserve();
        let user = borrower(&reserve);
        let (reserve, mut user) =
            execute_borrow(&config, &reserve, &user, tokens(100), rate_mode, SECONDS_PER_YEAR)
                .unwrap();
        user.wallet_balance = tokens(1000);
        (reserve, user)
    }

    #[test]
    fn test_execute_borrow_variable() {
        let config = testutils::default_reserve_config();
        let reserve = testutils::borrowed_reserve();
        let user = borrower(&reserve);

        let (reserve, user) = execute_borrow(
            &config,
            &reserve,
            &user,
            tokens(100),
            RateMode::Variable,
            SECONDS_PER_YEAR,
        )
        .unwrap();

        assert_eq!(
            reserve.variable_borrow_index,
            U256::from(1_047_771_237_099_794_058_474_122_667u128)
        );
        assert_eq!(
            reserve.scaled_variable_debt,
            U256::from(395_440_680_617_266_827_241u128)
        );
        assert_eq!(
            reserve.total_variable_debt,
            U256::from(414_331_371_129_938_217_542u128)
        );
        assert_eq!(reserve.available_liquidity, tokens(600));
        assert_eq!(
            reserve.variable_borrow_rate,
            U256::from(63_540_918_140_405_437_557_444_951u128)
        );
        assert_eq!(
            reserve.liquidity_rate,
            U256::from(23_359_522_180_584_434_965_762_064u128)
        );

        assert_eq!(
            user.scaled_variable_debt,
            U256::from(95_440_680_617_266_827_241u128)
        );
        assert_eq!(user.current_variable_debt, tokens(100));
        assert_eq!(user.wallet_balance, tokens(100));
    }

    #[test]
    fn test_execute_borrow_stable() {
        let config = testutils::default_reserve_config();
        let reserve = testutils::borrowed_reserve();
        let stable_rate = reserve.stable_borrow_rate;
        let user = borrower(&reserve);

        let (reserve, user) = execute_borrow(
            &config,
            &reserve,
            &user,
            tokens(100),
            RateMode::Stable,
            SECONDS_PER_YEAR,
        )
        .unwrap();

        assert_eq!(reserve.total_stable_debt, tokens(100));
        assert_eq!(reserve.principal_stable_debt, tokens(100));
        assert_eq!(reserve.average_stable_borrow_rate, stable_rate);
        assert_eq!(reserve.total_stable_debt_last_updated, SECONDS_PER_YEAR);
        assert_eq!(
            reserve.stable_borrow_rate,
            U256::from(156_125_462_626_996_922_750_535_239u128)
        );
        assert_eq!(
            reserve.liquidity_rate,
            U256::from(29_847_852_872_784_260_948_332_859u128)
        );

        assert_eq!(user.principal_stable_debt, tokens(100));
        assert_eq!(user.current_stable_debt, tokens(100));
        assert_eq!(user.stable_borrow_rate, stable_rate);
        assert_eq!(user.stable_rate_last_updated, SECONDS_PER_YEAR);
    }

    #[test]
    fn test_execute_borrow_stable_blends_user_rate() {
        let config = testutils::default_reserve_config();
        let reserve = testutils::borrowed_reserve();
        let user = borrower(&reserve);

        let (reserve, user) =
            execute_borrow(&config, &reserve, &user, tokens(100), RateMode::Stable, 0).unwrap();
        let first_rate = user.stable_borrow_rate;
        let second_rate = reserve.stable_borrow_rate;
        let (reserve, user) =
            execute_borrow(&config, &reserve, &user, tokens(100), RateMode::Stable, 0).unwrap();

        let blended = (first_rate + second_rate) / U256::from(2u8);
        assert!(user.stable_borrow_rate.abs_diff(blended) <= U256::from(1u8));
        assert_eq!(reserve.average_stable_borrow_rate, user.stable_borrow_rate);
        assert_eq!(reserve.total_stable_debt, tokens(200));
    }

    #[test]
    fn test_execute_borrow_over_liquidity() {
        let config = testutils::default_reserve_config();
        let reserve = testutils::borrowed_reserve();
        let user = borrower(&reserve);
        let result =
            execute_borrow(&config, &reserve, &user, tokens(701), RateMode::Variable, 0);
        assert_eq!(result, Err(ModelError::BadRequest));
    }

    #[test]
    fn test_execute_repay_variable() {
        let config = testutils::default_reserve_config();
        let (reserve, user) = with_debt(RateMode::Variable);

        let (reserve, user) =
            execute_repay(&config, &reserve, &user, tokens(50), RateMode::Variable, TWO_YEARS)
                .unwrap();
        assert_eq!(
            reserve.variable_borrow_index,
            U256::from(1_116_506_559_746_474_096_155_895_327u128)
        );
        assert_eq!(
            reserve.scaled_variable_debt,
            U256::from(350_658_140_323_590_868_898u128)
        );
        assert_eq!(reserve.available_liquidity, tokens(650));
        assert_eq!(
            user.scaled_variable_debt,
            U256::from(50_658_140_323_590_868_898u128)
        );
        assert_eq!(
            user.current_variable_debt,
            U256::from(56_560_145_975_846_577_068u128)
        );
        assert_eq!(user.wallet_balance, tokens(950));
    }

    #[test]
    fn test_execute_repay_variable_max() {
        let config = testutils::default_reserve_config();
        let (debt_reserve, debt_user) = with_debt(RateMode::Variable);

        let (reserve, user) = execute_repay(
            &config,
            &debt_reserve,
            &debt_user,
            MAX_UINT_AMOUNT,
            RateMode::Variable,
            TWO_YEARS,
        )
        .unwrap();
        assert_eq!(reserve.scaled_variable_debt, tokens(300));
        assert_eq!(
            reserve.available_liquidity,
            U256::from(706_560_145_975_846_577_068u128)
        );
        assert_eq!(user.scaled_variable_debt, U256::ZERO);
        assert_eq!(user.current_variable_debt, U256::ZERO);
        assert_eq!(
            user.wallet_balance,
            U256::from(893_439_854_024_153_422_932u128)
        );

        // an oversized amount is capped at the debt
        let (capped_reserve, capped_user) = execute_repay(
            &config,
            &debt_reserve,
            &debt_user,
            tokens(500),
            RateMode::Variable,
            TWO_YEARS,
        )
        .unwrap();
        assert_eq!(capped_reserve, reserve);
        assert_eq!(capped_user, user);
    }

    #[test]
    fn test_execute_repay_stable() {
        let config = testutils::default_reserve_config();
        let (reserve, user) = with_debt(RateMode::Stable);
        let rate = user.stable_borrow_rate;

        let (reserve, user) =
            execute_repay(&config, &reserve, &user, tokens(40), RateMode::Stable, TWO_YEARS)
                .unwrap();
        assert_eq!(
            reserve.total_stable_debt,
            U256::from(74_642_895_788_600_295_934u128)
        );
        assert_eq!(reserve.principal_stable_debt, reserve.total_stable_debt);
        assert_eq!(reserve.average_stable_borrow_rate, rate);
        assert_eq!(reserve.total_stable_debt_last_updated, TWO_YEARS);
        assert_eq!(reserve.available_liquidity, tokens(640));
        assert_eq!(
            reserve.accrued_to_treasury_scaled,
            U256::from(4_796_842_750_853_138_163u128)
        );

        assert_eq!(
            user.principal_stable_debt,
            U256::from(74_642_895_788_600_295_934u128)
        );
        assert_eq!(user.stable_borrow_rate, rate);
        assert_eq!(user.stable_rate_last_updated, TWO_YEARS);
        assert_eq!(user.wallet_balance, tokens(960));
    }

    #[test]
    fn test_execute_repay_stable_max() {
        let config = testutils::default_reserve_config();
        let (reserve, user) = with_debt(RateMode::Stable);

        let (reserve, user) = execute_repay(
            &config,
            &reserve,
            &user,
            MAX_UINT_AMOUNT,
            RateMode::Stable,
            TWO_YEARS,
        )
        .unwrap();
        assert_eq!(reserve.total_stable_debt, U256::ZERO);
        assert_eq!(reserve.average_stable_borrow_rate, U256::ZERO);
        assert_eq!(
            reserve.available_liquidity,
            U256::from(714_642_895_788_600_295_934u128)
        );
        assert_eq!(user.principal_stable_debt, U256::ZERO);
        assert_eq!(user.stable_borrow_rate, U256::ZERO);
        assert_eq!(user.stable_rate_last_updated, 0);
        assert_eq!(
            user.wallet_balance,
            U256::from(885_357_104_211_399_704_066u128)
        );
    }

    #[test]
    fn test_execute_repay_no_debt() {
        let config = testutils::default_reserve_config();
        let (reserve, user) = with_debt(RateMode::Variable);
        let result = execute_repay(&config, &reserve, &user, tokens(1), RateMode::Stable, TWO_YEARS);
        assert_eq!(result, Err(ModelError::BadRequest));
    }

    #[test]
    fn test_execute_swap_rate_mode_to_variable() {
        let config = testutils::default_reserve_config();
        let (reserve, user) = with_debt(RateMode::Stable);

        let (reserve, user) =
            execute_swap_rate_mode(&config, &reserve, &user, RateMode::Stable, TWO_YEARS).unwrap();
        assert_eq!(reserve.total_stable_debt, U256::ZERO);
        assert_eq!(reserve.average_stable_borrow_rate, U256::ZERO);
        assert_eq!(
            reserve.scaled_variable_debt,
            U256::from(402_680_002_000_733_731_692u128)
        );
        assert_eq!(reserve.available_liquidity, tokens(600));
        assert_eq!(
            reserve.variable_borrow_rate,
            U256::from(66_632_356_176_318_719_164_773_231u128)
        );

        assert_eq!(user.principal_stable_debt, U256::ZERO);
        assert_eq!(user.stable_borrow_rate, U256::ZERO);
        assert_eq!(
            user.scaled_variable_debt,
            U256::from(102_680_002_000_733_731_692u128)
        );
        assert_eq!(
            user.current_variable_debt,
            U256::from(114_642_895_788_600_295_933u128)
        );
    }

    #[test]
    fn test_execute_swap_rate_mode_to_stable() {
        let config = testutils::default_reserve_config();
        let (reserve, user) = with_debt(RateMode::Variable);
        let stable_rate = reserve.stable_borrow_rate;

        let (reserve, user) =
            execute_swap_rate_mode(&config, &reserve, &user, RateMode::Variable, TWO_YEARS)
                .unwrap();
        assert_eq!(reserve.scaled_variable_debt, tokens(300));
        assert_eq!(
            reserve.total_stable_debt,
            U256::from(106_560_145_975_846_577_068u128)
        );
        assert_eq!(reserve.average_stable_borrow_rate, stable_rate);

        assert_eq!(user.scaled_variable_debt, U256::ZERO);
        assert_eq!(
            user.principal_stable_debt,
            U256::from(106_560_145_975_846_577_068u128)
        );
        assert_eq!(user.stable_borrow_rate, stable_rate);
        assert_eq!(user.stable_rate_last_updated, TWO_YEARS);

        let result =
            execute_swap_rate_mode(&config, &reserve, &user, RateMode::Variable, TWO_YEARS);
        assert_eq!(result, Err(ModelError::BadRequest));
    }

    #[test]
    fn test_execute_rebalance_stable_rate() {
        let config = testutils::default_reserve_config();
        let (reserve, user) = with_debt(RateMode::Stable);
        let new_rate = reserve.stable_borrow_rate;

        let (reserve, user) =
            execute_rebalance_stable_rate(&config, &reserve, &user, TWO_YEARS).unwrap();
        assert_eq!(
            reserve.total_stable_debt,
            U256::from(114_642_895_788_600_295_934u128)
        );
        assert_eq!(reserve.average_stable_borrow_rate, new_rate);
        assert_eq!(
            reserve.stable_borrow_rate,
            U256::from(160_069_328_693_355_124_585_754_566u128)
        );
        assert_eq!(
            user.principal_stable_debt,
            U256::from(114_642_895_788_600_295_934u128)
        );
        assert_eq!(user.stable_borrow_rate, new_rate);
        assert_eq!(user.stable_rate_last_updated, TWO_YEARS);
    }

    #[test]
    fn test_execute_rebalance_no_stable_debt() {
        let config = testutils::default_reserve_config();
        let (reserve, user) = with_debt(RateMode::Variable);
        let result = execute_rebalance_stable_rate(&config, &reserve, &user, TWO_YEARS);
        assert_eq!(result, Err(ModelError::BadRequest));
    }
}

use alloy_primitives::{Address, U256};

use crate::{
    constants::{PERCENTAGE_FACTOR, RAY},
    errors::ModelError,
};

/// The configuration information about a reserve asset. Rates and ratios are expressed in rays,
/// percentages in basis points.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ReserveConfig {
    pub optimal_usage_ratio: U256, // the borrow usage ratio at which the rate curve kinks
    pub base_variable_borrow_rate: U256, // the variable rate at zero usage
    pub variable_rate_slope1: U256, // the variable rate increase from zero to optimal usage
    pub variable_rate_slope2: U256, // the variable rate increase from optimal to full usage
    pub stable_rate_slope1: U256, // the stable rate increase from zero to optimal usage
    pub stable_rate_slope2: U256, // the stable rate increase from optimal to full usage
    pub base_stable_rate_offset: U256, // the premium of the base stable rate over variable slope 1
    pub stable_rate_excess_offset: U256, // the stable rate premium at a fully stable debt book
    pub optimal_stable_to_total_debt_ratio: U256, // the stable debt share above which the excess offset applies
    pub liquidation_bonus: u32,        // the collateral multiplier paid to liquidators (10500 = 105%)
    pub liquidation_protocol_fee: u32, // the share of the liquidation bonus taken by the treasury
    pub unbacked_mint_cap: u64,        // the maximum unbacked supply in whole tokens
}

impl ReserveConfig {
    /// The stable borrow rate at zero usage
    pub fn base_stable_borrow_rate(&self) -> Result<U256, ModelError> {
        self.variable_rate_slope1
            .checked_add(self.base_stable_rate_offset)
            .ok_or(ModelError::Overflow)
    }

    /// The span of borrow usage above the optimal ratio
    pub fn max_excess_usage_ratio(&self) -> U256 {
        RAY - self.optimal_usage_ratio
    }

    /// The span of stable debt share above the optimal ratio
    pub fn max_excess_stable_to_total_debt_ratio(&self) -> U256 {
        RAY - self.optimal_stable_to_total_debt_ratio
    }

    /// Validate the configuration
    ///
    /// ### Errors
    /// `InvalidReserveConfig` if a ratio is out of range or a percentage is invalid
    pub fn validate(&self) -> Result<(), ModelError> {
        if self.optimal_usage_ratio.is_zero()
            || self.optimal_usage_ratio > RAY
            || self.optimal_stable_to_total_debt_ratio > RAY
            || self.liquidation_bonus < PERCENTAGE_FACTOR
            || self.liquidation_protocol_fee > PERCENTAGE_FACTOR
        {
            return Err(ModelError::InvalidReserveConfig);
        }
        Ok(())
    }
}

/// The pool wide configuration
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PoolConfig {
    pub treasury: Address,
    pub flash_loan_premium_total: u32, // the flash loan premium charged on the borrowed amount
    pub flash_loan_premium_to_protocol: u32, // the share of the flash loan premium sent to the treasury
    pub bridge_protocol_fee: u32, // the share of a backing fee sent to the treasury
}

impl PoolConfig {
    /// Validate the configuration
    ///
    /// ### Errors
    /// `InvalidReserveConfig` if a percentage is above 100%
    pub fn validate(&self) -> Result<(), ModelError> {
        if self.flash_loan_premium_total > PERCENTAGE_FACTOR
            || self.flash_loan_premium_to_protocol > PERCENTAGE_FACTOR
            || self.bridge_protocol_fee > PERCENTAGE_FACTOR
        {
            return Err(ModelError::InvalidReserveConfig);
        }
        Ok(())
    }
}

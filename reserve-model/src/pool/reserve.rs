use alloy_primitives::{Address, U256};

use crate::{
    config::ReserveConfig,
    constants::RAY,
    errors::ModelError,
    math::WadRayMath,
    validator::{add, require_not_stale, sub},
};

use super::{
    interest::{calc_normalized_debt, calc_normalized_income, calc_stable_debt},
    rates::{calc_interest_rates, RateInputs},
    stable_debt::{calc_average_after_burn, calc_rate_after_mint},
};

/// The state of a single lending market
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ReserveSnapshot {
    pub asset: Address,  // the underlying asset address
    pub symbol: String,  // the underlying asset symbol
    pub decimals: u32,   // the decimals of the underlying asset
    pub liquidity_index: U256, // the cumulative supply growth factor (27 decimals)
    pub variable_borrow_index: U256, // the cumulative variable debt growth factor (27 decimals)
    pub liquidity_rate: U256, // the current supply rate (27 decimals)
    pub variable_borrow_rate: U256, // the current variable borrow rate (27 decimals)
    pub stable_borrow_rate: U256, // the rate new stable borrows lock in (27 decimals)
    pub average_stable_borrow_rate: U256, // the debt weighted rate of all stable debt (27 decimals)
    pub total_stable_debt: U256, // the stable debt including interest as of `last_update_timestamp`
    pub principal_stable_debt: U256, // the stable debt as of `total_stable_debt_last_updated`
    pub scaled_variable_debt: U256, // the variable debt divided by the borrow index
    pub total_variable_debt: U256, // the scaled variable debt times the borrow index
    pub available_liquidity: U256, // the underlying held by the reserve
    pub total_liquidity: U256, // the available liquidity plus unbacked
    pub unbacked: U256, // the supply minted without underlying
    pub accrued_to_treasury_scaled: U256, // the treasury share of interest, not yet minted
    pub scaled_a_token_supply: U256, // the total scaled supply balance held by users
    pub reserve_factor: u32, // the share of borrow interest sent to the treasury
    pub last_update_timestamp: u64, // the last time the indices were updated
    pub total_stable_debt_last_updated: u64, // the last time stable debt was minted or burned
    pub borrow_usage_ratio: U256, // total debt over available liquidity plus total debt
    pub supply_usage_ratio: U256, // total debt over total liquidity plus total debt
}

impl ReserveSnapshot {
    /// Create the snapshot of a freshly listed reserve
    ///
    /// ### Arguments
    /// * `asset` - The underlying asset address
    /// * `symbol` - The underlying asset symbol
    /// * `decimals` - The decimals of the underlying asset
    /// * `reserve_factor` - The share of borrow interest sent to the treasury
    /// * `timestamp` - The listing timestamp
    pub fn new_listing(
        asset: Address,
        symbol: &str,
        decimals: u32,
        reserve_factor: u32,
        timestamp: u64,
    ) -> ReserveSnapshot {
        ReserveSnapshot {
            asset,
            symbol: symbol.to_string(),
            decimals,
            liquidity_index: RAY,
            variable_borrow_index: RAY,
            liquidity_rate: U256::ZERO,
            variable_borrow_rate: U256::ZERO,
            stable_borrow_rate: U256::ZERO,
            average_stable_borrow_rate: U256::ZERO,
            total_stable_debt: U256::ZERO,
            principal_stable_debt: U256::ZERO,
            scaled_variable_debt: U256::ZERO,
            total_variable_debt: U256::ZERO,
            available_liquidity: U256::ZERO,
            total_liquidity: U256::ZERO,
            unbacked: U256::ZERO,
            accrued_to_treasury_scaled: U256::ZERO,
            scaled_a_token_supply: U256::ZERO,
            reserve_factor,
            last_update_timestamp: timestamp,
            total_stable_debt_last_updated: timestamp,
            borrow_usage_ratio: U256::ZERO,
            supply_usage_ratio: U256::ZERO,
        }
    }

    /// One whole unit of the underlying asset
    pub fn scalar(&self) -> Result<U256, ModelError> {
        U256::from(10u8)
            .checked_pow(U256::from(self.decimals))
            .ok_or(ModelError::Overflow)
    }

    /// Fetch the total debt of the reserve
    pub fn total_debt(&self) -> Result<U256, ModelError> {
        add(self.total_stable_debt, self.total_variable_debt)
    }

    /// Fetch the total supply balance, including treasury accrual that has not been minted
    pub fn total_a_token_supply(&self) -> Result<U256, ModelError> {
        add(
            self.scaled_a_token_supply.ray_mul(self.liquidity_index)?,
            self.accrued_to_treasury_scaled.ray_mul(self.liquidity_index)?,
        )
    }

    /// Bring the reserve up to `timestamp` by accruing interest into the indices and the stable
    /// debt, and minting the treasury share of the new debt interest into
    /// `accrued_to_treasury_scaled`.
    ///
    /// Accruing twice to the same timestamp is a no-op.
    ///
    /// ### Arguments
    /// * `timestamp` - The current timestamp
    ///
    /// ### Errors
    /// If `timestamp` precedes the last update, or if the accrual overflows
    pub fn accrue(&self, timestamp: u64) -> Result<ReserveSnapshot, ModelError> {
        require_not_stale(self.last_update_timestamp, timestamp)?;
        if timestamp == self.last_update_timestamp {
            return Ok(self.clone());
        }
        let mut reserve = self.clone();

        reserve.liquidity_index = calc_normalized_income(
            self.liquidity_rate,
            self.liquidity_index,
            self.last_update_timestamp,
            timestamp,
        )?;
        // the variable index only compounds while there is variable debt
        if !self.scaled_variable_debt.is_zero() {
            reserve.variable_borrow_index = calc_normalized_debt(
                self.variable_borrow_rate,
                self.variable_borrow_index,
                self.last_update_timestamp,
                timestamp,
            )?;
        }

        let prev_variable_debt = self.scaled_variable_debt.ray_mul(self.variable_borrow_index)?;
        let curr_variable_debt = self
            .scaled_variable_debt
            .ray_mul(reserve.variable_borrow_index)?;
        let prev_stable_debt = calc_stable_debt(
            self.principal_stable_debt,
            self.average_stable_borrow_rate,
            self.total_stable_debt_last_updated,
            self.last_update_timestamp,
        )?;
        let curr_stable_debt = calc_stable_debt(
            self.principal_stable_debt,
            self.average_stable_borrow_rate,
            self.total_stable_debt_last_updated,
            timestamp,
        )?;

        let debt_accrued = sub(
            add(curr_variable_debt, curr_stable_debt)?,
            add(prev_variable_debt, prev_stable_debt)?,
        )?;
        let to_treasury = debt_accrued.percent_mul(self.reserve_factor)?;
        if !to_treasury.is_zero() {
            reserve.accrued_to_treasury_scaled = add(
                reserve.accrued_to_treasury_scaled,
                to_treasury.ray_div(reserve.liquidity_index)?,
            )?;
        }

        reserve.total_variable_debt = curr_variable_debt;
        reserve.total_stable_debt = curr_stable_debt;
        reserve.last_update_timestamp = timestamp;

        tracing::trace!(
            asset = %reserve.asset,
            timestamp,
            liquidity_index = %reserve.liquidity_index,
            variable_borrow_index = %reserve.variable_borrow_index,
            to_treasury = %to_treasury,
            "reserve accrued"
        );
        Ok(reserve)
    }

    /// Apply a liquidity delta and re-derive the interest rates and usage ratios from the
    /// reserve's balances
    ///
    /// ### Arguments
    /// * `config` - The reserve's rate curve configuration
    /// * `liquidity_added` - The underlying added to the reserve by the action
    /// * `liquidity_taken` - The underlying removed from the reserve by the action
    ///
    /// ### Errors
    /// If more liquidity is taken than the reserve holds, or the rates cannot be computed
    pub fn update_interest_rates(
        &mut self,
        config: &ReserveConfig,
        liquidity_added: U256,
        liquidity_taken: U256,
    ) -> Result<(), ModelError> {
        self.available_liquidity = sub(
            add(self.available_liquidity, liquidity_added)?,
            liquidity_taken,
        )?;
        self.total_liquidity = add(self.available_liquidity, self.unbacked)?;
        self.total_variable_debt = self
            .scaled_variable_debt
            .ray_mul(self.variable_borrow_index)?;

        let rates = calc_interest_rates(
            config,
            &RateInputs {
                total_stable_debt: self.total_stable_debt,
                total_variable_debt: self.total_variable_debt,
                average_stable_borrow_rate: self.average_stable_borrow_rate,
                available_liquidity: self.available_liquidity,
                unbacked: self.unbacked,
                reserve_factor: self.reserve_factor,
            },
        )?;
        self.liquidity_rate = rates.liquidity_rate;
        self.stable_borrow_rate = rates.stable_borrow_rate;
        self.variable_borrow_rate = rates.variable_borrow_rate;
        self.borrow_usage_ratio = rates.borrow_usage_ratio;
        self.supply_usage_ratio = rates.supply_usage_ratio;

        tracing::trace!(
            asset = %self.asset,
            liquidity_rate = %self.liquidity_rate,
            variable_borrow_rate = %self.variable_borrow_rate,
            stable_borrow_rate = %self.stable_borrow_rate,
            "reserve rates updated"
        );
        Ok(())
    }

    /// Distribute a lump sum to suppliers by growing the liquidity index directly
    ///
    /// ### Arguments
    /// * `amount` - The amount of underlying distributed
    ///
    /// ### Errors
    /// If the reserve has no supply to distribute to
    pub fn cumulate_to_liquidity_index(&mut self, amount: U256) -> Result<(), ModelError> {
        if amount.is_zero() {
            return Ok(());
        }
        let total_supply = self.total_a_token_supply()?;
        let amount_to_liquidity_ratio = amount.wad_to_ray()?.ray_div(total_supply.wad_to_ray()?)?;
        self.liquidity_index = add(amount_to_liquidity_ratio, RAY)?.ray_mul(self.liquidity_index)?;
        Ok(())
    }

    /// Credit the treasury with `amount` of underlying as scaled supply
    pub fn accrue_to_treasury(&mut self, amount: U256) -> Result<(), ModelError> {
        self.accrued_to_treasury_scaled = add(
            self.accrued_to_treasury_scaled,
            amount.ray_div(self.liquidity_index)?,
        )?;
        Ok(())
    }

    /// Mint stable debt at `rate`, blending it into the average stable rate. The reserve must
    /// already be accrued to `timestamp`.
    pub fn mint_stable_debt(
        &mut self,
        amount: U256,
        rate: U256,
        timestamp: u64,
    ) -> Result<(), ModelError> {
        self.average_stable_borrow_rate = calc_rate_after_mint(
            self.total_stable_debt,
            self.average_stable_borrow_rate,
            amount,
            rate,
        )?;
        self.total_stable_debt = add(self.total_stable_debt, amount)?;
        self.principal_stable_debt = self.total_stable_debt;
        self.total_stable_debt_last_updated = timestamp;
        Ok(())
    }

    /// Burn stable debt carried at `user_rate`, removing it from the average stable rate. The
    /// reserve must already be accrued to `timestamp`.
    pub fn burn_stable_debt(
        &mut self,
        amount: U256,
        user_rate: U256,
        timestamp: u64,
    ) -> Result<(), ModelError> {
        let (total, average) = calc_average_after_burn(
            self.total_stable_debt,
            self.average_stable_borrow_rate,
            amount,
            user_rate,
        )?;
        self.total_stable_debt = total;
        self.principal_stable_debt = total;
        self.average_stable_borrow_rate = average;
        self.total_stable_debt_last_updated = timestamp;
        Ok(())
    }

    /// Mint variable debt worth `amount` of underlying, returning the scaled amount minted
    pub fn mint_variable_debt(&mut self, amount: U256) -> Result<U256, ModelError> {
        let scaled = amount.ray_div(self.variable_borrow_index)?;
        self.scaled_variable_debt = add(self.scaled_variable_debt, scaled)?;
        self.total_variable_debt = self
            .scaled_variable_debt
            .ray_mul(self.variable_borrow_index)?;
        Ok(scaled)
    }

    /// Burn `scaled` variable debt. Rounding residue between the reserve total and the sum
    /// of user balances clamps at zero.
    pub fn burn_variable_debt(&mut self, scaled: U256) -> Result<(), ModelError> {
        self.scaled_variable_debt = self.scaled_variable_debt.saturating_sub(scaled);
        self.total_variable_debt = self
            .scaled_variable_debt
            .ray_mul(self.variable_borrow_index)?;
        Ok(())
    }
}

use alloy_primitives::{Address, U256};

use crate::{
    errors::ModelError,
    math::WadRayMath,
    validator::{add, require_same_asset, sub},
};

use super::{
    interest::calc_stable_debt, reserve::ReserveSnapshot, stable_debt::calc_rate_after_mint,
};

/// A user's position in a single reserve
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct UserSnapshot {
    pub user: Address,
    pub asset: Address,
    pub scaled_a_token_balance: U256, // supply balance divided by the liquidity index
    pub current_a_token_balance: U256, // supply balance including interest
    pub usage_as_collateral_enabled: bool,
    pub scaled_variable_debt: U256, // variable debt divided by the variable borrow index
    pub current_variable_debt: U256, // variable debt including interest
    pub principal_stable_debt: U256, // stable debt as of `stable_rate_last_updated`
    pub current_stable_debt: U256, // stable debt including interest
    pub stable_borrow_rate: U256, // the user's locked in stable rate (27 decimals)
    pub stable_rate_last_updated: u64,
    pub liquidity_rate: U256, // the reserve supply rate the balance earns
    pub wallet_balance: U256, // underlying held outside the reserve
}

impl UserSnapshot {
    /// Create an empty position
    ///
    /// ### Arguments
    /// * `user` - The address of the user
    /// * `asset` - The underlying asset of the reserve
    /// * `wallet_balance` - The underlying the user holds
    pub fn new(user: Address, asset: Address, wallet_balance: U256) -> UserSnapshot {
        UserSnapshot {
            user,
            asset,
            scaled_a_token_balance: U256::ZERO,
            current_a_token_balance: U256::ZERO,
            usage_as_collateral_enabled: false,
            scaled_variable_debt: U256::ZERO,
            current_variable_debt: U256::ZERO,
            principal_stable_debt: U256::ZERO,
            current_stable_debt: U256::ZERO,
            stable_borrow_rate: U256::ZERO,
            stable_rate_last_updated: 0,
            liquidity_rate: U256::ZERO,
            wallet_balance,
        }
    }

    /// Recompute the user's current balances from the indices of a reserve that has been
    /// accrued to `timestamp`
    ///
    /// ### Arguments
    /// * `reserve` - The reserve, accrued to `timestamp`
    /// * `timestamp` - The current timestamp
    ///
    /// ### Errors
    /// If the position does not belong to the reserve
    pub fn accrue(
        &self,
        reserve: &ReserveSnapshot,
        timestamp: u64,
    ) -> Result<UserSnapshot, ModelError> {
        require_same_asset(&reserve.asset, &self.asset)?;
        let mut user = self.clone();
        user.current_a_token_balance = self
            .scaled_a_token_balance
            .ray_mul(reserve.liquidity_index)?;
        user.current_variable_debt = self
            .scaled_variable_debt
            .ray_mul(reserve.variable_borrow_index)?;
        user.current_stable_debt = calc_stable_debt(
            self.principal_stable_debt,
            self.stable_borrow_rate,
            self.stable_rate_last_updated,
            timestamp,
        )?;
        user.liquidity_rate = reserve.liquidity_rate;
        Ok(user)
    }

    /// Fetch the user's total debt, as of the last accrual
    pub fn total_debt(&self) -> Result<U256, ModelError> {
        add(self.current_variable_debt, self.current_stable_debt)
    }

    /// Check if the position holds neither supply nor debt
    pub fn is_empty(&self) -> bool {
        self.scaled_a_token_balance.is_zero()
            && self.scaled_variable_debt.is_zero()
            && self.principal_stable_debt.is_zero()
    }

    /// Add scaled supply. The collateral flag turns on when the balance was empty.
    pub fn add_supply(&mut self, scaled: U256) -> Result<(), ModelError> {
        if self.scaled_a_token_balance.is_zero() && !scaled.is_zero() {
            self.usage_as_collateral_enabled = true;
        }
        self.scaled_a_token_balance = add(self.scaled_a_token_balance, scaled)?;
        Ok(())
    }

    /// Remove scaled supply. The collateral flag turns off when the balance is emptied.
    ///
    /// ### Errors
    /// If more supply is removed than the user holds
    pub fn remove_supply(&mut self, scaled: U256) -> Result<(), ModelError> {
        self.scaled_a_token_balance = sub(self.scaled_a_token_balance, scaled)?;
        if self.scaled_a_token_balance.is_zero() {
            self.usage_as_collateral_enabled = false;
        }
        Ok(())
    }

    /// Add stable debt at `rate`, blending it into the user's stable rate. The user must
    /// already be accrued to `timestamp`.
    pub fn mint_stable_debt(
        &mut self,
        amount: U256,
        rate: U256,
        timestamp: u64,
    ) -> Result<(), ModelError> {
        self.stable_borrow_rate = calc_rate_after_mint(
            self.current_stable_debt,
            self.stable_borrow_rate,
            amount,
            rate,
        )?;
        self.principal_stable_debt = add(self.current_stable_debt, amount)?;
        self.current_stable_debt = self.principal_stable_debt;
        self.stable_rate_last_updated = timestamp;
        Ok(())
    }

    /// Remove stable debt. Clearing the debt clears the rate and its timestamp. The user must
    /// already be accrued to `timestamp`.
    ///
    /// ### Errors
    /// If more debt is removed than the user owes
    pub fn burn_stable_debt(&mut self, amount: U256, timestamp: u64) -> Result<(), ModelError> {
        self.principal_stable_debt = sub(self.current_stable_debt, amount)?;
        self.current_stable_debt = self.principal_stable_debt;
        if self.principal_stable_debt.is_zero() {
            self.stable_borrow_rate = U256::ZERO;
            self.stable_rate_last_updated = 0;
        } else {
            self.stable_rate_last_updated = timestamp;
        }
        Ok(())
    }

    /// Move underlying out of the user's wallet
    ///
    /// ### Errors
    /// If the wallet does not hold `amount`
    pub fn spend(&mut self, amount: U256) -> Result<(), ModelError> {
        self.wallet_balance = self
            .wallet_balance
            .checked_sub(amount)
            .ok_or(ModelError::BadRequest)?;
        Ok(())
    }

    /// Move underlying into the user's wallet
    pub fn receive(&mut self, amount: U256) -> Result<(), ModelError> {
        self.wallet_balance = add(self.wallet_balance, amount)?;
        Ok(())
    }
}

/// Accrue a reserve to `timestamp` and bring one of its positions up to date against it
///
/// ### Errors
/// If the timestamp is stale or the position belongs to another reserve
pub fn accrue_position(
    reserve: &ReserveSnapshot,
    user: &UserSnapshot,
    timestamp: u64,
) -> Result<(ReserveSnapshot, UserSnapshot), ModelError> {
    let reserve = reserve.accrue(timestamp)?;
    let user = user.accrue(&reserve, timestamp)?;
    Ok((reserve, user))
}

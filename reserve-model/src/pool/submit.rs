use alloy_primitives::{Address, U256};

use crate::errors::ModelError;

use super::{
    borrow::{
        execute_borrow, execute_rebalance_stable_rate, execute_repay, execute_swap_rate_mode,
        RateMode,
    },
    bridge::{execute_back_unbacked, execute_mint_unbacked},
    flash_loan::execute_flash_loan,
    liquidation::{execute_liquidation, LiquidationParams, LiquidationPositions},
    pool::Pool,
    supply::{execute_set_collateral, execute_supply, execute_transfer, execute_withdraw},
};

/// An action a user takes against the pool
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Action {
    Supply {
        user: Address,
        asset: Address,
        amount: U256,
    },
    Withdraw {
        user: Address,
        asset: Address,
        amount: U256, // `MAX_UINT_AMOUNT` withdraws the whole balance
    },
    Borrow {
        user: Address,
        asset: Address,
        amount: U256,
        rate_mode: RateMode,
    },
    Repay {
        user: Address,
        asset: Address,
        amount: U256, // `MAX_UINT_AMOUNT` repays the whole debt
        rate_mode: RateMode,
    },
    SwapRateMode {
        user: Address,
        asset: Address,
        rate_mode: RateMode, // the mode the debt is moved out of
    },
    RebalanceStableRate {
        user: Address,
        asset: Address,
    },
    SetCollateral {
        user: Address,
        asset: Address,
        enabled: bool,
    },
    Transfer {
        from: Address,
        to: Address,
        asset: Address,
        amount: U256,
    },
    MintUnbacked {
        user: Address,
        asset: Address,
        amount: U256,
    },
    BackUnbacked {
        user: Address,
        asset: Address,
        amount: U256,
        fee: U256,
    },
    FlashLoan {
        receiver: Address,
        asset: Address,
        amount: U256,
    },
    Liquidation {
        liquidator: Address,
        borrower: Address,
        debt_asset: Address,
        collateral_asset: Address,
        params: LiquidationParams,
    },
}

/// An action and the timestamp of the transaction that carried it
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Request {
    pub timestamp: u64,
    pub action: Action,
}

/// Fold a sequence of requests through the pool, returning the expected pool after the last
/// request
///
/// ### Arguments
/// * `pool` - The pool before the first request
/// * `requests` - The requests, in the order they were executed
///
/// ### Errors
/// The error of the first request that cannot be executed
pub fn execute_submit(pool: Pool, requests: &[Request]) -> Result<Pool, ModelError> {
    requests
        .iter()
        .try_fold(pool, |pool, request| apply_request(pool, request))
}

/// Apply a single request to the pool
///
/// ### Errors
/// If the request references an unlisted reserve or the action fails
pub fn apply_request(mut pool: Pool, request: &Request) -> Result<Pool, ModelError> {
    let timestamp = request.timestamp;
    tracing::debug!(timestamp, action = ?request.action, "apply request");
    match &request.action {
        Action::Supply {
            user,
            asset,
            amount,
        } => {
            let (reserve, position) = execute_supply(
                pool.load_config(asset)?,
                &pool.load_reserve(asset)?,
                &pool.load_user(user, asset)?,
                *amount,
                timestamp,
            )?;
            pool.cache_reserve(reserve);
            pool.cache_user(position);
        }
        Action::Withdraw {
            user,
            asset,
            amount,
        } => {
            let (reserve, position) = execute_withdraw(
                pool.load_config(asset)?,
                &pool.load_reserve(asset)?,
                &pool.load_user(user, asset)?,
                *amount,
                timestamp,
            )?;
            pool.cache_reserve(reserve);
            pool.cache_user(position);
        }
        Action::Borrow {
            user,
            asset,
            amount,
            rate_mode,
        } => {
            let (reserve, position) = execute_borrow(
                pool.load_config(asset)?,
                &pool.load_reserve(asset)?,
                &pool.load_user(user, asset)?,
                *amount,
                *rate_mode,
                timestamp,
            )?;
            pool.cache_reserve(reserve);
            pool.cache_user(position);
        }
        Action::Repay {
            user,
            asset,
            amount,
            rate_mode,
        } => {
            let (reserve, position) = execute_repay(
                pool.load_config(asset)?,
                &pool.load_reserve(asset)?,
                &pool.load_user(user, asset)?,
                *amount,
                *rate_mode,
                timestamp,
            )?;
            pool.cache_reserve(reserve);
            pool.cache_user(position);
        }
        Action::SwapRateMode {
            user,
            asset,
            rate_mode,
        } => {
            let (reserve, position) = execute_swap_rate_mode(
                pool.load_config(asset)?,
                &pool.load_reserve(asset)?,
                &pool.load_user(user, asset)?,
                *rate_mode,
                timestamp,
            )?;
            pool.cache_reserve(reserve);
            pool.cache_user(position);
        }
        Action::RebalanceStableRate { user, asset } => {
            let (reserve, position) = execute_rebalance_stable_rate(
                pool.load_config(asset)?,
                &pool.load_reserve(asset)?,
                &pool.load_user(user, asset)?,
                timestamp,
            )?;
            pool.cache_reserve(reserve);
            pool.cache_user(position);
        }
        Action::SetCollateral {
            user,
            asset,
            enabled,
        } => {
            let position = execute_set_collateral(
                &pool.load_reserve(asset)?,
                &pool.load_user(user, asset)?,
                *enabled,
                timestamp,
            )?;
            pool.cache_user(position);
        }
        Action::Transfer {
            from,
            to,
            asset,
            amount,
        } => {
            let (from, to) = execute_transfer(
                &pool.load_reserve(asset)?,
                &pool.load_user(from, asset)?,
                &pool.load_user(to, asset)?,
                *amount,
                timestamp,
            )?;
            pool.cache_user(from);
            pool.cache_user(to);
        }
        Action::MintUnbacked {
            user,
            asset,
            amount,
        } => {
            let (reserve, position) = execute_mint_unbacked(
                pool.load_config(asset)?,
                &pool.load_reserve(asset)?,
                &pool.load_user(user, asset)?,
                *amount,
                timestamp,
            )?;
            pool.cache_reserve(reserve);
            pool.cache_user(position);
        }
        Action::BackUnbacked {
            user,
            asset,
            amount,
            fee,
        } => {
            let (reserve, position) = execute_back_unbacked(
                &pool.config,
                pool.load_config(asset)?,
                &pool.load_reserve(asset)?,
                &pool.load_user(user, asset)?,
                *amount,
                *fee,
                timestamp,
            )?;
            pool.cache_reserve(reserve);
            pool.cache_user(position);
        }
        Action::FlashLoan {
            receiver,
            asset,
            amount,
        } => {
            let (reserve, position) = execute_flash_loan(
                &pool.config,
                pool.load_config(asset)?,
                &pool.load_reserve(asset)?,
                &pool.load_user(receiver, asset)?,
                *amount,
                timestamp,
            )?;
            pool.cache_reserve(reserve);
            pool.cache_user(position);
        }
        Action::Liquidation {
            liquidator,
            borrower,
            debt_asset,
            collateral_asset,
            params,
        } => {
            let treasury = pool.config.treasury;
            let positions = LiquidationPositions {
                borrower_debt: pool.load_user(borrower, debt_asset)?,
                borrower_collateral: pool.load_user(borrower, collateral_asset)?,
                liquidator_debt: pool.load_user(liquidator, debt_asset)?,
                liquidator_collateral: pool.load_user(liquidator, collateral_asset)?,
                treasury_collateral: pool.load_user(&treasury, collateral_asset)?,
            };
            let outcome = execute_liquidation(
                pool.load_config(debt_asset)?,
                pool.load_config(collateral_asset)?,
                &pool.load_reserve(debt_asset)?,
                &pool.load_reserve(collateral_asset)?,
                &positions,
                params,
                timestamp,
            )?;
            pool.cache_reserve(outcome.debt_reserve);
            pool.cache_reserve(outcome.collateral_reserve);
            let positions = outcome.positions;
            pool.cache_user(positions.borrower_debt);
            pool.cache_user(positions.borrower_collateral);
            pool.cache_user(positions.liquidator_debt);
            pool.cache_user(positions.liquidator_collateral);
            pool.cache_user(positions.treasury_collateral);
        }
    }
    Ok(pool)
}

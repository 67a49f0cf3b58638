mod borrow;
pub use borrow::{
    execute_borrow, execute_rebalance_stable_rate, execute_repay, execute_swap_rate_mode,
    RateMode,
};

mod bridge;
pub use bridge::{execute_back_unbacked, execute_mint_unbacked};

mod fees;
pub use fees::{
    calc_backing_fee_split, calc_flash_loan_premium, calc_liquidation_amounts, FlashLoanPremium,
    LiquidationAmounts,
};

mod flash_loan;
pub use flash_loan::execute_flash_loan;

pub mod interest;

mod liquidation;
pub use liquidation::{
    execute_liquidation, LiquidationOutcome, LiquidationParams, LiquidationPositions,
};

#[allow(clippy::module_inception)]
mod pool;
pub use pool::Pool;

pub mod rates;

mod reserve;
pub use reserve::ReserveSnapshot;

pub mod stable_debt;

mod submit;
pub use submit::{apply_request, execute_submit, Action, Request};

mod supply;
pub use supply::{execute_set_collateral, execute_supply, execute_transfer, execute_withdraw};

mod user;
pub use user::{accrue_position, UserSnapshot};

#![cfg(any(test, feature = "testutils"))]

use alloy_primitives::{Address, U256};

use crate::{
    config::{PoolConfig, ReserveConfig},
    constants::{RAY, WAD},
    pool::{ReserveSnapshot, UserSnapshot},
};

/// `percent`% expressed in rays
pub fn ray_percent(percent: u64) -> U256 {
    RAY * U256::from(percent) / U256::from(100u8)
}

/// `amount` whole tokens of an 18 decimal asset
pub fn tokens(amount: u64) -> U256 {
    U256::from(amount) * WAD
}

//************************************************
//                 Configuration
//************************************************

pub fn default_reserve_config() -> ReserveConfig {
    ReserveConfig {
        optimal_usage_ratio: ray_percent(45),
        base_variable_borrow_rate: U256::ZERO,
        variable_rate_slope1: ray_percent(7),
        variable_rate_slope2: ray_percent(300),
        stable_rate_slope1: ray_percent(7),
        stable_rate_slope2: ray_percent(300),
        base_stable_rate_offset: ray_percent(2),
        stable_rate_excess_offset: ray_percent(5),
        optimal_stable_to_total_debt_ratio: ray_percent(20),
        liquidation_bonus: 1_0500,
        liquidation_protocol_fee: 1000,
        unbacked_mint_cap: 1_000_000,
    }
}

pub fn default_pool_config() -> PoolConfig {
    PoolConfig {
        treasury: Address::repeat_byte(0xFE),
        flash_loan_premium_total: 9,
        flash_loan_premium_to_protocol: 3000,
        bridge_protocol_fee: 1000,
    }
}

//************************************************
//                   Snapshots
//************************************************

/// A freshly listed 18 decimal reserve with a 10% reserve factor
pub fn default_reserve() -> ReserveSnapshot {
    ReserveSnapshot::new_listing(Address::repeat_byte(1), "TST", 18, 1000, 0)
}

/// The default reserve holding 1000 supplied tokens and no debt
pub fn supplied_reserve() -> ReserveSnapshot {
    let mut reserve = default_reserve();
    reserve.available_liquidity = tokens(1000);
    reserve.total_liquidity = tokens(1000);
    reserve.scaled_a_token_supply = tokens(1000);
    reserve.stable_borrow_rate = ray_percent(9);
    reserve
}

/// The supplied reserve with 300 tokens of variable debt outstanding
pub fn borrowed_reserve() -> ReserveSnapshot {
    let config = default_reserve_config();
    let mut reserve = supplied_reserve();
    let amount = tokens(300);
    reserve
        .mint_variable_debt(amount)
        .expect("mint variable debt");
    reserve
        .update_interest_rates(&config, U256::ZERO, amount)
        .expect("update rates");
    reserve
}

/// An empty position with a well funded wallet
pub fn default_user(asset: Address) -> UserSnapshot {
    UserSnapshot::new(Address::repeat_byte(0xA), asset, tokens(1_000_000))
}

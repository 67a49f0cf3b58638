use alloy_primitives::U256;

/********** Numbers **********/

/// Fixed-point scalar for 18 decimal numbers
pub const WAD: U256 = U256::from_limbs([1_000_000_000_000_000_000, 0, 0, 0]);
pub const HALF_WAD: U256 = U256::from_limbs([500_000_000_000_000_000, 0, 0, 0]);

/// Fixed-point scalar for 27 decimal numbers (1e27)
pub const RAY: U256 = U256::from_limbs([11_515_845_246_265_065_472, 54_210_108, 0, 0]);
pub const HALF_RAY: U256 = U256::from_limbs([5_757_922_623_132_532_736, 27_105_054, 0, 0]);

/// Ratio between a ray and a wad (1e9)
pub const WAD_RAY_RATIO: U256 = U256::from_limbs([1_000_000_000, 0, 0, 0]);
pub const HALF_WAD_RAY_RATIO: U256 = U256::from_limbs([500_000_000, 0, 0, 0]);

/// Basis point scalar, 100.00%
pub const PERCENTAGE_FACTOR: u32 = 1_0000;
pub const HALF_PERCENTAGE_FACTOR: u32 = 5000;

// seconds per year
pub const SECONDS_PER_YEAR: u64 = 31536000;

/// Sentinel amount used to withdraw or repay an entire position
pub const MAX_UINT_AMOUNT: U256 = U256::MAX;

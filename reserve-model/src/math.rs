use alloy_primitives::U256;

use crate::{
    constants::{
        HALF_PERCENTAGE_FACTOR, HALF_RAY, HALF_WAD, HALF_WAD_RAY_RATIO, PERCENTAGE_FACTOR, RAY,
        WAD, WAD_RAY_RATIO,
    },
    errors::ModelError,
};

/// Fixed-point arithmetic over wads (18 decimals), rays (27 decimals) and basis points.
///
/// Every operation rounds half up and is checked. An intermediate that does not fit in
/// 256 bits is an `Overflow`, never a wraparound.
pub trait WadRayMath: Sized {
    /// Multiply two wads, rounding half up
    fn wad_mul(self, b: U256) -> Result<U256, ModelError>;

    /// Divide two wads, rounding half up
    fn wad_div(self, b: U256) -> Result<U256, ModelError>;

    /// Multiply two rays, rounding half up
    fn ray_mul(self, b: U256) -> Result<U256, ModelError>;

    /// Divide two rays, rounding half up
    fn ray_div(self, b: U256) -> Result<U256, ModelError>;

    /// Scale a wad up to a ray
    fn wad_to_ray(self) -> Result<U256, ModelError>;

    /// Scale a ray down to a wad, rounding half up
    fn ray_to_wad(self) -> Result<U256, ModelError>;

    /// Take a percentage (in basis points) of a value, rounding half up
    fn percent_mul(self, percentage: u32) -> Result<U256, ModelError>;

    /// Divide a value by a percentage (in basis points), rounding half up
    fn percent_div(self, percentage: u32) -> Result<U256, ModelError>;
}

impl WadRayMath for U256 {
    fn wad_mul(self, b: U256) -> Result<U256, ModelError> {
        mul_div_half_up(self, b, WAD, HALF_WAD)
    }

    fn wad_div(self, b: U256) -> Result<U256, ModelError> {
        div_half_up(self, b, WAD)
    }

    fn ray_mul(self, b: U256) -> Result<U256, ModelError> {
        mul_div_half_up(self, b, RAY, HALF_RAY)
    }

    fn ray_div(self, b: U256) -> Result<U256, ModelError> {
        div_half_up(self, b, RAY)
    }

    fn wad_to_ray(self) -> Result<U256, ModelError> {
        self.checked_mul(WAD_RAY_RATIO).ok_or(ModelError::Overflow)
    }

    fn ray_to_wad(self) -> Result<U256, ModelError> {
        let quotient = self / WAD_RAY_RATIO;
        if self % WAD_RAY_RATIO >= HALF_WAD_RAY_RATIO {
            return quotient
                .checked_add(U256::from(1u8))
                .ok_or(ModelError::Overflow);
        }
        Ok(quotient)
    }

    fn percent_mul(self, percentage: u32) -> Result<U256, ModelError> {
        if percentage == 0 {
            return Ok(U256::ZERO);
        }
        mul_div_half_up(
            self,
            U256::from(percentage),
            U256::from(PERCENTAGE_FACTOR),
            U256::from(HALF_PERCENTAGE_FACTOR),
        )
    }

    fn percent_div(self, percentage: u32) -> Result<U256, ModelError> {
        div_half_up(self, U256::from(percentage), U256::from(PERCENTAGE_FACTOR))
    }
}

/// Compute (a * b + half) / scalar, failing if a * b + half does not fit
fn mul_div_half_up(a: U256, b: U256, scalar: U256, half: U256) -> Result<U256, ModelError> {
    let product = a
        .checked_mul(b)
        .and_then(|product| product.checked_add(half))
        .ok_or(ModelError::Overflow)?;
    Ok(product / scalar)
}

/// Compute (a * scalar + b / 2) / b, failing if b is zero or the numerator does not fit
fn div_half_up(a: U256, b: U256, scalar: U256) -> Result<U256, ModelError> {
    if b.is_zero() {
        return Err(ModelError::DivisionByZero);
    }
    let numerator = a
        .checked_mul(scalar)
        .and_then(|scaled| scaled.checked_add(b / U256::from(2u8)))
        .ok_or(ModelError::Overflow)?;
    Ok(numerator / b)
}

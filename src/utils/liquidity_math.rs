//! Fixed-point liquidity math.
//!
//! Token amounts for a liquidity delta between two sqrt prices, and the
//! inverse (largest liquidity a pair of amounts can fund). All arithmetic is
//! integer; rounding direction is always explicit.

use alloy::primitives::{ruint::UintTryFrom, U256, U512};

use super::conversion::{biguint_to_u256, u256_to_biguint};
use crate::error::{Error, Result};

/// Constant: 2^96 (Q64.96 fixed point scaling factor)
pub const Q96: U256 = U256::from_limbs([0, 1 << 32, 0, 0]);

/// Q64.96 resolution in bits
pub const RESOLUTION: usize = 96;

// ============================================
// Full-precision mul/div
// ============================================

/// Compute `a * b / denominator` rounded down, with a 512-bit intermediate.
pub fn mul_div(a: U256, b: U256, denominator: U256) -> Result<U256> {
    if denominator.is_zero() {
        return Err(Error::Overflow);
    }

    let product = U512::from(a) * U512::from(b);
    let quotient = product / U512::from(denominator);

    U256::uint_try_from(quotient).map_err(|_| Error::Overflow)
}

/// Compute `a * b / denominator` rounded up, with a 512-bit intermediate.
pub fn mul_div_rounding_up(a: U256, b: U256, denominator: U256) -> Result<U256> {
    if denominator.is_zero() {
        return Err(Error::Overflow);
    }

    let product = U512::from(a) * U512::from(b);
    let denominator = U512::from(denominator);
    let mut quotient = product / denominator;
    if !(product % denominator).is_zero() {
        quotient += U512::from(1u8);
    }

    U256::uint_try_from(quotient).map_err(|_| Error::Overflow)
}

#[inline]
fn div_rounding_up(a: U256, b: U256) -> U256 {
    let quotient = a / b;
    if (a % b).is_zero() {
        quotient
    } else {
        quotient + U256::from(1u8)
    }
}

#[inline]
fn sorted(a: U256, b: U256) -> (U256, U256) {
    if a > b {
        (b, a)
    } else {
        (a, b)
    }
}

// ============================================
// Amount Deltas
// ============================================

/// Amount of token0 between two sqrt prices for `liquidity`.
///
/// Formula: L * 2^96 * (sqrt_b - sqrt_a) / sqrt_b / sqrt_a
pub fn get_amount0_delta(
    sqrt_ratio_a_x96: U256,
    sqrt_ratio_b_x96: U256,
    liquidity: u128,
    round_up: bool,
) -> Result<U256> {
    let (sqrt_ratio_a_x96, sqrt_ratio_b_x96) = sorted(sqrt_ratio_a_x96, sqrt_ratio_b_x96);

    if sqrt_ratio_a_x96.is_zero() {
        return Err(Error::SqrtPriceOutOfRange("0".to_string()));
    }

    let numerator1 = U256::from(liquidity) << RESOLUTION;
    let numerator2 = sqrt_ratio_b_x96 - sqrt_ratio_a_x96;

    if round_up {
        let scaled = mul_div_rounding_up(numerator1, numerator2, sqrt_ratio_b_x96)?;
        Ok(div_rounding_up(scaled, sqrt_ratio_a_x96))
    } else {
        Ok(mul_div(numerator1, numerator2, sqrt_ratio_b_x96)? / sqrt_ratio_a_x96)
    }
}

/// Amount of token1 between two sqrt prices for `liquidity`.
///
/// Formula: L * (sqrt_b - sqrt_a) / 2^96
pub fn get_amount1_delta(
    sqrt_ratio_a_x96: U256,
    sqrt_ratio_b_x96: U256,
    liquidity: u128,
    round_up: bool,
) -> Result<U256> {
    let (sqrt_ratio_a_x96, sqrt_ratio_b_x96) = sorted(sqrt_ratio_a_x96, sqrt_ratio_b_x96);
    let liquidity = U256::from(liquidity);

    if round_up {
        mul_div_rounding_up(liquidity, sqrt_ratio_b_x96 - sqrt_ratio_a_x96, Q96)
    } else {
        mul_div(liquidity, sqrt_ratio_b_x96 - sqrt_ratio_a_x96, Q96)
    }
}

/// Token amounts held by `liquidity` over `[sqrt_lower, sqrt_upper]` at `sqrt_current`.
///
/// Below the range everything sits in token0, above it everything sits in
/// token1, inside it the position is split at the current price.
pub fn get_amounts_for_liquidity(
    sqrt_current_x96: U256,
    sqrt_lower_x96: U256,
    sqrt_upper_x96: U256,
    liquidity: u128,
    round_up: bool,
) -> Result<(U256, U256)> {
    let (sqrt_lower_x96, sqrt_upper_x96) = sorted(sqrt_lower_x96, sqrt_upper_x96);

    if sqrt_current_x96 <= sqrt_lower_x96 {
        let amount0 = get_amount0_delta(sqrt_lower_x96, sqrt_upper_x96, liquidity, round_up)?;
        Ok((amount0, U256::ZERO))
    } else if sqrt_current_x96 < sqrt_upper_x96 {
        let amount0 = get_amount0_delta(sqrt_current_x96, sqrt_upper_x96, liquidity, round_up)?;
        let amount1 = get_amount1_delta(sqrt_lower_x96, sqrt_current_x96, liquidity, round_up)?;
        Ok((amount0, amount1))
    } else {
        let amount1 = get_amount1_delta(sqrt_lower_x96, sqrt_upper_x96, liquidity, round_up)?;
        Ok((U256::ZERO, amount1))
    }
}

// ============================================
// Liquidity From Amounts
// ============================================

/// Largest liquidity `amount0` can fund over `[sqrt_a, sqrt_b]`.
///
/// Formula: amount0 * sqrt_a * sqrt_b / (2^96 * (sqrt_b - sqrt_a)), evaluated
/// in arbitrary precision since the numerator exceeds 256 bits.
fn max_liquidity_for_amount0(sqrt_a: U256, sqrt_b: U256, amount0: U256) -> Result<U256> {
    let (sqrt_a, sqrt_b) = sorted(sqrt_a, sqrt_b);
    if sqrt_a == sqrt_b {
        return Ok(U256::ZERO);
    }

    let numerator = u256_to_biguint(amount0) * u256_to_biguint(sqrt_a) * u256_to_biguint(sqrt_b);
    let denominator = u256_to_biguint(Q96) * u256_to_biguint(sqrt_b - sqrt_a);

    biguint_to_u256(&(numerator / denominator)).ok_or(Error::Overflow)
}

/// Largest liquidity `amount1` can fund over `[sqrt_a, sqrt_b]`.
fn max_liquidity_for_amount1(sqrt_a: U256, sqrt_b: U256, amount1: U256) -> Result<U256> {
    let (sqrt_a, sqrt_b) = sorted(sqrt_a, sqrt_b);
    if sqrt_a == sqrt_b {
        return Ok(U256::ZERO);
    }

    let numerator = u256_to_biguint(amount1) * u256_to_biguint(Q96);
    let denominator = u256_to_biguint(sqrt_b - sqrt_a);

    biguint_to_u256(&(numerator / denominator)).ok_or(Error::Overflow)
}

/// Largest liquidity that `amount0` and `amount1` can jointly fund at the current price.
pub fn max_liquidity_for_amounts(
    sqrt_current_x96: U256,
    sqrt_lower_x96: U256,
    sqrt_upper_x96: U256,
    amount0: U256,
    amount1: U256,
) -> Result<u128> {
    let (sqrt_lower_x96, sqrt_upper_x96) = sorted(sqrt_lower_x96, sqrt_upper_x96);

    let liquidity = if sqrt_current_x96 <= sqrt_lower_x96 {
        max_liquidity_for_amount0(sqrt_lower_x96, sqrt_upper_x96, amount0)?
    } else if sqrt_current_x96 < sqrt_upper_x96 {
        let from_amount0 = max_liquidity_for_amount0(sqrt_current_x96, sqrt_upper_x96, amount0)?;
        let from_amount1 = max_liquidity_for_amount1(sqrt_lower_x96, sqrt_current_x96, amount1)?;
        from_amount0.min(from_amount1)
    } else {
        max_liquidity_for_amount1(sqrt_lower_x96, sqrt_upper_x96, amount1)?
    };

    u128::try_from(liquidity).map_err(|_| Error::Overflow)
}

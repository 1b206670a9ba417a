//! Price conversion utilities for Uniswap V3.
//!
//! Encoding a price ratio into sqrtPriceX96 (exact integer square root),
//! decoding it back, and deriving cross prices from two pools.

use alloy::primitives::U256;
use bigdecimal::BigDecimal;
use num_bigint::BigInt;
use num_traits::ToPrimitive;

use super::conversion::{big_pow10, biguint_to_u256, u256_to_biguint};
use super::liquidity_math::{mul_div, Q96, RESOLUTION};
use super::tick_math::{MAX_SQRT_RATIO, MIN_SQRT_RATIO};
use crate::error::{Error, Result};

// ============================================
// Encoding
// ============================================

/// Encode `numerator / denominator` (token1 per token0, raw units) as sqrtPriceX96.
///
/// Computes floor(sqrt(numerator * 2^192 / denominator)), which equals
/// floor(sqrt(numerator / denominator) * 2^96). No floating point is involved
/// because the result initializes a pool irreversibly.
///
/// Fails with `InvalidRatio` for a zero denominator and with
/// `SqrtPriceOutOfRange` when the price cannot initialize a pool.
pub fn encode_sqrt_price(numerator: U256, denominator: U256) -> Result<U256> {
    if denominator.is_zero() {
        return Err(Error::InvalidRatio(format!("{numerator}/0 has a zero denominator")));
    }

    let scaled = (u256_to_biguint(numerator) << (2 * RESOLUTION)) / u256_to_biguint(denominator);
    let root = scaled.sqrt();

    let sqrt_price_x96 =
        biguint_to_u256(&root).ok_or_else(|| Error::SqrtPriceOutOfRange(root.to_string()))?;

    ensure_sqrt_price_in_range(sqrt_price_x96)?;

    Ok(sqrt_price_x96)
}

/// Check that a sqrtPriceX96 lies within `[MIN_SQRT_RATIO, MAX_SQRT_RATIO)`.
pub fn ensure_sqrt_price_in_range(sqrt_price_x96: U256) -> Result<()> {
    if sqrt_price_x96 < MIN_SQRT_RATIO || sqrt_price_x96 >= MAX_SQRT_RATIO {
        return Err(Error::SqrtPriceOutOfRange(sqrt_price_x96.to_string()));
    }
    Ok(())
}

// ============================================
// Decoding
// ============================================

/// Decode sqrtPriceX96 into the raw token1/token0 ratio.
///
/// Exact: (sqrtPriceX96)^2 / 2^192 always has a finite decimal expansion.
pub fn decode_sqrt_price(sqrt_price_x96: U256) -> BigDecimal {
    let squared = BigInt::from(u256_to_biguint(sqrt_price_x96)).pow(2);

    // s^2 / 2^192 == s^2 * 5^192 / 10^192
    let five_pow = BigInt::from(5u8).pow(2 * RESOLUTION as u32);

    BigDecimal::new(squared * five_pow, 2 * RESOLUTION as i64).normalized()
}

/// Convert sqrtPriceX96 to a decimal-adjusted price (token1 per token0).
///
/// # Returns
/// * `Some(adjusted_price)` when the price converts to a finite positive f64
pub fn sqrt_price_to_adjusted_price(
    sqrt_price_x96: U256,
    token0_decimals: u8,
    token1_decimals: u8,
) -> Option<f64> {
    if sqrt_price_x96.is_zero() {
        return None;
    }

    let raw_price = decode_sqrt_price(sqrt_price_x96);

    // decimal adjustment: 10^(decimals0 - decimals1)
    let decimal_diff = token0_decimals as i32 - token1_decimals as i32;
    let adjusted = if decimal_diff >= 0 {
        raw_price * big_pow10(decimal_diff as u8)
    } else {
        raw_price / big_pow10((-decimal_diff) as u8)
    };

    adjusted
        .to_f64()
        .filter(|price| price.is_finite() && *price > 0.0)
}

// ============================================
// Cross Prices
// ============================================

/// sqrt of "units of the shared token per unit of X", in Q64.96.
///
/// `shared_is_token0` tells which side of the pool the shared token sits on:
/// - shared token is token0: pool price is X per shared, so the value is 2^192 / s
/// - shared token is token1: pool price is shared per X, so the value is s
pub fn sqrt_value_in_shared_token(sqrt_price_x96: U256, shared_is_token0: bool) -> Result<U256> {
    if sqrt_price_x96.is_zero() {
        return Err(Error::SqrtPriceOutOfRange("0".to_string()));
    }

    if shared_is_token0 {
        mul_div(Q96, Q96, sqrt_price_x96)
    } else {
        Ok(sqrt_price_x96)
    }
}

/// sqrtPriceX96 of an A/B pool (token1 = B per token0 = A) from the sqrt
/// values of A and B measured in a shared token.
///
/// price(A/B pool) = value(A) / value(B), so sqrt = valueA * 2^96 / valueB.
pub fn cross_sqrt_price(sqrt_value_a_x96: U256, sqrt_value_b_x96: U256) -> Result<U256> {
    if sqrt_value_b_x96.is_zero() {
        return Err(Error::InvalidRatio("cross price against a zero value".to_string()));
    }

    let sqrt_price_x96 = mul_div(sqrt_value_a_x96, Q96, sqrt_value_b_x96)?;
    ensure_sqrt_price_in_range(sqrt_price_x96)?;

    Ok(sqrt_price_x96)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn u(v: u64) -> U256 {
        U256::from(v)
    }

    #[test]
    fn test_encode_one_to_one_is_q96() {
        assert_eq!(encode_sqrt_price(u(1), u(1)).unwrap(), Q96);
        assert_eq!(encode_sqrt_price(u(7), u(7)).unwrap(), Q96);
    }

    #[test]
    fn test_encode_perfect_squares() {
        assert_eq!(encode_sqrt_price(u(4), u(1)).unwrap(), Q96 << 1);
        assert_eq!(encode_sqrt_price(u(1), u(4)).unwrap(), Q96 >> 1);
        assert_eq!(encode_sqrt_price(u(100), u(1)).unwrap(), Q96 * u(10));
    }

    #[test]
    fn test_encode_floors_irrational_roots() {
        // sqrt(2) * 2^96 = 112045541949572279837463876454.39...
        let expected = U256::from_str_radix("112045541949572279837463876454", 10).unwrap();
        assert_eq!(encode_sqrt_price(u(2), u(1)).unwrap(), expected);
    }

    #[test]
    fn test_encode_rejects_zero_denominator() {
        assert!(matches!(
            encode_sqrt_price(u(1), U256::ZERO),
            Err(Error::InvalidRatio(_))
        ));
    }

    #[test]
    fn test_encode_rejects_unrepresentable_prices() {
        assert!(matches!(
            encode_sqrt_price(U256::ZERO, u(1)),
            Err(Error::SqrtPriceOutOfRange(_))
        ));
        assert!(encode_sqrt_price(U256::MAX, u(1)).is_err());
    }

    #[test]
    fn test_decode_round_trips_one_to_one() {
        assert_eq!(decode_sqrt_price(Q96), BigDecimal::from(1));
        assert_eq!(decode_sqrt_price(Q96 << 1), BigDecimal::from(4));
        assert_eq!(
            decode_sqrt_price(Q96 >> 1),
            BigDecimal::from_str("0.25").unwrap()
        );
    }

    #[test]
    fn test_adjusted_price_applies_decimals() {
        // 1 raw unit of an 18-decimal token0 buys 1 raw unit of a 6-decimal token1
        let price = sqrt_price_to_adjusted_price(Q96, 18, 6).unwrap();
        assert!((price - 1e12).abs() / 1e12 < 1e-9);

        let price = sqrt_price_to_adjusted_price(Q96, 6, 18).unwrap();
        assert!((price - 1e-12).abs() / 1e-12 < 1e-9);

        assert_eq!(sqrt_price_to_adjusted_price(U256::ZERO, 18, 18), None);
    }

    #[test]
    fn test_cross_price_from_shared_token() {
        // W/A pool with W as token0 at 4 A per W -> A is worth 1/4 W
        let pool_wa = encode_sqrt_price(u(4), u(1)).unwrap();
        let value_a = sqrt_value_in_shared_token(pool_wa, true).unwrap();

        // B/W pool with W as token1 at 2 W per B -> B is worth 2 W
        let pool_bw = encode_sqrt_price(u(2), u(1)).unwrap();
        let value_b = sqrt_value_in_shared_token(pool_bw, false).unwrap();

        // A/B pool price = value(A) / value(B) = 1/8 B per A
        let cross = cross_sqrt_price(value_a, value_b).unwrap();
        let price = decode_sqrt_price(cross).to_f64().unwrap();
        assert!((price - 0.125).abs() < 1e-12);
    }
}

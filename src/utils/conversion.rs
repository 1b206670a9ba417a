//! Type conversion utilities.
//!
//! Functions for converting between alloy integers, arbitrary-precision
//! integers and decimal strings.

use alloy::primitives::U256;
use bigdecimal::BigDecimal;
use num_bigint::{BigInt, BigUint};
use once_cell::sync::Lazy;

use crate::error::{Error, Result};

// ============================================
// U256 <-> BigUint
// ============================================

/// Convert alloy U256 to an arbitrary-precision unsigned integer.
pub fn u256_to_biguint(value: U256) -> BigUint {
    BigUint::from_bytes_le(&value.to_le_bytes::<32>())
}

/// Convert an arbitrary-precision integer back to U256, `None` if it does not fit.
pub fn biguint_to_u256(value: &BigUint) -> Option<U256> {
    let bytes = value.to_bytes_le();
    if bytes.len() > 32 {
        return None;
    }
    U256::try_from_le_slice(&bytes)
}

// ============================================
// String Parsing
// ============================================

/// Parse a decimal integer literal (e.g. "1000000000000000000") into U256.
///
/// Underscores are accepted as digit separators so settings can be written
/// as `1_000_000`.
pub fn parse_u256(value: &str) -> Result<U256> {
    let cleaned: String = value.trim().chars().filter(|c| *c != '_').collect();
    U256::from_str_radix(&cleaned, 10)
        .map_err(|e| Error::InvalidSetting(format!("'{value}' is not an unsigned integer: {e}")))
}

/// Parse a decimal integer literal into u128 (liquidity units).
pub fn parse_u128(value: &str) -> Result<u128> {
    let parsed = parse_u256(value)?;
    u128::try_from(parsed).map_err(|_| Error::Overflow)
}

// ============================================
// Internal Helpers
// ============================================

static POW10_CACHE: Lazy<[BigDecimal; 25]> =
    Lazy::new(|| std::array::from_fn(|i| BigDecimal::from(BigInt::from(10u32).pow(i as u32))));

/// Compute 10^exp as BigDecimal.
pub(crate) fn big_pow10(exp: u8) -> BigDecimal {
    if (exp as usize) < POW10_CACHE.len() {
        POW10_CACHE[exp as usize].clone()
    } else {
        BigDecimal::from(BigInt::from(10u32).pow(exp as u32))
    }
}

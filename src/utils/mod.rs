//! Utility functions for pool deployment and position planning.
//!
//! This module is organized into focused submodules:
//!
//! - [`ordering`] - Canonical token ordering
//! - [`conversion`] - Type conversions (U256, BigUint, decimal strings)
//! - [`tick_math`] - Uniswap V3 tick calculations and tick alignment
//! - [`liquidity_math`] - Fixed-point amount/liquidity calculations
//! - [`price`] - sqrtPriceX96 encoding, decoding and cross prices

mod conversion;
mod liquidity_math;
mod ordering;
mod price;
mod tick_math;

// ============================================
// Re-exports
// ============================================

// Conversion utilities
pub use conversion::{biguint_to_u256, parse_u128, parse_u256, u256_to_biguint};

// Liquidity math
pub use liquidity_math::{
    get_amount0_delta, get_amount1_delta, get_amounts_for_liquidity, max_liquidity_for_amounts,
    mul_div, mul_div_rounding_up, Q96, RESOLUTION,
};

// Token ordering
pub use ordering::{canonicalize, sorts_before};

// Price codec
pub use price::{
    cross_sqrt_price, decode_sqrt_price, encode_sqrt_price, ensure_sqrt_price_in_range,
    sqrt_price_to_adjusted_price, sqrt_value_in_shared_token,
};

// Tick math
pub use tick_math::{
    get_sqrt_ratio_at_tick, get_tick_at_sqrt_ratio, max_usable_tick, min_usable_tick,
    nearest_usable_tick, MAX_SQRT_RATIO, MAX_TICK, MIN_SQRT_RATIO, MIN_TICK,
};

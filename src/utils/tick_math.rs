//! Tick math for Uniswap V3 pools.
//!
//! Exact 256-bit port of TickMath.getSqrtRatioAtTick plus the tick alignment
//! helper used to build position ranges.

use alloy::primitives::U256;

use crate::error::{Error, Result};

// ============================================
// Protocol Bounds
// ============================================

/// Lowest tick representable by a pool (log base sqrt(1.0001) of 2^-128)
pub const MIN_TICK: i32 = -887272;

/// Highest tick representable by a pool
pub const MAX_TICK: i32 = -MIN_TICK;

/// sqrtPriceX96 at MIN_TICK
pub const MIN_SQRT_RATIO: U256 = U256::from_limbs([4295128739, 0, 0, 0]);

/// sqrtPriceX96 at MAX_TICK
pub const MAX_SQRT_RATIO: U256 =
    U256::from_limbs([6743328256752651558, 17280870778742802505, 4294805859, 0]);

// ============================================
// Precomputed Constants
// ============================================

/// Q128.128 multipliers 1/sqrt(1.0001)^(2^i) for i = 1..19, keyed by tick bit.
/// Bit 0 seeds the ratio and is handled separately.
const TICK_MULTIPLIERS: [(u32, U256); 19] = [
    (0x2, U256::from_limbs([6459403834229662010, 18444899583751176498, 0, 0])),
    (0x4, U256::from_limbs([17226890335427755468, 18443055278223354162, 0, 0])),
    (0x8, U256::from_limbs([2032852871939366096, 18439367220385604838, 0, 0])),
    (0x10, U256::from_limbs([14545316742740207172, 18431993317065449817, 0, 0])),
    (0x20, U256::from_limbs([5129152022828963008, 18417254355718160513, 0, 0])),
    (0x40, U256::from_limbs([4894419605888772193, 18387811781193591352, 0, 0])),
    (0x80, U256::from_limbs([1280255884321894483, 18329067761203520168, 0, 0])),
    (0x100, U256::from_limbs([15924666964335305636, 18212142134806087854, 0, 0])),
    (0x200, U256::from_limbs([8010504389359918676, 17980523815641551639, 0, 0])),
    (0x400, U256::from_limbs([10668036004952895731, 17526086738831147013, 0, 0])),
    (0x800, U256::from_limbs([4878133418470705625, 16651378430235024244, 0, 0])),
    (0x1000, U256::from_limbs([9537173718739605541, 15030750278693429944, 0, 0])),
    (0x2000, U256::from_limbs([9972618978014552549, 12247334978882834399, 0, 0])),
    (0x4000, U256::from_limbs([10428997489610666743, 8131365268884726200, 0, 0])),
    (0x8000, U256::from_limbs([9305304367709015974, 3584323654723342297, 0, 0])),
    (0x10000, U256::from_limbs([14301143598189091785, 696457651847595233, 0, 0])),
    (0x20000, U256::from_limbs([7393154844743099908, 26294789957452057, 0, 0])),
    (0x40000, U256::from_limbs([2209338891292245656, 37481735321082, 0, 0])),
    (0x80000, U256::from_limbs([10518117631919034274, 76158723, 0, 0])),
];

/// 1/sqrt(1.0001) in Q128.128, applied when bit 0 of |tick| is set
const TICK_BIT0_RATIO: U256 = U256::from_limbs([12262481743371124737, 18445821805675392311, 0, 0]);

/// 2^128 (Q128.128 one)
const Q128: U256 = U256::from_limbs([0, 0, 1, 0]);

// ============================================
// Tick to Price Conversion
// ============================================

/// Convert a tick to its sqrt price ratio (Q64.96).
///
/// Formula: sqrt(1.0001^tick) * 2^96, rounded up, bit-for-bit identical to the
/// on-chain library so range boundaries match what the pool computes.
pub fn get_sqrt_ratio_at_tick(tick: i32) -> Result<U256> {
    if !(MIN_TICK..=MAX_TICK).contains(&tick) {
        return Err(Error::TickOutOfRange {
            tick,
            tick_spacing: 1,
        });
    }

    let abs_tick = tick.unsigned_abs();

    let mut ratio = if abs_tick & 0x1 != 0 { TICK_BIT0_RATIO } else { Q128 };

    for (mask, multiplier) in TICK_MULTIPLIERS.iter() {
        if abs_tick & mask != 0 {
            ratio = ratio.wrapping_mul(*multiplier) >> 128;
        }
    }

    // Positive ticks use the reciprocal
    if tick > 0 {
        ratio = U256::MAX / ratio;
    }

    // Q128.128 -> Q128.96, rounding up
    let remainder = ratio & U256::from(u32::MAX);
    let round_up = if remainder.is_zero() { U256::ZERO } else { U256::from(1u8) };

    Ok((ratio >> 32) + round_up)
}

/// Greatest tick whose sqrt ratio is less than or equal to `sqrt_price_x96`.
///
/// Binary search over [`get_sqrt_ratio_at_tick`], so it agrees with the
/// forward conversion exactly.
pub fn get_tick_at_sqrt_ratio(sqrt_price_x96: U256) -> Result<i32> {
    if sqrt_price_x96 < MIN_SQRT_RATIO || sqrt_price_x96 >= MAX_SQRT_RATIO {
        return Err(Error::SqrtPriceOutOfRange(sqrt_price_x96.to_string()));
    }

    let (mut low, mut high) = (MIN_TICK, MAX_TICK);
    while low < high {
        // upper midpoint so `low = mid` always makes progress
        let mid = low + (high - low + 1) / 2;
        if get_sqrt_ratio_at_tick(mid)? <= sqrt_price_x96 {
            low = mid;
        } else {
            high = mid - 1;
        }
    }

    Ok(low)
}

// ============================================
// Tick Alignment
// ============================================

/// Lowest multiple of `tick_spacing` inside the protocol bounds
pub fn min_usable_tick(tick_spacing: i32) -> i32 {
    -(MAX_TICK / tick_spacing) * tick_spacing
}

/// Highest multiple of `tick_spacing` inside the protocol bounds
pub fn max_usable_tick(tick_spacing: i32) -> i32 {
    (MAX_TICK / tick_spacing) * tick_spacing
}

/// Round `tick` to the nearest multiple of `tick_spacing`.
///
/// Ties round toward positive infinity (`round(tick / spacing) * spacing`).
/// A candidate that lands outside `[MIN_TICK, MAX_TICK]` is pulled back one
/// spacing; if that still does not fit, the spacing is unusable.
pub fn nearest_usable_tick(tick: i32, tick_spacing: i32) -> Result<i32> {
    let out_of_range = Error::TickOutOfRange { tick, tick_spacing };

    // A spacing wider than the whole tick domain is a configuration error
    if tick_spacing <= 0 || tick_spacing > MAX_TICK - MIN_TICK {
        return Err(out_of_range);
    }
    if !(MIN_TICK..=MAX_TICK).contains(&tick) {
        return Err(out_of_range);
    }

    let tick = i64::from(tick);
    let spacing = i64::from(tick_spacing);

    // floor((2 * tick + spacing) / (2 * spacing)) == floor(tick / spacing + 1/2)
    let rounded = (2 * tick + spacing).div_euclid(2 * spacing) * spacing;

    let candidate = if rounded < i64::from(MIN_TICK) {
        rounded + spacing
    } else if rounded > i64::from(MAX_TICK) {
        rounded - spacing
    } else {
        rounded
    };

    if candidate < i64::from(MIN_TICK) || candidate > i64::from(MAX_TICK) {
        return Err(out_of_range);
    }

    Ok(candidate as i32)
}

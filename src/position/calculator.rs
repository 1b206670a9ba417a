//! Mint, increase, decrease and collect parameters for concentrated liquidity
//! positions.
//!
//! Every plan starts from a fresh [`PoolState`]. Amounts are exact integer
//! results of the protocol's liquidity formulas, evaluated at the sqrt ratios
//! of the range boundaries:
//!
//! - current price below the range: the position is entirely token0
//! - current price above the range: the position is entirely token1
//! - otherwise it is split at the current price
//!
//! Amounts the position manager will pull (mint, increase) round up; amounts
//! it will pay out (decrease) round down. Slippage minimums are then taken as
//! `desired * (10000 - bps) / 10000`, rounded down.

use alloy::primitives::{Address, U256};
use log::debug;

use crate::{
    error::{Error, Result},
    models::{
        CollectParams, DecreaseParams, IncreaseParams, LiquidityTarget, MintParams, PoolConfig,
        PoolState, PositionInfo, TickRange,
    },
    utils::{
        get_amounts_for_liquidity, get_sqrt_ratio_at_tick, max_liquidity_for_amounts,
        max_usable_tick, min_usable_tick, mul_div, nearest_usable_tick,
    },
};

/// Basis point denominator
const BPS: u32 = 10_000;

/// Liquidity and the token amounts it corresponds to at the current price
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PositionAmounts {
    pub liquidity: u128,
    pub amount0: U256,
    pub amount1: U256,
}

/// Symmetric range of `width` spacings on each side of the current tick.
///
/// The current tick is first aligned with [`nearest_usable_tick`]; both ends
/// are clamped to the usable tick bounds of the pool. A width below one
/// spacing is an `InvalidRange`.
pub fn tick_range_around(state: &PoolState, width: i32) -> Result<TickRange> {
    let spacing = state.tick_spacing;
    let center = nearest_usable_tick(state.tick, spacing)?;

    if width < 1 {
        return Err(Error::InvalidRange {
            tick_lower: center,
            tick_upper: center,
        });
    }

    let (min_tick, max_tick) = (min_usable_tick(spacing), max_usable_tick(spacing));
    let offset = i64::from(width) * i64::from(spacing);
    let lower = (i64::from(center) - offset).clamp(i64::from(min_tick), i64::from(max_tick));
    let upper = (i64::from(center) + offset).clamp(i64::from(min_tick), i64::from(max_tick));

    TickRange::new(
        i32::try_from(lower).map_err(|_| Error::Overflow)?,
        i32::try_from(upper).map_err(|_| Error::Overflow)?,
    )
}

/// `amount * (10000 - slippage_bps) / 10000`, rounded down.
pub fn apply_slippage(amount: U256, slippage_bps: u32) -> Result<U256> {
    if slippage_bps > BPS {
        return Err(Error::InvalidSlippage(slippage_bps));
    }

    mul_div(amount, U256::from(BPS - slippage_bps), U256::from(BPS))
}

/// Resolve `target` into liquidity over `range` and the token amounts backing it.
pub fn amounts_for_target(
    state: &PoolState,
    range: &TickRange,
    target: LiquidityTarget,
    round_up: bool,
) -> Result<PositionAmounts> {
    let sqrt_lower = get_sqrt_ratio_at_tick(range.tick_lower())?;
    let sqrt_upper = get_sqrt_ratio_at_tick(range.tick_upper())?;

    let liquidity = match target {
        LiquidityTarget::Liquidity(liquidity) => liquidity,
        LiquidityTarget::Amounts { amount0, amount1 } => max_liquidity_for_amounts(
            state.sqrt_price_x96,
            sqrt_lower,
            sqrt_upper,
            amount0,
            amount1,
        )?,
    };

    amounts_for_liquidity(state, range, liquidity, round_up)
}

fn amounts_for_liquidity(
    state: &PoolState,
    range: &TickRange,
    liquidity: u128,
    round_up: bool,
) -> Result<PositionAmounts> {
    if liquidity == 0 {
        return Err(Error::ZeroLiquidity);
    }

    let (amount0, amount1) = get_amounts_for_liquidity(
        state.sqrt_price_x96,
        get_sqrt_ratio_at_tick(range.tick_lower())?,
        get_sqrt_ratio_at_tick(range.tick_upper())?,
        liquidity,
        round_up,
    )?;

    if amount0.is_zero() && amount1.is_zero() {
        return Err(Error::ZeroLiquidity);
    }

    Ok(PositionAmounts {
        liquidity,
        amount0,
        amount1,
    })
}

/// Plans position manager calls for one recipient, deadline and slippage tolerance.
#[derive(Debug, Clone, Copy)]
pub struct PositionCalculator {
    slippage_bps: u32,
    recipient: Address,
    deadline: U256,
}

impl PositionCalculator {
    pub fn new(slippage_bps: u32, recipient: Address, deadline: U256) -> Result<Self> {
        if slippage_bps > BPS {
            return Err(Error::InvalidSlippage(slippage_bps));
        }

        Ok(Self {
            slippage_bps,
            recipient,
            deadline,
        })
    }

    /// Mint a new position `range_width` spacings either side of the current price.
    pub fn plan_mint(
        &self,
        state: &PoolState,
        pool: &PoolConfig,
        target: LiquidityTarget,
        range_width: i32,
    ) -> Result<MintParams> {
        let range = tick_range_around(state, range_width)?;
        self.plan_mint_in_range(state, pool, range, target)
    }

    /// Mint a new position over an explicit, spacing-aligned range.
    pub fn plan_mint_in_range(
        &self,
        state: &PoolState,
        pool: &PoolConfig,
        range: TickRange,
        target: LiquidityTarget,
    ) -> Result<MintParams> {
        if !range.is_aligned(state.tick_spacing) {
            return Err(Error::InvalidRange {
                tick_lower: range.tick_lower(),
                tick_upper: range.tick_upper(),
            });
        }

        let amounts = amounts_for_target(state, &range, target, true)?;
        debug!(
            "Mint plan on {}: range [{}, {}) liquidity={} amount0={} amount1={}",
            pool,
            range.tick_lower(),
            range.tick_upper(),
            amounts.liquidity,
            amounts.amount0,
            amounts.amount1
        );

        Ok(MintParams {
            token0: pool.token0(),
            token1: pool.token1(),
            fee: pool.fee().fee(),
            tick_lower: range.tick_lower(),
            tick_upper: range.tick_upper(),
            amount0_desired: amounts.amount0,
            amount1_desired: amounts.amount1,
            amount0_min: apply_slippage(amounts.amount0, self.slippage_bps)?,
            amount1_min: apply_slippage(amounts.amount1, self.slippage_bps)?,
            recipient: self.recipient,
            deadline: self.deadline,
        })
    }

    /// Add liquidity to an existing position over its stored range.
    pub fn plan_increase(
        &self,
        state: &PoolState,
        position: &PositionInfo,
        target: LiquidityTarget,
    ) -> Result<IncreaseParams> {
        let range = position.range()?;
        let amounts = amounts_for_target(state, &range, target, true)?;
        debug!(
            "Increase plan for position {}: liquidity={} amount0={} amount1={}",
            position.token_id, amounts.liquidity, amounts.amount0, amounts.amount1
        );

        Ok(IncreaseParams {
            token_id: position.token_id,
            amount0_desired: amounts.amount0,
            amount1_desired: amounts.amount1,
            amount0_min: apply_slippage(amounts.amount0, self.slippage_bps)?,
            amount1_min: apply_slippage(amounts.amount1, self.slippage_bps)?,
            deadline: self.deadline,
        })
    }

    /// Remove `fraction_bps` parts per 10 000 of the position's current liquidity.
    pub fn plan_decrease(
        &self,
        state: &PoolState,
        position: &PositionInfo,
        fraction_bps: u32,
    ) -> Result<DecreaseParams> {
        if fraction_bps == 0 || fraction_bps > BPS {
            return Err(Error::InvalidFraction(fraction_bps));
        }

        let liquidity = mul_div(
            U256::from(position.liquidity),
            U256::from(fraction_bps),
            U256::from(BPS),
        )?;
        let liquidity = u128::try_from(liquidity).map_err(|_| Error::Overflow)?;

        let range = position.range()?;
        let amounts = amounts_for_liquidity(state, &range, liquidity, false)?;
        debug!(
            "Decrease plan for position {}: liquidity={} of {} amount0={} amount1={}",
            position.token_id, liquidity, position.liquidity, amounts.amount0, amounts.amount1
        );

        Ok(DecreaseParams {
            token_id: position.token_id,
            liquidity,
            amount0_min: apply_slippage(amounts.amount0, self.slippage_bps)?,
            amount1_min: apply_slippage(amounts.amount1, self.slippage_bps)?,
            deadline: self.deadline,
        })
    }

    /// Collect everything owed to the position.
    pub fn plan_collect(&self, token_id: U256) -> CollectParams {
        CollectParams {
            token_id,
            recipient: self.recipient,
            amount0_max: u128::MAX,
            amount1_max: u128::MAX,
        }
    }
}

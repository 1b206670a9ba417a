use alloy::primitives::{Address, U256};
use serde::Serialize;

use crate::{
    error::{Error, Result},
    utils::{MAX_TICK, MIN_TICK},
};

/// A tick interval `[tick_lower, tick_upper)` for a concentrated liquidity position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct TickRange {
    tick_lower: i32,
    tick_upper: i32,
}

impl TickRange {
    /// Validate ordering and protocol bounds. Alignment to a spacing is checked
    /// separately with [`TickRange::is_aligned`] since stored position ranges
    /// are taken as the pool accepted them.
    pub fn new(tick_lower: i32, tick_upper: i32) -> Result<Self> {
        if tick_lower >= tick_upper || tick_lower < MIN_TICK || tick_upper > MAX_TICK {
            return Err(Error::InvalidRange {
                tick_lower,
                tick_upper,
            });
        }

        Ok(Self {
            tick_lower,
            tick_upper,
        })
    }

    pub fn tick_lower(&self) -> i32 {
        self.tick_lower
    }

    pub fn tick_upper(&self) -> i32 {
        self.tick_upper
    }

    pub fn is_aligned(&self, tick_spacing: i32) -> bool {
        tick_spacing > 0 && self.tick_lower % tick_spacing == 0 && self.tick_upper % tick_spacing == 0
    }
}

/// How much liquidity a mint or increase should add.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LiquidityTarget {
    /// Raw liquidity units
    Liquidity(u128),
    /// Token budgets; converted to the largest liquidity they fund at the current price
    Amounts { amount0: U256, amount1: U256 },
}

/// A position as stored by the position manager.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PositionInfo {
    pub token_id: U256,
    pub token0: Address,
    pub token1: Address,
    pub fee: u32,
    pub tick_lower: i32,
    pub tick_upper: i32,
    pub liquidity: u128,
    pub fee_growth_inside0_last_x128: U256,
    pub fee_growth_inside1_last_x128: U256,
    pub tokens_owed0: u128,
    pub tokens_owed1: u128,
}

impl PositionInfo {
    pub fn range(&self) -> Result<TickRange> {
        TickRange::new(self.tick_lower, self.tick_upper)
    }
}

// ============================================
// Call Payloads
// ============================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MintParams {
    pub token0: Address,
    pub token1: Address,
    pub fee: u32,
    pub tick_lower: i32,
    pub tick_upper: i32,
    pub amount0_desired: U256,
    pub amount1_desired: U256,
    pub amount0_min: U256,
    pub amount1_min: U256,
    pub recipient: Address,
    pub deadline: U256,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct IncreaseParams {
    pub token_id: U256,
    pub amount0_desired: U256,
    pub amount1_desired: U256,
    pub amount0_min: U256,
    pub amount1_min: U256,
    pub deadline: U256,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DecreaseParams {
    pub token_id: U256,
    pub liquidity: u128,
    pub amount0_min: U256,
    pub amount1_min: U256,
    pub deadline: U256,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CollectParams {
    pub token_id: U256,
    pub recipient: Address,
    pub amount0_max: u128,
    pub amount1_max: u128,
}

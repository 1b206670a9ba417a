use std::fmt;

use alloy::primitives::{Address, U256};
use serde::{Deserialize, Serialize};

use crate::{
    error::{Error, Result},
    utils::canonicalize,
};

/// Fee tiers enabled on a stock Uniswap V3 factory, in hundredths of a bip.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "u32", into = "u32")]
#[repr(u32)]
pub enum FeeTier {
    Lowest = 100,
    Low = 500,
    Medium = 3000,
    High = 10000,
}

impl FeeTier {
    /// Fee in hundredths of a bip (500 = 0.05%)
    pub fn fee(self) -> u32 {
        self as u32
    }

    /// Tick spacing the factory assigns to this fee tier
    pub fn tick_spacing(self) -> i32 {
        match self {
            FeeTier::Lowest => 1,
            FeeTier::Low => 10,
            FeeTier::Medium => 60,
            FeeTier::High => 200,
        }
    }
}

impl TryFrom<u32> for FeeTier {
    type Error = Error;

    fn try_from(fee: u32) -> Result<Self> {
        match fee {
            100 => Ok(FeeTier::Lowest),
            500 => Ok(FeeTier::Low),
            3000 => Ok(FeeTier::Medium),
            10000 => Ok(FeeTier::High),
            other => Err(Error::UnsupportedFee(other)),
        }
    }
}

impl From<FeeTier> for u32 {
    fn from(tier: FeeTier) -> Self {
        tier.fee()
    }
}

impl fmt::Display for FeeTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.fee())
    }
}

/// A pool key: canonically ordered token pair plus fee tier.
///
/// Fields are private so `token0 < token1` holds for every value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PoolConfig {
    token0: Address,
    token1: Address,
    fee: FeeTier,
}

impl PoolConfig {
    /// Build a pool key from tokens in any order.
    pub fn new(token_a: Address, token_b: Address, fee: FeeTier) -> Result<Self> {
        if token_a == token_b {
            return Err(Error::IdenticalTokens(token_a));
        }

        let (token0, token1) = canonicalize(token_a, token_b);

        Ok(Self {
            token0,
            token1,
            fee,
        })
    }

    pub fn token0(&self) -> Address {
        self.token0
    }

    pub fn token1(&self) -> Address {
        self.token1
    }

    pub fn fee(&self) -> FeeTier {
        self.fee
    }

    /// True if the pair had to be swapped to become canonical
    pub fn is_inverted(&self, token_a: Address) -> bool {
        token_a != self.token0
    }
}

impl fmt::Display for PoolConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{} ({})", self.token0, self.token1, self.fee)
    }
}

/// Read snapshot of a pool's price state.
///
/// Never cached: fetched again before every computation that depends on price.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PoolState {
    pub tick: i32,
    pub tick_spacing: i32,
    pub liquidity: u128,
    pub sqrt_price_x96: U256,
}

/// Immutable pool fields
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PoolImmutables {
    pub token0: Address,
    pub token1: Address,
    pub fee: u32,
}

/// Human-readable pool description for logs.
#[derive(Debug, Clone, Serialize)]
pub struct PoolSummary {
    pub address: Address,
    pub token0: Address,
    pub token1: Address,
    pub fee: u32,
    pub tick_spacing: i32,
    pub liquidity: String,
    pub tick: i32,
    pub sqrt_price_x96: String,
    /// Raw token1/token0 price
    pub price: String,
    /// Whole token1 per whole token0
    pub adjusted_price: Option<f64>,
}

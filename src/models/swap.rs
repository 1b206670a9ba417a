use alloy::primitives::{Address, U256};
use serde::Serialize;

use super::pool::FeeTier;
use crate::error::{Error, Result};

/// A single-hop exact-input swap request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SwapIntent {
    pub token_in: Address,
    pub token_out: Address,
    pub fee: FeeTier,
    pub amount_in: U256,
}

/// Minimum acceptable output for an exact-input swap.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SwapBound {
    pub amount_out_minimum: U256,
}

impl SwapBound {
    /// Lower the bound by `slippage_bps` parts per 10 000, rounding down.
    pub fn discounted(self, slippage_bps: u32) -> Result<Self> {
        if slippage_bps > 10_000 {
            return Err(Error::InvalidSlippage(slippage_bps));
        }

        let kept = U256::from(10_000 - slippage_bps);
        let amount_out_minimum = self
            .amount_out_minimum
            .checked_mul(kept)
            .ok_or(Error::Overflow)?
            / U256::from(10_000u32);

        Ok(Self { amount_out_minimum })
    }
}

/// Router payload for `exactInputSingle`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExactInputParams {
    pub token_in: Address,
    pub token_out: Address,
    pub fee: u32,
    pub recipient: Address,
    pub deadline: U256,
    pub amount_in: U256,
    pub amount_out_minimum: U256,
    pub sqrt_price_limit_x96: U256,
}

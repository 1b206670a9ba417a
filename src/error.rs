//! Error taxonomy for pool resolution, price math and position planning.

use alloy::primitives::{Address, B256};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("Invalid price ratio: {0}")]
    InvalidRatio(String),

    #[error("Tick {tick} cannot be aligned to spacing {tick_spacing} within protocol bounds")]
    TickOutOfRange { tick: i32, tick_spacing: i32 },

    #[error("Invalid tick range: lower {tick_lower} must be below upper {tick_upper}")]
    InvalidRange { tick_lower: i32, tick_upper: i32 },

    #[error("Liquidity or token amounts round to zero")]
    ZeroLiquidity,

    #[error("Quote unavailable: {0}")]
    QuoteUnavailable(String),

    #[error("Pool creation failed: {0}")]
    PoolCreationFailed(String),

    #[error("External call failed: {0}")]
    ExternalCallFailed(String),

    #[error("Pool tokens must differ, got {0} twice")]
    IdenticalTokens(Address),

    #[error("Unsupported fee tier: {0}")]
    UnsupportedFee(u32),

    #[error("Slippage tolerance {0} bps exceeds 10000")]
    InvalidSlippage(u32),

    #[error("Liquidity fraction {0} bps must be within (0, 10000]")]
    InvalidFraction(u32),

    #[error("sqrtPriceX96 {0} is outside the protocol price bounds")]
    SqrtPriceOutOfRange(String),

    #[error("Fixed-point math overflow")]
    Overflow,

    #[error("Transaction {tx_hash} reverted during {action}")]
    TransactionReverted { action: &'static str, tx_hash: B256 },

    #[error("Receipt {tx_hash} has no {event} event")]
    MissingEvent { event: &'static str, tx_hash: B256 },

    #[error("Invalid setting: {0}")]
    InvalidSetting(String),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;

impl From<alloy::contract::Error> for Error {
    fn from(err: alloy::contract::Error) -> Self {
        Error::ExternalCallFailed(err.to_string())
    }
}

impl From<alloy::providers::PendingTransactionError> for Error {
    fn from(err: alloy::providers::PendingTransactionError) -> Self {
        Error::ExternalCallFailed(err.to_string())
    }
}

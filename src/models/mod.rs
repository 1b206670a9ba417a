mod outcome;
mod pool;
mod position;
mod swap;

pub use outcome::{CollectOutcome, LiquidityOutcome, MintOutcome, SwapOutcome, TxOutcome};
pub use pool::{FeeTier, PoolConfig, PoolImmutables, PoolState, PoolSummary};
pub use position::{
    CollectParams, DecreaseParams, IncreaseParams, LiquidityTarget, MintParams, PositionInfo,
    TickRange,
};
pub use swap::{ExactInputParams, SwapBound, SwapIntent};

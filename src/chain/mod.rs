//! Ports to the on-chain collaborators.
//!
//! Every core operation takes the narrowest port it needs, so the pool
//! resolver never sees a router and the quote adapter never holds a signer.
//! [`RpcClient`] implements all of them against a live node; tests use an
//! in-memory chain.

use alloy::primitives::{Address, U256};
use async_trait::async_trait;

use crate::{
    error::Result,
    models::{
        CollectOutcome, CollectParams, DecreaseParams, ExactInputParams, IncreaseParams,
        LiquidityOutcome, MintOutcome, MintParams, PositionInfo, TxOutcome,
    },
};

#[cfg(test)]
pub(crate) mod mock;
mod rpc;

pub use rpc::RpcClient;

/// Price fields of a pool's `slot0`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Slot0 {
    pub sqrt_price_x96: U256,
    pub tick: i32,
}

/// Factory reads
#[async_trait]
pub trait FactoryReader: Send + Sync {
    /// Pool address for an ordered pair and fee, zero if none exists
    async fn get_pool(&self, token0: Address, token1: Address, fee: u32) -> Result<Address>;
}

/// Position manager writes. Each call waits for the receipt.
#[async_trait]
pub trait PositionManagerWriter: Send + Sync {
    async fn create_and_initialize_pool_if_necessary(
        &self,
        token0: Address,
        token1: Address,
        fee: u32,
        sqrt_price_x96: U256,
    ) -> Result<TxOutcome>;

    async fn mint(&self, params: &MintParams) -> Result<MintOutcome>;

    async fn increase_liquidity(&self, params: &IncreaseParams) -> Result<LiquidityOutcome>;

    async fn decrease_liquidity(&self, params: &DecreaseParams) -> Result<LiquidityOutcome>;

    async fn collect(&self, params: &CollectParams) -> Result<CollectOutcome>;
}

/// Position manager reads
#[async_trait]
pub trait PositionManagerReader: Send + Sync {
    async fn positions(&self, token_id: U256) -> Result<PositionInfo>;

    async fn balance_of(&self, owner: Address) -> Result<U256>;

    async fn token_of_owner_by_index(&self, owner: Address, index: U256) -> Result<U256>;
}

/// Pool reads, keyed by pool address
#[async_trait]
pub trait PoolReader: Send + Sync {
    async fn slot0(&self, pool: Address) -> Result<Slot0>;

    async fn liquidity(&self, pool: Address) -> Result<u128>;

    async fn tick_spacing(&self, pool: Address) -> Result<i32>;

    async fn fee(&self, pool: Address) -> Result<u32>;

    async fn token0(&self, pool: Address) -> Result<Address>;

    async fn token1(&self, pool: Address) -> Result<Address>;
}

/// Quoter reads (simulated calls)
#[async_trait]
pub trait QuoteReader: Send + Sync {
    async fn quote_exact_input_single(
        &self,
        token_in: Address,
        token_out: Address,
        fee: u32,
        amount_in: U256,
        sqrt_price_limit_x96: U256,
    ) -> Result<U256>;
}

/// Swap router writes
#[async_trait]
pub trait RouterWriter: Send + Sync {
    async fn exact_input_single(&self, params: &ExactInputParams) -> Result<TxOutcome>;
}

/// ERC-20 metadata reads
#[async_trait]
pub trait TokenReader: Send + Sync {
    async fn decimals(&self, token: Address) -> Result<u8>;
}

/// ERC-20 allowance management for the signer
#[async_trait]
pub trait TokenWriter: Send + Sync {
    async fn allowance(&self, token: Address, owner: Address, spender: Address) -> Result<U256>;

    async fn approve(&self, token: Address, spender: Address, amount: U256) -> Result<TxOutcome>;
}

/// Everything the deployment run needs from one signing connection
pub trait ChainClient:
    FactoryReader
    + PositionManagerWriter
    + PositionManagerReader
    + PoolReader
    + QuoteReader
    + RouterWriter
    + TokenReader
    + TokenWriter
{
}

impl<T> ChainClient for T where
    T: FactoryReader
        + PositionManagerWriter
        + PositionManagerReader
        + PoolReader
        + QuoteReader
        + RouterWriter
        + TokenReader
        + TokenWriter
{
}

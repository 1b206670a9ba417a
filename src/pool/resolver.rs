use alloy::primitives::{Address, U256};
use log::{info, warn};

use crate::{
    chain::{FactoryReader, PositionManagerWriter},
    error::{Error, Result},
    models::PoolConfig,
    utils::{canonicalize, ensure_sqrt_price_in_range, get_tick_at_sqrt_ratio},
};

/// Finds a pool through the factory or creates and initializes it once.
///
/// Resolution is idempotent: an existing pool is returned untouched, so a
/// failed deployment run can simply be repeated.
pub struct PoolResolver<'a, F: ?Sized, W: ?Sized> {
    factory: &'a F,
    position_manager: &'a W,
}

impl<'a, F, W> PoolResolver<'a, F, W>
where
    F: FactoryReader + ?Sized,
    W: PositionManagerWriter + ?Sized,
{
    pub fn new(factory: &'a F, position_manager: &'a W) -> Self {
        Self {
            factory,
            position_manager,
        }
    }

    /// Return the pool for `config`, creating it at `init_sqrt_price_x96` if absent.
    ///
    /// The price is ignored when the pool already exists. A reverted or
    /// failed `getPool` read counts as "not deployed"; a failed creation is
    /// surfaced as [`Error::PoolCreationFailed`] and never retried here.
    pub async fn resolve_or_create(
        &self,
        config: &PoolConfig,
        init_sqrt_price_x96: U256,
    ) -> Result<Address> {
        let (token0, token1) = canonicalize(config.token0(), config.token1());
        let fee = config.fee().fee();

        let existing = self.lookup(token0, token1, fee).await;
        if existing != Address::ZERO {
            info!("Pool {} already deployed at {}", config, existing);
            return Ok(existing);
        }

        ensure_sqrt_price_in_range(init_sqrt_price_x96)?;
        info!(
            "Creating pool {} at sqrtPriceX96={} (tick {})",
            config,
            init_sqrt_price_x96,
            get_tick_at_sqrt_ratio(init_sqrt_price_x96)?
        );

        let tx = self
            .position_manager
            .create_and_initialize_pool_if_necessary(token0, token1, fee, init_sqrt_price_x96)
            .await
            .map_err(|e| match e {
                Error::PoolCreationFailed(_) => e,
                other => Error::PoolCreationFailed(other.to_string()),
            })?;

        // Confirmed write, so the factory must know the pool now
        let pool = self.factory.get_pool(token0, token1, fee).await?;
        if pool == Address::ZERO {
            return Err(Error::PoolCreationFailed(format!(
                "factory has no pool for {} after tx {}",
                config, tx.tx_hash
            )));
        }

        info!("Pool {} created at {} (tx {})", config, pool, tx.tx_hash);
        Ok(pool)
    }

    async fn lookup(&self, token0: Address, token1: Address, fee: u32) -> Address {
        match self.factory.get_pool(token0, token1, fee).await {
            Ok(pool) => pool,
            Err(e) => {
                warn!("getPool({token0}, {token1}, {fee}) failed, treating pool as absent: {e}");
                Address::ZERO
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        chain::mock::MockChain,
        models::FeeTier,
        utils::{encode_sqrt_price, Q96},
    };
    use alloy::primitives::address;

    const HIGH: Address = address!("aaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaa");
    const LOW: Address = address!("1111111111111111111111111111111111111111");

    #[tokio::test]
    async fn test_resolve_twice_creates_once() {
        let chain = MockChain::new();
        let resolver = PoolResolver::new(&chain, &chain);
        let config = PoolConfig::new(HIGH, LOW, FeeTier::Low).unwrap();

        let first = resolver.resolve_or_create(&config, Q96).await.unwrap();
        let second = resolver
            .resolve_or_create(&config, Q96 << 1)
            .await
            .unwrap();

        assert_eq!(first, second);
        assert_eq!(chain.state().create_calls, 1);

        // second call did not move the price
        let pool = chain.state().pool_data[&first].slot0;
        assert_eq!(pool.sqrt_price_x96, Q96);
        assert_eq!(pool.tick, 0);
    }

    #[tokio::test]
    async fn test_lookup_uses_canonical_order() {
        let chain = MockChain::new();
        let resolver = PoolResolver::new(&chain, &chain);
        let config = PoolConfig::new(HIGH, LOW, FeeTier::Low).unwrap();

        let pool = resolver.resolve_or_create(&config, Q96).await.unwrap();

        assert_eq!(chain.pool_address(LOW, HIGH, 500), Some(pool));
        assert_eq!(chain.pool_address(HIGH, LOW, 500), None);
    }

    #[tokio::test]
    async fn test_existing_pool_is_returned_unchanged() {
        let price = encode_sqrt_price(U256::from(4u8), U256::from(1u8)).unwrap();
        let chain = MockChain::new().with_pool(LOW, HIGH, FeeTier::Medium, price);
        let resolver = PoolResolver::new(&chain, &chain);
        let config = PoolConfig::new(LOW, HIGH, FeeTier::Medium).unwrap();

        let pool = resolver.resolve_or_create(&config, Q96).await.unwrap();

        assert_eq!(chain.pool_address(LOW, HIGH, 3000), Some(pool));
        assert_eq!(chain.state().create_calls, 0);
        assert_eq!(chain.state().pool_data[&pool].slot0.sqrt_price_x96, price);
    }

    #[tokio::test]
    async fn test_reverted_lookup_counts_as_absent() {
        let chain = MockChain::new();
        chain.state().revert_get_pool = true;
        let resolver = PoolResolver::new(&chain, &chain);
        let config = PoolConfig::new(LOW, HIGH, FeeTier::Low).unwrap();

        // creation proceeds, but the re-query still reverts and is surfaced
        let err = resolver.resolve_or_create(&config, Q96).await.unwrap_err();
        assert!(matches!(err, Error::ExternalCallFailed(_)));
        assert_eq!(chain.state().create_calls, 1);

        chain.state().revert_get_pool = false;
        let pool = resolver.resolve_or_create(&config, Q96).await.unwrap();
        assert_eq!(chain.pool_address(LOW, HIGH, 500), Some(pool));
        assert_eq!(chain.state().create_calls, 1);
    }

    #[tokio::test]
    async fn test_creation_failure_is_fatal() {
        let chain = MockChain::new();
        chain.state().revert_create = true;
        let resolver = PoolResolver::new(&chain, &chain);
        let config = PoolConfig::new(LOW, HIGH, FeeTier::High).unwrap();

        let err = resolver.resolve_or_create(&config, Q96).await.unwrap_err();
        assert!(matches!(err, Error::PoolCreationFailed(_)));
        assert_eq!(chain.state().create_calls, 1);
    }

    #[tokio::test]
    async fn test_out_of_range_price_rejected_before_creation() {
        let chain = MockChain::new();
        let resolver = PoolResolver::new(&chain, &chain);
        let config = PoolConfig::new(LOW, HIGH, FeeTier::Low).unwrap();

        let err = resolver
            .resolve_or_create(&config, U256::from(1u8))
            .await
            .unwrap_err();
        assert!(matches!(err, Error::SqrtPriceOutOfRange(_)));
        assert_eq!(chain.state().create_calls, 0);
    }
}

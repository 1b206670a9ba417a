use alloy::primitives::Address;
use futures::try_join;
use log::debug;

use crate::{
    chain::{PoolReader, TokenReader},
    error::Result,
    models::{PoolImmutables, PoolState, PoolSummary},
    utils::{decode_sqrt_price, sqrt_price_to_adjusted_price},
};

/// Fresh price snapshot. The reads are independent and issued together.
pub async fn fetch_pool_state<R: PoolReader + ?Sized>(reader: &R, pool: Address) -> Result<PoolState> {
    let (slot0, tick_spacing, liquidity) = try_join!(
        reader.slot0(pool),
        reader.tick_spacing(pool),
        reader.liquidity(pool)
    )?;

    let state = PoolState {
        tick: slot0.tick,
        tick_spacing,
        liquidity,
        sqrt_price_x96: slot0.sqrt_price_x96,
    };
    debug!("Pool {} state: {:?}", pool, state);

    Ok(state)
}

pub async fn fetch_pool_immutables<R: PoolReader + ?Sized>(
    reader: &R,
    pool: Address,
) -> Result<PoolImmutables> {
    let (token0, token1, fee) = try_join!(reader.token0(pool), reader.token1(pool), reader.fee(pool))?;

    Ok(PoolImmutables {
        token0,
        token1,
        fee,
    })
}

/// State, immutables and token decimals in one loggable record.
pub async fn describe_pool<R: PoolReader + TokenReader + ?Sized>(
    reader: &R,
    pool: Address,
) -> Result<PoolSummary> {
    let (state, immutables) = try_join!(
        fetch_pool_state(reader, pool),
        fetch_pool_immutables(reader, pool)
    )?;
    let (decimals0, decimals1) = try_join!(
        reader.decimals(immutables.token0),
        reader.decimals(immutables.token1)
    )?;

    Ok(PoolSummary {
        address: pool,
        token0: immutables.token0,
        token1: immutables.token1,
        fee: immutables.fee,
        tick_spacing: state.tick_spacing,
        liquidity: state.liquidity.to_string(),
        tick: state.tick,
        sqrt_price_x96: state.sqrt_price_x96.to_string(),
        price: decode_sqrt_price(state.sqrt_price_x96).to_string(),
        adjusted_price: sqrt_price_to_adjusted_price(state.sqrt_price_x96, decimals0, decimals1),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        chain::mock::MockChain,
        models::FeeTier,
        utils::{encode_sqrt_price, Q96},
    };
    use alloy::primitives::U256;

    #[tokio::test]
    async fn test_fetch_pool_state() {
        let (a, b) = (Address::with_last_byte(1), Address::with_last_byte(2));
        let chain = MockChain::new().with_pool(a, b, FeeTier::Low, Q96);
        let pool = chain.pool_address(a, b, 500).unwrap();

        let state = fetch_pool_state(&chain, pool).await.unwrap();
        assert_eq!(
            state,
            PoolState {
                tick: 0,
                tick_spacing: 10,
                liquidity: 0,
                sqrt_price_x96: Q96,
            }
        );
    }

    #[tokio::test]
    async fn test_describe_pool() {
        let (a, b) = (Address::with_last_byte(1), Address::with_last_byte(2));
        let price = encode_sqrt_price(U256::from(1u8), U256::from(4u8)).unwrap();
        let chain = MockChain::new().with_pool(a, b, FeeTier::Medium, price);
        chain.state().decimals.insert(b, 6);
        let pool = chain.pool_address(a, b, 3000).unwrap();

        let summary = describe_pool(&chain, pool).await.unwrap();
        assert_eq!(summary.token0, a);
        assert_eq!(summary.token1, b);
        assert_eq!(summary.fee, 3000);
        assert_eq!(summary.tick_spacing, 60);
        assert_eq!(summary.price, "0.25");
        // 0.25 raw units of a 6-decimal token per raw unit of an 18-decimal token
        let adjusted = summary.adjusted_price.unwrap();
        assert!((adjusted - 0.25e12).abs() / 0.25e12 < 1e-9);
        assert!(summary.tick < 0);

        let json = serde_json::to_value(&summary).unwrap();
        assert_eq!(json["fee"], 3000);
    }

    #[tokio::test]
    async fn test_unknown_pool_fails() {
        let chain = MockChain::new();
        assert!(fetch_pool_state(&chain, Address::with_last_byte(9)).await.is_err());
    }
}

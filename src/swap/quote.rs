use alloy::primitives::{Address, U256};
use log::debug;

use crate::{
    chain::QuoteReader,
    error::{Error, Result},
    models::{ExactInputParams, SwapBound, SwapIntent},
};

/// Quote an exact-input swap and use the quote itself as the minimum output.
///
/// No margin is subtracted: a price move between quote and execution makes
/// the swap revert. Callers wanting tolerance apply [`SwapBound::discounted`].
/// Any failure of the quote call, typically a revert when the pool has no
/// liquidity in range, becomes [`Error::QuoteUnavailable`].
pub async fn quote_and_bound<Q: QuoteReader + ?Sized>(
    quoter: &Q,
    intent: &SwapIntent,
) -> Result<SwapBound> {
    let amount_out = quoter
        .quote_exact_input_single(
            intent.token_in,
            intent.token_out,
            intent.fee.fee(),
            intent.amount_in,
            U256::ZERO,
        )
        .await
        .map_err(|e| Error::QuoteUnavailable(e.to_string()))?;

    debug!(
        "Quoted {} {} -> {} {} (fee {})",
        intent.amount_in, intent.token_in, amount_out, intent.token_out, intent.fee
    );

    Ok(SwapBound {
        amount_out_minimum: amount_out,
    })
}

/// Router payload for `intent` with no price limit.
pub fn exact_input_params(
    intent: &SwapIntent,
    bound: SwapBound,
    recipient: Address,
    deadline: U256,
) -> ExactInputParams {
    ExactInputParams {
        token_in: intent.token_in,
        token_out: intent.token_out,
        fee: intent.fee.fee(),
        recipient,
        deadline,
        amount_in: intent.amount_in,
        amount_out_minimum: bound.amount_out_minimum,
        sqrt_price_limit_x96: U256::ZERO,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{chain::mock::MockChain, models::FeeTier};

    fn intent() -> SwapIntent {
        SwapIntent {
            token_in: Address::with_last_byte(1),
            token_out: Address::with_last_byte(2),
            fee: FeeTier::Medium,
            amount_in: U256::from(1_000_000u64),
        }
    }

    #[tokio::test]
    async fn test_quote_is_the_bound() {
        let chain = MockChain::new();
        chain.state().quote = Some(U256::from(996_006u64));

        let bound = quote_and_bound(&chain, &intent()).await.unwrap();
        assert_eq!(bound.amount_out_minimum, U256::from(996_006u64));
    }

    #[tokio::test]
    async fn test_reverting_quoter_is_unavailable() {
        let chain = MockChain::new();
        chain.state().quote = None;

        let err = quote_and_bound(&chain, &intent()).await.unwrap_err();
        assert!(matches!(err, Error::QuoteUnavailable(_)));
    }

    #[test]
    fn test_exact_input_params() {
        let bound = SwapBound {
            amount_out_minimum: U256::from(42u8),
        };
        let params = exact_input_params(&intent(), bound, Address::with_last_byte(9), U256::from(5u8));

        assert_eq!(params.fee, 3000);
        assert_eq!(params.amount_in, U256::from(1_000_000u64));
        assert_eq!(params.amount_out_minimum, U256::from(42u8));
        assert_eq!(params.sqrt_price_limit_x96, U256::ZERO);
        assert_eq!(params.recipient, Address::with_last_byte(9));
    }
}

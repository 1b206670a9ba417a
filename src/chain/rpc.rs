use alloy::{
    primitives::{
        aliases::{I24, U160, U24},
        ruint::UintTryFrom,
        Address, U256,
    },
    providers::{DynProvider, ProviderBuilder},
    rpc::types::TransactionReceipt,
    signers::local::PrivateKeySigner,
    sol_types::SolEvent,
};
use async_trait::async_trait;
use log::debug;
use url::Url;

use super::{
    FactoryReader, PoolReader, PositionManagerReader, PositionManagerWriter, QuoteReader,
    RouterWriter, Slot0, TokenReader, TokenWriter,
};
use crate::{
    abis::{
        periphery::{INonfungiblePositionManager as Npm, ISwapRouter},
        IQuoter, IUniswapV3Factory, IUniswapV3Pool, IERC20,
    },
    config::ContractSettings,
    error::{Error, Result},
    models::{
        CollectOutcome, CollectParams, DecreaseParams, ExactInputParams, IncreaseParams,
        LiquidityOutcome, MintOutcome, MintParams, PositionInfo, TxOutcome,
    },
};

/// Signing client for a single chain, implementing every port.
#[derive(Clone)]
pub struct RpcClient {
    provider: DynProvider,
    signer: Address,
    contracts: ContractSettings,
}

impl RpcClient {
    pub fn new(rpc_url: Url, signer: PrivateKeySigner, contracts: ContractSettings) -> Self {
        let address = signer.address();

        let client = ProviderBuilder::new().wallet(signer).connect_http(rpc_url);

        let provider = DynProvider::new(client);

        Self {
            provider,
            signer: address,
            contracts,
        }
    }

    /// Address that signs every write
    pub fn signer(&self) -> Address {
        self.signer
    }
}

// ============================================
// Receipt Handling
// ============================================

fn tx_outcome(receipt: &TransactionReceipt, action: &'static str) -> Result<TxOutcome> {
    if !receipt.status() {
        return Err(Error::TransactionReverted {
            action,
            tx_hash: receipt.transaction_hash,
        });
    }

    debug!(
        "{} confirmed: tx={} block={:?} gas={}",
        action, receipt.transaction_hash, receipt.block_number, receipt.gas_used
    );

    Ok(TxOutcome {
        tx_hash: receipt.transaction_hash,
        block_number: receipt.block_number,
        gas_used: receipt.gas_used,
    })
}

/// First `E` emitted by `emitter` in the receipt
fn decode_event<E: SolEvent>(
    receipt: &TransactionReceipt,
    emitter: Address,
    event: &'static str,
) -> Result<E> {
    receipt
        .inner
        .logs()
        .iter()
        .filter(|log| log.address() == emitter)
        .find_map(|log| log.log_decode::<E>().ok())
        .map(|decoded| decoded.inner.data)
        .ok_or(Error::MissingEvent {
            event,
            tx_hash: receipt.transaction_hash,
        })
}

// ============================================
// ABI Conversions
// ============================================

fn to_i24(tick: i32) -> Result<I24> {
    I24::try_from(tick).map_err(|_| Error::TickOutOfRange {
        tick,
        tick_spacing: 1,
    })
}

fn from_i24(value: I24) -> Result<i32> {
    i32::try_from(value).map_err(|_| Error::Overflow)
}

fn to_u24(fee: u32) -> Result<U24> {
    U24::try_from(fee).map_err(|_| Error::UnsupportedFee(fee))
}

fn to_u160(sqrt_price_x96: U256) -> Result<U160> {
    U160::uint_try_from(sqrt_price_x96)
        .map_err(|_| Error::SqrtPriceOutOfRange(sqrt_price_x96.to_string()))
}

fn mint_call(params: &MintParams) -> Result<Npm::MintParams> {
    Ok(Npm::MintParams {
        token0: params.token0,
        token1: params.token1,
        fee: to_u24(params.fee)?,
        tickLower: to_i24(params.tick_lower)?,
        tickUpper: to_i24(params.tick_upper)?,
        amount0Desired: params.amount0_desired,
        amount1Desired: params.amount1_desired,
        amount0Min: params.amount0_min,
        amount1Min: params.amount1_min,
        recipient: params.recipient,
        deadline: params.deadline,
    })
}

// ============================================
// Port Implementations
// ============================================

#[async_trait]
impl FactoryReader for RpcClient {
    async fn get_pool(&self, token0: Address, token1: Address, fee: u32) -> Result<Address> {
        let factory = IUniswapV3Factory::new(self.contracts.factory, &self.provider);
        Ok(factory.getPool(token0, token1, to_u24(fee)?).call().await?)
    }
}

#[async_trait]
impl PositionManagerWriter for RpcClient {
    async fn create_and_initialize_pool_if_necessary(
        &self,
        token0: Address,
        token1: Address,
        fee: u32,
        sqrt_price_x96: U256,
    ) -> Result<TxOutcome> {
        let manager = Npm::new(self.contracts.position_manager, &self.provider);

        let receipt = manager
            .createAndInitializePoolIfNecessary(
                token0,
                token1,
                to_u24(fee)?,
                to_u160(sqrt_price_x96)?,
            )
            .send()
            .await
            .map_err(|e| Error::PoolCreationFailed(e.to_string()))?
            .get_receipt()
            .await
            .map_err(|e| Error::PoolCreationFailed(e.to_string()))?;

        if !receipt.status() {
            return Err(Error::PoolCreationFailed(format!(
                "transaction {} reverted",
                receipt.transaction_hash
            )));
        }

        // Absent when the pool already existed
        if let Ok(created) = decode_event::<IUniswapV3Factory::PoolCreated>(
            &receipt,
            self.contracts.factory,
            "PoolCreated",
        ) {
            debug!("Factory emitted PoolCreated for {}", created.pool);
        }

        tx_outcome(&receipt, "createAndInitializePoolIfNecessary")
    }

    async fn mint(&self, params: &MintParams) -> Result<MintOutcome> {
        let manager = Npm::new(self.contracts.position_manager, &self.provider);

        let receipt = manager.mint(mint_call(params)?).send().await?.get_receipt().await?;
        let tx = tx_outcome(&receipt, "mint")?;

        let event = decode_event::<Npm::IncreaseLiquidity>(
            &receipt,
            self.contracts.position_manager,
            "IncreaseLiquidity",
        )?;

        Ok(MintOutcome {
            tx,
            token_id: event.tokenId,
            liquidity: event.liquidity,
            amount0: event.amount0,
            amount1: event.amount1,
        })
    }

    async fn increase_liquidity(&self, params: &IncreaseParams) -> Result<LiquidityOutcome> {
        let manager = Npm::new(self.contracts.position_manager, &self.provider);

        let call = Npm::IncreaseLiquidityParams {
            tokenId: params.token_id,
            amount0Desired: params.amount0_desired,
            amount1Desired: params.amount1_desired,
            amount0Min: params.amount0_min,
            amount1Min: params.amount1_min,
            deadline: params.deadline,
        };

        let receipt = manager.increaseLiquidity(call).send().await?.get_receipt().await?;
        let tx = tx_outcome(&receipt, "increaseLiquidity")?;

        let event = decode_event::<Npm::IncreaseLiquidity>(
            &receipt,
            self.contracts.position_manager,
            "IncreaseLiquidity",
        )?;

        Ok(LiquidityOutcome {
            tx,
            token_id: event.tokenId,
            liquidity: event.liquidity,
            amount0: event.amount0,
            amount1: event.amount1,
        })
    }

    async fn decrease_liquidity(&self, params: &DecreaseParams) -> Result<LiquidityOutcome> {
        let manager = Npm::new(self.contracts.position_manager, &self.provider);

        let call = Npm::DecreaseLiquidityParams {
            tokenId: params.token_id,
            liquidity: params.liquidity,
            amount0Min: params.amount0_min,
            amount1Min: params.amount1_min,
            deadline: params.deadline,
        };

        let receipt = manager.decreaseLiquidity(call).send().await?.get_receipt().await?;
        let tx = tx_outcome(&receipt, "decreaseLiquidity")?;

        let event = decode_event::<Npm::DecreaseLiquidity>(
            &receipt,
            self.contracts.position_manager,
            "DecreaseLiquidity",
        )?;

        Ok(LiquidityOutcome {
            tx,
            token_id: event.tokenId,
            liquidity: event.liquidity,
            amount0: event.amount0,
            amount1: event.amount1,
        })
    }

    async fn collect(&self, params: &CollectParams) -> Result<CollectOutcome> {
        let manager = Npm::new(self.contracts.position_manager, &self.provider);

        let call = Npm::CollectParams {
            tokenId: params.token_id,
            recipient: params.recipient,
            amount0Max: params.amount0_max,
            amount1Max: params.amount1_max,
        };

        let receipt = manager.collect(call).send().await?.get_receipt().await?;
        let tx = tx_outcome(&receipt, "collect")?;

        let event =
            decode_event::<Npm::Collect>(&receipt, self.contracts.position_manager, "Collect")?;

        Ok(CollectOutcome {
            tx,
            recipient: event.recipient,
            amount0: event.amount0,
            amount1: event.amount1,
        })
    }
}

#[async_trait]
impl PositionManagerReader for RpcClient {
    async fn positions(&self, token_id: U256) -> Result<PositionInfo> {
        let manager = Npm::new(self.contracts.position_manager, &self.provider);
        let position = manager.positions(token_id).call().await?;

        Ok(PositionInfo {
            token_id,
            token0: position.token0,
            token1: position.token1,
            fee: position.fee.to::<u32>(),
            tick_lower: from_i24(position.tickLower)?,
            tick_upper: from_i24(position.tickUpper)?,
            liquidity: position.liquidity,
            fee_growth_inside0_last_x128: position.feeGrowthInside0LastX128,
            fee_growth_inside1_last_x128: position.feeGrowthInside1LastX128,
            tokens_owed0: position.tokensOwed0,
            tokens_owed1: position.tokensOwed1,
        })
    }

    async fn balance_of(&self, owner: Address) -> Result<U256> {
        let manager = Npm::new(self.contracts.position_manager, &self.provider);
        Ok(manager.balanceOf(owner).call().await?)
    }

    async fn token_of_owner_by_index(&self, owner: Address, index: U256) -> Result<U256> {
        let manager = Npm::new(self.contracts.position_manager, &self.provider);
        Ok(manager.tokenOfOwnerByIndex(owner, index).call().await?)
    }
}

#[async_trait]
impl PoolReader for RpcClient {
    async fn slot0(&self, pool: Address) -> Result<Slot0> {
        let slot = IUniswapV3Pool::new(pool, &self.provider).slot0().call().await?;

        Ok(Slot0 {
            sqrt_price_x96: U256::from(slot.sqrtPriceX96),
            tick: from_i24(slot.tick)?,
        })
    }

    async fn liquidity(&self, pool: Address) -> Result<u128> {
        Ok(IUniswapV3Pool::new(pool, &self.provider).liquidity().call().await?)
    }

    async fn tick_spacing(&self, pool: Address) -> Result<i32> {
        let spacing = IUniswapV3Pool::new(pool, &self.provider).tickSpacing().call().await?;
        from_i24(spacing)
    }

    async fn fee(&self, pool: Address) -> Result<u32> {
        let fee = IUniswapV3Pool::new(pool, &self.provider).fee().call().await?;
        Ok(fee.to::<u32>())
    }

    async fn token0(&self, pool: Address) -> Result<Address> {
        Ok(IUniswapV3Pool::new(pool, &self.provider).token0().call().await?)
    }

    async fn token1(&self, pool: Address) -> Result<Address> {
        Ok(IUniswapV3Pool::new(pool, &self.provider).token1().call().await?)
    }
}

#[async_trait]
impl QuoteReader for RpcClient {
    async fn quote_exact_input_single(
        &self,
        token_in: Address,
        token_out: Address,
        fee: u32,
        amount_in: U256,
        sqrt_price_limit_x96: U256,
    ) -> Result<U256> {
        let quoter = IQuoter::new(self.contracts.quoter, &self.provider);

        Ok(quoter
            .quoteExactInputSingle(
                token_in,
                token_out,
                to_u24(fee)?,
                amount_in,
                to_u160(sqrt_price_limit_x96)?,
            )
            .call()
            .await?)
    }
}

#[async_trait]
impl RouterWriter for RpcClient {
    async fn exact_input_single(&self, params: &ExactInputParams) -> Result<TxOutcome> {
        let router = ISwapRouter::new(self.contracts.router, &self.provider);

        let call = ISwapRouter::ExactInputSingleParams {
            tokenIn: params.token_in,
            tokenOut: params.token_out,
            fee: to_u24(params.fee)?,
            recipient: params.recipient,
            deadline: params.deadline,
            amountIn: params.amount_in,
            amountOutMinimum: params.amount_out_minimum,
            sqrtPriceLimitX96: to_u160(params.sqrt_price_limit_x96)?,
        };

        let receipt = router.exactInputSingle(call).send().await?.get_receipt().await?;
        tx_outcome(&receipt, "exactInputSingle")
    }
}

#[async_trait]
impl TokenReader for RpcClient {
    async fn decimals(&self, token: Address) -> Result<u8> {
        Ok(IERC20::new(token, &self.provider).decimals().call().await?)
    }
}

#[async_trait]
impl TokenWriter for RpcClient {
    async fn allowance(&self, token: Address, owner: Address, spender: Address) -> Result<U256> {
        Ok(IERC20::new(token, &self.provider).allowance(owner, spender).call().await?)
    }

    async fn approve(&self, token: Address, spender: Address, amount: U256) -> Result<TxOutcome> {
        let receipt = IERC20::new(token, &self.provider)
            .approve(spender, amount)
            .send()
            .await?
            .get_receipt()
            .await?;

        tx_outcome(&receipt, "approve")
    }
}

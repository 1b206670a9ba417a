//! In-memory chain for exercising the ports without a node.

use std::collections::{BTreeMap, HashMap};
use std::sync::Mutex;

use alloy::primitives::{Address, B256, U256};
use async_trait::async_trait;

use super::{
    FactoryReader, PoolReader, PositionManagerReader, PositionManagerWriter, QuoteReader,
    RouterWriter, Slot0, TokenReader, TokenWriter,
};
use crate::{
    error::{Error, Result},
    models::{
        CollectOutcome, CollectParams, DecreaseParams, ExactInputParams, FeeTier, IncreaseParams,
        LiquidityOutcome, MintOutcome, MintParams, PositionInfo, TxOutcome,
    },
    utils::{get_sqrt_ratio_at_tick, get_tick_at_sqrt_ratio, max_liquidity_for_amounts},
};

#[derive(Debug, Clone)]
pub struct MockPool {
    pub token0: Address,
    pub token1: Address,
    pub fee: u32,
    pub tick_spacing: i32,
    pub liquidity: u128,
    pub slot0: Slot0,
}

#[derive(Debug, Default)]
pub struct MockState {
    pub pools: HashMap<(Address, Address, u32), Address>,
    pub pool_data: HashMap<Address, MockPool>,
    pub positions: BTreeMap<U256, PositionInfo>,
    pub owners: BTreeMap<U256, Address>,
    pub allowances: HashMap<(Address, Address), U256>,
    /// Token decimals, 18 when absent
    pub decimals: HashMap<Address, u8>,

    pub get_pool_calls: usize,
    pub create_calls: usize,
    pub approvals: Vec<(Address, Address, U256)>,
    pub mints: Vec<MintParams>,
    pub increases: Vec<IncreaseParams>,
    pub decreases: Vec<DecreaseParams>,
    pub collects: Vec<CollectParams>,
    pub swaps: Vec<ExactInputParams>,

    pub revert_get_pool: bool,
    pub revert_create: bool,
    /// Quote returned by the quoter, `None` makes it revert
    pub quote: Option<U256>,
    pub next_token_id: u64,
    pub tx_count: u64,
}

/// Chain double. Writes succeed immediately and are applied to the state.
pub struct MockChain {
    pub signer: Address,
    pub state: Mutex<MockState>,
}

impl MockChain {
    pub fn new() -> Self {
        Self {
            signer: Address::with_last_byte(0xee),
            state: Mutex::new(MockState {
                next_token_id: 1,
                ..Default::default()
            }),
        }
    }

    /// Register an already-deployed pool at `sqrt_price_x96`.
    pub fn with_pool(
        self,
        token0: Address,
        token1: Address,
        fee: FeeTier,
        sqrt_price_x96: U256,
    ) -> Self {
        {
            let mut state = self.state.lock().unwrap();
            insert_pool(&mut state, token0, token1, fee.fee(), sqrt_price_x96).unwrap();
        }
        self
    }

    pub fn pool_address(&self, token0: Address, token1: Address, fee: u32) -> Option<Address> {
        self.state.lock().unwrap().pools.get(&(token0, token1, fee)).copied()
    }

    pub fn state(&self) -> std::sync::MutexGuard<'_, MockState> {
        self.state.lock().unwrap()
    }
}

fn insert_pool(
    state: &mut MockState,
    token0: Address,
    token1: Address,
    fee: u32,
    sqrt_price_x96: U256,
) -> Result<Address> {
    let tier = FeeTier::try_from(fee)?;
    let address = Address::with_last_byte(0x10 + state.pools.len() as u8);

    state.pools.insert((token0, token1, fee), address);
    state.pool_data.insert(
        address,
        MockPool {
            token0,
            token1,
            fee,
            tick_spacing: tier.tick_spacing(),
            liquidity: 0,
            slot0: Slot0 {
                sqrt_price_x96,
                tick: get_tick_at_sqrt_ratio(sqrt_price_x96)?,
            },
        },
    );

    Ok(address)
}

fn next_tx(state: &mut MockState) -> TxOutcome {
    state.tx_count += 1;
    TxOutcome {
        tx_hash: B256::with_last_byte(state.tx_count as u8),
        block_number: Some(state.tx_count),
        gas_used: 21_000,
    }
}

fn unknown_pool(pool: Address) -> Error {
    Error::ExternalCallFailed(format!("no contract at {pool}"))
}

#[async_trait]
impl FactoryReader for MockChain {
    async fn get_pool(&self, token0: Address, token1: Address, fee: u32) -> Result<Address> {
        let mut state = self.state.lock().unwrap();
        state.get_pool_calls += 1;

        if state.revert_get_pool {
            return Err(Error::ExternalCallFailed("execution reverted".to_string()));
        }

        Ok(state
            .pools
            .get(&(token0, token1, fee))
            .copied()
            .unwrap_or(Address::ZERO))
    }
}

#[async_trait]
impl PositionManagerWriter for MockChain {
    async fn create_and_initialize_pool_if_necessary(
        &self,
        token0: Address,
        token1: Address,
        fee: u32,
        sqrt_price_x96: U256,
    ) -> Result<TxOutcome> {
        let mut state = self.state.lock().unwrap();
        state.create_calls += 1;

        if state.revert_create {
            return Err(Error::PoolCreationFailed("execution reverted".to_string()));
        }

        // Mirrors the contract: an existing pool keeps its price
        if !state.pools.contains_key(&(token0, token1, fee)) {
            insert_pool(&mut state, token0, token1, fee, sqrt_price_x96)?;
        }

        Ok(next_tx(&mut state))
    }

    async fn mint(&self, params: &MintParams) -> Result<MintOutcome> {
        let mut state = self.state.lock().unwrap();
        state.mints.push(params.clone());

        let pool = state
            .pools
            .get(&(params.token0, params.token1, params.fee))
            .copied()
            .ok_or_else(|| Error::ExternalCallFailed("mint on missing pool".to_string()))?;
        let slot0 = state.pool_data[&pool].slot0;

        let liquidity = max_liquidity_for_amounts(
            slot0.sqrt_price_x96,
            get_sqrt_ratio_at_tick(params.tick_lower)?,
            get_sqrt_ratio_at_tick(params.tick_upper)?,
            params.amount0_desired,
            params.amount1_desired,
        )?;

        let token_id = U256::from(state.next_token_id);
        state.next_token_id += 1;

        state.positions.insert(
            token_id,
            PositionInfo {
                token_id,
                token0: params.token0,
                token1: params.token1,
                fee: params.fee,
                tick_lower: params.tick_lower,
                tick_upper: params.tick_upper,
                liquidity,
                fee_growth_inside0_last_x128: U256::ZERO,
                fee_growth_inside1_last_x128: U256::ZERO,
                tokens_owed0: 0,
                tokens_owed1: 0,
            },
        );
        state.owners.insert(token_id, params.recipient);

        Ok(MintOutcome {
            tx: next_tx(&mut state),
            token_id,
            liquidity,
            amount0: params.amount0_desired,
            amount1: params.amount1_desired,
        })
    }

    async fn increase_liquidity(&self, params: &IncreaseParams) -> Result<LiquidityOutcome> {
        let mut state = self.state.lock().unwrap();
        state.increases.push(params.clone());

        let position = state
            .positions
            .get(&params.token_id)
            .cloned()
            .ok_or_else(|| Error::ExternalCallFailed("invalid token id".to_string()))?;
        let pool = state.pools[&(position.token0, position.token1, position.fee)];
        let slot0 = state.pool_data[&pool].slot0;

        let added = max_liquidity_for_amounts(
            slot0.sqrt_price_x96,
            get_sqrt_ratio_at_tick(position.tick_lower)?,
            get_sqrt_ratio_at_tick(position.tick_upper)?,
            params.amount0_desired,
            params.amount1_desired,
        )?;

        if let Some(stored) = state.positions.get_mut(&params.token_id) {
            stored.liquidity += added;
        }

        Ok(LiquidityOutcome {
            tx: next_tx(&mut state),
            token_id: params.token_id,
            liquidity: added,
            amount0: params.amount0_desired,
            amount1: params.amount1_desired,
        })
    }

    async fn decrease_liquidity(&self, params: &DecreaseParams) -> Result<LiquidityOutcome> {
        let mut state = self.state.lock().unwrap();
        state.decreases.push(params.clone());

        let position = state
            .positions
            .get_mut(&params.token_id)
            .ok_or_else(|| Error::ExternalCallFailed("invalid token id".to_string()))?;

        if params.liquidity > position.liquidity {
            return Err(Error::ExternalCallFailed("insufficient liquidity".to_string()));
        }
        position.liquidity -= params.liquidity;
        position.tokens_owed0 += params.amount0_min.to::<u128>();
        position.tokens_owed1 += params.amount1_min.to::<u128>();

        Ok(LiquidityOutcome {
            tx: next_tx(&mut state),
            token_id: params.token_id,
            liquidity: params.liquidity,
            amount0: params.amount0_min,
            amount1: params.amount1_min,
        })
    }

    async fn collect(&self, params: &CollectParams) -> Result<CollectOutcome> {
        let mut state = self.state.lock().unwrap();
        state.collects.push(params.clone());

        let position = state
            .positions
            .get_mut(&params.token_id)
            .ok_or_else(|| Error::ExternalCallFailed("invalid token id".to_string()))?;

        let amount0 = position.tokens_owed0.min(params.amount0_max);
        let amount1 = position.tokens_owed1.min(params.amount1_max);
        position.tokens_owed0 -= amount0;
        position.tokens_owed1 -= amount1;

        Ok(CollectOutcome {
            tx: next_tx(&mut state),
            recipient: params.recipient,
            amount0: U256::from(amount0),
            amount1: U256::from(amount1),
        })
    }
}

#[async_trait]
impl PositionManagerReader for MockChain {
    async fn positions(&self, token_id: U256) -> Result<PositionInfo> {
        self.state
            .lock()
            .unwrap()
            .positions
            .get(&token_id)
            .cloned()
            .ok_or_else(|| Error::ExternalCallFailed("invalid token id".to_string()))
    }

    async fn balance_of(&self, owner: Address) -> Result<U256> {
        let state = self.state.lock().unwrap();
        Ok(U256::from(state.owners.values().filter(|o| **o == owner).count()))
    }

    async fn token_of_owner_by_index(&self, owner: Address, index: U256) -> Result<U256> {
        let state = self.state.lock().unwrap();
        state
            .owners
            .iter()
            .filter(|(_, o)| **o == owner)
            .nth(index.to::<usize>())
            .map(|(id, _)| *id)
            .ok_or_else(|| Error::ExternalCallFailed("owner index out of bounds".to_string()))
    }
}

#[async_trait]
impl PoolReader for MockChain {
    async fn slot0(&self, pool: Address) -> Result<Slot0> {
        let state = self.state.lock().unwrap();
        state.pool_data.get(&pool).map(|p| p.slot0).ok_or_else(|| unknown_pool(pool))
    }

    async fn liquidity(&self, pool: Address) -> Result<u128> {
        let state = self.state.lock().unwrap();
        state.pool_data.get(&pool).map(|p| p.liquidity).ok_or_else(|| unknown_pool(pool))
    }

    async fn tick_spacing(&self, pool: Address) -> Result<i32> {
        let state = self.state.lock().unwrap();
        state.pool_data.get(&pool).map(|p| p.tick_spacing).ok_or_else(|| unknown_pool(pool))
    }

    async fn fee(&self, pool: Address) -> Result<u32> {
        let state = self.state.lock().unwrap();
        state.pool_data.get(&pool).map(|p| p.fee).ok_or_else(|| unknown_pool(pool))
    }

    async fn token0(&self, pool: Address) -> Result<Address> {
        let state = self.state.lock().unwrap();
        state.pool_data.get(&pool).map(|p| p.token0).ok_or_else(|| unknown_pool(pool))
    }

    async fn token1(&self, pool: Address) -> Result<Address> {
        let state = self.state.lock().unwrap();
        state.pool_data.get(&pool).map(|p| p.token1).ok_or_else(|| unknown_pool(pool))
    }
}

#[async_trait]
impl QuoteReader for MockChain {
    async fn quote_exact_input_single(
        &self,
        _token_in: Address,
        _token_out: Address,
        _fee: u32,
        _amount_in: U256,
        _sqrt_price_limit_x96: U256,
    ) -> Result<U256> {
        self.state
            .lock()
            .unwrap()
            .quote
            .ok_or_else(|| Error::ExternalCallFailed("execution reverted: SPL".to_string()))
    }
}

#[async_trait]
impl RouterWriter for MockChain {
    async fn exact_input_single(&self, params: &ExactInputParams) -> Result<TxOutcome> {
        let mut state = self.state.lock().unwrap();
        state.swaps.push(params.clone());
        Ok(next_tx(&mut state))
    }
}

#[async_trait]
impl TokenReader for MockChain {
    async fn decimals(&self, token: Address) -> Result<u8> {
        Ok(self.state.lock().unwrap().decimals.get(&token).copied().unwrap_or(18))
    }
}

#[async_trait]
impl TokenWriter for MockChain {
    async fn allowance(&self, token: Address, _owner: Address, spender: Address) -> Result<U256> {
        let state = self.state.lock().unwrap();
        Ok(state.allowances.get(&(token, spender)).copied().unwrap_or_default())
    }

    async fn approve(&self, token: Address, spender: Address, amount: U256) -> Result<TxOutcome> {
        let mut state = self.state.lock().unwrap();
        state.approvals.push((token, spender, amount));
        state.allowances.insert((token, spender), amount);
        Ok(next_tx(&mut state))
    }
}

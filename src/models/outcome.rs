use alloy::primitives::{Address, B256, U256};
use serde::Serialize;

/// Receipt facts common to every confirmed write.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TxOutcome {
    pub tx_hash: B256,
    pub block_number: Option<u64>,
    pub gas_used: u64,
}

/// Result of a mint, decoded from the `IncreaseLiquidity` event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct MintOutcome {
    pub tx: TxOutcome,
    pub token_id: U256,
    pub liquidity: u128,
    pub amount0: U256,
    pub amount1: U256,
}

/// Result of an increase or decrease on an existing position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct LiquidityOutcome {
    pub tx: TxOutcome,
    pub token_id: U256,
    pub liquidity: u128,
    pub amount0: U256,
    pub amount1: U256,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CollectOutcome {
    pub tx: TxOutcome,
    pub recipient: Address,
    pub amount0: U256,
    pub amount1: U256,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SwapOutcome {
    pub tx: TxOutcome,
    pub amount_in: U256,
    pub amount_out_minimum: U256,
}

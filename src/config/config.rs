use alloy::primitives::{Address, U256};
use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;

use crate::{
    error::{Error, Result},
    models::{FeeTier, LiquidityTarget},
    utils::{parse_u128, parse_u256},
};

/// RPC endpoint and signer.
///
/// The private key is normally supplied through `TIDEPOOL__NETWORK__PRIVATE_KEY`
/// rather than written into `config.yaml`.
#[derive(Debug, Deserialize, Clone)]
#[serde(deny_unknown_fields)]
pub struct NetworkSettings {
    pub rpc_url: String,
    pub private_key: String,
    #[serde(default)]
    pub log_level: Option<String>,
}

/// Addresses of the already-deployed AMM periphery.
#[derive(Debug, Deserialize, Clone)]
#[serde(deny_unknown_fields)]
pub struct ContractSettings {
    pub factory: Address,
    pub position_manager: Address,
    pub quoter: Address,
    pub router: Address,
}

/// Fallbacks applied to every task that does not override them.
#[derive(Debug, Deserialize, Clone)]
#[serde(deny_unknown_fields)]
pub struct DefaultSettings {
    #[serde(default = "default_deadline_secs")]
    pub deadline_secs: u64,
    #[serde(default = "default_slippage_bps")]
    pub slippage_bps: u32,
    /// Tick spacings added on each side of the current tick for new positions
    #[serde(default = "default_range_width")]
    pub range_width: i32,
    /// Allowance granted to the position manager and router, in raw units
    #[serde(default = "default_approval_amount")]
    pub approval_amount: String,
}

impl Default for DefaultSettings {
    fn default() -> Self {
        Self {
            deadline_secs: default_deadline_secs(),
            slippage_bps: default_slippage_bps(),
            range_width: default_range_width(),
            approval_amount: default_approval_amount(),
        }
    }
}

fn default_deadline_secs() -> u64 {
    600
}

fn default_slippage_bps() -> u32 {
    50
}

fn default_range_width() -> i32 {
    2
}

fn default_approval_amount() -> String {
    U256::MAX.to_string()
}

fn default_price() -> [String; 2] {
    ["1".to_string(), "1".to_string()]
}

/// A pool to resolve or create.
#[derive(Debug, Deserialize, Clone)]
#[serde(deny_unknown_fields)]
pub struct PoolTask {
    pub name: String,
    pub token_a: Address,
    pub token_b: Address,
    pub fee: FeeTier,
    /// Initial price as `[numerator, denominator]`, token_b per token_a in raw units
    #[serde(default)]
    pub price: Option<[String; 2]>,
    /// Derive the initial price from two earlier pools that share a token
    #[serde(default)]
    pub price_from: Option<[String; 2]>,
}

impl PoolTask {
    /// The configured ratio, `1/1` when neither `price` nor `price_from` is set.
    pub fn price_ratio(&self) -> Result<(U256, U256)> {
        let [numerator, denominator] = self.price.clone().unwrap_or_else(default_price);
        Ok((parse_u256(&numerator)?, parse_u256(&denominator)?))
    }
}

#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum PositionAction {
    Mint,
    Increase,
    Decrease,
    Collect,
}

/// One position step against a named pool.
#[derive(Debug, Deserialize, Clone)]
#[serde(deny_unknown_fields)]
pub struct PositionTask {
    pub pool: String,
    pub action: PositionAction,
    #[serde(default)]
    pub liquidity: Option<String>,
    #[serde(default)]
    pub amount0: Option<String>,
    #[serde(default)]
    pub amount1: Option<String>,
    /// Defaults to the last position minted in this run
    #[serde(default)]
    pub token_id: Option<String>,
    #[serde(default)]
    pub fraction_bps: Option<u32>,
    #[serde(default)]
    pub range_width: Option<i32>,
    #[serde(default)]
    pub slippage_bps: Option<u32>,
    /// Collect owed tokens right after a decrease
    #[serde(default)]
    pub collect: bool,
}

impl PositionTask {
    /// Liquidity to add for mint/increase. `liquidity` wins over amounts.
    pub fn target(&self) -> Result<LiquidityTarget> {
        if let Some(liquidity) = &self.liquidity {
            return Ok(LiquidityTarget::Liquidity(parse_u128(liquidity)?));
        }

        match (&self.amount0, &self.amount1) {
            (None, None) => Err(Error::InvalidSetting(format!(
                "{:?} on pool '{}' needs liquidity or amount0/amount1",
                self.action, self.pool
            ))),
            (amount0, amount1) => Ok(LiquidityTarget::Amounts {
                amount0: amount0.as_deref().map(parse_u256).transpose()?.unwrap_or_default(),
                amount1: amount1.as_deref().map(parse_u256).transpose()?.unwrap_or_default(),
            }),
        }
    }

    pub fn token_id(&self) -> Result<Option<U256>> {
        self.token_id.as_deref().map(parse_u256).transpose()
    }
}

/// A single-hop exact-input swap.
#[derive(Debug, Deserialize, Clone)]
#[serde(deny_unknown_fields)]
pub struct SwapTask {
    pub token_in: Address,
    pub token_out: Address,
    pub fee: FeeTier,
    pub amount_in: String,
    /// Discount applied to the quote. Without it the raw quote is the bound.
    #[serde(default)]
    pub slippage_bps: Option<u32>,
}

/// Root application configuration.
///
/// Loaded from `config.yaml`, then overlaid with `TIDEPOOL__*` environment variables.
#[derive(Debug, Deserialize, Clone)]
#[serde(deny_unknown_fields)]
pub struct Settings {
    pub network: NetworkSettings,
    pub contracts: ContractSettings,
    #[serde(default)]
    pub defaults: DefaultSettings,
    #[serde(default)]
    pub pools: Vec<PoolTask>,
    #[serde(default)]
    pub positions: Vec<PositionTask>,
    #[serde(default)]
    pub swaps: Vec<SwapTask>,
}

impl Settings {
    pub fn new() -> Result<Self, ConfigError> {
        let s = Config::builder()
            .add_source(File::with_name("config"))
            .add_source(Environment::with_prefix("TIDEPOOL").separator("__"))
            .build()?;

        let settings: Settings = s.try_deserialize()?;

        Ok(settings)
    }

    pub fn pool(&self, name: &str) -> Option<&PoolTask> {
        self.pools.iter().find(|pool| pool.name == name)
    }
}

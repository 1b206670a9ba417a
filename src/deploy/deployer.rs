use std::collections::BTreeMap;

use alloy::primitives::{Address, U256};
use chrono::Utc;
use log::{debug, info};
use serde::Serialize;

use crate::{
    chain::ChainClient,
    config::{PoolTask, PositionAction, PositionTask, Settings, SwapTask},
    error::{Error, Result},
    models::{
        CollectOutcome, LiquidityOutcome, MintOutcome, PoolConfig, PositionInfo, SwapIntent,
        SwapOutcome,
    },
    pool::{describe_pool, fetch_pool_state, PoolResolver},
    position::{list_positions, PositionCalculator},
    swap::{exact_input_params, quote_and_bound},
    utils::{cross_sqrt_price, encode_sqrt_price, parse_u256, sqrt_value_in_shared_token},
};

/// Unix timestamp `secs` from now, as a contract deadline
pub fn deadline_after(secs: u64) -> U256 {
    let now = u64::try_from(Utc::now().timestamp()).unwrap_or_default();
    U256::from(now.saturating_add(secs))
}

/// `POOL_<NAME>_ADDRESS` for a configured pool name
pub fn pool_env_key(name: &str) -> String {
    let name: String = name
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() { c.to_ascii_uppercase() } else { '_' })
        .collect();
    format!("POOL_{name}_ADDRESS")
}

/// A pool resolved during this run
#[derive(Debug, Clone, Copy)]
pub struct Deployment {
    pub config: PoolConfig,
    pub address: Address,
}

/// Everything a run produced, in execution order
#[derive(Debug, Default, Serialize)]
pub struct DeploymentReport {
    pub pools: BTreeMap<String, Address>,
    pub mints: Vec<MintOutcome>,
    pub increases: Vec<LiquidityOutcome>,
    pub decreases: Vec<LiquidityOutcome>,
    pub collects: Vec<CollectOutcome>,
    pub swaps: Vec<SwapOutcome>,
    pub positions: Vec<PositionInfo>,
}

/// Runs the configured pools, position steps and swaps strictly in sequence.
///
/// Any error aborts the run. Re-running is safe: pools that already exist
/// are reused as they are.
pub struct Deployer<'a, C: ?Sized> {
    chain: &'a C,
    settings: &'a Settings,
    owner: Address,
    deployments: BTreeMap<String, Deployment>,
    last_token_id: Option<U256>,
    report: DeploymentReport,
}

impl<'a, C: ChainClient + ?Sized> Deployer<'a, C> {
    pub fn new(chain: &'a C, settings: &'a Settings, owner: Address) -> Self {
        Self {
            chain,
            settings,
            owner,
            deployments: BTreeMap::new(),
            last_token_id: None,
            report: DeploymentReport::default(),
        }
    }

    pub async fn run(mut self) -> Result<DeploymentReport> {
        let settings = self.settings;

        for task in &settings.pools {
            self.deploy_pool(task).await?;
        }

        for task in &settings.positions {
            self.run_position(task).await?;
        }

        for task in &settings.swaps {
            self.run_swap(task).await?;
        }

        let positions = list_positions(self.chain, self.owner).await?;
        for position in &positions {
            info!(
                "Position: {}",
                serde_json::to_string(position).unwrap_or_else(|_| format!("{position:?}"))
            );
        }
        self.report.positions = positions;

        Ok(self.report)
    }

    // ============================================
    // Pools
    // ============================================

    async fn deploy_pool(&mut self, task: &PoolTask) -> Result<()> {
        let config = PoolConfig::new(task.token_a, task.token_b, task.fee)?;
        let init_sqrt_price_x96 = self.initial_sqrt_price(task, &config).await?;

        let resolver = PoolResolver::new(self.chain, self.chain);
        let address = resolver.resolve_or_create(&config, init_sqrt_price_x96).await?;

        info!("{}={}", pool_env_key(&task.name), address);
        let summary = describe_pool(self.chain, address).await?;
        info!(
            "Pool {}: {}",
            task.name,
            serde_json::to_string(&summary).unwrap_or_else(|_| format!("{summary:?}"))
        );

        self.deployments
            .insert(task.name.clone(), Deployment { config, address });
        self.report.pools.insert(task.name.clone(), address);

        Ok(())
    }

    /// Configured price as sqrtPriceX96 in canonical (token1 per token0) orientation.
    async fn initial_sqrt_price(&self, task: &PoolTask, config: &PoolConfig) -> Result<U256> {
        if let Some([via_a, via_b]) = &task.price_from {
            return self.cross_price(task, config, via_a, via_b).await;
        }

        // price is token_b per token_a
        let (numerator, denominator) = task.price_ratio()?;
        if config.is_inverted(task.token_a) {
            encode_sqrt_price(denominator, numerator)
        } else {
            encode_sqrt_price(numerator, denominator)
        }
    }

    /// Price an A/B pool from an earlier W/A pool and an earlier W/B pool.
    async fn cross_price(
        &self,
        task: &PoolTask,
        config: &PoolConfig,
        via_a: &str,
        via_b: &str,
    ) -> Result<U256> {
        let pool_a = self.deployment(via_a)?;
        let pool_b = self.deployment(via_b)?;

        let shared = shared_token(&pool_a.config, &pool_b.config).ok_or_else(|| {
            Error::InvalidSetting(format!("pools '{via_a}' and '{via_b}' share no token"))
        })?;

        let other = |pool: &PoolConfig| {
            if pool.token0() == shared {
                pool.token1()
            } else {
                pool.token0()
            }
        };
        if other(&pool_a.config) != task.token_a || other(&pool_b.config) != task.token_b {
            return Err(Error::InvalidSetting(format!(
                "pool '{}' must pair the non-shared tokens of '{via_a}' and '{via_b}'",
                task.name
            )));
        }

        let state_a = fetch_pool_state(self.chain, pool_a.address).await?;
        let state_b = fetch_pool_state(self.chain, pool_b.address).await?;

        let value_a =
            sqrt_value_in_shared_token(state_a.sqrt_price_x96, pool_a.config.token0() == shared)?;
        let value_b =
            sqrt_value_in_shared_token(state_b.sqrt_price_x96, pool_b.config.token0() == shared)?;

        if config.is_inverted(task.token_a) {
            cross_sqrt_price(value_b, value_a)
        } else {
            cross_sqrt_price(value_a, value_b)
        }
    }

    fn deployment(&self, name: &str) -> Result<Deployment> {
        self.deployments
            .get(name)
            .copied()
            .ok_or_else(|| match self.settings.pool(name) {
                Some(_) => Error::InvalidSetting(format!("pool '{name}' is not deployed yet")),
                None => Error::InvalidSetting(format!("unknown pool '{name}'")),
            })
    }

    // ============================================
    // Positions
    // ============================================

    async fn run_position(&mut self, task: &PositionTask) -> Result<()> {
        let settings = self.settings;
        let defaults = &settings.defaults;
        let deployment = self.deployment(&task.pool)?;

        // Fresh read: an earlier step may have moved the price
        let state = fetch_pool_state(self.chain, deployment.address).await?;
        let calculator = PositionCalculator::new(
            task.slippage_bps.unwrap_or(defaults.slippage_bps),
            self.owner,
            deadline_after(defaults.deadline_secs),
        )?;
        let position_manager = settings.contracts.position_manager;

        match task.action {
            PositionAction::Mint => {
                let params = calculator.plan_mint(
                    &state,
                    &deployment.config,
                    task.target()?,
                    task.range_width.unwrap_or(defaults.range_width),
                )?;

                self.ensure_allowance(params.token0, position_manager, params.amount0_desired)
                    .await?;
                self.ensure_allowance(params.token1, position_manager, params.amount1_desired)
                    .await?;

                let outcome = self.chain.mint(&params).await?;
                info!(
                    "Minted position {} on {}: liquidity={} amount0={} amount1={}",
                    outcome.token_id, task.pool, outcome.liquidity, outcome.amount0, outcome.amount1
                );

                self.last_token_id = Some(outcome.token_id);
                self.report.mints.push(outcome);
            }
            PositionAction::Increase => {
                let position = self.position(task).await?;
                let params = calculator.plan_increase(&state, &position, task.target()?)?;

                self.ensure_allowance(position.token0, position_manager, params.amount0_desired)
                    .await?;
                self.ensure_allowance(position.token1, position_manager, params.amount1_desired)
                    .await?;

                let outcome = self.chain.increase_liquidity(&params).await?;
                info!(
                    "Increased position {} by {}: amount0={} amount1={}",
                    outcome.token_id, outcome.liquidity, outcome.amount0, outcome.amount1
                );
                self.report.increases.push(outcome);
            }
            PositionAction::Decrease => {
                let fraction_bps = task.fraction_bps.ok_or_else(|| {
                    Error::InvalidSetting(format!("decrease on pool '{}' needs fraction_bps", task.pool))
                })?;
                let position = self.position(task).await?;
                let params = calculator.plan_decrease(&state, &position, fraction_bps)?;

                let outcome = self.chain.decrease_liquidity(&params).await?;
                info!(
                    "Decreased position {} by {}: amount0={} amount1={}",
                    outcome.token_id, outcome.liquidity, outcome.amount0, outcome.amount1
                );
                self.report.decreases.push(outcome);

                if task.collect {
                    self.collect(&calculator, position.token_id).await?;
                }
            }
            PositionAction::Collect => {
                let token_id = self.token_id(task)?;
                self.collect(&calculator, token_id).await?;
            }
        }

        Ok(())
    }

    async fn collect(&mut self, calculator: &PositionCalculator, token_id: U256) -> Result<()> {
        let outcome = self.chain.collect(&calculator.plan_collect(token_id)).await?;
        info!(
            "Collected from position {}: amount0={} amount1={}",
            token_id, outcome.amount0, outcome.amount1
        );
        self.report.collects.push(outcome);
        Ok(())
    }

    fn token_id(&self, task: &PositionTask) -> Result<U256> {
        task.token_id()?.or(self.last_token_id).ok_or_else(|| {
            Error::InvalidSetting(format!(
                "{:?} on pool '{}' needs token_id or an earlier mint",
                task.action, task.pool
            ))
        })
    }

    async fn position(&self, task: &PositionTask) -> Result<PositionInfo> {
        let token_id = self.token_id(task)?;
        self.chain.positions(token_id).await
    }

    // ============================================
    // Swaps
    // ============================================

    async fn run_swap(&mut self, task: &SwapTask) -> Result<()> {
        let settings = self.settings;
        let defaults = &settings.defaults;
        let intent = SwapIntent {
            token_in: task.token_in,
            token_out: task.token_out,
            fee: task.fee,
            amount_in: parse_u256(&task.amount_in)?,
        };

        let mut bound = quote_and_bound(self.chain, &intent).await?;
        if let Some(slippage_bps) = task.slippage_bps {
            bound = bound.discounted(slippage_bps)?;
        }

        self.ensure_allowance(intent.token_in, settings.contracts.router, intent.amount_in)
            .await?;

        let params = exact_input_params(
            &intent,
            bound,
            self.owner,
            deadline_after(defaults.deadline_secs),
        );
        let tx = self.chain.exact_input_single(&params).await?;
        info!(
            "Swapped {} {} for at least {} {} (tx {})",
            intent.amount_in, intent.token_in, bound.amount_out_minimum, intent.token_out, tx.tx_hash
        );

        self.report.swaps.push(SwapOutcome {
            tx,
            amount_in: intent.amount_in,
            amount_out_minimum: bound.amount_out_minimum,
        });

        Ok(())
    }

    // ============================================
    // Approvals
    // ============================================

    /// Approve `spender` for the configured amount when the allowance is short.
    async fn ensure_allowance(&self, token: Address, spender: Address, needed: U256) -> Result<()> {
        if needed.is_zero() {
            return Ok(());
        }

        let allowance = self.chain.allowance(token, self.owner, spender).await?;
        if allowance >= needed {
            debug!("Allowance of {} for {} already covers {}", token, spender, needed);
            return Ok(());
        }

        let amount = parse_u256(&self.settings.defaults.approval_amount)?.max(needed);
        let tx = self.chain.approve(token, spender, amount).await?;
        info!("Approved {} of {} for {} (tx {})", amount, token, spender, tx.tx_hash);

        Ok(())
    }
}

fn shared_token(a: &PoolConfig, b: &PoolConfig) -> Option<Address> {
    [a.token0(), a.token1()]
        .into_iter()
        .find(|token| *token == b.token0() || *token == b.token1())
}

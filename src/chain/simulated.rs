//! Simulated chain backend
//!
//! Serves a deterministic token/pool dataset with configurable latency and
//! failure injection, in both disciplines: the async client waits on tokio
//! timers, the blocking client sleeps the calling thread.

use async_trait::async_trait;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

use crate::models::{
    normalize_address, ChainMethod, Pool, PoolEpoch, Price, Quote, SwapPool, Token,
};

use super::{AsyncChain, ChainBackend, ChainError, SyncChain};

/// Wrapped native token address shared by OP-stack chains
const WRAPPED_NATIVE: &str = "0x4200000000000000000000000000000000000006";

/// Seconds per rewards epoch
const EPOCH_SECS: u64 = 7 * 24 * 3600;

/// First epoch timestamp of the simulated dataset
const GENESIS_EPOCH_TS: u64 = 1_700_000_000;

/// Simulated backend settings
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SimulatedProfile {
    /// Backend label
    pub name: String,

    /// Chain ID reported on tokens
    #[serde(default = "default_chain_id")]
    pub chain_id: String,

    /// Symbol of the native token
    #[serde(default = "default_native_symbol")]
    pub native_symbol: String,

    /// Client construction latency
    #[serde(default)]
    pub connect_latency_ms: u64,

    /// Fixed per-operation latency
    #[serde(default = "default_base_latency")]
    pub base_latency_ms: u64,

    /// Upper bound of uniform jitter added to each operation
    #[serde(default)]
    pub jitter_ms: u64,

    /// Probability (0.0 - 1.0) that any operation fails
    #[serde(default)]
    pub failure_rate: f64,

    /// Operations that always fail
    #[serde(default)]
    pub fail_methods: Vec<ChainMethod>,

    /// Client construction always fails
    #[serde(default)]
    pub fail_connect: bool,

    /// Client release always fails
    #[serde(default)]
    pub fail_release: bool,

    /// Number of listed tokens (the first is native)
    #[serde(default = "default_token_count")]
    pub token_count: usize,

    /// Number of pools
    #[serde(default = "default_pool_count")]
    pub pool_count: usize,

    /// Epoch history per pool
    #[serde(default = "default_epoch_count")]
    pub epoch_count: usize,
}

fn default_chain_id() -> String {
    "10".to_string()
}

fn default_native_symbol() -> String {
    "ETH".to_string()
}

fn default_base_latency() -> u64 {
    20
}

fn default_token_count() -> usize {
    25
}

fn default_pool_count() -> usize {
    40
}

fn default_epoch_count() -> usize {
    12
}

impl SimulatedProfile {
    /// Zero-latency, failure-free profile
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            chain_id: default_chain_id(),
            native_symbol: default_native_symbol(),
            connect_latency_ms: 0,
            base_latency_ms: 0,
            jitter_ms: 0,
            failure_rate: 0.0,
            fail_methods: Vec::new(),
            fail_connect: false,
            fail_release: false,
            token_count: default_token_count(),
            pool_count: default_pool_count(),
            epoch_count: default_epoch_count(),
        }
    }

    /// OP Mainnet-like defaults
    pub fn op() -> Self {
        Self {
            chain_id: "10".to_string(),
            connect_latency_ms: 5,
            base_latency_ms: 20,
            jitter_ms: 10,
            ..Self::new("OP")
        }
    }

    /// Base-like defaults
    pub fn base() -> Self {
        Self {
            chain_id: "8453".to_string(),
            connect_latency_ms: 5,
            base_latency_ms: 25,
            jitter_ms: 15,
            token_count: 30,
            pool_count: 60,
            ..Self::new("Base")
        }
    }

    pub fn with_chain_id(mut self, chain_id: impl Into<String>) -> Self {
        self.chain_id = chain_id.into();
        self
    }

    pub fn with_latency(mut self, base_ms: u64, jitter_ms: u64) -> Self {
        self.base_latency_ms = base_ms;
        self.jitter_ms = jitter_ms;
        self
    }

    pub fn with_tokens(mut self, count: usize) -> Self {
        self.token_count = count;
        self
    }

    pub fn with_pools(mut self, count: usize) -> Self {
        self.pool_count = count;
        self
    }

    pub fn with_failure_rate(mut self, rate: f64) -> Self {
        self.failure_rate = rate;
        self
    }

    pub fn failing(mut self, method: ChainMethod) -> Self {
        self.fail_methods.push(method);
        self
    }

    pub fn failing_connect(mut self) -> Self {
        self.fail_connect = true;
        self
    }

    pub fn failing_release(mut self) -> Self {
        self.fail_release = true;
        self
    }
}

/// Deterministic dataset served by every client of one backend
#[derive(Debug)]
struct ChainData {
    tokens: Vec<Token>,
    pools: Vec<Pool>,
    epoch_count: usize,
}

impl ChainData {
    fn generate(profile: &SimulatedProfile) -> Self {
        let mut tokens = Vec::with_capacity(profile.token_count);
        for i in 0..profile.token_count {
            if i == 0 {
                tokens.push(Token::native(
                    &profile.native_symbol,
                    WRAPPED_NATIVE,
                    18,
                    &profile.chain_id,
                    &profile.name,
                ));
            } else {
                let decimals = if i % 3 == 0 { 6 } else { 18 };
                tokens.push(Token::new(
                    &profile.chain_id,
                    &profile.name,
                    &format!("0x{:040x}", 0xa000 + i),
                    format!("TK{i}"),
                    decimals,
                ));
            }
        }

        let pools = (0..profile.pool_count)
            .map(|i| {
                let (token0, token1, sym0, sym1) = pool_pair(&tokens, i);
                let is_stable = i % 4 == 0;
                let prefix = if is_stable { "sAMM" } else { "vAMM" };
                Pool {
                    lp: format!("0x{:040x}", 0x1000 + i),
                    symbol: format!("{prefix}-{sym0}/{sym1}"),
                    token0,
                    token1,
                    reserve0: 1_000.0 * (i + 1) as f64,
                    reserve1: 750.0 * (i + 1) as f64,
                    is_stable,
                }
            })
            .collect();

        Self {
            tokens,
            pools,
            epoch_count: profile.epoch_count,
        }
    }

    fn price_of(&self, token: &Token) -> f64 {
        let index = self
            .tokens
            .iter()
            .position(|t| t == token)
            .unwrap_or(self.tokens.len());
        1.0 + index as f64 * 0.5
    }

    fn prices(&self, tokens: &[Token]) -> Vec<Price> {
        tokens
            .iter()
            .map(|t| Price {
                token: t.token_address.clone(),
                price: self.price_of(t),
            })
            .collect()
    }

    fn swap_pools(&self) -> Vec<SwapPool> {
        self.pools
            .iter()
            .map(|p| SwapPool {
                lp: p.lp.clone(),
                token0: p.token0.clone(),
                token1: p.token1.clone(),
                pool_type: if p.is_stable { 0 } else { -1 },
            })
            .collect()
    }

    fn pool(&self, address: &str) -> Option<Pool> {
        let address = normalize_address(address);
        self.pools.iter().find(|p| p.lp == address).cloned()
    }

    fn epoch(pool: &Pool, index: usize) -> PoolEpoch {
        PoolEpoch {
            lp: pool.lp.clone(),
            ts: GENESIS_EPOCH_TS + index as u64 * EPOCH_SECS,
            votes: pool.reserve0 * 0.1 * (index + 1) as f64,
            emissions: pool.reserve1 * 0.01,
        }
    }

    fn latest_epochs(&self) -> Vec<PoolEpoch> {
        if self.epoch_count == 0 {
            return Vec::new();
        }
        self.pools
            .iter()
            .map(|p| Self::epoch(p, self.epoch_count - 1))
            .collect()
    }

    fn pool_epochs(&self, address: &str, offset: usize, limit: usize) -> Result<Vec<PoolEpoch>, ChainError> {
        let pool = self
            .pool(address)
            .ok_or_else(|| ChainError::NotFound(format!("pool {address}")))?;
        let end = self.epoch_count.min(offset.saturating_add(limit));
        Ok((offset..end)
            .rev()
            .map(|i| Self::epoch(&pool, i))
            .collect())
    }

    fn quote(&self, from: &Token, to: &Token, amount: f64) -> Result<Option<Quote>, ChainError> {
        if from == to {
            return Err(ChainError::InvalidArgument(format!(
                "cannot quote {} against itself",
                from.symbol
            )));
        }
        if amount <= 0.0 {
            return Ok(None);
        }
        let path = self
            .pools
            .iter()
            .find(|p| {
                (p.token0 == from.token_address && p.token1 == to.token_address)
                    || (p.token0 == to.token_address && p.token1 == from.token_address)
            })
            .map(|p| vec![p.lp.clone()])
            .unwrap_or_default();

        Ok(Some(Quote {
            from_token: from.token_address.clone(),
            to_token: to.token_address.clone(),
            amount_in: amount,
            amount_out: amount * self.price_of(from) / self.price_of(to) * 0.997,
            path,
        }))
    }
}

fn pool_pair(tokens: &[Token], i: usize) -> (String, String, String, String) {
    if tokens.len() < 2 {
        return (
            format!("0x{:040x}", 0xb000 + 2 * i),
            format!("0x{:040x}", 0xb001 + 2 * i),
            format!("X{i}"),
            format!("Y{i}"),
        );
    }
    let a = &tokens[i % tokens.len()];
    let b = &tokens[(i + 1) % tokens.len()];
    (
        a.token_address.clone(),
        b.token_address.clone(),
        a.symbol.clone(),
        b.symbol.clone(),
    )
}

/// Latency and failure draw for one operation
#[derive(Debug, Clone, Copy)]
struct Draw {
    delay: Duration,
    fail: bool,
}

/// Shared state of one client instance
#[derive(Debug)]
struct Session {
    profile: Arc<SimulatedProfile>,
    data: Arc<ChainData>,
    closed: bool,
}

impl Session {
    fn draw(&self, method: ChainMethod) -> Draw {
        let mut rng = rand::rng();
        let jitter = if self.profile.jitter_ms > 0 {
            rng.random_range(0..=self.profile.jitter_ms)
        } else {
            0
        };
        let rate = self.profile.failure_rate.clamp(0.0, 1.0);
        let fail = self.profile.fail_methods.contains(&method) || (rate > 0.0 && rng.random_bool(rate));

        Draw {
            delay: Duration::from_millis(self.profile.base_latency_ms + jitter),
            fail,
        }
    }

    fn check(&self, method: ChainMethod, draw: Draw) -> Result<(), ChainError> {
        if self.closed {
            return Err(ChainError::Closed);
        }
        if draw.fail {
            debug!("Injected failure: {} {}", self.profile.name, method);
            return Err(ChainError::rpc(method.as_str(), "simulated RPC failure"));
        }
        Ok(())
    }

    fn release(&mut self) -> Result<(), ChainError> {
        self.closed = true;
        if self.profile.fail_release {
            return Err(ChainError::Release(self.profile.name.clone()));
        }
        Ok(())
    }
}

/// Non-blocking simulated client
#[derive(Debug)]
pub struct SimulatedAsyncChain {
    session: Session,
}

impl SimulatedAsyncChain {
    async fn simulate(&self, method: ChainMethod) -> Result<(), ChainError> {
        let draw = self.session.draw(method);
        tokio::time::sleep(draw.delay).await;
        self.session.check(method, draw)
    }
}

#[async_trait]
impl AsyncChain for SimulatedAsyncChain {
    async fn list_all_tokens(&self) -> Result<Vec<Token>, ChainError> {
        self.simulate(ChainMethod::ListAllTokens).await?;
        Ok(self.session.data.tokens.clone())
    }

    async fn get_prices(&self, tokens: &[Token]) -> Result<Vec<Price>, ChainError> {
        self.simulate(ChainMethod::GetPrices).await?;
        Ok(self.session.data.prices(tokens))
    }

    async fn list_pools(&self) -> Result<Vec<Pool>, ChainError> {
        self.simulate(ChainMethod::ListPools).await?;
        Ok(self.session.data.pools.clone())
    }

    async fn list_pools_for_swaps(&self) -> Result<Vec<SwapPool>, ChainError> {
        self.simulate(ChainMethod::ListPoolsForSwaps).await?;
        Ok(self.session.data.swap_pools())
    }

    async fn get_pool_by_address(&self, address: &str) -> Result<Option<Pool>, ChainError> {
        self.simulate(ChainMethod::GetPoolByAddress).await?;
        Ok(self.session.data.pool(address))
    }

    async fn list_latest_pool_epochs(&self) -> Result<Vec<PoolEpoch>, ChainError> {
        self.simulate(ChainMethod::ListLatestPoolEpochs).await?;
        Ok(self.session.data.latest_epochs())
    }

    async fn get_pool_epochs(
        &self,
        address: &str,
        offset: usize,
        limit: usize,
    ) -> Result<Vec<PoolEpoch>, ChainError> {
        self.simulate(ChainMethod::GetPoolEpochs).await?;
        self.session.data.pool_epochs(address, offset, limit)
    }

    async fn get_quote(
        &self,
        from: &Token,
        to: &Token,
        amount: f64,
    ) -> Result<Option<Quote>, ChainError> {
        self.simulate(ChainMethod::GetQuote).await?;
        self.session.data.quote(from, to, amount)
    }

    async fn close(&mut self) -> Result<(), ChainError> {
        self.session.release()
    }
}

/// Blocking simulated client
#[derive(Debug)]
pub struct SimulatedSyncChain {
    session: Session,
}

impl SimulatedSyncChain {
    fn simulate(&self, method: ChainMethod) -> Result<(), ChainError> {
        let draw = self.session.draw(method);
        std::thread::sleep(draw.delay);
        self.session.check(method, draw)
    }
}

impl SyncChain for SimulatedSyncChain {
    fn list_all_tokens(&self) -> Result<Vec<Token>, ChainError> {
        self.simulate(ChainMethod::ListAllTokens)?;
        Ok(self.session.data.tokens.clone())
    }

    fn get_prices(&self, tokens: &[Token]) -> Result<Vec<Price>, ChainError> {
        self.simulate(ChainMethod::GetPrices)?;
        Ok(self.session.data.prices(tokens))
    }

    fn list_pools(&self) -> Result<Vec<Pool>, ChainError> {
        self.simulate(ChainMethod::ListPools)?;
        Ok(self.session.data.pools.clone())
    }

    fn list_pools_for_swaps(&self) -> Result<Vec<SwapPool>, ChainError> {
        self.simulate(ChainMethod::ListPoolsForSwaps)?;
        Ok(self.session.data.swap_pools())
    }

    fn get_pool_by_address(&self, address: &str) -> Result<Option<Pool>, ChainError> {
        self.simulate(ChainMethod::GetPoolByAddress)?;
        Ok(self.session.data.pool(address))
    }

    fn list_latest_pool_epochs(&self) -> Result<Vec<PoolEpoch>, ChainError> {
        self.simulate(ChainMethod::ListLatestPoolEpochs)?;
        Ok(self.session.data.latest_epochs())
    }

    fn get_pool_epochs(
        &self,
        address: &str,
        offset: usize,
        limit: usize,
    ) -> Result<Vec<PoolEpoch>, ChainError> {
        self.simulate(ChainMethod::GetPoolEpochs)?;
        self.session.data.pool_epochs(address, offset, limit)
    }

    fn get_quote(
        &self,
        from: &Token,
        to: &Token,
        amount: f64,
    ) -> Result<Option<Quote>, ChainError> {
        self.simulate(ChainMethod::GetQuote)?;
        self.session.data.quote(from, to, amount)
    }

    fn close(&mut self) -> Result<(), ChainError> {
        self.session.release()
    }
}

/// Backend producing simulated clients
#[derive(Debug, Clone)]
pub struct SimulatedBackend {
    profile: Arc<SimulatedProfile>,
    data: Arc<ChainData>,
}

impl SimulatedBackend {
    pub fn new(profile: SimulatedProfile) -> Self {
        let data = Arc::new(ChainData::generate(&profile));
        Self {
            profile: Arc::new(profile),
            data,
        }
    }

    fn session(&self) -> Result<Session, ChainError> {
        if self.profile.fail_connect {
            return Err(ChainError::Connect(format!(
                "simulated {} endpoint",
                self.profile.name
            )));
        }
        Ok(Session {
            profile: self.profile.clone(),
            data: self.data.clone(),
            closed: false,
        })
    }

    fn connect_delay(&self) -> Duration {
        Duration::from_millis(self.profile.connect_latency_ms)
    }
}

#[async_trait]
impl ChainBackend for SimulatedBackend {
    fn name(&self) -> &str {
        &self.profile.name
    }

    async fn connect(&self) -> Result<Box<dyn AsyncChain>, ChainError> {
        tokio::time::sleep(self.connect_delay()).await;
        let session = self.session()?;
        Ok(Box::new(SimulatedAsyncChain { session }))
    }

    fn connect_blocking(&self) -> Result<Box<dyn SyncChain>, ChainError> {
        std::thread::sleep(self.connect_delay());
        let session = self.session()?;
        Ok(Box::new(SimulatedSyncChain { session }))
    }
}

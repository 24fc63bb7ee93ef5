//! Execution targets under benchmark
//!
//! Every backend exposes the same eight chain operations twice: once as a
//! non-blocking client driven from the async runtime and once as a blocking
//! client. Targets are acquired through a [`ChainBackend`] and released with
//! `close`, one acquisition per measured operation.

mod call;
mod error;
mod registry;
mod simulated;

use async_trait::async_trait;

use crate::models::{Pool, PoolEpoch, Price, Quote, SwapPool, Token};

pub use call::{CallOutput, ChainCall};
pub use error::ChainError;
pub use registry::BackendRegistry;
pub use simulated::{SimulatedBackend, SimulatedProfile};

/// Non-blocking chain client
#[async_trait]
pub trait AsyncChain: Send + Sync {
    async fn list_all_tokens(&self) -> Result<Vec<Token>, ChainError>;

    async fn get_prices(&self, tokens: &[Token]) -> Result<Vec<Price>, ChainError>;

    async fn list_pools(&self) -> Result<Vec<Pool>, ChainError>;

    async fn list_pools_for_swaps(&self) -> Result<Vec<SwapPool>, ChainError>;

    async fn get_pool_by_address(&self, address: &str) -> Result<Option<Pool>, ChainError>;

    async fn list_latest_pool_epochs(&self) -> Result<Vec<PoolEpoch>, ChainError>;

    async fn get_pool_epochs(
        &self,
        address: &str,
        offset: usize,
        limit: usize,
    ) -> Result<Vec<PoolEpoch>, ChainError>;

    async fn get_quote(
        &self,
        from: &Token,
        to: &Token,
        amount: f64,
    ) -> Result<Option<Quote>, ChainError>;

    /// Release connections held by this client
    async fn close(&mut self) -> Result<(), ChainError> {
        Ok(())
    }
}

/// Blocking chain client
pub trait SyncChain: Send {
    fn list_all_tokens(&self) -> Result<Vec<Token>, ChainError>;

    fn get_prices(&self, tokens: &[Token]) -> Result<Vec<Price>, ChainError>;

    fn list_pools(&self) -> Result<Vec<Pool>, ChainError>;

    fn list_pools_for_swaps(&self) -> Result<Vec<SwapPool>, ChainError>;

    fn get_pool_by_address(&self, address: &str) -> Result<Option<Pool>, ChainError>;

    fn list_latest_pool_epochs(&self) -> Result<Vec<PoolEpoch>, ChainError>;

    fn get_pool_epochs(
        &self,
        address: &str,
        offset: usize,
        limit: usize,
    ) -> Result<Vec<PoolEpoch>, ChainError>;

    fn get_quote(&self, from: &Token, to: &Token, amount: f64)
        -> Result<Option<Quote>, ChainError>;

    /// Release connections held by this client
    fn close(&mut self) -> Result<(), ChainError> {
        Ok(())
    }
}

/// Factory for both disciplines of one backend
#[async_trait]
pub trait ChainBackend: Send + Sync {
    /// Backend label used in results
    fn name(&self) -> &str;

    /// Construct a fresh non-blocking client
    async fn connect(&self) -> Result<Box<dyn AsyncChain>, ChainError>;

    /// Construct a fresh blocking client
    fn connect_blocking(&self) -> Result<Box<dyn SyncChain>, ChainError>;
}

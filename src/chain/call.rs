//! Operation dispatch
//!
//! A [`ChainCall`] is one named operation with its arguments; invoking it on
//! either client discipline yields the same [`CallOutput`].

use crate::models::{ChainMethod, Pool, PoolEpoch, Price, Quote, SwapPool, Token};

use super::{AsyncChain, ChainError, SyncChain};

/// One chain operation with borrowed arguments
#[derive(Clone, Debug)]
pub enum ChainCall<'a> {
    ListAllTokens,
    GetPrices {
        tokens: &'a [Token],
    },
    ListPools,
    ListPoolsForSwaps,
    GetPoolByAddress {
        address: &'a str,
    },
    ListLatestPoolEpochs,
    GetPoolEpochs {
        address: &'a str,
        offset: usize,
        limit: usize,
    },
    GetQuote {
        from: &'a Token,
        to: &'a Token,
        amount: f64,
    },
}

impl ChainCall<'_> {
    pub fn method(&self) -> ChainMethod {
        match self {
            ChainCall::ListAllTokens => ChainMethod::ListAllTokens,
            ChainCall::GetPrices { .. } => ChainMethod::GetPrices,
            ChainCall::ListPools => ChainMethod::ListPools,
            ChainCall::ListPoolsForSwaps => ChainMethod::ListPoolsForSwaps,
            ChainCall::GetPoolByAddress { .. } => ChainMethod::GetPoolByAddress,
            ChainCall::ListLatestPoolEpochs => ChainMethod::ListLatestPoolEpochs,
            ChainCall::GetPoolEpochs { .. } => ChainMethod::GetPoolEpochs,
            ChainCall::GetQuote { .. } => ChainMethod::GetQuote,
        }
    }

    /// Run the operation on a non-blocking client
    pub async fn invoke_async(&self, chain: &dyn AsyncChain) -> Result<CallOutput, ChainError> {
        let output = match *self {
            ChainCall::ListAllTokens => CallOutput::Tokens(chain.list_all_tokens().await?),
            ChainCall::GetPrices { tokens } => CallOutput::Prices(chain.get_prices(tokens).await?),
            ChainCall::ListPools => CallOutput::Pools(chain.list_pools().await?),
            ChainCall::ListPoolsForSwaps => {
                CallOutput::SwapPools(chain.list_pools_for_swaps().await?)
            }
            ChainCall::GetPoolByAddress { address } => {
                CallOutput::Pool(chain.get_pool_by_address(address).await?)
            }
            ChainCall::ListLatestPoolEpochs => {
                CallOutput::LatestEpochs(chain.list_latest_pool_epochs().await?)
            }
            ChainCall::GetPoolEpochs {
                address,
                offset,
                limit,
            } => CallOutput::PoolEpochs(chain.get_pool_epochs(address, offset, limit).await?),
            ChainCall::GetQuote { from, to, amount } => {
                CallOutput::Quote(chain.get_quote(from, to, amount).await?)
            }
        };
        Ok(output)
    }

    /// Run the operation on a blocking client
    pub fn invoke_blocking(&self, chain: &dyn SyncChain) -> Result<CallOutput, ChainError> {
        let output = match *self {
            ChainCall::ListAllTokens => CallOutput::Tokens(chain.list_all_tokens()?),
            ChainCall::GetPrices { tokens } => CallOutput::Prices(chain.get_prices(tokens)?),
            ChainCall::ListPools => CallOutput::Pools(chain.list_pools()?),
            ChainCall::ListPoolsForSwaps => CallOutput::SwapPools(chain.list_pools_for_swaps()?),
            ChainCall::GetPoolByAddress { address } => {
                CallOutput::Pool(chain.get_pool_by_address(address)?)
            }
            ChainCall::ListLatestPoolEpochs => {
                CallOutput::LatestEpochs(chain.list_latest_pool_epochs()?)
            }
            ChainCall::GetPoolEpochs {
                address,
                offset,
                limit,
            } => CallOutput::PoolEpochs(chain.get_pool_epochs(address, offset, limit)?),
            ChainCall::GetQuote { from, to, amount } => {
                CallOutput::Quote(chain.get_quote(from, to, amount)?)
            }
        };
        Ok(output)
    }
}

/// Value returned by a successful operation
#[derive(Clone, Debug, PartialEq)]
pub enum CallOutput {
    Tokens(Vec<Token>),
    Prices(Vec<Price>),
    Pools(Vec<Pool>),
    SwapPools(Vec<SwapPool>),
    Pool(Option<Pool>),
    LatestEpochs(Vec<PoolEpoch>),
    PoolEpochs(Vec<PoolEpoch>),
    Quote(Option<Quote>),
}

impl CallOutput {
    /// Cardinality, for operations returning a collection
    pub fn size(&self) -> Option<usize> {
        match self {
            CallOutput::Tokens(v) => Some(v.len()),
            CallOutput::Prices(v) => Some(v.len()),
            CallOutput::Pools(v) => Some(v.len()),
            CallOutput::SwapPools(v) => Some(v.len()),
            CallOutput::LatestEpochs(v) | CallOutput::PoolEpochs(v) => Some(v.len()),
            CallOutput::Pool(_) | CallOutput::Quote(_) => None,
        }
    }

    /// Short human-readable summary of the outcome
    pub fn description(&self) -> Option<String> {
        match self {
            CallOutput::Tokens(v) => Some(format!("{} tokens", v.len())),
            CallOutput::Prices(v) => Some(format!("{} prices", v.len())),
            CallOutput::Pools(v) => Some(format!("{} pools", v.len())),
            CallOutput::SwapPools(v) => Some(format!("{} swap pools", v.len())),
            CallOutput::LatestEpochs(v) => Some(format!("{} epochs", v.len())),
            CallOutput::PoolEpochs(v) => Some(format!("{} pool epochs", v.len())),
            CallOutput::Pool(pool) => pool.as_ref().map(|p| format!("Pool: {}", p.symbol)),
            CallOutput::Quote(quote) => quote
                .as_ref()
                .map(|q| format!("Quote: {} → {}", q.amount_in, q.amount_out)),
        }
    }
}

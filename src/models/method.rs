//! Benchmarked chain methods and execution modes

use serde::{Deserialize, Serialize};
use std::fmt;

/// The fixed set of chain operations exercised by every repetition
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChainMethod {
    #[serde(alias = "get_all_tokens")]
    ListAllTokens,
    GetPrices,
    #[serde(alias = "get_pools")]
    ListPools,
    #[serde(alias = "get_pools_for_swaps")]
    ListPoolsForSwaps,
    GetPoolByAddress,
    #[serde(alias = "get_latest_pool_epochs")]
    ListLatestPoolEpochs,
    GetPoolEpochs,
    GetQuote,
}

impl ChainMethod {
    /// Method identifier as it appears in reports and exports
    pub fn as_str(&self) -> &'static str {
        match self {
            ChainMethod::ListAllTokens => "list_all_tokens",
            ChainMethod::GetPrices => "get_prices",
            ChainMethod::ListPools => "list_pools",
            ChainMethod::ListPoolsForSwaps => "list_pools_for_swaps",
            ChainMethod::GetPoolByAddress => "get_pool_by_address",
            ChainMethod::ListLatestPoolEpochs => "list_latest_pool_epochs",
            ChainMethod::GetPoolEpochs => "get_pool_epochs",
            ChainMethod::GetQuote => "get_quote",
        }
    }

    /// All methods in repetition order
    pub fn all() -> Vec<ChainMethod> {
        vec![
            ChainMethod::ListAllTokens,
            ChainMethod::GetPrices,
            ChainMethod::ListPools,
            ChainMethod::ListPoolsForSwaps,
            ChainMethod::GetPoolByAddress,
            ChainMethod::ListLatestPoolEpochs,
            ChainMethod::GetPoolEpochs,
            ChainMethod::GetQuote,
        ]
    }

    /// Parse from identifier (legacy `get_*` names accepted)
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "list_all_tokens" | "get_all_tokens" => Some(ChainMethod::ListAllTokens),
            "get_prices" => Some(ChainMethod::GetPrices),
            "list_pools" | "get_pools" => Some(ChainMethod::ListPools),
            "list_pools_for_swaps" | "get_pools_for_swaps" => Some(ChainMethod::ListPoolsForSwaps),
            "get_pool_by_address" => Some(ChainMethod::GetPoolByAddress),
            "list_latest_pool_epochs" | "get_latest_pool_epochs" => {
                Some(ChainMethod::ListLatestPoolEpochs)
            }
            "get_pool_epochs" => Some(ChainMethod::GetPoolEpochs),
            "get_quote" => Some(ChainMethod::GetQuote),
            _ => None,
        }
    }

    /// Whether the method only runs when an earlier step produced data
    pub fn has_dependencies(&self) -> bool {
        matches!(
            self,
            ChainMethod::GetPrices
                | ChainMethod::GetPoolByAddress
                | ChainMethod::GetPoolEpochs
                | ChainMethod::GetQuote
        )
    }
}

impl fmt::Display for ChainMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

/// Invocation discipline a backend is driven under
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExecutionMode {
    /// Non-blocking backend, operations awaited one after another
    #[serde(alias = "async")]
    Concurrent,
    /// Blocking backend
    #[serde(alias = "sync")]
    Sequential,
}

impl ExecutionMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            ExecutionMode::Concurrent => "concurrent",
            ExecutionMode::Sequential => "sequential",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "concurrent" | "async" => Some(ExecutionMode::Concurrent),
            "sequential" | "sync" => Some(ExecutionMode::Sequential),
            _ => None,
        }
    }
}

impl fmt::Display for ExecutionMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

/// Which execution modes a run covers
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ModeFilter {
    #[default]
    Both,
    Only(ExecutionMode),
}

impl ModeFilter {
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "both" | "all" => Some(ModeFilter::Both),
            other => ExecutionMode::from_str(other).map(ModeFilter::Only),
        }
    }

    pub fn includes(&self, mode: ExecutionMode) -> bool {
        match self {
            ModeFilter::Both => true,
            ModeFilter::Only(only) => *only == mode,
        }
    }
}

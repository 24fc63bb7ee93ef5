//! Chain data records returned by benchmarked backends

use serde::{Deserialize, Serialize};
use std::fmt;

/// Lowercase an address so checksummed and plain forms compare equal
pub fn normalize_address(address: &str) -> String {
    address.trim().to_lowercase()
}

/// Token listed on a chain
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Token {
    pub chain_id: String,
    pub chain_name: String,
    pub token_address: String,
    pub symbol: String,
    pub decimals: u32,
    pub listed: bool,
    /// Set for native tokens, which are traded through their wrapped form
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub wrapped_token_address: Option<String>,
}

impl Token {
    pub fn new(
        chain_id: impl Into<String>,
        chain_name: impl Into<String>,
        token_address: &str,
        symbol: impl Into<String>,
        decimals: u32,
    ) -> Self {
        Self {
            chain_id: chain_id.into(),
            chain_name: chain_name.into(),
            token_address: normalize_address(token_address),
            symbol: symbol.into(),
            decimals,
            listed: true,
            wrapped_token_address: None,
        }
    }

    /// Native token, addressed by symbol and backed by a wrapped contract
    pub fn native(
        symbol: &str,
        wrapped_address: &str,
        decimals: u32,
        chain_id: impl Into<String>,
        chain_name: impl Into<String>,
    ) -> Self {
        Self {
            chain_id: chain_id.into(),
            chain_name: chain_name.into(),
            token_address: symbol.to_string(),
            symbol: symbol.to_string(),
            decimals,
            listed: true,
            wrapped_token_address: Some(normalize_address(wrapped_address)),
        }
    }

    pub fn address(&self) -> &str {
        &self.token_address
    }

    pub fn is_native(&self) -> bool {
        self.wrapped_token_address.is_some()
    }

    /// Convert a decimal amount to base units, truncating extra precision
    pub fn parse_units(&self, value: f64) -> u128 {
        if value <= 0.0 {
            return 0;
        }
        (value * 10f64.powi(self.decimals as i32)) as u128
    }

    /// Convert base units to a decimal amount
    pub fn to_float(&self, value: u128) -> f64 {
        value as f64 / 10f64.powi(self.decimals as i32)
    }

    fn identity(&self) -> String {
        normalize_address(
            self.wrapped_token_address
                .as_deref()
                .unwrap_or(&self.token_address),
        )
    }
}

impl PartialEq for Token {
    fn eq(&self, other: &Self) -> bool {
        self.identity() == other.identity() && self.chain_id == other.chain_id
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.symbol, self.token_address)
    }
}

/// Liquidity pool
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Pool {
    /// Pool (LP token) address
    pub lp: String,
    pub symbol: String,
    pub token0: String,
    pub token1: String,
    pub reserve0: f64,
    pub reserve1: f64,
    pub is_stable: bool,
}

impl Pool {
    pub fn address(&self) -> &str {
        &self.lp
    }
}

/// Reduced pool record used for swap routing
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SwapPool {
    pub lp: String,
    pub token0: String,
    pub token1: String,
    pub pool_type: i32,
}

/// USD price for a token
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Price {
    pub token: String,
    pub price: f64,
}

/// Rewards snapshot for one pool epoch
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PoolEpoch {
    pub lp: String,
    pub ts: u64,
    pub votes: f64,
    pub emissions: f64,
}

/// Swap quote
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Quote {
    pub from_token: String,
    pub to_token: String,
    pub amount_in: f64,
    pub amount_out: f64,
    /// Pool addresses hopped through
    pub path: Vec<String>,
}

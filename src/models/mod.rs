//! Data models for chain benchmarking
//!
//! This module contains all data structures used throughout the application.

mod chain;
mod method;
mod result;

pub use chain::{normalize_address, Pool, PoolEpoch, Price, Quote, SwapPool, Token};
pub use method::{ChainMethod, ExecutionMode, ModeFilter};
pub use result::{BenchmarkResult, BenchmarkSummary, SummaryKey};

//! Benchmark result models
//!
//! Defines per-attempt results and per-group summaries.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

use super::method::{ChainMethod, ExecutionMode};

/// Outcome of one timed invocation attempt
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct BenchmarkResult {
    pub method_name: ChainMethod,
    #[serde(alias = "chain_type")]
    pub backend: String,
    #[serde(alias = "execution_type")]
    pub execution_mode: ExecutionMode,
    #[serde(alias = "execution_time")]
    pub duration_seconds: f64,
    #[serde(alias = "success")]
    pub succeeded: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result_size: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result_description: Option<String>,
}

impl BenchmarkResult {
    pub fn success(
        method_name: ChainMethod,
        backend: impl Into<String>,
        execution_mode: ExecutionMode,
        duration: Duration,
    ) -> Self {
        Self {
            method_name,
            backend: backend.into(),
            execution_mode,
            duration_seconds: duration.as_secs_f64(),
            succeeded: true,
            error: None,
            result_size: None,
            result_description: None,
        }
    }

    pub fn failure(
        method_name: ChainMethod,
        backend: impl Into<String>,
        execution_mode: ExecutionMode,
        duration: Duration,
        error: impl Into<String>,
    ) -> Self {
        Self {
            method_name,
            backend: backend.into(),
            execution_mode,
            duration_seconds: duration.as_secs_f64(),
            succeeded: false,
            error: Some(error.into()),
            result_size: None,
            result_description: None,
        }
    }

    pub fn with_size(mut self, size: usize) -> Self {
        self.result_size = Some(size);
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.result_description = Some(description.into());
        self
    }

    /// Grouping key for summaries
    pub fn key(&self) -> SummaryKey {
        SummaryKey {
            method_name: self.method_name,
            backend: self.backend.clone(),
            execution_mode: self.execution_mode,
        }
    }

    pub fn symbol(&self) -> &'static str {
        if self.succeeded {
            "✓"
        } else {
            "✗"
        }
    }
}

impl fmt::Display for BenchmarkResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} {} {}: {:.4}s",
            self.symbol(),
            self.backend,
            self.execution_mode,
            self.method_name,
            self.duration_seconds
        )?;
        if let Some(description) = &self.result_description {
            write!(f, " ({description})")?;
        }
        Ok(())
    }
}

/// Composite (method, backend, mode) key identifying a result group
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SummaryKey {
    pub method_name: ChainMethod,
    pub backend: String,
    pub execution_mode: ExecutionMode,
}

/// Aggregate statistics for one result group
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct BenchmarkSummary {
    pub method_name: ChainMethod,
    #[serde(alias = "chain_type")]
    pub backend: String,
    #[serde(alias = "execution_type")]
    pub execution_mode: ExecutionMode,
    pub min_time: f64,
    pub max_time: f64,
    pub mean_time: f64,
    pub median_time: f64,
    pub std_dev: f64,
    /// Successful attempts / all attempts (0.0 - 1.0)
    pub success_rate: f64,
    pub total_runs: usize,
}

impl BenchmarkSummary {
    /// Summary for a group in which nothing succeeded
    pub fn all_failed(key: SummaryKey, total_runs: usize) -> Self {
        Self {
            method_name: key.method_name,
            backend: key.backend,
            execution_mode: key.execution_mode,
            min_time: 0.0,
            max_time: 0.0,
            mean_time: 0.0,
            median_time: 0.0,
            std_dev: 0.0,
            success_rate: 0.0,
            total_runs,
        }
    }

    #[cfg(test)]
    pub fn key(&self) -> SummaryKey {
        SummaryKey {
            method_name: self.method_name,
            backend: self.backend.clone(),
            execution_mode: self.execution_mode,
        }
    }

    pub fn has_successes(&self) -> bool {
        self.success_rate > 0.0
    }
}

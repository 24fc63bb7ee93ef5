//! Statistical aggregation of benchmark results
//!
//! Groups the result log by (method, backend, mode) and reduces each group
//! to a [`BenchmarkSummary`].

use std::collections::BTreeMap;

use crate::models::{BenchmarkResult, BenchmarkSummary, SummaryKey};

/// Duration statistics over successful attempts, in seconds
#[derive(Clone, Debug, Default, PartialEq)]
pub struct SampleStats {
    pub min: f64,
    pub max: f64,
    pub mean: f64,
    pub median: f64,
    /// Sample standard deviation (n - 1); 0 for a single sample
    pub std_dev: f64,
    pub count: usize,
}

impl SampleStats {
    /// Calculate statistics from samples; None when there are none
    pub fn from_samples(samples: &[f64]) -> Option<Self> {
        if samples.is_empty() {
            return None;
        }

        let mut sorted = samples.to_vec();
        sorted.sort_by(|a, b| a.total_cmp(b));

        let count = sorted.len();
        let min = sorted[0];
        let max = sorted[count - 1];
        let mean = sorted.iter().sum::<f64>() / count as f64;
        let median = percentile(&sorted, 50.0);

        let std_dev = if count > 1 {
            let variance =
                sorted.iter().map(|x| (x - mean).powi(2)).sum::<f64>() / (count - 1) as f64;
            variance.sqrt()
        } else {
            0.0
        };

        Some(Self {
            min,
            // Summation rounding can push the mean a hair outside the range
            mean: mean.clamp(min, max),
            max,
            median,
            std_dev,
            count,
        })
    }
}

/// Calculate percentile value from sorted array, interpolating between ranks
fn percentile(sorted: &[f64], p: f64) -> f64 {
    if sorted.is_empty() {
        return 0.0;
    }
    if sorted.len() == 1 {
        return sorted[0];
    }

    let idx = (p / 100.0) * (sorted.len() - 1) as f64;
    let lower = idx.floor() as usize;
    let upper = idx.ceil() as usize;
    let fraction = idx - lower as f64;

    if upper >= sorted.len() {
        sorted[sorted.len() - 1]
    } else {
        sorted[lower] * (1.0 - fraction) + sorted[upper] * fraction
    }
}

/// Group results by their composite key
pub fn group_results(results: &[BenchmarkResult]) -> BTreeMap<SummaryKey, Vec<&BenchmarkResult>> {
    let mut groups: BTreeMap<SummaryKey, Vec<&BenchmarkResult>> = BTreeMap::new();
    for result in results {
        groups.entry(result.key()).or_default().push(result);
    }
    groups
}

/// Summarize one result group
pub fn summarize(key: SummaryKey, group: &[&BenchmarkResult]) -> BenchmarkSummary {
    let total_runs = group.len();
    let durations: Vec<f64> = group
        .iter()
        .filter(|r| r.succeeded)
        .map(|r| r.duration_seconds)
        .collect();

    let Some(stats) = SampleStats::from_samples(&durations) else {
        return BenchmarkSummary::all_failed(key, total_runs);
    };

    BenchmarkSummary {
        method_name: key.method_name,
        backend: key.backend,
        execution_mode: key.execution_mode,
        min_time: stats.min,
        max_time: stats.max,
        mean_time: stats.mean,
        median_time: stats.median,
        std_dev: stats.std_dev,
        success_rate: stats.count as f64 / total_runs as f64,
        total_runs,
    }
}

/// Summaries for every observed group, ordered by key
pub fn compute_summaries(results: &[BenchmarkResult]) -> Vec<BenchmarkSummary> {
    group_results(results)
        .into_iter()
        .map(|(key, group)| summarize(key, &group))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{ChainMethod, ExecutionMode};
    use std::time::Duration;

    fn ok(method: ChainMethod, backend: &str, mode: ExecutionMode, secs: f64) -> BenchmarkResult {
        BenchmarkResult::success(method, backend, mode, Duration::from_secs_f64(secs))
    }

    fn failed(method: ChainMethod, backend: &str, mode: ExecutionMode, secs: f64) -> BenchmarkResult {
        BenchmarkResult::failure(method, backend, mode, Duration::from_secs_f64(secs), "boom")
    }

    fn mixed_log() -> Vec<BenchmarkResult> {
        use ChainMethod::*;
        use ExecutionMode::*;
        vec![
            ok(ListAllTokens, "OP", Concurrent, 0.10),
            ok(ListAllTokens, "OP", Concurrent, 0.30),
            ok(ListAllTokens, "OP", Concurrent, 0.20),
            failed(ListAllTokens, "OP", Concurrent, 5.0),
            ok(ListAllTokens, "OP", Sequential, 0.40),
            failed(GetQuote, "Base", Sequential, 0.01),
            failed(GetQuote, "Base", Sequential, 0.02),
            ok(ListPools, "Base", Concurrent, 0.25),
            ok(ListPools, "Base", Concurrent, 0.35),
        ]
    }

    #[test]
    fn test_sample_stats() {
        let stats = SampleStats::from_samples(&[1.0, 2.0, 3.0, 4.0, 5.0]).unwrap();
        assert_eq!(stats.min, 1.0);
        assert_eq!(stats.max, 5.0);
        assert_eq!(stats.mean, 3.0);
        assert_eq!(stats.median, 3.0);
        assert_eq!(stats.count, 5);
        // Sample variance of 1..=5 is 2.5
        assert!((stats.std_dev - 2.5f64.sqrt()).abs() < 1e-12);
    }

    #[test]
    fn test_median_even_count() {
        let stats = SampleStats::from_samples(&[4.0, 1.0, 3.0, 2.0]).unwrap();
        assert!((stats.median - 2.5).abs() < 1e-12);
    }

    #[test]
    fn test_single_sample_has_zero_std_dev() {
        let stats = SampleStats::from_samples(&[0.42]).unwrap();
        assert_eq!(stats.std_dev, 0.0);
        assert_eq!(stats.median, 0.42);
        assert!(SampleStats::from_samples(&[]).is_none());
    }

    #[test]
    fn test_summaries_partition_log() {
        let log = mixed_log();
        let summaries = compute_summaries(&log);

        assert_eq!(summaries.len(), 4);
        let total: usize = summaries.iter().map(|s| s.total_runs).sum();
        assert_eq!(total, log.len());

        for summary in &summaries {
            let members = log.iter().filter(|r| r.key() == summary.key()).count();
            assert_eq!(members, summary.total_runs);
        }
    }

    #[test]
    fn test_failures_excluded_from_timing() {
        let summaries = compute_summaries(&mixed_log());
        let tokens = summaries
            .iter()
            .find(|s| {
                s.method_name == ChainMethod::ListAllTokens
                    && s.execution_mode == ExecutionMode::Concurrent
            })
            .unwrap();

        assert_eq!(tokens.total_runs, 4);
        assert!((tokens.success_rate - 0.75).abs() < 1e-12);
        assert!((tokens.max_time - 0.30).abs() < 1e-9);
        assert!((tokens.mean_time - 0.20).abs() < 1e-9);
        assert!((tokens.median_time - 0.20).abs() < 1e-9);
    }

    #[test]
    fn test_ordering_invariants() {
        for summary in compute_summaries(&mixed_log()) {
            assert!((0.0..=1.0).contains(&summary.success_rate));
            if summary.success_rate > 0.0 {
                assert!(summary.min_time <= summary.median_time);
                assert!(summary.median_time <= summary.max_time);
                assert!(summary.min_time <= summary.mean_time);
                assert!(summary.mean_time <= summary.max_time);
            }
        }
    }

    #[test]
    fn test_all_failed_group_is_zeroed() {
        let summaries = compute_summaries(&mixed_log());
        let quote = summaries
            .iter()
            .find(|s| s.method_name == ChainMethod::GetQuote)
            .unwrap();

        assert_eq!(quote.total_runs, 2);
        assert_eq!(quote.success_rate, 0.0);
        assert_eq!(quote.min_time, 0.0);
        assert_eq!(quote.max_time, 0.0);
        assert_eq!(quote.mean_time, 0.0);
        assert_eq!(quote.median_time, 0.0);
        assert_eq!(quote.std_dev, 0.0);
    }

    #[test]
    fn test_single_success_group() {
        let summaries = compute_summaries(&mixed_log());
        let sequential = summaries
            .iter()
            .find(|s| {
                s.method_name == ChainMethod::ListAllTokens
                    && s.execution_mode == ExecutionMode::Sequential
            })
            .unwrap();
        assert_eq!(sequential.std_dev, 0.0);
        assert_eq!(sequential.success_rate, 1.0);
    }

    #[test]
    fn test_keys_with_delimiters_do_not_collide() {
        use ExecutionMode::*;
        let log = vec![
            ok(ChainMethod::ListPools, "OP|concurrent", Sequential, 0.1),
            ok(ChainMethod::ListPools, "OP", Concurrent, 0.2),
        ];
        assert_eq!(compute_summaries(&log).len(), 2);
        assert!(compute_summaries(&[]).is_empty());
    }
}

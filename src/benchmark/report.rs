//! Benchmark report generation
//!
//! Renders per-method tables, per-backend execution mode comparisons and
//! the global ranking from summary records.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::models::{BenchmarkSummary, ChainMethod, ExecutionMode};

/// Number of entries in the fastest-operations ranking
pub const RANKING_SIZE: usize = 10;

/// Report output format
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReportFormat {
    /// Plain text table
    #[default]
    Text,
    /// Markdown format
    Markdown,
}

impl ReportFormat {
    /// Parse from string
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "text" | "table" => Some(Self::Text),
            "markdown" | "md" => Some(Self::Markdown),
            _ => None,
        }
    }
}

/// Which execution mode won a comparison
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Faster {
    Concurrent,
    Sequential,
    Tie,
}

/// Concurrent versus sequential timing of one method on one backend
#[derive(Clone, Debug, PartialEq)]
pub struct ModeComparison {
    pub backend: String,
    pub method: ChainMethod,
    pub concurrent_mean: f64,
    pub sequential_mean: f64,
    /// sequential_mean / concurrent_mean
    pub ratio: f64,
}

impl ModeComparison {
    /// Compare two means; None when either side is incomparable
    pub fn new(
        backend: impl Into<String>,
        method: ChainMethod,
        concurrent_mean: f64,
        sequential_mean: f64,
    ) -> Option<Self> {
        if concurrent_mean <= 0.0 || sequential_mean <= 0.0 {
            return None;
        }
        Some(Self {
            backend: backend.into(),
            method,
            concurrent_mean,
            sequential_mean,
            ratio: sequential_mean / concurrent_mean,
        })
    }

    pub fn faster(&self) -> Faster {
        if self.ratio > 1.0 {
            Faster::Concurrent
        } else if self.ratio < 1.0 {
            Faster::Sequential
        } else {
            Faster::Tie
        }
    }

    /// Percentage by which the faster mode wins
    pub fn percent(&self) -> f64 {
        (self.ratio - 1.0).abs() * 100.0
    }

    /// Human-readable verdict, e.g. "concurrent 50.0% faster"
    pub fn label(&self) -> String {
        match self.faster() {
            Faster::Concurrent => format!("concurrent {:.1}% faster", self.percent()),
            Faster::Sequential => format!("sequential {:.1}% faster", self.percent()),
            Faster::Tie => "no difference".to_string(),
        }
    }
}

/// Pair up concurrent and sequential summaries per (backend, method).
///
/// Methods observed under only one mode, and pairs where either side has
/// no successful attempt, are left out.
pub fn compare_modes(summaries: &[BenchmarkSummary]) -> Vec<ModeComparison> {
    let mut pairs: BTreeMap<(&str, ChainMethod), (Option<f64>, Option<f64>)> = BTreeMap::new();
    for summary in summaries.iter().filter(|s| s.has_successes()) {
        let entry = pairs
            .entry((summary.backend.as_str(), summary.method_name))
            .or_default();
        match summary.execution_mode {
            ExecutionMode::Concurrent => entry.0 = Some(summary.mean_time),
            ExecutionMode::Sequential => entry.1 = Some(summary.mean_time),
        }
    }

    pairs
        .into_iter()
        .filter_map(|((backend, method), means)| match means {
            (Some(concurrent), Some(sequential)) => {
                ModeComparison::new(backend, method, concurrent, sequential)
            }
            _ => None,
        })
        .collect()
}

/// Successful summaries ordered by mean time, fastest first
pub fn rank_fastest(summaries: &[BenchmarkSummary], limit: usize) -> Vec<&BenchmarkSummary> {
    let mut ranked: Vec<&BenchmarkSummary> =
        summaries.iter().filter(|s| s.has_successes()).collect();
    ranked.sort_by(|a, b| a.mean_time.total_cmp(&b.mean_time));
    ranked.truncate(limit);
    ranked
}

/// Summaries grouped per method, rows ordered by backend then mode
fn by_method(summaries: &[BenchmarkSummary]) -> BTreeMap<&'static str, Vec<&BenchmarkSummary>> {
    let mut groups: BTreeMap<&'static str, Vec<&BenchmarkSummary>> = BTreeMap::new();
    for summary in summaries {
        groups
            .entry(summary.method_name.as_str())
            .or_default()
            .push(summary);
    }
    for rows in groups.values_mut() {
        rows.sort_by(|a, b| {
            a.backend
                .cmp(&b.backend)
                .then(a.execution_mode.cmp(&b.execution_mode))
        });
    }
    groups
}

/// Comparisons grouped per backend
fn by_backend(comparisons: &[ModeComparison]) -> BTreeMap<&str, Vec<&ModeComparison>> {
    let mut groups: BTreeMap<&str, Vec<&ModeComparison>> = BTreeMap::new();
    for comparison in comparisons {
        groups
            .entry(comparison.backend.as_str())
            .or_default()
            .push(comparison);
    }
    groups
}

/// Benchmark report generator
pub struct BenchmarkReport;

impl BenchmarkReport {
    /// Render the comparison report
    pub fn render(summaries: &[BenchmarkSummary], format: ReportFormat) -> String {
        match format {
            ReportFormat::Text => Self::text(summaries),
            ReportFormat::Markdown => Self::markdown(summaries),
        }
    }

    fn text(summaries: &[BenchmarkSummary]) -> String {
        let mut output = String::new();

        output.push_str(&format!("\n{:=^80}\n", " BENCHMARK SUMMARY "));
        if summaries.is_empty() {
            output.push_str("\nNo benchmark results collected.\n");
            return output;
        }

        for (method, rows) in by_method(summaries) {
            output.push_str(&format!("\n{}:\n", method));
            output.push_str(&format!(
                "{:<12} {:<12} {:>10} {:>10} {:>10} {:>9}\n",
                "Backend", "Mode", "Mean (s)", "Min (s)", "Max (s)", "Success"
            ));
            output.push_str(&format!("{}\n", "-".repeat(68)));
            for s in rows {
                output.push_str(&format!(
                    "{:<12} {:<12} {:>10.4} {:>10.4} {:>10.4} {:>8.1}%\n",
                    s.backend,
                    s.execution_mode,
                    s.mean_time,
                    s.min_time,
                    s.max_time,
                    s.success_rate * 100.0
                ));
            }
        }

        let comparisons = compare_modes(summaries);
        if !comparisons.is_empty() {
            output.push_str(&format!("\n{:=^80}\n", " EXECUTION MODE COMPARISON "));
            for (backend, rows) in by_backend(&comparisons) {
                output.push_str(&format!("\n{}:\n", backend));
                for c in rows {
                    output.push_str(&format!(
                        "  {:<26} ratio {:>6.2}  {}\n",
                        c.method.as_str(),
                        c.ratio,
                        c.label()
                    ));
                }
            }
        }

        let ranked = rank_fastest(summaries, RANKING_SIZE);
        if !ranked.is_empty() {
            output.push_str(&format!("\n{:=^80}\n", " FASTEST OPERATIONS "));
            for (i, s) in ranked.iter().enumerate() {
                output.push_str(&format!(
                    "{:>2}. {} {} {}: {:.4}s\n",
                    i + 1,
                    s.backend,
                    s.execution_mode,
                    s.method_name,
                    s.mean_time
                ));
            }
        }

        output
    }

    fn markdown(summaries: &[BenchmarkSummary]) -> String {
        let mut output = String::new();

        output.push_str("# Benchmark Summary\n\n");
        if summaries.is_empty() {
            output.push_str("No benchmark results collected.\n");
            return output;
        }

        for (method, rows) in by_method(summaries) {
            output.push_str(&format!("## {}\n\n", method));
            output.push_str("| Backend | Mode | Mean (s) | Min (s) | Max (s) | Success |\n");
            output.push_str("|---------|------|----------|---------|---------|---------|\n");
            for s in rows {
                output.push_str(&format!(
                    "| {} | {} | {:.4} | {:.4} | {:.4} | {:.1}% |\n",
                    s.backend,
                    s.execution_mode,
                    s.mean_time,
                    s.min_time,
                    s.max_time,
                    s.success_rate * 100.0
                ));
            }
            output.push('\n');
        }

        let comparisons = compare_modes(summaries);
        if !comparisons.is_empty() {
            output.push_str("## Execution Mode Comparison\n\n");
            for (backend, rows) in by_backend(&comparisons) {
                output.push_str(&format!("### {}\n\n", backend));
                output.push_str("| Method | Ratio | Verdict |\n");
                output.push_str("|--------|-------|---------|\n");
                for c in rows {
                    output.push_str(&format!(
                        "| {} | {:.2} | {} |\n",
                        c.method.as_str(),
                        c.ratio,
                        c.label()
                    ));
                }
                output.push('\n');
            }
        }

        let ranked = rank_fastest(summaries, RANKING_SIZE);
        if !ranked.is_empty() {
            output.push_str("## Fastest Operations\n\n");
            output.push_str("| Rank | Backend | Mode | Method | Mean (s) |\n");
            output.push_str("|------|---------|------|--------|----------|\n");
            for (i, s) in ranked.iter().enumerate() {
                output.push_str(&format!(
                    "| {} | {} | {} | {} | {:.4} |\n",
                    i + 1,
                    s.backend,
                    s.execution_mode,
                    s.method_name,
                    s.mean_time
                ));
            }
        }

        output
    }
}

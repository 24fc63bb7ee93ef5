//! Benchmark export document
//!
//! JSON document holding run metadata, the full result log and the derived
//! summaries.

use anyhow::{Context, Result};
use chrono::Local;
use serde::{Deserialize, Serialize};
use std::fs::{self, File};
use std::io::{BufReader, BufWriter};
use std::path::{Path, PathBuf};
use tracing::debug;

use super::metrics::compute_summaries;
use crate::models::{BenchmarkResult, BenchmarkSummary};

/// Export file name prefix
pub const EXPORT_PREFIX: &str = "chain_benchmark_results";

/// Run metadata
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct BenchmarkInfo {
    /// ISO-8601 export time
    pub timestamp: String,

    /// Repetitions per backend and mode
    pub num_runs: u32,

    /// Number of recorded attempts
    pub total_tests: usize,
}

/// Structured benchmark export
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ExportDocument {
    pub benchmark_info: BenchmarkInfo,
    pub detailed_results: Vec<BenchmarkResult>,
    pub summary_statistics: Vec<BenchmarkSummary>,
}

impl ExportDocument {
    /// Build a document from a result log, stamped with the current time
    pub fn new(num_runs: u32, results: Vec<BenchmarkResult>) -> Self {
        let summary_statistics = compute_summaries(&results);
        Self {
            benchmark_info: BenchmarkInfo {
                timestamp: Local::now().to_rfc3339(),
                num_runs,
                total_tests: results.len(),
            },
            detailed_results: results,
            summary_statistics,
        }
    }

    /// Export path under `dir` derived from the current time.
    ///
    /// A numeric suffix is appended when a file with that name exists.
    pub fn default_path(dir: &Path) -> PathBuf {
        let stem = format!("{}_{}", EXPORT_PREFIX, Local::now().format("%Y%m%d_%H%M%S"));
        let mut path = dir.join(format!("{stem}.json"));
        let mut n = 1;
        while path.exists() {
            path = dir.join(format!("{stem}_{n}.json"));
            n += 1;
        }
        path
    }

    /// Write as pretty-printed JSON, creating parent directories
    pub fn write(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory {}", parent.display()))?;
        }

        let file = File::create(path)
            .with_context(|| format!("Failed to create export file {}", path.display()))?;
        let writer = BufWriter::new(file);
        serde_json::to_writer_pretty(writer, self).context("Failed to write export")?;

        debug!("Wrote export to {}", path.display());
        Ok(())
    }

    /// Write to `output`, or to a clock-derived path under `dir`
    pub fn save(&self, output: Option<&Path>, dir: &Path) -> Result<PathBuf> {
        let path = match output {
            Some(path) => path.to_path_buf(),
            None => Self::default_path(dir),
        };
        self.write(&path)?;
        Ok(path)
    }

    /// Read an export written by this or an earlier version
    pub fn read(path: &Path) -> Result<Self> {
        let file = File::open(path)
            .with_context(|| format!("Failed to open export file {}", path.display()))?;
        let reader = BufReader::new(file);
        serde_json::from_reader(reader).context("Failed to parse export")
    }

    /// Whether the stored summaries match the stored result log
    pub fn summaries_consistent(&self) -> bool {
        self.summary_statistics == compute_summaries(&self.detailed_results)
    }
}

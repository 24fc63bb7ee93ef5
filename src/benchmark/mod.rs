//! Cross-execution-mode benchmarking
//!
//! Measures the fixed chain operation sequence against every backend under
//! the concurrent and sequential disciplines, aggregates the timings and
//! renders the comparison report and JSON export.

#![allow(dead_code)]

mod export;
mod metrics;
mod plan;
mod report;
mod runner;

pub use export::ExportDocument;
pub use metrics::compute_summaries;
pub use report::{BenchmarkReport, ReportFormat};
pub use runner::{ChainBenchmarker, InterruptHandle};

//! Benchmark execution engine
//!
//! Drives repetitions of the fixed operation sequence against each backend
//! under both execution modes and keeps the append-only result log.

use anyhow::Result;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::runtime::{Handle, RuntimeFlavor};
use tokio::sync::{mpsc, Notify};
use tracing::{debug, info, warn};

use super::export::ExportDocument;
use super::metrics::compute_summaries;
use super::plan::RepetitionPlan;
use super::report::{BenchmarkReport, ReportFormat};
use crate::chain::{BackendRegistry, CallOutput, ChainBackend, ChainCall, ChainError};
use crate::models::{BenchmarkResult, BenchmarkSummary, ChainMethod, ExecutionMode, ModeFilter};
use crate::utils::timer::{Timer, TimerCallback, DEFAULT_PRECISION};

/// Operator abort shared between a signal watcher and the benchmarker.
///
/// Blocking passes poll the flag between attempts; concurrent passes also
/// race the in-flight attempt against [`InterruptHandle::triggered`].
#[derive(Clone, Debug, Default)]
pub struct InterruptHandle {
    flag: Arc<AtomicBool>,
    notify: Arc<Notify>,
}

impl InterruptHandle {
    pub fn trigger(&self) {
        self.flag.store(true, Ordering::SeqCst);
        self.notify.notify_waiters();
    }

    pub fn is_triggered(&self) -> bool {
        self.flag.load(Ordering::SeqCst)
    }

    /// Resolves once triggered; immediately when already set
    pub async fn triggered(&self) {
        loop {
            // Registered before the flag check so a trigger in between is not lost
            let notified = self.notify.notified();
            if self.is_triggered() {
                return;
            }
            notified.await;
        }
    }
}

/// What happened to one attempted operation
#[derive(Debug)]
struct Attempt {
    /// Output handed to dependent steps; None on failure
    output: Option<CallOutput>,
    /// Target lifecycle failed; skip the rest of the repetition
    abort: bool,
}

/// Benchmark orchestrator
pub struct ChainBenchmarker {
    num_runs: u32,
    precision: usize,
    results: Vec<BenchmarkResult>,
    interrupt: InterruptHandle,
    feed: Option<mpsc::UnboundedSender<BenchmarkResult>>,
    echo: bool,
}

impl ChainBenchmarker {
    /// Create a benchmarker running each backend `num_runs` times per mode
    pub fn new(num_runs: u32) -> Self {
        Self {
            num_runs,
            precision: DEFAULT_PRECISION,
            results: Vec::new(),
            interrupt: InterruptHandle::default(),
            feed: None,
            echo: true,
        }
    }

    /// Digits used in timing output
    pub fn with_precision(mut self, precision: usize) -> Self {
        self.precision = precision;
        self
    }

    /// Print a status line per attempt
    pub fn with_echo(mut self, echo: bool) -> Self {
        self.echo = echo;
        self
    }

    /// Also send a copy of every recorded result to `feed`
    pub fn with_feed(mut self, feed: mpsc::UnboundedSender<BenchmarkResult>) -> Self {
        self.feed = Some(feed);
        self
    }

    pub fn results(&self) -> &[BenchmarkResult] {
        &self.results
    }

    /// Handle that stops the run when triggered; collected results are kept
    pub fn interrupt_handle(&self) -> InterruptHandle {
        self.interrupt.clone()
    }

    pub fn is_interrupted(&self) -> bool {
        self.interrupt.is_triggered()
    }

    /// Run every backend in registry order, concurrent mode first.
    ///
    /// On a multi-thread runtime the blocking pass runs under
    /// `block_in_place` so other tasks keep their worker. On a current-thread
    /// runtime it runs inline and stalls that runtime until the pass ends.
    pub async fn run_all(&mut self, registry: &BackendRegistry, modes: ModeFilter) -> Result<()> {
        for backend in registry.iter() {
            if self.is_interrupted() {
                break;
            }
            let label = backend.name().to_string();

            if modes.includes(ExecutionMode::Concurrent) {
                self.run_concurrent(backend.as_ref(), &label).await?;
            }
            if modes.includes(ExecutionMode::Sequential) && !self.is_interrupted() {
                match Handle::current().runtime_flavor() {
                    RuntimeFlavor::MultiThread => tokio::task::block_in_place(|| {
                        self.run_sequential(backend.as_ref(), &label)
                    })?,
                    _ => self.run_sequential(backend.as_ref(), &label)?,
                }
            }
        }
        Ok(())
    }

    /// Benchmark the non-blocking client of one backend.
    ///
    /// An interrupt cancels the in-flight attempt, which is not recorded.
    pub async fn run_concurrent<B>(&mut self, backend: &B, label: &str) -> Result<()>
    where
        B: ChainBackend + ?Sized,
    {
        let mode = ExecutionMode::Concurrent;
        let interrupt = self.interrupt.clone();
        self.announce(label, mode);

        'runs: for run in 0..self.num_runs {
            if interrupt.is_triggered() {
                warn!("Interrupted before run {} of {} {}", run + 1, label, mode);
                break;
            }
            self.announce_run(run);

            let mut plan = RepetitionPlan::new();
            while let Some(call) = plan.next_call() {
                let method = call.method();
                let attempt = tokio::select! {
                    biased;
                    _ = interrupt.triggered() => {
                        warn!("Interrupted during {} {} {}, attempt discarded", label, mode, method);
                        break 'runs;
                    }
                    attempt = self.attempt_concurrent(backend, label, &call) => attempt?,
                };
                if attempt.abort {
                    plan.abort();
                } else {
                    plan.record(method, attempt.output);
                }
            }
        }
        Ok(())
    }

    /// Benchmark the blocking client of one backend.
    ///
    /// A blocking call cannot be cut short; an interrupt takes effect before
    /// the next attempt.
    pub fn run_sequential<B>(&mut self, backend: &B, label: &str) -> Result<()>
    where
        B: ChainBackend + ?Sized,
    {
        let mode = ExecutionMode::Sequential;
        self.announce(label, mode);

        for run in 0..self.num_runs {
            if self.is_interrupted() {
                warn!("Interrupted before run {} of {} {}", run + 1, label, mode);
                break;
            }
            self.announce_run(run);

            let mut plan = RepetitionPlan::new();
            while let Some(call) = plan.next_call() {
                if self.is_interrupted() {
                    break;
                }
                let method = call.method();
                let attempt = self.attempt_sequential(backend, label, &call)?;
                if attempt.abort {
                    plan.abort();
                } else {
                    plan.record(method, attempt.output);
                }
            }
        }
        Ok(())
    }

    /// One operation against a freshly acquired non-blocking client.
    ///
    /// The client is constructed and released around every single operation
    /// so connection state never carries over between measurements. The
    /// construction window is timed separately and only reported when
    /// construction fails.
    async fn attempt_concurrent<B>(
        &mut self,
        backend: &B,
        label: &str,
        call: &ChainCall<'_>,
    ) -> Result<Attempt>
    where
        B: ChainBackend + ?Sized,
    {
        let mode = ExecutionMode::Concurrent;
        let method = call.method();

        let mut setup = self.timer(label, mode, "connect");
        setup.begin();
        let connected = backend.connect().await;
        let setup_elapsed = setup.end_async().await?;
        let mut chain = match connected {
            Ok(chain) => chain,
            Err(e) => return Ok(self.acquire_failed(method, label, mode, setup_elapsed, e)),
        };

        let mut timer = self.timer(label, mode, method.as_str());
        timer.begin();
        let outcome = call.invoke_async(chain.as_ref()).await;
        let elapsed = timer.end_async().await?;

        let released = chain.close().await;
        Ok(self.conclude(method, label, mode, elapsed, outcome, released))
    }

    /// One operation against a freshly acquired blocking client
    fn attempt_sequential<B>(
        &mut self,
        backend: &B,
        label: &str,
        call: &ChainCall<'_>,
    ) -> Result<Attempt>
    where
        B: ChainBackend + ?Sized,
    {
        let mode = ExecutionMode::Sequential;
        let method = call.method();

        let mut setup = self.timer(label, mode, "connect");
        setup.begin();
        let connected = backend.connect_blocking();
        let setup_elapsed = setup.end()?;
        let mut chain = match connected {
            Ok(chain) => chain,
            Err(e) => return Ok(self.acquire_failed(method, label, mode, setup_elapsed, e)),
        };

        let mut timer = self.timer(label, mode, method.as_str());
        timer.begin();
        let outcome = call.invoke_blocking(chain.as_ref());
        let elapsed = timer.end()?;

        let released = chain.close();
        Ok(self.conclude(method, label, mode, elapsed, outcome, released))
    }

    fn acquire_failed(
        &mut self,
        method: ChainMethod,
        label: &str,
        mode: ExecutionMode,
        elapsed: Duration,
        error: ChainError,
    ) -> Attempt {
        self.record(BenchmarkResult::failure(
            method,
            label,
            mode,
            elapsed,
            format!("Backend construction failed: {error}"),
        ));
        Attempt {
            output: None,
            abort: true,
        }
    }

    fn conclude(
        &mut self,
        method: ChainMethod,
        label: &str,
        mode: ExecutionMode,
        elapsed: Duration,
        outcome: std::result::Result<CallOutput, ChainError>,
        released: std::result::Result<(), ChainError>,
    ) -> Attempt {
        match (outcome, released) {
            (Ok(output), Ok(())) => {
                let mut result = BenchmarkResult::success(method, label, mode, elapsed);
                if let Some(size) = output.size() {
                    result = result.with_size(size);
                }
                if let Some(description) = output.description() {
                    result = result.with_description(description);
                }
                self.record(result);
                Attempt {
                    output: Some(output),
                    abort: false,
                }
            }
            (Err(e), Ok(())) => {
                self.record(BenchmarkResult::failure(method, label, mode, elapsed, e.to_string()));
                Attempt {
                    output: None,
                    abort: false,
                }
            }
            (outcome, Err(release)) => {
                let error = match outcome {
                    Ok(_) => format!("Backend release failed: {release}"),
                    Err(e) => format!("{e} (backend release failed: {release})"),
                };
                self.record(BenchmarkResult::failure(method, label, mode, elapsed, error));
                Attempt {
                    output: None,
                    abort: true,
                }
            }
        }
    }

    /// Append to the result log and report the attempt
    fn record(&mut self, result: BenchmarkResult) {
        if self.echo {
            println!("{result}");
            if let Some(error) = &result.error {
                println!("  Error: {error}");
            }
        }
        if let Some(error) = &result.error {
            debug!("{} {} {} failed: {}", result.backend, result.execution_mode, result.method_name, error);
        }
        if let Some(feed) = &self.feed {
            if feed.send(result.clone()).is_err() {
                debug!("Result feed closed");
            }
        }
        self.results.push(result);
    }

    fn timer(&self, label: &str, mode: ExecutionMode, step: &str) -> Timer {
        Timer::new(format!("{label} {mode} {step}"), self.precision)
            .with_callback(TimerCallback::blocking(|_, message| debug!("{}", message)))
    }

    fn announce(&self, label: &str, mode: ExecutionMode) {
        info!("Benchmarking {} {} ({} runs)", label, mode, self.num_runs);
        if self.echo {
            println!("\n=== Benchmarking {label} ({mode}) ===");
        }
    }

    fn announce_run(&self, run: u32) {
        if self.echo {
            println!("\nRun {}/{}", run + 1, self.num_runs);
        }
    }

    /// Summaries recomputed from the current result log
    pub fn compute_summaries(&self) -> Vec<BenchmarkSummary> {
        compute_summaries(&self.results)
    }

    /// Comparison report over the current result log
    pub fn render_report(&self, format: ReportFormat) -> String {
        BenchmarkReport::render(&self.compute_summaries(), format)
    }

    /// Write the export document; without a path one is derived from the clock
    pub fn export(&self, path: Option<&Path>, export_dir: &Path) -> Result<PathBuf> {
        let path = ExportDocument::new(self.num_runs, self.results.clone()).save(path, export_dir)?;
        info!("Exported {} results to {}", self.results.len(), path.display());
        Ok(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chain::{SimulatedBackend, SimulatedProfile};

    fn benchmarker(num_runs: u32) -> ChainBenchmarker {
        ChainBenchmarker::new(num_runs).with_echo(false)
    }

    fn count(bench: &ChainBenchmarker, method: ChainMethod) -> usize {
        bench
            .results()
            .iter()
            .filter(|r| r.method_name == method)
            .count()
    }

    #[test]
    fn test_sequential_token_listing() {
        let backend = SimulatedBackend::new(SimulatedProfile::new("OP").with_tokens(5));
        let mut bench = benchmarker(3);
        bench.run_sequential(&backend, "OP").unwrap();

        let listings: Vec<_> = bench
            .results()
            .iter()
            .filter(|r| r.method_name == ChainMethod::ListAllTokens)
            .collect();
        assert_eq!(listings.len(), 3);
        for result in listings {
            assert!(result.succeeded);
            assert_eq!(result.result_size, Some(5));
            assert_eq!(result.execution_mode, ExecutionMode::Sequential);
            assert_eq!(result.result_description.as_deref(), Some("5 tokens"));
        }
        // All eight operations once per repetition
        assert_eq!(bench.results().len(), 24);
    }

    #[test]
    fn test_always_failing_operation() {
        let backend = SimulatedBackend::new(
            SimulatedProfile::new("OP").failing(ChainMethod::ListPoolsForSwaps),
        );
        let mut bench = benchmarker(1);
        bench.run_sequential(&backend, "OP").unwrap();

        let failures: Vec<_> = bench.results().iter().filter(|r| !r.succeeded).collect();
        assert_eq!(failures.len(), 1);
        let failure = failures[0];
        assert_eq!(failure.method_name, ChainMethod::ListPoolsForSwaps);
        assert!(!failure.error.as_deref().unwrap_or_default().is_empty());
        assert!(failure.result_size.is_none());
        assert!(failure.duration_seconds >= 0.0);
        // The repetition carried on
        assert_eq!(count(&bench, ChainMethod::GetQuote), 1);
    }

    #[test]
    fn test_single_token_never_quotes() {
        let backend = SimulatedBackend::new(SimulatedProfile::new("OP").with_tokens(1));
        let mut bench = benchmarker(2);
        bench.run_sequential(&backend, "OP").unwrap();

        assert_eq!(count(&bench, ChainMethod::GetQuote), 0);
        assert_eq!(count(&bench, ChainMethod::GetPrices), 2);
    }

    #[test]
    fn test_no_pools_skips_pool_lookups() {
        let backend = SimulatedBackend::new(SimulatedProfile::new("OP").with_pools(0));
        let mut bench = benchmarker(2);
        bench.run_sequential(&backend, "OP").unwrap();

        assert_eq!(count(&bench, ChainMethod::GetPoolByAddress), 0);
        assert_eq!(count(&bench, ChainMethod::GetPoolEpochs), 0);
        assert_eq!(count(&bench, ChainMethod::ListPools), 2);
        assert_eq!(count(&bench, ChainMethod::ListLatestPoolEpochs), 2);
    }

    #[test]
    fn test_failed_pool_listing_skips_dependents() {
        let backend =
            SimulatedBackend::new(SimulatedProfile::new("OP").failing(ChainMethod::ListPools));
        let mut bench = benchmarker(1);
        bench.run_sequential(&backend, "OP").unwrap();

        assert_eq!(count(&bench, ChainMethod::ListPools), 1);
        assert_eq!(count(&bench, ChainMethod::GetPoolByAddress), 0);
        assert_eq!(count(&bench, ChainMethod::GetPoolEpochs), 0);
        assert_eq!(count(&bench, ChainMethod::GetQuote), 1);
    }

    #[test]
    fn test_construction_failure_aborts_repetition() {
        let backend = SimulatedBackend::new(SimulatedProfile::new("OP").failing_connect());
        let mut bench = benchmarker(3);
        bench.run_sequential(&backend, "OP").unwrap();

        // One failed result per repetition, against the first operation
        assert_eq!(bench.results().len(), 3);
        for result in bench.results() {
            assert_eq!(result.method_name, ChainMethod::ListAllTokens);
            assert!(!result.succeeded);
            assert!(result
                .error
                .as_deref()
                .unwrap_or_default()
                .starts_with("Backend construction failed"));
        }
    }

    #[test]
    fn test_release_failure_aborts_repetition() {
        let backend = SimulatedBackend::new(SimulatedProfile::new("OP").failing_release());
        let mut bench = benchmarker(2);
        bench.run_sequential(&backend, "OP").unwrap();

        assert_eq!(bench.results().len(), 2);
        assert!(bench.results().iter().all(|r| !r.succeeded));
    }

    #[test]
    fn test_interrupt_keeps_collected_results() {
        let backend = SimulatedBackend::new(SimulatedProfile::new("OP"));
        let mut bench = benchmarker(3);
        bench.run_sequential(&backend, "OP").unwrap();
        let collected = bench.results().len();

        bench.interrupt_handle().trigger();
        bench.run_sequential(&backend, "OP").unwrap();
        assert_eq!(bench.results().len(), collected);
        assert_eq!(bench.compute_summaries().len(), 8);
    }

    #[tokio::test]
    async fn test_concurrent_mode() {
        let backend = SimulatedBackend::new(SimulatedProfile::new("Base").with_tokens(5));
        let mut bench = benchmarker(2);
        bench.run_concurrent(&backend, "Base").await.unwrap();

        assert_eq!(bench.results().len(), 16);
        assert!(bench
            .results()
            .iter()
            .all(|r| r.execution_mode == ExecutionMode::Concurrent && r.succeeded));
        assert_eq!(count(&bench, ChainMethod::ListAllTokens), 2);
    }

    #[tokio::test]
    async fn test_concurrent_construction_failure() {
        let backend = SimulatedBackend::new(SimulatedProfile::new("Base").failing_connect());
        let mut bench = benchmarker(2);
        bench.run_concurrent(&backend, "Base").await.unwrap();

        assert_eq!(bench.results().len(), 2);
        assert!(bench.results().iter().all(|r| !r.succeeded));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_run_all_covers_modes_and_backends() {
        let registry = BackendRegistry::from_profiles(&[
            SimulatedProfile::new("OP"),
            SimulatedProfile::new("Base").with_tokens(1),
        ]);
        let mut bench = benchmarker(1);
        bench.run_all(&registry, ModeFilter::Both).await.unwrap();

        let summaries = bench.compute_summaries();
        // OP: 8 methods x 2 modes; Base: no quote, 7 x 2
        assert_eq!(summaries.len(), 30);
        let total: usize = summaries.iter().map(|s| s.total_runs).sum();
        assert_eq!(total, bench.results().len());

        let mut only_sequential = benchmarker(1);
        only_sequential
            .run_all(&registry, ModeFilter::Only(ExecutionMode::Sequential))
            .await
            .unwrap();
        assert!(only_sequential
            .results()
            .iter()
            .all(|r| r.execution_mode == ExecutionMode::Sequential));
    }

    #[tokio::test]
    async fn test_interrupt_cancels_in_flight_operation() {
        let backend = SimulatedBackend::new(SimulatedProfile::new("OP").with_latency(1500, 0));
        let mut bench = benchmarker(3);
        let interrupt = bench.interrupt_handle();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(50)).await;
            interrupt.trigger();
        });

        let started = std::time::Instant::now();
        bench.run_concurrent(&backend, "OP").await.unwrap();

        assert!(started.elapsed() < Duration::from_secs(1));
        assert!(bench.is_interrupted());
        // The cancelled attempt leaves no trace in the log
        assert!(bench.results().is_empty());
    }

    #[tokio::test]
    async fn test_interrupt_before_concurrent_pass() {
        let backend = SimulatedBackend::new(SimulatedProfile::new("OP"));
        let mut bench = benchmarker(2);
        bench.interrupt_handle().trigger();

        bench.run_concurrent(&backend, "OP").await.unwrap();
        assert!(bench.results().is_empty());
    }

    #[tokio::test]
    async fn test_triggered_resolves_for_every_waiter() {
        let interrupt = InterruptHandle::default();
        let waiter = {
            let interrupt = interrupt.clone();
            tokio::spawn(async move { interrupt.triggered().await })
        };
        tokio::task::yield_now().await;

        interrupt.trigger();
        tokio::time::timeout(Duration::from_secs(1), waiter)
            .await
            .unwrap()
            .unwrap();
        // Already set: resolves without a fresh notification
        tokio::time::timeout(Duration::from_millis(100), interrupt.triggered())
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_run_all_on_current_thread_runtime() {
        let registry = BackendRegistry::from_profiles(&[SimulatedProfile::new("OP")]);
        let mut bench = benchmarker(1);
        bench.run_all(&registry, ModeFilter::Both).await.unwrap();

        assert_eq!(bench.results().len(), 16);
        assert_eq!(
            bench
                .results()
                .iter()
                .filter(|r| r.execution_mode == ExecutionMode::Sequential)
                .count(),
            8
        );
    }

    #[test]
    fn test_construction_time_excluded_from_measurement() {
        let profile = SimulatedProfile {
            connect_latency_ms: 80,
            ..SimulatedProfile::new("OP").with_latency(0, 0)
        };
        let backend = SimulatedBackend::new(profile);
        let mut bench = benchmarker(1);
        bench.run_sequential(&backend, "OP").unwrap();

        assert_eq!(bench.results().len(), 8);
        for result in bench.results() {
            assert!(result.succeeded);
            assert!(result.duration_seconds < 0.05, "{}", result);
        }
    }

    #[tokio::test]
    async fn test_construction_failure_reports_setup_time() {
        let profile = SimulatedProfile {
            connect_latency_ms: 60,
            ..SimulatedProfile::new("Base").failing_connect()
        };
        let backend = SimulatedBackend::new(profile);
        let mut bench = benchmarker(1);
        bench.run_concurrent(&backend, "Base").await.unwrap();

        assert_eq!(bench.results().len(), 1);
        assert!(bench.results()[0].duration_seconds >= 0.05);
    }

    #[test]
    fn test_feed_mirrors_result_log() {
        let (feed, mut collected) = mpsc::unbounded_channel();
        let backend = SimulatedBackend::new(SimulatedProfile::new("OP").with_tokens(1));
        let mut bench = benchmarker(1).with_feed(feed);
        bench.run_sequential(&backend, "OP").unwrap();

        let mut mirrored = Vec::new();
        while let Ok(result) = collected.try_recv() {
            mirrored.push(result);
        }
        assert_eq!(mirrored, bench.results());
    }

    #[test]
    fn test_export_writes_document() {
        let dir = tempfile::tempdir().unwrap();
        let backend = SimulatedBackend::new(SimulatedProfile::new("OP"));
        let mut bench = benchmarker(1);
        bench.run_sequential(&backend, "OP").unwrap();

        let path = bench.export(None, dir.path()).unwrap();
        assert!(path.starts_with(dir.path()));
        let document = ExportDocument::read(&path).unwrap();
        assert_eq!(document.benchmark_info.total_tests, bench.results().len());
        assert_eq!(document.summary_statistics, bench.compute_summaries());
    }
}

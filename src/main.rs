//! Chain Bench - Concurrent vs Sequential Chain Client Benchmarking Tool
//!
//! A CLI tool measuring the latency of a fixed set of chain client
//! operations against several backends, once through a non-blocking client
//! and once through a blocking client, and comparing the two.
//!
//! ## Features
//!
//! - Eight chain operations timed in a fixed, data-dependent order
//! - Fresh client per operation so no session state leaks between timings
//! - Per-method tables, per-backend mode comparison and a fastest ranking
//! - JSON export of the full result log and summaries
//!
//! ## Usage
//!
//! ```bash
//! # Benchmark every configured backend, 3 runs per mode
//! chain-bench run
//!
//! # Benchmark one backend in blocking mode only
//! chain-bench run --backend OP --mode sequential --runs 10
//!
//! # Re-render a saved export as markdown
//! chain-bench report chain_benchmark_results_20240501_120000.json --format md
//!
//! # Write an example configuration
//! chain-bench config init
//! ```

use anyhow::Result;
use clap::Parser;
use std::path::{Path, PathBuf};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

mod benchmark;
mod chain;
mod cli;
mod config;
mod models;
mod utils;

use benchmark::{BenchmarkReport, ChainBenchmarker, ExportDocument, InterruptHandle, ReportFormat};
use cli::Args;
use config::{ConfigFile, EnvConfig, RunOverrides, RunSettings};
use models::{BenchmarkResult, ChainMethod, ModeFilter};
use utils::{init_logger, LogLevel};

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    let env = EnvConfig::load();

    init_logger(LogLevel::resolve(args.verbose, env.log.as_deref()))?;

    match args.command {
        cli::Command::Run(run_args) => {
            run_benchmark(run_args, &env).await?;
        }
        cli::Command::Report(report_args) => {
            report_export(report_args)?;
        }
        cli::Command::List(list_args) => {
            list_operations(list_args, &env)?;
        }
        cli::Command::Config(config_args) => {
            manage_config(config_args, &env)?;
        }
    }

    Ok(())
}

async fn run_benchmark(args: cli::RunArgs, env: &EnvConfig) -> Result<()> {
    let modes = ModeFilter::from_str(&args.mode)
        .ok_or_else(|| anyhow::anyhow!("Unknown execution mode: {}", args.mode))?;
    let format = ReportFormat::from_str(&args.format)
        .ok_or_else(|| anyhow::anyhow!("Unknown report format: {}", args.format))?;

    let config_path = args.config.as_deref().or(env.config_file.as_deref());
    let file = ConfigFile::load_or_default(config_path)?;

    let overrides = RunOverrides {
        num_runs: args.runs,
        backends: args.backends,
        output: args.output,
        no_export: args.no_export,
    };
    let settings = RunSettings::resolve(&overrides, env, &file);
    if settings.num_runs == 0 {
        anyhow::bail!("Number of runs must be at least 1");
    }

    let registry = config::registry_from(&file).select(&settings.backends)?;
    if registry.is_empty() {
        anyhow::bail!("No backends configured");
    }

    println!("🚀 Starting chain benchmarking...");
    println!(
        "Backends: {} | Runs: {} | Modes: {}",
        registry.names().join(", "),
        settings.num_runs,
        args.mode
    );
    info!(
        "Benchmarking {} backends, {} runs per mode",
        registry.len(),
        settings.num_runs
    );

    let (feed, collected) = mpsc::unbounded_channel();
    let mut benchmarker = ChainBenchmarker::new(settings.num_runs)
        .with_precision(settings.precision)
        .with_feed(feed);

    let forced = ForcedExit {
        num_runs: settings.num_runs,
        format,
        export: settings.export,
        output: settings.output.clone(),
        export_dir: settings.export_dir.clone(),
    };
    let watcher = spawn_interrupt_watcher(benchmarker.interrupt_handle(), collected, forced);

    let outcome = benchmarker.run_all(&registry, modes).await;
    watcher.abort();

    if benchmarker.is_interrupted() {
        println!("\n❌ Benchmarking interrupted by user");
    }
    if let Err(e) = &outcome {
        println!("\n❌ Benchmarking failed: {e}");
    }

    // Partial results still get a report and an export
    println!("{}", benchmarker.render_report(format));

    if settings.export {
        let path = benchmarker.export(settings.output.as_deref(), &settings.export_dir)?;
        println!("\n📄 Results exported to: {}", path.display());
    } else {
        debug!("Export disabled");
    }

    println!(
        "\n✅ Benchmarking completed! Total tests run: {}",
        benchmarker.results().len()
    );

    outcome
}

/// Report and export settings used when a second Ctrl-C ends the process
struct ForcedExit {
    num_runs: u32,
    format: ReportFormat,
    export: bool,
    output: Option<PathBuf>,
    export_dir: PathBuf,
}

impl ForcedExit {
    fn finish(&self, results: &[BenchmarkResult]) {
        println!("\n❌ Benchmarking aborted, {} results collected", results.len());
        let summaries = benchmark::compute_summaries(results);
        println!("{}", BenchmarkReport::render(&summaries, self.format));

        if self.export {
            let document = ExportDocument::new(self.num_runs, results.to_vec());
            match document.save(self.output.as_deref(), &self.export_dir) {
                Ok(path) => println!("\n📄 Results exported to: {}", path.display()),
                Err(e) => println!("\n❌ Export failed: {e:#}"),
            }
        }
    }
}

/// Watch for Ctrl-C while the run is in progress.
///
/// The first press cancels the run, which then reports and exports as usual.
/// A second press reports and exports the results mirrored so far and exits,
/// for runs stuck inside a blocking call.
fn spawn_interrupt_watcher(
    interrupt: InterruptHandle,
    mut collected: mpsc::UnboundedReceiver<BenchmarkResult>,
    forced: ForcedExit,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut results = Vec::new();
        let mut ctrl_c = Box::pin(tokio::signal::ctrl_c());
        let mut feed_open = true;

        loop {
            tokio::select! {
                received = collected.recv(), if feed_open => match received {
                    Some(result) => results.push(result),
                    None => feed_open = false,
                },
                signal = &mut ctrl_c => {
                    if let Err(e) = signal {
                        warn!("Failed to listen for Ctrl-C: {}", e);
                        return;
                    }
                    if interrupt.is_triggered() {
                        while let Ok(result) = collected.try_recv() {
                            results.push(result);
                        }
                        forced.finish(&results);
                        std::process::exit(130);
                    }

                    warn!("Interrupt received, cancelling the run");
                    println!("\n⚠️  Interrupt received, press Ctrl-C again to exit now");
                    interrupt.trigger();
                    ctrl_c = Box::pin(tokio::signal::ctrl_c());
                }
            }
        }
    })
}

fn report_export(args: cli::ReportArgs) -> Result<()> {
    let format = ReportFormat::from_str(&args.format)
        .ok_or_else(|| anyhow::anyhow!("Unknown report format: {}", args.format))?;

    let document = ExportDocument::read(&args.file)?;
    if !document.summaries_consistent() {
        warn!(
            "Stored summaries in {} do not match the result log; recomputing",
            args.file.display()
        );
    }

    let info = &document.benchmark_info;
    println!(
        "Export from {} ({} runs, {} tests)",
        info.timestamp, info.num_runs, info.total_tests
    );

    let summaries = benchmark::compute_summaries(&document.detailed_results);
    println!("{}", BenchmarkReport::render(&summaries, format));
    Ok(())
}

fn list_operations(args: cli::ListArgs, env: &EnvConfig) -> Result<()> {
    println!("\nBenchmarked Operations ({} total)\n", ChainMethod::all().len());
    println!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");

    for (i, method) in ChainMethod::all().iter().enumerate() {
        let needs = match method {
            ChainMethod::GetPrices => "tokens from list_all_tokens",
            ChainMethod::GetPoolByAddress | ChainMethod::GetPoolEpochs => {
                "first pool from list_pools"
            }
            ChainMethod::GetQuote => "two distinct tokens from list_all_tokens",
            _ => "",
        };
        if method.has_dependencies() {
            println!("  {:2}. {:26} [needs {}]", i + 1, method.as_str(), needs);
        } else {
            println!("  {:2}. {}", i + 1, method.as_str());
        }
    }

    println!("\n━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━\n");

    if args.backends {
        let config_path = args.config.as_deref().or(env.config_file.as_deref());
        let file = ConfigFile::load_or_default(config_path)?;
        let profiles = if file.backends.is_empty() {
            config::default_profiles()
        } else {
            file.backends
        };

        println!("Configured Backends:\n");
        for p in &profiles {
            println!(
                "  - {:12} [chain {}, {}±{}ms, {} tokens, {} pools]",
                p.name, p.chain_id, p.base_latency_ms, p.jitter_ms, p.token_count, p.pool_count
            );
        }
        println!();
    }

    Ok(())
}

fn manage_config(args: cli::ConfigArgs, env: &EnvConfig) -> Result<()> {
    match args.action {
        cli::ConfigAction::Init { output, force } => {
            if output.exists() && !force {
                anyhow::bail!(
                    "Configuration file already exists: {}. Use --force to overwrite.",
                    output.display()
                );
            }

            let config = ConfigFile::example();
            config.save(&output)?;
            println!("✓ Configuration file created: {}", output.display());
            println!("\nEdit the file to customize your settings.");
        }

        cli::ConfigAction::Show { env: show_env, format } => {
            if show_env {
                env.print_summary();
                println!();
            }
            let config = ConfigFile::load_or_default(env.config_file.as_deref())?;
            let output = if format == "json" {
                serde_json::to_string_pretty(&config)?
            } else {
                serde_yaml::to_string(&config)?
            };
            println!("{output}");
        }

        cli::ConfigAction::Validate { file } => {
            let path = file
                .or_else(|| env.config_file.clone())
                .or_else(ConfigFile::find)
                .unwrap_or_else(|| Path::new("./chain-bench.yaml").to_path_buf());

            match ConfigFile::load(&path) {
                Ok(config) => {
                    println!("✓ Configuration file is valid: {}", path.display());
                    println!("  Backends: {}", config.backends.len());
                }
                Err(e) => {
                    println!("✗ Configuration file is invalid: {}", path.display());
                    println!("  Error: {e:#}");
                    return Err(e);
                }
            }
        }

        cli::ConfigAction::Env => {
            config::print_env_help();
        }
    }

    Ok(())
}

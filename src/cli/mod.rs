//! CLI argument parsing
//!
//! Defines command-line interface using clap.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Concurrent vs sequential chain client benchmarking tool
#[derive(Parser, Debug)]
#[command(name = "chain-bench")]
#[command(author = "hephaex@gmail.com")]
#[command(version = "0.1.4")]
#[command(about = "Benchmark chain client operations under concurrent and sequential execution")]
#[command(long_about = None)]
pub struct Args {
    #[command(subcommand)]
    pub command: Command,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Run the benchmark
    Run(RunArgs),

    /// Render a report from a saved export
    Report(ReportArgs),

    /// List benchmarked operations and configured backends
    List(ListArgs),

    /// Manage configuration
    Config(ConfigArgs),
}

/// Arguments for run command
#[derive(Parser, Debug)]
pub struct RunArgs {
    /// Backend to benchmark (repeatable; default: all configured)
    #[arg(short, long = "backend")]
    pub backends: Vec<String>,

    /// Repetitions per backend and execution mode
    #[arg(short, long)]
    pub runs: Option<u32>,

    /// Execution modes to run (both, concurrent, sequential)
    #[arg(short, long, default_value = "both")]
    pub mode: String,

    /// Export file path
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Skip the JSON export
    #[arg(long)]
    pub no_export: bool,

    /// Report format (text, markdown)
    #[arg(short, long, default_value = "text")]
    pub format: String,

    /// Configuration file
    #[arg(short, long)]
    pub config: Option<PathBuf>,
}

/// Arguments for report command
#[derive(Parser, Debug)]
pub struct ReportArgs {
    /// Export file to read
    pub file: PathBuf,

    /// Report format (text, markdown)
    #[arg(short, long, default_value = "text")]
    pub format: String,
}

/// Arguments for list command
#[derive(Parser, Debug)]
pub struct ListArgs {
    /// Show configured backends
    #[arg(short, long)]
    pub backends: bool,

    /// Configuration file
    #[arg(short, long)]
    pub config: Option<PathBuf>,
}

/// Arguments for config command
#[derive(Parser, Debug)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub action: ConfigAction,
}

#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Write an example configuration file
    Init {
        /// Output path
        #[arg(short, long, default_value = "chain-bench.yaml")]
        output: PathBuf,

        /// Overwrite an existing file
        #[arg(short, long)]
        force: bool,
    },

    /// Show the effective configuration
    Show {
        /// Include environment overrides
        #[arg(short, long)]
        env: bool,

        /// Output format (yaml, json)
        #[arg(short, long, default_value = "yaml")]
        format: String,
    },

    /// Validate a configuration file
    Validate {
        /// File to validate (default: search standard locations)
        file: Option<PathBuf>,
    },

    /// Describe supported environment variables
    Env,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_args_parsing() {
        let args = Args::parse_from(["chain-bench", "list", "--backends"]);
        match args.command {
            Command::List(list_args) => {
                assert!(list_args.backends);
                assert!(list_args.config.is_none());
            }
            _ => panic!("Expected List command"),
        }
    }

    #[test]
    fn test_run_args() {
        let args = Args::parse_from([
            "chain-bench",
            "run",
            "-b",
            "OP",
            "--backend",
            "Base",
            "--runs",
            "10",
            "--mode",
            "sequential",
            "--no-export",
            "-v",
        ]);
        assert!(args.verbose);
        match args.command {
            Command::Run(run_args) => {
                assert_eq!(run_args.backends, vec!["OP", "Base"]);
                assert_eq!(run_args.runs, Some(10));
                assert_eq!(run_args.mode, "sequential");
                assert!(run_args.no_export);
                assert_eq!(run_args.format, "text");
            }
            _ => panic!("Expected Run command"),
        }
    }

    #[test]
    fn test_run_defaults() {
        let args = Args::parse_from(["chain-bench", "run"]);
        match args.command {
            Command::Run(run_args) => {
                assert!(run_args.backends.is_empty());
                assert!(run_args.runs.is_none());
                assert_eq!(run_args.mode, "both");
                assert!(!run_args.no_export);
            }
            _ => panic!("Expected Run command"),
        }
    }

    #[test]
    fn test_report_args() {
        let args = Args::parse_from(["chain-bench", "report", "results.json", "-f", "md"]);
        match args.command {
            Command::Report(report_args) => {
                assert_eq!(report_args.file, PathBuf::from("results.json"));
                assert_eq!(report_args.format, "md");
            }
            _ => panic!("Expected Report command"),
        }
    }

    #[test]
    fn test_config_args() {
        let args = Args::parse_from(["chain-bench", "config", "init", "--force"]);
        match args.command {
            Command::Config(ConfigArgs {
                action: ConfigAction::Init { output, force },
            }) => {
                assert_eq!(output, PathBuf::from("chain-bench.yaml"));
                assert!(force);
            }
            _ => panic!("Expected Config Init command"),
        }
    }
}

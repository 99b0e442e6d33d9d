//! CLI for latency-probe.
//!
//! This crate provides the `latency-probe` command: a measurement `run`,
//! re-aggregation of an existing log with `stats`, and `status` to show the
//! effective configuration.

#![warn(missing_docs, rust_2018_idioms)]
#![deny(unsafe_code)]

use anyhow::{bail, Context};
use clap::{Args, Parser, Subcommand, ValueEnum};
use latency_probe_core::{CallPlan, HarnessConfig, MethodStatistics};
use latency_probe_harness::{markdown, stats, OutputPaths};
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::EnvFilter;

/// latency-probe CLI.
#[derive(Parser, Debug)]
#[command(name = "latency-probe")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Config file (TOML, YAML or JSON).
    #[arg(short, long, global = true, env = "LATENCY_PROBE_CONFIG")]
    pub config: Option<PathBuf>,

    /// Enable debug logging (overridden by RUST_LOG).
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Log output format.
    #[arg(long, global = true, value_enum, default_value_t = LogFormat::Pretty)]
    pub log_format: LogFormat,

    /// Subcommand to run.
    #[command(subcommand)]
    pub command: Commands,
}

/// Log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LogFormat {
    /// Human-readable lines.
    Pretty,
    /// One JSON object per line.
    Json,
}

/// Available CLI commands.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Probe the call plan for the configured duration, then write statistics.
    ///
    /// Writes to the output directory:
    /// - results.csv - one row per probe
    /// - statistics.csv - max/min/avg latency per method
    /// - summary.md - markdown summary
    Run(RunArgs),

    /// Recompute statistics from an existing results log.
    Stats {
        /// Results log to read (default: <output_dir>/results.csv).
        #[arg(short, long)]
        results: Option<PathBuf>,

        /// Statistics file to write (default: <output_dir>/statistics.csv).
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Show the effective configuration.
    Status {
        /// Show output paths and the full configuration.
        #[arg(short, long)]
        detailed: bool,
    },
}

/// Overrides for a single run. Unset flags keep the configured value.
#[derive(Args, Debug, Default)]
pub struct RunArgs {
    /// JSON-RPC endpoint URL.
    #[arg(long)]
    pub server_url: Option<String>,

    /// Call plan file.
    #[arg(long)]
    pub requests: Option<PathBuf>,

    /// Output directory.
    #[arg(long)]
    pub output_dir: Option<PathBuf>,

    /// Total run duration in seconds.
    #[arg(long)]
    pub duration_secs: Option<u64>,

    /// Pause between passes in seconds.
    #[arg(long)]
    pub pass_interval_secs: Option<u64>,

    /// Pause between calls in milliseconds.
    #[arg(long)]
    pub call_delay_ms: Option<u64>,

    /// Request timeout in seconds (0 disables it).
    #[arg(long)]
    pub timeout_secs: Option<u64>,

    /// Stop after this many passes.
    #[arg(long)]
    pub passes: Option<u32>,
}

impl RunArgs {
    /// Apply the flags that were given on top of `config`.
    pub fn apply(&self, config: &mut HarnessConfig) {
        if let Some(url) = &self.server_url {
            config.server_url = url.clone();
        }
        if let Some(requests) = &self.requests {
            config.requests_file = requests.clone();
        }
        if let Some(dir) = &self.output_dir {
            config.output_dir = dir.clone();
        }
        if let Some(secs) = self.duration_secs {
            config.run_duration_secs = secs;
        }
        if let Some(secs) = self.pass_interval_secs {
            config.pass_interval_secs = secs;
        }
        if let Some(ms) = self.call_delay_ms {
            config.call_delay_ms = ms;
        }
        if let Some(secs) = self.timeout_secs {
            config.request_timeout_secs = secs;
        }
        if self.passes.is_some() {
            config.max_passes = self.passes;
        }
    }
}

/// Install the global tracing subscriber.
pub fn init_tracing(verbose: bool, format: LogFormat) {
    let default_level = if verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);

    match format {
        LogFormat::Pretty => builder.init(),
        LogFormat::Json => builder.json().init(),
    }
}

/// Run the CLI with the process arguments.
///
/// # Returns
///
/// Returns `Ok(())` on success, or an error if the command fails.
pub async fn run() -> anyhow::Result<()> {
    // Load .env before clap so `env = ...` arguments see it too.
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    init_tracing(cli.verbose, cli.log_format);

    let mut config =
        HarnessConfig::load(cli.config.as_deref()).context("Failed to load configuration")?;

    match cli.command {
        Commands::Run(args) => {
            args.apply(&mut config);
            config.validate()?;

            let plan = CallPlan::from_path(&config.requests_file)?;
            info!(
                server_url = %config.server_url,
                calls = plan.len(),
                "Loaded call plan"
            );

            let report = latency_probe_harness::run_and_write_all(&config, &plan).await?;

            println!(
                "Completed {} passes: {} probes, {} failed",
                report.summary.passes, report.summary.probes, report.summary.failures
            );
            print_statistics(&report.statistics);
            println!("Results written to {}", report.paths.dir.display());

            Ok(())
        }
        Commands::Stats { results, output } => {
            let paths = OutputPaths::new(&config.output_dir);
            let results = results.unwrap_or(paths.results);
            let output = output.unwrap_or(paths.statistics);

            if !stats::has_results_header(&results)
                .with_context(|| format!("Failed to read {}", results.display()))?
            {
                bail!("{} is not a results log", results.display());
            }

            let statistics = latency_probe_harness::aggregate_and_write(&results, &output)?;
            print_statistics(&statistics);
            println!("Statistics written to {}", output.display());

            Ok(())
        }
        Commands::Status { detailed } => {
            println!("latency-probe");
            println!("Version: {}", env!("CARGO_PKG_VERSION"));
            println!("Target: {}", config.server_url);
            println!("Call plan: {}", config.requests_file.display());

            if detailed {
                let paths = OutputPaths::new(&config.output_dir);
                println!("\nOutput files:");
                println!("  - {}", paths.results.display());
                println!("  - {}", paths.statistics.display());
                println!("  - {}", paths.summary.display());
                println!("\nConfiguration:");
                println!("{}", serde_json::to_string_pretty(&config)?);
            }

            Ok(())
        }
    }
}

fn print_statistics(statistics: &[MethodStatistics]) {
    print!("{}", markdown::generate_table(statistics));
}

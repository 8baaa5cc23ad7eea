//! `gravity-sync` binary.
//!
//! # Usage
//!
//! ```bash
//! # Sync a device exposed by a serial-to-TCP bridge
//! gravity-sync sync --address 192.168.4.1:23
//!
//! # Re-run dispatch over a captured response
//! gravity-sync --format json replay capture.txt --chunk-size 16
//! ```

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use gravity_runner::{replay_file, sync_over_tcp, DeviceConfig, OutputFormat, RunnerResult};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Gravity settings sync
#[derive(Parser, Debug)]
#[command(name = "gravity-sync")]
#[command(about = "Mirror a Gravity device's settings over its serial console")]
#[command(version)]
struct Cli {
    /// Device configuration file (YAML)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Output format
    #[arg(long, value_enum, default_value_t = OutputFormat::Text, global = true)]
    format: OutputFormat,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Sync settings from a device over TCP
    Sync {
        /// Bridge address (host:port)
        #[arg(short, long)]
        address: Option<String>,

        /// Device name for logs and metrics
        #[arg(short, long)]
        name: Option<String>,

        /// Maximum retries after the firmware rejects the request
        #[arg(long, conflicts_with = "unbounded")]
        max_retries: Option<u32>,

        /// Retry until the firmware accepts the request
        #[arg(long)]
        unbounded: bool,

        /// Per-read timeout in milliseconds
        #[arg(long)]
        read_timeout_ms: Option<u64>,
    },

    /// Replay a captured sync response
    Replay {
        /// Capture file
        file: PathBuf,

        /// Bytes delivered per receive callback
        #[arg(long, default_value = "64")]
        chunk_size: usize,
    },
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();
}

async fn run(cli: Cli) -> RunnerResult<String> {
    let mut config = match &cli.config {
        Some(path) => DeviceConfig::load(path)?,
        None => DeviceConfig::default(),
    };
    gravity_metrics::describe_metrics();

    let report = match cli.command {
        Commands::Sync {
            address,
            name,
            max_retries,
            unbounded,
            read_timeout_ms,
        } => {
            if let Some(address) = address {
                config.address = address;
            }
            if let Some(name) = name {
                config.name = name;
            }
            if unbounded {
                config.session.max_retries = None;
            } else if max_retries.is_some() {
                config.session.max_retries = max_retries;
            }
            if let Some(ms) = read_timeout_ms {
                config.read_timeout_ms = ms;
            }
            sync_over_tcp(&config).await?
        }
        Commands::Replay { file, chunk_size } => replay_file(&file, chunk_size, &config.session)?,
    };

    report.render(cli.format)
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match run(cli).await {
        Ok(output) => {
            print!("{}", output);
            ExitCode::SUCCESS
        }
        Err(e) => {
            tracing::error!("{}", e);
            ExitCode::FAILURE
        }
    }
}

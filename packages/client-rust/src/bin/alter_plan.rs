//! `alter-plan`: turns a JSON alteration plan into the master request.
//!
//! The request is printed to stdout as pretty JSON or as hex-encoded named
//! `MsgPack`. Logs go to stderr and are filtered by `RUST_LOG`.

use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use tabula_client::{AlterConfig, AlterPlan};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    Json,
    Msgpack,
}

#[derive(Debug, Parser)]
#[command(name = "alter-plan", version, about = "Build an alter table request from a plan")]
struct Cli {
    /// Path to the JSON plan, or `-` for stdin.
    #[arg(long, env = "TABULA_PLAN")]
    plan: PathBuf,

    #[arg(long, env = "TABULA_FORMAT", value_enum, default_value_t = OutputFormat::Json)]
    format: OutputFormat,

    /// Submission timeout in seconds recorded in the alteration config.
    #[arg(long, default_value_t = 30)]
    timeout_secs: u64,

    /// Do not wait for the alteration to finish on all tablets.
    #[arg(long)]
    no_wait: bool,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    let text = if cli.plan.as_os_str() == "-" {
        std::io::read_to_string(std::io::stdin()).context("reading plan from stdin")?
    } else {
        std::fs::read_to_string(&cli.plan)
            .with_context(|| format!("reading plan {}", cli.plan.display()))?
    };

    let plan = AlterPlan::from_json(&text)?;
    let config = AlterConfig {
        timeout: Duration::from_secs(cli.timeout_secs),
        wait: !cli.no_wait,
        ..AlterConfig::default()
    };
    let alterer = plan.to_alterer(config)?;
    let request = alterer
        .to_request()
        .with_context(|| format!("altering table {}", plan.table))?;
    info!(
        table = %plan.table,
        steps = request.alter_schema_steps.len(),
        "alter table request ready"
    );

    match cli.format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&request)?),
        OutputFormat::Msgpack => println!("{}", hex::encode(request.to_msgpack()?)),
    }
    Ok(())
}

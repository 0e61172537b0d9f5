use anyhow::Result;
use clap::{Parser, Subcommand};

use telebridge::cli::{ProxyArgs, WaitArgs};

/// Telebridge: SSH tunnel entrypoint and proxy readiness probe.
#[derive(Debug, Parser)]
#[command(name = "telebridge", version, about)]
struct Cli {
    /// Log level filter (e.g. "info", "debug", "warn")
    #[arg(long, global = true, default_value = "info", env = "TELEBRIDGE_LOG_LEVEL")]
    log_level: String,

    /// Output logs as JSON
    #[arg(long, global = true, env = "TELEBRIDGE_LOG_JSON")]
    log_json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Resolve the SSH server and replace this process with the tunnel
    Proxy(ProxyArgs),
    /// Exit with code 100 once the proxy resolves the sentinel name
    Wait(WaitArgs),
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    telebridge::tracing_init::init_tracing(&format!("telebridge={}", cli.log_level), cli.log_json);

    match cli.command {
        Commands::Proxy(ref args) => telebridge::cli::run_proxy(args),
        Commands::Wait(ref args) => telebridge::cli::run_wait(args),
    }
}

//! Subcommand arguments and entry points for the `telebridge` binary.

use std::path::PathBuf;
use std::time::Duration;

use anyhow::Result;
use clap::Args;

use crate::config::{
    DEFAULT_DEADLINE, DEFAULT_POLL_INTERVAL, DEFAULT_SENTINEL_HOST, DEFAULT_SETTLE_DELAY,
    READY_EXIT_CODE, TunnelConfig, WaitSettings,
};
use crate::readiness::{SystemResolver, wait_for_ready};
use crate::resolver::{build_tunnel_command, resolve_and_launch};
use crate::route::{CommandRouteInspector, DEFAULT_ROUTE_CMD};
use crate::tunnel::{DEFAULT_TUNNEL_BIN, ExecLauncher};

/// Arguments for the `proxy` subcommand.
#[derive(Debug, Args)]
pub struct ProxyArgs {
    /// Tunnel config as JSON, e.g. '{"port": 22, "ip": "10.0.0.5", "cidrs": ["10.1.0.0/16"]}'
    pub config: String,

    /// Tunnel executable that replaces this process
    #[arg(long, env = "TELEBRIDGE_TUNNEL_BIN", default_value = DEFAULT_TUNNEL_BIN)]
    pub tunnel_bin: PathBuf,

    /// Command printing the routing table, used when the config has no `ip`
    #[arg(long, env = "TELEBRIDGE_ROUTE_CMD", default_value = DEFAULT_ROUTE_CMD)]
    pub route_cmd: String,

    /// Print the tunnel command line instead of executing it
    #[arg(long)]
    pub dry_run: bool,
}

/// Arguments for the `wait` subcommand.
#[derive(Debug, Args)]
pub struct WaitArgs {
    /// Hostname that resolves only once the proxy is up
    #[arg(long, env = "TELEBRIDGE_SENTINEL", default_value = DEFAULT_SENTINEL_HOST)]
    pub sentinel: String,

    /// Give up after this many seconds (fractions allowed)
    #[arg(long = "timeout-secs", value_parser = parse_secs, default_value_t = DEFAULT_DEADLINE.as_secs_f64())]
    pub timeout_secs: f64,

    /// Delay between lookups, in milliseconds
    #[arg(long, default_value_t = millis(DEFAULT_POLL_INTERVAL))]
    pub interval_ms: u64,

    /// Delay after the first successful lookup, in milliseconds
    #[arg(long, default_value_t = millis(DEFAULT_SETTLE_DELAY))]
    pub settle_ms: u64,
}

impl WaitArgs {
    pub fn settings(&self) -> WaitSettings {
        WaitSettings {
            sentinel: self.sentinel.clone(),
            deadline: Duration::from_secs_f64(self.timeout_secs),
            interval: Duration::from_millis(self.interval_ms),
            settle: Duration::from_millis(self.settle_ms),
        }
    }
}

fn parse_secs(s: &str) -> Result<f64, String> {
    let secs: f64 = s.parse().map_err(|e| format!("invalid seconds {s:?}: {e}"))?;
    Duration::try_from_secs_f64(secs).map_err(|e| format!("invalid seconds {s:?}: {e}"))?;
    Ok(secs)
}

#[allow(clippy::cast_possible_truncation)]
const fn millis(d: Duration) -> u64 {
    d.as_millis() as u64
}

/// Run proxy mode: resolve the SSH endpoint and become the tunnel.
///
/// Only returns on failure, or after printing the command with `--dry-run`.
pub fn run_proxy(args: &ProxyArgs) -> Result<()> {
    let config = TunnelConfig::from_json(&args.config)?;
    let inspector = CommandRouteInspector::new(args.route_cmd.as_str());

    if args.dry_run {
        let command = build_tunnel_command(&config, &inspector, &args.tunnel_bin)?;
        #[allow(clippy::print_stdout)]
        {
            println!("{command}");
        }
        return Ok(());
    }

    #[cfg(unix)]
    crate::privilege::warn_if_unprivileged();
    match resolve_and_launch(&config, &inspector, &ExecLauncher, &args.tunnel_bin)? {}
}

/// Run wait mode: exit with [`READY_EXIT_CODE`] once the proxy answers DNS,
/// or return the timeout error.
pub fn run_wait(args: &WaitArgs) -> Result<()> {
    let settings = args.settings();
    tracing::info!(
        sentinel = %settings.sentinel,
        deadline_ms = settings.deadline.as_millis(),
        "waiting for proxy"
    );

    wait_for_ready(&settings, &SystemResolver).into_result()?;
    std::process::exit(READY_EXIT_CODE)
}

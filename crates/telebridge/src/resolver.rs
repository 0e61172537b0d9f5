//! Endpoint resolution and tunnel hand-off for proxy mode.
//!
//! The SSH server runs on the container host, so the address to dial depends
//! on the host's networking mode:
//! - VM-backed hosts cannot be discovered from inside, the caller passes `ip`.
//! - Otherwise the namespace's default gateway is the host, and the address
//!   is read from the routing table.

use std::convert::Infallible;
use std::fmt;
use std::path::Path;

use crate::config::TunnelConfig;
use crate::error::{Error, Result};
use crate::route::{RouteInspector, find_default_gateway};
use crate::tunnel::{TunnelCommand, TunnelLauncher, remote_target};

/// Address and port of the SSH server the tunnel connects to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedEndpoint {
    pub ip: String,
    pub port: u16,
}

impl fmt::Display for ResolvedEndpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.ip, self.port)
    }
}

/// Work out the SSH endpoint. The inspector is only consulted when the
/// config carries no `ip`.
pub fn resolve_endpoint(
    config: &TunnelConfig,
    inspector: &dyn RouteInspector,
) -> Result<ResolvedEndpoint> {
    let ip = if let Some(ip) = &config.ip {
        tracing::info!(%ip, "using explicit SSH server address");
        ip.clone()
    } else {
        let table = inspector.routing_table()?;
        let gateway = find_default_gateway(table.lines()).ok_or_else(|| {
            Error::Resolution("no default route found in routing table".into())
        })?;
        tracing::info!(ip = %gateway, "using default gateway as SSH server address");
        gateway
    };

    Ok(ResolvedEndpoint {
        ip,
        port: config.port,
    })
}

/// Resolve the endpoint and build the tunnel command, without launching.
pub fn build_tunnel_command(
    config: &TunnelConfig,
    inspector: &dyn RouteInspector,
    tunnel_bin: &Path,
) -> Result<TunnelCommand> {
    let endpoint = resolve_endpoint(config, inspector)?;
    tracing::info!(
        remote = %remote_target(&endpoint),
        cidrs = config.cidrs.len(),
        "starting tunnel"
    );
    Ok(TunnelCommand::new(tunnel_bin, &endpoint, &config.cidrs))
}

/// Resolve the endpoint and replace this process with the tunnel.
///
/// Never returns on success.
pub fn resolve_and_launch(
    config: &TunnelConfig,
    inspector: &dyn RouteInspector,
    launcher: &dyn TunnelLauncher,
    tunnel_bin: &Path,
) -> Result<Infallible> {
    let command = build_tunnel_command(config, inspector, tunnel_bin)?;
    Err(launcher.launch(&command))
}

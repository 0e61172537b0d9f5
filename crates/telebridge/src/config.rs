//! Configuration for the two entry modes.
//!
//! Proxy mode receives a single JSON object on the command line:
//!
//! ```json
//! {"port": 22, "ip": "10.0.0.5", "cidrs": ["10.1.0.0/16"]}
//! ```
//!
//! Wait mode has no input of its own; it runs off [`WaitSettings`], whose
//! defaults are the fixed constants below.

use std::net::IpAddr;
use std::time::Duration;

use serde::Deserialize;

use crate::error::{Error, Result};

/// Exit code that tells the orchestrator the proxy is live.
///
/// Fixed by contract with the caller; not configurable.
pub const READY_EXIT_CODE: i32 = 100;

/// Name that only resolves once the tunnel's DNS interception is active.
pub const DEFAULT_SENTINEL_HOST: &str = "hellotelepresence";

/// Wall-clock budget for the readiness loop.
pub const DEFAULT_DEADLINE: Duration = Duration::from_secs(10);

/// Pause between failed lookups.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(100);

/// Pause after the first successful lookup before reporting readiness.
pub const DEFAULT_SETTLE_DELAY: Duration = Duration::from_secs(1);

/// Proxy-mode input, decoded from the JSON argument.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct TunnelConfig {
    /// SSH server port.
    pub port: u16,
    /// SSH server address. When absent the default gateway is used.
    #[serde(default)]
    pub ip: Option<String>,
    /// Ranges to redirect through the tunnel, in order.
    pub cidrs: Vec<String>,
}

impl TunnelConfig {
    /// Decode and validate the proxy-mode JSON argument.
    pub fn from_json(raw: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(raw)?;
        config.validate()?;
        Ok(config)
    }

    /// Validate field values that serde alone does not constrain.
    pub fn validate(&self) -> Result<()> {
        if self.port == 0 {
            return Err(Error::Config("port must be in 1-65535 (got 0)".into()));
        }
        if let Some(ip) = &self.ip
            && ip.parse::<IpAddr>().is_err()
        {
            return Err(Error::Config(format!(
                "ip must be an IPv4 or IPv6 literal (got {ip:?})"
            )));
        }
        for cidr in &self.cidrs {
            if cidr.is_empty() || cidr.chars().any(char::is_whitespace) {
                return Err(Error::Config(format!("invalid cidr entry {cidr:?}")));
            }
        }
        Ok(())
    }
}

/// Tunables for the readiness loop.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WaitSettings {
    pub sentinel: String,
    pub deadline: Duration,
    pub interval: Duration,
    pub settle: Duration,
}

impl Default for WaitSettings {
    fn default() -> Self {
        Self {
            sentinel: DEFAULT_SENTINEL_HOST.to_string(),
            deadline: DEFAULT_DEADLINE,
            interval: DEFAULT_POLL_INTERVAL,
            settle: DEFAULT_SETTLE_DELAY,
        }
    }
}

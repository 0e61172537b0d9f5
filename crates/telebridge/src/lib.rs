//! Telebridge
//!
//! Entrypoint for the container side of an SSH-tunneled cluster proxy:
//! - `proxy`: find the SSH server on the host and exec the tunnel tool
//! - `wait`: poll a sentinel DNS name until the tunnel answers, exit 100

pub mod cli;
pub mod config;
pub mod error;
#[cfg(unix)]
pub mod privilege;
pub mod readiness;
pub mod resolver;
pub mod route;
pub mod tracing_init;
pub mod tunnel;

pub use config::{READY_EXIT_CODE, TunnelConfig, WaitSettings};
pub use error::{Error, Result};
pub use readiness::PollOutcome;
pub use resolver::ResolvedEndpoint;

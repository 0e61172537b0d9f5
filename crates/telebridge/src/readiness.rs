//! Proxy readiness probe for wait mode.
//!
//! Runs in the tunnel's network namespace and repeatedly looks up a sentinel
//! name that only resolves once the tunnel's DNS interception is active. A
//! successful lookup is an end-to-end check of the very path being proxied.
//!
//! Every failed lookup means "not ready yet"; only the wall-clock deadline
//! ends the loop unsuccessfully.

use std::io;
use std::net::ToSocketAddrs;
use std::thread;
use std::time::Instant;

use crate::config::WaitSettings;
use crate::error::{Error, Result};

/// Terminal state of the readiness loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PollOutcome {
    Ready,
    TimedOut,
}

impl PollOutcome {
    pub fn into_result(self) -> Result<()> {
        match self {
            Self::Ready => Ok(()),
            Self::TimedOut => Err(Error::Timeout),
        }
    }
}

/// Hostname lookup used by the readiness loop.
pub trait NameResolver {
    fn resolve(&self, host: &str) -> io::Result<()>;
}

/// Blocking lookup through the system resolver (`getaddrinfo`).
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemResolver;

impl NameResolver for SystemResolver {
    fn resolve(&self, host: &str) -> io::Result<()> {
        let mut addrs = (host, 0).to_socket_addrs()?;
        if addrs.next().is_some() {
            Ok(())
        } else {
            Err(io::Error::new(
                io::ErrorKind::NotFound,
                format!("{host} resolved to no addresses"),
            ))
        }
    }
}

/// Poll the sentinel until it resolves or the deadline passes.
///
/// The first lookup is immediate. After a failure the loop sleeps for
/// `interval` and gives up once `deadline` has elapsed, so `TimedOut` is
/// never returned early. On success it sleeps for `settle` before returning
/// `Ready`.
pub fn wait_for_ready(settings: &WaitSettings, resolver: &dyn NameResolver) -> PollOutcome {
    let start = Instant::now();
    let mut attempts: u32 = 0;

    loop {
        attempts += 1;
        match resolver.resolve(&settings.sentinel) {
            Ok(()) => {
                tracing::info!(
                    sentinel = %settings.sentinel,
                    attempts,
                    elapsed_ms = start.elapsed().as_millis(),
                    "sentinel resolved, proxy is up"
                );
                thread::sleep(settings.settle);
                return PollOutcome::Ready;
            }
            Err(e) => {
                tracing::debug!(sentinel = %settings.sentinel, attempts, error = %e, "sentinel not resolvable yet");
            }
        }

        thread::sleep(settings.interval);

        if start.elapsed() >= settings.deadline {
            tracing::warn!(
                sentinel = %settings.sentinel,
                attempts,
                deadline_ms = settings.deadline.as_millis(),
                "proxy did not become ready before the deadline"
            );
            return PollOutcome::TimedOut;
        }
    }
}

//! Default-gateway discovery from the host routing table.

use std::process::Command;

use crate::error::{Error, Result};

/// Routing table command used when no override is given.
pub const DEFAULT_ROUTE_CMD: &str = "route";

/// Source of routing table text.
pub trait RouteInspector {
    /// Return the raw, line-oriented routing table.
    fn routing_table(&self) -> Result<String>;
}

/// Runs an external program (default `route`) and captures its stdout.
#[derive(Debug, Clone)]
pub struct CommandRouteInspector {
    program: String,
}

impl CommandRouteInspector {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
        }
    }
}

impl Default for CommandRouteInspector {
    fn default() -> Self {
        Self::new(DEFAULT_ROUTE_CMD)
    }
}

impl RouteInspector for CommandRouteInspector {
    fn routing_table(&self) -> Result<String> {
        tracing::debug!("exec (capture): {}", self.program);

        let output = Command::new(&self.program)
            .output()
            .map_err(|e| Error::RouteInspector {
                program: self.program.clone(),
                reason: e.to_string(),
            })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(Error::RouteInspector {
                program: self.program.clone(),
                reason: format!("{}: {}", output.status, stderr.trim()),
            });
        }

        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }
}

/// Return the gateway of the first `default` route.
///
/// Each line is split on whitespace; the first line whose first field is
/// exactly `default` and that has a second field wins. Blank lines and
/// header lines are skipped.
pub fn find_default_gateway<'a, I>(lines: I) -> Option<String>
where
    I: IntoIterator<Item = &'a str>,
{
    lines.into_iter().find_map(|line| {
        let mut fields = line.split_whitespace();
        match (fields.next(), fields.next()) {
            (Some("default"), Some(gateway)) => Some(gateway.to_string()),
            _ => None,
        }
    })
}

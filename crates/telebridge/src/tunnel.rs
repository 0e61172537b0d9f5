//! Tunnel executable invocation.
//!
//! The tunnel tool is driven purely through its command line:
//!
//! ```text
//! <tunnel> -v --dns --method nat -e "<ssh-command>" -r telepresence@<ip>:<port> <cidr>...
//! ```

use std::fmt;
use std::path::{Path, PathBuf};
use std::process::Command;

use crate::error::Error;
use crate::resolver::ResolvedEndpoint;

/// Tunnel executable used when no override is given.
pub const DEFAULT_TUNNEL_BIN: &str = "/usr/bin/sshuttle-telepresence";

/// Account the SSH server accepts tunnel sessions for.
pub const REMOTE_USER: &str = "telepresence";

/// Transport command handed to the tunnel via `-e`.
///
/// The server address may be handed out dynamically by the host's network
/// layer, so host keys are neither checked nor recorded, and the local ssh
/// config is replaced by an empty one.
pub const SSH_COMMAND: &str =
    "ssh -oStrictHostKeyChecking=no -oUserKnownHostsFile=/dev/null -F /dev/null";

/// Fully built tunnel invocation: program plus argument list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TunnelCommand {
    pub program: PathBuf,
    pub args: Vec<String>,
}

impl TunnelCommand {
    pub fn new(program: impl Into<PathBuf>, endpoint: &ResolvedEndpoint, cidrs: &[String]) -> Self {
        let mut args: Vec<String> = [
            "-v",
            "--dns",
            "--method",
            "nat",
            "-e",
            SSH_COMMAND,
            "-r",
        ]
        .into_iter()
        .map(String::from)
        .collect();
        args.push(remote_target(endpoint));
        args.extend(cidrs.iter().cloned());

        Self {
            program: program.into(),
            args,
        }
    }

    /// Name the replaced process should report as `argv[0]`.
    pub fn arg0(&self) -> String {
        self.program.file_name().map_or_else(
            || self.program.to_string_lossy().into_owned(),
            |name| name.to_string_lossy().into_owned(),
        )
    }
}

impl fmt::Display for TunnelCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", shell_quote(&self.program.to_string_lossy()))?;
        for arg in &self.args {
            write!(f, " {}", shell_quote(arg))?;
        }
        Ok(())
    }
}

/// `telepresence@<ip>:<port>`
pub fn remote_target(endpoint: &ResolvedEndpoint) -> String {
    format!("{REMOTE_USER}@{}:{}", endpoint.ip, endpoint.port)
}

fn shell_quote(arg: &str) -> String {
    let plain = !arg.is_empty()
        && arg
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || "@%+=:,./-_".contains(c));
    if plain {
        arg.to_string()
    } else {
        format!("'{}'", arg.replace('\'', r"'\''"))
    }
}

/// Hands control of the process to the tunnel executable.
pub trait TunnelLauncher {
    /// Start the tunnel. Only ever returns on failure.
    fn launch(&self, command: &TunnelCommand) -> Error;
}

/// Replaces the current process image with the tunnel (`execvp`).
#[derive(Debug, Clone, Copy, Default)]
pub struct ExecLauncher;

impl TunnelLauncher for ExecLauncher {
    #[cfg(unix)]
    fn launch(&self, command: &TunnelCommand) -> Error {
        use std::os::unix::process::CommandExt;

        tracing::debug!("exec: {command}");
        let source = Command::new(&command.program)
            .arg0(command.arg0())
            .args(&command.args)
            .exec();
        launch_error(&command.program, source)
    }

    /// No image replacement here: run the tunnel as a child and mirror its
    /// exit code.
    #[cfg(not(unix))]
    fn launch(&self, command: &TunnelCommand) -> Error {
        tracing::debug!("spawn (supervised): {command}");
        match Command::new(&command.program).args(&command.args).status() {
            Ok(status) => std::process::exit(status.code().unwrap_or(1)),
            Err(source) => launch_error(&command.program, source),
        }
    }
}

fn launch_error(program: &Path, source: std::io::Error) -> Error {
    Error::Launch {
        program: program.display().to_string(),
        source,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn endpoint(ip: &str, port: u16) -> ResolvedEndpoint {
        ResolvedEndpoint {
            ip: ip.to_string(),
            port,
        }
    }

    #[test]
    fn builds_exact_flag_shape() {
        let cmd = TunnelCommand::new(
            DEFAULT_TUNNEL_BIN,
            &endpoint("10.0.0.5", 22),
            &["10.1.0.0/16".to_string()],
        );
        assert_eq!(
            cmd.args,
            vec![
                "-v",
                "--dns",
                "--method",
                "nat",
                "-e",
                "ssh -oStrictHostKeyChecking=no -oUserKnownHostsFile=/dev/null -F /dev/null",
                "-r",
                "telepresence@10.0.0.5:22",
                "10.1.0.0/16",
            ]
        );
    }

    #[test]
    fn cidrs_trail_in_order_exactly_once() {
        let cidrs: Vec<String> = ["10.1.0.0/16", "10.2.0.0/16", "192.168.0.0/24"]
            .into_iter()
            .map(String::from)
            .collect();
        let cmd = TunnelCommand::new("tunnel", &endpoint("1.2.3.4", 2222), &cidrs);
        assert_eq!(&cmd.args[cmd.args.len() - 3..], cidrs.as_slice());
        for cidr in &cidrs {
            assert_eq!(cmd.args.iter().filter(|a| *a == cidr).count(), 1);
        }
    }

    #[test]
    fn empty_cidrs_leave_target_last() {
        let cmd = TunnelCommand::new("tunnel", &endpoint("192.168.1.1", 2222), &[]);
        assert_eq!(
            cmd.args.last().map(String::as_str),
            Some("telepresence@192.168.1.1:2222")
        );
    }

    #[test]
    fn ssh_command_disables_host_key_checks() {
        assert!(SSH_COMMAND.contains("-oStrictHostKeyChecking=no"));
        assert!(SSH_COMMAND.contains("-oUserKnownHostsFile=/dev/null"));
        assert!(SSH_COMMAND.contains("-F /dev/null"));
    }

    #[test]
    fn arg0_is_file_name() {
        let cmd = TunnelCommand::new(DEFAULT_TUNNEL_BIN, &endpoint("1.2.3.4", 22), &[]);
        assert_eq!(cmd.arg0(), "sshuttle-telepresence");
    }

    #[test]
    fn display_quotes_only_when_needed() {
        let cmd = TunnelCommand::new("/usr/bin/tunnel", &endpoint("1.2.3.4", 22), &[]);
        assert_eq!(
            cmd.to_string(),
            "/usr/bin/tunnel -v --dns --method nat -e \
             'ssh -oStrictHostKeyChecking=no -oUserKnownHostsFile=/dev/null -F /dev/null' \
             -r telepresence@1.2.3.4:22"
        );
        assert_eq!(shell_quote("it's"), r"'it'\''s'");
        assert_eq!(shell_quote(""), "''");
    }

    #[cfg(unix)]
    #[test]
    fn exec_of_missing_program_is_launch_error() {
        let cmd = TunnelCommand::new("/nonexistent/tunnel", &endpoint("1.2.3.4", 22), &[]);
        let err = ExecLauncher.launch(&cmd);
        assert!(matches!(err, Error::Launch { ref program, .. } if program == "/nonexistent/tunnel"));
    }
}

//! Privilege check for NAT-mode tunnels.

use nix::unistd::geteuid;

/// Check if the current process is running as root.
pub fn is_root() -> bool {
    geteuid().is_root()
}

/// Warn when the tunnel is about to start without root.
///
/// `--method nat` installs firewall rules, which fails for unprivileged
/// users; the tunnel reports that itself, this only makes the cause obvious
/// in our own log.
pub fn warn_if_unprivileged() {
    if !is_root() {
        tracing::warn!(
            uid = geteuid().as_raw(),
            "not running as root; the tunnel's NAT redirection will likely fail"
        );
    }
}

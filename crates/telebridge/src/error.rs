//! Error types for telebridge.

use thiserror::Error;

/// Result type alias using telebridge's `Error`.
pub type Result<T> = std::result::Result<T, Error>;

/// Fatal outcomes of the proxy and wait modes.
#[derive(Debug, Error)]
pub enum Error {
    /// Proxy-mode input is missing a required field or holds a bad value
    #[error("Configuration error: {0}")]
    Config(String),

    /// No default route to derive the SSH server address from
    #[error("Resolution error: {0}")]
    Resolution(String),

    /// The route inspection command could not run or failed
    #[error("Route inspector `{program}` failed: {reason}")]
    RouteInspector { program: String, reason: String },

    /// The tunnel executable could not replace this process
    #[error("Failed to launch tunnel `{program}`")]
    Launch {
        program: String,
        #[source]
        source: std::io::Error,
    },

    /// The sentinel name never resolved within the deadline
    #[error("Failed to connect to proxy in remote cluster.")]
    Timeout,
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Self::Config(err.to_string())
    }
}

//! Error types for the daemon client transport.

use thiserror::Error;

/// Errors that can occur while connecting to the daemon.
#[derive(Debug, Error)]
pub enum ClientError {
    #[error("TLS setup failed: {0}")]
    Setup(#[from] dock_tls::TlsSetupError),

    #[error("invalid daemon host name '{host}': {reason}")]
    InvalidServerName { host: String, reason: String },

    #[error("TCP connection to {addr} failed: {source}")]
    Connect {
        addr: std::net::SocketAddr,
        #[source]
        source: std::io::Error,
    },

    #[error("TLS handshake with {addr} failed: {source}")]
    Handshake {
        addr: std::net::SocketAddr,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to inspect daemon certificate: {0}")]
    PeerCertificate(String),
}

pub type Result<T> = std::result::Result<T, ClientError>;

//! Client-side transport for TLS-secured daemons.
//!
//! Consumes the immutable [`dock_tls::TlsContext`] and opens mutually
//! authenticated TLS connections over TCP:
//!
//! - TCP connect + TLS handshake via tokio-rustls
//! - Access to the verified daemon certificate after the handshake

pub mod connection;
pub mod endpoint;
pub mod error;

pub use connection::DaemonConnection;
pub use endpoint::DaemonConnector;
pub use error::ClientError;

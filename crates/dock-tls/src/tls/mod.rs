//! TLS primitives for daemon connections.
//!
//! - Certificate inspection (subject, SANs, fingerprints from X.509 DER)
//! - Daemon server certificate verifier with an explicit host name policy
//! - TLS context assembly from the trust and identity stores

pub mod cert_extract;
pub mod config;
pub mod verifier;

pub use config::{build_tls_context, TlsContext};
pub use verifier::HostnameVerificationPolicy;

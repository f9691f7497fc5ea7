//! Mutual-TLS context construction for clients of a TLS-secured daemon.
//!
//! Loads a CA certificate, a client certificate and a client private key from
//! PEM files, builds an in-memory trust store and identity store from them, and
//! assembles an immutable rustls client configuration:
//!
//! - Credential loading (single-block PEM certificates, PKCS#8 and legacy
//!   PKCS#1 RSA keys)
//! - Trust store (configured CA only) and sealed identity store
//! - TLS context with an explicit host name verification policy
//! - Directory-convention bundles (`ca.pem`, `cert.pem`, `key.pem`) and TOML
//!   configuration

pub mod bundle;
pub mod certificates;
pub mod config;
pub mod credentials;
pub mod error;
pub mod store;
pub mod tls;

pub use bundle::{
    CertificateBundle, DEFAULT_CA_CERT_NAME, DEFAULT_CLIENT_CERT_NAME, DEFAULT_CLIENT_KEY_NAME,
};
pub use certificates::DaemonCertificates;
pub use config::DaemonTlsConfig;
pub use error::TlsSetupError;
pub use tls::{HostnameVerificationPolicy, TlsContext};

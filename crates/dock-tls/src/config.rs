//! File-based configuration for daemon TLS.
//!
//! ```toml
//! cert_dir = "/etc/daemon/certs"
//! # client_key_path = "/run/secrets/client-key.pem"
//! hostname_verification = "accept-any"   # or "verify"
//! ```

use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::bundle::CertificateBundle;
use crate::certificates::DaemonCertificates;
use crate::error::{Result, TlsSetupError};
use crate::tls::HostnameVerificationPolicy;

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DaemonTlsConfig {
    /// Directory holding `ca.pem`, `cert.pem` and `key.pem`.
    #[serde(default)]
    pub cert_dir: Option<PathBuf>,
    /// Overrides `cert_dir/ca.pem`.
    #[serde(default)]
    pub ca_cert_path: Option<PathBuf>,
    /// Overrides `cert_dir/cert.pem`.
    #[serde(default)]
    pub client_cert_path: Option<PathBuf>,
    /// Overrides `cert_dir/key.pem`.
    #[serde(default)]
    pub client_key_path: Option<PathBuf>,
    #[serde(default)]
    pub hostname_verification: HostnameVerificationPolicy,
}

impl DaemonTlsConfig {
    /// Load the configuration from a TOML file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path).map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                TlsSetupError::Configuration(format!(
                    "TLS configuration file '{}' not found",
                    path.display()
                ))
            } else {
                TlsSetupError::Configuration(format!(
                    "failed to read TLS configuration file '{}': {e}",
                    path.display()
                ))
            }
        })?;
        Self::from_toml_str(&contents)
    }

    pub fn from_toml_str(contents: &str) -> Result<Self> {
        toml::from_str(contents)
            .map_err(|e| TlsSetupError::Configuration(format!("invalid TLS configuration: {e}")))
    }

    /// Resolve the configured paths without reading any file.
    pub fn bundle(&self) -> Result<CertificateBundle> {
        let mut builder = CertificateBundle::builder();
        if let Some(dir) = &self.cert_dir {
            builder = builder.cert_dir(dir);
        }
        if let Some(path) = &self.ca_cert_path {
            builder = builder.ca_cert_path(path);
        }
        if let Some(path) = &self.client_cert_path {
            builder = builder.client_cert_path(path);
        }
        if let Some(path) = &self.client_key_path {
            builder = builder.client_key_path(path);
        }
        builder.build()
    }

    /// Load the credentials and assemble the TLS context.
    pub fn build(&self) -> Result<DaemonCertificates> {
        DaemonCertificates::from_bundle(&self.bundle()?, self.hostname_verification)
    }
}

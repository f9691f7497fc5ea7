//! Certificate bundle: the three file locations a daemon client needs.
//!
//! A bundle is normally derived from a single certificate directory using the
//! conventional file names below. Each path can be overridden individually;
//! explicit overrides always win over directory defaults, whichever order the
//! builder methods are called in.

use std::path::{Path, PathBuf};

use crate::error::{Result, TlsSetupError};

/// Conventional file name of the CA certificate inside a certificate directory.
pub const DEFAULT_CA_CERT_NAME: &str = "ca.pem";

/// Conventional file name of the client certificate.
pub const DEFAULT_CLIENT_CERT_NAME: &str = "cert.pem";

/// Conventional file name of the client private key.
pub const DEFAULT_CLIENT_KEY_NAME: &str = "key.pem";

/// Validated locations of the CA certificate, client certificate and client key.
///
/// All three paths are guaranteed non-empty. Nothing has been read yet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CertificateBundle {
    ca_cert_path: PathBuf,
    client_cert_path: PathBuf,
    client_key_path: PathBuf,
}

impl CertificateBundle {
    /// Bundle using the conventional file names inside `cert_dir`.
    pub fn from_dir(cert_dir: impl AsRef<Path>) -> Self {
        let dir = cert_dir.as_ref();
        Self {
            ca_cert_path: dir.join(DEFAULT_CA_CERT_NAME),
            client_cert_path: dir.join(DEFAULT_CLIENT_CERT_NAME),
            client_key_path: dir.join(DEFAULT_CLIENT_KEY_NAME),
        }
    }

    pub fn builder() -> CertificateBundleBuilder {
        CertificateBundleBuilder::default()
    }

    pub fn ca_cert_path(&self) -> &Path {
        &self.ca_cert_path
    }

    pub fn client_cert_path(&self) -> &Path {
        &self.client_cert_path
    }

    pub fn client_key_path(&self) -> &Path {
        &self.client_key_path
    }
}

/// Builder for [`CertificateBundle`].
#[derive(Debug, Clone, Default)]
pub struct CertificateBundleBuilder {
    cert_dir: Option<PathBuf>,
    ca_cert_path: Option<PathBuf>,
    client_cert_path: Option<PathBuf>,
    client_key_path: Option<PathBuf>,
}

impl CertificateBundleBuilder {
    /// Directory holding `ca.pem`, `cert.pem` and `key.pem`.
    pub fn cert_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.cert_dir = Some(dir.into());
        self
    }

    pub fn ca_cert_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.ca_cert_path = Some(path.into());
        self
    }

    pub fn client_cert_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.client_cert_path = Some(path.into());
        self
    }

    pub fn client_key_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.client_key_path = Some(path.into());
        self
    }

    /// Resolve the three paths.
    ///
    /// Fails with [`TlsSetupError::Configuration`] if any path is missing or
    /// empty. No file system access happens here.
    pub fn build(self) -> Result<CertificateBundle> {
        let dir = self.cert_dir.as_deref();

        let ca_cert_path = resolve(self.ca_cert_path, dir, DEFAULT_CA_CERT_NAME);
        let client_cert_path = resolve(self.client_cert_path, dir, DEFAULT_CLIENT_CERT_NAME);
        let client_key_path = resolve(self.client_key_path, dir, DEFAULT_CLIENT_KEY_NAME);

        let mut missing = Vec::new();
        if ca_cert_path.is_none() {
            missing.push("ca_cert_path");
        }
        if client_cert_path.is_none() {
            missing.push("client_cert_path");
        }
        if client_key_path.is_none() {
            missing.push("client_key_path");
        }

        match (ca_cert_path, client_cert_path, client_key_path) {
            (Some(ca_cert_path), Some(client_cert_path), Some(client_key_path)) => {
                Ok(CertificateBundle {
                    ca_cert_path,
                    client_cert_path,
                    client_key_path,
                })
            }
            _ => Err(TlsSetupError::Configuration(format!(
                "ca_cert_path, client_cert_path and client_key_path must all be specified (missing: {})",
                missing.join(", ")
            ))),
        }
    }
}

/// Explicit path first, then `dir/default_name`.
///
/// An explicitly configured empty path is absent; it does not fall back to the
/// directory.
fn resolve(explicit: Option<PathBuf>, dir: Option<&Path>, default_name: &str) -> Option<PathBuf> {
    match explicit {
        Some(path) => Some(path).filter(|p| !p.as_os_str().is_empty()),
        None => dir
            .filter(|d| !d.as_os_str().is_empty())
            .map(|d| d.join(default_name)),
    }
}

//! Entry point: from certificate paths to a ready [`TlsContext`].

use std::path::{Path, PathBuf};

use tracing::info;

use crate::bundle::{CertificateBundle, CertificateBundleBuilder};
use crate::credentials;
use crate::error::Result;
use crate::store::build_stores;
use crate::tls::{build_tls_context, HostnameVerificationPolicy, TlsContext};

/// Client credentials for an mTLS-secured daemon, assembled into a TLS context.
///
/// Construction reads the three PEM files, builds the trust and identity
/// stores, and assembles the context. Nothing is cached: building again
/// re-reads the files.
#[derive(Debug, Clone)]
pub struct DaemonCertificates {
    context: TlsContext,
}

impl DaemonCertificates {
    /// Build from `ca.pem`, `cert.pem` and `key.pem` inside `cert_dir`, with
    /// the default host name policy.
    pub fn from_dir(cert_dir: impl AsRef<Path>) -> Result<Self> {
        Self::from_bundle(
            &CertificateBundle::from_dir(cert_dir),
            HostnameVerificationPolicy::default(),
        )
    }

    pub fn builder() -> DaemonCertificatesBuilder {
        DaemonCertificatesBuilder::default()
    }

    /// Load, build stores, assemble.
    pub fn from_bundle(
        bundle: &CertificateBundle,
        hostname_verification: HostnameVerificationPolicy,
    ) -> Result<Self> {
        info!(
            ca = %bundle.ca_cert_path().display(),
            cert = %bundle.client_cert_path().display(),
            key = %bundle.client_key_path().display(),
            "loading daemon TLS credentials"
        );

        let credentials = credentials::load(bundle)?;
        let (trust, identity) = build_stores(credentials)?;
        let context = build_tls_context(&trust, &identity, hostname_verification)?;

        Ok(Self { context })
    }

    pub fn tls_context(&self) -> &TlsContext {
        &self.context
    }

    pub fn into_tls_context(self) -> TlsContext {
        self.context
    }

    pub fn hostname_verification(&self) -> HostnameVerificationPolicy {
        self.context.hostname_verification()
    }
}

/// Builder for [`DaemonCertificates`].
///
/// Individual paths override the directory defaults.
#[derive(Debug, Clone, Default)]
pub struct DaemonCertificatesBuilder {
    paths: CertificateBundleBuilder,
    hostname_verification: HostnameVerificationPolicy,
}

impl DaemonCertificatesBuilder {
    pub fn cert_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.paths = self.paths.cert_dir(dir);
        self
    }

    pub fn ca_cert_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.paths = self.paths.ca_cert_path(path);
        self
    }

    pub fn client_cert_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.paths = self.paths.client_cert_path(path);
        self
    }

    pub fn client_key_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.paths = self.paths.client_key_path(path);
        self
    }

    pub fn hostname_verification(mut self, policy: HostnameVerificationPolicy) -> Self {
        self.hostname_verification = policy;
        self
    }

    /// Validate the paths, then load and assemble.
    ///
    /// A missing path fails with
    /// [`TlsSetupError::Configuration`](crate::TlsSetupError::Configuration)
    /// before any file is opened.
    pub fn build(self) -> Result<DaemonCertificates> {
        let bundle = self.paths.build()?;
        DaemonCertificates::from_bundle(&bundle, self.hostname_verification)
    }
}

//! X.509 certificates loaded from single-block PEM files.
//!
//! Each certificate file must hold exactly one `CERTIFICATE` block. Bundles
//! with intermediates are rejected rather than silently truncated.

use std::path::Path;

use rustls_pki_types::pem::PemObject;
use rustls_pki_types::CertificateDer;

use crate::error::{Result, TlsSetupError};
use crate::tls::cert_extract::{summarize_certificate, CertificateSummary};

/// A decoded X.509 certificate. Immutable once parsed.
#[derive(Debug, Clone)]
pub struct ParsedCertificate {
    der: CertificateDer<'static>,
    summary: CertificateSummary,
}

impl ParsedCertificate {
    /// Read and decode the certificate file at `path`.
    pub fn load(path: &Path) -> Result<Self> {
        let pem = std::fs::read(path)
            .map_err(|e| TlsSetupError::certificate_parse(path, format!("read failed: {e}")))?;
        Self::from_pem(path, &pem)
    }

    /// Decode PEM bytes. `origin` is only used in error messages.
    pub fn from_pem(origin: &Path, pem: &[u8]) -> Result<Self> {
        let mut blocks = CertificateDer::pem_slice_iter(pem)
            .collect::<std::result::Result<Vec<_>, _>>()
            .map_err(|e| TlsSetupError::certificate_parse(origin, format!("malformed PEM: {e}")))?;

        if blocks.len() != 1 {
            return Err(TlsSetupError::certificate_parse(
                origin,
                format!("expected exactly one CERTIFICATE block, found {}", blocks.len()),
            ));
        }
        let der = blocks.remove(0);

        let summary =
            summarize_certificate(&der).map_err(|e| TlsSetupError::certificate_parse(origin, e))?;

        Ok(Self { der, summary })
    }

    /// Returns the DER-encoded certificate.
    pub fn der(&self) -> &CertificateDer<'static> {
        &self.der
    }

    pub fn summary(&self) -> &CertificateSummary {
        &self.summary
    }

    pub fn subject(&self) -> &str {
        &self.summary.subject
    }

    pub fn fingerprint_sha256(&self) -> &str {
        &self.summary.fingerprint_sha256
    }
}

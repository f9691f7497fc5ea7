//! Daemon certificate verification.
//!
//! [`DaemonServerCertVerifier`] wraps rustls' webpki verifier built over the
//! single-CA [`TrustStore`](crate::store::TrustStore). Chain validation,
//! validity periods and handshake signatures are always enforced. Only the
//! host name check is governed by [`HostnameVerificationPolicy`].
//!
//! webpki checks the chain before the name, so a name error is only ever
//! reported for a certificate that already chains to the configured CA.

use std::sync::Arc;

use rustls::client::danger::{HandshakeSignatureValid, ServerCertVerified, ServerCertVerifier};
use rustls::client::WebPkiServerVerifier;
use rustls::{CertificateError, DigitallySignedStruct, Error as TlsError, SignatureScheme};
use rustls_pki_types::{CertificateDer, ServerName, UnixTime};
use serde::Deserialize;
use tracing::debug;

/// How the daemon certificate's names are checked against the connection host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum HostnameVerificationPolicy {
    /// Accept any host name once the chain is valid.
    ///
    /// Long-standing behavior of daemon clients that connect by IP address
    /// or through tunnels. It removes protection against a peer holding any
    /// other certificate issued by the same CA.
    #[default]
    #[serde(alias = "accept-any-hostname")]
    AcceptAny,
    /// Require the certificate's subjectAltName to match the connection host.
    #[serde(alias = "verify-hostname", alias = "strict")]
    Verify,
}

impl HostnameVerificationPolicy {
    pub fn verifies_hostname(self) -> bool {
        matches!(self, Self::Verify)
    }
}

impl std::fmt::Display for HostnameVerificationPolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::AcceptAny => f.write_str("accept-any"),
            Self::Verify => f.write_str("verify"),
        }
    }
}

/// Server certificate verifier used by the daemon client.
#[derive(Debug)]
pub struct DaemonServerCertVerifier {
    inner: Arc<WebPkiServerVerifier>,
    policy: HostnameVerificationPolicy,
}

impl DaemonServerCertVerifier {
    pub fn new(inner: Arc<WebPkiServerVerifier>, policy: HostnameVerificationPolicy) -> Self {
        Self { inner, policy }
    }

    pub fn policy(&self) -> HostnameVerificationPolicy {
        self.policy
    }
}

fn is_name_mismatch(err: &TlsError) -> bool {
    matches!(
        err,
        TlsError::InvalidCertificate(CertificateError::NotValidForName)
            | TlsError::InvalidCertificate(CertificateError::NotValidForNameContext { .. })
    )
}

impl ServerCertVerifier for DaemonServerCertVerifier {
    fn verify_server_cert(
        &self,
        end_entity: &CertificateDer<'_>,
        intermediates: &[CertificateDer<'_>],
        server_name: &ServerName<'_>,
        ocsp_response: &[u8],
        now: UnixTime,
    ) -> Result<ServerCertVerified, TlsError> {
        match self
            .inner
            .verify_server_cert(end_entity, intermediates, server_name, ocsp_response, now)
        {
            Ok(verified) => Ok(verified),
            Err(e) if self.policy == HostnameVerificationPolicy::AcceptAny && is_name_mismatch(&e) => {
                debug!(
                    server_name = ?server_name,
                    "daemon certificate does not match host name; accepted by policy"
                );
                Ok(ServerCertVerified::assertion())
            }
            Err(e) => Err(e),
        }
    }

    fn verify_tls12_signature(
        &self,
        message: &[u8],
        cert: &CertificateDer<'_>,
        dss: &DigitallySignedStruct,
    ) -> Result<HandshakeSignatureValid, TlsError> {
        self.inner.verify_tls12_signature(message, cert, dss)
    }

    fn verify_tls13_signature(
        &self,
        message: &[u8],
        cert: &CertificateDer<'_>,
        dss: &DigitallySignedStruct,
    ) -> Result<HandshakeSignatureValid, TlsError> {
        self.inner.verify_tls13_signature(message, cert, dss)
    }

    fn supported_verify_schemes(&self) -> Vec<SignatureScheme> {
        self.inner.supported_verify_schemes()
    }
}

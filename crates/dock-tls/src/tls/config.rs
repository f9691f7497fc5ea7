//! TLS context assembly for the daemon client.
//!
//! Combines the [`TrustStore`] and [`IdentityStore`] into a single
//! `rustls::ClientConfig`.
//!
//! The config enforces:
//! - TLS 1.3 and TLS 1.2 only, pinned explicitly
//! - Ring crypto provider
//! - The configured CA as the only trust anchor (no platform roots)
//! - The client certificate + key presented for client authentication
//! - Host name checking according to [`HostnameVerificationPolicy`]

use std::sync::Arc;

use rustls::client::{ResolvesClientCert, WebPkiServerVerifier};
use rustls::crypto::ring::sign::any_supported_type;
use rustls::sign::CertifiedKey;
use rustls::{ClientConfig, InconsistentKeys, SignatureScheme, SupportedProtocolVersion};
use tracing::{info, warn};

use crate::error::{Result, TlsSetupError};
use crate::store::{IdentityStore, TrustStore};
use crate::tls::verifier::{DaemonServerCertVerifier, HostnameVerificationPolicy};

/// Protocol versions offered to the daemon, most preferred first.
pub static PROTOCOL_VERSIONS: &[&SupportedProtocolVersion] =
    &[&rustls::version::TLS13, &rustls::version::TLS12];

/// ALPN identifier offered to the daemon. The transport speaks HTTP/1.1.
pub const ALPN_HTTP_1_1: &[u8] = b"http/1.1";

/// Immutable TLS context shared by every connection to the daemon.
///
/// Cloning is cheap; the underlying `ClientConfig` is reference counted and
/// safe for concurrent use.
#[derive(Debug, Clone)]
pub struct TlsContext {
    config: Arc<ClientConfig>,
    hostname_verification: HostnameVerificationPolicy,
    client_subject: String,
    ca_subject: String,
}

impl TlsContext {
    /// The rustls client configuration to hand to the transport.
    pub fn client_config(&self) -> Arc<ClientConfig> {
        Arc::clone(&self.config)
    }

    pub fn hostname_verification(&self) -> HostnameVerificationPolicy {
        self.hostname_verification
    }

    pub fn protocol_versions(&self) -> &'static [&'static SupportedProtocolVersion] {
        PROTOCOL_VERSIONS
    }

    /// Subject of the client certificate presented to the daemon.
    pub fn client_subject(&self) -> &str {
        &self.client_subject
    }

    /// Subject of the only trusted CA.
    pub fn ca_subject(&self) -> &str {
        &self.ca_subject
    }
}

/// Presents the single client identity to every daemon that asks for one.
#[derive(Debug)]
struct ClientIdentity(Arc<CertifiedKey>);

impl ResolvesClientCert for ClientIdentity {
    fn resolve(
        &self,
        _root_hint_subjects: &[&[u8]],
        _sigschemes: &[SignatureScheme],
    ) -> Option<Arc<CertifiedKey>> {
        Some(Arc::clone(&self.0))
    }

    fn has_certs(&self) -> bool {
        true
    }
}

/// Build the [`TlsContext`] from both stores.
pub fn build_tls_context(
    trust: &TrustStore,
    identity: &IdentityStore,
    hostname_verification: HostnameVerificationPolicy,
) -> Result<TlsContext> {
    let provider = Arc::new(rustls::crypto::ring::default_provider());

    let webpki = WebPkiServerVerifier::builder_with_provider(trust.roots(), Arc::clone(&provider))
        .build()
        .map_err(|e| TlsSetupError::TlsContextBuild(format!("server verifier: {e}")))?;
    let verifier = Arc::new(DaemonServerCertVerifier::new(webpki, hostname_verification));

    // The unlocked key is only borrowed by the signer and zeroed on drop.
    let private_key = identity.unlock()?;
    let signing_key = any_supported_type(&private_key)
        .map_err(|e| TlsSetupError::TlsContextBuild(format!("client key rejected: {e}")))?;
    let certified = CertifiedKey::new(identity.cert_chain(), signing_key);
    match certified.keys_match() {
        Ok(()) | Err(rustls::Error::InconsistentKeys(InconsistentKeys::Unknown)) => {}
        Err(e) => {
            return Err(TlsSetupError::TlsContextBuild(format!(
                "client certificate does not match private key: {e}"
            )))
        }
    }
    drop(private_key);

    let mut config = ClientConfig::builder_with_provider(provider)
        .with_protocol_versions(PROTOCOL_VERSIONS)
        .map_err(|e| TlsSetupError::TlsContextBuild(format!("TLS version config: {e}")))?
        .dangerous()
        .with_custom_certificate_verifier(verifier)
        .with_client_cert_resolver(Arc::new(ClientIdentity(Arc::new(certified))));

    config.alpn_protocols = vec![ALPN_HTTP_1_1.to_vec()];

    if !hostname_verification.verifies_hostname() {
        warn!(
            policy = %hostname_verification,
            "daemon host name verification is disabled; any certificate issued by the configured CA is accepted"
        );
    }

    info!(
        client = %identity.certificate().subject(),
        ca = %trust.ca_certificate().subject(),
        policy = %hostname_verification,
        "daemon TLS context ready"
    );

    Ok(TlsContext {
        config: Arc::new(config),
        hostname_verification,
        client_subject: identity.certificate().subject().to_string(),
        ca_subject: trust.ca_certificate().subject().to_string(),
    })
}

//! In-memory trust and identity stores.
//!
//! [`TrustStore`] holds exactly one trust anchor: the configured CA. It
//! defines which daemon certificates are acceptable. Platform roots are never
//! added.
//!
//! [`IdentityStore`] holds exactly one certificate + private key entry: the
//! client identity presented during the handshake. The key is kept sealed
//! (ChaCha20-Poly1305) under a store-local passphrase that is generated
//! randomly when the store is built. The passphrase never leaves the store and
//! is zeroed on drop.
//!
//! Neither store is ever written to disk.

use std::sync::Arc;

use chacha20poly1305::aead::{Aead, KeyInit};
use chacha20poly1305::{ChaCha20Poly1305, Key, Nonce};
use rand::rngs::OsRng;
use rand::RngCore;
use rustls::RootCertStore;
use rustls_pki_types::{CertificateDer, PrivateKeyDer, PrivatePkcs8KeyDer};
use tracing::{debug, warn};
use zeroize::{Zeroize, ZeroizeOnDrop, Zeroizing};

use crate::credentials::{Credentials, KeyContainer, ParsedCertificate, ParsedPrivateKey};
use crate::error::{Result, TlsSetupError};

/// Alias of the single trust store entry.
pub const CA_ALIAS: &str = "ca";

/// Alias of the single identity store entry.
pub const CLIENT_ALIAS: &str = "client";

const NONCE_LEN: usize = 12;

/// Trust anchors used to validate the daemon's certificate chain.
#[derive(Debug, Clone)]
pub struct TrustStore {
    ca_cert: ParsedCertificate,
    roots: Arc<RootCertStore>,
}

impl TrustStore {
    /// Build a store whose only trust anchor is `ca_cert`.
    pub fn new(ca_cert: ParsedCertificate) -> Result<Self> {
        if !ca_cert.summary().is_ca {
            warn!(
                subject = %ca_cert.subject(),
                "trusted certificate is not marked as a CA; only an identical self-signed peer can chain to it"
            );
        }

        let mut roots = RootCertStore::empty();
        roots.add(ca_cert.der().clone()).map_err(|e| {
            TlsSetupError::StoreInitialization(format!(
                "CA certificate rejected as trust anchor: {e}"
            ))
        })?;

        Ok(Self {
            ca_cert,
            roots: Arc::new(roots),
        })
    }

    pub fn alias(&self) -> &'static str {
        CA_ALIAS
    }

    pub fn ca_certificate(&self) -> &ParsedCertificate {
        &self.ca_cert
    }

    /// Number of trust anchors. Always 1.
    pub fn len(&self) -> usize {
        self.roots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.roots.is_empty()
    }

    pub(crate) fn roots(&self) -> Arc<RootCertStore> {
        Arc::clone(&self.roots)
    }
}

/// Random per-store secret that seals the identity key.
#[derive(Zeroize, ZeroizeOnDrop)]
struct StorePassphrase([u8; 32]);

impl StorePassphrase {
    fn generate() -> Result<Self> {
        let mut bytes = [0u8; 32];
        OsRng.try_fill_bytes(&mut bytes).map_err(|e| {
            TlsSetupError::StoreInitialization(format!("OS RNG unavailable: {e}"))
        })?;
        Ok(Self(bytes))
    }

    fn cipher(&self) -> ChaCha20Poly1305 {
        ChaCha20Poly1305::new(Key::from_slice(&self.0))
    }
}

/// The client certificate and its private key, under one alias.
pub struct IdentityStore {
    certificate: ParsedCertificate,
    container: KeyContainer,
    sealed_key: Vec<u8>,
    nonce: [u8; NONCE_LEN],
    passphrase: StorePassphrase,
}

impl IdentityStore {
    /// Build a store holding `certificate` and `key`.
    ///
    /// The key is consumed; its plaintext buffer is zeroed once sealed.
    pub fn new(certificate: ParsedCertificate, key: ParsedPrivateKey) -> Result<Self> {
        let passphrase = StorePassphrase::generate()?;

        let mut nonce = [0u8; NONCE_LEN];
        OsRng.try_fill_bytes(&mut nonce).map_err(|e| {
            TlsSetupError::StoreInitialization(format!("OS RNG unavailable: {e}"))
        })?;

        let sealed_key = passphrase
            .cipher()
            .encrypt(Nonce::from_slice(&nonce), key.secret_pkcs8_der())
            .map_err(|_| {
                TlsSetupError::StoreInitialization("failed to seal identity key".to_string())
            })?;

        Ok(Self {
            certificate,
            container: key.container(),
            sealed_key,
            nonce,
            passphrase,
        })
    }

    pub fn alias(&self) -> &'static str {
        CLIENT_ALIAS
    }

    pub fn certificate(&self) -> &ParsedCertificate {
        &self.certificate
    }

    /// Container the key was originally loaded from.
    pub fn key_container(&self) -> KeyContainer {
        self.container
    }

    /// Certificate chain presented to the daemon.
    pub(crate) fn cert_chain(&self) -> Vec<CertificateDer<'static>> {
        vec![self.certificate.der().clone()]
    }

    /// Unseal the private key for TLS context assembly.
    ///
    /// The returned key is zeroed when dropped.
    pub(crate) fn unlock(&self) -> Result<Zeroizing<PrivateKeyDer<'static>>> {
        let plaintext = self
            .passphrase
            .cipher()
            .decrypt(Nonce::from_slice(&self.nonce), self.sealed_key.as_slice())
            .map_err(|_| {
                TlsSetupError::TlsContextBuild("failed to unlock identity key".to_string())
            })?;
        Ok(Zeroizing::new(PrivateKeyDer::Pkcs8(
            PrivatePkcs8KeyDer::from(plaintext),
        )))
    }
}

impl std::fmt::Debug for IdentityStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("IdentityStore")
            .field("alias", &CLIENT_ALIAS)
            .field("subject", &self.certificate.subject())
            .field("key_container", &self.container)
            .finish_non_exhaustive()
    }
}

/// Build both stores from freshly loaded credentials.
///
/// Either both stores are returned fully built or neither is.
pub fn build_stores(credentials: Credentials) -> Result<(TrustStore, IdentityStore)> {
    let Credentials {
        ca_cert,
        client_cert,
        client_key,
    } = credentials;

    let trust = TrustStore::new(ca_cert)?;
    let identity = IdentityStore::new(client_cert, client_key)?;

    debug!(
        trust_alias = trust.alias(),
        identity_alias = identity.alias(),
        client_subject = %identity.certificate().subject(),
        "trust and identity stores built"
    );

    Ok((trust, identity))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;

    const CA_PEM: &[u8] = include_bytes!("../tests/fixtures/certs/ca.pem");
    const CLIENT_CERT_PEM: &[u8] = include_bytes!("../tests/fixtures/certs/cert.pem");
    const LEGACY_KEY_PEM: &[u8] = include_bytes!("../tests/fixtures/certs/key.pem");
    const PKCS8_KEY_PEM: &[u8] = include_bytes!("../tests/fixtures/certs/key-pkcs8.pem");

    fn cert(pem: &[u8]) -> ParsedCertificate {
        ParsedCertificate::from_pem(Path::new("fixture.pem"), pem).expect("fixture cert")
    }

    fn key(pem: &[u8]) -> ParsedPrivateKey {
        ParsedPrivateKey::from_pem(Path::new("fixture.pem"), pem).expect("fixture key")
    }

    #[test]
    fn trust_store_holds_exactly_the_ca() {
        let store = TrustStore::new(cert(CA_PEM)).expect("trust store");
        assert_eq!(store.len(), 1);
        assert!(!store.is_empty());
        assert_eq!(store.alias(), "ca");
        assert_eq!(store.ca_certificate().subject(), "CN=dock-tls test CA");
    }

    #[test]
    fn identity_store_unlocks_to_original_key() {
        let original = key(PKCS8_KEY_PEM);
        let expected = original.secret_pkcs8_der().to_vec();

        let store = IdentityStore::new(cert(CLIENT_CERT_PEM), original).expect("identity store");
        let unlocked: Zeroizing<PrivateKeyDer<'static>> = store.unlock().expect("unlock");

        match &*unlocked {
            PrivateKeyDer::Pkcs8(der) => assert_eq!(der.secret_pkcs8_der(), expected.as_slice()),
            other => panic!("expected PKCS#8 key, got {other:?}"),
        }
    }

    #[test]
    fn identity_store_does_not_hold_plaintext_key() {
        let original = key(PKCS8_KEY_PEM);
        let plaintext = original.secret_pkcs8_der().to_vec();

        let store = IdentityStore::new(cert(CLIENT_CERT_PEM), original).unwrap();
        let prefix = &plaintext[..32];
        assert!(!store.sealed_key.windows(prefix.len()).any(|w| w == prefix));
    }

    #[test]
    fn each_store_gets_its_own_passphrase() {
        let a = IdentityStore::new(cert(CLIENT_CERT_PEM), key(PKCS8_KEY_PEM)).unwrap();
        let b = IdentityStore::new(cert(CLIENT_CERT_PEM), key(PKCS8_KEY_PEM)).unwrap();
        assert_ne!(a.passphrase.0, b.passphrase.0);
        assert_ne!(a.sealed_key, b.sealed_key);
    }

    #[test]
    fn identity_store_remembers_key_container() {
        let store = IdentityStore::new(cert(CLIENT_CERT_PEM), key(LEGACY_KEY_PEM)).unwrap();
        assert_eq!(store.key_container(), KeyContainer::LegacyRsa);
        assert_eq!(store.alias(), "client");
        assert_eq!(store.cert_chain().len(), 1);
    }

    #[test]
    fn debug_output_omits_key_material() {
        let store = IdentityStore::new(cert(CLIENT_CERT_PEM), key(PKCS8_KEY_PEM)).unwrap();
        let debug = format!("{store:?}");
        assert!(debug.contains("CN=dock-client"));
        assert!(!debug.contains("sealed_key"));
        assert!(!debug.contains("passphrase"));
    }

    #[test]
    fn build_stores_returns_both() {
        let credentials = Credentials {
            ca_cert: cert(CA_PEM),
            client_cert: cert(CLIENT_CERT_PEM),
            client_key: key(LEGACY_KEY_PEM),
        };
        let (trust, identity) = build_stores(credentials).expect("stores");
        assert_eq!(trust.len(), 1);
        assert_eq!(identity.certificate().subject(), "CN=dock-client");
    }
}

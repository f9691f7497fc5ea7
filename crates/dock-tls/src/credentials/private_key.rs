//! Client private key loading and normalization to PKCS#8.
//!
//! Two PEM containers are accepted for RSA keys:
//!
//! - `PRIVATE KEY`: a PKCS#8 document, used as-is.
//! - `RSA PRIVATE KEY`: the legacy key-pair container (PKCS#1). The embedded
//!   RSAPrivateKey is wrapped into a PKCS#8 PrivateKeyInfo so the rest of the
//!   crate only ever sees one encoding.
//!
//! The container is decided from the PEM label at parse time. Key bytes live
//! in [`Zeroizing`] buffers and are never printed.
//!
//! Reference: `pkcs1` / `pkcs8` crates (RustCrypto, MIT/Apache-2.0)

use std::path::Path;

use pkcs1::der::{Decode, Encode};
use pkcs8::{ObjectIdentifier, PrivateKeyInfo};
use rustls_pki_types::pem::{self, PemObject};
use rustls_pki_types::PrivateKeyDer;
use zeroize::Zeroizing;

use crate::error::{Result, TlsSetupError};

const OID_EC_PUBLIC_KEY: ObjectIdentifier = ObjectIdentifier::new_unwrap("1.2.840.10045.2.1");
const OID_ED25519: ObjectIdentifier = ObjectIdentifier::new_unwrap("1.3.101.112");
const OID_DSA: ObjectIdentifier = ObjectIdentifier::new_unwrap("1.2.840.10040.4.1");
const OID_RSASSA_PSS: ObjectIdentifier = ObjectIdentifier::new_unwrap("1.2.840.113549.1.1.10");

/// The PEM container a key was read from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyContainer {
    /// `PRIVATE KEY`: PKCS#8 used directly.
    Pkcs8,
    /// `RSA PRIVATE KEY`: legacy PKCS#1 key pair, re-encoded as PKCS#8.
    LegacyRsa,
}

/// An RSA private key, normalized to PKCS#8 DER.
///
/// Consumed by [`IdentityStore::new`](crate::store::IdentityStore::new); the
/// plaintext buffer is zeroed when this value is dropped.
pub struct ParsedPrivateKey {
    pkcs8_der: Zeroizing<Vec<u8>>,
    container: KeyContainer,
}

impl ParsedPrivateKey {
    /// Read and decode the key file at `path`.
    pub fn load(path: &Path) -> Result<Self> {
        let pem = Zeroizing::new(
            std::fs::read(path)
                .map_err(|e| TlsSetupError::key_parse(path, format!("read failed: {e}")))?,
        );
        Self::from_pem(path, &pem)
    }

    /// Decode the leading private-key PEM block. `origin` is only used in
    /// error messages.
    pub fn from_pem(origin: &Path, pem: &[u8]) -> Result<Self> {
        if pem.iter().all(u8::is_ascii_whitespace) {
            return Err(TlsSetupError::key_parse(origin, "file is empty"));
        }

        let key = Zeroizing::new(PrivateKeyDer::from_pem_slice(pem).map_err(|e| match e {
            pem::Error::NoItemsFound => unrecognized_key_block(origin, pem),
            other => TlsSetupError::key_parse(origin, format!("malformed PEM: {other}")),
        })?);

        match &*key {
            PrivateKeyDer::Pkcs8(der) => Self::from_pkcs8(origin, der.secret_pkcs8_der()),
            PrivateKeyDer::Pkcs1(der) => Self::from_legacy_rsa(origin, der.secret_pkcs1_der()),
            PrivateKeyDer::Sec1(_) => Err(TlsSetupError::unsupported_key(origin, "EC (SEC1)")),
            _ => Err(TlsSetupError::unsupported_key(origin, "unknown key container")),
        }
    }

    fn from_pkcs8(origin: &Path, der: &[u8]) -> Result<Self> {
        let info = PrivateKeyInfo::try_from(der).map_err(|e| {
            TlsSetupError::key_parse(origin, format!("invalid PKCS#8 document: {e}"))
        })?;

        if info.algorithm.oid != pkcs1::ALGORITHM_OID {
            return Err(TlsSetupError::unsupported_key(
                origin,
                algorithm_name(&info.algorithm.oid),
            ));
        }

        pkcs1::RsaPrivateKey::from_der(info.private_key)
            .map_err(|e| TlsSetupError::key_parse(origin, format!("invalid RSA key: {e}")))?;

        Ok(Self {
            pkcs8_der: Zeroizing::new(der.to_vec()),
            container: KeyContainer::Pkcs8,
        })
    }

    fn from_legacy_rsa(origin: &Path, pkcs1_der: &[u8]) -> Result<Self> {
        pkcs1::RsaPrivateKey::from_der(pkcs1_der)
            .map_err(|e| TlsSetupError::key_parse(origin, format!("invalid RSA key: {e}")))?;

        let info = PrivateKeyInfo::new(pkcs1::ALGORITHM_ID, pkcs1_der);
        let pkcs8_der = info.to_der().map_err(|e| {
            TlsSetupError::key_parse(origin, format!("PKCS#8 re-encoding failed: {e}"))
        })?;

        Ok(Self {
            pkcs8_der: Zeroizing::new(pkcs8_der),
            container: KeyContainer::LegacyRsa,
        })
    }

    /// The PKCS#8 DER encoding of the key.
    ///
    /// **Security:** secret material. Do not log or persist.
    pub fn secret_pkcs8_der(&self) -> &[u8] {
        &self.pkcs8_der
    }

    pub fn container(&self) -> KeyContainer {
        self.container
    }
}

impl std::fmt::Debug for ParsedPrivateKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ParsedPrivateKey")
            .field("container", &self.container)
            .field("pkcs8_der", &"<redacted>")
            .finish()
    }
}

/// Classify a file in which no supported key block was found, by its PEM
/// labels. Any other `* PRIVATE KEY` container is a non-RSA key.
fn unrecognized_key_block(origin: &Path, pem: &[u8]) -> TlsSetupError {
    match section_labels(pem).find(|label| label.ends_with("PRIVATE KEY")) {
        Some("ENCRYPTED PRIVATE KEY") => {
            TlsSetupError::key_parse(origin, "encrypted private keys are not supported")
        }
        Some(label) => TlsSetupError::unsupported_key(origin, label),
        None => TlsSetupError::key_parse(origin, "no private key block found"),
    }
}

fn section_labels(pem: &[u8]) -> impl Iterator<Item = &str> {
    pem.split(|b| *b == b'\n')
        .filter_map(|line| line.trim_ascii().strip_prefix(b"-----BEGIN "))
        .filter_map(|rest| rest.strip_suffix(b"-----"))
        .filter_map(|label| std::str::from_utf8(label).ok())
}

fn algorithm_name(oid: &ObjectIdentifier) -> String {
    let known = [
        (OID_EC_PUBLIC_KEY, "EC"),
        (OID_ED25519, "Ed25519"),
        (OID_DSA, "DSA"),
        (OID_RSASSA_PSS, "RSASSA-PSS"),
    ];
    known
        .iter()
        .find(|(known_oid, _)| known_oid == oid)
        .map(|(_, name)| name.to_string())
        .unwrap_or_else(|| oid.to_string())
}

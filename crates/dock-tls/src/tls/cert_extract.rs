//! Inspect X.509 DER certificates.
//!
//! Used when loading PEM material (to reject blocks that are not real
//! certificates) and after a handshake to describe the daemon's leaf
//! certificate. Nothing here makes trust decisions; chain validation is
//! delegated to webpki through rustls.
//!
//! Reference: `x509-parser` crate (rusticata, MIT/Apache-2.0)

use data_encoding::HEXLOWER;
use sha2::{Digest, Sha256};
use x509_parser::extensions::GeneralName;
use x509_parser::prelude::*;
use x509_parser::public_key::PublicKey;

/// Human-readable facts about a certificate, for logging and diagnostics.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CertificateSummary {
    /// Subject distinguished name, RFC 4514 style.
    pub subject: String,
    /// Issuer distinguished name.
    pub issuer: String,
    /// DNS names and IP addresses from the subjectAltName extension.
    pub subject_alt_names: Vec<String>,
    /// Public key algorithm, e.g. `RSA-2048` or `EC`.
    pub key_algorithm: String,
    /// Whether basicConstraints marks this certificate as a CA.
    pub is_ca: bool,
    /// Expiry as seconds since Unix epoch.
    pub not_after_epoch: i64,
    /// SHA-256 of the DER encoding, lowercase hex.
    pub fingerprint_sha256: String,
}

/// Decode a DER certificate and summarize it.
///
/// Returns a description of the problem if the bytes are not exactly one
/// well-formed X.509 certificate.
pub fn summarize_certificate(cert_der: &[u8]) -> Result<CertificateSummary, String> {
    let (rest, cert) =
        X509Certificate::from_der(cert_der).map_err(|e| format!("X.509 parse error: {e}"))?;
    if !rest.is_empty() {
        return Err(format!("{} trailing bytes after certificate", rest.len()));
    }

    let subject_alt_names = match cert.subject_alternative_name() {
        Ok(Some(san)) => san
            .value
            .general_names
            .iter()
            .filter_map(general_name_to_string)
            .collect(),
        Ok(None) => Vec::new(),
        Err(e) => return Err(format!("invalid subjectAltName extension: {e}")),
    };

    Ok(CertificateSummary {
        subject: cert.subject().to_string(),
        issuer: cert.issuer().to_string(),
        subject_alt_names,
        key_algorithm: key_algorithm(cert.public_key()),
        is_ca: cert.is_ca(),
        not_after_epoch: cert.validity().not_after.timestamp(),
        fingerprint_sha256: fingerprint_sha256(cert_der),
    })
}

/// SHA-256 fingerprint of a DER blob, lowercase hex.
pub fn fingerprint_sha256(der: &[u8]) -> String {
    HEXLOWER.encode(&Sha256::digest(der))
}

fn key_algorithm(spki: &SubjectPublicKeyInfo<'_>) -> String {
    match spki.parsed() {
        Ok(PublicKey::RSA(rsa)) => format!("RSA-{}", rsa.key_size()),
        Ok(PublicKey::EC(_)) => "EC".to_string(),
        Ok(PublicKey::DSA(_)) => "DSA".to_string(),
        _ => spki.algorithm.algorithm.to_id_string(),
    }
}

fn general_name_to_string(name: &GeneralName<'_>) -> Option<String> {
    match name {
        GeneralName::DNSName(dns) => Some(dns.to_string()),
        GeneralName::IPAddress(bytes) => match bytes.len() {
            4 => {
                let octets: [u8; 4] = (*bytes).try_into().ok()?;
                Some(std::net::Ipv4Addr::from(octets).to_string())
            }
            16 => {
                let octets: [u8; 16] = (*bytes).try_into().ok()?;
                Some(std::net::Ipv6Addr::from(octets).to_string())
            }
            _ => None,
        },
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rustls_pki_types::pem::PemObject;
    use rustls_pki_types::CertificateDer;

    const SERVER_CERT_PEM: &[u8] = include_bytes!("../../tests/fixtures/certs/server-cert.pem");
    const CA_PEM: &[u8] = include_bytes!("../../tests/fixtures/certs/ca.pem");

    fn der_of(pem: &[u8]) -> CertificateDer<'static> {
        CertificateDer::from_pem_slice(pem).expect("fixture should be valid PEM")
    }

    #[test]
    fn summarizes_server_leaf() {
        let summary = summarize_certificate(&der_of(SERVER_CERT_PEM)).expect("summary");
        assert_eq!(summary.subject, "CN=localhost");
        assert_eq!(summary.issuer, "CN=dock-tls test CA");
        assert!(summary.subject_alt_names.contains(&"localhost".to_string()));
        assert!(summary.subject_alt_names.contains(&"127.0.0.1".to_string()));
        assert_eq!(summary.key_algorithm, "RSA-2048");
        assert!(!summary.is_ca);
    }

    #[test]
    fn ca_is_flagged_as_ca() {
        let summary = summarize_certificate(&der_of(CA_PEM)).expect("summary");
        assert!(summary.is_ca);
        assert_eq!(summary.subject, summary.issuer);
    }

    #[test]
    fn fingerprint_is_stable_hex() {
        let der = der_of(CA_PEM);
        let a = fingerprint_sha256(&der);
        let b = fingerprint_sha256(&der);
        assert_eq!(a, b);
        assert_eq!(a.len(), 64);
        assert!(a.chars().all(|c| c.is_ascii_hexdigit() && !c.is_ascii_uppercase()));
    }

    #[test]
    fn rejects_garbage_input() {
        assert!(summarize_certificate(b"not a certificate").is_err());
    }

    #[test]
    fn rejects_empty_input() {
        assert!(summarize_certificate(b"").is_err());
    }

    #[test]
    fn rejects_trailing_bytes() {
        let mut der = der_of(CA_PEM).to_vec();
        der.extend_from_slice(&[0, 0, 0]);
        let err = summarize_certificate(&der).unwrap_err();
        assert!(err.contains("trailing"));
    }
}

//! Credential loading: CA certificate, client certificate, client key.
//!
//! Every call re-reads the three files from disk. Nothing is cached between
//! constructions, so replacing the files on disk takes effect on the next build.

pub mod certificate;
pub mod private_key;

pub use certificate::ParsedCertificate;
pub use private_key::{KeyContainer, ParsedPrivateKey};

use tracing::debug;

use crate::bundle::CertificateBundle;
use crate::error::Result;

/// The three parsed artifacts of a [`CertificateBundle`].
#[derive(Debug)]
pub struct Credentials {
    pub ca_cert: ParsedCertificate,
    pub client_cert: ParsedCertificate,
    pub client_key: ParsedPrivateKey,
}

/// Read and parse every file referenced by `bundle`.
pub fn load(bundle: &CertificateBundle) -> Result<Credentials> {
    let ca_cert = ParsedCertificate::load(bundle.ca_cert_path())?;
    debug!(
        path = %bundle.ca_cert_path().display(),
        subject = %ca_cert.subject(),
        fingerprint = %ca_cert.fingerprint_sha256(),
        "loaded CA certificate"
    );

    let client_cert = ParsedCertificate::load(bundle.client_cert_path())?;
    debug!(
        path = %bundle.client_cert_path().display(),
        subject = %client_cert.subject(),
        fingerprint = %client_cert.fingerprint_sha256(),
        "loaded client certificate"
    );

    let client_key = ParsedPrivateKey::load(bundle.client_key_path())?;
    debug!(
        path = %bundle.client_key_path().display(),
        container = ?client_key.container(),
        "loaded client private key"
    );

    Ok(Credentials {
        ca_cert,
        client_cert,
        client_key,
    })
}

//! Error types for building a daemon mTLS context.
//!
//! Every failure is terminal for the construction attempt that raised it.
//! The caller decides whether to retry with different paths.

use std::path::{Path, PathBuf};

use thiserror::Error;

/// Errors that can occur while loading credentials and assembling a
/// [`TlsContext`](crate::tls::TlsContext).
#[derive(Debug, Error)]
pub enum TlsSetupError {
    // --- Configuration ---
    #[error("configuration error: {0}")]
    Configuration(String),

    // --- Credential loading ---
    #[error("failed to parse certificate {}: {reason}", path.display())]
    CertificateParse { path: PathBuf, reason: String },

    #[error("failed to parse private key {}: {reason}", path.display())]
    KeyParse { path: PathBuf, reason: String },

    #[error("unsupported private key algorithm in {}: {algorithm}", path.display())]
    UnsupportedKeyAlgorithm { path: PathBuf, algorithm: String },

    // --- Stores ---
    #[error("store initialization failed: {0}")]
    StoreInitialization(String),

    // --- Assembly ---
    #[error("TLS context build failed: {0}")]
    TlsContextBuild(String),
}

impl TlsSetupError {
    pub(crate) fn certificate_parse(path: &Path, reason: impl Into<String>) -> Self {
        Self::CertificateParse {
            path: path.to_path_buf(),
            reason: reason.into(),
        }
    }

    pub(crate) fn key_parse(path: &Path, reason: impl Into<String>) -> Self {
        Self::KeyParse {
            path: path.to_path_buf(),
            reason: reason.into(),
        }
    }

    pub(crate) fn unsupported_key(path: &Path, algorithm: impl Into<String>) -> Self {
        Self::UnsupportedKeyAlgorithm {
            path: path.to_path_buf(),
            algorithm: algorithm.into(),
        }
    }
}

/// Result type alias using [`TlsSetupError`].
pub type Result<T> = std::result::Result<T, TlsSetupError>;

//! Verified TLS connection wrapper (client-side).
//!
//! After the handshake succeeds, `DaemonConnection` wraps the tokio-rustls
//! stream. Reads and writes go straight through to the TLS session.

use std::io;
use std::net::SocketAddr;
use std::pin::Pin;
use std::task::{Context, Poll};

use dock_tls::tls::cert_extract::{summarize_certificate, CertificateSummary};
use rustls::ProtocolVersion;
use rustls_pki_types::CertificateDer;
use tokio::io::{AsyncRead, AsyncWrite, ReadBuf};
use tokio::net::TcpStream;
use tokio_rustls::client::TlsStream;

use crate::error::{ClientError, Result};

/// A TLS connection to the daemon whose certificate chained to the configured CA.
pub struct DaemonConnection {
    peer_addr: SocketAddr,
    inner: TlsStream<TcpStream>,
}

impl DaemonConnection {
    pub(crate) fn new(peer_addr: SocketAddr, inner: TlsStream<TcpStream>) -> Self {
        Self { peer_addr, inner }
    }

    pub fn peer_addr(&self) -> SocketAddr {
        self.peer_addr
    }

    /// The daemon's certificate chain, leaf first.
    pub fn peer_certificates(&self) -> &[CertificateDer<'static>] {
        self.inner.get_ref().1.peer_certificates().unwrap_or(&[])
    }

    /// The daemon's leaf certificate.
    pub fn peer_leaf(&self) -> Result<&CertificateDer<'static>> {
        self.peer_certificates()
            .first()
            .ok_or_else(|| ClientError::PeerCertificate("peer certificate chain is empty".into()))
    }

    /// Subject, SANs and fingerprint of the daemon's leaf certificate.
    pub fn peer_summary(&self) -> Result<CertificateSummary> {
        summarize_certificate(self.peer_leaf()?).map_err(ClientError::PeerCertificate)
    }

    pub fn protocol_version(&self) -> Option<ProtocolVersion> {
        self.inner.get_ref().1.protocol_version()
    }

    pub fn alpn_protocol(&self) -> Option<&[u8]> {
        self.inner.get_ref().1.alpn_protocol()
    }

    pub fn into_inner(self) -> TlsStream<TcpStream> {
        self.inner
    }
}

impl std::fmt::Debug for DaemonConnection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DaemonConnection")
            .field("peer_addr", &self.peer_addr)
            .field("protocol_version", &self.protocol_version())
            .finish_non_exhaustive()
    }
}

impl AsyncRead for DaemonConnection {
    fn poll_read(
        mut self: Pin<&mut Self>,
        cx: &mut Context<'_>,
        buf: &mut ReadBuf<'_>,
    ) -> Poll<io::Result<()>> {
        Pin::new(&mut self.inner).poll_read(cx, buf)
    }
}

impl AsyncWrite for DaemonConnection {
    fn poll_write(
        mut self: Pin<&mut Self>,
        cx: &mut Context<'_>,
        buf: &[u8],
    ) -> Poll<io::Result<usize>> {
        Pin::new(&mut self.inner).poll_write(cx, buf)
    }

    fn poll_flush(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<io::Result<()>> {
        Pin::new(&mut self.inner).poll_flush(cx)
    }

    fn poll_shutdown(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<io::Result<()>> {
        Pin::new(&mut self.inner).poll_shutdown(cx)
    }
}

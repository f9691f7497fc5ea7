//! TCP + TLS connector.
//!
//! `DaemonConnector` holds the shared TLS context and opens one TLS session
//! per call to [`DaemonConnector::connect`]. The connector is cheap to clone
//! and safe to share across tasks.

use std::net::SocketAddr;

use dock_tls::{DaemonCertificates, HostnameVerificationPolicy, TlsContext};
use rustls_pki_types::ServerName;
use tokio::net::TcpStream;
use tokio_rustls::TlsConnector;
use tracing::{debug, info};

use crate::connection::DaemonConnection;
use crate::error::{ClientError, Result};

#[derive(Clone)]
pub struct DaemonConnector {
    connector: TlsConnector,
    hostname_verification: HostnameVerificationPolicy,
}

impl DaemonConnector {
    pub fn new(context: &TlsContext) -> Self {
        Self {
            connector: TlsConnector::from(context.client_config()),
            hostname_verification: context.hostname_verification(),
        }
    }

    /// Load credentials from `cert_dir` and build a connector in one step.
    pub fn from_cert_dir(cert_dir: impl AsRef<std::path::Path>) -> Result<Self> {
        let certs = DaemonCertificates::from_dir(cert_dir)?;
        Ok(Self::new(certs.tls_context()))
    }

    pub fn hostname_verification(&self) -> HostnameVerificationPolicy {
        self.hostname_verification
    }

    /// Connect to the daemon at `addr`, presenting `host` as the server name.
    ///
    /// `host` is sent as SNI and, under
    /// [`HostnameVerificationPolicy::Verify`], must match the daemon
    /// certificate. It may be a DNS name or an IP address literal.
    pub async fn connect(&self, addr: SocketAddr, host: &str) -> Result<DaemonConnection> {
        let server_name =
            ServerName::try_from(host.to_string()).map_err(|e| ClientError::InvalidServerName {
                host: host.to_string(),
                reason: e.to_string(),
            })?;

        debug!(%addr, host, "connecting to daemon");
        let tcp = TcpStream::connect(addr)
            .await
            .map_err(|source| ClientError::Connect { addr, source })?;

        let stream = self
            .connector
            .connect(server_name, tcp)
            .await
            .map_err(|source| ClientError::Handshake { addr, source })?;

        let conn = DaemonConnection::new(addr, stream);
        info!(
            %addr,
            host,
            version = ?conn.protocol_version(),
            policy = %self.hostname_verification,
            "connected to daemon"
        );
        Ok(conn)
    }
}

impl std::fmt::Debug for DaemonConnector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DaemonConnector")
            .field("hostname_verification", &self.hostname_verification)
            .finish_non_exhaustive()
    }
}

//! Fire-and-forget audit push to the logging relay.
//!
//! The relay endpoint is resolved once, at construction, and threaded into
//! the service explicitly. Each push opens a fresh TCP connection, writes
//! one line and shuts the socket down — no connection-health tracking, no
//! shared connection state between requests.

use std::io::ErrorKind;
use std::net::SocketAddr;

use tokio::io::AsyncWriteExt;
use tokio::net::{lookup_host, TcpStream};
use tracing::debug;

/// Handle to the audit relay, holding only the resolved address.
#[derive(Debug, Clone)]
pub struct AuditSink {
    addr: SocketAddr,
}

impl AuditSink {
    /// Resolve `spec` (`"host:port"`) once and keep the first address.
    pub async fn resolve(spec: &str) -> std::io::Result<Self> {
        let addr = lookup_host(spec).await?.next().ok_or_else(|| {
            std::io::Error::new(
                ErrorKind::NotFound,
                format!("no address found for audit relay {spec}"),
            )
        })?;
        debug!(%spec, %addr, "resolved audit relay");
        Ok(Self { addr })
    }

    /// Construct from an already-known address (used by tests).
    pub const fn from_addr(addr: SocketAddr) -> Self {
        Self { addr }
    }

    /// Push one audit line over a fresh connection.
    ///
    /// The shutdown before drop makes sure the line is fully sent; errors
    /// bubble up to the caller, which treats them as best-effort.
    pub async fn push(&self, line: &str) -> std::io::Result<()> {
        let mut stream = TcpStream::connect(self.addr).await?;
        stream.write_all(line.as_bytes()).await?;
        stream.shutdown().await?;
        Ok(())
    }
}

//! Audit relay: a single-connection TCP sink for plaintext audit lines.
//!
//! State machine: Listening → Connected → Draining → Listening, forever.
//! Received bytes are appended verbatim to the log file with a flush after
//! every write; the relay never parses them. Exactly one logical peer is
//! assumed — there is no concurrent-connection handling, and a read or
//! accept error terminates the relay.

use std::path::Path;

use anyhow::{Context, Result};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;
use tracing::info;

/// Bound listener plus the open log file.
#[derive(Debug)]
pub struct AuditRelay {
    listener: TcpListener,
    log: tokio::fs::File,
}

impl AuditRelay {
    /// Bind to `addr` and open (or create) the log file in append mode.
    /// Either failure is fatal at startup.
    pub async fn bind(addr: &str, log_path: &Path) -> Result<Self> {
        let log = std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(log_path)
            .with_context(|| format!("Failed to open log file {}", log_path.display()))?;
        let listener = TcpListener::bind(addr)
            .await
            .with_context(|| format!("Failed to bind audit relay to {addr}"))?;
        Ok(Self {
            listener,
            log: tokio::fs::File::from_std(log),
        })
    }

    /// The locally bound address (useful when binding to port 0).
    pub fn local_addr(&self) -> Result<std::net::SocketAddr> {
        self.listener
            .local_addr()
            .context("Failed to read local address")
    }

    /// Accept one connection at a time and drain it into the log file.
    ///
    /// Returns only on error; an orderly peer disconnect (zero-length read)
    /// loops back to accepting the next connection.
    pub async fn run(mut self) -> Result<()> {
        info!(addr = %self.local_addr()?, "audit relay listening");
        loop {
            let (mut stream, peer) = self
                .listener
                .accept()
                .await
                .context("Audit relay accept failed")?;
            info!(%peer, "audit client connected");

            let mut buf = [0u8; 2048];
            loop {
                let n = stream
                    .read(&mut buf)
                    .await
                    .context("Audit relay read failed")?;
                if n == 0 {
                    info!(%peer, "audit client disconnected");
                    break;
                }
                self.log
                    .write_all(&buf[..n])
                    .await
                    .context("Failed to append to log file")?;
                self.log.flush().await.context("Failed to flush log file")?;
            }
        }
    }
}

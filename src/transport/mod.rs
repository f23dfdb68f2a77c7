//! Transport layer for client ↔ server communication.
//!
//! Provides the `RequestChannel` trait and the length-prefixed JSON framing
//! functions. The framing is transport-agnostic: any ordered byte stream
//! that preserves the request fields and returns the verdict unmodified
//! satisfies the contract. `TcpChannel` is the one shipped implementation.

pub mod protocol;
pub mod tcp;

pub use protocol::{Request, Response};
pub use tcp::TcpChannel;

use anyhow::Result;
use async_trait::async_trait;

/// Maximum message size (64 MB). Safety valve against malformed frames.
const MAX_MESSAGE_SIZE: u32 = 64 * 1024 * 1024;

/// A "send request, receive response" channel to an execution server.
///
/// The engine and the client binary only depend on this; connection
/// details (TCP, in-process test doubles, ...) live behind it.
#[async_trait]
pub trait RequestChannel: Send + Sync {
    /// Send a request and wait for the matching response.
    async fn request(&mut self, req: &Request) -> Result<Response>;
}

/// Write a length-prefixed message to a writer.
///
/// Format: [4-byte big-endian length][payload bytes]
pub async fn send_message<W: tokio::io::AsyncWriteExt + Unpin>(
    writer: &mut W,
    payload: &[u8],
) -> Result<()> {
    let len = u32::try_from(payload.len())
        .map_err(|_| anyhow::anyhow!("Message too large: {} bytes", payload.len()))?;
    anyhow::ensure!(
        len <= MAX_MESSAGE_SIZE,
        "Message exceeds max size: {len} > {MAX_MESSAGE_SIZE}"
    );

    writer.write_all(&len.to_be_bytes()).await?;
    writer.write_all(payload).await?;
    writer.flush().await?;
    Ok(())
}

/// Read a length-prefixed message from a reader.
///
/// Returns the raw payload bytes. Enforces `MAX_MESSAGE_SIZE`.
pub async fn recv_message<R: tokio::io::AsyncReadExt + Unpin>(reader: &mut R) -> Result<Vec<u8>> {
    let mut len_buf = [0u8; 4];
    reader.read_exact(&mut len_buf).await?;
    let len = u32::from_be_bytes(len_buf);

    anyhow::ensure!(
        len <= MAX_MESSAGE_SIZE,
        "Message exceeds max size: {len} > {MAX_MESSAGE_SIZE}"
    );

    let mut buf = vec![0u8; len as usize];
    reader.read_exact(&mut buf).await?;
    Ok(buf)
}

/// True when the error is an orderly peer disconnect rather than a fault.
pub(crate) fn is_disconnect(err: &anyhow::Error) -> bool {
    err.downcast_ref::<std::io::Error>().is_some_and(|io| {
        matches!(
            io.kind(),
            std::io::ErrorKind::UnexpectedEof | std::io::ErrorKind::ConnectionReset
        )
    })
}

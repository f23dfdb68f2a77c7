//! TCP implementation of the request channel.
//!
//! One connection, framed JSON messages. The connection stays open across
//! requests, so a client may issue several Execute calls before dropping it.

use anyhow::{Context, Result};
use async_trait::async_trait;
use tokio::net::TcpStream;
use tracing::debug;

use super::{recv_message, send_message, Request, RequestChannel, Response};

/// A framed-JSON request channel over one TCP connection.
pub struct TcpChannel {
    stream: TcpStream,
}

impl TcpChannel {
    /// Connect to an execution server at `addr` (e.g. `"127.0.0.1:5555"`).
    pub async fn connect(addr: &str) -> Result<Self> {
        let stream = TcpStream::connect(addr)
            .await
            .with_context(|| format!("Failed to connect to execution server at {addr}"))?;
        debug!(%addr, "connected to execution server");
        Ok(Self { stream })
    }
}

#[async_trait]
impl RequestChannel for TcpChannel {
    async fn request(&mut self, req: &Request) -> Result<Response> {
        let req_bytes = serde_json::to_vec(req).context("Failed to serialize request")?;
        send_message(&mut self.stream, &req_bytes)
            .await
            .context("Failed to send request")?;

        let resp_bytes = recv_message(&mut self.stream)
            .await
            .context("Failed to read response")?;
        let resp: Response =
            serde_json::from_slice(&resp_bytes).context("Failed to parse response")?;

        Ok(resp)
    }
}

//! TCP execution server.
//!
//! Accepts connections and spawns one task per client; each connection
//! carries framed JSON requests until the peer disconnects. Every Execute
//! request runs its own child process through [`ExecService`], so
//! concurrent clients share nothing but the listener.

use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};
use tokio::net::tcp::{OwnedReadHalf, OwnedWriteHalf};
use tokio::net::{TcpListener, TcpStream};
use tracing::{debug, error, info};

use crate::service::ExecService;
use crate::transport::{is_disconnect, recv_message, send_message, Request, Response};

/// Listener plus the shared (stateless) service.
pub struct ExecServer {
    listener: TcpListener,
    service: Arc<ExecService>,
}

impl ExecServer {
    /// Bind to `addr`. Bind failure is fatal at startup.
    pub async fn bind(addr: &str, service: ExecService) -> Result<Self> {
        let listener = TcpListener::bind(addr)
            .await
            .with_context(|| format!("Failed to bind execution server to {addr}"))?;
        Ok(Self {
            listener,
            service: Arc::new(service),
        })
    }

    /// The locally bound address (useful when binding to port 0).
    pub fn local_addr(&self) -> Result<std::net::SocketAddr> {
        self.listener
            .local_addr()
            .context("Failed to read local address")
    }

    /// Accept loop. Runs until the process is killed; a failed accept is
    /// logged and the loop keeps serving.
    pub async fn run(self) -> Result<()> {
        info!(addr = %self.local_addr()?, "execution server listening");
        loop {
            match self.listener.accept().await {
                Ok((stream, peer)) => {
                    debug!(%peer, "client connected");
                    let service = Arc::clone(&self.service);
                    tokio::spawn(async move {
                        if let Err(e) = handle_connection(stream, &service).await {
                            error!(%peer, error = %e, "connection error");
                        }
                    });
                }
                Err(e) => error!(error = %e, "accept error"),
            }
        }
    }
}

/// Serve one client until it disconnects.
///
/// Per-request errors are answered with `Response::Error` so one bad
/// request never takes the connection (or the listener) down.
async fn handle_connection(stream: TcpStream, service: &ExecService) -> Result<()> {
    let (mut reader, mut writer) = stream.into_split();

    loop {
        let request = match read_request(&mut reader).await? {
            Some(request) => request,
            None => {
                debug!("client disconnected");
                return Ok(());
            }
        };

        let response = handle_request(request, service).await;
        write_response(&mut writer, &response).await?;
    }
}

async fn read_request(reader: &mut OwnedReadHalf) -> Result<Option<Request>> {
    let payload = match recv_message(reader).await {
        Ok(payload) => payload,
        Err(e) if is_disconnect(&e) => return Ok(None),
        Err(e) => return Err(e),
    };
    let request = serde_json::from_slice(&payload).context("Failed to parse request")?;
    Ok(Some(request))
}

async fn write_response(writer: &mut OwnedWriteHalf, response: &Response) -> Result<()> {
    let bytes = serde_json::to_vec(response).context("Failed to serialize response")?;
    send_message(writer, &bytes).await
}

async fn handle_request(request: Request, service: &ExecService) -> Response {
    match request {
        Request::Ping => Response::Pong,
        Request::Execute {
            executable_path,
            a,
            b,
        } => match service.execute(Path::new(&executable_path), a, b).await {
            Ok(text) => Response::Verdict { text },
            Err(e) => {
                error!(path = %executable_path, error = %e, "execute request failed");
                Response::Error {
                    message: e.to_string(),
                }
            }
        },
    }
}

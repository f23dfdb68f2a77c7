//! Execution client.
//!
//! Reads two integers from stdin, sends an Execute request to the server,
//! and appends the returned verdict to the output file.

use std::path::PathBuf;

use anyhow::{bail, Result};
use clap::Parser;

use blackbox_exec::service::{append_verdict, read_operands};
use blackbox_exec::transport::{Request, RequestChannel, Response, TcpChannel};

#[derive(Parser, Debug)]
#[command(name = "blackbox-client")]
#[command(about = "Send a blackbox execution request to a server")]
struct Args {
    /// Path to the blackbox executable, as seen by the server
    executable_path: String,

    /// File the verdict is appended to
    output_path: PathBuf,

    /// Server address (host:port)
    server: String,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, default_value = "warn")]
    log_level: String,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    blackbox_exec::init_tracing(&args.log_level);

    let (a, b) = read_operands(std::io::stdin().lock())?;

    let mut channel = TcpChannel::connect(&args.server).await?;
    let response = channel
        .request(&Request::Execute {
            executable_path: args.executable_path,
            a,
            b,
        })
        .await?;

    match response {
        Response::Verdict { text } => append_verdict(&args.output_path, &text)?,
        Response::Error { message } => bail!("server rejected the request: {message}"),
        other => bail!("unexpected response: {other:?}"),
    }

    Ok(())
}

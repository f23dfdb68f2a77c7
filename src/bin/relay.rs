//! Audit relay.
//!
//! Listens on a port and appends everything received to a log file.

use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;

use blackbox_exec::relay::AuditRelay;

#[derive(Parser, Debug)]
#[command(name = "blackbox-relay")]
#[command(about = "Append audit lines received over TCP to a log file")]
struct Args {
    /// File the audit lines are appended to
    log_path: PathBuf,

    /// Port to listen on
    port: u16,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, default_value = "info")]
    log_level: String,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    blackbox_exec::init_tracing(&args.log_level);

    let addr = format!("0.0.0.0:{}", args.port);
    AuditRelay::bind(&addr, &args.log_path).await?.run().await
}

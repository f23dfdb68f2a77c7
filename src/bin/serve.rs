//! Execution server.
//!
//! Serves Execute requests over TCP. With `--audit`, every request also
//! pushes one audit line to the logging relay (best-effort).

use anyhow::Result;
use clap::Parser;
use tracing::info;

use blackbox_exec::audit::AuditSink;
use blackbox_exec::server::ExecServer;
use blackbox_exec::service::ExecService;

#[derive(Parser, Debug)]
#[command(name = "blackbox-serve")]
#[command(about = "Serve blackbox execution requests over TCP")]
struct Args {
    /// Address to listen on
    #[arg(long, default_value = "127.0.0.1:5555")]
    listen: String,

    /// Audit relay address (host:port); omit to disable audit logging
    #[arg(long)]
    audit: Option<String>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, default_value = "info")]
    log_level: String,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    blackbox_exec::init_tracing(&args.log_level);

    let service = match &args.audit {
        Some(spec) => {
            let sink = AuditSink::resolve(spec).await?;
            info!(audit = %spec, "audit logging enabled");
            ExecService::with_audit(sink)
        }
        None => ExecService::new(),
    };

    ExecServer::bind(&args.listen, service).await?.run().await
}

//! Local one-shot runner.
//!
//! Reads two integers from stdin, runs the blackbox, appends the verdict
//! to the output file.

use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;

use blackbox_exec::service::{append_verdict, read_operands, ExecService};

#[derive(Parser, Debug)]
#[command(name = "blackbox-run")]
#[command(about = "Run a blackbox executable and append its verdict to a file")]
struct Args {
    /// Path to the blackbox executable
    executable_path: PathBuf,

    /// File the verdict is appended to
    output_path: PathBuf,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, default_value = "warn")]
    log_level: String,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    blackbox_exec::init_tracing(&args.log_level);

    let (a, b) = read_operands(std::io::stdin().lock())?;

    let service = ExecService::new();
    let verdict = service.execute(&args.executable_path, a, b).await?;
    append_verdict(&args.output_path, &verdict)?;

    Ok(())
}

//! The execute operation shared by every deployment shape.
//!
//! One call = one fresh child process with its own pipes. The service
//! holds no mutable state across calls — only the optionally configured
//! audit endpoint — so concurrent invocations need no locks and can never
//! cross-contaminate captured output.

use std::io::BufRead;
use std::path::Path;

use anyhow::{Context, Result};
use tracing::{info, warn};

use crate::audit::AuditSink;
use crate::capture::{run_blackbox, CaptureError};
use crate::outcome::classify;

/// Stateless executor of blackbox requests.
#[derive(Debug, Clone, Default)]
pub struct ExecService {
    audit: Option<AuditSink>,
}

impl ExecService {
    /// Service without an audit relay.
    pub const fn new() -> Self {
        Self { audit: None }
    }

    /// Service that pushes one audit line per request to `sink`.
    pub const fn with_audit(sink: AuditSink) -> Self {
        Self { audit: Some(sink) }
    }

    /// Run the blackbox at `path` with operands `a` and `b` and return the
    /// wire-format verdict text.
    ///
    /// Audit push failures are logged and swallowed: the caller still gets
    /// its verdict. Capture errors (bad path, spawn refusal) are returned
    /// so the hosting transport can fail this request alone.
    pub async fn execute(&self, path: &Path, a: i32, b: i32) -> Result<String, CaptureError> {
        let stdin_text = format!("{a} {b}\n");
        let captured = run_blackbox(path, &stdin_text).await?;
        let outcome = classify(&captured);

        if let Some(sink) = &self.audit {
            if let Err(e) = sink.push(&outcome.audit_line(a, b)).await {
                warn!(error = %e, "audit push failed; verdict still returned");
            }
        }

        info!(path = %path.display(), a, b, exit_code = captured.exit_code, "request served");
        Ok(outcome.wire_text())
    }
}

/// Read two whitespace-separated operands from `input`.
///
/// The local runner and the client both take the operands from stdin,
/// one line, `scanf`-style.
pub fn read_operands<R: BufRead>(mut input: R) -> Result<(i32, i32)> {
    let mut line = String::new();
    input
        .read_line(&mut line)
        .context("Failed to read operands from stdin")?;

    let mut tokens = line.split_whitespace();
    let a = tokens
        .next()
        .context("Expected two integers on stdin, got none")?
        .parse::<i32>()
        .context("First operand is not a valid integer")?;
    let b = tokens
        .next()
        .context("Expected two integers on stdin, got one")?
        .parse::<i32>()
        .context("Second operand is not a valid integer")?;

    Ok((a, b))
}

/// Append verdict text to the output file, creating it if needed.
pub fn append_verdict(path: &Path, text: &str) -> Result<()> {
    use std::io::Write;

    let mut file = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .with_context(|| format!("Failed to open output file {}", path.display()))?;
    file.write_all(text.as_bytes())
        .with_context(|| format!("Failed to write verdict to {}", path.display()))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testutil::script;
    use tokio::io::AsyncReadExt;

    #[tokio::test]
    async fn adder_verdict_is_exact() {
        let dir = tempfile::tempdir().unwrap();
        let adder = script(&dir, "adder", "read a b\necho $((a + b))\n");

        let service = ExecService::new();
        let text = service.execute(&adder, 5, 7).await.unwrap();
        assert_eq!(text, "SUCCESS:\n12\n");
    }

    #[tokio::test]
    async fn failing_blackbox_yields_fail_verdict() {
        let dir = tempfile::tempdir().unwrap();
        let failing = script(&dir, "failing", "echo broken input >&2\nexit 1\n");

        let service = ExecService::new();
        let text = service.execute(&failing, 5, 7).await.unwrap();
        assert_eq!(text, "FAIL:\nbroken input\n");
    }

    #[tokio::test]
    async fn bad_path_fails_the_request_explicitly() {
        let service = ExecService::new();
        let err = service
            .execute(Path::new("/no/such/blackbox"), 1, 2)
            .await
            .unwrap_err();
        assert!(matches!(err, CaptureError::NotExecutable { .. }));
    }

    #[tokio::test]
    async fn concurrent_requests_do_not_cross_contaminate() {
        let dir = tempfile::tempdir().unwrap();
        let service = ExecService::new();

        // Eight distinct deterministic blackboxes, each with its own offset.
        let mut handles = Vec::new();
        for k in 0..8 {
            let path = script(
                &dir,
                &format!("adder{k}"),
                &format!("read a b\necho $((a + b + {k}))\n"),
            );
            let service = service.clone();
            handles.push(tokio::spawn(async move {
                (k, service.execute(&path, 10 * k, k).await.unwrap())
            }));
        }

        for handle in handles {
            let (k, text) = handle.await.unwrap();
            assert_eq!(text, format!("SUCCESS:\n{}\n", 10 * k + k + k));
        }
    }

    #[tokio::test]
    async fn audit_line_reaches_the_sink() {
        let dir = tempfile::tempdir().unwrap();
        let adder = script(&dir, "adder", "read a b\necho $((a + b))\n");

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let accept = tokio::spawn(async move {
            let (mut stream, _) = listener.accept().await.unwrap();
            let mut buf = String::new();
            stream.read_to_string(&mut buf).await.unwrap();
            buf
        });

        let service = ExecService::with_audit(crate::audit::AuditSink::from_addr(addr));
        let text = service.execute(&adder, 5, 7).await.unwrap();
        assert_eq!(text, "SUCCESS:\n12\n");
        assert_eq!(accept.await.unwrap(), "5 7 12\n");
    }

    #[tokio::test]
    async fn audit_push_failure_is_not_fatal() {
        let dir = tempfile::tempdir().unwrap();
        let adder = script(&dir, "adder", "read a b\necho $((a + b))\n");

        // Grab a port that nothing listens on.
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let service = ExecService::with_audit(crate::audit::AuditSink::from_addr(addr));
        let text = service.execute(&adder, 2, 3).await.unwrap();
        assert_eq!(text, "SUCCESS:\n5\n");
    }

    #[test]
    fn operands_parse_from_one_line() {
        let (a, b) = read_operands(std::io::Cursor::new("5 7\n")).unwrap();
        assert_eq!((a, b), (5, 7));

        let (a, b) = read_operands(std::io::Cursor::new("  -3\t9  \n")).unwrap();
        assert_eq!((a, b), (-3, 9));

        assert!(read_operands(std::io::Cursor::new("5\n")).is_err());
        assert!(read_operands(std::io::Cursor::new("x y\n")).is_err());
    }

    #[test]
    fn verdicts_append_to_the_output_file() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("result.txt");

        append_verdict(&out, "SUCCESS:\n12\n").unwrap();
        append_verdict(&out, "FAIL:\nbroken\n").unwrap();

        let content = std::fs::read_to_string(&out).unwrap();
        assert_eq!(content, "SUCCESS:\n12\nFAIL:\nbroken\n");
    }
}

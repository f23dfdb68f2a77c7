//! Blackbox process execution with full stdio capture.
//!
//! Spawns one child process per call with stdin, stdout and stderr bound to
//! pipes, feeds it the operand line, waits for termination and drains both
//! output pipes to EOF. Success or failure is decided later, purely from the
//! exit status — never from which pipe happened to have bytes.

use std::io::ErrorKind;
use std::path::Path;
use std::process::Stdio;

use thiserror::Error;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::process::Command;
use tracing::{debug, instrument};

/// Everything a blackbox run leaves behind once the child has terminated.
///
/// The buffers are complete: both pipes are drained to EOF before the
/// exit code is recorded here, so no bytes arrive after construction.
#[derive(Debug, Clone)]
pub struct CapturedOutput {
    /// Exit code of the child (0 = clean exit, -1 = killed by signal).
    pub exit_code: i32,
    /// Raw bytes the child wrote to stdout.
    pub stdout: Vec<u8>,
    /// Raw bytes the child wrote to stderr.
    pub stderr: Vec<u8>,
}

/// Errors raised while setting up or driving a blackbox child process.
#[derive(Debug, Error)]
pub enum CaptureError {
    /// The named path does not exist or is not an executable regular file.
    /// Checked before spawning so a bad path fails loudly instead of
    /// surfacing as an empty FAIL verdict.
    #[error("not an executable file: {path}")]
    NotExecutable { path: String },

    /// The OS refused to create the child process.
    #[error("failed to spawn blackbox {path}")]
    Spawn {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// A pipe read or write failed while the child was running.
    #[error("blackbox pipe I/O failed")]
    Pipe(#[from] std::io::Error),
}

/// Run the blackbox at `path`, feeding it `stdin_text`, and capture its
/// stdout and stderr in full.
///
/// The parent end of each pipe is owned by this call and closed on every
/// exit path. The child sees EOF on its stdin as soon as the operand line
/// has been written. There is no timeout: a blackbox that never exits
/// blocks the caller indefinitely.
#[instrument(skip(stdin_text), fields(path = %path.display()))]
pub async fn run_blackbox(path: &Path, stdin_text: &str) -> Result<CapturedOutput, CaptureError> {
    check_executable(path)?;

    let mut child = Command::new(path)
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .map_err(|source| CaptureError::Spawn {
            path: path.display().to_string(),
            source,
        })?;

    // Write the operand line, then drop the handle so the child sees EOF
    // on its stdin if it reads to completion. A blackbox may exit without
    // reading its input at all, in which case the write hits a broken
    // pipe; that is not an error for the run itself.
    let mut stdin = child.stdin.take().ok_or_else(|| {
        CaptureError::Pipe(std::io::Error::new(ErrorKind::BrokenPipe, "child stdin missing"))
    })?;
    match stdin.write_all(stdin_text.as_bytes()).await {
        Ok(()) => {}
        Err(e) if e.kind() == ErrorKind::BrokenPipe => {
            debug!("blackbox exited before reading stdin");
        }
        Err(e) => return Err(e.into()),
    }
    drop(stdin);

    let mut child_stdout = child.stdout.take().ok_or_else(|| {
        CaptureError::Pipe(std::io::Error::new(ErrorKind::BrokenPipe, "child stdout missing"))
    })?;
    let mut child_stderr = child.stderr.take().ok_or_else(|| {
        CaptureError::Pipe(std::io::Error::new(ErrorKind::BrokenPipe, "child stderr missing"))
    })?;

    // Wait for termination first, then drain. Output beyond the OS pipe
    // buffer can stall the child before it exits; that limitation is
    // accepted rather than worked around.
    let status = child.wait().await?;
    let exit_code = status.code().unwrap_or(-1);

    // Drain both pipes to EOF into growable buffers. Repeated reads append
    // to what came before, so output larger than any single read chunk is
    // captured in full.
    let mut stdout = Vec::new();
    let mut stderr = Vec::new();
    let (r1, r2) = tokio::join!(
        child_stdout.read_to_end(&mut stdout),
        child_stderr.read_to_end(&mut stderr),
    );
    r1?;
    r2?;

    debug!(
        exit_code,
        stdout_len = stdout.len(),
        stderr_len = stderr.len(),
        "blackbox terminated"
    );

    Ok(CapturedOutput {
        exit_code,
        stdout,
        stderr,
    })
}

/// Reject paths that cannot possibly be launched before paying for a spawn.
fn check_executable(path: &Path) -> Result<(), CaptureError> {
    let not_executable = || CaptureError::NotExecutable {
        path: path.display().to_string(),
    };

    let meta = std::fs::metadata(path).map_err(|_| not_executable())?;
    if !meta.is_file() {
        return Err(not_executable());
    }

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        if meta.permissions().mode() & 0o111 == 0 {
            return Err(not_executable());
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testutil::script;

    #[tokio::test]
    async fn adder_output_is_captured() {
        let dir = tempfile::tempdir().unwrap();
        let adder = script(&dir, "adder", "read a b\necho $((a + b))\n");

        let out = run_blackbox(&adder, "5 7\n").await.unwrap();
        assert_eq!(out.exit_code, 0);
        assert_eq!(out.stdout, b"12\n");
        assert!(out.stderr.is_empty());
    }

    #[tokio::test]
    async fn nonzero_exit_and_stderr_are_captured() {
        let dir = tempfile::tempdir().unwrap();
        let failing = script(&dir, "failing", "echo boom >&2\nexit 3\n");

        let out = run_blackbox(&failing, "1 2\n").await.unwrap();
        assert_eq!(out.exit_code, 3);
        assert!(out.stdout.is_empty());
        assert_eq!(out.stderr, b"boom\n");
    }

    #[tokio::test]
    async fn output_larger_than_one_chunk_is_not_truncated() {
        let dir = tempfile::tempdir().unwrap();
        // 10,000 bytes of digits, no trailing newline
        let wide = script(&dir, "wide", "printf %010000d 0\n");

        let out = run_blackbox(&wide, "0 0\n").await.unwrap();
        assert_eq!(out.exit_code, 0);
        assert_eq!(out.stdout.len(), 10_000);
    }

    #[tokio::test]
    async fn child_that_ignores_stdin_still_runs() {
        let dir = tempfile::tempdir().unwrap();
        let deaf = script(&dir, "deaf", "echo 42\n");

        let out = run_blackbox(&deaf, "5 7\n").await.unwrap();
        assert_eq!(out.exit_code, 0);
        assert_eq!(out.stdout, b"42\n");
    }

    #[tokio::test]
    async fn missing_path_is_rejected_before_spawn() {
        let err = run_blackbox(Path::new("/no/such/blackbox"), "1 2\n")
            .await
            .unwrap_err();
        assert!(matches!(err, CaptureError::NotExecutable { .. }));
    }

    #[tokio::test]
    async fn non_executable_file_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("plain.txt");
        std::fs::write(&path, "not a program").unwrap();

        let err = run_blackbox(&path, "1 2\n").await.unwrap_err();
        assert!(matches!(err, CaptureError::NotExecutable { .. }));
    }
}

//! Request/response message types for the execution protocol.
//!
//! Length-prefixed JSON over TCP: [4-byte BE length][JSON payload].
//! The three request fields travel unmodified; the verdict comes back as
//! the opaque wire-format string, exactly as the server produced it.

use serde::{Deserialize, Serialize};

/// Request sent from client to the execution server.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Request {
    /// Run the blackbox at `executable_path` with the two operands.
    Execute {
        executable_path: String,
        a: i32,
        b: i32,
    },
    /// Health check.
    Ping,
}

/// Response sent from the execution server.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Response {
    /// The wire-format verdict text (`"SUCCESS:\n...\n"` / `"FAIL:\n...\n"`).
    Verdict { text: String },
    /// Pong response to a health check.
    Pong,
    /// The request could not be served (bad path, spawn failure, ...).
    /// Fails only this request, never the server.
    Error { message: String },
}

//! Outcome classification and wire formatting.
//!
//! Pure functions over a [`CapturedOutput`]: no I/O, no failure modes.
//! Classification branches only on the exit status; malformed numeric
//! output degrades permissively to 0 instead of erroring.

use crate::capture::CapturedOutput;

/// The classified result of one blackbox run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// Clean exit; the value parsed from the blackbox's stdout.
    Success(i32),
    /// Abnormal exit; everything the blackbox wrote, trimmed of one
    /// trailing newline.
    Failure(String),
}

impl Outcome {
    /// Exact wire text for this outcome.
    ///
    /// `"SUCCESS:\n<value>\n"` or `"FAIL:\n<message>\n"` — byte-for-byte,
    /// the trailing newline comes from this formatting and never from the
    /// captured text itself.
    pub fn wire_text(&self) -> String {
        match self {
            Self::Success(value) => format!("SUCCESS:\n{value}\n"),
            Self::Failure(message) => format!("FAIL:\n{message}\n"),
        }
    }

    /// Newline-terminated audit line: `"<a> <b> <value>\n"` on success,
    /// `"<a> <b> _\n"` on failure.
    pub fn audit_line(&self, a: i32, b: i32) -> String {
        match self {
            Self::Success(value) => format!("{a} {b} {value}\n"),
            Self::Failure(_) => format!("{a} {b} _\n"),
        }
    }
}

/// Classify a finished run.
///
/// Exit 0 parses stdout as a base-10 integer with permissive `atoi`
/// semantics. Any other exit code turns the combined captured text
/// (stdout first, then stderr, mirroring the merged output channel of
/// the blackbox contract) into a failure message.
pub fn classify(captured: &CapturedOutput) -> Outcome {
    if captured.exit_code == 0 {
        let text = String::from_utf8_lossy(&captured.stdout);
        Outcome::Success(parse_leading_int(trim_one_newline(&text)))
    } else {
        let mut combined = captured.stdout.clone();
        combined.extend_from_slice(&captured.stderr);
        let text = String::from_utf8_lossy(&combined);
        Outcome::Failure(trim_one_newline(&text).to_string())
    }
}

/// Strip exactly one trailing `'\n'` if present. Two trailing newlines
/// leave one.
fn trim_one_newline(text: &str) -> &str {
    text.strip_suffix('\n').unwrap_or(text)
}

/// Permissive base-10 parse: skip leading whitespace, take an optional
/// sign and then as many digits as follow. Anything malformed yields 0,
/// matching the reference behavior of never validating blackbox output.
/// Out-of-range values saturate at the i32 bounds.
fn parse_leading_int(text: &str) -> i32 {
    let text = text.trim_start();
    let (negative, rest) = match text.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, text.strip_prefix('+').unwrap_or(text)),
    };

    let mut value: i64 = 0;
    for c in rest.chars() {
        let Some(digit) = c.to_digit(10) else { break };
        value = value.saturating_mul(10).saturating_add(i64::from(digit));
        if value > i64::from(i32::MAX) {
            break;
        }
    }
    if negative {
        value = -value;
    }

    value.clamp(i64::from(i32::MIN), i64::from(i32::MAX)) as i32
}

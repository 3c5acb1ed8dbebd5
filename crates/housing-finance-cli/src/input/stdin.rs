use serde_json::Value;
use std::io::{self, Read};

/// Read a JSON document from stdin when one is piped in.
///
/// Interactive sessions (stdin is a TTY) and empty pipes yield `None` so the
/// caller falls back to command-line flags.
pub fn read_stdin() -> Result<Option<Value>, Box<dyn std::error::Error>> {
    if atty::is(atty::Stream::Stdin) {
        return Ok(None);
    }

    let mut raw = String::new();
    io::stdin().read_to_string(&mut raw)?;
    if raw.trim().is_empty() {
        return Ok(None);
    }

    let value: Value = serde_json::from_str(raw.trim())
        .map_err(|e| format!("Failed to parse stdin as JSON: {}", e))?;
    Ok(Some(value))
}

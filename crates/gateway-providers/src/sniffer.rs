//! Response-id extraction from a pass-through SSE stream.

use serde_json::Value;
use tracing::debug;

/// Bytes inspected before giving up on finding an id
pub const MAX_INSPECTED_BYTES: usize = 64 * 1024;

/// Watches forwarded stream bytes for the first response id.
///
/// Looks at `data:` lines until one carries `response.id` (Responses API
/// lifecycle events) or a top-level `id`, then stops parsing.
#[derive(Debug, Default)]
pub struct ResponseIdSniffer {
    carry: Vec<u8>,
    inspected: usize,
    done: bool,
}

impl ResponseIdSniffer {
    /// New sniffer
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether inspection has stopped
    #[must_use]
    pub fn is_done(&self) -> bool {
        self.done
    }

    /// Inspect a chunk; returns the id the first time it is seen
    pub fn inspect(&mut self, chunk: &[u8]) -> Option<String> {
        if self.done {
            return None;
        }

        self.inspected += chunk.len();
        self.carry.extend_from_slice(chunk);

        while let Some(newline) = self.carry.iter().position(|b| *b == b'\n') {
            let line: Vec<u8> = self.carry.drain(..=newline).collect();
            if let Some(id) = id_from_line(&line) {
                self.stop();
                return Some(id);
            }
        }

        if self.inspected >= MAX_INSPECTED_BYTES {
            debug!(bytes = self.inspected, "No response id found, stopping inspection");
            self.stop();
        }
        None
    }

    fn stop(&mut self) {
        self.done = true;
        self.carry = Vec::new();
    }
}

fn id_from_line(line: &[u8]) -> Option<String> {
    let line = std::str::from_utf8(line).ok()?.trim();
    let payload = line.strip_prefix("data:")?.trim_start();
    let value: Value = serde_json::from_str(payload).ok()?;

    value
        .pointer("/response/id")
        .or_else(|| value.get("id"))
        .and_then(Value::as_str)
        .filter(|id| !id.is_empty())
        .map(str::to_string)
}

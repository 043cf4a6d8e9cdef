//! Terminal channel protocol
//!
//! Inbound text payloads are JSON control messages tagged by `type`:
//!
//! ```json
//! {"type": "input", "data": "ls\n"}
//! {"type": "resize", "cols": 120, "rows": 40}
//! ```
//!
//! Anything that does not parse as one of these is forwarded to the shell
//! verbatim. Outbound events carry shell output as text:
//!
//! ```json
//! {"type": "output", "data": "..."}
//! ```

use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum Tagged {
    Input { data: String },
    Resize { cols: u16, rows: u16 },
}

/// Control message from the client
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClientMessage {
    /// Bytes for the shell's stdin
    Input(String),
    /// New terminal dimensions
    Resize {
        /// Columns
        cols: u16,
        /// Rows
        rows: u16,
    },
}

impl ClientMessage {
    /// Parse a raw payload. Never fails: unrecognized payloads become input.
    pub fn parse(raw: &str) -> Self {
        match serde_json::from_str::<Tagged>(raw) {
            Ok(Tagged::Input { data }) => Self::Input(data),
            Ok(Tagged::Resize { cols, rows }) => Self::Resize { cols, rows },
            Err(_) => Self::Input(raw.to_string()),
        }
    }
}

/// Event sent to the client
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum OutboundEvent {
    /// Shell output
    Output {
        /// Decoded output text
        data: String,
    },
}

impl OutboundEvent {
    /// Output event
    pub fn output(data: impl Into<String>) -> Self {
        Self::Output { data: data.into() }
    }

    /// Serialized JSON form
    pub fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_default()
    }
}

/// Incremental, lossy UTF-8 decoder.
///
/// A multi-byte sequence split across two reads is held back until the rest
/// arrives; invalid bytes become U+FFFD.
#[derive(Debug, Default)]
pub struct Utf8Decoder {
    pending: Vec<u8>,
}

impl Utf8Decoder {
    /// Create an empty decoder
    pub fn new() -> Self {
        Self::default()
    }

    /// Decode as much of `pending + chunk` as is complete.
    pub fn decode(&mut self, chunk: &[u8]) -> String {
        self.pending.extend_from_slice(chunk);

        let mut out = String::with_capacity(self.pending.len());
        let mut rest: &[u8] = &self.pending;
        loop {
            match std::str::from_utf8(rest) {
                Ok(valid) => {
                    out.push_str(valid);
                    rest = &[];
                    break;
                }
                Err(e) => {
                    let (valid, after) = rest.split_at(e.valid_up_to());
                    out.push_str(&String::from_utf8_lossy(valid));
                    match e.error_len() {
                        Some(len) => {
                            out.push(char::REPLACEMENT_CHARACTER);
                            rest = &after[len..];
                        }
                        // Incomplete sequence at the end, wait for more bytes
                        None => {
                            rest = after;
                            break;
                        }
                    }
                }
            }
        }

        let tail = rest.to_vec();
        self.pending = tail;
        out
    }

    /// Flush whatever is still held back.
    pub fn finish(&mut self) -> String {
        let out = String::from_utf8_lossy(&self.pending).into_owned();
        self.pending.clear();
        out
    }
}

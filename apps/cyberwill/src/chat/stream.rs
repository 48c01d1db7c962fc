//! Incremental NDJSON decoding of a chat response body.
//!
//! Network reads do not line up with record boundaries, nor with UTF-8
//! character boundaries. `NdjsonDecoder` holds back incomplete characters and
//! incomplete lines until the bytes that finish them arrive.

use serde::Deserialize;

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChunkKind {
    /// Carries reply text.
    Answer,
    /// Backend-side failure reported in-band.
    Error,
    #[serde(other)]
    Unknown,
}

/// One newline-delimited record of the `/chat` response body.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct StreamChunk {
    #[serde(rename = "type")]
    pub kind: ChunkKind,
    #[serde(default)]
    pub content: Option<String>,
    #[serde(default)]
    pub session_id: Option<String>,
}

impl StreamChunk {
    pub fn parse(line: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(line)
    }

    /// Reply text carried by this record, if it is a non-empty answer.
    pub fn answer_text(&self) -> Option<&str> {
        match (&self.kind, self.content.as_deref()) {
            (ChunkKind::Answer, Some(text)) if !text.is_empty() => Some(text),
            _ => None,
        }
    }
}

/// A complete line that was not a valid record.
#[derive(Debug)]
pub struct MalformedLine {
    pub line: String,
    pub error: serde_json::Error,
}

pub type DecodedLine = Result<StreamChunk, MalformedLine>;

#[derive(Debug, Default)]
pub struct NdjsonDecoder {
    /// Leading bytes of a character whose remaining bytes have not arrived yet.
    pending: Vec<u8>,
    /// Decoded text after the last newline.
    buffer: String,
}

impl NdjsonDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feeds one network read; returns every record completed by it, in order.
    pub fn push(&mut self, bytes: &[u8]) -> Vec<DecodedLine> {
        self.decode_utf8(bytes);
        let mut out = Vec::new();
        while let Some(pos) = self.buffer.find('\n') {
            let line: String = self.buffer.drain(..=pos).collect();
            if let Some(decoded) = parse_line(&line) {
                out.push(decoded);
            }
        }
        out
    }

    /// Flushes at end of body. A final line without a trailing newline still counts.
    pub fn finish(&mut self) -> Vec<DecodedLine> {
        if !self.pending.is_empty() {
            let tail = std::mem::take(&mut self.pending);
            self.buffer.push_str(&String::from_utf8_lossy(&tail));
        }
        let rest = std::mem::take(&mut self.buffer);
        parse_line(&rest).into_iter().collect()
    }

    fn decode_utf8(&mut self, bytes: &[u8]) {
        self.pending.extend_from_slice(bytes);
        let input = std::mem::take(&mut self.pending);
        let mut start = 0;
        loop {
            match std::str::from_utf8(&input[start..]) {
                Ok(text) => {
                    self.buffer.push_str(text);
                    return;
                }
                Err(e) => {
                    let valid_end = start + e.valid_up_to();
                    self.buffer
                        .push_str(&String::from_utf8_lossy(&input[start..valid_end]));
                    match e.error_len() {
                        // Genuinely invalid bytes: substitute and keep going.
                        Some(len) => {
                            self.buffer.push(char::REPLACEMENT_CHARACTER);
                            start = valid_end + len;
                        }
                        // Truncated character: wait for the next read.
                        None => {
                            self.pending = input[valid_end..].to_vec();
                            return;
                        }
                    }
                }
            }
        }
    }
}

fn parse_line(line: &str) -> Option<DecodedLine> {
    let line = line.trim();
    if line.is_empty() {
        return None;
    }
    Some(StreamChunk::parse(line).map_err(|error| MalformedLine {
        line: line.to_string(),
        error,
    }))
}

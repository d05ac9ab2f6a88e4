//! Newline-delimited JSON framing.
//!
//! Chunks arrive with arbitrary boundaries, so bytes are accumulated and
//! lines are cut from the accumulator rather than from each chunk. Splitting
//! on the `\n` byte is safe for UTF-8: that byte never occurs inside a
//! multi-byte sequence, so a character straddling two chunks is decoded only
//! once its line is complete.
//!
//! Each byte is scanned for a newline once, and consumed lines are only
//! compacted away when they make up at least half of the buffer, so the
//! cost stays linear in the size of the body however it is chunked.

use crate::core::error::MalformedFragment;
use crate::core::string::truncate_chars;

/// Longest line accepted before the decoder gives up on it.
pub const DEFAULT_MAX_LINE_BYTES: usize = 4 * 1024 * 1024;

const PREVIEW_CHARS: usize = 64;

/// Incremental line splitter over a byte stream.
#[derive(Debug)]
pub struct LineDecoder {
    buf: Vec<u8>,
    /// Start of the first unconsumed line.
    start: usize,
    /// Bytes before this offset are known not to contain a newline.
    scanned: usize,
    max_line_bytes: usize,
    /// Dropping the rest of an oversized line until its newline arrives.
    discarding: bool,
}

impl Default for LineDecoder {
    fn default() -> Self {
        Self::with_max_line_bytes(DEFAULT_MAX_LINE_BYTES)
    }
}

impl LineDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// A decoder that rejects lines longer than `max_line_bytes`.
    pub fn with_max_line_bytes(max_line_bytes: usize) -> Self {
        Self {
            buf: Vec::new(),
            start: 0,
            scanned: 0,
            max_line_bytes: max_line_bytes.max(1),
            discarding: false,
        }
    }

    /// Append a chunk of raw bytes.
    pub fn push(&mut self, chunk: &[u8]) {
        if self.start > 0 && self.start * 2 >= self.buf.len() {
            self.buf.drain(..self.start);
            self.scanned -= self.start;
            self.start = 0;
        }
        self.buf.extend_from_slice(chunk);
    }

    /// Pop the next complete, non-blank line (trimmed).
    ///
    /// A line that grows past the size limit is reported once as a
    /// [`MalformedFragment`]; its remaining bytes are dropped up to and
    /// including the next newline.
    pub fn next_line(&mut self) -> Option<Result<String, MalformedFragment>> {
        loop {
            let Some(offset) = self.buf[self.scanned..].iter().position(|b| *b == b'\n') else {
                self.scanned = self.buf.len();
                return self.check_overflow();
            };
            let end = self.scanned + offset;
            let line = (!self.discarding)
                .then(|| String::from_utf8_lossy(&self.buf[self.start..end]).trim().to_string());
            self.start = end + 1;
            self.scanned = self.start;
            self.discarding = false;

            if let Some(line) = line
                && !line.is_empty()
            {
                return Some(Ok(line));
            }
        }
    }

    fn check_overflow(&mut self) -> Option<Result<String, MalformedFragment>> {
        if self.pending() <= self.max_line_bytes {
            return None;
        }
        let preview = String::from_utf8_lossy(&self.buf[self.start..])
            .chars()
            .take(PREVIEW_CHARS + 1)
            .collect::<String>();
        self.clear();
        if std::mem::replace(&mut self.discarding, true) {
            return None;
        }
        Some(Err(MalformedFragment {
            line: truncate_chars(&preview, PREVIEW_CHARS),
            reason: format!("line exceeds {} bytes", self.max_line_bytes),
        }))
    }

    fn clear(&mut self) {
        self.buf.clear();
        self.start = 0;
        self.scanned = 0;
    }

    /// Take whatever is left once the stream has ended.
    pub fn finish(&mut self) -> Option<String> {
        let discarding = std::mem::take(&mut self.discarding);
        let line = String::from_utf8_lossy(&self.buf[self.start..]).trim().to_string();
        self.clear();
        (!discarding && !line.is_empty()).then_some(line)
    }

    /// Bytes buffered but not yet terminated by a newline.
    pub fn pending(&self) -> usize {
        self.buf.len() - self.start
    }
}

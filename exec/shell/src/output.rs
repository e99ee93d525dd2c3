//! Incremental output decoding and bounded pending buffers.

use std::mem;

/// Decodes a byte stream into text without splitting UTF-8 sequences
/// across chunks. Invalid bytes become U+FFFD.
#[derive(Debug, Default)]
pub(crate) struct Utf8Decoder {
    carry: Vec<u8>,
}

impl Utf8Decoder {
    pub(crate) fn decode(&mut self, bytes: &[u8]) -> String {
        self.carry.extend_from_slice(bytes);
        let mut text = String::with_capacity(self.carry.len());
        let mut rest = self.carry.as_slice();
        while !rest.is_empty() {
            match std::str::from_utf8(rest) {
                Ok(valid) => {
                    text.push_str(valid);
                    rest = &[];
                }
                Err(err) => {
                    let (valid, after) = rest.split_at(err.valid_up_to());
                    text.push_str(&String::from_utf8_lossy(valid));
                    let Some(invalid) = err.error_len() else {
                        // Incomplete sequence at the end: hold it for the next chunk.
                        rest = after;
                        break;
                    };
                    text.push(char::REPLACEMENT_CHARACTER);
                    rest = &after[invalid..];
                }
            }
        }
        let consumed = self.carry.len() - rest.len();
        self.carry.drain(..consumed);
        text
    }

    /// Flushes whatever is held back once the stream has ended.
    pub(crate) fn finish(&mut self) -> String {
        let rest = mem::take(&mut self.carry);
        String::from_utf8_lossy(&rest).into_owned()
    }
}

/// Text accumulated since the last drain, capped at `cap` bytes.
///
/// When the cap is exceeded the oldest text is discarded on a character
/// boundary and the discarded byte count is reported by the next
/// [`PendingBuffer::take`].
#[derive(Debug)]
pub(crate) struct PendingBuffer {
    text: String,
    dropped: u64,
    cap: usize,
}

impl PendingBuffer {
    pub(crate) fn new(cap: usize) -> Self {
        Self {
            text: String::new(),
            dropped: 0,
            cap,
        }
    }

    pub(crate) fn push(&mut self, chunk: &str) {
        self.text.push_str(chunk);
        if self.text.len() <= self.cap {
            return;
        }
        let mut cut = self.text.len() - self.cap;
        while !self.text.is_char_boundary(cut) {
            cut += 1;
        }
        self.text.drain(..cut);
        self.dropped += cut as u64;
    }

    /// Returns the pending text and dropped byte count, then resets both.
    ///
    /// A `[... N bytes dropped ...]` line is prepended when text was lost.
    pub(crate) fn take(&mut self) -> (String, u64) {
        let dropped = mem::take(&mut self.dropped);
        let text = mem::take(&mut self.text);
        if dropped == 0 {
            (text, 0)
        } else {
            (format!("[... {dropped} bytes dropped ...]\n{text}"), dropped)
        }
    }

    #[cfg(test)]
    pub(crate) fn len(&self) -> usize {
        self.text.len()
    }
}

#[cfg(test)]
#[path = "output.test.rs"]
mod tests;

//! LineFramer - incremental newline framing over raw serial reads.
//!
//! Serial reads hand back arbitrary chunks; a line may span several reads
//! and a read may carry several lines. The framer accumulates bytes and
//! emits complete lines, stripping the terminator and any trailing `\r`.

use bytes::Bytes;

/// Incremental line splitter with an upper bound on line length.
///
/// A line that exceeds the bound is discarded wholesale (including the rest
/// of its bytes up to the next terminator) rather than truncated, so a
/// wedged device spewing garbage cannot grow the buffer without limit.
pub struct LineFramer {
    buf: Vec<u8>,
    max_line_len: usize,
    overflowing: bool,
    dropped_oversize: u64,
}

impl LineFramer {
    pub fn new(max_line_len: usize) -> Self {
        Self {
            buf: Vec::with_capacity(256),
            max_line_len,
            overflowing: false,
            dropped_oversize: 0,
        }
    }

    /// Feed a chunk of raw bytes, returning every line completed by it.
    pub fn feed(&mut self, bytes: &[u8]) -> Vec<Bytes> {
        let mut lines = Vec::new();

        for &byte in bytes {
            if byte == b'\n' {
                if self.overflowing {
                    self.overflowing = false;
                    continue;
                }
                if self.buf.last() == Some(&b'\r') {
                    self.buf.pop();
                }
                lines.push(Bytes::from(std::mem::take(&mut self.buf)));
            } else if self.overflowing {
                // discarding until the terminator of the oversized line
            } else {
                self.buf.push(byte);
                if self.buf.len() > self.max_line_len {
                    self.buf.clear();
                    self.overflowing = true;
                    self.dropped_oversize += 1;
                }
            }
        }

        lines
    }

    /// Hand back any incomplete trailing line (on stream end).
    pub fn flush(&mut self) -> Option<Bytes> {
        self.overflowing = false;
        if self.buf.is_empty() {
            None
        } else {
            Some(Bytes::from(std::mem::take(&mut self.buf)))
        }
    }

    /// Lines discarded for exceeding the length bound.
    pub fn dropped_oversize(&self) -> u64 {
        self.dropped_oversize
    }
}

//! Push-based line segmentation over an unbounded byte stream.

/// Reassembles lines from arbitrarily split chunks.
///
/// Splits on `\n` and `\r\n`. Bytes are kept until a full line is available,
/// so multi-byte UTF-8 sequences cut across chunks decode intact. The buffer
/// has no cap: output that never contains a terminator grows it until
/// [`LineSegmenter::finish`].
#[derive(Debug, Default)]
pub struct LineSegmenter {
    buffer: Vec<u8>,
}

impl LineSegmenter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a chunk and iterate over the lines it completed, in order.
    ///
    /// Lines not consumed from the iterator stay buffered for the next call.
    pub fn push(&mut self, chunk: &[u8]) -> CompleteLines<'_> {
        self.buffer.extend_from_slice(chunk);
        CompleteLines {
            buffer: &mut self.buffer,
            consumed: 0,
        }
    }

    /// Take the unterminated tail left at end of stream, if any.
    pub fn finish(&mut self) -> Option<String> {
        let rest = std::mem::take(&mut self.buffer);
        if rest.is_empty() {
            None
        } else {
            Some(String::from_utf8_lossy(&rest).into_owned())
        }
    }

    /// Bytes currently held without a terminator.
    pub fn pending(&self) -> usize {
        self.buffer.len()
    }
}

/// Lines completed by one [`LineSegmenter::push`].
pub struct CompleteLines<'a> {
    buffer: &'a mut Vec<u8>,
    consumed: usize,
}

impl Iterator for CompleteLines<'_> {
    type Item = String;

    fn next(&mut self) -> Option<String> {
        let rest = &self.buffer[self.consumed..];
        let newline = rest.iter().position(|&b| b == b'\n')?;
        let mut line = &rest[..newline];
        if let Some(stripped) = line.strip_suffix(b"\r") {
            line = stripped;
        }
        let line = String::from_utf8_lossy(line).into_owned();
        self.consumed += newline + 1;
        Some(line)
    }
}

impl Drop for CompleteLines<'_> {
    fn drop(&mut self) {
        self.buffer.drain(..self.consumed);
    }
}

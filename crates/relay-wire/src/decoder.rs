/// Incremental byte-stream to line splitter.
///
/// Buffers are split on `\n` at the byte level. UTF-8 continuation bytes
/// are never `0x0A`, so a multi-byte codepoint can only ever straddle the
/// buffer tail, where it is carried into the next `feed` call intact.
/// Complete lines decode lossily: malformed bytes become U+FFFD rather
/// than an error — this stage cannot fail.
#[derive(Debug, Default)]
pub struct LineDecoder {
    buf: Vec<u8>,
}

impl LineDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Consume one raw buffer, returning every line completed by it.
    /// A trailing partial line stays buffered for the next call.
    pub fn feed(&mut self, bytes: &[u8]) -> Vec<String> {
        self.buf.extend_from_slice(bytes);

        let mut lines = Vec::new();
        while let Some(pos) = self.buf.iter().position(|&b| b == b'\n') {
            let mut line: Vec<u8> = self.buf.drain(..=pos).collect();
            line.pop(); // the '\n'
            if line.last() == Some(&b'\r') {
                line.pop();
            }
            lines.push(String::from_utf8_lossy(&line).into_owned());
        }
        lines
    }

    /// Flush any remaining buffered content as a final line.
    /// Call once at end-of-input.
    pub fn finish(&mut self) -> Option<String> {
        if self.buf.is_empty() {
            return None;
        }
        let mut line = std::mem::take(&mut self.buf);
        if line.last() == Some(&b'\r') {
            line.pop();
        }
        Some(String::from_utf8_lossy(&line).into_owned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_complete_line() {
        let mut decoder = LineDecoder::new();
        assert_eq!(decoder.feed(b"hello\n"), vec!["hello"]);
        assert_eq!(decoder.finish(), None);
    }

    #[test]
    fn test_partial_line_carried_across_feeds() {
        let mut decoder = LineDecoder::new();
        assert!(decoder.feed(b"hel").is_empty());
        assert_eq!(decoder.feed(b"lo\nwor"), vec!["hello"]);
        assert_eq!(decoder.feed(b"ld\n"), vec!["world"]);
    }

    #[test]
    fn test_multibyte_codepoint_split_across_feeds() {
        // "é" is 0xC3 0xA9; split it between two buffers.
        let mut decoder = LineDecoder::new();
        assert!(decoder.feed(&[b'c', b'a', b'f', 0xC3]).is_empty());
        assert_eq!(decoder.feed(&[0xA9, b'\n']), vec!["café"]);
    }

    #[test]
    fn test_finish_flushes_residue() {
        let mut decoder = LineDecoder::new();
        assert!(decoder.feed(b"no newline").is_empty());
        assert_eq!(decoder.finish().as_deref(), Some("no newline"));
        assert_eq!(decoder.finish(), None);
    }

    #[test]
    fn test_malformed_bytes_become_replacement_char() {
        let mut decoder = LineDecoder::new();
        let lines = decoder.feed(&[b'a', 0xFF, b'b', b'\n']);
        assert_eq!(lines, vec!["a\u{FFFD}b"]);
    }

    #[test]
    fn test_crlf_stripped() {
        let mut decoder = LineDecoder::new();
        assert_eq!(decoder.feed(b"data: x\r\n"), vec!["data: x"]);
    }

    #[test]
    fn test_empty_lines_preserved() {
        // Blank lines are dropped by callers, not by the decoder.
        let mut decoder = LineDecoder::new();
        assert_eq!(decoder.feed(b"a\n\nb\n"), vec!["a", "", "b"]);
    }

    #[test]
    fn test_many_lines_in_one_buffer() {
        let mut decoder = LineDecoder::new();
        let lines = decoder.feed(b"one\ntwo\nthree\npart");
        assert_eq!(lines, vec!["one", "two", "three"]);
        assert_eq!(decoder.finish().as_deref(), Some("part"));
    }
}

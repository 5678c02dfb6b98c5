//! Line framing for byte-stream transports.

/// Accumulates body bytes and yields complete lines.
///
/// Splitting happens on the `\n` byte, so a multi-byte character cut by a
/// chunk boundary is reassembled before decoding. A trailing `\r` is
/// dropped from each line.
#[derive(Debug, Default)]
pub struct LineSplitter {
    buffer: Vec<u8>,
}

impl LineSplitter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed a chunk, returning every line it completed.
    pub fn push(&mut self, chunk: &[u8]) -> Vec<String> {
        self.buffer.extend_from_slice(chunk);

        let mut lines = Vec::new();
        while let Some(pos) = self.buffer.iter().position(|&b| b == b'\n') {
            let mut line: Vec<u8> = self.buffer.drain(..=pos).collect();
            line.pop();
            if line.last() == Some(&b'\r') {
                line.pop();
            }
            lines.push(String::from_utf8_lossy(&line).into_owned());
        }
        lines
    }

    /// Flush an unterminated last line at end of stream.
    pub fn finish(&mut self) -> Option<String> {
        if self.buffer.is_empty() {
            return None;
        }
        let mut line = std::mem::take(&mut self.buffer);
        if line.last() == Some(&b'\r') {
            line.pop();
        }
        Some(String::from_utf8_lossy(&line).into_owned())
    }

    /// Bytes waiting for a line terminator.
    pub fn pending(&self) -> usize {
        self.buffer.len()
    }
}

/// One line of the event stream, by SSE role.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SseLine {
    /// Data line or bare text, handed to the payload parser as is
    Payload(String),
    /// `event:`, `id:` or `retry:` field
    Field { name: String, value: String },
    /// Line starting with ':'
    Comment(String),
    /// Event separator
    Empty,
}

/// Classify a line by its SSE role.
pub fn classify_line(line: &str) -> SseLine {
    if line.is_empty() {
        return SseLine::Empty;
    }

    if let Some(stripped) = line.strip_prefix(':') {
        return SseLine::Comment(stripped.trim().to_string());
    }

    for name in ["event", "id", "retry"] {
        if let Some(rest) = line
            .strip_prefix(name)
            .and_then(|rest| rest.strip_prefix(':'))
        {
            return SseLine::Field {
                name: name.to_string(),
                value: rest.trim().to_string(),
            };
        }
    }

    SseLine::Payload(line.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_across_chunks() {
        let mut splitter = LineSplitter::new();
        assert!(splitter.push(b"data: Hel").is_empty());
        assert_eq!(splitter.push(b"lo\ndata: wor"), vec!["data: Hello"]);
        assert_eq!(splitter.pending(), 9);
        assert_eq!(splitter.push(b"ld\n\n"), vec!["data: world", ""]);
        assert_eq!(splitter.finish(), None);
    }

    #[test]
    fn test_crlf_tolerated() {
        let mut splitter = LineSplitter::new();
        assert_eq!(splitter.push(b"a\r\nb\r\n"), vec!["a", "b"]);
    }

    #[test]
    fn test_multibyte_character_split() {
        let bytes = "data: caf\u{e9}\n".as_bytes();
        let (head, tail) = bytes.split_at(bytes.len() - 2);

        let mut splitter = LineSplitter::new();
        assert!(splitter.push(head).is_empty());
        assert_eq!(splitter.push(tail), vec!["data: caf\u{e9}"]);
    }

    #[test]
    fn test_finish_flushes_unterminated_line() {
        let mut splitter = LineSplitter::new();
        splitter.push(b"data: tail");
        assert_eq!(splitter.finish(), Some("data: tail".to_string()));
        assert_eq!(splitter.finish(), None);
    }

    #[test]
    fn test_classify_line() {
        assert_eq!(classify_line(""), SseLine::Empty);
        assert_eq!(
            classify_line(": keepalive"),
            SseLine::Comment("keepalive".to_string())
        );
        assert_eq!(
            classify_line("event: error"),
            SseLine::Field {
                name: "event".to_string(),
                value: "error".to_string()
            }
        );
        assert_eq!(
            classify_line("retry:3000"),
            SseLine::Field {
                name: "retry".to_string(),
                value: "3000".to_string()
            }
        );
        assert_eq!(
            classify_line("data: hi"),
            SseLine::Payload("data: hi".to_string())
        );
        assert_eq!(
            classify_line("identity"),
            SseLine::Payload("identity".to_string())
        );
    }
}

//! Builders for wire-format test data

/// Builder for one framed message
pub struct FrameBuilder {
    values: Vec<String>,
    start: u8,
    end: u8,
    separator: String,
}

impl FrameBuilder {
    pub fn new(values: &[i64]) -> Self {
        Self {
            values: values.iter().map(|v| v.to_string()).collect(),
            start: b'$',
            end: b';',
            separator: " ".to_string(),
        }
    }

    /// Use raw tokens instead of formatted integers
    pub fn tokens(tokens: &[&str]) -> Self {
        Self {
            values: tokens.iter().map(|t| t.to_string()).collect(),
            ..Self::new(&[])
        }
    }

    pub fn markers(mut self, start: u8, end: u8) -> Self {
        self.start = start;
        self.end = end;
        self
    }

    pub fn separator(mut self, separator: &str) -> Self {
        self.separator = separator.to_string();
        self
    }

    pub fn build(self) -> Vec<u8> {
        let mut out = vec![self.start];
        out.extend_from_slice(self.values.join(&self.separator).as_bytes());
        out.push(self.end);
        out
    }
}

/// `$v0 v1 ...;`
pub fn frame(values: &[i64]) -> Vec<u8> {
    FrameBuilder::new(values).build()
}

/// Concatenated frames, one per row, each followed by CRLF
pub fn stream(rows: &[&[i64]]) -> Vec<u8> {
    let mut out = Vec::new();
    for row in rows {
        out.extend(frame(row));
        out.extend_from_slice(b"\r\n");
    }
    out
}

/// Split `bytes` into chunks of at most `size` bytes
pub fn chunked(bytes: &[u8], size: usize) -> Vec<Vec<u8>> {
    bytes.chunks(size.max(1)).map(<[u8]>::to_vec).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_frame_builder() {
        assert_eq!(frame(&[1, 2, 3]), b"$1 2 3;");
        assert_eq!(
            FrameBuilder::new(&[4, 5]).markers(b'<', b'>').separator("\t").build(),
            b"<4\t5>"
        );
        assert_eq!(stream(&[&[1], &[2]]), b"$1;\r\n$2;\r\n");
        assert_eq!(chunked(b"abcde", 2).len(), 3);
    }
}

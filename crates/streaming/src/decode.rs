/// Incremental UTF-8 decoder for chunked bodies.
///
/// A multi-byte character split across two chunks is held back until the
/// rest of it arrives. Invalid sequences decode to U+FFFD, and whatever is
/// still pending when the body ends is flushed the same way by
/// [`finish`](Self::finish).
#[derive(Debug, Default, Clone)]
pub struct Utf8StreamDecoder {
    pending: Vec<u8>,
}

impl Utf8StreamDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bytes held back waiting for the rest of a character (at most 3).
    pub fn pending_len(&self) -> usize {
        self.pending.len()
    }

    /// Decodes `chunk`, appending complete characters to `out`.
    pub fn push(&mut self, chunk: &[u8], out: &mut String) {
        if self.pending.is_empty() {
            let tail = decode_prefix(chunk, out);
            self.pending.extend_from_slice(tail);
            return;
        }

        let mut joined = std::mem::take(&mut self.pending);
        joined.extend_from_slice(chunk);
        let tail = decode_prefix(&joined, out);
        self.pending = tail.to_vec();
    }

    /// Flushes any incomplete trailing sequence as replacement characters.
    pub fn finish(&mut self, out: &mut String) {
        if self.pending.is_empty() {
            return;
        }
        out.push_str(&String::from_utf8_lossy(&self.pending));
        self.pending.clear();
    }
}

/// Appends the decodable prefix of `bytes` to `out` and returns the
/// incomplete tail.
fn decode_prefix<'a>(bytes: &'a [u8], out: &mut String) -> &'a [u8] {
    let mut rest = bytes;
    loop {
        match std::str::from_utf8(rest) {
            Ok(s) => {
                out.push_str(s);
                return &[];
            }
            Err(e) => {
                let (valid, after) = rest.split_at(e.valid_up_to());
                if let Ok(s) = std::str::from_utf8(valid) {
                    out.push_str(s);
                }
                match e.error_len() {
                    Some(len) => {
                        out.push(char::REPLACEMENT_CHARACTER);
                        rest = &after[len..];
                    }
                    None => return after,
                }
            }
        }
    }
}

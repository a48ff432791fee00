//! Incremental byte → line decoder.
//!
//! Network reads do not respect character or line boundaries. The decoder keeps
//! an incomplete UTF-8 tail between reads and holds back the last partial line
//! until its `\n` arrives.

/// Accumulates raw chunks and yields complete lines.
#[derive(Debug, Default)]
pub struct LineDecoder {
    pending: Vec<u8>,
    buffer: String,
}

impl LineDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feeds one chunk and returns every line completed by it, without the `\n`.
    pub fn push(&mut self, chunk: &[u8]) -> Vec<String> {
        self.decode(chunk);

        let Some(last_newline) = self.buffer.rfind('\n') else {
            return Vec::new();
        };
        let rest = self.buffer.split_off(last_newline + 1);
        let complete = std::mem::replace(&mut self.buffer, rest);
        complete[..complete.len() - 1]
            .split('\n')
            .map(str::to_owned)
            .collect()
    }

    /// Text received after the last newline.
    pub fn remainder(&self) -> &str {
        &self.buffer
    }

    fn decode(&mut self, chunk: &[u8]) {
        self.pending.extend_from_slice(chunk);

        let mut consumed = 0;
        loop {
            let tail = &self.pending[consumed..];
            match std::str::from_utf8(tail) {
                Ok(text) => {
                    self.buffer.push_str(text);
                    consumed = self.pending.len();
                    break;
                }
                Err(e) => {
                    let valid = e.valid_up_to();
                    self.buffer
                        .push_str(std::str::from_utf8(&tail[..valid]).unwrap_or_default());
                    consumed += valid;
                    match e.error_len() {
                        Some(len) => {
                            self.buffer.push(char::REPLACEMENT_CHARACTER);
                            consumed += len;
                        }
                        // Incomplete sequence at the end: wait for the next chunk.
                        None => break,
                    }
                }
            }
        }
        self.pending.drain(..consumed);
    }
}

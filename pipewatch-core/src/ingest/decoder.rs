//! Incremental byte-stream to line decoding.
//!
//! Chunks arrive at arbitrary boundaries: in the middle of a line, in the middle
//! of a `\r\n` pair, or in the middle of a multi-byte UTF-8 character. The
//! decoder keeps its own resumable state (`pending` text plus a scan `cursor`)
//! per stream, so two streams never share scan state.
//!
//! Guarantee: the yielded lines, joined with the terminators that were stripped,
//! reproduce the decoded text exactly, however the chunks were cut.

use crate::ingest::error::DecodeError;
use futures_util::{Stream, StreamExt};

/// Synchronous decoder state for one stream.
#[derive(Debug, Default)]
pub struct LineDecoder {
    /// Bytes of an incomplete trailing character, carried to the next chunk.
    utf8_tail: Vec<u8>,
    pending: String,
    cursor: usize,
    bytes_seen: u64,
}

impl LineDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Decode `chunk` and append it to the pending text.
    ///
    /// On an invalid sequence everything before it stays available as
    /// salvage; the caller is expected to stop pushing.
    pub fn push(&mut self, chunk: &[u8]) -> Result<(), DecodeError> {
        self.compact();

        let joined;
        let input: &[u8] = if self.utf8_tail.is_empty() {
            chunk
        } else {
            let mut bytes = std::mem::take(&mut self.utf8_tail);
            bytes.extend_from_slice(chunk);
            joined = bytes;
            &joined
        };
        let offset = self.bytes_seen - (input.len() - chunk.len()) as u64;
        self.bytes_seen += chunk.len() as u64;

        match std::str::from_utf8(input) {
            Ok(text) => {
                self.pending.push_str(text);
                Ok(())
            }
            Err(err) => {
                let (valid, rest) = input.split_at(err.valid_up_to());
                if let Ok(text) = std::str::from_utf8(valid) {
                    self.pending.push_str(text);
                }
                match err.error_len() {
                    None => {
                        self.utf8_tail = rest.to_vec();
                        Ok(())
                    }
                    Some(_) => Err(DecodeError::InvalidSequence {
                        offset: offset + valid.len() as u64,
                    }),
                }
            }
        }
    }

    /// Next complete line, terminator stripped.
    ///
    /// A `\r` at the very end of the pending text is only treated as a
    /// terminator once `at_eof` is set, since it may be the first half of a
    /// `\r\n` split across chunks.
    pub fn next_line(&mut self, at_eof: bool) -> Option<String> {
        let rest = &self.pending[self.cursor..];
        let pos = rest.find(|c: char| c == '\r' || c == '\n')?;
        let bytes = rest.as_bytes();

        let terminator_len = match (bytes[pos], bytes.get(pos + 1)) {
            (b'\r', Some(b'\n')) => 2,
            (b'\r', None) if !at_eof => return None,
            _ => 1,
        };

        let line = rest[..pos].to_string();
        self.cursor += pos + terminator_len;
        Some(line)
    }

    /// Whatever is left once the source is exhausted.
    ///
    /// Returns the unterminated remainder (if non-empty) and an error when an
    /// incomplete character was still pending.
    pub fn finish(&mut self) -> (Option<String>, Option<DecodeError>) {
        let truncated = (!self.utf8_tail.is_empty()).then(|| DecodeError::Truncated {
            pending: self.utf8_tail.len(),
        });
        self.utf8_tail.clear();

        let remainder = self.pending.split_off(self.cursor);
        self.pending.clear();
        self.cursor = 0;

        ((!remainder.is_empty()).then_some(remainder), truncated)
    }

    fn compact(&mut self) {
        if self.cursor > 0 {
            self.pending.drain(..self.cursor);
            self.cursor = 0;
        }
    }
}

#[derive(Debug)]
pub enum LineError<E> {
    Decode(DecodeError),
    Source(E),
}

/// Lazy sequence of lines over a chunked byte source.
pub struct LineStream<S> {
    source: S,
    decoder: LineDecoder,
    exhausted: bool,
    deferred: Option<DecodeError>,
    finished: bool,
    lines: usize,
}

impl<S, B, E> LineStream<S>
where
    S: Stream<Item = Result<B, E>> + Unpin,
    B: AsRef<[u8]>,
{
    pub fn new(source: S) -> Self {
        Self {
            source,
            decoder: LineDecoder::new(),
            exhausted: false,
            deferred: None,
            finished: false,
            lines: 0,
        }
    }

    /// Number of lines yielded so far.
    pub fn lines_read(&self) -> usize {
        self.lines
    }

    /// Salvaged lines come first; a decode error is reported after them and
    /// ends the stream. A source error ends the stream immediately.
    pub async fn next_line(&mut self) -> Option<Result<String, LineError<E>>> {
        loop {
            if let Some(line) = self.decoder.next_line(self.exhausted) {
                self.lines += 1;
                return Some(Ok(line));
            }

            if self.exhausted {
                if self.finished {
                    return self.deferred.take().map(|e| Err(LineError::Decode(e)));
                }
                self.finished = true;

                let (remainder, truncated) = self.decoder.finish();
                if self.deferred.is_none() {
                    self.deferred = truncated;
                }
                if let Some(line) = remainder {
                    self.lines += 1;
                    return Some(Ok(line));
                }
                continue;
            }

            match self.source.next().await {
                Some(Ok(chunk)) => {
                    if let Err(err) = self.decoder.push(chunk.as_ref()) {
                        self.deferred = Some(err);
                        self.exhausted = true;
                    }
                }
                Some(Err(err)) => {
                    self.exhausted = true;
                    self.finished = true;
                    return Some(Err(LineError::Source(err)));
                }
                None => self.exhausted = true,
            }
        }
    }
}

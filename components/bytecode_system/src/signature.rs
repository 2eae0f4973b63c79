//! Artifact signature detection
//!
//! Precompiled artifacts start with a fixed 4-byte marker. [`PeekReader`]
//! lets a loader look at those bytes without losing them, so a stream
//! that turns out to be source text reaches the parser unchanged.

use std::io::{self, BufRead, Read};

use tracing::trace;

/// Marker at the start of every precompiled artifact
pub const SIGNATURE: [u8; 4] = *b"\x1bGoL";

/// Whether an in-memory buffer starts with the artifact signature
pub fn has_signature(bytes: &[u8]) -> bool {
    bytes.starts_with(&SIGNATURE)
}

/// Reader that can look ahead without consuming
///
/// Peeked bytes stay buffered and are handed out by later reads, so any
/// number of peeks leave the logical read position where it was.
#[derive(Debug)]
pub struct PeekReader<R> {
    inner: R,
    buf: Vec<u8>,
    pos: usize,
}

impl<R: Read> PeekReader<R> {
    /// Wrap a reader
    pub fn new(inner: R) -> Self {
        Self {
            inner,
            buf: Vec::new(),
            pos: 0,
        }
    }

    /// Return up to `n` upcoming bytes without consuming them
    ///
    /// Fewer than `n` bytes are returned only at end of stream. On error,
    /// bytes already pulled from the inner reader stay buffered.
    pub fn peek(&mut self, n: usize) -> io::Result<&[u8]> {
        while self.buf.len() - self.pos < n {
            let mut chunk = [0u8; 64];
            let wanted = (n - (self.buf.len() - self.pos)).min(chunk.len());
            let read = match self.inner.read(&mut chunk[..wanted]) {
                Ok(read) => read,
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => return Err(e),
            };
            if read == 0 {
                break;
            }
            self.buf.extend_from_slice(&chunk[..read]);
        }
        let end = (self.pos + n).min(self.buf.len());
        Ok(&self.buf[self.pos..end])
    }

    /// Number of bytes buffered but not yet consumed
    pub fn buffered(&self) -> usize {
        self.buf.len() - self.pos
    }

    /// Unwrap the inner reader, discarding any buffered bytes
    pub fn into_inner(self) -> R {
        self.inner
    }
}

impl<R: Read> Read for PeekReader<R> {
    fn read(&mut self, out: &mut [u8]) -> io::Result<usize> {
        if self.pos < self.buf.len() {
            let available = &self.buf[self.pos..];
            let n = available.len().min(out.len());
            out[..n].copy_from_slice(&available[..n]);
            self.consume(n);
            return Ok(n);
        }
        self.inner.read(out)
    }
}

impl<R: Read> BufRead for PeekReader<R> {
    fn fill_buf(&mut self) -> io::Result<&[u8]> {
        if self.pos >= self.buf.len() {
            self.buf.clear();
            self.pos = 0;
            let mut chunk = [0u8; 4096];
            let read = loop {
                match self.inner.read(&mut chunk) {
                    Ok(read) => break read,
                    Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                    Err(e) => return Err(e),
                }
            };
            self.buf.extend_from_slice(&chunk[..read]);
        }
        Ok(&self.buf[self.pos..])
    }

    fn consume(&mut self, amt: usize) {
        self.pos = (self.pos + amt).min(self.buf.len());
        if self.pos == self.buf.len() {
            self.buf.clear();
            self.pos = 0;
        }
    }
}

/// Check for the artifact signature, consuming it only on a match
///
/// Short streams and I/O errors count as "no signature"; the stream keeps
/// every byte it had so the caller can fall back to reading source text.
pub fn peek_signature<R: Read>(reader: &mut PeekReader<R>) -> bool {
    let matched = match reader.peek(SIGNATURE.len()) {
        Ok(head) => head == SIGNATURE,
        Err(e) => {
            trace!(error = %e, "signature peek failed");
            false
        }
    };
    if matched {
        reader.consume(SIGNATURE.len());
    }
    trace!(matched, "signature sniffed");
    matched
}

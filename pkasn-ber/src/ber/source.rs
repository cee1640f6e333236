//! Pull-based byte sources for the BER decoder
//!
//! The decoder never touches a buffer directly: it pulls bytes through the
//! [`ByteSource`] trait, which lets the same decoding code run over an
//! in-memory buffer or over a reader such as a file.
//!
//! # Required Capabilities
//!
//! - `read`: consume bytes
//! - `peek`: look at bytes ahead of the cursor without consuming them
//!   (needed by the indefinite-length pre-scan)
//! - `check_available`: capacity probe used before allocating a value buffer
//! - `end_of_data`: end-of-stream test

use bytes::{Buf, BytesMut};
use pkasn_core::{BerError, BerResult};
use std::borrow::Cow;
use std::io::{ErrorKind, Read};

/// Abstract pull-based byte provider
#[cfg_attr(test, mockall::automock)]
pub trait ByteSource {
    /// Read up to `out.len()` bytes, returning how many were read
    ///
    /// Fewer bytes than requested are only returned at end of data.
    fn read(&mut self, out: &mut [u8]) -> BerResult<usize>;

    /// Copy bytes starting `offset` bytes past the cursor without consuming them
    fn peek(&mut self, out: &mut [u8], offset: usize) -> BerResult<usize>;

    /// Check that at least `n` more bytes can be read
    fn check_available(&mut self, n: usize) -> BerResult<bool>;

    /// Check if the source is exhausted
    fn end_of_data(&mut self) -> BerResult<bool>;

    /// Total number of bytes consumed so far
    fn bytes_read(&self) -> usize;

    /// Read a single byte, `None` at end of data
    fn read_byte(&mut self) -> BerResult<Option<u8>> {
        let mut byte = [0u8; 1];
        if self.read(&mut byte)? == 1 {
            Ok(Some(byte[0]))
        } else {
            Ok(None)
        }
    }

    /// Peek at the next byte, `None` at end of data
    fn peek_byte(&mut self) -> BerResult<Option<u8>> {
        let mut byte = [0u8; 1];
        if self.peek(&mut byte, 0)? == 1 {
            Ok(Some(byte[0]))
        } else {
            Ok(None)
        }
    }

    /// Consume and drop up to `n` bytes, returning how many were dropped
    fn discard_next(&mut self, n: usize) -> BerResult<usize> {
        let mut scratch = [0u8; 256];
        let mut discarded = 0;
        while discarded < n {
            let want = (n - discarded).min(scratch.len());
            let got = self.read(&mut scratch[..want])?;
            if got == 0 {
                break;
            }
            discarded += got;
        }
        Ok(discarded)
    }
}

/// Byte source over an in-memory buffer
///
/// The buffer is either borrowed from the caller or owned by the source
/// (for example the content of a constructed value being decoded).
#[derive(Debug, Clone)]
pub struct MemorySource<'a> {
    data: Cow<'a, [u8]>,
    offset: usize,
}

impl<'a> MemorySource<'a> {
    /// Create a source borrowing `data`
    pub fn new(data: &'a [u8]) -> Self {
        Self {
            data: Cow::Borrowed(data),
            offset: 0,
        }
    }

    /// Number of bytes not yet consumed
    pub fn remaining(&self) -> usize {
        self.data.len() - self.offset
    }

    /// The unconsumed bytes
    pub fn remaining_bytes(&self) -> &[u8] {
        &self.data[self.offset..]
    }
}

impl MemorySource<'static> {
    /// Create a source that owns `data`
    pub fn from_vec(data: Vec<u8>) -> Self {
        Self {
            data: Cow::Owned(data),
            offset: 0,
        }
    }
}

impl ByteSource for MemorySource<'_> {
    fn read(&mut self, out: &mut [u8]) -> BerResult<usize> {
        let got = out.len().min(self.remaining());
        out[..got].copy_from_slice(&self.data[self.offset..self.offset + got]);
        self.offset += got;
        Ok(got)
    }

    fn peek(&mut self, out: &mut [u8], offset: usize) -> BerResult<usize> {
        if offset >= self.remaining() {
            return Ok(0);
        }
        let start = self.offset + offset;
        let got = out.len().min(self.data.len() - start);
        out[..got].copy_from_slice(&self.data[start..start + got]);
        Ok(got)
    }

    fn check_available(&mut self, n: usize) -> BerResult<bool> {
        Ok(n <= self.remaining())
    }

    fn end_of_data(&mut self) -> BerResult<bool> {
        Ok(self.remaining() == 0)
    }

    fn bytes_read(&self) -> usize {
        self.offset
    }
}

const STREAM_CHUNK: usize = 4096;

/// Byte source over any [`Read`] implementation
///
/// Bytes needed by `peek` and `check_available` are pulled from the reader
/// into a look-ahead buffer and handed out from there by later reads.
pub struct StreamSource<R: Read> {
    reader: R,
    lookahead: BytesMut,
    total_read: usize,
    eof: bool,
}

impl<R: Read> StreamSource<R> {
    pub fn new(reader: R) -> Self {
        Self {
            reader,
            lookahead: BytesMut::new(),
            total_read: 0,
            eof: false,
        }
    }

    /// Give back the reader; buffered look-ahead bytes are dropped
    pub fn into_inner(self) -> R {
        self.reader
    }

    /// Pull from the reader until `n` bytes are buffered or the reader ends
    fn fill(&mut self, n: usize) -> BerResult<()> {
        let mut chunk = [0u8; STREAM_CHUNK];
        while self.lookahead.len() < n && !self.eof {
            match self.reader.read(&mut chunk) {
                Ok(0) => self.eof = true,
                Ok(got) => self.lookahead.extend_from_slice(&chunk[..got]),
                Err(e) if e.kind() == ErrorKind::Interrupted => continue,
                Err(e) => return Err(BerError::Io(e)),
            }
        }
        Ok(())
    }
}

impl<R: Read> ByteSource for StreamSource<R> {
    fn read(&mut self, out: &mut [u8]) -> BerResult<usize> {
        self.fill(out.len())?;
        let got = out.len().min(self.lookahead.len());
        out[..got].copy_from_slice(&self.lookahead[..got]);
        self.lookahead.advance(got);
        self.total_read += got;
        Ok(got)
    }

    fn peek(&mut self, out: &mut [u8], offset: usize) -> BerResult<usize> {
        self.fill(offset.saturating_add(out.len()))?;
        if offset >= self.lookahead.len() {
            return Ok(0);
        }
        let got = out.len().min(self.lookahead.len() - offset);
        out[..got].copy_from_slice(&self.lookahead[offset..offset + got]);
        Ok(got)
    }

    fn check_available(&mut self, n: usize) -> BerResult<bool> {
        self.fill(n)?;
        Ok(self.lookahead.len() >= n)
    }

    fn end_of_data(&mut self) -> BerResult<bool> {
        self.fill(1)?;
        Ok(self.lookahead.is_empty())
    }

    fn bytes_read(&self) -> usize {
        self.total_read
    }
}

/// Non-consuming view of another source, starting at the other source's cursor
///
/// Reads through a `PeekCursor` advance only the cursor's own offset; the
/// underlying source is only ever peeked. The indefinite-length pre-scan
/// walks nested content through one of these.
pub(crate) struct PeekCursor<'s> {
    inner: &'s mut dyn ByteSource,
    offset: usize,
}

impl<'s> PeekCursor<'s> {
    pub(crate) fn new(inner: &'s mut dyn ByteSource) -> Self {
        Self { inner, offset: 0 }
    }
}

impl ByteSource for PeekCursor<'_> {
    fn read(&mut self, out: &mut [u8]) -> BerResult<usize> {
        let got = self.inner.peek(out, self.offset)?;
        self.offset += got;
        Ok(got)
    }

    fn peek(&mut self, out: &mut [u8], offset: usize) -> BerResult<usize> {
        match self.offset.checked_add(offset) {
            Some(at) => self.inner.peek(out, at),
            None => Ok(0),
        }
    }

    fn check_available(&mut self, n: usize) -> BerResult<bool> {
        match self.offset.checked_add(n) {
            Some(total) => self.inner.check_available(total),
            None => Ok(false),
        }
    }

    fn end_of_data(&mut self) -> BerResult<bool> {
        Ok(!self.check_available(1)?)
    }

    fn bytes_read(&self) -> usize {
        self.offset
    }

    fn discard_next(&mut self, n: usize) -> BerResult<usize> {
        if self.check_available(n)? {
            self.offset += n;
            return Ok(n);
        }
        let mut scratch = [0u8; 256];
        let mut discarded = 0;
        while discarded < n {
            let want = (n - discarded).min(scratch.len());
            let got = self.read(&mut scratch[..want])?;
            if got == 0 {
                break;
            }
            discarded += got;
        }
        Ok(discarded)
    }
}

/// Quick check whether a source plausibly starts with a BER SEQUENCE
///
/// Looks at the first byte only and consumes nothing, so a caller can fall
/// back to a textual (PEM) reader on `false`.
pub fn looks_like_ber(source: &mut dyn ByteSource) -> BerResult<bool> {
    Ok(source.peek_byte()? == Some(0x30))
}

/*!
 * Stream Collaborators
 *
 * The codec walks its grammar against two abstract capabilities: pull the
 * next N bytes from an ordered stream, and push bytes into one. Both may
 * block; the codec never proceeds until a request is satisfied, and a
 * failure aborts the whole call.
 *
 * Implementations:
 * - `SliceSource` / `Vec<u8>` / `BytesMut` for in-memory fast paths
 * - `ReaderSource` / `WriterSink` for buffered `std::io` transports
 */

use crate::core::errors::{CodecError, FormatError};
use crate::core::limits::STREAM_BUFFER_SIZE;
use crate::core::CodecResult;
use bytes::{BufMut, BytesMut};
use std::io::{BufReader, BufWriter, Read, Write};

// ============================================================================
// Source
// ============================================================================

/// Pull-oriented byte stream capability
///
/// `read_exact` suspends until the requested bytes are available; a short
/// stream surfaces as [`FormatError::Truncated`].
pub trait ByteSource {
    /// Fill `buf` completely from the stream
    fn read_exact(&mut self, buf: &mut [u8]) -> CodecResult<()>;

    /// Bytes consumed so far, for error reporting
    fn offset(&self) -> usize;

    #[inline]
    fn read_u8(&mut self) -> CodecResult<u8> {
        let mut buf = [0u8; 1];
        self.read_exact(&mut buf)?;
        Ok(buf[0])
    }

    #[inline]
    fn read_u16_be(&mut self) -> CodecResult<u16> {
        let mut buf = [0u8; 2];
        self.read_exact(&mut buf)?;
        Ok(u16::from_be_bytes(buf))
    }

    #[inline]
    fn read_u32_be(&mut self) -> CodecResult<u32> {
        let mut buf = [0u8; 4];
        self.read_exact(&mut buf)?;
        Ok(u32::from_be_bytes(buf))
    }

    #[inline]
    fn read_f64_be(&mut self) -> CodecResult<f64> {
        let mut buf = [0u8; 8];
        self.read_exact(&mut buf)?;
        Ok(f64::from_be_bytes(buf))
    }

    /// Read a length-prefixed span whose length was already decoded
    fn read_span(&mut self, len: usize) -> CodecResult<Vec<u8>> {
        let mut buf = vec![0u8; len];
        self.read_exact(&mut buf)?;
        Ok(buf)
    }
}

/// In-memory source over a borrowed slice
#[derive(Debug)]
pub struct SliceSource<'a> {
    data: &'a [u8],
    pos: usize,
}

impl<'a> SliceSource<'a> {
    pub fn new(data: &'a [u8]) -> Self {
        Self { data, pos: 0 }
    }

    /// Bytes not yet consumed
    #[inline]
    pub fn remaining(&self) -> usize {
        self.data.len() - self.pos
    }

    #[inline]
    pub fn is_exhausted(&self) -> bool {
        self.remaining() == 0
    }
}

impl ByteSource for SliceSource<'_> {
    fn read_exact(&mut self, buf: &mut [u8]) -> CodecResult<()> {
        if self.remaining() < buf.len() {
            return Err(FormatError::Truncated {
                offset: self.pos,
                needed: buf.len() - self.remaining(),
            }
            .into());
        }
        buf.copy_from_slice(&self.data[self.pos..self.pos + buf.len()]);
        self.pos += buf.len();
        Ok(())
    }

    #[inline]
    fn offset(&self) -> usize {
        self.pos
    }
}

/// Buffered source over any `std::io::Read` transport
#[derive(Debug)]
pub struct ReaderSource<R: Read> {
    inner: BufReader<R>,
    pos: usize,
}

impl<R: Read> ReaderSource<R> {
    pub fn new(reader: R) -> Self {
        Self {
            inner: BufReader::with_capacity(STREAM_BUFFER_SIZE, reader),
            pos: 0,
        }
    }

    /// True if the transport has no more bytes to offer
    pub fn is_exhausted(&mut self) -> CodecResult<bool> {
        let mut probe = [0u8; 1];
        match self.inner.read(&mut probe) {
            Ok(0) => Ok(true),
            Ok(_) => Ok(false),
            Err(e) => Err(e.into()),
        }
    }
}

impl<R: Read> ByteSource for ReaderSource<R> {
    fn read_exact(&mut self, buf: &mut [u8]) -> CodecResult<()> {
        match self.inner.read_exact(buf) {
            Ok(()) => {
                self.pos += buf.len();
                Ok(())
            }
            Err(e) if e.kind() == std::io::ErrorKind::UnexpectedEof => Err(FormatError::Truncated {
                offset: self.pos,
                needed: buf.len(),
            }
            .into()),
            Err(e) => Err(e.into()),
        }
    }

    #[inline]
    fn offset(&self) -> usize {
        self.pos
    }
}

// ============================================================================
// Sink
// ============================================================================

/// Push-oriented byte stream capability with buffered flush
pub trait ByteSink {
    /// Write all bytes, suspending on backpressure until accepted
    fn write_all(&mut self, bytes: &[u8]) -> CodecResult<()>;

    /// Drain any buffered bytes to the underlying transport
    fn flush(&mut self) -> CodecResult<()>;

    #[inline]
    fn put_u8(&mut self, value: u8) -> CodecResult<()> {
        self.write_all(&[value])
    }

    #[inline]
    fn put_u16_be(&mut self, value: u16) -> CodecResult<()> {
        self.write_all(&value.to_be_bytes())
    }

    #[inline]
    fn put_u32_be(&mut self, value: u32) -> CodecResult<()> {
        self.write_all(&value.to_be_bytes())
    }

    #[inline]
    fn put_f64_be(&mut self, value: f64) -> CodecResult<()> {
        self.write_all(&value.to_be_bytes())
    }
}

impl ByteSink for Vec<u8> {
    #[inline]
    fn write_all(&mut self, bytes: &[u8]) -> CodecResult<()> {
        self.extend_from_slice(bytes);
        Ok(())
    }

    #[inline]
    fn flush(&mut self) -> CodecResult<()> {
        Ok(())
    }
}

impl ByteSink for BytesMut {
    #[inline]
    fn write_all(&mut self, bytes: &[u8]) -> CodecResult<()> {
        self.put_slice(bytes);
        Ok(())
    }

    #[inline]
    fn flush(&mut self) -> CodecResult<()> {
        Ok(())
    }
}

/// Buffered sink over any `std::io::Write` transport
///
/// Callers own the final [`ByteSink::flush`]; dropping without flushing
/// can lose buffered bytes, matching `BufWriter` semantics.
#[derive(Debug)]
pub struct WriterSink<W: Write> {
    inner: BufWriter<W>,
}

impl<W: Write> WriterSink<W> {
    pub fn new(writer: W) -> Self {
        Self {
            inner: BufWriter::with_capacity(STREAM_BUFFER_SIZE, writer),
        }
    }
}

impl<W: Write> ByteSink for WriterSink<W> {
    fn write_all(&mut self, bytes: &[u8]) -> CodecResult<()> {
        self.inner.write_all(bytes).map_err(CodecError::from)
    }

    fn flush(&mut self) -> CodecResult<()> {
        self.inner.flush().map_err(CodecError::from)
    }
}

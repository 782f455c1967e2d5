// Address-indexed byte sources for the decoder.
//
// The decoder tracks its own address and asks the source for bytes at
// explicit positions; sources never advance an implicit cursor on read.
// `current_address` is only consulted when a decode starts without an
// explicit address.

use std::io::{self, Read, Seek, SeekFrom};

use super::decoder::DecodeError;

/// Random-access byte store a compressed stream is read from.
///
/// Only `read_into` and `current_address` are required; the remaining reads
/// are built on top of them. Every read may block (e.g. file-backed images).
pub trait ByteSource {
    /// Fill `buf` with the bytes starting at `address`.
    ///
    /// Fails with `TruncatedInput` if the source ends before `buf` is full.
    fn read_into(&mut self, address: usize, buf: &mut [u8]) -> Result<(), DecodeError>;

    /// Position a decode starts at when no address is supplied.
    fn current_address(&mut self) -> Result<usize, DecodeError>;

    /// Read `count` bytes starting at `address`.
    fn read_bytes(&mut self, address: usize, count: usize) -> Result<Vec<u8>, DecodeError> {
        let mut buf = vec![0u8; count];
        self.read_into(address, &mut buf)?;
        Ok(buf)
    }

    /// Read a single byte.
    fn read_u8(&mut self, address: usize) -> Result<u8, DecodeError> {
        let mut buf = [0u8; 1];
        self.read_into(address, &mut buf)?;
        Ok(buf[0])
    }

    /// Read a big-endian `u16`.
    fn read_u16_be(&mut self, address: usize) -> Result<u16, DecodeError> {
        let mut buf = [0u8; 2];
        self.read_into(address, &mut buf)?;
        Ok(u16::from_be_bytes(buf))
    }
}

impl<S: ByteSource + ?Sized> ByteSource for &mut S {
    fn read_into(&mut self, address: usize, buf: &mut [u8]) -> Result<(), DecodeError> {
        (**self).read_into(address, buf)
    }

    fn current_address(&mut self) -> Result<usize, DecodeError> {
        (**self).current_address()
    }
}

// ---------------------------------------------------------------------------
// In-memory source
// ---------------------------------------------------------------------------

/// In-memory image with a settable cursor.
#[derive(Debug, Clone, Copy)]
pub struct SliceSource<'a> {
    data: &'a [u8],
    cursor: usize,
}

impl<'a> SliceSource<'a> {
    pub fn new(data: &'a [u8]) -> Self {
        Self { data, cursor: 0 }
    }

    /// Source whose `current_address` is `cursor`.
    pub fn with_cursor(data: &'a [u8], cursor: usize) -> Self {
        Self { data, cursor }
    }

    pub fn set_cursor(&mut self, cursor: usize) {
        self.cursor = cursor;
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}

impl ByteSource for SliceSource<'_> {
    fn read_into(&mut self, address: usize, buf: &mut [u8]) -> Result<(), DecodeError> {
        let bytes = address
            .checked_add(buf.len())
            .and_then(|end| self.data.get(address..end))
            .ok_or(DecodeError::TruncatedInput {
                address,
                needed: buf.len(),
            })?;
        buf.copy_from_slice(bytes);
        Ok(())
    }

    fn current_address(&mut self) -> Result<usize, DecodeError> {
        Ok(self.cursor)
    }
}

// ---------------------------------------------------------------------------
// Seekable source
// ---------------------------------------------------------------------------

/// Source backed by any `Read + Seek` (e.g. a buffered image file).
///
/// Each read seeks to its address; `current_address` reports the stream
/// position at the time of the call.
#[derive(Debug)]
pub struct SeekSource<R> {
    inner: R,
}

impl<R: Read + Seek> SeekSource<R> {
    pub fn new(inner: R) -> Self {
        Self { inner }
    }

    pub fn into_inner(self) -> R {
        self.inner
    }
}

impl<R: Read + Seek> ByteSource for SeekSource<R> {
    fn read_into(&mut self, address: usize, buf: &mut [u8]) -> Result<(), DecodeError> {
        self.inner.seek(SeekFrom::Start(address as u64))?;
        self.inner.read_exact(buf).map_err(|e| {
            if e.kind() == io::ErrorKind::UnexpectedEof {
                DecodeError::TruncatedInput {
                    address,
                    needed: buf.len(),
                }
            } else {
                DecodeError::Io(e)
            }
        })
    }

    fn current_address(&mut self) -> Result<usize, DecodeError> {
        let pos = self.inner.stream_position()?;
        usize::try_from(pos).map_err(|_| {
            DecodeError::Io(io::Error::new(
                io::ErrorKind::InvalidInput,
                "stream position does not fit in usize",
            ))
        })
    }
}

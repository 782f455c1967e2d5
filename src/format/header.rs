// Record header encoding and decoding.
//
// Short form (1 byte):
//
//     ccc lllll          ccc = command code, lllll = length - 1 (0..=31)
//
// Extended form (2 bytes, big-endian):
//
//     111 ccc ll  llllllll     ccc = command code, l = length - 1 (0..=1023)
//
// A first byte with the top three bits set always introduces the extended
// form, so command 7 can never be written short.  0xFF is the end marker and
// is checked before any header parsing.

use thiserror::Error;

use super::command::Command;
use super::{END_MARKER, MAX_COMMAND_LEN, SHORT_HEADER_MAX_LEN};

/// Top-three-bits escape introducing an extended header.
const EXTENDED_MARKER: u8 = 0xE0;

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum HeaderError {
    #[error("record length {length} outside 1..=1024")]
    LengthOutOfRange { length: usize },
    #[error("unknown command code {code}")]
    UnknownCommand { code: u8 },
    #[error("extended header is missing its second byte")]
    Truncated,
}

// ---------------------------------------------------------------------------
// Header
// ---------------------------------------------------------------------------

/// A decoded record header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Header {
    /// The 0xFF end marker.
    End,
    /// A data-bearing record. `length` is in command units (1..=1024).
    Command { command: Command, length: usize },
}

/// True if `byte0` starts a 2-byte header (and is not the end marker).
#[inline]
pub fn is_extended(byte0: u8) -> bool {
    byte0 != END_MARKER && byte0 & EXTENDED_MARKER == EXTENDED_MARKER
}

/// Number of header bytes `encode_header` writes for `length`.
#[inline]
pub fn header_len(length: usize) -> usize {
    if length > SHORT_HEADER_MAX_LEN { 2 } else { 1 }
}

/// Append the header for `(command, length)` to `out`.
///
/// Lengths above 32 use the extended form. Returns the number of bytes
/// written, or `LengthOutOfRange` if `length` is 0 or above 1024.
pub fn encode_header(
    command: Command,
    length: usize,
    out: &mut Vec<u8>,
) -> Result<usize, HeaderError> {
    if length == 0 || length > MAX_COMMAND_LEN {
        return Err(HeaderError::LengthOutOfRange { length });
    }
    let n = (length - 1) as u16;
    let code = command.code();
    if length > SHORT_HEADER_MAX_LEN {
        let word = 0xE000 | (u16::from(code) << 10) | n;
        out.extend_from_slice(&word.to_be_bytes());
        Ok(2)
    } else {
        out.push((code << 5) | n as u8);
        Ok(1)
    }
}

/// Decode a header from the start of `bytes`.
///
/// `bytes` must hold at least the first header byte; the second is only
/// looked at for extended headers. Returns the header and the number of
/// bytes consumed (1 or 2).
pub fn decode_header(bytes: &[u8]) -> Result<(Header, usize), HeaderError> {
    let &byte0 = bytes.first().ok_or(HeaderError::Truncated)?;
    if byte0 == END_MARKER {
        return Ok((Header::End, 1));
    }
    let (code, length, consumed) = if is_extended(byte0) {
        let &byte1 = bytes.get(1).ok_or(HeaderError::Truncated)?;
        let code = (byte0 >> 2) & 0x07;
        let length = ((usize::from(byte0 & 0x03) << 8) | usize::from(byte1)) + 1;
        (code, length, 2)
    } else {
        (byte0 >> 5, usize::from(byte0 & 0x1F) + 1, 1)
    };
    let command = Command::from_code(code).ok_or(HeaderError::UnknownCommand { code })?;
    Ok((Header::Command { command, length }, consumed))
}

// Decoding helpers over the format-level `Decoder`.

use crate::format::decoder::{DecodeError, Decoder};
use crate::format::source::{ByteSource, SliceSource};

/// Result of decoding one stream out of a larger image.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Decoded {
    /// Decoded bytes.
    pub data: Vec<u8>,
    /// Address of the first header byte.
    pub start: usize,
    /// Address just past the end marker.
    pub end: usize,
}

impl Decoded {
    /// Bytes the compressed stream occupies, end marker included.
    pub fn compressed_len(&self) -> usize {
        self.end - self.start
    }
}

/// Decode a stream that starts at the beginning of `stream`.
///
/// Bytes after the end marker are ignored.
pub fn decode_all(stream: &[u8]) -> Result<Vec<u8>, DecodeError> {
    Decoder::new(SliceSource::new(stream), 0)
        .finish()
        .map(|(data, _)| data)
}

/// Decode the stream at `address`, or at the source's current address
/// when `address` is `None`.
pub fn decode_at<S: ByteSource>(source: S, address: Option<usize>) -> Result<Decoded, DecodeError> {
    let decoder = match address {
        Some(address) => Decoder::new(source, address),
        None => Decoder::at_cursor(source)?,
    };
    let start = decoder.start_address();
    let (data, end) = decoder.finish()?;
    Ok(Decoded { data, start, end })
}

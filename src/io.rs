// File-level helpers.
//
// `compress_file()` packs a whole file into one stream.  `decompress_file()`
// decodes the stream stored at an offset of a larger image; the image is
// read through a seekable, buffered source so only the addressed stream is
// touched.  With the `file-io` feature, SHA-256 digests of the uncompressed
// data are reported alongside the sizes.

use std::fs::File;
use std::io::{self, BufReader, BufWriter, Write};
use std::path::Path;

#[cfg(feature = "file-io")]
use sha2::Digest;
use thiserror::Error;

use crate::compress::decoder::decode_at;
use crate::compress::encoder::{CommandStats, CompressOptions, EncodeError, encode_with_stats};
use crate::format::decoder::DecodeError;
use crate::format::source::SeekSource;

const BUF_SIZE: usize = 64 * 1024; // 64 KiB

// ---------------------------------------------------------------------------
// Stats
// ---------------------------------------------------------------------------

/// Statistics returned by `compress_file()`.
#[derive(Debug, Clone)]
pub struct CompressStats {
    /// Input file size in bytes.
    pub input_size: u64,
    /// Compressed output size in bytes.
    pub output_size: u64,
    /// Record breakdown of the stream.
    pub commands: CommandStats,
    /// SHA-256 of the input (if `file-io` feature is enabled).
    pub input_sha256: Option<[u8; 32]>,
}

/// Statistics returned by `decompress_file()`.
#[derive(Debug, Clone)]
pub struct DecompressStats {
    /// Image address the stream started at.
    pub start: u64,
    /// Image address just past the end marker.
    pub end: u64,
    /// Decoded output size in bytes.
    pub output_size: u64,
    /// SHA-256 of the decoded output (if `file-io` feature is enabled).
    pub output_sha256: Option<[u8; 32]>,
}

impl DecompressStats {
    /// Bytes the compressed stream occupies in the image.
    pub fn compressed_size(&self) -> u64 {
        self.end - self.start
    }
}

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Error type for file operations.
#[derive(Debug, Error)]
pub enum IoError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
    #[error("encode error: {0}")]
    Encode(#[from] EncodeError),
    #[error("decode error: {0}")]
    Decode(#[from] DecodeError),
}

// ---------------------------------------------------------------------------
// compress_file / decompress_file
// ---------------------------------------------------------------------------

/// Compress `input_path` into a stream written to `output_path`.
pub fn compress_file(
    input_path: &Path,
    output_path: &Path,
    opts: CompressOptions,
) -> Result<CompressStats, IoError> {
    let input = std::fs::read(input_path)?;
    let (stream, commands) = encode_with_stats(&input, opts)?;

    let mut writer = BufWriter::with_capacity(BUF_SIZE, File::create(output_path)?);
    writer.write_all(&stream)?;
    writer.flush()?;

    Ok(CompressStats {
        input_size: input.len() as u64,
        output_size: stream.len() as u64,
        commands,
        input_sha256: sha256(&input),
    })
}

/// Decode the stream at `offset` of `image_path` (offset 0 when `None`)
/// and write the output to `output_path`.
pub fn decompress_file(
    image_path: &Path,
    offset: Option<u64>,
    output_path: &Path,
) -> Result<DecompressStats, IoError> {
    let reader = BufReader::with_capacity(BUF_SIZE, File::open(image_path)?);
    let address = offset
        .map(|o| {
            usize::try_from(o).map_err(|_| {
                io::Error::new(io::ErrorKind::InvalidInput, "offset does not fit in usize")
            })
        })
        .transpose()?;
    let decoded = decode_at(SeekSource::new(reader), address)?;

    let mut writer = BufWriter::with_capacity(BUF_SIZE, File::create(output_path)?);
    writer.write_all(&decoded.data)?;
    writer.flush()?;

    Ok(DecompressStats {
        start: decoded.start as u64,
        end: decoded.end as u64,
        output_size: decoded.data.len() as u64,
        output_sha256: sha256(&decoded.data),
    })
}

#[cfg(feature = "file-io")]
fn sha256(data: &[u8]) -> Option<[u8; 32]> {
    Some(sha2::Sha256::digest(data).into())
}

#[cfg(not(feature = "file-io"))]
fn sha256(_data: &[u8]) -> Option<[u8; 32]> {
    None
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

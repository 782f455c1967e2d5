// Wire format of the compressed stream.
//
// A stream is a sequence of header + payload records terminated by the
// 0xFF end marker.  Decoded output never exceeds 65 535 bytes.
//
// # Modules
//
// - `command` — Command kinds and their payload widths
// - `header`  — 1-byte / 2-byte record header encoding and decoding
// - `bits`    — Bit-reversal used by mirrored back-references
// - `source`  — Address-indexed byte sources the decoder reads from
// - `decoder` — Record parsing and output reconstruction

pub mod bits;
pub mod command;
pub mod decoder;
pub mod header;
pub mod source;

pub use bits::reverse_bits;
pub use command::Command;
pub use decoder::{DecodeError, Decoder, Payload, Record, RecordReader};
pub use header::{Header, HeaderError, decode_header, encode_header};
pub use source::{ByteSource, SeekSource, SliceSource};

/// Byte that terminates every compressed stream.
pub const END_MARKER: u8 = 0xFF;

/// Largest decoded output a stream may produce.
pub const MAX_OUTPUT_LEN: usize = 65_535;

/// Largest length a single record can express (extended header).
pub const MAX_COMMAND_LEN: usize = 1024;

/// Largest length a short (1-byte) header can express.
pub const SHORT_HEADER_MAX_LEN: usize = 32;

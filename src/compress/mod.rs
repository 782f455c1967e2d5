// High-level compression API.
//
// - `encoder` — greedy parse over the match engine, literal buffering and
//               record emission
// - `decoder` — whole-buffer and address-based decoding helpers

pub mod decoder;
pub mod encoder;

pub use decoder::{Decoded, decode_all, decode_at};
pub use encoder::{CommandStats, CompressOptions, EncodeError, Emitter, encode_all, encode_with_stats};

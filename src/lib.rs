//! Halpack: a run-length/back-reference codec for assets packed into
//! 64 KiB-addressable banks.
//!
//! The crate provides:
//! - The wire format and its decoder (`format`)
//! - The six-way match search used by the encoder (`search`)
//! - High-level encode/decode APIs (`compress`)
//! - File-oriented helpers (`io`)
//! - An optional CLI (`cli` feature)
//!
//! # Quick Start
//!
//! ```
//! use halpack::compress::{decode_all, encode_all, CompressOptions};
//!
//! let tiles = [0x41u8; 40];
//! let stream = encode_all(&tiles, CompressOptions::default()).unwrap();
//! assert_eq!(stream, [0xE4, 0x27, 0x41, 0xFF]);
//! assert_eq!(decode_all(&stream).unwrap(), tiles);
//! ```

pub mod compress;
pub mod format;
pub mod io;
pub mod search;

#[cfg(feature = "cli")]
pub mod cli;

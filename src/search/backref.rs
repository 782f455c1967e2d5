// Back-reference finders.
//
// For a cursor `pos`, every earlier offset whose seed byte matches is
// extended into a match and the longest one wins (ties go to the lowest
// offset).  Three directions are searched:
//
//   Forward  data[off + i]               == data[pos + i]   i < min(pos - off, MAX_MATCH)
//   Mirror   reverse_bits(data[off + i]) == data[pos + i]   i < min(pos - off, MAX_MATCH)
//   Reverse  data[off - i]               == data[pos + i]   i < min(off, MAX_MATCH)
//
// Forward and mirror matches stay below `pos`, so the decoder never copies
// bytes it has not produced yet.  The offset range can be split into chunks
// that are scanned independently; the reduction gives the same answer as a
// single sequential scan.

use std::ops::Range;

#[cfg(feature = "parallel")]
use rayon::prelude::*;

use super::config::MAX_MATCH;
use crate::format::bits::reverse_bits;

/// Direction of a back-reference search.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Forward,
    Mirror,
    Reverse,
}

/// Best match found for one direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BackMatch {
    /// Absolute offset of the referenced bytes (start for forward/mirror,
    /// first byte walked for reverse).
    pub offset: usize,
    pub length: usize,
}

impl BackMatch {
    /// Longer wins; on equal length the lower offset wins.
    fn better(self, other: BackMatch) -> BackMatch {
        if other.length > self.length
            || (other.length == self.length && other.offset < self.offset)
        {
            other
        } else {
            self
        }
    }
}

#[inline]
fn seed_matches(dir: Direction, data: &[u8], off: usize, pos: usize) -> bool {
    match dir {
        Direction::Forward | Direction::Reverse => data[off] == data[pos],
        Direction::Mirror => reverse_bits(data[off]) == data[pos],
    }
}

/// Length of the match between the bytes at `off` and the bytes at `pos`.
pub fn match_len(dir: Direction, data: &[u8], off: usize, pos: usize) -> usize {
    let ahead = &data[pos..];
    match dir {
        Direction::Forward => {
            let cap = (pos - off).min(MAX_MATCH);
            data[off..]
                .iter()
                .zip(ahead)
                .take(cap)
                .take_while(|(a, b)| a == b)
                .count()
        }
        Direction::Mirror => {
            let cap = (pos - off).min(MAX_MATCH);
            data[off..]
                .iter()
                .zip(ahead)
                .take(cap)
                .take_while(|&(&a, &b)| reverse_bits(a) == b)
                .count()
        }
        Direction::Reverse => {
            let cap = off.min(MAX_MATCH);
            data[..=off]
                .iter()
                .rev()
                .zip(ahead)
                .take(cap)
                .take_while(|(a, b)| a == b)
                .count()
        }
    }
}

/// Scan the offsets in `offsets` (all below `pos`) sequentially.
///
/// Stops as soon as a match reaches the longest possible length.
pub fn scan(dir: Direction, data: &[u8], pos: usize, offsets: Range<usize>) -> Option<BackMatch> {
    let limit = (data.len() - pos).min(MAX_MATCH);
    let mut best: Option<BackMatch> = None;
    for off in offsets {
        if !seed_matches(dir, data, off, pos) {
            continue;
        }
        let length = match_len(dir, data, off, pos);
        if length == 0 {
            continue;
        }
        let found = BackMatch { offset: off, length };
        let next = best.map_or(found, |b| b.better(found));
        best = Some(next);
        if next.length == limit {
            break;
        }
    }
    best
}

/// Find the best match at `pos` over every earlier offset.
///
/// With `parallel` (and the `parallel` feature) the offsets are split into
/// `chunk_size` pieces scanned on the rayon pool.
pub fn find(
    dir: Direction,
    data: &[u8],
    pos: usize,
    chunk_size: usize,
    parallel: bool,
) -> Option<BackMatch> {
    if pos >= data.len() {
        return None;
    }
    let chunk_size = chunk_size.max(1);
    if parallel && pos > chunk_size {
        return find_chunked(dir, data, pos, chunk_size);
    }
    scan(dir, data, pos, 0..pos)
}

#[cfg(feature = "parallel")]
fn find_chunked(dir: Direction, data: &[u8], pos: usize, chunk_size: usize) -> Option<BackMatch> {
    (0..pos.div_ceil(chunk_size))
        .into_par_iter()
        .filter_map(|c| {
            let start = c * chunk_size;
            scan(dir, data, pos, start..(start + chunk_size).min(pos))
        })
        .reduce_with(BackMatch::better)
}

#[cfg(not(feature = "parallel"))]
fn find_chunked(dir: Direction, data: &[u8], pos: usize, chunk_size: usize) -> Option<BackMatch> {
    (0..pos)
        .step_by(chunk_size)
        .filter_map(|start| scan(dir, data, pos, start..(start + chunk_size).min(pos)))
        .reduce(BackMatch::better)
}

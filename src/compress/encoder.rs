// Greedy encoder.
//
// At every cursor position the match engine proposes candidates; the one
// covering the most input wins (ties to the earliest finder).  A winner that
// is not worth a record of its own becomes one pending literal byte.
// Pending literals are flushed as a single `Literal` record before the next
// non-literal record, whenever 1024 of them have accumulated, and at the end
// of input.  The stream is closed with the 0xFF end marker.

use log::{debug, trace};
use thiserror::Error;

use crate::format::header::{self, HeaderError};
use crate::format::{Command, END_MARKER, MAX_COMMAND_LEN, MAX_OUTPUT_LEN};
use crate::search::config::SearchConfig;
use crate::search::engine::{Candidate, CandidatePayload, MatchEngine};

// ---------------------------------------------------------------------------
// Options
// ---------------------------------------------------------------------------

/// Configuration for the encoder.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CompressOptions {
    /// Skip the mirrored and reverse back-reference finders.
    pub fast: bool,
    /// Evaluate finders on the rayon pool (needs the `parallel` feature).
    pub parallel: bool,
}

impl Default for CompressOptions {
    fn default() -> Self {
        Self {
            fast: false,
            parallel: true,
        }
    }
}

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

#[derive(Debug, Error)]
pub enum EncodeError {
    #[error("{command} record of length {length} does not fit a header")]
    PayloadTooLarge { command: Command, length: usize },
    #[error("input of {len} bytes exceeds the {limit}-byte limit")]
    InputTooLarge { len: usize, limit: usize },
}

// ---------------------------------------------------------------------------
// Stats
// ---------------------------------------------------------------------------

/// Per-command record counts and sizes of one encode.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandStats {
    /// Uncompressed input size.
    pub input_len: usize,
    /// Compressed stream size, end marker included.
    pub output_len: usize,
    records: [usize; 7],
    produced: [usize; 7],
}

impl CommandStats {
    fn record(&mut self, command: Command, produced: usize) {
        let i = usize::from(command.code());
        self.records[i] += 1;
        self.produced[i] += produced;
    }

    /// Number of records emitted for `command`.
    pub fn records(&self, command: Command) -> usize {
        self.records[usize::from(command.code())]
    }

    /// Input bytes covered by records of `command`.
    pub fn produced(&self, command: Command) -> usize {
        self.produced[usize::from(command.code())]
    }

    /// Total records emitted, end marker excluded.
    pub fn total_records(&self) -> usize {
        self.records.iter().sum()
    }

    /// Non-zero record counts as `name=count` pairs, in command-code order.
    pub fn mix(&self) -> String {
        Command::ALL
            .iter()
            .filter(|&&c| self.records(c) > 0)
            .map(|&c| format!("{}={}", c.name(), self.records(c)))
            .collect::<Vec<_>>()
            .join(" ")
    }

    /// Compressed size over input size (0 for empty input).
    pub fn ratio(&self) -> f64 {
        if self.input_len == 0 {
            0.0
        } else {
            self.output_len as f64 / self.input_len as f64
        }
    }
}

// ---------------------------------------------------------------------------
// Emitter
// ---------------------------------------------------------------------------

/// Output side of the encoder: pending literals plus the stream built so far.
#[derive(Debug, Default)]
pub struct Emitter {
    out: Vec<u8>,
    literals: Vec<u8>,
    stats: CommandStats,
}

impl Emitter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stream bytes written so far (pending literals excluded).
    pub fn written(&self) -> &[u8] {
        &self.out
    }

    /// Number of literal bytes waiting to be flushed.
    pub fn pending_literals(&self) -> usize {
        self.literals.len()
    }

    /// Queue one literal byte, flushing once a full record has accumulated.
    pub fn push_literal(&mut self, byte: u8) -> Result<(), EncodeError> {
        self.literals.push(byte);
        if self.literals.len() == MAX_COMMAND_LEN {
            self.flush_literals()?;
        }
        Ok(())
    }

    /// Write pending literals as one `Literal` record.
    pub fn flush_literals(&mut self) -> Result<(), EncodeError> {
        if self.literals.is_empty() {
            return Ok(());
        }
        let length = self.literals.len();
        self.header(Command::Literal, length)?;
        trace!("emit literal x{length}");
        self.out.append(&mut self.literals);
        self.stats.record(Command::Literal, length);
        Ok(())
    }

    /// Flush pending literals, then write the record for `candidate`.
    pub fn emit(&mut self, candidate: &Candidate) -> Result<(), EncodeError> {
        self.flush_literals()?;
        let units = candidate.units();
        self.header(candidate.command, units)?;
        match candidate.payload {
            CandidatePayload::Byte(b) => self.out.push(b),
            CandidatePayload::Word(w) => self.out.extend_from_slice(&w),
            CandidatePayload::Offset(off) => self.out.extend_from_slice(&off.to_be_bytes()),
        }
        trace!(
            "emit {} x{units} {:?}",
            candidate.command, candidate.payload
        );
        self.stats.record(candidate.command, candidate.consumed);
        Ok(())
    }

    /// Flush pending literals and append the end marker.
    pub fn finish(mut self) -> Result<(Vec<u8>, CommandStats), EncodeError> {
        self.flush_literals()?;
        self.out.push(END_MARKER);
        self.stats.output_len = self.out.len();
        Ok((self.out, self.stats))
    }

    fn header(&mut self, command: Command, length: usize) -> Result<(), EncodeError> {
        header::encode_header(command, length, &mut self.out)
            .map(|_| ())
            .map_err(|_: HeaderError| EncodeError::PayloadTooLarge { command, length })
    }
}

// ---------------------------------------------------------------------------
// Entry points
// ---------------------------------------------------------------------------

/// Encode `data` into a complete stream.
pub fn encode_all(data: &[u8], opts: CompressOptions) -> Result<Vec<u8>, EncodeError> {
    encode_with_stats(data, opts).map(|(out, _)| out)
}

/// Encode `data` and report what the stream is made of.
pub fn encode_with_stats(
    data: &[u8],
    opts: CompressOptions,
) -> Result<(Vec<u8>, CommandStats), EncodeError> {
    if data.len() > MAX_OUTPUT_LEN {
        return Err(EncodeError::InputTooLarge {
            len: data.len(),
            limit: MAX_OUTPUT_LEN,
        });
    }

    let config = SearchConfig::for_mode(opts.fast);
    let engine = MatchEngine::new(data, config).with_parallel(opts.parallel);
    let mut emitter = Emitter::new();

    let mut pos = 0;
    while pos < data.len() {
        match engine.best(pos) {
            Some(candidate) if candidate.is_worthwhile() => {
                emitter.emit(&candidate)?;
                pos += candidate.consumed;
            }
            _ => {
                emitter.push_literal(data[pos])?;
                pos += 1;
            }
        }
    }

    let (out, mut stats) = emitter.finish()?;
    stats.input_len = data.len();
    debug!(
        "encoded {} bytes into {} ({} records: {}; {} profile)",
        stats.input_len,
        stats.output_len,
        stats.total_records(),
        stats.mix(),
        config.name
    );
    Ok((out, stats))
}

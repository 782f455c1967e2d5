// Stream decoder: record parsing and output reconstruction.
//
// Follows a two-state progression.  While `Reading`, each step parses one
// header at the current address, checks the prospective output size
// against the 65 535-byte ceiling, reads the payload and applies the
// record.  The 0xFF end marker moves the decoder to `Done`.
//
// Back-references may only address output that is already fully written:
// a `BackRef`/`MirrorBackRef` never extends into the bytes it produces.

use log::{debug, trace};
use thiserror::Error;

use super::bits::reverse_bits;
use super::command::Command;
use super::header::{self, Header, HeaderError};
use super::source::ByteSource;
use super::MAX_OUTPUT_LEN;

// ---------------------------------------------------------------------------
// Decoder error
// ---------------------------------------------------------------------------

#[derive(Debug, Error)]
pub enum DecodeError {
    #[error("unknown command code {code} at address {address:#06X}")]
    UnknownCommand { code: u8, address: usize },
    #[error("decoded output would grow to {requested} bytes (limit {limit})")]
    OutputOverflow { requested: usize, limit: usize },
    #[error(
        "{command} at offset {offset} with length {length} reaches outside the {available} bytes decoded so far"
    )]
    BackReferenceOutOfRange {
        command: Command,
        offset: usize,
        length: usize,
        available: usize,
    },
    #[error("input ends at address {address:#06X}, {needed} more bytes needed")]
    TruncatedInput { address: usize, needed: usize },
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

// ---------------------------------------------------------------------------
// Records
// ---------------------------------------------------------------------------

/// Payload carried by a record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Payload {
    /// Raw bytes of a `Literal`.
    Bytes(Vec<u8>),
    /// Fill byte of `RunByte`, start value of `RunIncrement`.
    Byte(u8),
    /// Pattern of `RunWord`.
    Word([u8; 2]),
    /// Absolute output offset of a back-reference.
    Offset(u16),
}

impl Payload {
    /// Encoded size of the payload in bytes.
    pub fn len(&self) -> usize {
        match self {
            Payload::Bytes(b) => b.len(),
            Payload::Byte(_) => 1,
            Payload::Word(_) | Payload::Offset(_) => 2,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// One parsed header + payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Record {
    /// Address of the header byte.
    pub address: usize,
    pub command: Command,
    /// Length in command units (`RunWord` counts repetitions).
    pub length: usize,
    pub payload: Payload,
}

impl Record {
    /// Bytes this record appends to the output.
    pub fn output_len(&self) -> usize {
        self.length * self.command.unit_size()
    }

    /// Bytes this record occupies in the stream.
    pub fn encoded_len(&self) -> usize {
        header::header_len(self.length) + self.payload.len()
    }
}

// ---------------------------------------------------------------------------
// Record reader
// ---------------------------------------------------------------------------

/// Parses records from a byte source without applying them.
///
/// Iteration yields every record up to (not including) the end marker,
/// then stops. After an error the iterator is exhausted.
pub struct RecordReader<S> {
    source: S,
    address: usize,
    finished: bool,
}

impl<S: ByteSource> RecordReader<S> {
    /// Reader positioned at `address`.
    pub fn new(source: S, address: usize) -> Self {
        Self {
            source,
            address,
            finished: false,
        }
    }

    /// Reader positioned at the source's current address.
    pub fn at_cursor(mut source: S) -> Result<Self, DecodeError> {
        let address = source.current_address()?;
        Ok(Self::new(source, address))
    }

    /// Address of the next unread byte.
    pub fn address(&self) -> usize {
        self.address
    }

    /// True once the end marker has been consumed.
    pub fn is_finished(&self) -> bool {
        self.finished
    }

    pub fn into_source(self) -> S {
        self.source
    }

    /// Read the header at the current address.
    pub fn read_header(&mut self) -> Result<Header, DecodeError> {
        let start = self.address;
        let byte0 = self.source.read_u8(start)?;
        let mut bytes = [byte0, 0];
        if header::is_extended(byte0) {
            bytes[1] = self.source.read_u8(start + 1)?;
        }
        let (header, consumed) = header::decode_header(&bytes).map_err(|e| match e {
            HeaderError::UnknownCommand { code } => DecodeError::UnknownCommand {
                code,
                address: start,
            },
            HeaderError::Truncated | HeaderError::LengthOutOfRange { .. } => {
                DecodeError::TruncatedInput {
                    address: start,
                    needed: 2,
                }
            }
        })?;
        self.address += consumed;
        if header == Header::End {
            self.finished = true;
        }
        Ok(header)
    }

    /// Read the payload for a header just returned by `read_header`.
    pub fn read_payload(&mut self, command: Command, length: usize) -> Result<Payload, DecodeError> {
        let at = self.address;
        let payload = match command {
            Command::Literal => Payload::Bytes(self.source.read_bytes(at, length)?),
            Command::RunByte | Command::RunIncrement => Payload::Byte(self.source.read_u8(at)?),
            Command::RunWord => {
                let mut word = [0u8; 2];
                self.source.read_into(at, &mut word)?;
                Payload::Word(word)
            }
            Command::BackRef | Command::MirrorBackRef | Command::ReverseBackRef => {
                Payload::Offset(self.source.read_u16_be(at)?)
            }
        };
        self.address += payload.len();
        Ok(payload)
    }

    /// Read the next full record. Returns `None` at the end marker.
    pub fn read_record(&mut self) -> Result<Option<Record>, DecodeError> {
        let address = self.address;
        match self.read_header()? {
            Header::End => Ok(None),
            Header::Command { command, length } => {
                let payload = self.read_payload(command, length)?;
                Ok(Some(Record {
                    address,
                    command,
                    length,
                    payload,
                }))
            }
        }
    }
}

impl<S: ByteSource> Iterator for RecordReader<S> {
    type Item = Result<Record, DecodeError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.finished {
            return None;
        }
        match self.read_record() {
            Ok(Some(record)) => Some(Ok(record)),
            Ok(None) => None,
            Err(e) => {
                self.finished = true;
                Some(Err(e))
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Decoder
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    Reading,
    Done,
}

/// Decodes one compressed stream into its output buffer.
pub struct Decoder<S> {
    reader: RecordReader<S>,
    start: usize,
    output: Vec<u8>,
    state: State,
}

impl<S: ByteSource> Decoder<S> {
    /// Decoder for the stream starting at `address`.
    pub fn new(source: S, address: usize) -> Self {
        Self {
            reader: RecordReader::new(source, address),
            start: address,
            output: Vec::new(),
            state: State::Reading,
        }
    }

    /// Decoder for the stream starting at the source's current address.
    pub fn at_cursor(source: S) -> Result<Self, DecodeError> {
        let reader = RecordReader::at_cursor(source)?;
        let start = reader.address();
        Ok(Self {
            reader,
            start,
            output: Vec::new(),
            state: State::Reading,
        })
    }

    /// Address the stream started at.
    pub fn start_address(&self) -> usize {
        self.start
    }

    /// Address of the next unread stream byte.
    pub fn address(&self) -> usize {
        self.reader.address()
    }

    /// Output decoded so far.
    pub fn output(&self) -> &[u8] {
        &self.output
    }

    pub fn is_done(&self) -> bool {
        self.state == State::Done
    }

    /// Decode one record. Returns `false` once the end marker is reached.
    pub fn step(&mut self) -> Result<bool, DecodeError> {
        if self.state == State::Done {
            return Ok(false);
        }
        let address = self.reader.address();
        let (command, length) = match self.reader.read_header()? {
            Header::End => {
                self.state = State::Done;
                return Ok(false);
            }
            Header::Command { command, length } => (command, length),
        };

        let requested = self.output.len() + length * command.unit_size();
        if requested > MAX_OUTPUT_LEN {
            return Err(DecodeError::OutputOverflow {
                requested,
                limit: MAX_OUTPUT_LEN,
            });
        }

        let payload = self.reader.read_payload(command, length)?;
        trace!("{address:#06X}: {command} x{length} {payload:?}");
        apply(&mut self.output, command, length, &payload)?;
        Ok(true)
    }

    /// Run to the end marker. Returns the output and the address just past
    /// the end marker.
    pub fn finish(mut self) -> Result<(Vec<u8>, usize), DecodeError> {
        while self.step()? {}
        let end = self.reader.address();
        debug!(
            "decoded {} bytes from {} stream bytes at {:#06X}",
            self.output.len(),
            end - self.start,
            self.start
        );
        Ok((self.output, end))
    }
}

/// Append the output of one record to `output`.
///
/// The caller has already checked the size ceiling.
fn apply(
    output: &mut Vec<u8>,
    command: Command,
    length: usize,
    payload: &Payload,
) -> Result<(), DecodeError> {
    match *payload {
        Payload::Bytes(ref bytes) => output.extend_from_slice(bytes),
        Payload::Byte(b) if command == Command::RunIncrement => {
            output.extend((0..length).map(|i| b.wrapping_add(i as u8)));
        }
        Payload::Byte(b) => output.resize(output.len() + length, b),
        Payload::Word(word) => {
            output.reserve(length * 2);
            for _ in 0..length {
                output.extend_from_slice(&word);
            }
        }
        Payload::Offset(offset) if command == Command::ReverseBackRef => {
            let offset = usize::from(offset);
            if offset >= output.len() || length > offset + 1 {
                return Err(DecodeError::BackReferenceOutOfRange {
                    command,
                    offset,
                    length,
                    available: output.len(),
                });
            }
            output.reserve(length);
            for i in 0..length {
                let b = output[offset - i];
                output.push(b);
            }
        }
        Payload::Offset(offset) => {
            let offset = usize::from(offset);
            let end = offset + length;
            if end > output.len() {
                return Err(DecodeError::BackReferenceOutOfRange {
                    command,
                    offset,
                    length,
                    available: output.len(),
                });
            }
            if command == Command::MirrorBackRef {
                output.reserve(length);
                for i in offset..end {
                    let b = output[i];
                    output.push(reverse_bits(b));
                }
            } else {
                output.extend_from_within(offset..end);
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::format::source::SliceSource;

    fn decode(stream: &[u8]) -> Result<Vec<u8>, DecodeError> {
        Decoder::new(SliceSource::new(stream), 0)
            .finish()
            .map(|(data, _)| data)
    }

    #[test]
    fn empty_stream() {
        assert_eq!(decode(&[0xFF]).unwrap(), Vec::<u8>::new());
    }

    #[test]
    fn literal_then_back_ref() {
        let stream = [0x02, 1, 2, 3, 0x82, 0x00, 0x00, 0xFF];
        assert_eq!(decode(&stream).unwrap(), [1, 2, 3, 1, 2, 3]);
    }

    #[test]
    fn run_byte_short_and_extended() {
        assert_eq!(decode(&[0x23, 0x41, 0xFF]).unwrap(), [0x41; 4]);
        assert_eq!(decode(&[0xE4, 0x27, 0x41, 0xFF]).unwrap(), vec![0x41; 40]);
    }

    #[test]
    fn run_word_repeats_pattern() {
        let stream = [0x42, 0xAA, 0xBB, 0xFF];
        assert_eq!(
            decode(&stream).unwrap(),
            [0xAA, 0xBB, 0xAA, 0xBB, 0xAA, 0xBB]
        );
    }

    #[test]
    fn run_increment_wraps() {
        let stream = [0x63, 0xFE, 0xFF];
        assert_eq!(decode(&stream).unwrap(), [0xFE, 0xFF, 0x00, 0x01]);
    }

    #[test]
    fn mirror_back_ref_reverses_bits() {
        let stream = [0x01, 0x01, 0x0F, 0xA1, 0x00, 0x00, 0xFF];
        assert_eq!(decode(&stream).unwrap(), [0x01, 0x0F, 0x80, 0xF0]);
    }

    #[test]
    fn shared_payload_kinds_dispatch_on_command() {
        let applied = |command, length, payload| {
            let mut output = vec![1, 2, 3, 4];
            apply(&mut output, command, length, &payload).map(|()| output.split_off(4))
        };
        let offset = |o| Payload::Offset(o);
        assert_eq!(applied(Command::RunByte, 3, Payload::Byte(9)).unwrap(), [9, 9, 9]);
        assert_eq!(
            applied(Command::RunIncrement, 3, Payload::Byte(0xFF)).unwrap(),
            [0xFF, 0x00, 0x01]
        );
        assert_eq!(applied(Command::BackRef, 2, offset(1)).unwrap(), [2, 3]);
        assert_eq!(applied(Command::MirrorBackRef, 1, offset(0)).unwrap(), [0x80]);
        assert_eq!(applied(Command::ReverseBackRef, 2, offset(3)).unwrap(), [4, 3]);
        assert!(matches!(
            applied(Command::ReverseBackRef, 2, offset(4)),
            Err(DecodeError::BackReferenceOutOfRange { offset: 4, .. })
        ));
    }

    #[test]
    fn reverse_back_ref_walks_backward() {
        let stream = [0x05, 10, 11, 12, 13, 14, 15, 0xC2, 0x00, 0x05, 0xFF];
        assert_eq!(
            decode(&stream).unwrap(),
            [10, 11, 12, 13, 14, 15, 15, 14, 13]
        );
    }

    #[test]
    fn reverse_back_ref_may_reach_offset_zero() {
        let stream = [0x02, 1, 2, 3, 0xC2, 0x00, 0x02, 0xFF];
        assert_eq!(decode(&stream).unwrap(), [1, 2, 3, 3, 2, 1]);
    }

    #[test]
    fn reverse_back_ref_below_zero_fails() {
        let stream = [0x02, 1, 2, 3, 0xC3, 0x00, 0x02, 0xFF];
        assert!(matches!(
            decode(&stream),
            Err(DecodeError::BackReferenceOutOfRange {
                command: Command::ReverseBackRef,
                offset: 2,
                length: 4,
                ..
            })
        ));
    }

    #[test]
    fn back_ref_may_not_self_extend() {
        // Three bytes decoded, copy 4 from offset 0: would read byte 3 while writing it.
        let stream = [0x02, 1, 2, 3, 0x83, 0x00, 0x00, 0xFF];
        assert!(matches!(
            decode(&stream),
            Err(DecodeError::BackReferenceOutOfRange {
                command: Command::BackRef,
                available: 3,
                ..
            })
        ));
    }

    #[test]
    fn mirror_back_ref_out_of_range() {
        let stream = [0x00, 1, 0xA0, 0x00, 0x01, 0xFF];
        assert!(matches!(
            decode(&stream),
            Err(DecodeError::BackReferenceOutOfRange {
                command: Command::MirrorBackRef,
                ..
            })
        ));
    }

    #[test]
    fn unknown_command_fails() {
        assert!(matches!(
            decode(&[0x00, 0x55, 0xFC, 0x00, 0xFF]),
            Err(DecodeError::UnknownCommand {
                code: 7,
                address: 2
            })
        ));
    }

    #[test]
    fn truncation_points() {
        // No end marker.
        assert!(matches!(
            decode(&[0x00, 0x55]),
            Err(DecodeError::TruncatedInput { address: 2, .. })
        ));
        // Literal payload cut short.
        assert!(matches!(
            decode(&[0x03, 1, 2]),
            Err(DecodeError::TruncatedInput { address: 1, needed: 4 })
        ));
        // Extended header missing its second byte.
        assert!(matches!(
            decode(&[0xE4]),
            Err(DecodeError::TruncatedInput { address: 1, .. })
        ));
        // Back-reference offset cut short.
        assert!(matches!(
            decode(&[0x00, 7, 0x84, 0x00]),
            Err(DecodeError::TruncatedInput { address: 3, needed: 2 })
        ));
    }

    #[test]
    fn output_ceiling_is_enforced() {
        // 64 x 1024-byte runs = 65 536 bytes, one over the limit.
        let mut stream = Vec::new();
        for _ in 0..64 {
            stream.extend_from_slice(&[0xE7, 0xFF, 0x00]);
        }
        stream.push(0xFF);
        assert!(matches!(
            decode(&stream),
            Err(DecodeError::OutputOverflow {
                requested: 65_536,
                limit: 65_535
            })
        ));
    }

    #[test]
    fn run_word_ceiling_counts_both_bytes() {
        // 63 x 1024 = 64 512 bytes, then a 520-repetition word run (1 040 bytes).
        let mut stream = Vec::new();
        for _ in 0..63 {
            stream.extend_from_slice(&[0xE7, 0xFF, 0x00]);
        }
        stream.extend_from_slice(&[0xEA, 0x07, 0x12, 0x34, 0xFF]);
        assert!(matches!(
            decode(&stream),
            Err(DecodeError::OutputOverflow {
                requested: 65_552,
                ..
            })
        ));
    }

    #[test]
    fn output_at_exact_ceiling_succeeds() {
        let mut stream = Vec::new();
        for _ in 0..63 {
            stream.extend_from_slice(&[0xE7, 0xFF, 0x00]);
        }
        // 65 535 - 64 512 = 1 023 bytes.
        stream.extend_from_slice(&[0xE7, 0xFE, 0x00, 0xFF]);
        assert_eq!(decode(&stream).unwrap().len(), MAX_OUTPUT_LEN);
    }

    #[test]
    fn finish_reports_end_address() {
        let image = [0x11, 0x22, 0x21, 0x09, 0xFF, 0x33];
        let (data, end) = Decoder::new(SliceSource::new(&image), 2).finish().unwrap();
        assert_eq!(data, [0x09, 0x09]);
        assert_eq!(end, 5);
    }

    #[test]
    fn decoder_at_cursor() {
        let image = [0x99, 0x00, 0x42, 0xFF];
        let decoder = Decoder::at_cursor(SliceSource::with_cursor(&image, 1)).unwrap();
        assert_eq!(decoder.start_address(), 1);
        assert_eq!(decoder.finish().unwrap().0, [0x42]);
    }

    #[test]
    fn step_stops_after_end() {
        let mut decoder = Decoder::new(SliceSource::new(&[0x00, 0x42, 0xFF]), 0);
        assert!(decoder.step().unwrap());
        assert!(!decoder.step().unwrap());
        assert!(decoder.is_done());
        assert!(!decoder.step().unwrap());
        assert_eq!(decoder.output(), [0x42]);
    }

    #[test]
    fn record_reader_lists_records() {
        let stream = [0x02, 1, 2, 3, 0x82, 0x00, 0x00, 0xE4, 0x27, 0x41, 0xFF];
        let records: Vec<Record> = RecordReader::new(SliceSource::new(&stream), 0)
            .collect::<Result<_, _>>()
            .unwrap();
        assert_eq!(records.len(), 3);
        assert_eq!(records[0].command, Command::Literal);
        assert_eq!(records[0].payload, Payload::Bytes(vec![1, 2, 3]));
        assert_eq!(records[1].address, 4);
        assert_eq!(records[1].payload, Payload::Offset(0));
        assert_eq!(records[1].encoded_len(), 3);
        assert_eq!(records[2].command, Command::RunByte);
        assert_eq!(records[2].length, 40);
        assert_eq!(records[2].output_len(), 40);
        assert_eq!(records[2].encoded_len(), 3);
    }

    #[test]
    fn record_reader_stops_after_error() {
        let mut reader = RecordReader::new(SliceSource::new(&[0xFC, 0x00]), 0);
        assert!(matches!(reader.next(), Some(Err(DecodeError::UnknownCommand { .. }))));
        assert!(reader.next().is_none());
    }
}

use halpack::compress::{CompressOptions, decode_all, encode_all};
use halpack::format::header::{Header, decode_header, encode_header};
use halpack::format::{Command, RecordReader, SliceSource, reverse_bits};
use proptest::prelude::*;

fn encode(data: &[u8], fast: bool) -> Vec<u8> {
    encode_all(
        data,
        CompressOptions {
            fast,
            ..Default::default()
        },
    )
    .unwrap()
}

fn command() -> impl Strategy<Value = Command> {
    (0u8..7).prop_map(|c| Command::from_code(c).unwrap())
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn prop_encode_decode_roundtrip(
        data in proptest::collection::vec(any::<u8>(), 0..2048),
        fast in any::<bool>()
    ) {
        let stream = encode(&data, fast);
        prop_assert_eq!(decode_all(&stream).unwrap(), data);
    }

    #[test]
    fn prop_low_entropy_roundtrip(
        data in proptest::collection::vec(0u8..4, 0..4096)
    ) {
        let stream = encode(&data, false);
        prop_assert_eq!(decode_all(&stream).unwrap(), data);
    }

    #[test]
    fn prop_header_roundtrip(command in command(), length in 1usize..=1024) {
        let mut bytes = Vec::new();
        let written = encode_header(command, length, &mut bytes).unwrap();
        prop_assert_eq!(written, bytes.len());
        prop_assert_eq!(decode_header(&bytes).unwrap(), (Header::Command { command, length }, written));
    }

    #[test]
    fn prop_end_marker_only_terminates(
        data in proptest::collection::vec(any::<u8>(), 0..2048)
    ) {
        let stream = encode(&data, false);
        let mut reader = RecordReader::new(SliceSource::new(&stream), 0);
        for record in reader.by_ref() {
            let record = record.unwrap();
            prop_assert_ne!(stream[record.address], 0xFF);
        }
        prop_assert_eq!(reader.address(), stream.len());
    }

    #[test]
    fn prop_decode_never_panics(stream in proptest::collection::vec(any::<u8>(), 0..512)) {
        let _ = decode_all(&stream);
    }
}

#[test]
fn reverse_bits_is_an_involution() {
    for b in 0..=255u8 {
        assert_eq!(reverse_bits(reverse_bits(b)), b);
    }
}

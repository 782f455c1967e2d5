#![no_main]
use libfuzzer_sys::fuzz_target;
use halpack::compress::{CompressOptions, decode_all, encode_all};
use halpack::format::MAX_OUTPUT_LEN;

fuzz_target!(|data: &[u8]| {
    if data.is_empty() {
        return;
    }

    // Use first byte as control flags.
    let fast = data[0] & 1 != 0;
    let payload = &data[1..];
    if payload.len() > MAX_OUTPUT_LEN {
        return;
    }

    let stream = encode_all(
        payload,
        CompressOptions {
            fast,
            parallel: false,
        },
    )
    .unwrap();
    assert_eq!(stream.last(), Some(&0xFF));

    let decoded = decode_all(&stream).unwrap();
    assert_eq!(decoded, payload);
});

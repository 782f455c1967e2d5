#![no_main]
use libfuzzer_sys::fuzz_target;
use halpack::compress::decode_at;
use halpack::format::{RecordReader, SliceSource};

fuzz_target!(|data: &[u8]| {
    // The decoder must never panic, only return errors.
    let _ = halpack::compress::decode_all(data);

    // Decoding from inside an image, and listing records, must not panic either.
    if data.len() >= 2 {
        let start = usize::from(data[0]) % data.len();
        let _ = decode_at(SliceSource::new(data), Some(start));
        for record in RecordReader::new(SliceSource::new(data), start) {
            if record.is_err() {
                break;
            }
        }
    }
});

use criterion::{BenchmarkId, Criterion, Throughput, black_box, criterion_group, criterion_main};
use halpack::compress::{CompressOptions, decode_all, encode_all};
use halpack::search::{MatchEngine, config};

fn gen_data(size: usize, seed: u64) -> Vec<u8> {
    let mut s = seed;
    let mut out = Vec::with_capacity(size);
    for _ in 0..size {
        s = s.wrapping_mul(6364136223846793005).wrapping_add(1);
        out.push((s >> 33) as u8);
    }
    out
}

/// Tile-like data: runs, counters and repeated blocks with some noise.
fn gen_asset(size: usize, seed: u64) -> Vec<u8> {
    let noise = gen_data(size, seed);
    let mut out = Vec::with_capacity(size);
    let mut i = 0;
    while out.len() < size {
        match noise[i % noise.len()] % 4 {
            0 => out.extend(std::iter::repeat_n(noise[(i + 1) % noise.len()], 12)),
            1 => out.extend((0..16u8).map(|k| k.wrapping_add(noise[i % noise.len()]))),
            2 if out.len() > 64 => {
                let start = out.len() - 64;
                out.extend_from_within(start..start + 24);
            }
            _ => out.extend_from_slice(&noise[i % noise.len()..(i + 8).min(noise.len())]),
        }
        i += 1;
    }
    out.truncate(size);
    out
}

fn opts(fast: bool, parallel: bool) -> CompressOptions {
    CompressOptions { fast, parallel }
}

fn bench_encoding_speed(c: &mut Criterion) {
    let mut g = c.benchmark_group("encoding_speed");
    g.sample_size(10);
    for size in [4 * 1024usize, 16 * 1024, 64 * 1024 - 1] {
        let data = gen_asset(size, 1);
        g.throughput(Throughput::Bytes(size as u64));
        for (name, o) in [
            ("thorough", opts(false, true)),
            ("fast", opts(true, true)),
            ("single_thread", opts(false, false)),
        ] {
            g.bench_with_input(BenchmarkId::new(name, size), &size, |b, _| {
                b.iter(|| black_box(encode_all(black_box(&data), o).unwrap()));
            });
        }
    }
    g.finish();
}

fn bench_decoding_speed(c: &mut Criterion) {
    let mut g = c.benchmark_group("decoding_speed");
    for size in [4 * 1024usize, 16 * 1024, 64 * 1024 - 1] {
        let data = gen_asset(size, 2);
        let stream = encode_all(&data, CompressOptions::default()).unwrap();
        g.throughput(Throughput::Bytes(size as u64));
        g.bench_with_input(BenchmarkId::from_parameter(size), &size, |b, _| {
            b.iter(|| black_box(decode_all(black_box(&stream)).unwrap()));
        });
    }
    g.finish();
}

fn bench_candidate_search(c: &mut Criterion) {
    let mut g = c.benchmark_group("candidate_search_at_end");
    for size in [4 * 1024usize, 32 * 1024, 64 * 1024 - 1] {
        let data = gen_data(size, 3);
        let pos = size - 16;
        for (name, parallel) in [("sequential", false), ("parallel", true)] {
            let engine = MatchEngine::new(&data, config::THOROUGH).with_parallel(parallel);
            g.bench_with_input(BenchmarkId::new(name, size), &pos, |b, &pos| {
                b.iter(|| black_box(engine.candidates(black_box(pos))));
            });
        }
    }
    g.finish();
}

criterion_group!(
    benches,
    bench_encoding_speed,
    bench_decoding_speed,
    bench_candidate_search
);
criterion_main!(benches);

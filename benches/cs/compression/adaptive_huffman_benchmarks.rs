use adaptive_huffman::{compress, decompress};
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use rand::{Rng, SeedableRng};

fn inputs() -> Vec<(&'static str, Vec<u8>)> {
    let mut rng = rand::rngs::StdRng::seed_from_u64(1);
    let text = b"the quick brown fox jumps over the lazy dog. "
        .iter()
        .cycle()
        .take(64 * 1024)
        .copied()
        .collect();
    let random = (0..64 * 1024).map(|_| rng.gen()).collect();
    let skewed = (0..64 * 1024)
        .map(|_| {
            if rng.gen_bool(0.9) {
                rng.gen_range(0..4u8)
            } else {
                rng.gen()
            }
        })
        .collect();
    vec![("text", text), ("random", random), ("skewed", skewed)]
}

fn bench_compress(c: &mut Criterion) {
    let mut group = c.benchmark_group("adaptive_huffman_compress");
    for (name, data) in inputs() {
        group.throughput(Throughput::Bytes(data.len() as u64));
        group.bench_with_input(BenchmarkId::from_parameter(name), &data, |b, data| {
            b.iter(|| compress(black_box(data)).unwrap())
        });
    }
    group.finish();
}

fn bench_decompress(c: &mut Criterion) {
    let mut group = c.benchmark_group("adaptive_huffman_decompress");
    for (name, data) in inputs() {
        let packed = compress(&data).unwrap();
        group.throughput(Throughput::Bytes(data.len() as u64));
        group.bench_with_input(BenchmarkId::from_parameter(name), &packed, |b, packed| {
            b.iter(|| decompress(black_box(packed)).unwrap())
        });
    }
    group.finish();
}

criterion_group!(benches, bench_compress, bench_decompress);
criterion_main!(benches);

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use protoforge::leb128::LebCodec;
use protoforge::Reader;

fn varint_encoding(c: &mut Criterion) {
    let values: Vec<u64> = vec![1, 300, 1 << 28, u64::MAX];

    let mut group = c.benchmark_group("encoding_varint");
    for value in &values {
        group.bench_with_input(BenchmarkId::from_parameter(value), value, |b, value| {
            let mut buffer = [0u8; 16];
            b.iter(|| {
                let len = value.encode_leb128(&mut buffer.as_mut_slice());
                std::hint::black_box(len)
            })
        });
    }
}

fn varint_decoding(c: &mut Criterion) {
    let encoded: Vec<Vec<u8>> = [1u64, 300, 1 << 28, u64::MAX]
        .into_iter()
        .map(|value| {
            let mut buffer = Vec::new();
            value.encode_leb128(&mut buffer);
            buffer
        })
        .collect();

    let mut group = c.benchmark_group("decoding_varint");
    for buffer in &encoded {
        group.bench_with_input(
            BenchmarkId::from_parameter(buffer.len()),
            buffer,
            |b, buffer| {
                b.iter(|| {
                    let mut reader = Reader::new(buffer);
                    std::hint::black_box(reader.read_varint()).unwrap()
                })
            },
        );
    }
}

criterion_group!(varint, varint_encoding, varint_decoding);

criterion_main!(varint);

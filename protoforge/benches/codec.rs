//! Encode/decode throughput for packed and unpacked repeated fields.

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use protoforge::codec::{decode_repeated, encode_packed, encode_repeated};
use protoforge::{kind, Reader};

fn decode_all(buf: &[u8], values: &mut Vec<i64>) {
    let mut reader = Reader::new(buf);
    while !reader.is_empty() {
        let key = reader.read_key().unwrap();
        decode_repeated::<kind::Sint64>(key.wire_type(), &mut reader, values).unwrap();
    }
}

fn repeated_sint64(c: &mut Criterion) {
    let values: Vec<i64> = (-500..500).map(|v| v * 7919).collect();

    let mut packed = Vec::new();
    encode_packed::<kind::Sint64, _>(1, &values, &mut packed);
    let mut unpacked = Vec::new();
    encode_repeated::<kind::Sint64, _>(1, &values, &mut unpacked);

    let mut group = c.benchmark_group("repeated_sint64");
    group.throughput(Throughput::Elements(values.len() as u64));

    group.bench_function("encode_packed", |b| {
        let mut buf = Vec::with_capacity(packed.len());
        b.iter(|| {
            buf.clear();
            encode_packed::<kind::Sint64, _>(1, &values, &mut buf);
            std::hint::black_box(buf.len())
        })
    });

    for (name, buf) in [("packed", &packed), ("unpacked", &unpacked)] {
        group.bench_with_input(BenchmarkId::new("decode", name), buf, |b, buf| {
            let mut out = Vec::with_capacity(values.len());
            b.iter(|| {
                out.clear();
                decode_all(buf, &mut out);
                std::hint::black_box(out.len())
            })
        });
    }
}

criterion_group!(codec, repeated_sint64);

criterion_main!(codec);

use bytes::Bytes;
use criterion::{black_box, criterion_group, criterion_main, Criterion};
use netpromise::buffer::GrowableBuffer;
use netpromise::stream::ChunkAccumulator;

/// Benchmark chunk buffering, replay, and buffer growth.
fn benchmark_accumulator_operations(c: &mut Criterion) {
    let chunk = Bytes::from(vec![0u8; 1024]);

    c.bench_function("accumulator_replay_64_chunks", |b| {
        b.iter(|| {
            let acc = ChunkAccumulator::new();
            for _ in 0..64 {
                acc.deliver(chunk.clone()).unwrap();
            }
            acc.attach(|c: Bytes| {
                black_box(c.len());
                true
            })
            .unwrap();
        })
    });

    c.bench_function("accumulator_direct_64_chunks", |b| {
        b.iter(|| {
            let acc = ChunkAccumulator::new();
            acc.attach(|c: Bytes| {
                black_box(c.len());
                true
            })
            .unwrap();
            for _ in 0..64 {
                acc.deliver(chunk.clone()).unwrap();
            }
        })
    });

    c.bench_function("growable_buffer_64k", |b| {
        b.iter(|| {
            let mut buffer = GrowableBuffer::default();
            for _ in 0..64 {
                buffer.append(&chunk).unwrap();
            }
            black_box(buffer.len())
        })
    });
}

criterion_group!(benches, benchmark_accumulator_operations);
criterion_main!(benches);

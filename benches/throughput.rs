//! Throughput benchmarks

use criterion::{black_box, criterion_group, criterion_main, Criterion, Throughput};
use navspark_core::{encode_frame, FrameDecoder, Link, LinkConfig, Reassembler, Registry};
use std::sync::Arc;
use std::time::Instant;
use tokio::io::AsyncWriteExt;
use tokio::runtime::Runtime;
use tokio::sync::Mutex;

/// One second of binary output: a MeasurementTime and a 15 satellite RawMeasurements
fn epoch() -> Vec<u8> {
    let measurement_time = hex::decode("DC3D06ED0B0CBC4003E8").unwrap();

    let mut raw = vec![0xDD, 0x3D, 15];
    for svid in 1..=15u8 {
        raw.extend_from_slice(&[svid, 0x2B]);
        raw.extend_from_slice(&2.1e7f64.to_be_bytes());
        raw.extend_from_slice(&(-3.8e4f64).to_be_bytes());
        raw.extend_from_slice(&642.0f32.to_be_bytes());
        raw.push(0x07);
    }

    let mut stream = encode_frame(&measurement_time).unwrap().to_vec();
    stream.extend_from_slice(&encode_frame(&raw).unwrap());
    stream
}

fn framing_benchmark(c: &mut Criterion) {
    let data: Vec<u8> = epoch().repeat(64);

    let mut group = c.benchmark_group("framing");
    group.throughput(Throughput::Bytes(data.len() as u64));

    group.bench_function("decode_whole", |b| {
        b.iter(|| {
            let mut decoder = FrameDecoder::new();
            black_box(decoder.push(black_box(&data)))
        })
    });

    group.bench_function("decode_64_byte_chunks", |b| {
        b.iter(|| {
            let mut decoder = FrameDecoder::new();
            let mut frames = 0;
            for chunk in data.chunks(64) {
                frames += decoder.push(black_box(chunk)).len();
            }
            black_box(frames)
        })
    });

    group.finish();
}

fn reassembly_benchmark(c: &mut Criterion) {
    let registry = Registry::global().unwrap();
    let data = epoch();

    let mut group = c.benchmark_group("reassembly");
    group.throughput(Throughput::Bytes(data.len() as u64));

    group.bench_function("feed_epoch", |b| {
        let (mut reassembler, mut rx, _acks) = Reassembler::channel(registry, 16, 8192);
        b.iter(|| {
            reassembler.feed(black_box(&data));
            while let Ok(message) = rx.try_recv() {
                black_box(message);
            }
        })
    });

    group.finish();
}

fn link_benchmark(c: &mut Criterion) {
    let rt = Runtime::new().unwrap();
    let data = epoch();

    // The link lives across iterations; each one pushes an epoch through the
    // reader task and waits for both messages.
    let (link, receiver, messages) = rt.block_on(async {
        let (host, receiver) = tokio::io::duplex(64 * 1024);
        let (link, messages) = Link::spawn(host, &LinkConfig::default()).unwrap();
        (link, receiver, messages)
    });
    let ends = Arc::new(Mutex::new((receiver, messages)));

    let mut group = c.benchmark_group("link");
    group.throughput(Throughput::Bytes(data.len() as u64));

    group.bench_function("epoch_round_trip", |b| {
        b.to_async(&rt).iter_custom(|iters| {
            let ends = Arc::clone(&ends);
            let data = data.clone();
            async move {
                let mut ends = ends.lock().await;
                let (receiver, messages) = &mut *ends;
                let start = Instant::now();
                for _ in 0..iters {
                    receiver.write_all(&data).await.unwrap();
                    black_box(messages.recv().await.unwrap());
                    black_box(messages.recv().await.unwrap());
                }
                start.elapsed()
            }
        })
    });

    group.finish();
    drop(link);
}

criterion_group!(benches, framing_benchmark, reassembly_benchmark, link_benchmark);
criterion_main!(benches);

use criterion::{black_box, criterion_group, criterion_main, Criterion, Throughput};
use codec::{Decoder, Encoder, Measurement};
use simbench::{generate, ScenarioConfig};

fn feed(frames: u32) -> Vec<Measurement> {
    generate(&ScenarioConfig {
        points: 64,
        frames,
        seed: 7,
        burst_every: Some(50),
        ..ScenarioConfig::default()
    })
}

fn encode(encoder: &mut Encoder, feed: &[Measurement], buf: &mut [u8]) -> usize {
    let len = buf.len();
    let mut block = encoder.begin_block(buf, 0, len).unwrap();
    for measurement in feed {
        assert!(block.try_add_measurement(measurement).unwrap());
    }
    block.finish().unwrap()
}

fn bench_encode(c: &mut Criterion) {
    let mut group = c.benchmark_group("encode");
    for frames in [10u32, 100, 1000] {
        let feed = feed(frames);
        let mut buf = vec![0u8; feed.len() * 24 + 128];
        group.throughput(Throughput::Elements(feed.len() as u64));
        group.bench_function(format!("{}_measurements", feed.len()), |b| {
            b.iter(|| {
                let mut encoder = Encoder::new();
                black_box(encode(&mut encoder, black_box(&feed), &mut buf))
            })
        });
    }
    group.finish();
}

fn bench_decode(c: &mut Criterion) {
    let feed = feed(1000);
    let mut buf = vec![0u8; feed.len() * 24 + 128];
    let len = encode(&mut Encoder::new(), &feed, &mut buf);
    buf.truncate(len);

    let mut group = c.benchmark_group("decode");
    group.throughput(Throughput::Elements(feed.len() as u64));
    group.bench_function(format!("{}_measurements", feed.len()), |b| {
        b.iter(|| {
            let mut decoder = Decoder::new();
            let count = decoder
                .begin_block(black_box(&buf), 0, len)
                .unwrap()
                .map(Result::unwrap)
                .count();
            black_box(count)
        })
    });
    group.finish();
}

fn bench_steady_state(c: &mut Criterion) {
    // One warm encoder across blocks, the way a publisher runs.
    let feed = feed(100);
    let mut buf = vec![0u8; feed.len() * 24 + 128];
    let mut encoder = Encoder::new();
    encode(&mut encoder, &feed, &mut buf);

    let mut group = c.benchmark_group("steady_state");
    group.throughput(Throughput::Elements(feed.len() as u64));
    group.bench_function("warm_encoder", |b| {
        b.iter(|| black_box(encode(&mut encoder, black_box(&feed), &mut buf)))
    });
    group.finish();
}

criterion_group!(benches, bench_encode, bench_decode, bench_steady_state);
criterion_main!(benches);

use codec::{CodecLimits, Decoder, Encoder, Measurement, PointId};
use proptest::prelude::*;

fn measurement_strategy() -> impl Strategy<Value = (u32, i64, u32, u32)> {
    (
        prop_oneof![0u32..8, 0u32..4096],
        prop_oneof![Just(0i64), -3i64..4, Just(333_333i64), any::<i64>()],
        prop_oneof![Just(0u32), 0u32..4, any::<u32>()],
        prop_oneof![Just(0u32), 0u32..16, any::<u32>()],
    )
}

/// Builds a stream from per-step deltas so timestamps and values repeat often
/// enough to reach every code family.
fn build(steps: &[(u32, i64, u32, u32)]) -> Vec<Measurement> {
    let mut timestamp = 0i64;
    steps
        .iter()
        .map(|(id, step, quality, value)| {
            timestamp = timestamp.wrapping_add(*step);
            Measurement::new(PointId::new(*id), timestamp, *quality, f32::from_bits(*value))
        })
        .collect()
}

/// Encodes into consecutive windows of `window` bytes, returning the bytes and
/// the block boundaries.
fn encode_windows(data: &[Measurement], window: usize) -> (Vec<u8>, Vec<(usize, usize)>) {
    let mut encoder = Encoder::with_limits(CodecLimits::for_testing());
    let mut buf = vec![0u8; data.len() * 64 + window];
    let mut blocks = Vec::new();
    let mut offset = 0;
    let mut pending = data;
    loop {
        let mut block = encoder.begin_block(&mut buf, offset, window).unwrap();
        let mut taken = 0;
        while taken < pending.len() && block.try_add_measurement(&pending[taken]).unwrap() {
            taken += 1;
        }
        let end = block.finish().unwrap();
        blocks.push((offset, end - offset));
        offset = end;
        pending = &pending[taken..];
        if pending.is_empty() {
            break;
        }
    }
    buf.truncate(offset);
    (buf, blocks)
}

proptest! {
    #[test]
    fn roundtrip_across_blocks(
        steps in prop::collection::vec(measurement_strategy(), 0..300),
        window in 100usize..400,
    ) {
        let data = build(&steps);
        let (buf, blocks) = encode_windows(&data, window);

        let mut decoder = Decoder::with_limits(CodecLimits::for_testing());
        let mut decoded = Vec::new();
        for (offset, length) in blocks {
            for item in decoder.begin_block(&buf, offset, length).unwrap() {
                decoded.push(item.unwrap());
            }
        }
        prop_assert_eq!(decoded, data);
    }

    #[test]
    fn encoding_is_deterministic(
        steps in prop::collection::vec(measurement_strategy(), 0..200),
        window in 100usize..400,
    ) {
        let data = build(&steps);
        prop_assert_eq!(encode_windows(&data, window), encode_windows(&data, window));
    }

    #[test]
    fn arbitrary_bytes_never_panic(bytes in prop::collection::vec(any::<u8>(), 0..256)) {
        let mut decoder = Decoder::with_limits(CodecLimits::for_testing());
        for item in decoder.begin_block(&bytes, 0, bytes.len()).unwrap() {
            if item.is_err() {
                break;
            }
        }
    }
}

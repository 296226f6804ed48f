#![no_main]

use codec::{CodecLimits, Decoder, Encoder, Measurement, PointId};
use libfuzzer_sys::fuzz_target;

fn read_u32(chunk: &[u8]) -> u32 {
    u32::from_le_bytes([chunk[0], chunk[1], chunk[2], chunk[3]])
}

fuzz_target!(|data: &[u8]| {
    let limits = CodecLimits::for_testing();
    let max_points = limits.max_points as u32;
    let measurements: Vec<Measurement> = data
        .chunks_exact(20)
        .take(256)
        .map(|chunk| {
            let mut timestamp = [0u8; 8];
            timestamp.copy_from_slice(&chunk[4..12]);
            Measurement::new(
                PointId::new(read_u32(&chunk[0..4]) % max_points),
                i64::from_le_bytes(timestamp),
                read_u32(&chunk[12..16]),
                f32::from_bits(read_u32(&chunk[16..20])),
            )
        })
        .collect();

    let mut buf = vec![0u8; measurements.len() * 64 + 128];
    let len = buf.len();
    let mut encoder = Encoder::with_limits(limits.clone());
    let mut block = encoder.begin_block(&mut buf, 0, len).unwrap();
    for measurement in &measurements {
        assert!(block.try_add_measurement(measurement).unwrap());
    }
    let end = block.finish().unwrap();

    let mut decoder = Decoder::with_limits(limits);
    let decoded: Vec<Measurement> = decoder
        .begin_block(&buf, 0, end)
        .unwrap()
        .collect::<Result<_, _>>()
        .unwrap();
    assert_eq!(decoded, measurements);
});

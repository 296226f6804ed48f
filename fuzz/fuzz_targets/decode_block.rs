#![no_main]

use codec::{CodecLimits, DecodeSession, WireLimits};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let mut session =
        DecodeSession::with_limits(WireLimits::for_testing(), CodecLimits::for_testing());
    let mut out = Vec::new();

    // Treat the input as several blocks so history carries between them.
    for block in data.split(|byte| *byte == 0xFF).take(16) {
        let before = out.len();
        if session.decode_block(block, &mut out).is_err() {
            assert_eq!(out.len(), before);
        }
    }
});

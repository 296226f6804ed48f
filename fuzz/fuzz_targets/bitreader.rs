#![no_main]

use bitstream::BitReader;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let mut reader = BitReader::new(data);
    let mut idx = 0usize;

    // Input bytes pick a bounded sequence of operations.
    while idx < data.len() && idx < 1024 {
        let op = data[idx];
        idx += 1;

        match op % 7 {
            0 => {
                let _ = reader.read_bit();
            }
            1 => {
                let _ = reader.read_bits(op % 40);
            }
            2 => reader.clear_cache(),
            3 => {
                let _ = reader.read_u8();
            }
            4 => {
                let _ = reader.read_le(usize::from(op % 6));
            }
            5 => {
                let _ = reader.read_varu32();
            }
            _ => {
                let _ = reader.read_varu64();
            }
        }
    }
});

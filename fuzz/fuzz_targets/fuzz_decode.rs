#![no_main]

use libfuzzer_sys::fuzz_target;
use lz4k::decode;

fuzz_target!(|data: &[u8]| {
    // First byte picks the output capacity, the rest is the block
    let Some((&cap, block)) = data.split_first() else {
        return;
    };
    let mut out = vec![0u8; (cap as usize) << 8];
    if let Ok(n) = decode(block, &mut out) {
        assert!(n <= out.len());
    }
});

#![no_main]

use libfuzzer_sys::fuzz_target;
use lz4k::{decode, encode, max_encoded_len, EncodeState, Error};

fuzz_target!(|data: &[u8]| {
    let Ok(bound) = max_encoded_len(data.len()) else {
        return;
    };

    let mut state = EncodeState::new();
    let mut compressed = vec![0u8; bound];
    let n = match encode(&mut state, data, &mut compressed, 0) {
        Ok(n) => n,
        Err(Error::Incompressible) => return,
        Err(e) => panic!("encode failed: {}", e),
    };

    let mut out = vec![0u8; data.len()];
    assert_eq!(decode(&compressed[..n], &mut out), Ok(data.len()));
    assert_eq!(data, &out[..], "roundtrip failed");

    // a tight output buffer must fail cleanly or produce the same block
    let mut tight = vec![0u8; data.len()];
    if let Ok(m) = encode(&mut state, data, &mut tight, 0) {
        assert_eq!(&tight[..m], &compressed[..n]);
    }
});

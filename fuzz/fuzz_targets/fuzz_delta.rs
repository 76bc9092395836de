#![no_main]

use libfuzzer_sys::fuzz_target;
use lz4k::{decode_delta, encode_delta, update_delta_state, EncodeState};

fuzz_target!(|data: &[u8]| {
    // First two bytes choose where the dictionary ends
    if data.len() < 3 || data.len() > 65540 {
        return;
    }
    let window = &data[2..];
    let start = u16::from_le_bytes([data[0], data[1]]) as usize % window.len();

    let mut state = EncodeState::new();
    if update_delta_state(&mut state, &window[..start], 0).is_err() {
        return;
    }

    let mut dst = vec![0u8; (window.len() - start) * 2 + 64];
    let Ok(n) = encode_delta(&mut state, window, start, &mut dst) else {
        return;
    };

    let mut out = window[..start].to_vec();
    out.resize(window.len(), 0);
    assert_eq!(decode_delta(&dst[..n], &mut out, start), Ok(window.len() - start));
    assert_eq!(&out[..], window);
});

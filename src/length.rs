// Copyright 2024 Karpeles Lab Inc.
// Based on the LZ4K compression format by Huawei Technologies
// Use of this source code is governed by a BSD-style
// license that can be found in the LICENSE file.

//! Escape-length chains.
//!
//! When a tag field holds its maximum value the true length continues in
//! trailing bytes: every `0xff` adds 255 and the chain ends with the first
//! byte below 255, which is added as well.

use crate::constants::BYTE_MAX;
use crate::error::{Error, Result};

/// Decode a length chain from the beginning of the slice.
/// Returns (value, bytes_read)
pub fn read_length(src: &[u8]) -> Result<(usize, usize)> {
    let mut value = 0usize;

    for (i, &byte) in src.iter().enumerate() {
        value += byte as usize;
        if (byte as usize) < BYTE_MAX {
            return Ok((value, i + 1));
        }
    }

    Err(Error::ReadError)
}

/// Encode a length chain into the buffer at `at`.
/// Returns the position just past the chain.
pub fn write_length(dst: &mut [u8], mut at: usize, mut value: usize) -> usize {
    while value >= BYTE_MAX {
        dst[at] = BYTE_MAX as u8;
        value -= BYTE_MAX;
        at += 1;
    }

    dst[at] = value as u8;
    at + 1
}

/// Returns the number of bytes needed to encode this value as a length chain
#[inline]
pub fn length_size(value: usize) -> usize {
    value / BYTE_MAX + 1
}

// Copyright 2024 Karpeles Lab Inc.
// Based on the LZ4K compression format by Huawei Technologies
// Use of this source code is governed by a BSD-style
// license that can be found in the LICENSE file.

/// Load a u32 from the slice at the given offset
#[inline(always)]
pub fn load32(data: &[u8], offset: usize) -> u32 {
    u32::from_le_bytes([
        data[offset],
        data[offset + 1],
        data[offset + 2],
        data[offset + 3],
    ])
}

/// Load a u64 from the slice at the given offset
#[inline(always)]
pub fn load64(data: &[u8], offset: usize) -> u64 {
    u64::from_le_bytes([
        data[offset],
        data[offset + 1],
        data[offset + 2],
        data[offset + 3],
        data[offset + 4],
        data[offset + 5],
        data[offset + 6],
        data[offset + 7],
    ])
}

/// True if the four bytes at `a` and `b` are equal
#[inline(always)]
pub fn equal4(data: &[u8], a: usize, b: usize) -> bool {
    load32(data, a) == load32(data, b)
}

/// Hash function for the low 6 bytes of `u`
#[inline(always)]
pub fn hash6(u: u64, bits: u32) -> usize {
    const PRIME_6_BYTES: u64 = 227718039650203;
    ((u << 16).wrapping_mul(PRIME_6_BYTES) >> (64 - bits)) as usize
}

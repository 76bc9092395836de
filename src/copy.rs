// Copyright 2024 Karpeles Lab Inc.
// Based on the LZ4K compression format by Huawei Technologies
// Use of this source code is governed by a BSD-style
// license that can be found in the LICENSE file.

//! Fixed-stride copy helpers.
//!
//! These copy whole quanta of `Q` bytes and may write up to `Q - 1` (or
//! `2Q - 1` for the paired variant) bytes past the requested end. Callers must
//! have verified that much headroom in the destination; the stray bytes are
//! overwritten by later records or lie beyond the decoded length.

/// Copy `total` bytes from `src[s..]` to `dst[d..]` in strides of `Q`,
/// rounding the amount up to a whole number of strides (at least one).
#[inline(always)]
pub fn copy_strided<const Q: usize>(dst: &mut [u8], d: usize, src: &[u8], s: usize, total: usize) {
    let mut k = 0;
    loop {
        dst[d + k..d + k + Q].copy_from_slice(&src[s + k..s + k + Q]);
        k += Q;
        if k >= total {
            break;
        }
    }
}

/// Within one buffer, copy `Q`-byte strides from `from` to `at` while `at`
/// is below `end`.
///
/// Requires `at - from >= Q` so every stride reads bytes that are already final.
#[inline(always)]
pub fn copy_while_lt<const Q: usize>(buf: &mut [u8], mut from: usize, mut at: usize, end: usize) {
    while at < end {
        buf.copy_within(from..from + Q, at);
        at += Q;
        from += Q;
    }
}

/// Like [`copy_while_lt`] but moves two strides per iteration.
#[inline(always)]
pub fn copy_pairs_while_lt<const Q: usize>(buf: &mut [u8], mut from: usize, mut at: usize, end: usize) {
    while at < end {
        buf.copy_within(from..from + Q, at);
        buf.copy_within(from + Q..from + 2 * Q, at + Q);
        at += 2 * Q;
        from += 2 * Q;
    }
}

/// Replicate the `offset`-periodic pattern ending at `at` up to `end`, for
/// `1 < offset < Q / 2`.
///
/// The pattern is first grown with half-quantum copies, doubling the stride
/// while it is short, until the distance from `from` reaches `Q`. The rest
/// is filled with paired full-quantum copies at that distance, which is a
/// multiple of `offset` and therefore reproduces the same pattern.
///
/// Requires `end + 2 * Q - 1 <= buf.len()`.
#[inline]
pub fn replicate_short<const Q: usize>(buf: &mut [u8], offset: usize, mut at: usize, end: usize) {
    let half = Q >> 1;
    let quarter = half >> 1;
    let from = at - offset;
    let mut step = offset;

    loop {
        buf.copy_within(from..from + half, at);
        at += step;
        if step <= quarter {
            step <<= 1;
        }
        if at - from >= Q {
            break;
        }
    }

    copy_pairs_while_lt::<Q>(buf, from, at, end);
}

/// Byte-exact overlapping copy of `len` bytes from `at - offset` to `at`.
/// An offset of one is a plain fill.
#[inline]
pub fn copy_overlapping(buf: &mut [u8], offset: usize, at: usize, len: usize) {
    if offset == 1 {
        let b = buf[at - 1];
        buf[at..at + len].fill(b);
    } else if offset >= len {
        buf.copy_within(at - offset..at - offset + len, at);
    } else {
        for i in at..at + len {
            buf[i] = buf[i - offset];
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Reference LZ77 copy, one byte at a time
    fn naive(buf: &mut [u8], offset: usize, at: usize, len: usize) {
        for i in at..at + len {
            buf[i] = buf[i - offset];
        }
    }

    #[test]
    fn test_copy_strided_rounds_up() {
        let src: Vec<u8> = (0..64).collect();
        let mut dst = vec![0xeeu8; 64];
        copy_strided::<16>(&mut dst, 0, &src, 0, 17);
        assert_eq!(&dst[..32], &src[..32]);
        assert_eq!(dst[32], 0xee);

        let mut dst = vec![0xeeu8; 64];
        copy_strided::<16>(&mut dst, 4, &src, 0, 1);
        assert_eq!(&dst[4..20], &src[..16]);
    }

    #[test]
    fn test_replicate_short_matches_naive() {
        for offset in 2..8 {
            for len in [4usize, 5, 9, 16, 17, 33, 100] {
                let mut expect = vec![0u8; 200];
                for (i, b) in expect.iter_mut().take(10).enumerate() {
                    *b = (i * 37 + 1) as u8;
                }
                let mut got = expect.clone();
                naive(&mut expect, offset, 10, len);
                replicate_short::<16>(&mut got, offset, 10, 10 + len);
                assert_eq!(&got[..10 + len], &expect[..10 + len], "offset {} len {}", offset, len);
            }
        }
    }

    #[test]
    fn test_strided_repeat_matches_naive() {
        for offset in [16usize, 17, 31, 32, 40] {
            let mut expect: Vec<u8> = (0..300).map(|i| (i * 7) as u8).collect();
            let mut got = expect.clone();
            naive(&mut expect, offset, 50, 100);
            copy_pairs_while_lt::<16>(&mut got, 50 - offset, 50, 150);
            assert_eq!(&got[..150], &expect[..150], "offset {}", offset);
        }
    }

    #[test]
    fn test_copy_overlapping() {
        let mut buf = *b"ab\0\0\0\0\0\0";
        copy_overlapping(&mut buf, 2, 2, 6);
        assert_eq!(&buf, b"abababab");

        let mut buf = *b"z\0\0\0\0";
        copy_overlapping(&mut buf, 1, 1, 4);
        assert_eq!(&buf, b"zzzzz");

        let mut buf = *b"abc\0\0";
        copy_overlapping(&mut buf, 3, 3, 2);
        assert_eq!(&buf, b"abcab");
    }
}

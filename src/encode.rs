// Copyright 2024 Karpeles Lab Inc.
// Based on the LZ4K compression format by Huawei Technologies
// Use of this source code is governed by a BSD-style
// license that can be found in the LICENSE file.

use crate::constants::*;
use crate::copy::copy_strided;
use crate::error::{Error, Result};
use crate::format::{encoded_bytes_max, encoded_bytes_min, write_tag, BlockClass, Layout};
use crate::hash::{equal4, hash6, load64};
use crate::length::write_length;
use crate::state::EncodeState;

/// Encoder for LZ4K compression.
///
/// Owns the hash table so repeated calls do not need to allocate, and carries
/// the soft output limit applied to every block.
pub struct Encoder {
    state: Box<EncodeState>,
    soft_limit: usize,
}

impl Encoder {
    /// Create a new encoder using the default soft limit
    pub fn new() -> Self {
        Encoder {
            state: Box::default(),
            soft_limit: 0,
        }
    }

    /// Set the soft output limit. `0` selects the default of
    /// `min(input_len, output_capacity) - gain_threshold(input_len)`.
    pub fn with_soft_limit(mut self, soft_limit: usize) -> Self {
        self.soft_limit = soft_limit;
        self
    }

    /// Configured soft limit (`0` means default)
    pub fn soft_limit(&self) -> usize {
        self.soft_limit
    }

    /// Compress `src` into `dst`. See [`encode`].
    pub fn encode(&mut self, src: &[u8], dst: &mut [u8]) -> Result<usize> {
        encode(&mut self.state, src, dst, self.soft_limit)
    }

    /// Compress `src` into a newly allocated buffer.
    ///
    /// Returns [`Error::Incompressible`] when the block is not worth storing
    /// compressed.
    pub fn encode_to_vec(&mut self, src: &[u8]) -> Result<Vec<u8>> {
        let mut dst = vec![0u8; max_encoded_len(src.len())?];
        let n = self.encode(src, &mut dst)?;
        dst.truncate(n);
        Ok(dst)
    }
}

impl Default for Encoder {
    fn default() -> Self {
        Self::new()
    }
}

/// Inputs of at most this many bytes are never compressed
#[inline]
pub fn gain_threshold(src_len: usize) -> usize {
    GAIN_MIN.max(src_len >> 6)
}

/// Returns the output capacity, header included, that lets an input of
/// `src_len` bytes be encoded without any bounds checks.
pub fn max_encoded_len(src_len: usize) -> Result<usize> {
    let class = BlockClass::for_input_len(src_len).ok_or(Error::Failed)?;
    Ok(1 + encoded_bytes_max(class.nr_log2(), src_len))
}

/// Encode compresses `src` into `dst` and returns the size of the block,
/// including its one-byte header.
///
/// The hash table in `state` is cleared first. `soft_limit` is a best-effort
/// bound on the output size: when the encoder notices the block will not fit
/// it gives up with [`Error::Incompressible`], but it may also finish a block
/// that ends up slightly larger. A value of `0`, or anything at or above
/// `min(src.len(), dst.len())`, selects the default.
///
/// Errors:
/// * [`Error::Incompressible`] if `src` is not larger than the gain threshold
///   or the soft limit was hit.
/// * [`Error::Failed`] if `dst` is not larger than the gain threshold or `src`
///   exceeds the largest block class.
/// * [`Error::WriteError`] if `dst` is too small for the compressed block.
pub fn encode(state: &mut EncodeState, src: &[u8], dst: &mut [u8], soft_limit: usize) -> Result<usize> {
    let gain = gain_threshold(src.len());
    if src.len() <= gain {
        return Err(Error::Incompressible);
    }
    if dst.len() <= gain {
        log::debug!("lz4k encode: output capacity {} below gain threshold {}", dst.len(), gain);
        return Err(Error::Failed);
    }

    let class = match BlockClass::for_input_len(src.len()) {
        Some(class) => class,
        None => {
            log::debug!("lz4k encode: input of {} bytes exceeds the largest block", src.len());
            return Err(Error::Failed);
        }
    };

    let limit_min = src.len().min(dst.len());
    let soft_limit = if soft_limit == 0 || soft_limit >= limit_min {
        limit_min - gain
    } else {
        soft_limit
    };

    state.reset();
    dst[0] = class.header();
    let n = encode_block(state, src, 0, &mut dst[1..], soft_limit.saturating_sub(1), class)?;
    Ok(n + 1)
}

/// Compress `window[start..]`, letting back-references reach into
/// `window[..start]`.
///
/// The preceding part of the window must already have been fed through
/// [`update_delta_state`] with the same `state`, unless `start` is zero, in
/// which case the table is cleared and this behaves like a plain block
/// encode. The block class is chosen from the whole window length so every
/// offset fits the tag.
pub fn encode_delta(state: &mut EncodeState, window: &[u8], start: usize, dst: &mut [u8]) -> Result<usize> {
    if start >= window.len() || dst.len() < 2 {
        log::debug!(
            "lz4k encode_delta: bad arguments (start {}, window {}, capacity {})",
            start,
            window.len(),
            dst.len()
        );
        return Err(Error::Failed);
    }
    let class = BlockClass::for_input_len(window.len()).ok_or(Error::Failed)?;

    if start == 0 {
        state.reset();
    }
    dst[0] = class.header();
    let limit = dst.len() - 1;
    let n = encode_block(state, window, start, &mut dst[1..], limit, class)?;
    Ok(n + 1)
}

/// Record the positions of `window[start..]` in the hash table without
/// producing any output.
///
/// Used to prime the table with a dictionary before [`encode_delta`]. The
/// table is cleared first when `start` is zero.
pub fn update_delta_state(state: &mut EncodeState, window: &[u8], start: usize) -> Result<()> {
    if start > window.len() || BlockClass::for_input_len(window.len()).is_none() {
        log::debug!("lz4k update_delta_state: bad window (start {}, len {})", start, window.len());
        return Err(Error::Failed);
    }
    if start == 0 {
        state.reset();
    }
    scan(state, window, start, &mut Discard)
}

/// Picks the output policy for one block and runs the match finder.
/// Returns the number of bytes written after the header.
fn encode_block(
    state: &mut EncodeState,
    window: &[u8],
    start: usize,
    out: &mut [u8],
    out_limit: usize,
    class: BlockClass,
) -> Result<usize> {
    let layout = class.layout();
    let src_len = window.len() - start;

    if encoded_bytes_max(layout.nr_log2, src_len) > out.len() {
        log::trace!("lz4k encode: {:?} block of {} bytes, checked output", class, src_len);
        let mut sink = Checked { dst: out, pos: 0, layout };
        scan(state, window, start, &mut sink)?;
        Ok(sink.pos)
    } else {
        log::trace!(
            "lz4k encode: {:?} block of {} bytes, unchecked output, limit {}",
            class,
            src_len,
            out_limit
        );
        let limit = out_limit.min(out.len());
        let mut sink = Fast { dst: out, pos: 0, limit, layout };
        scan(state, window, start, &mut sink)?;
        Ok(sink.pos)
    }
}

/// Destination for the records found by [`scan`]
trait Sink {
    /// Emit `src[nr0..nr0 + nr_bytes]` as literals followed by a repeat of
    /// `r_bytes` at distance `offset`.
    fn record(&mut self, src: &[u8], nr0: usize, nr_bytes: usize, r_bytes: usize, offset: usize) -> Result<()>;

    /// Emit `src[nr0..]` as the final literal record
    fn tail(&mut self, src: &[u8], nr0: usize) -> Result<()>;
}

/// Write the tag and the literal-length escape. Returns the literal position.
#[inline(always)]
fn put_head(dst: &mut [u8], at: usize, layout: &Layout, nr_bytes: usize, r_bytes: usize, offset: usize) -> usize {
    write_tag(dst, at, layout.tag(nr_bytes, r_bytes, offset));
    let at = at + TAG_BYTES;
    if nr_bytes >= layout.nr_mask() {
        write_length(dst, at, nr_bytes - layout.nr_mask())
    } else {
        at
    }
}

/// Write the repeat-length escape, if the repeat needs one
#[inline(always)]
fn put_r_escape(dst: &mut [u8], at: usize, layout: &Layout, r_bytes: usize) -> usize {
    if r_bytes - REPEAT_MIN >= layout.r_mask() {
        write_length(dst, at, r_bytes - REPEAT_MIN - layout.r_mask())
    } else {
        at
    }
}

/// Checks every record against the output capacity
struct Checked<'a> {
    dst: &'a mut [u8],
    pos: usize,
    layout: Layout,
}

impl Sink for Checked<'_> {
    fn record(&mut self, src: &[u8], nr0: usize, nr_bytes: usize, r_bytes: usize, offset: usize) -> Result<()> {
        let need = TAG_BYTES
            + self.layout.nr_escape_size(nr_bytes)
            + nr_bytes
            + self.layout.r_escape_size(r_bytes);
        if need > self.dst.len() - self.pos {
            log::debug!("lz4k encode: output exhausted at {} of {}", self.pos, self.dst.len());
            return Err(Error::WriteError);
        }

        let at = put_head(self.dst, self.pos, &self.layout, nr_bytes, r_bytes, offset);
        self.dst[at..at + nr_bytes].copy_from_slice(&src[nr0..nr0 + nr_bytes]);
        self.pos = put_r_escape(self.dst, at + nr_bytes, &self.layout, r_bytes);
        Ok(())
    }

    fn tail(&mut self, src: &[u8], nr0: usize) -> Result<()> {
        let nr_bytes = src.len() - nr0;
        if encoded_bytes_min(self.layout.nr_log2, nr_bytes) > self.dst.len() - self.pos {
            log::debug!("lz4k encode: no room for final {} literals", nr_bytes);
            return Err(Error::WriteError);
        }
        let at = put_head(self.dst, self.pos, &self.layout, nr_bytes, REPEAT_MIN, 0);
        self.dst[at..at + nr_bytes].copy_from_slice(&src[nr0..]);
        self.pos = at + nr_bytes;
        Ok(())
    }
}

/// Used when the output can hold the worst case. Literals are copied in
/// whole strides and only the final record is checked, against the soft
/// limit.
struct Fast<'a> {
    dst: &'a mut [u8],
    pos: usize,
    limit: usize,
    layout: Layout,
}

impl Sink for Fast<'_> {
    #[inline(always)]
    fn record(&mut self, src: &[u8], nr0: usize, nr_bytes: usize, r_bytes: usize, offset: usize) -> Result<()> {
        let at = put_head(self.dst, self.pos, &self.layout, nr_bytes, r_bytes, offset);
        if nr_bytes > 0 {
            // literals always end at least NR_COPY_MIN bytes before the input end
            copy_strided::<NR_COPY_MIN>(self.dst, at, src, nr0, nr_bytes);
        }
        self.pos = put_r_escape(self.dst, at + nr_bytes, &self.layout, r_bytes);
        Ok(())
    }

    fn tail(&mut self, src: &[u8], nr0: usize) -> Result<()> {
        let nr_bytes = src.len() - nr0;
        if encoded_bytes_min(self.layout.nr_log2, nr_bytes) > self.limit.saturating_sub(self.pos) {
            log::debug!("lz4k encode: soft limit {} reached at {}", self.limit, self.pos);
            return Err(Error::Incompressible);
        }
        let at = put_head(self.dst, self.pos, &self.layout, nr_bytes, REPEAT_MIN, 0);
        self.dst[at..at + nr_bytes].copy_from_slice(&src[nr0..]);
        self.pos = at + nr_bytes;
        Ok(())
    }
}

/// Drops all output; only the hash table is updated
struct Discard;

impl Sink for Discard {
    #[inline(always)]
    fn record(&mut self, _: &[u8], _: usize, _: usize, _: usize, _: usize) -> Result<()> {
        Ok(())
    }

    #[inline(always)]
    fn tail(&mut self, _: &[u8], _: usize) -> Result<()> {
        Ok(())
    }
}

/// The match finder.
///
/// Hashes six bytes at each probe position and checks the previous position
/// with the same hash for a four-byte match. Misses accelerate the probe
/// step; a match is extended both ways, emitted, and resets the step.
fn scan<S: Sink>(state: &mut EncodeState, window: &[u8], start: usize, sink: &mut S) -> Result<()> {
    let in_end = window.len();
    let in_end_safe = in_end.saturating_sub(NR_COPY_MIN);
    let mut nr0 = start;
    let mut r = start + 1;
    let mut step = 1usize << STEP_LOG2;

    if r > in_end_safe {
        return sink.tail(window, nr0);
    }

    loop {
        let q = state.replace(hash6(load64(window, r), HT_LOG2), r);
        if !(q < r && equal4(window, q, r)) {
            step += 1;
            r += step >> STEP_LOG2;
            if r > in_end_safe {
                return sink.tail(window, nr0);
            }
            continue;
        }

        let offset = r - q;
        let r_end = repeat_end(window, q, r, in_end_safe);
        let r_start = repeat_start(window, q, r, nr0);
        sink.record(window, nr0, r_start - nr0, r_end - r_start, offset)?;

        r = r_end;
        nr0 = r_end;
        if r > in_end_safe {
            return if r == in_end {
                Ok(())
            } else {
                sink.tail(window, nr0)
            };
        }
        state.set(hash6(load64(window, r - 2), HT_LOG2), r - 2);
        step = 1 << STEP_LOG2;
    }
}

/// Extend a four-byte match at `q`/`r` forward. Returns the end of the
/// repeat in `r`'s frame.
///
/// Requires `r <= in_end_safe`.
#[inline]
fn repeat_end(w: &[u8], mut q: usize, mut r: usize, in_end_safe: usize) -> usize {
    q += REPEAT_MIN;
    r += REPEAT_MIN;
    loop {
        let x = load64(w, q) ^ load64(w, r);
        if x != 0 {
            return r + (x.trailing_zeros() >> 3) as usize;
        }
        q += 8;
        r += 8;
        if r > in_end_safe {
            break;
        }
    }
    while r < w.len() && w[q] == w[r] {
        q += 1;
        r += 1;
    }
    r
}

/// Extend a match backwards, never past the pending literals at `nr0`
#[inline]
fn repeat_start(w: &[u8], mut q: usize, mut r: usize, nr0: usize) -> usize {
    while r > nr0 && q > 0 && w[q - 1] == w[r - 1] {
        q -= 1;
        r -= 1;
    }
    r
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::decode::decode;

    fn noise(n: usize, seed: u32) -> Vec<u8> {
        let mut x = seed;
        (0..n)
            .map(|_| {
                x ^= x << 13;
                x ^= x >> 17;
                x ^= x << 5;
                (x >> 24) as u8
            })
            .collect()
    }

    #[test]
    fn test_gain_threshold() {
        assert_eq!(gain_threshold(0), 64);
        assert_eq!(gain_threshold(4096), 64);
        assert_eq!(gain_threshold(8192), 128);
        assert_eq!(gain_threshold(65536), 1024);
    }

    #[test]
    fn test_max_encoded_len() {
        assert_eq!(max_encoded_len(4096).unwrap(), 1 + 3 + 4096 + 16);
        assert_eq!(max_encoded_len(100).unwrap(), 1 + 3 + 112 + 1);
        assert_eq!(max_encoded_len(65541), Err(Error::Failed));
    }

    #[test]
    fn test_argument_checks() {
        let mut state = EncodeState::new();
        let mut dst = vec![0u8; 200];

        assert_eq!(encode(&mut state, &[0u8; 64], &mut dst, 0), Err(Error::Incompressible));
        assert_eq!(encode(&mut state, &[], &mut dst, 0), Err(Error::Incompressible));
        assert_eq!(encode(&mut state, &[0u8; 100], &mut dst[..64], 0), Err(Error::Failed));

        let big = vec![0u8; 65541];
        let mut dst = vec![0u8; 70000];
        assert_eq!(encode(&mut state, &big, &mut dst, 0), Err(Error::Failed));
    }

    #[test]
    fn test_zero_page_exact_bytes() {
        let src = [0u8; 4096];
        let mut dst = vec![0u8; max_encoded_len(src.len()).unwrap()];
        let n = encode(&mut EncodeState::new(), &src, &mut dst, 0).unwrap();

        // header, tag (nr=1, r=max, offset=1), one literal, 4028 in 16 escape bytes
        let mut expect = vec![0x00, 0x01, 0xf0, 0x07, 0x00];
        expect.extend_from_slice(&[0xff; 15]);
        expect.push(203);
        assert_eq!(&dst[..n], &expect[..]);
    }

    #[test]
    fn test_checked_and_fast_agree() {
        let src: Vec<u8> = (0..150)
            .flat_map(|i| format!("record {:04} value {}\n", i, i % 7).into_bytes())
            .collect();

        let mut fast = vec![0u8; max_encoded_len(src.len()).unwrap()];
        let n_fast = encode(&mut EncodeState::new(), &src, &mut fast, 0).unwrap();

        // one byte short of the bound forces checked output
        let mut checked = vec![0u8; fast.len() - 1];
        let n_checked = encode(&mut EncodeState::new(), &src, &mut checked, 0).unwrap();

        assert_eq!(&fast[..n_fast], &checked[..n_checked]);
    }

    #[test]
    fn test_checked_write_error() {
        let src = noise(4096, 1);
        let mut dst = vec![0xa5u8; 4096];
        let cap = 300;
        assert_eq!(
            encode(&mut EncodeState::new(), &src, &mut dst[..cap], 0),
            Err(Error::WriteError)
        );
        assert!(dst[cap..].iter().all(|&b| b == 0xa5));
    }

    #[test]
    fn test_soft_limit_trips() {
        let src = noise(4096, 2);
        let mut dst = vec![0u8; max_encoded_len(src.len()).unwrap()];
        assert_eq!(
            encode(&mut EncodeState::new(), &src, &mut dst, 0),
            Err(Error::Incompressible)
        );
    }

    #[test]
    fn test_encoder_reuse() {
        let mut enc = Encoder::new();
        let a = vec![7u8; 1000];
        let b: Vec<u8> = (0..2000u32).map(|i| (i % 13) as u8).collect();
        for src in [&a, &b, &a] {
            let c = enc.encode_to_vec(src).unwrap();
            let mut out = vec![0u8; src.len()];
            assert_eq!(decode(&c, &mut out).unwrap(), src.len());
            assert_eq!(&out, src);
        }
    }

    #[test]
    fn test_repeat_extension() {
        let w = b"xxabcdefabcdefabcdefgh----------------";
        let end = repeat_end(w, 2, 8, w.len() - 16);
        assert_eq!(&w[8..end], b"abcdefabcdef");
        assert_eq!(repeat_start(w, 2, 8, 0), 8);

        let w = b"zabcdzabcd";
        assert_eq!(repeat_start(w, 1, 6, 0), 5);
        assert_eq!(repeat_start(w, 1, 6, 6), 6);
    }

    #[test]
    fn test_delta_requires_new_input() {
        let mut state = EncodeState::new();
        let mut dst = [0u8; 64];
        assert_eq!(encode_delta(&mut state, b"abc", 3, &mut dst), Err(Error::Failed));
        assert!(update_delta_state(&mut state, b"abc", 3).is_ok());
        assert_eq!(update_delta_state(&mut state, b"abc", 4), Err(Error::Failed));
    }
}

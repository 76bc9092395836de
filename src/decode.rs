// Copyright 2024 Karpeles Lab Inc.
// Based on the LZ4K compression format by Huawei Technologies
// Use of this source code is governed by a BSD-style
// license that can be found in the LICENSE file.

use crate::constants::*;
use crate::copy::{copy_overlapping, copy_pairs_while_lt, copy_strided, copy_while_lt, replicate_short};
use crate::error::{Error, Result};
use crate::format::{read_tag, BlockClass, Layout};
use crate::length::read_length;

/// Decoder for LZ4K blocks
///
/// Decoding needs no state; this type only bundles the allocating helpers.
#[derive(Debug, Clone, Copy, Default)]
pub struct Decoder;

impl Decoder {
    /// Create a new decoder
    pub fn new() -> Self {
        Decoder
    }

    /// Decode `src` into `dst`. See [`decode`].
    pub fn decode(&self, src: &[u8], dst: &mut [u8]) -> Result<usize> {
        decode(src, dst)
    }

    /// Decode `src` into a newly allocated buffer sized for the largest
    /// input its block class can hold.
    pub fn decode_to_vec(&self, src: &[u8]) -> Result<Vec<u8>> {
        let class = src.first().copied().and_then(BlockClass::from_header).ok_or(Error::Failed)?;
        let mut dst = vec![0u8; class.max_input_len()];
        let n = decode(src, &mut dst)?;
        dst.truncate(n);
        Ok(dst)
    }
}

/// Decode returns the number of bytes written to `dst`.
///
/// The block class is taken from the first byte of `src`. Decoding stops at
/// the terminal record, or when the input is exhausted exactly at a record
/// boundary. On error the contents of `dst` are unspecified.
///
/// Errors:
/// * [`Error::Failed`] for bad arguments, corrupt records, back-references
///   before the start of `dst`, or if `dst` is too small.
/// * [`Error::ReadError`] if a length chain runs past the end of `src`.
pub fn decode(src: &[u8], dst: &mut [u8]) -> Result<usize> {
    if src.len() <= REPEAT_MIN || dst.is_empty() {
        log::debug!("lz4k decode: bad arguments (input {}, capacity {})", src.len(), dst.len());
        return Err(Error::Failed);
    }
    let class = header_class(src[0])?;
    log::trace!("lz4k decode: {:?} block, {} bytes", class, src.len());
    decode_block(&src[1..], dst, 0, class.layout())
}

/// Decode a block produced by [`encode_delta`](crate::encode_delta).
///
/// `window[..start]` must hold the same dictionary the encoder saw. The
/// decoded bytes are written to `window[start..]`; back-references may
/// reach anywhere in `window` before the current position. Returns the
/// number of bytes decoded.
pub fn decode_delta(src: &[u8], window: &mut [u8], start: usize) -> Result<usize> {
    if src.len() <= REPEAT_MIN || start >= window.len() {
        log::debug!(
            "lz4k decode_delta: bad arguments (input {}, start {}, window {})",
            src.len(),
            start,
            window.len()
        );
        return Err(Error::Failed);
    }
    let class = header_class(src[0])?;
    log::trace!("lz4k decode_delta: {:?} block, {} bytes after {}", class, src.len(), start);
    decode_block(&src[1..], window, start, class.layout())
}

fn header_class(b: u8) -> Result<BlockClass> {
    BlockClass::from_header(b).ok_or_else(|| {
        log::debug!("lz4k decode: invalid block class {}", b);
        Error::Failed
    })
}

/// Walk the records of one block. `base` is where output starts in `out`;
/// everything before it is history.
fn decode_block(src: &[u8], out: &mut [u8], base: usize, layout: Layout) -> Result<usize> {
    let in_end = src.len();
    let mut s = 0;
    let mut d = base;

    while s + TAG_BYTES <= in_end {
        let (mut nr_bytes, mut r_bytes, offset) = layout.untag(read_tag(src, s));
        s += TAG_BYTES;

        if nr_bytes == layout.nr_mask() {
            let (extra, n) = read_escape(&src[s..])?;
            nr_bytes = nr_bytes.saturating_add(extra);
            s += n;
        }
        copy_literals(src, &mut s, out, &mut d, nr_bytes)?;

        if r_bytes == layout.r_mask() + REPEAT_MIN {
            let (extra, n) = read_escape(&src[s..])?;
            r_bytes = r_bytes.saturating_add(extra);
            s += n;
        }

        if offset > d {
            log::debug!("lz4k decode: offset {} reaches before window start at {}", offset, d);
            return Err(Error::Failed);
        }
        if offset == 0 {
            return end_of_block(nr_bytes, r_bytes, s, in_end, d - base);
        }
        copy_repeat(out, d, offset, r_bytes)?;
        d += r_bytes;
    }

    if s == in_end {
        Ok(d - base)
    } else {
        log::debug!("lz4k decode: {} trailing bytes", in_end - s);
        Err(Error::Failed)
    }
}

fn read_escape(src: &[u8]) -> Result<(usize, usize)> {
    read_length(src).map_err(|e| {
        log::debug!("lz4k decode: length chain runs past end of input");
        e
    })
}

/// The terminal record must carry literals, an empty repeat, and be the
/// last thing in the input.
fn end_of_block(nr_bytes: usize, r_bytes: usize, s: usize, in_end: usize, n: usize) -> Result<usize> {
    if nr_bytes == 0 || r_bytes != REPEAT_MIN || s != in_end {
        log::debug!(
            "lz4k decode: malformed terminal record (nr {}, r {}, {} bytes left)",
            nr_bytes,
            r_bytes,
            in_end - s.min(in_end)
        );
        return Err(Error::Failed);
    }
    Ok(n)
}

/// Copy a literal run, using whole strides when both buffers have room past
/// the run.
#[inline(always)]
fn copy_literals(src: &[u8], s: &mut usize, out: &mut [u8], d: &mut usize, nr_bytes: usize) -> Result<()> {
    let in_copy_end = s.saturating_add(nr_bytes);
    let out_copy_end = d.saturating_add(nr_bytes);
    let exact_fits = in_copy_end <= src.len() && out_copy_end <= out.len();

    if nr_bytes <= NR_COPY_MIN {
        if *s + NR_COPY_MIN <= src.len() && *d + NR_COPY_MIN <= out.len() {
            out[*d..*d + NR_COPY_MIN].copy_from_slice(&src[*s..*s + NR_COPY_MIN]);
        } else if exact_fits {
            out[*d..out_copy_end].copy_from_slice(&src[*s..in_copy_end]);
        } else {
            return Err(literal_overrun(nr_bytes));
        }
    } else if in_copy_end.saturating_add(NR_COPY_MIN) <= src.len()
        && out_copy_end.saturating_add(NR_COPY_MIN) <= out.len()
    {
        copy_strided::<NR_COPY_MIN>(out, *d, src, *s, nr_bytes);
    } else if exact_fits {
        out[*d..out_copy_end].copy_from_slice(&src[*s..in_copy_end]);
    } else {
        return Err(literal_overrun(nr_bytes));
    }

    *s = in_copy_end;
    *d = out_copy_end;
    Ok(())
}

fn literal_overrun(nr_bytes: usize) -> Error {
    log::debug!("lz4k decode: literal run of {} overruns a buffer", nr_bytes);
    Error::Failed
}

/// Copy a repeat of `r_bytes` from `offset` bytes back. Requires
/// `0 < offset <= d`.
#[inline(always)]
fn copy_repeat(out: &mut [u8], d: usize, offset: usize, r_bytes: usize) -> Result<()> {
    let from = d - offset;
    let end = d.saturating_add(r_bytes);
    let headroom = end.saturating_add(R_COPY_SAFE_2X) <= out.len();

    if offset >= R_COPY_MIN && headroom {
        copy_pairs_while_lt::<R_COPY_MIN>(out, from, d, end);
    } else if offset >= R_COPY_MIN >> 1 && headroom {
        out.copy_within(from..from + R_COPY_MIN, d);
        copy_while_lt::<R_COPY_MIN>(out, from, d + offset, end);
    } else if offset > 1 && headroom {
        replicate_short::<R_COPY_MIN>(out, offset, d, end);
    } else if end > out.len() {
        log::debug!("lz4k decode: repeat of {} overruns output at {}", r_bytes, d);
        return Err(Error::Failed);
    } else {
        copy_overlapping(out, offset, d, r_bytes);
    }
    Ok(())
}

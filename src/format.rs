// Copyright 2024 Karpeles Lab Inc.
// Based on the LZ4K compression format by Huawei Technologies
// Use of this source code is governed by a BSD-style
// license that can be found in the LICENSE file.

//! Block layout shared by the encoder and decoder.
//!
//! A compressed block is one header byte holding the block class, followed by
//! records:
//!
//! ```text
//! <24-bit LE tag: nr | r | offset>{<nr length byte>}[<literals>]{<r length byte>}
//! ```
//!
//! The record with `offset == 0` carries the final literal run and ends the
//! block.

use crate::constants::*;
use crate::length::length_size;

/// Returns `2^n - 1`
#[inline(always)]
pub fn mask(n: u32) -> usize {
    (1usize << n) - 1
}

/// Index of the highest set bit, or `None` for zero
#[inline]
pub fn most_significant_bit(u: usize) -> Option<u32> {
    if u == 0 {
        None
    } else {
        Some(usize::BITS - 1 - u.leading_zeros())
    }
}

/// Round `u` up to a multiple of `2^log2`
#[inline]
pub fn round_up_to_log2(u: usize, log2: u32) -> usize {
    (u + mask(log2)) & !mask(log2)
}

/// Round `u` up to the next power of two (`u` itself if already one)
#[inline]
pub fn round_up_to_power_of_two(u: usize) -> usize {
    match most_significant_bit(u) {
        Some(msb) => round_up_to_log2(u, msb),
        None => 0,
    }
}

/// One of the five supported block sizes.
///
/// The class fixes how the 24 tag bits are split between the literal length,
/// the repeat length and the back-reference offset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum BlockClass {
    Kb4 = 0,
    Kb8 = 1,
    Kb16 = 2,
    Kb32 = 3,
    Kb64 = 4,
}

impl BlockClass {
    pub const ALL: [BlockClass; 5] = [
        BlockClass::Kb4,
        BlockClass::Kb8,
        BlockClass::Kb16,
        BlockClass::Kb32,
        BlockClass::Kb64,
    ];

    /// Parse a header byte
    pub fn from_header(b: u8) -> Option<Self> {
        Self::ALL.get(b as usize).copied()
    }

    /// Choose the class for an input of `len` bytes.
    ///
    /// `len - REPEAT_MIN` is rounded up to a power of two, so a class of size
    /// `2^k` covers inputs up to `2^k + 4` bytes. Anything smaller than 4KB
    /// uses the 4KB class.
    pub fn for_input_len(len: usize) -> Option<Self> {
        let rounded = round_up_to_power_of_two(len.saturating_sub(REPEAT_MIN).max(1));
        let log2 = most_significant_bit(rounded)?;
        if log2 <= BLOCK_LOG2_MIN {
            Some(BlockClass::Kb4)
        } else if log2 <= BLOCK_LOG2_MAX {
            Self::from_header((log2 - BLOCK_LOG2_MIN) as u8)
        } else {
            None
        }
    }

    /// Header byte written in front of the records
    pub fn header(self) -> u8 {
        self as u8
    }

    /// Width of the literal-length field
    pub fn nr_log2(self) -> u32 {
        match self {
            BlockClass::Kb4 => 6,
            BlockClass::Kb8 | BlockClass::Kb16 => 5,
            BlockClass::Kb32 | BlockClass::Kb64 => 4,
        }
    }

    /// Width of the offset field
    pub fn off_log2(self) -> u32 {
        BLOCK_LOG2_MIN + self as u32
    }

    /// Width of the repeat-length field
    pub fn r_log2(self) -> u32 {
        TAG_BITS - self.off_log2() - self.nr_log2()
    }

    /// Nominal block size in bytes
    pub fn block_size(self) -> usize {
        1 << self.off_log2()
    }

    /// Largest input that still classifies as this class
    pub fn max_input_len(self) -> usize {
        self.block_size() + REPEAT_MIN
    }

    pub(crate) fn layout(self) -> Layout {
        Layout {
            nr_log2: self.nr_log2(),
            off_log2: self.off_log2(),
            r_log2: self.r_log2(),
        }
    }
}

/// Field widths of a tag, resolved once per block
#[derive(Debug, Clone, Copy)]
pub(crate) struct Layout {
    pub nr_log2: u32,
    pub off_log2: u32,
    pub r_log2: u32,
}

impl Layout {
    #[inline(always)]
    pub fn nr_mask(&self) -> usize {
        mask(self.nr_log2)
    }

    #[inline(always)]
    pub fn r_mask(&self) -> usize {
        mask(self.r_log2)
    }

    /// Pack a tag. Length fields saturate at their escape value.
    #[inline(always)]
    pub fn tag(&self, nr_bytes: usize, r_bytes: usize, offset: usize) -> u32 {
        let nr = nr_bytes.min(self.nr_mask());
        let r = (r_bytes - REPEAT_MIN).min(self.r_mask());
        ((nr << (self.off_log2 + self.r_log2)) | (r << self.off_log2) | offset) as u32
    }

    /// Unpack a tag into `(nr field, r field + REPEAT_MIN, offset)`
    #[inline(always)]
    pub fn untag(&self, tag: u32) -> (usize, usize, usize) {
        let tag = tag as usize;
        let offset = tag & mask(self.off_log2);
        let nr = tag >> (self.off_log2 + self.r_log2);
        let r = ((tag >> self.off_log2) & self.r_mask()) + REPEAT_MIN;
        (nr, r, offset)
    }

    /// Escape bytes following the tag for a literal run of `nr_bytes`
    #[inline(always)]
    pub fn nr_escape_size(&self, nr_bytes: usize) -> usize {
        if nr_bytes < self.nr_mask() {
            0
        } else {
            length_size(nr_bytes - self.nr_mask())
        }
    }

    /// Escape bytes following the literals for a repeat of `r_bytes`
    #[inline(always)]
    pub fn r_escape_size(&self, r_bytes: usize) -> usize {
        if r_bytes - REPEAT_MIN < self.r_mask() {
            0
        } else {
            length_size(r_bytes - REPEAT_MIN - self.r_mask())
        }
    }
}

/// Read the 24-bit little-endian tag at `at`
#[inline(always)]
pub fn read_tag(src: &[u8], at: usize) -> u32 {
    u32::from_le_bytes([src[at], src[at + 1], src[at + 2], 0])
}

/// Write a 24-bit little-endian tag at `at`
#[inline(always)]
pub fn write_tag(dst: &mut [u8], at: usize, tag: u32) {
    dst[at..at + TAG_BYTES].copy_from_slice(&tag.to_le_bytes()[..TAG_BYTES]);
}

/// Exact encoded size of a literal-only record carrying `len` bytes
pub fn encoded_bytes_min(nr_log2: u32, len: usize) -> usize {
    if len < mask(nr_log2) {
        TAG_BYTES + len
    } else {
        TAG_BYTES + length_size(len - mask(nr_log2)) + len
    }
}

/// Worst-case encoded size of `len` input bytes when literals are copied in
/// `NR_COPY_MIN` strides. An output buffer at least this large never needs a
/// bounds check while encoding.
pub fn encoded_bytes_max(nr_log2: u32, len: usize) -> usize {
    let r = TAG_BYTES + round_up_to_log2(len, NR_COPY_LOG2);
    if len < mask(nr_log2) {
        r
    } else {
        r + length_size(len - mask(nr_log2))
    }
}

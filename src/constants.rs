// Copyright 2024 Karpeles Lab Inc.
// Based on the LZ4K compression format by Huawei Technologies
// Use of this source code is governed by a BSD-style
// license that can be found in the LICENSE file.

/// Largest value of a single escape-length byte; a byte equal to this
/// continues the chain.
pub const BYTE_MAX: usize = 255;

/// Shortest repeat the format can express. Repeat lengths are stored minus this.
pub const REPEAT_MIN: usize = 4;

/// Size of a record tag in bytes
pub const TAG_BYTES: usize = 3;

/// Size of a record tag in bits
pub const TAG_BITS: u32 = (TAG_BYTES * 8) as u32;

/// log2 of the smallest block class (4KB)
pub const BLOCK_LOG2_MIN: u32 = 12;

/// log2 of the largest block class (64KB)
pub const BLOCK_LOG2_MAX: u32 = 16;

/// Copy quantum for literal runs
pub const NR_COPY_LOG2: u32 = 4;
pub const NR_COPY_MIN: usize = 1 << NR_COPY_LOG2;

/// Copy quantum for repeats
pub const R_COPY_MIN: usize = 16;

/// Headroom the decoder needs past a repeat to use paired bulk copies
pub const R_COPY_SAFE_2X: usize = (R_COPY_MIN << 1) - 1;

/// Hash table width in bits
pub const HT_LOG2: u32 = 12;

/// Number of hash table slots
pub const HT_SIZE: usize = 1 << HT_LOG2;

/// Match-finder skip acceleration. The step grows by one every
/// `1 << STEP_LOG2` misses.
pub const STEP_LOG2: u32 = 5;

/// Never bother compressing fewer than this many bytes
pub const GAIN_MIN: usize = 64;

/// Format revision reported by [`crate::version`]
pub const VERSION: &str = "2020.07.07";

// Copyright 2024 Karpeles Lab Inc.
// Based on the LZ4K compression format by Huawei Technologies
// Use of this source code is governed by a BSD-style
// license that can be found in the LICENSE file.

//! Dictionary support for LZ4K compression

use crate::constants::REPEAT_MIN;
use crate::decode::decode_delta;
use crate::encode::{encode_delta, update_delta_state};
use crate::error::{Error, Result};
use crate::state::EncodeState;

/// Minimum dictionary size
pub const MIN_DICT_SIZE: usize = 16;

/// Maximum dictionary size
pub const MAX_DICT_SIZE: usize = 65536;

/// Largest dictionary plus input that still fits one block
const MAX_WINDOW: usize = MAX_DICT_SIZE + REPEAT_MIN;

/// Dictionary for LZ4K compression
///
/// Back-references may point into the dictionary, so blocks that resemble it
/// compress better. The dictionary and the data being compressed share one
/// contiguous window, which is why the two together may not exceed
/// `MAX_DICT_SIZE + 4` bytes.
pub struct Dict {
    /// Dictionary length; `window[..dict_len]` is the dictionary
    dict_len: usize,
    /// Dictionary followed by scratch space for the current block
    window: Vec<u8>,
    /// Hash table after scanning the dictionary
    primed: Box<EncodeState>,
    /// Working copy of `primed` for the current block
    work: Box<EncodeState>,
}

impl Dict {
    /// Create a dictionary from raw bytes.
    /// Returns None if the size is out of range.
    pub fn new(data: &[u8]) -> Option<Self> {
        if data.len() < MIN_DICT_SIZE || data.len() > MAX_DICT_SIZE {
            return None;
        }

        let mut dict = Dict {
            dict_len: data.len(),
            window: data.to_vec(),
            primed: Box::default(),
            work: Box::default(),
        };
        dict.prime().ok()?;
        Some(dict)
    }

    /// Get dictionary data
    pub fn data(&self) -> &[u8] {
        &self.window[..self.dict_len]
    }

    /// Largest block that can be compressed against this dictionary
    pub fn max_block_len(&self) -> usize {
        MAX_WINDOW - self.dict_len
    }

    fn prime(&mut self) -> Result<()> {
        update_delta_state(&mut self.primed, &self.window[..self.dict_len], 0)
    }

    /// Compress `src` with back-references into the dictionary.
    /// Returns the size of the block written to `dst`.
    pub fn encode(&mut self, src: &[u8], dst: &mut [u8]) -> Result<usize> {
        if src.is_empty() || src.len() > self.max_block_len() {
            log::debug!("lz4k dict: block of {} bytes does not fit the window", src.len());
            return Err(Error::Failed);
        }

        self.window.truncate(self.dict_len);
        self.window.extend_from_slice(src);
        self.work.clone_from(&self.primed);
        encode_delta(&mut self.work, &self.window, self.dict_len, dst)
    }

    /// Decompress a block produced by [`Dict::encode`] into `dst`.
    /// Returns the number of bytes written.
    pub fn decode(&mut self, src: &[u8], dst: &mut [u8]) -> Result<usize> {
        let cap = dst.len().min(self.max_block_len());
        self.window.truncate(self.dict_len);
        self.window.resize(self.dict_len + cap, 0);

        let n = decode_delta(src, &mut self.window, self.dict_len)?;
        dst[..n].copy_from_slice(&self.window[self.dict_len..self.dict_len + n]);
        Ok(n)
    }
}

impl std::fmt::Debug for Dict {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Dict").field("len", &self.dict_len).finish()
    }
}

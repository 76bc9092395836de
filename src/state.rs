// Copyright 2024 Karpeles Lab Inc.
// Based on the LZ4K compression format by Huawei Technologies
// Use of this source code is governed by a BSD-style
// license that can be found in the LICENSE file.

use crate::constants::HT_SIZE;

/// Hash table used by the encoder.
///
/// Maps a hash of six input bytes to the most recent position that produced
/// it. Positions are stored as `u16`, which is why a block (or a delta
/// window) never exceeds 64KB.
///
/// A plain encode clears the table first. For delta encoding the same table
/// must be carried untouched from [`update_delta_state`](crate::update_delta_state)
/// to [`encode_delta`](crate::encode_delta).
#[derive(Clone)]
pub struct EncodeState {
    table: [u16; HT_SIZE],
}

impl EncodeState {
    /// Create a zeroed table
    pub fn new() -> Self {
        EncodeState {
            table: [0; HT_SIZE],
        }
    }

    /// Number of bytes of table storage an encoder needs
    pub const fn required_size() -> usize {
        HT_SIZE * std::mem::size_of::<u16>()
    }

    /// Forget every recorded position
    pub fn reset(&mut self) {
        self.table.fill(0);
    }

    /// Store `pos` under hash `h` and return the position it replaces
    #[inline(always)]
    pub(crate) fn replace(&mut self, h: usize, pos: usize) -> usize {
        std::mem::replace(&mut self.table[h], pos as u16) as usize
    }

    #[inline(always)]
    pub(crate) fn set(&mut self, h: usize, pos: usize) {
        self.table[h] = pos as u16;
    }
}

impl Default for EncodeState {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for EncodeState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let used = self.table.iter().filter(|&&p| p != 0).count();
        f.debug_struct("EncodeState").field("used", &used).finish()
    }
}

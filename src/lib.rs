// Copyright 2024 Karpeles Lab Inc.
// Based on the LZ4K compression format by Huawei Technologies
// Use of this source code is governed by a BSD-style
// license that can be found in the LICENSE file.

//! # LZ4K Compression
//!
//! This library implements LZ4K, an LZ77-family block codec tuned for
//! compressing single memory pages (4KB up to 64KB) in swap and
//! compressed-RAM stores.
//!
//! LZ4K provides:
//! - Self-describing blocks: the first byte records the block size class
//! - Caller-owned encoder state, no allocation inside the codec
//! - A soft output limit to give up early on incompressible pages
//! - Delta encoding against a dictionary
//!
//! ## Block Format Example
//!
//! ```rust
//! use lz4k::{decode, encode, max_encoded_len, EncodeState};
//!
//! let page = vec![0u8; 4096];
//! let mut state = EncodeState::new();
//! let mut compressed = vec![0u8; max_encoded_len(page.len()).unwrap()];
//! let n = encode(&mut state, &page, &mut compressed, 0).expect("compression failed");
//!
//! let mut decompressed = vec![0u8; page.len()];
//! let m = decode(&compressed[..n], &mut decompressed).expect("decompression failed");
//! assert_eq!(m, page.len());
//! assert_eq!(page, decompressed);
//! ```
//!
//! An [`Error::Incompressible`] result is not a failure; the caller should
//! keep the page uncompressed.

mod constants;
mod copy;
mod decode;
mod dict;
mod encode;
mod error;
mod format;
mod hash;
mod length;
mod state;

pub use decode::{decode, decode_delta, Decoder};
pub use dict::{Dict, MAX_DICT_SIZE, MIN_DICT_SIZE};
pub use encode::{encode, encode_delta, gain_threshold, max_encoded_len, update_delta_state, Encoder};
pub use error::{status_code, Error, Result};
pub use format::BlockClass;
pub use state::EncodeState;

/// Format revision implemented by this crate
pub fn version() -> &'static str {
    constants::VERSION
}

// Copyright 2024 Karpeles Lab Inc.
// Based on the LZ4K compression format by Huawei Technologies
// Use of this source code is governed by a BSD-style
// license that can be found in the LICENSE file.

use thiserror::Error;

/// Result type for LZ4K operations
pub type Result<T> = std::result::Result<T, Error>;

/// Status values for LZ4K compression/decompression
///
/// `Incompressible` is not a failure: the block is simply not worth storing
/// compressed and the caller should keep the raw bytes instead.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Error {
    /// Input too small, or the encoded size would reach the soft limit
    #[error("lz4k: input is incompressible")]
    Incompressible,

    /// Bad arguments or corrupt compressed data
    #[error("lz4k: corrupt input or invalid arguments")]
    Failed,

    /// The compressed input ended in the middle of a length chain
    #[error("lz4k: unexpected end of input")]
    ReadError,

    /// The output buffer is too small
    #[error("lz4k: output buffer too small")]
    WriteError,
}

impl Error {
    /// Numeric status code: `0` for incompressible, negative otherwise.
    pub fn code(&self) -> i32 {
        match self {
            Error::Incompressible => 0,
            Error::Failed => -1,
            Error::ReadError => -2,
            Error::WriteError => -3,
        }
    }

    /// Returns true if the caller should fall back to storing raw data.
    pub fn is_incompressible(&self) -> bool {
        matches!(self, Error::Incompressible)
    }
}

/// Collapse a result into the integer convention used by page-compression
/// frontends: a positive byte count on success, otherwise [`Error::code`].
pub fn status_code(result: &Result<usize>) -> i32 {
    match result {
        Ok(n) => i32::try_from(*n).unwrap_or(Error::Failed.code()),
        Err(e) => e.code(),
    }
}

// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Error types for blob decoding and tile execution.

use tensor_core::TensorError;
use thiserror::Error;

/// Errors produced on the run side of the kernel protocol.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ExecError {
    #[error("unknown kernel id tag {tag}")]
    InvalidKernelId { tag: u32 },

    #[error("private-data blob is {actual} bytes, record expects {expected}")]
    BlobSizeMismatch { expected: u32, actual: u32 },

    #[error("private-data blob carries kernel id {actual}, expected {expected}")]
    BlobIdMismatch { expected: u32, actual: u32 },

    #[error(transparent)]
    Tensor(#[from] TensorError),

    #[error("{op}: backend failure: {detail}")]
    Backend { op: &'static str, detail: String },
}

// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Error types for tensor and buffer operations.

/// Errors that can occur while building tensors or resolving buffers.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TensorError {
    /// The requested rank exceeds the compile-time maximum of the tensor.
    #[error("rank {rank} exceeds the maximum supported rank {max}")]
    RankTooLarge { rank: u32, max: u32 },

    /// A buffer's declared capacity is below the tensor's computed footprint.
    #[error("buffer too small: footprint needs {expected} bytes, buffer holds {actual}")]
    SizeMismatch { expected: u32, actual: u32 },

    /// A region-relative buffer refers to a memory region the base table
    /// does not contain. Fatal for the runtime instance being constructed.
    #[error("memory region {mem_idx} out of range: base table has {num_regions} regions")]
    OutOfRangeRegion { mem_idx: u32, num_regions: u32 },

    /// An axis reorder is not a permutation (entry repeated or out of range).
    #[error("axis {axis} repeated or out of range in permutation")]
    InvalidPermutation { axis: u32 },
}

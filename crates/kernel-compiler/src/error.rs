// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Error types for descriptor construction and parameter encoding.

use tensor_core::TensorError;
use thiserror::Error;

/// Errors produced on the compile side of the kernel protocol.
///
/// Every shape violation is a returned status, never a crash; the graph
/// compiler driving the descriptors decides how to report it.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CompileError {
    #[error("{op}: shape mismatch: {detail}")]
    ShapeMismatch { op: &'static str, detail: String },

    #[error("{op}: element width {elem_size} not supported")]
    NotSupported { op: &'static str, elem_size: u32 },

    #[error("{op}: {role} buffer holds {actual} bytes, needs {expected}")]
    BufferTooSmall {
        op: &'static str,
        role: &'static str,
        expected: u32,
        actual: u32,
    },

    #[error("{op}: buffers must be attached before serializing private data")]
    BuffersNotAttached { op: &'static str },

    #[error(transparent)]
    Tensor(#[from] TensorError),
}

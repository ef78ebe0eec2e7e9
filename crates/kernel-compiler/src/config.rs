// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Operator configuration records.
//!
//! These double as the user-facing configuration (serde-friendly for
//! graph tooling) and the blob-embedded form (plain-old-data, 4-byte
//! scalars, no padding).

use bytemuck::{Pod, Zeroable};
use serde::{Deserialize, Serialize};

/// Convolution hyperparameters. Spatial pairs are `[height, width]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Pod, Zeroable, Serialize, Deserialize)]
#[repr(C)]
pub struct Conv2dConfig {
    pub stride: [u32; 2],
    pub padding_begin: [u32; 2],
    pub padding_end: [u32; 2],
    pub dilation: [u32; 2],
    pub groups: u32,
}

impl Default for Conv2dConfig {
    fn default() -> Self {
        Self {
            stride: [1, 1],
            padding_begin: [0, 0],
            padding_end: [0, 0],
            dilation: [1, 1],
            groups: 1,
        }
    }
}

impl Conv2dConfig {
    /// Receptive field of the kernel along one spatial axis after
    /// dilation.
    pub fn effective_kernel_size(&self, kernel: u32, axis: usize) -> u32 {
        (kernel - 1) * self.dilation[axis] + 1
    }
}

/// Pooling hyperparameters. Spatial pairs are `[height, width]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Pod, Zeroable, Serialize, Deserialize)]
#[repr(C)]
pub struct PoolConfig {
    pub kernel_size: [u32; 2],
    pub stride: [u32; 2],
    pub padding_begin: [u32; 2],
    pub padding_end: [u32; 2],
}

impl Default for PoolConfig {
    fn default() -> Self {
        Self {
            kernel_size: [1, 1],
            stride: [1, 1],
            padding_begin: [0, 0],
            padding_end: [0, 0],
        }
    }
}

/// Rescale configuration: the quantization axis, or -1 for per-tensor
/// parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Pod, Zeroable, Serialize, Deserialize)]
#[repr(C)]
pub struct RescaleConfig {
    pub axis: i32,
}

/// Reduction configuration: the axis collapsed to extent 1.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Pod, Zeroable, Serialize, Deserialize)]
#[repr(C)]
pub struct ReduceConfig {
    pub axis: i32,
}

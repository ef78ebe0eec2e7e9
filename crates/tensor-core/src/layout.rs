// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Canonical dimension indices for the operator set.
//!
//! Feature maps are BHWC; convolution weights are HWCinCout. Keeping the
//! indices named here avoids magic numbers spread across descriptors and
//! runtime kernels.

/// Batch dimension of a BHWC feature map.
pub const BATCH_DIM: usize = 0;
/// Height dimension of a BHWC feature map.
pub const HEIGHT_DIM: usize = 1;
/// Width dimension of a BHWC feature map.
pub const WIDTH_DIM: usize = 2;
/// Channel dimension of a BHWC feature map.
pub const CHANNEL_DIM: usize = 3;

/// Kernel-height dimension of an HWCinCout weight tensor.
pub const WEIGHT_HEIGHT_DIM: usize = 0;
/// Kernel-width dimension of an HWCinCout weight tensor.
pub const WEIGHT_WIDTH_DIM: usize = 1;
/// Input-channel dimension of an HWCinCout weight tensor.
pub const WEIGHT_CIN_DIM: usize = 2;
/// Output-channel dimension of an HWCinCout weight tensor.
pub const WEIGHT_COUT_DIM: usize = 3;

/// Encoded quantization axis meaning "one value for the whole tensor".
pub const PER_TENSOR_QUANT_AXIS: i32 = -1;

/// Rank of BHWC feature-map tensors.
pub const IO_RANK: usize = 4;
/// Rank of HWCinCout convolution weight tensors.
pub const WEIGHT_RANK: usize = 4;
/// Rank of 1-D parameter tensors (zero points, rescale params).
pub const PARAM_RANK: usize = 1;

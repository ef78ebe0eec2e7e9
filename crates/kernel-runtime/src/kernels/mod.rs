// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Runtime kernels, one per operator kind.
//!
//! Every kernel follows the same three-call protocol: `prefetch` gives
//! double-buffering targets a hook (a no-op here), `issue` hands the
//! current tile to the backend, and `update` moves all co-iterating
//! cursors one tile in lock-step and reports whether the traversal has
//! completed. Co-advancing iterators were built from
//! one schedule on the compile side and agree on tile counts; that
//! agreement is a design invariant, not re-checked per tile.

mod clip;
mod conv2d;
mod eltwise;
mod pool;
mod reduce;
mod rescale;

pub use clip::Clip;
pub use conv2d::Conv2d;
pub use eltwise::EltwiseAdd;
pub use pool::Pool2d;
pub use reduce::ReduceMax;
pub use rescale::Rescale;

use tensor_core::{
    layout::{HEIGHT_DIM, WIDTH_DIM},
    DeviceBuffer,
};
use tile_iter::TensorIterator;

use crate::backend::TilePadding;

/// Padding seen by the current tile.
///
/// Tiles touching the tensor's top/left edge keep the configured
/// leading padding, tiles touching the bottom/right edge keep the
/// trailing padding, and interior tiles get zero on the sides they
/// share with a neighboring tile.
pub(crate) fn tile_padding(
    input: &TensorIterator<DeviceBuffer, 4>,
    padding_begin: &[u32; 2],
    padding_end: &[u32; 2],
) -> TilePadding {
    TilePadding {
        top: if input.is_first_tile(HEIGHT_DIM) {
            padding_begin[0]
        } else {
            0
        },
        bottom: if input.is_last_tile(HEIGHT_DIM) {
            padding_end[0]
        } else {
            0
        },
        left: if input.is_first_tile(WIDTH_DIM) {
            padding_begin[1]
        } else {
            0
        },
        right: if input.is_last_tile(WIDTH_DIM) {
            padding_end[1]
        } else {
            0
        },
    }
}

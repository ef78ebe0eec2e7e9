// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! The numeric-kernel seam.
//!
//! Runtime kernels own iteration, address resolution and per-tile
//! bookkeeping; the arithmetic itself is behind [`TileBackend`]. A
//! backend receives fully resolved tile views (absolute addresses,
//! extents, strides) and never sees the blob protocol. This keeps the
//! core testable with a recording mock and lets real targets plug in
//! accelerator dispatch without touching the iteration logic.

use kernel_compiler::{Conv2dConfig, PoolConfig};
use tensor_core::{DeviceBuffer, Tensor, TensorBuffer};

use crate::ExecError;

/// One resolved tile: an absolute base address plus extents and strides.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TileView {
    pub addr: u64,
    pub shape: [u32; 4],
    pub stride: [i32; 4],
    pub rank: u32,
    pub elem_size: u32,
}

impl TileView {
    /// Builds a view of a resolved tensor. The tensor's element offset
    /// folds into the address.
    pub fn of(tensor: &Tensor<DeviceBuffer, 4>) -> Self {
        let elem_size = tensor.elem_size();
        Self {
            addr: tensor.buf().addr() + tensor.offset() as u64 * elem_size as u64,
            shape: *tensor.shape(),
            stride: *tensor.strides(),
            rank: tensor.rank(),
            elem_size,
        }
    }
}

/// A resolved parameter buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParamSlice {
    pub addr: u64,
    pub len_bytes: u32,
}

impl ParamSlice {
    pub fn of(buf: &DeviceBuffer) -> Self {
        Self {
            addr: buf.addr(),
            len_bytes: buf.capacity_bytes(),
        }
    }
}

/// Spatial padding of the current tile.
///
/// Only tiles on the tensor's edge see configured padding; interior
/// tiles overlap their neighbors instead and get zero.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TilePadding {
    pub top: u32,
    pub bottom: u32,
    pub left: u32,
    pub right: u32,
}

/// Convolution tile arguments.
#[derive(Debug, Clone, Copy)]
pub struct Conv2dTile {
    pub input: TileView,
    pub weights: TileView,
    pub output: TileView,
    pub inp_zp: ParamSlice,
    pub wts_zp: ParamSlice,
    pub inp_quant_axis: i32,
    pub wts_quant_axis: i32,
    pub config: Conv2dConfig,
    pub padding: TilePadding,
}

/// Pooling tile arguments, shared by max and sum pooling.
#[derive(Debug, Clone, Copy)]
pub struct PoolTile {
    pub input: TileView,
    pub output: TileView,
    pub config: PoolConfig,
    pub padding: TilePadding,
}

/// Elementwise-add tile arguments.
#[derive(Debug, Clone, Copy)]
pub struct EltwiseTile {
    pub input_left: TileView,
    pub input_right: TileView,
    pub output: TileView,
}

/// Axis-reduction tile arguments.
#[derive(Debug, Clone, Copy)]
pub struct ReduceTile {
    pub input: TileView,
    pub output: TileView,
    pub axis: i32,
}

/// Rescale tile arguments. `params` is the whole field-major parameter
/// buffer; `param_offset`/`param_count` select the tuples of the current
/// tile along the rescale axis.
#[derive(Debug, Clone, Copy)]
pub struct RescaleTile {
    pub input: TileView,
    pub output: TileView,
    pub params: ParamSlice,
    pub params_elem_num: u32,
    pub axis: i32,
    pub param_offset: u32,
    pub param_count: u32,
}

/// Clip tile arguments. `params` holds one `i8` min then one `i8` max.
#[derive(Debug, Clone, Copy)]
pub struct ClipTile {
    pub input: TileView,
    pub output: TileView,
    pub params: ParamSlice,
}

/// Numeric execution of one tile per operator kind.
pub trait TileBackend {
    fn conv2d(&mut self, tile: &Conv2dTile) -> Result<(), ExecError>;
    fn max_pool2d(&mut self, tile: &PoolTile) -> Result<(), ExecError>;
    fn sum_pool2d(&mut self, tile: &PoolTile) -> Result<(), ExecError>;
    fn eltwise_add(&mut self, tile: &EltwiseTile) -> Result<(), ExecError>;
    fn reduce_max(&mut self, tile: &ReduceTile) -> Result<(), ExecError>;
    fn rescale(&mut self, tile: &RescaleTile) -> Result<(), ExecError>;
    fn clip(&mut self, tile: &ClipTile) -> Result<(), ExecError>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use tensor_core::{ElemType, MemRegions, OffsetBuffer};

    #[test]
    fn test_tile_view_folds_offset() {
        let bases = [0u64, 0x1000];
        let regions = MemRegions::new(&bases);
        let t = Tensor::contiguous(OffsetBuffer::new(1, 0, 480, ElemType::I16), [1, 4, 6, 10], 4)
            .unwrap();
        let mut dev = t.resolve(&regions).unwrap();
        dev.set_offset(5);
        let view = TileView::of(&dev);
        assert_eq!(view.addr, 0x1000 + 5 * 2);
        assert_eq!(view.shape, [1, 4, 6, 10]);
        assert_eq!(view.stride, [240, 60, 10, 1]);
        assert_eq!(view.elem_size, 2);
    }
}

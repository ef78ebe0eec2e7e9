// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Runtime requantization kernel.

use kernel_compiler::{KernelId, RescalePrivateData};
use tensor_core::{DeviceBuffer, MemRegions};
use tile_iter::TensorIterator;

use crate::{
    backend::{ParamSlice, RescaleTile, TileBackend, TileView},
    decode::decode,
    ExecError,
};

/// Rescale reconstructed from its private-data blob.
///
/// When the rescale axis is tiled, each tile uses the parameter tuples
/// of its slice: the window starts at the cursor's coordinate along the
/// axis and spans the tile's extent, never more than the
/// `tile_params_max_elem_num` recorded on the compile side.
pub struct Rescale {
    input: TensorIterator<DeviceBuffer, 4>,
    output: TensorIterator<DeviceBuffer, 4>,
    params: DeviceBuffer,
    params_elem_num: u32,
    axis: i32,
}

impl Rescale {
    pub fn new(blob: &[u8], regions: &MemRegions<'_>) -> Result<Self, ExecError> {
        let prv: RescalePrivateData = decode(blob, KernelId::Rescale)?;
        Ok(Self {
            input: prv.input.unpack::<4>()?.resolve(regions)?,
            output: prv.output.unpack::<4>()?.resolve(regions)?,
            params: regions.resolve(&prv.params)?,
            params_elem_num: prv.params_elem_num,
            axis: prv.rescale_axis,
        })
    }

    pub fn issue(&self, backend: &mut dyn TileBackend) -> Result<(), ExecError> {
        let out_tile = self.output.sub_tensor();
        let (param_offset, param_count) = if self.axis < 0 {
            (0, 1)
        } else {
            let axis = self.axis as usize;
            (self.output.axis_pos(axis) as u32, out_tile.dim(axis))
        };
        let tile = RescaleTile {
            input: TileView::of(&self.input.sub_tensor()),
            output: TileView::of(&out_tile),
            params: ParamSlice::of(&self.params),
            params_elem_num: self.params_elem_num,
            axis: self.axis,
            param_offset,
            param_count,
        };
        backend.rescale(&tile)
    }

    pub fn prefetch(&self) -> Result<(), ExecError> {
        Ok(())
    }

    pub fn update(&mut self) -> bool {
        self.input.advance();
        self.output.advance()
    }

    pub fn reset(&mut self) {
        self.input.reset();
        self.output.reset();
    }
}

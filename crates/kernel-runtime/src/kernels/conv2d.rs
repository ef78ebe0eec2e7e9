// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Runtime convolution kernel.

use kernel_compiler::{Conv2dConfig, Conv2dPrivateData, KernelId};
use tensor_core::{DeviceBuffer, MemRegions, Tensor};
use tile_iter::TensorIterator;

use crate::{
    backend::{Conv2dTile, ParamSlice, TileBackend, TileView},
    decode::decode,
    kernels::tile_padding,
    ExecError,
};

/// Convolution reconstructed from its private-data blob.
pub struct Conv2d {
    input: TensorIterator<DeviceBuffer, 4>,
    output: TensorIterator<DeviceBuffer, 4>,
    weights: Tensor<DeviceBuffer, 4>,
    inp_zp: DeviceBuffer,
    wts_zp: DeviceBuffer,
    inp_quant_axis: i32,
    wts_quant_axis: i32,
    config: Conv2dConfig,
}

impl Conv2d {
    pub fn new(blob: &[u8], regions: &MemRegions<'_>) -> Result<Self, ExecError> {
        let prv: Conv2dPrivateData = decode(blob, KernelId::Conv2d)?;
        Ok(Self {
            input: prv.input.unpack::<4>()?.resolve(regions)?,
            output: prv.output.unpack::<4>()?.resolve(regions)?,
            weights: prv.weights.unpack::<4>()?.resolve(regions)?,
            inp_zp: regions.resolve(&prv.inp_zp)?,
            wts_zp: regions.resolve(&prv.wts_zp)?,
            inp_quant_axis: prv.inp_quant_axis,
            wts_quant_axis: prv.wts_quant_axis,
            config: prv.config,
        })
    }

    /// Runs the current tile on the backend.
    pub fn issue(&self, backend: &mut dyn TileBackend) -> Result<(), ExecError> {
        let tile = Conv2dTile {
            input: TileView::of(&self.input.sub_tensor()),
            weights: TileView::of(&self.weights),
            output: TileView::of(&self.output.sub_tensor()),
            inp_zp: ParamSlice::of(&self.inp_zp),
            wts_zp: ParamSlice::of(&self.wts_zp),
            inp_quant_axis: self.inp_quant_axis,
            wts_quant_axis: self.wts_quant_axis,
            config: self.config,
            padding: tile_padding(
                &self.input,
                &self.config.padding_begin,
                &self.config.padding_end,
            ),
        };
        backend.conv2d(&tile)
    }

    pub fn prefetch(&self) -> Result<(), ExecError> {
        Ok(())
    }

    /// Advances input and output in lock-step. Returns `true` when the
    /// traversal has completed.
    pub fn update(&mut self) -> bool {
        self.input.advance();
        self.output.advance()
    }

    pub fn reset(&mut self) {
        self.input.reset();
        self.output.reset();
    }
}

// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Runtime max-reduction kernel.

use kernel_compiler::{KernelId, ReducePrivateData};
use tensor_core::{DeviceBuffer, MemRegions};
use tile_iter::TensorIterator;

use crate::{
    backend::{ReduceTile, TileBackend, TileView},
    decode::decode,
    ExecError,
};

/// Axis reduction reconstructed from its private-data blob.
pub struct ReduceMax {
    input: TensorIterator<DeviceBuffer, 4>,
    output: TensorIterator<DeviceBuffer, 4>,
    axis: i32,
}

impl ReduceMax {
    pub fn new(blob: &[u8], regions: &MemRegions<'_>) -> Result<Self, ExecError> {
        let prv: ReducePrivateData = decode(blob, KernelId::ReduceMax)?;
        Ok(Self {
            input: prv.input.unpack::<4>()?.resolve(regions)?,
            output: prv.output.unpack::<4>()?.resolve(regions)?,
            axis: prv.reduce_axis,
        })
    }

    pub fn issue(&self, backend: &mut dyn TileBackend) -> Result<(), ExecError> {
        let tile = ReduceTile {
            input: TileView::of(&self.input.sub_tensor()),
            output: TileView::of(&self.output.sub_tensor()),
            axis: self.axis,
        };
        backend.reduce_max(&tile)
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

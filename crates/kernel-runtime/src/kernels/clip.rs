// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Runtime clip kernel.

use kernel_compiler::{ClipPrivateData, KernelId};
use tensor_core::{DeviceBuffer, MemRegions};
use tile_iter::TensorIterator;

use crate::{
    backend::{ClipTile, ParamSlice, TileBackend, TileView},
    decode::decode,
    ExecError,
};

/// Saturation kernel reconstructed from its private-data blob.
pub struct Clip {
    input: TensorIterator<DeviceBuffer, 4>,
    output: TensorIterator<DeviceBuffer, 4>,
    params: DeviceBuffer,
}

impl Clip {
    pub fn new(blob: &[u8], regions: &MemRegions<'_>) -> Result<Self, ExecError> {
        let prv: ClipPrivateData = decode(blob, KernelId::Clip)?;
        Ok(Self {
            input: prv.input.unpack::<4>()?.resolve(regions)?,
            output: prv.output.unpack::<4>()?.resolve(regions)?,
            params: regions.resolve(&prv.params)?,
        })
    }

    pub fn issue(&self, backend: &mut dyn TileBackend) -> Result<(), ExecError> {
        let tile = ClipTile {
            input: TileView::of(&self.input.sub_tensor()),
            output: TileView::of(&self.output.sub_tensor()),
            params: ParamSlice::of(&self.params),
        };
        backend.clip(&tile)
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

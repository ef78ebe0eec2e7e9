// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Runtime pooling kernel, covering max and sum pooling.

use kernel_compiler::{KernelId, PoolConfig, PoolPrivateData};
use tensor_core::{DeviceBuffer, MemRegions};
use tile_iter::TensorIterator;

use crate::{
    backend::{PoolTile, TileBackend, TileView},
    decode::decode,
    kernels::tile_padding,
    ExecError,
};

/// Pooling kernel reconstructed from its private-data blob. The kernel
/// identity chooses the backend entry point at issue time.
pub struct Pool2d {
    id: KernelId,
    input: TensorIterator<DeviceBuffer, 4>,
    output: TensorIterator<DeviceBuffer, 4>,
    config: PoolConfig,
}

impl Pool2d {
    pub fn new_max(blob: &[u8], regions: &MemRegions<'_>) -> Result<Self, ExecError> {
        Self::new(blob, regions, KernelId::MaxPool2d)
    }

    pub fn new_sum(blob: &[u8], regions: &MemRegions<'_>) -> Result<Self, ExecError> {
        Self::new(blob, regions, KernelId::SumPool2d)
    }

    fn new(blob: &[u8], regions: &MemRegions<'_>, id: KernelId) -> Result<Self, ExecError> {
        let prv: PoolPrivateData = decode(blob, id)?;
        Ok(Self {
            id,
            input: prv.input.unpack::<4>()?.resolve(regions)?,
            output: prv.output.unpack::<4>()?.resolve(regions)?,
            config: prv.config,
        })
    }

    pub fn issue(&self, backend: &mut dyn TileBackend) -> Result<(), ExecError> {
        let tile = PoolTile {
            input: TileView::of(&self.input.sub_tensor()),
            output: TileView::of(&self.output.sub_tensor()),
            config: self.config,
            padding: tile_padding(
                &self.input,
                &self.config.padding_begin,
                &self.config.padding_end,
            ),
        };
        match self.id {
            KernelId::MaxPool2d => backend.max_pool2d(&tile),
            KernelId::SumPool2d => backend.sum_pool2d(&tile),
            // The two constructors are the only way to set `id`.
            _ => unreachable!("pooling kernel holds non-pooling id {:?}", self.id),
        }
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

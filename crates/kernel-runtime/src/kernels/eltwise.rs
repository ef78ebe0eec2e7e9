// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Runtime elementwise-add kernel.

use kernel_compiler::{EltwisePrivateData, KernelId};
use tensor_core::{DeviceBuffer, MemRegions};
use tile_iter::TensorIterator;

use crate::{
    backend::{EltwiseTile, TileBackend, TileView},
    decode::decode,
    ExecError,
};

/// Elementwise addition reconstructed from its private-data blob.
pub struct EltwiseAdd {
    input_left: TensorIterator<DeviceBuffer, 4>,
    input_right: TensorIterator<DeviceBuffer, 4>,
    output: TensorIterator<DeviceBuffer, 4>,
}

impl EltwiseAdd {
    pub fn new(blob: &[u8], regions: &MemRegions<'_>) -> Result<Self, ExecError> {
        let prv: EltwisePrivateData = decode(blob, KernelId::EltwiseAdd)?;
        Ok(Self {
            input_left: prv.input_left.unpack::<4>()?.resolve(regions)?,
            input_right: prv.input_right.unpack::<4>()?.resolve(regions)?,
            output: prv.output.unpack::<4>()?.resolve(regions)?,
        })
    }

    pub fn issue(&self, backend: &mut dyn TileBackend) -> Result<(), ExecError> {
        let tile = EltwiseTile {
            input_left: TileView::of(&self.input_left.sub_tensor()),
            input_right: TileView::of(&self.input_right.sub_tensor()),
            output: TileView::of(&self.output.sub_tensor()),
        };
        backend.eltwise_add(&tile)
    }

    pub fn prefetch(&self) -> Result<(), ExecError> {
        Ok(())
    }

    pub fn update(&mut self) -> bool {
        self.input_left.advance();
        self.input_right.advance();
        self.output.advance()
    }

    pub fn reset(&mut self) {
        self.input_left.reset();
        self.input_right.reset();
        self.output.reset();
    }
}

// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Kernel reconstruction from opaque blobs.
//!
//! The loader hands the factory a private-data byte range and the
//! device's region base table; the factory reads the blob header,
//! dispatches on the kernel identity and builds the matching runtime
//! kernel with every buffer resolved to an absolute address.

use kernel_compiler::KernelId;
use tensor_core::MemRegions;

use crate::{
    decode::peek_header,
    kernels::{Clip, Conv2d, EltwiseAdd, Pool2d, ReduceMax, Rescale},
    ExecError, TileBackend,
};

/// A reconstructed kernel of any kind.
pub enum RuntimeKernel {
    Conv2d(Conv2d),
    MaxPool2d(Pool2d),
    SumPool2d(Pool2d),
    EltwiseAdd(EltwiseAdd),
    ReduceMax(ReduceMax),
    Rescale(Rescale),
    Clip(Clip),
}

impl RuntimeKernel {
    pub fn id(&self) -> KernelId {
        match self {
            Self::Conv2d(_) => KernelId::Conv2d,
            Self::MaxPool2d(_) => KernelId::MaxPool2d,
            Self::SumPool2d(_) => KernelId::SumPool2d,
            Self::EltwiseAdd(_) => KernelId::EltwiseAdd,
            Self::ReduceMax(_) => KernelId::ReduceMax,
            Self::Rescale(_) => KernelId::Rescale,
            Self::Clip(_) => KernelId::Clip,
        }
    }

    /// Runs the current tile on the backend.
    pub fn issue(&self, backend: &mut dyn TileBackend) -> Result<(), ExecError> {
        match self {
            Self::Conv2d(k) => k.issue(backend),
            Self::MaxPool2d(k) | Self::SumPool2d(k) => k.issue(backend),
            Self::EltwiseAdd(k) => k.issue(backend),
            Self::ReduceMax(k) => k.issue(backend),
            Self::Rescale(k) => k.issue(backend),
            Self::Clip(k) => k.issue(backend),
        }
    }

    /// Hook for targets that stage the next tile while the current one
    /// runs; a no-op on this target.
    pub fn prefetch(&self) -> Result<(), ExecError> {
        match self {
            Self::Conv2d(k) => k.prefetch(),
            Self::MaxPool2d(k) | Self::SumPool2d(k) => k.prefetch(),
            Self::EltwiseAdd(k) => k.prefetch(),
            Self::ReduceMax(k) => k.prefetch(),
            Self::Rescale(k) => k.prefetch(),
            Self::Clip(k) => k.prefetch(),
        }
    }

    /// Moves every co-iterating cursor one tile. Returns `true` when
    /// the traversal has completed and the cursors have wrapped.
    pub fn update(&mut self) -> bool {
        match self {
            Self::Conv2d(k) => k.update(),
            Self::MaxPool2d(k) | Self::SumPool2d(k) => k.update(),
            Self::EltwiseAdd(k) => k.update(),
            Self::ReduceMax(k) => k.update(),
            Self::Rescale(k) => k.update(),
            Self::Clip(k) => k.update(),
        }
    }

    /// Returns every cursor to the first tile.
    pub fn reset(&mut self) {
        match self {
            Self::Conv2d(k) => k.reset(),
            Self::MaxPool2d(k) | Self::SumPool2d(k) => k.reset(),
            Self::EltwiseAdd(k) => k.reset(),
            Self::ReduceMax(k) => k.reset(),
            Self::Rescale(k) => k.reset(),
            Self::Clip(k) => k.reset(),
        }
    }
}

/// Builds runtime kernels against one region base table.
pub struct KernelFactory<'a> {
    regions: MemRegions<'a>,
}

impl<'a> KernelFactory<'a> {
    pub fn new(regions: MemRegions<'a>) -> Self {
        Self { regions }
    }

    /// Reconstructs the kernel a private-data blob describes.
    pub fn build(&self, blob: &[u8]) -> Result<RuntimeKernel, ExecError> {
        let header = peek_header(blob)?;
        let id = KernelId::from_tag(header.kernel_id).ok_or(ExecError::InvalidKernelId {
            tag: header.kernel_id,
        })?;
        tracing::debug!(?id, blob_len = blob.len(), "reconstructing kernel");
        let kernel = match id {
            KernelId::Invalid => {
                return Err(ExecError::InvalidKernelId {
                    tag: header.kernel_id,
                })
            }
            KernelId::Conv2d => RuntimeKernel::Conv2d(Conv2d::new(blob, &self.regions)?),
            KernelId::MaxPool2d => {
                RuntimeKernel::MaxPool2d(Pool2d::new_max(blob, &self.regions)?)
            }
            KernelId::SumPool2d => {
                RuntimeKernel::SumPool2d(Pool2d::new_sum(blob, &self.regions)?)
            }
            KernelId::EltwiseAdd => {
                RuntimeKernel::EltwiseAdd(EltwiseAdd::new(blob, &self.regions)?)
            }
            KernelId::ReduceMax => RuntimeKernel::ReduceMax(ReduceMax::new(blob, &self.regions)?),
            KernelId::Rescale => RuntimeKernel::Rescale(Rescale::new(blob, &self.regions)?),
            KernelId::Clip => RuntimeKernel::Clip(Clip::new(blob, &self.regions)?),
        };
        Ok(kernel)
    }

    /// By-value size of the runtime object a kernel id reconstructs
    /// into; arena-based loaders size their slots from it.
    pub fn runtime_object_size(id: KernelId) -> usize {
        match id {
            KernelId::Invalid => 0,
            KernelId::Conv2d => std::mem::size_of::<Conv2d>(),
            KernelId::MaxPool2d | KernelId::SumPool2d => std::mem::size_of::<Pool2d>(),
            KernelId::EltwiseAdd => std::mem::size_of::<EltwiseAdd>(),
            KernelId::ReduceMax => std::mem::size_of::<ReduceMax>(),
            KernelId::Rescale => std::mem::size_of::<Rescale>(),
            KernelId::Clip => std::mem::size_of::<Clip>(),
        }
    }
}

// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Memory region table and region-relative address resolution.

use crate::{DeviceBuffer, OffsetBuffer, TensorError};

/// The device's memory region base table.
///
/// Region index 0 is reserved for the null region; attachments never use
/// it, so a base of 0 in that slot is the convention.
#[derive(Debug, Clone, Copy)]
pub struct MemRegions<'a> {
    bases: &'a [u64],
}

impl<'a> MemRegions<'a> {
    /// Wraps a base-address table. Entry `i` is the start address of
    /// region `i`.
    pub fn new(bases: &'a [u64]) -> Self {
        Self { bases }
    }

    /// Number of regions in the table.
    pub fn num_regions(&self) -> u32 {
        self.bases.len() as u32
    }

    /// Resolves a region-relative buffer to an absolute device address.
    pub fn resolve(&self, buf: &OffsetBuffer) -> Result<DeviceBuffer, TensorError> {
        let base = *self.bases.get(buf.mem_idx as usize).ok_or(
            TensorError::OutOfRangeRegion {
                mem_idx: buf.mem_idx,
                num_regions: self.num_regions(),
            },
        )?;
        Ok(DeviceBuffer::from_parts(
            base + buf.offset as u64,
            buf.size,
            buf.elem_size,
        ))
    }
}

// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Private-data blob records: the wire format between compile and run.
//!
//! Each descriptor serializes its full state into one fixed-layout
//! record. Records are plain-old-data with native endianness and 4-byte
//! scalars only; the loader moves them as opaque byte ranges and the
//! runtime reconstructs kernels from them without touching the original
//! descriptor. The leading [`BlobHeader`] carries the kernel identity
//! and the record's exact size, both validated on decode.

use bytemuck::{Pod, Zeroable};
use tensor_core::{OffsetBuffer, PackedTensor};
use tile_iter::PackedIterator;

use crate::config::{Conv2dConfig, PoolConfig};

/// Identity tags of the operator kernels in the set.
///
/// Tag values are part of the blob format and never reused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u32)]
pub enum KernelId {
    Invalid = 0,
    Conv2d = 1,
    MaxPool2d = 2,
    SumPool2d = 3,
    EltwiseAdd = 4,
    ReduceMax = 5,
    Rescale = 6,
    Clip = 7,
}

impl KernelId {
    /// Decodes a wire tag. Unknown tags yield `None`, not a panic.
    pub fn from_tag(tag: u32) -> Option<Self> {
        match tag {
            1 => Some(Self::Conv2d),
            2 => Some(Self::MaxPool2d),
            3 => Some(Self::SumPool2d),
            4 => Some(Self::EltwiseAdd),
            5 => Some(Self::ReduceMax),
            6 => Some(Self::Rescale),
            7 => Some(Self::Clip),
            _ => None,
        }
    }

    pub fn as_tag(self) -> u32 {
        self as u32
    }
}

/// Leading header of every private-data record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Pod, Zeroable)]
#[repr(C)]
pub struct BlobHeader {
    pub kernel_id: u32,
    pub size: u32,
}

impl BlobHeader {
    pub fn new(id: KernelId, size: usize) -> Self {
        Self {
            kernel_id: id.as_tag(),
            size: size as u32,
        }
    }
}

/// Convolution private data.
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
#[repr(C)]
pub struct Conv2dPrivateData {
    pub header: BlobHeader,
    pub input: PackedIterator,
    pub output: PackedIterator,
    pub weights: PackedTensor,
    pub inp_zp: OffsetBuffer,
    pub wts_zp: OffsetBuffer,
    pub inp_quant_axis: i32,
    pub wts_quant_axis: i32,
    pub config: Conv2dConfig,
}

/// Pooling private data, shared by max and sum pooling; the header tag
/// says which.
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
#[repr(C)]
pub struct PoolPrivateData {
    pub header: BlobHeader,
    pub input: PackedIterator,
    pub output: PackedIterator,
    pub config: PoolConfig,
}

/// Elementwise-add private data.
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
#[repr(C)]
pub struct EltwisePrivateData {
    pub header: BlobHeader,
    pub input_left: PackedIterator,
    pub input_right: PackedIterator,
    pub output: PackedIterator,
}

/// Axis-reduction private data.
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
#[repr(C)]
pub struct ReducePrivateData {
    pub header: BlobHeader,
    pub input: PackedIterator,
    pub output: PackedIterator,
    pub reduce_axis: i32,
}

/// Rescale private data.
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
#[repr(C)]
pub struct RescalePrivateData {
    pub header: BlobHeader,
    pub input: PackedIterator,
    pub output: PackedIterator,
    pub params: OffsetBuffer,
    pub params_elem_num: u32,
    pub rescale_axis: i32,
    /// Largest per-tile parameter range along the rescale axis; the
    /// runtime sizes its parameter window from it.
    pub tile_params_max_elem_num: u32,
}

/// Clip private data.
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
#[repr(C)]
pub struct ClipPrivateData {
    pub header: BlobHeader,
    pub input: PackedIterator,
    pub output: PackedIterator,
    pub params: OffsetBuffer,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tag_roundtrip() {
        for id in [
            KernelId::Conv2d,
            KernelId::MaxPool2d,
            KernelId::SumPool2d,
            KernelId::EltwiseAdd,
            KernelId::ReduceMax,
            KernelId::Rescale,
            KernelId::Clip,
        ] {
            assert_eq!(KernelId::from_tag(id.as_tag()), Some(id));
        }
        assert_eq!(KernelId::from_tag(0), None);
        assert_eq!(KernelId::from_tag(999), None);
    }

    #[test]
    fn test_records_have_no_padding() {
        // Pod derivation already rejects implicit padding at compile
        // time; these pin the exact wire sizes.
        let it = std::mem::size_of::<PackedIterator>();
        let tensor = std::mem::size_of::<PackedTensor>();
        let buf = std::mem::size_of::<OffsetBuffer>();
        let hdr = std::mem::size_of::<BlobHeader>();
        assert_eq!(hdr, 8);
        assert_eq!(
            std::mem::size_of::<Conv2dPrivateData>(),
            hdr + 2 * it + tensor + 2 * buf + 8 + std::mem::size_of::<Conv2dConfig>()
        );
        assert_eq!(
            std::mem::size_of::<PoolPrivateData>(),
            hdr + 2 * it + std::mem::size_of::<PoolConfig>()
        );
        assert_eq!(std::mem::size_of::<EltwisePrivateData>(), hdr + 3 * it);
        assert_eq!(std::mem::size_of::<ReducePrivateData>(), hdr + 2 * it + 4);
        assert_eq!(
            std::mem::size_of::<RescalePrivateData>(),
            hdr + 2 * it + buf + 12
        );
        assert_eq!(std::mem::size_of::<ClipPrivateData>(), hdr + 2 * it + buf);
    }
}

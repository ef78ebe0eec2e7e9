// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! The generic tensor descriptor and its blob-packed form.

use crate::{DeviceBuffer, MemRegions, NoBuffer, OffsetBuffer, TensorBuffer, TensorError};
use bytemuck::{Pod, Zeroable};

/// Maximum rank any tensor in the kernel set can have.
///
/// Blob records always reserve this many axis slots so their layout does
/// not depend on the operator's actual rank.
pub const MAX_RANK: usize = 5;

/// An n-dimensional descriptor: extents, signed element strides and one
/// buffer in state `B`.
///
/// `R` is the compile-time axis capacity; the live rank may be smaller.
/// Strides are in *element* units and are deliberately unconstrained —
/// dense row-major, padded, broadcast (stride 0) and channel-interleaved
/// layouts are all expressed the same way.
///
/// # Footprint
/// The storage a tensor needs is `1 + Σ stride[d]·(shape[d]-1)` elements
/// ([`Tensor::footprint_elems`]), which intentionally does **not** assume
/// density. This is the quantity every buffer-size query and capacity
/// check in the workspace is built on, and downstream hardware reads the
/// resulting offsets raw, so it must be bit-exact.
#[derive(Debug, Clone, PartialEq)]
pub struct Tensor<B, const R: usize> {
    buf: B,
    offset: u32,
    shape: [u32; R],
    stride: [i32; R],
    rank: u32,
}

impl<B: TensorBuffer, const R: usize> Tensor<B, R> {
    /// Creates a fully specified tensor.
    ///
    /// Axis slots at `rank..R` are ignored and stored as zero.
    pub fn new(buf: B, shape: [u32; R], stride: [i32; R], rank: u32) -> Result<Self, TensorError> {
        if rank as usize > R {
            return Err(TensorError::RankTooLarge {
                rank,
                max: R as u32,
            });
        }
        let mut t = Self {
            buf,
            offset: 0,
            shape: [0; R],
            stride: [0; R],
            rank,
        };
        for d in 0..rank as usize {
            t.shape[d] = shape[d];
            t.stride[d] = stride[d];
        }
        Ok(t)
    }

    /// Creates a tensor with dense row-major strides computed from `shape`.
    pub fn contiguous(buf: B, shape: [u32; R], rank: u32) -> Result<Self, TensorError> {
        if rank as usize > R {
            return Err(TensorError::RankTooLarge {
                rank,
                max: R as u32,
            });
        }
        let mut stride = [0i32; R];
        let mut acc = 1i32;
        for d in (0..rank as usize).rev() {
            stride[d] = acc;
            if shape[d] > 0 {
                acc *= shape[d] as i32;
            }
        }
        Self::new(buf, shape, stride, rank)
    }

    /// Returns the extent of axis `d`.
    pub fn dim(&self, d: usize) -> u32 {
        self.shape[d]
    }

    /// Returns the element stride of axis `d`.
    pub fn stride(&self, d: usize) -> i32 {
        self.stride[d]
    }

    /// Returns all extents (slots past the rank are zero).
    pub fn shape(&self) -> &[u32; R] {
        &self.shape
    }

    /// Returns all element strides (slots past the rank are zero).
    pub fn strides(&self) -> &[i32; R] {
        &self.stride
    }

    /// Returns the live rank.
    pub fn rank(&self) -> u32 {
        self.rank
    }

    /// Returns the element offset of this view into its buffer.
    pub fn offset(&self) -> u32 {
        self.offset
    }

    /// Overwrites the element offset.
    pub fn set_offset(&mut self, offset: u32) {
        self.offset = offset;
    }

    /// Returns the attached buffer.
    pub fn buf(&self) -> &B {
        &self.buf
    }

    /// Replaces the attached buffer, keeping the shape description.
    pub fn set_buf(&mut self, buf: B) {
        self.buf = buf;
    }

    /// Element width in bytes, taken from the buffer state.
    pub fn elem_size(&self) -> u32 {
        self.buf.elem_size()
    }

    /// Total number of addressed elements (product of extents).
    pub fn total_elems(&self) -> u32 {
        let mut n = 1u32;
        for d in 0..self.rank as usize {
            n *= self.shape[d];
        }
        n
    }

    /// Minimal storage footprint in elements: `1 + Σ stride[d]·(shape[d]-1)`.
    ///
    /// Zero-extent tensors need no storage at all.
    pub fn footprint_elems(&self) -> u32 {
        let mut acc = 1i64;
        for d in (0..self.rank as usize).rev() {
            if self.shape[d] == 0 {
                return 0;
            }
            acc += self.stride[d] as i64 * (self.shape[d] as i64 - 1);
        }
        acc as u32
    }

    /// Minimal storage footprint in bytes for the given element width.
    pub fn footprint_bytes(&self, elem_size: u32) -> u32 {
        self.footprint_elems() * elem_size
    }

    /// Element offset of the coordinate `pos` (dot product with strides).
    pub fn offset_of(&self, pos: &[u32; R]) -> i64 {
        let mut off = 0i64;
        for d in 0..self.rank as usize {
            off += pos[d] as i64 * self.stride[d] as i64;
        }
        off
    }

    /// Returns a sub-tensor starting at `pos` with extents `size`, sharing
    /// this tensor's buffer and strides.
    ///
    /// Callers (the tile iterator) guarantee the slice stays inside the
    /// declared extents; this is checked in debug builds only.
    pub fn slice(&self, pos: &[u32; R], size: &[u32; R]) -> Tensor<B, R> {
        let mut t = self.clone();
        for d in 0..self.rank as usize {
            debug_assert!(
                pos[d] + size[d] <= self.shape[d],
                "slice out of bounds on axis {d}"
            );
            t.shape[d] = size[d];
        }
        let off = self.offset as i64 + self.offset_of(pos);
        debug_assert!(off >= 0, "slice produced a negative element offset");
        t.offset = off as u32;
        t
    }

    /// Returns a tensor with axes reordered: output axis `a` takes extent
    /// and stride from input axis `order[a]`.
    pub fn transpose(&self, order: &[usize; R]) -> Result<Tensor<B, R>, TensorError> {
        let rank = self.rank as usize;
        let mut seen = 0u32;
        let mut t = self.clone();
        for a in 0..rank {
            let src = order[a];
            if src >= rank || seen & (1 << src) != 0 {
                return Err(TensorError::InvalidPermutation { axis: src as u32 });
            }
            seen |= 1 << src;
            t.shape[a] = self.shape[src];
            t.stride[a] = self.stride[src];
        }
        Ok(t)
    }
}

impl<const R: usize> Tensor<NoBuffer, R> {
    /// Creates a shape-only tensor for descriptor construction.
    pub fn shaped(shape: [u32; R], stride: [i32; R], rank: u32) -> Result<Self, TensorError> {
        Self::new(NoBuffer, shape, stride, rank)
    }

    /// Creates a shape-only tensor with dense row-major strides.
    pub fn shaped_contiguous(shape: [u32; R], rank: u32) -> Result<Self, TensorError> {
        Self::contiguous(NoBuffer, shape, rank)
    }

    /// Binds a buffer to this shape, moving to the next protocol state.
    pub fn attach<B: TensorBuffer>(&self, buf: B) -> Tensor<B, R> {
        Tensor {
            buf,
            offset: self.offset,
            shape: self.shape,
            stride: self.stride,
            rank: self.rank,
        }
    }
}

impl<const R: usize> Tensor<OffsetBuffer, R> {
    /// Resolves the region-relative buffer against the device's region
    /// table, producing a tensor addressable by the numeric backend.
    ///
    /// The buffer's declared capacity is re-checked against the tensor's
    /// footprint here: blobs cross a trust boundary, and a record whose
    /// shape outgrew its buffer must not reach the backend.
    pub fn resolve(
        &self,
        regions: &MemRegions<'_>,
    ) -> Result<Tensor<DeviceBuffer, R>, TensorError> {
        let expected = self.footprint_bytes(self.buf.elem_size());
        if self.buf.capacity_bytes() < expected {
            return Err(TensorError::SizeMismatch {
                expected,
                actual: self.buf.capacity_bytes(),
            });
        }
        let buf = regions.resolve(self.buf())?;
        Ok(Tensor {
            buf,
            offset: self.offset,
            shape: self.shape,
            stride: self.stride,
            rank: self.rank,
        })
    }

    /// Packs this tensor into the fixed-layout blob record.
    pub fn pack(&self) -> PackedTensor {
        debug_assert!(R <= MAX_RANK);
        let mut p = PackedTensor::zeroed();
        p.buf = *self.buf();
        p.offset = self.offset;
        p.rank = self.rank;
        for d in 0..R.min(MAX_RANK) {
            p.shape[d] = self.shape[d];
            p.stride[d] = self.stride[d];
        }
        p
    }
}

/// The blob-embedded form of a region-relative tensor.
///
/// Fixed [`MAX_RANK`] axis slots regardless of live rank, all fields
/// 4-byte scalars, no implicit padding — the record is `memcpy`-safe and
/// its layout is part of the compile-to-runtime contract.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Pod, Zeroable)]
#[repr(C)]
pub struct PackedTensor {
    pub buf: OffsetBuffer,
    pub offset: u32,
    pub shape: [u32; MAX_RANK],
    pub stride: [i32; MAX_RANK],
    pub rank: u32,
}

impl PackedTensor {
    /// Reconstructs a region-relative tensor with axis capacity `R`.
    ///
    /// Fails with `RankTooLarge` if the record's live rank does not fit.
    pub fn unpack<const R: usize>(&self) -> Result<Tensor<OffsetBuffer, R>, TensorError> {
        if self.rank as usize > R {
            return Err(TensorError::RankTooLarge {
                rank: self.rank,
                max: R as u32,
            });
        }
        let mut shape = [0u32; R];
        let mut stride = [0i32; R];
        for d in 0..self.rank as usize {
            shape[d] = self.shape[d];
            stride[d] = self.stride[d];
        }
        let mut t = Tensor::new(self.buf, shape, stride, self.rank)?;
        t.set_offset(self.offset);
        Ok(t)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ElemType;

    #[test]
    fn test_footprint_non_contiguous() {
        // Shape [4,1,3] with strides [3,0,1]: 1 + 3·3 + 0·0 + 1·2 = 12.
        let t = Tensor::<NoBuffer, 3>::shaped([4, 1, 3], [3, 0, 1], 3).unwrap();
        assert_eq!(t.footprint_elems(), 12);
        assert_eq!(t.footprint_bytes(4), 48);
    }

    #[test]
    fn test_footprint_dense_equals_total() {
        let t = Tensor::<NoBuffer, 4>::shaped_contiguous([2, 3, 4, 5], 4).unwrap();
        assert_eq!(t.footprint_elems(), t.total_elems());
        assert_eq!(t.strides(), &[60, 20, 5, 1]);
    }

    #[test]
    fn test_footprint_zero_extent() {
        let t = Tensor::<NoBuffer, 2>::shaped([0, 4], [4, 1], 2).unwrap();
        assert_eq!(t.footprint_elems(), 0);
    }

    #[test]
    fn test_rank_too_large() {
        let r = Tensor::<NoBuffer, 2>::shaped_contiguous([1, 1], 3);
        assert!(matches!(
            r,
            Err(TensorError::RankTooLarge { rank: 3, max: 2 })
        ));
    }

    #[test]
    fn test_slice_offset() {
        let buf = OffsetBuffer::new(0, 0, 240, ElemType::I8);
        let t = Tensor::contiguous(buf, [4, 6, 10], 3).unwrap();
        let s = t.slice(&[1, 2, 3], &[2, 2, 2]);
        assert_eq!(s.offset(), 60 + 20 + 3);
        assert_eq!(s.shape(), &[2, 2, 2]);
        // Strides and buffer are shared, not recomputed.
        assert_eq!(s.strides(), t.strides());
        assert_eq!(s.buf(), t.buf());
    }

    #[test]
    fn test_transpose() {
        let t = Tensor::<NoBuffer, 3>::shaped_contiguous([2, 3, 4], 3).unwrap();
        let p = t.transpose(&[2, 0, 1]).unwrap();
        assert_eq!(p.shape(), &[4, 2, 3]);
        assert_eq!(p.strides(), &[1, 12, 4]);
        // Same storage footprint either way.
        assert_eq!(p.footprint_elems(), t.footprint_elems());
    }

    #[test]
    fn test_transpose_rejects_repeats() {
        let t = Tensor::<NoBuffer, 3>::shaped_contiguous([2, 3, 4], 3).unwrap();
        assert!(matches!(
            t.transpose(&[0, 0, 1]),
            Err(TensorError::InvalidPermutation { axis: 0 })
        ));
    }

    #[test]
    fn test_pack_unpack_roundtrip() {
        let buf = OffsetBuffer::new(1, 256, 1024, ElemType::I16);
        let mut t = Tensor::new(buf, [1, 8, 8, 4], [256, 32, 4, 1], 4).unwrap();
        t.set_offset(7);
        let packed = t.pack();
        let back: Tensor<OffsetBuffer, 4> = packed.unpack().unwrap();
        assert_eq!(back, t);
        // A wider axis capacity also works.
        let wide: Tensor<OffsetBuffer, 5> = packed.unpack().unwrap();
        assert_eq!(wide.rank(), 4);
        assert_eq!(wide.dim(3), 4);
    }

    #[test]
    fn test_unpack_rank_check() {
        let buf = OffsetBuffer::new(0, 0, 16, ElemType::I8);
        let t = Tensor::contiguous(buf, [2, 2, 2, 2], 4).unwrap();
        let r: Result<Tensor<OffsetBuffer, 3>, _> = t.pack().unpack();
        assert!(matches!(r, Err(TensorError::RankTooLarge { .. })));
    }

    #[test]
    fn test_packed_tensor_byte_layout() {
        // 16 (buf) + 4 (offset) + 20 (shape) + 20 (stride) + 4 (rank).
        assert_eq!(std::mem::size_of::<PackedTensor>(), 64);
    }

    #[test]
    fn test_resolve_checks_footprint() {
        let bases = [0u64, 0x1000];
        let regions = MemRegions::new(&bases);
        let short = OffsetBuffer::new(1, 0, 10, ElemType::I16);
        let t = Tensor::contiguous(short, [4, 4], 2).unwrap();
        assert!(matches!(
            t.resolve(&regions),
            Err(TensorError::SizeMismatch {
                expected: 32,
                actual: 10
            })
        ));
        let ok = Tensor::contiguous(OffsetBuffer::new(1, 0, 32, ElemType::I16), [4, 4], 2)
            .unwrap()
            .resolve(&regions)
            .unwrap();
        assert_eq!(ok.buf().addr(), 0x1000);
    }

    #[test]
    fn test_attach_keeps_shape() {
        let t = Tensor::<NoBuffer, 2>::shaped_contiguous([3, 5], 2).unwrap();
        let bound = t.attach(OffsetBuffer::new(0, 0, 15, ElemType::I8));
        assert_eq!(bound.shape(), t.shape());
        assert_eq!(bound.elem_size(), 1);
    }
}

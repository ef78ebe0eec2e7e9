// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Blob-embedded forms of schedules and iterators.
//!
//! Cursor state is deliberately not serialized: a reconstructed iterator
//! always starts at the origin, matching the restartability contract.

use bytemuck::{Pod, Zeroable};
use tensor_core::{OffsetBuffer, PackedTensor, Tensor, TensorError, MAX_RANK};

use crate::{IteratorCfg, TensorIterator};

/// The blob-embedded form of an [`IteratorCfg`].
///
/// Fixed [`MAX_RANK`] slots, 4-byte scalars only, no implicit padding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Pod, Zeroable)]
#[repr(C)]
pub struct PackedIterCfg {
    pub order: [i32; MAX_RANK],
    pub count: [i32; MAX_RANK],
    pub first_inc: [i32; MAX_RANK],
    pub inc: [i32; MAX_RANK],
    pub last_inc: [i32; MAX_RANK],
    pub first_size: [u32; MAX_RANK],
    pub size: [u32; MAX_RANK],
    pub last_size: [u32; MAX_RANK],
}

impl PackedIterCfg {
    /// Packs a schedule. Slots past `R` are marked unused.
    pub fn pack<const R: usize>(cfg: &IteratorCfg<R>) -> Self {
        debug_assert!(R <= MAX_RANK);
        let mut p = Self::zeroed();
        for i in 0..MAX_RANK {
            if i < R {
                p.order[i] = cfg.order(i);
                p.count[i] = cfg.count(i);
                p.first_inc[i] = cfg.first_inc(i);
                p.inc[i] = cfg.inc(i);
                p.last_inc[i] = cfg.last_inc(i);
                p.first_size[i] = cfg.first_size(i);
                p.size[i] = cfg.size(i);
                p.last_size[i] = cfg.last_size(i);
            } else {
                p.order[i] = -1;
            }
        }
        p
    }

    /// Reconstructs a schedule with slot capacity `R`, dropping unused
    /// trailing slots.
    pub fn unpack<const R: usize>(&self) -> IteratorCfg<R> {
        let mut order = [-1i32; R];
        let mut count = [0i32; R];
        let mut first_inc = [0i32; R];
        let mut inc = [0i32; R];
        let mut last_inc = [0i32; R];
        let mut first_size = [0u32; R];
        let mut size = [0u32; R];
        let mut last_size = [0u32; R];
        for i in 0..R.min(MAX_RANK) {
            order[i] = self.order[i];
            count[i] = self.count[i];
            first_inc[i] = self.first_inc[i];
            inc[i] = self.inc[i];
            last_inc[i] = self.last_inc[i];
            first_size[i] = self.first_size[i];
            size[i] = self.size[i];
            last_size[i] = self.last_size[i];
        }
        IteratorCfg::from_parts(
            order, count, first_inc, inc, last_inc, first_size, size, last_size,
        )
    }
}

/// The blob-embedded form of a region-relative [`TensorIterator`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Pod, Zeroable)]
#[repr(C)]
pub struct PackedIterator {
    pub tensor: PackedTensor,
    pub cfg: PackedIterCfg,
}

impl PackedIterator {
    /// Packs a region-relative iterator. The cursor is not recorded.
    pub fn pack<const R: usize>(it: &TensorIterator<OffsetBuffer, R>) -> Self {
        Self {
            tensor: it.tensor().pack(),
            cfg: PackedIterCfg::pack(it.cfg()),
        }
    }

    /// Reconstructs the iterator with its cursor at the origin.
    pub fn unpack<const R: usize>(&self) -> Result<TensorIterator<OffsetBuffer, R>, TensorError> {
        let tensor: Tensor<OffsetBuffer, R> = self.tensor.unpack()?;
        Ok(TensorIterator::with_cfg(tensor, self.cfg.unpack()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tensor_core::ElemType;

    #[test]
    fn test_packed_sizes() {
        assert_eq!(std::mem::size_of::<PackedIterCfg>(), 8 * MAX_RANK * 4);
        assert_eq!(
            std::mem::size_of::<PackedIterator>(),
            std::mem::size_of::<PackedTensor>() + std::mem::size_of::<PackedIterCfg>()
        );
    }

    #[test]
    fn test_iterator_roundtrip_resets_cursor() {
        let t = Tensor::contiguous(OffsetBuffer::new(1, 0, 300, ElemType::I8), [1, 10, 10, 3], 4)
            .unwrap();
        let cfg =
            IteratorCfg::for_tiling(&t, &[1, 4, 10, 3], &[1, 3, 10, 3], &[0, 1, 2, 3]).unwrap();
        let mut it = TensorIterator::with_cfg(t, cfg);
        it.advance();
        assert_ne!(it.offset(), 0);

        let packed = PackedIterator::pack(&it);
        let back: TensorIterator<OffsetBuffer, 4> = packed.unpack().unwrap();
        assert_eq!(back.cfg(), it.cfg());
        assert_eq!(back.tensor(), it.tensor());
        // Cursor state is not carried across the blob boundary.
        assert_eq!(back.offset(), 0);
        assert_eq!(back.sub_tensor().dim(1), 4);
    }

    #[test]
    fn test_cfg_unused_slots() {
        let t = Tensor::<tensor_core::NoBuffer, 2>::shaped_contiguous([4, 6], 2).unwrap();
        let cfg = IteratorCfg::for_tiling(&t, &[2, 3], &[2, 3], &[0, 1]).unwrap();
        let p = PackedIterCfg::pack(&cfg);
        assert_eq!(p.order[2], -1);
        assert_eq!(p.count[2], 0);
        let back: IteratorCfg<2> = p.unpack();
        assert_eq!(back, cfg);
    }
}

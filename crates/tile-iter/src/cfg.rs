// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Per-axis tiling schedules.
//!
//! An [`IteratorCfg`] records, for each iteration slot, which tensor axis
//! it drives and the first/regular/last tile extents and cursor
//! increments along that axis. First and last tiles are allowed to differ
//! from the regular ones, which is how padding overlap and non-divisible
//! extents are expressed without ever indexing outside the tensor.

use tensor_core::{Tensor, TensorBuffer};

use crate::CfgError;

fn ceil_div(a: u32, b: u32) -> u32 {
    (a + b - 1) / b
}

/// A tiling schedule over `R` iteration slots.
///
/// Slot `i` iterates tensor axis `order[i]`; a negative `order` entry
/// marks the slot unused. All increments are in elements of the iterated
/// tensor. The schedule is restartable: for every slot with more than one
/// tile, `first_inc + inc·(count-2) + last_inc == 0`, so a full traversal
/// returns the cursor to the origin.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IteratorCfg<const R: usize> {
    order: [i32; R],
    count: [i32; R],
    first_inc: [i32; R],
    inc: [i32; R],
    last_inc: [i32; R],
    first_size: [u32; R],
    size: [u32; R],
    last_size: [u32; R],
}

impl<const R: usize> Default for IteratorCfg<R> {
    fn default() -> Self {
        let mut order = [0i32; R];
        for (i, o) in order.iter_mut().enumerate() {
            *o = i as i32;
        }
        Self {
            order,
            count: [1; R],
            first_inc: [0; R],
            inc: [0; R],
            last_inc: [0; R],
            first_size: [1; R],
            size: [1; R],
            last_size: [1; R],
        }
    }
}

impl<const R: usize> IteratorCfg<R> {
    /// Degenerate schedule: one tile covering the whole tensor.
    pub fn single_tile<B: TensorBuffer>(tensor: &Tensor<B, R>) -> Self {
        let mut cfg = Self::default();
        for i in 0..R {
            let d = tensor.dim(i);
            cfg.first_size[i] = d;
            cfg.size[i] = d;
            cfg.last_size[i] = d;
        }
        cfg
    }

    /// Builds a schedule from desired first/regular tile extents per axis.
    ///
    /// For each slot, with `total` the extent of the iterated axis:
    /// a first tile of `first_size[axis]` elements, then regular tiles of
    /// `size[axis]`, then whatever remains as the last tile. An axis whose
    /// first tile already covers it gets a single tile and zero
    /// increments. The last increment is chosen so the increments over a
    /// full traversal sum to zero.
    pub fn for_tiling<B: TensorBuffer>(
        tensor: &Tensor<B, R>,
        first_size: &[u32; R],
        size: &[u32; R],
        order: &[i32; R],
    ) -> Result<Self, CfgError> {
        let mut cfg = Self::default();
        for i in 0..R {
            let dim = order[i];
            cfg.order[i] = dim;
            if dim < 0 {
                cfg.count[i] = 0;
                cfg.first_size[i] = 0;
                cfg.size[i] = 0;
                cfg.last_size[i] = 0;
                continue;
            }
            let dim = dim as usize;
            let total = tensor.dim(dim);
            let first = first_size[dim];
            if first >= total {
                cfg.count[i] = 1;
                cfg.first_size[i] = total;
                cfg.size[i] = total;
                cfg.last_size[i] = total;
                continue;
            }
            let regular = size[dim];
            if regular == 0 {
                return Err(CfgError::ZeroTileSize { axis: dim as u32 });
            }
            let count = 1 + ceil_div(total - first, regular);
            cfg.count[i] = count as i32;
            cfg.first_inc[i] = first as i32;
            cfg.inc[i] = regular as i32;
            cfg.last_inc[i] = -(regular as i32 * (count as i32 - 2) + first as i32);
            cfg.first_size[i] = first;
            cfg.size[i] = regular;
            cfg.last_size[i] = (total as i32 + cfg.last_inc[i]) as u32;
        }
        tracing::debug!(counts = ?cfg.count, "built tiling schedule");
        Ok(cfg)
    }

    /// Derives the input-side schedule matching an output-side schedule
    /// under a sliding-window operator.
    ///
    /// Output tile increments are scaled by the window stride; tile
    /// extents grow to the window's receptive field; the first tile
    /// shrinks by the pre-padding it virtually consumes. `tensor` is the
    /// full input tensor being iterated.
    pub fn with_aperture<B: TensorBuffer>(
        &self,
        tensor: &Tensor<B, R>,
        effective_kernel_size: &[u32; R],
        stride: &[u32; R],
        pre_padding: &[u32; R],
    ) -> Self {
        let mut cfg = Self::default();
        for i in 0..R {
            let dim = self.order[i];
            cfg.order[i] = dim;
            cfg.count[i] = self.count[i];
            if dim < 0 {
                cfg.count[i] = 0;
                cfg.first_size[i] = 0;
                cfg.size[i] = 0;
                cfg.last_size[i] = 0;
                continue;
            }
            let dim = dim as usize;
            if self.count[i] <= 1 {
                // An untiled source slot stays untiled here; the axis
                // covers this tensor's own extent, which need not match
                // the source's (conv input vs. output channels).
                let total = tensor.dim(dim);
                cfg.first_size[i] = total;
                cfg.size[i] = total;
                cfg.last_size[i] = total;
                continue;
            }
            cfg.inc[i] = self.inc[i] * stride[dim] as i32;
            cfg.first_inc[i] = cfg.inc[i] - pre_padding[dim] as i32;
            cfg.last_inc[i] = cfg.inc[i] * (1 - self.count[i]) + pre_padding[dim] as i32;
            cfg.size[i] =
                (self.size[i].saturating_sub(1)) * stride[dim] + effective_kernel_size[dim];
            cfg.first_size[i] = cfg.size[i] - pre_padding[dim];
            cfg.last_size[i] = (tensor.dim(dim) as i32 + cfg.last_inc[i]) as u32;
        }
        cfg
    }

    /// Forces a single tile on the slot iterating `axis`, covering the
    /// full extent `total`.
    ///
    /// Callers apply this when a schedule would produce tiles below an
    /// operator's structural minimum (a window smaller than its receptive
    /// field); the axis is then processed whole instead.
    pub fn disable_axis(&mut self, axis: usize, total: u32) {
        for i in 0..R {
            if self.order[i] == axis as i32 {
                self.count[i] = 1;
                self.first_inc[i] = 0;
                self.inc[i] = 0;
                self.last_inc[i] = 0;
                self.first_size[i] = total;
                self.size[i] = total;
                self.last_size[i] = total;
            }
        }
    }

    /// Checks restartability and coverage against the tensor's extents.
    pub fn validate(&self, shape: &[u32; R]) -> Result<(), CfgError> {
        for i in 0..R {
            let dim = self.order[i];
            if dim < 0 {
                continue;
            }
            let axis = dim as u32;
            let total = shape[dim as usize];
            let count = self.count[i];
            if self.first_size[i] > total || self.size[i] > total || self.last_size[i] > total {
                return Err(CfgError::TileExceedsExtent { axis });
            }
            if count > 1 {
                let sum = self.first_inc[i] as i64
                    + self.inc[i] as i64 * (count as i64 - 2)
                    + self.last_inc[i] as i64;
                if sum != 0 {
                    return Err(CfgError::NotRestartable { axis });
                }
                // Coordinates visited must reconstruct [0, total) exactly.
                let covered = self.first_inc[i] as i64
                    + self.inc[i] as i64 * (count as i64 - 2)
                    + self.last_size[i] as i64;
                if covered != total as i64 {
                    return Err(CfgError::CoverageMismatch { axis });
                }
            }
        }
        Ok(())
    }

    /// Re-labels the iterated axes through a permutation: the slot that
    /// iterated axis `a` now iterates axis `new_order[a]`.
    pub fn transpose_order(&self, new_order: &[usize; R]) -> Self {
        let mut cfg = *self;
        for i in 0..R {
            if self.order[i] >= 0 {
                cfg.order[i] = new_order[self.order[i] as usize] as i32;
            }
        }
        cfg
    }

    pub fn order(&self, slot: usize) -> i32 {
        self.order[slot]
    }
    pub fn count(&self, slot: usize) -> i32 {
        self.count[slot]
    }
    pub fn first_inc(&self, slot: usize) -> i32 {
        self.first_inc[slot]
    }
    pub fn inc(&self, slot: usize) -> i32 {
        self.inc[slot]
    }
    pub fn last_inc(&self, slot: usize) -> i32 {
        self.last_inc[slot]
    }
    pub fn first_size(&self, slot: usize) -> u32 {
        self.first_size[slot]
    }
    pub fn size(&self, slot: usize) -> u32 {
        self.size[slot]
    }
    pub fn last_size(&self, slot: usize) -> u32 {
        self.last_size[slot]
    }

    /// Builds a schedule directly from raw per-slot arrays. Used by blob
    /// decoding; everything else goes through the derivation constructors.
    #[allow(clippy::too_many_arguments)]
    pub fn from_parts(
        order: [i32; R],
        count: [i32; R],
        first_inc: [i32; R],
        inc: [i32; R],
        last_inc: [i32; R],
        first_size: [u32; R],
        size: [u32; R],
        last_size: [u32; R],
    ) -> Self {
        Self {
            order,
            count,
            first_inc,
            inc,
            last_inc,
            first_size,
            size,
            last_size,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tensor_core::NoBuffer;

    fn t4(shape: [u32; 4]) -> Tensor<NoBuffer, 4> {
        Tensor::shaped_contiguous(shape, 4).unwrap()
    }

    #[test]
    fn test_single_tile_counts() {
        let cfg = IteratorCfg::single_tile(&t4([1, 10, 10, 3]));
        for i in 0..4 {
            assert_eq!(cfg.count(i), 1);
            assert_eq!(cfg.inc(i), 0);
        }
        assert_eq!(cfg.first_size(1), 10);
        assert_eq!(cfg.last_size(3), 3);
    }

    #[test]
    fn test_for_tiling_counts_and_last() {
        // Height 10 tiled as first 4 then regular 3: count = 1 + ceil(6/3) = 3.
        let t = t4([1, 10, 10, 3]);
        let cfg = IteratorCfg::for_tiling(
            &t,
            &[1, 4, 10, 3],
            &[1, 3, 10, 3],
            &[0, 1, 2, 3],
        )
        .unwrap();
        assert_eq!(cfg.count(1), 3);
        assert_eq!(cfg.first_inc(1), 4);
        assert_eq!(cfg.inc(1), 3);
        // last_inc = -(3·1 + 4) = -7; last_size = 10 - 7 = 3.
        assert_eq!(cfg.last_inc(1), -7);
        assert_eq!(cfg.last_size(1), 3);
        // Axes whose first tile covers the extent collapse to one tile.
        assert_eq!(cfg.count(0), 1);
        assert_eq!(cfg.count(2), 1);
        assert_eq!(cfg.count(3), 1);
        assert_eq!(cfg.last_inc(0), 0);
        cfg.validate(t.shape()).unwrap();
    }

    #[test]
    fn test_for_tiling_increment_sum_is_zero() {
        let t = t4([1, 17, 9, 8]);
        let cfg = IteratorCfg::for_tiling(
            &t,
            &[1, 5, 4, 8],
            &[1, 4, 4, 8],
            &[0, 1, 2, 3],
        )
        .unwrap();
        for i in 0..4 {
            let c = cfg.count(i) as i64;
            if c > 1 {
                let sum =
                    cfg.first_inc(i) as i64 + cfg.inc(i) as i64 * (c - 2) + cfg.last_inc(i) as i64;
                assert_eq!(sum, 0, "slot {i} not restartable");
            }
        }
        cfg.validate(t.shape()).unwrap();
    }

    #[test]
    fn test_for_tiling_zero_size_rejected() {
        let t = t4([1, 10, 10, 3]);
        let r = IteratorCfg::for_tiling(&t, &[1, 4, 10, 3], &[1, 0, 10, 3], &[0, 1, 2, 3]);
        assert!(matches!(r, Err(CfgError::ZeroTileSize { axis: 1 })));
    }

    #[test]
    fn test_aperture_derivation() {
        // Output height 10 tiled 4/3/3; kernel 3x3, stride 1, pre-pad 1.
        let out = t4([1, 10, 10, 3]);
        let input = t4([1, 10, 10, 3]);
        let out_cfg = IteratorCfg::for_tiling(
            &out,
            &[1, 4, 10, 3],
            &[1, 3, 10, 3],
            &[0, 1, 2, 3],
        )
        .unwrap();
        let in_cfg = out_cfg.with_aperture(&input, &[1, 3, 3, 1], &[1, 1, 1, 1], &[0, 1, 1, 0]);
        // inc scales by stride, first tile loses the pre-padding.
        assert_eq!(in_cfg.inc(1), 3);
        assert_eq!(in_cfg.first_inc(1), 2);
        // size = (3-1)·1 + 3 = 5 rows of input per output tile.
        assert_eq!(in_cfg.size(1), 5);
        assert_eq!(in_cfg.first_size(1), 4);
        // last_inc = 3·(1-3) + 1 = -5, last_size = 10 - 5 = 5.
        assert_eq!(in_cfg.last_inc(1), -5);
        assert_eq!(in_cfg.last_size(1), 5);
        // Untiled axes stay untiled.
        assert_eq!(in_cfg.count(2), 1);
        assert_eq!(in_cfg.last_inc(2), 0);
    }

    #[test]
    fn test_disable_axis() {
        let t = t4([1, 10, 10, 3]);
        let mut cfg = IteratorCfg::for_tiling(
            &t,
            &[1, 4, 4, 3],
            &[1, 3, 3, 3],
            &[0, 1, 2, 3],
        )
        .unwrap();
        assert!(cfg.count(2) > 1);
        cfg.disable_axis(2, 10);
        assert_eq!(cfg.count(2), 1);
        assert_eq!(cfg.first_size(2), 10);
        assert_eq!(cfg.last_size(2), 10);
        assert_eq!(cfg.inc(2), 0);
        cfg.validate(t.shape()).unwrap();
    }

    #[test]
    fn test_validate_rejects_oversized_tile() {
        let t = t4([1, 10, 10, 3]);
        let cfg = IteratorCfg::for_tiling(
            &t,
            &[1, 4, 10, 3],
            &[1, 3, 10, 3],
            &[0, 1, 2, 3],
        )
        .unwrap();
        let bad_shape = [1, 2, 10, 3];
        assert!(matches!(
            cfg.validate(&bad_shape),
            Err(CfgError::TileExceedsExtent { axis: 1 })
        ));
    }

    #[test]
    fn test_transpose_order() {
        let t = t4([1, 10, 10, 3]);
        let cfg = IteratorCfg::for_tiling(
            &t,
            &[1, 4, 10, 3],
            &[1, 3, 10, 3],
            &[0, 1, 2, 3],
        )
        .unwrap();
        // Swap height and width labels.
        let p = cfg.transpose_order(&[0, 2, 1, 3]);
        assert_eq!(p.order(1), 2);
        assert_eq!(p.count(1), cfg.count(1));
        assert_eq!(p.first_inc(1), cfg.first_inc(1));
    }
}
